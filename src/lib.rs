pub mod config;
pub mod control_system;
pub mod global_variables;
pub mod junction_engine;
pub mod monitoring;
pub mod shared_data;
