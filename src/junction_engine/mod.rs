// junction_engine/mod.rs
pub mod junction;
pub mod lanes;
pub mod layout;
pub mod render;
pub mod vehicles;
