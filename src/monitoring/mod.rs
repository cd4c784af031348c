pub mod admin_cli;
pub mod cycle_history;
pub mod snapshot;
