// junction_main.rs
use junction_signals::config::TimingConfig;
use junction_signals::control_system::cycle_scheduler::CycleScheduler;
use junction_signals::global_variables::CYCLE_HISTORY_CSV;
use junction_signals::junction_engine::junction::Junction;
use junction_signals::monitoring::admin_cli::run_cli;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

#[tokio::main]
async fn main() {
    env_logger::init();

    // Optional first argument: path to a JSON timing config.
    let config = match std::env::args().nth(1) {
        Some(path) => TimingConfig::load_from_file(&path).unwrap_or_else(|e| {
            eprintln!("Error loading timing config {}: {}; using defaults", path, e);
            TimingConfig::default()
        }),
        None => TimingConfig::default(),
    };

    let junction = Arc::new(Mutex::new(Junction::new()));
    let scheduler = Arc::new(CycleScheduler::new(junction, config));
    println!("Traffic Junction System Initialized");

    run_cli(scheduler, PathBuf::from(CYCLE_HISTORY_CSV)).await;
}
