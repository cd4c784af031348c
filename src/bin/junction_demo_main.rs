// junction_demo_main.rs
use junction_signals::config::TimingConfig;
use junction_signals::control_system::cycle_scheduler::CycleScheduler;
use junction_signals::global_variables::{CYCLE_HISTORY_CSV, JUNCTION_SNAPSHOT_PNG};
use junction_signals::junction_engine::junction::Junction;
use junction_signals::monitoring::cycle_history::{log_cycle_records, ReportSummary};
use junction_signals::monitoring::snapshot::save_junction_snapshot;
use junction_signals::shared_data::JunctionSummary;
use std::sync::{Arc, Mutex};

/// Fills every lane at random, runs cycles until the junction is empty and
/// reports what was served.
#[tokio::main]
async fn main() {
    env_logger::init();

    let config = match std::env::args().nth(1) {
        Some(path) => match TimingConfig::load_from_file(&path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Error loading timing config {}: {}", path, e);
                return;
            }
        },
        None => TimingConfig::default(),
    };

    let junction = Arc::new(Mutex::new(Junction::new()));
    {
        let mut guard = junction.lock().unwrap();
        guard.randomize_all_lanes(&mut rand::rng());
        if let Err(e) = save_junction_snapshot(&guard, JUNCTION_SNAPSHOT_PNG) {
            eprintln!("Error saving snapshot: {}", e);
        }
        match serde_json::to_string_pretty(&JunctionSummary::capture(&guard)) {
            Ok(json) => println!("Initial junction:\n{}", json),
            Err(e) => eprintln!("Error serializing junction: {}", e),
        }
    }

    let scheduler = CycleScheduler::new(Arc::clone(&junction), config);
    let exit = scheduler.run_cycle_loop().await;
    scheduler.settle_departures().await;

    let history = scheduler.history();
    if let Err(e) = log_cycle_records(CYCLE_HISTORY_CSV, &history) {
        eprintln!("Error logging cycle history: {}", e);
    }
    println!("Loop exited: {:?}", exit);
    ReportSummary::from_records(&history).print();
}
