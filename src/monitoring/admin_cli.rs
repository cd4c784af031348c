use crate::control_system::cycle_scheduler::{CycleScheduler, LoopExit};
use crate::global_variables::JUNCTION_SNAPSHOT_PNG;
use crate::monitoring::cycle_history::{generate_report_summary, log_cycle_records, show_cycle_history};
use crate::monitoring::snapshot::save_junction_snapshot;
use crate::shared_data::JunctionSummary;
use std::io::{stdin, stdout, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

async fn prompt(message: &str) -> String {
    print!("{}", message);
    let _ = stdout().flush();
    tokio::task::spawn_blocking(|| {
        let mut input = String::new();
        let _ = stdin().read_line(&mut input);
        input.trim().to_string()
    })
    .await
    .unwrap_or_default()
}

pub fn print_junction(scheduler: &CycleScheduler) {
    let summary = {
        let junction = scheduler.junction();
        let guard = junction.lock().unwrap();
        JunctionSummary::capture(&guard)
    };
    println!("Junction ({} vehicles):", summary.total_vehicles);
    for lane in &summary.lanes {
        println!(
            "  {:>8}: {} vehicles ({} ambulances), light {:?}",
            lane.lane.name(),
            lane.vehicle_count,
            lane.ambulance_count,
            lane.signal
        );
    }
    println!(
        "Cycle loop running: {}, departures in flight: {}",
        scheduler.is_running(),
        scheduler.pending_departures().len()
    );
}

/// Starts the cycle loop on a background task. Completed cycles are moved
/// out of the scheduler and appended to the history CSV once the loop exits.
pub fn spawn_cycle_loop(scheduler: Arc<CycleScheduler>, history_path: PathBuf) {
    tokio::spawn(async move {
        let exit = scheduler.run_cycle_loop().await;
        if exit == LoopExit::AlreadyRunning {
            println!("Cycle loop is already running.");
            return;
        }
        let new_records = scheduler.drain_history();
        if let Err(e) = log_cycle_records(&history_path, &new_records) {
            eprintln!("Error logging cycle history: {}", e);
        }
        println!(
            "Cycle loop finished ({:?}) after {} cycles.",
            exit,
            new_records.len()
        );
    });
}

fn print_report(history_path: &Path) {
    match generate_report_summary(history_path) {
        Ok(summary) => summary.print(),
        Err(e) => eprintln!("Error generating report summary: {}", e),
    }
}

pub async fn run_cli(scheduler: Arc<CycleScheduler>, history_path: PathBuf) {
    loop {
        println!("\nTraffic Junction Admin CLI");
        println!("1. Drop Vehicle On Lane");
        println!("2. Randomize All Lanes");
        println!("3. Run Traffic Cycles");
        println!("4. Stop Traffic Cycles");
        println!("5. Reset Junction");
        println!("6. Display Junction");
        println!("7. Display Cycle History");
        println!("8. Generate Report Summary");
        println!("9. Save Junction Snapshot");
        println!("10. Exit");
        let choice = prompt("Enter your choice: ").await.parse::<u32>().unwrap_or(0);
        match choice {
            1 => {
                let lane = prompt("Enter lane (xtop, xbottom, yleft, yright, -xtop, ...): ").await;
                let vehicle_type = prompt("Enter vehicle type (car, bike, ambulance, truck): ").await;
                let added = {
                    let junction = scheduler.junction();
                    let mut guard = junction.lock().unwrap();
                    guard.add_vehicle_named(&lane, &vehicle_type)
                };
                match added {
                    Some(id) => println!("Vehicle {} added to lane {}", id, lane),
                    None => println!("Unknown lane or vehicle type; nothing added."),
                }
            }
            2 => {
                let added = {
                    let junction = scheduler.junction();
                    let mut guard = junction.lock().unwrap();
                    guard.randomize_all_lanes(&mut rand::rng())
                };
                println!("Added {} vehicles across all lanes.", added);
            }
            3 => {
                if scheduler.is_running() {
                    println!("Cycle loop is already running.");
                } else {
                    spawn_cycle_loop(Arc::clone(&scheduler), history_path.clone());
                    println!("Cycle loop started.");
                }
            }
            4 => {
                scheduler.request_stop();
                println!("Stop requested; the current cycle will finish first.");
            }
            5 => {
                scheduler.reset_junction();
                println!("Junction reset.");
            }
            6 => print_junction(&scheduler),
            7 => {
                if let Err(e) = show_cycle_history(&history_path) {
                    eprintln!("Error displaying cycle history: {}", e);
                }
            }
            8 => print_report(&history_path),
            9 => {
                let result = {
                    let junction = scheduler.junction();
                    let guard = junction.lock().unwrap();
                    save_junction_snapshot(&guard, JUNCTION_SNAPSHOT_PNG)
                };
                match result {
                    Ok(()) => println!("Junction snapshot saved to {}", JUNCTION_SNAPSHOT_PNG),
                    Err(e) => eprintln!("Error saving snapshot: {}", e),
                }
            }
            10 => {
                scheduler.request_stop();
                println!("Exiting CLI.");
                break;
            }
            _ => {
                println!("Invalid choice. Try again.");
            }
        }
    }
}
