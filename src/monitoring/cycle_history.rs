use crate::junction_engine::lanes::LaneId;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::{File, OpenOptions};
use std::path::Path;

/// Why a lane pair was chosen for a cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PriorityReason {
    Ambulance,
    Congestion,
}

/// One completed light cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CycleRecord {
    pub timestamp: u64,
    pub cycle: u64,
    pub prioritized_lane: LaneId,
    pub paired_lane: LaneId,
    pub reason: PriorityReason,
    pub vehicles_dispatched: usize,
    pub ambulances_dispatched: usize,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReportSummary {
    pub cycles: usize,
    pub ambulance_cycles: usize,
    pub vehicles_dispatched: usize,
    pub ambulances_dispatched: usize,
    /// How many cycles served each lane, either as the prioritized lane or as
    /// its pair.
    pub lane_service: BTreeMap<LaneId, usize>,
}

impl ReportSummary {
    pub fn from_records(records: &[CycleRecord]) -> Self {
        let mut summary = ReportSummary::default();
        for record in records {
            summary.cycles += 1;
            if record.reason == PriorityReason::Ambulance {
                summary.ambulance_cycles += 1;
            }
            summary.vehicles_dispatched += record.vehicles_dispatched;
            summary.ambulances_dispatched += record.ambulances_dispatched;
            for lane in [record.prioritized_lane, record.paired_lane] {
                *summary.lane_service.entry(lane).or_default() += 1;
            }
        }
        summary
    }

    pub fn print(&self) {
        println!("Report Summary:");
        println!("Cycles run: {}", self.cycles);
        println!("Ambulance priority cycles: {}", self.ambulance_cycles);
        println!("Vehicles dispatched: {}", self.vehicles_dispatched);
        println!("Ambulances dispatched: {}", self.ambulances_dispatched);
        for lane in LaneId::ALL {
            let served = self.lane_service.get(&lane).copied().unwrap_or(0);
            println!("  {:>8}: served {} times", lane.name(), served);
        }
    }
}

// Appends one record to a CSV file, writing the header only for a new file.
fn log_to_csv<T: Serialize, P: AsRef<Path>>(path: P, record: &T) -> Result<()> {
    let path = path.as_ref();
    let file_exists = path.exists() && path.metadata()?.len() > 0;
    let file = OpenOptions::new().append(true).create(true).open(path)?;
    let mut wtr = csv::WriterBuilder::new()
        .has_headers(!file_exists)
        .from_writer(file);
    wtr.serialize(record)?;
    wtr.flush()?;
    Ok(())
}

pub fn log_cycle_record<P: AsRef<Path>>(path: P, record: &CycleRecord) -> Result<()> {
    log_to_csv(path, record)
}

pub fn log_cycle_records<P: AsRef<Path>>(path: P, records: &[CycleRecord]) -> Result<()> {
    for record in records {
        log_to_csv(path.as_ref(), record)?;
    }
    Ok(())
}

pub fn read_cycle_history<P: AsRef<Path>>(path: P) -> Result<Vec<CycleRecord>> {
    let file = File::open(path)?;
    let mut rdr = csv::Reader::from_reader(file);
    let mut records = Vec::new();
    for result in rdr.deserialize() {
        let record: CycleRecord = result?;
        records.push(record);
    }
    Ok(records)
}

pub fn show_cycle_history<P: AsRef<Path>>(path: P) -> Result<()> {
    let records = read_cycle_history(path)?;
    println!("Cycle History:");
    if records.is_empty() {
        println!("No cycles recorded.");
    }
    for record in records {
        println!(
            "#{} [{}] {} + {} ({:?}): {} vehicles, {} ambulances",
            record.cycle,
            record.timestamp,
            record.prioritized_lane,
            record.paired_lane,
            record.reason,
            record.vehicles_dispatched,
            record.ambulances_dispatched
        );
    }
    Ok(())
}

pub fn generate_report_summary<P: AsRef<Path>>(path: P) -> Result<ReportSummary> {
    let records = read_cycle_history(path)?;
    Ok(ReportSummary::from_records(&records))
}
