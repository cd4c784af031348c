// src/shared_data.rs

use crate::control_system::traffic_lights::{LightGroup, Signal};
use crate::junction_engine::junction::Junction;
use crate::junction_engine::lanes::LaneId;
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

/// Seconds since the Unix epoch.
pub fn current_timestamp() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

/// Occupancy of one lane at a point in time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LaneSummary {
    pub lane: LaneId,
    pub vehicle_count: usize,
    pub ambulance_count: usize,
    pub signal: Signal,
}

/// Point-in-time view of the whole junction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JunctionSummary {
    pub timestamp: u64,
    pub total_vehicles: usize,
    pub lanes: Vec<LaneSummary>,
    pub lights: Vec<(LightGroup, Signal)>,
}

impl JunctionSummary {
    pub fn capture(junction: &Junction) -> Self {
        let lanes = junction
            .lanes()
            .iter()
            .map(|lane| LaneSummary {
                lane: lane.id,
                vehicle_count: lane.vehicle_count(),
                ambulance_count: lane.ambulance_count(),
                signal: junction.lights().signal_for_lane(lane.id),
            })
            .collect();
        Self {
            timestamp: current_timestamp(),
            total_vehicles: junction.total_vehicles(),
            lanes,
            lights: junction.lights().snapshot(),
        }
    }
}
