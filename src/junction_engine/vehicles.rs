use crate::junction_engine::lanes::LaneId;
use anyhow::anyhow;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Different types of vehicles that can be dropped onto a lane.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VehicleType {
    Car,
    Bike,
    Ambulance,
    Truck,
}

impl VehicleType {
    pub const ALL: [VehicleType; 4] = [
        VehicleType::Car,
        VehicleType::Bike,
        VehicleType::Ambulance,
        VehicleType::Truck,
    ];

    pub fn name(self) -> &'static str {
        match self {
            VehicleType::Car => "car",
            VehicleType::Bike => "bike",
            VehicleType::Ambulance => "ambulance",
            VehicleType::Truck => "truck",
        }
    }
}

impl fmt::Display for VehicleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for VehicleType {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        VehicleType::ALL
            .iter()
            .copied()
            .find(|t| t.name() == wanted)
            .ok_or_else(|| anyhow!("unknown vehicle type: {:?}", s))
    }
}

/// A vehicle queued in a lane.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vehicle {
    /// Unique per junction, assigned in spawn order.
    pub id: u64,
    pub vehicle_type: VehicleType,
    /// Lane the vehicle was dropped on.
    pub lane: LaneId,
    /// Ordinal position in the lane at spawn time; drives its draw position.
    pub slot: usize,
}

impl Vehicle {
    pub fn new(id: u64, vehicle_type: VehicleType, lane: LaneId, slot: usize) -> Self {
        Self {
            id,
            vehicle_type,
            lane,
            slot,
        }
    }

    // Ambulances preempt the cycle selection.
    pub fn is_ambulance(&self) -> bool {
        self.vehicle_type == VehicleType::Ambulance
    }
}
