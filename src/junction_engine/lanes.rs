use crate::junction_engine::vehicles::Vehicle;
use anyhow::anyhow;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One of the eight directional flows at the junction.
///
/// Declaration order is the scan order used everywhere a lane is chosen:
/// the four inbound flows first, then their opposite-flow partners.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum LaneId {
    #[serde(rename = "xtop")]
    XTop,
    #[serde(rename = "xbottom")]
    XBottom,
    #[serde(rename = "yleft")]
    YLeft,
    #[serde(rename = "yright")]
    YRight,
    #[serde(rename = "-xtop")]
    XTopOpposite,
    #[serde(rename = "-xbottom")]
    XBottomOpposite,
    #[serde(rename = "-yleft")]
    YLeftOpposite,
    #[serde(rename = "-yright")]
    YRightOpposite,
}

impl LaneId {
    /// Every lane, in scan order.
    pub const ALL: [LaneId; 8] = [
        LaneId::XTop,
        LaneId::XBottom,
        LaneId::YLeft,
        LaneId::YRight,
        LaneId::XTopOpposite,
        LaneId::XBottomOpposite,
        LaneId::YLeftOpposite,
        LaneId::YRightOpposite,
    ];

    /// Position of this lane in `ALL`.
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        match self {
            LaneId::XTop => "xtop",
            LaneId::XBottom => "xbottom",
            LaneId::YLeft => "yleft",
            LaneId::YRight => "yright",
            LaneId::XTopOpposite => "-xtop",
            LaneId::XBottomOpposite => "-xbottom",
            LaneId::YLeftOpposite => "-yleft",
            LaneId::YRightOpposite => "-yright",
        }
    }

    /// The lane that moves together with this one in a cycle.
    /// The pairing is its own inverse.
    pub fn paired(self) -> LaneId {
        match self {
            LaneId::XTop => LaneId::XTopOpposite,
            LaneId::XTopOpposite => LaneId::XTop,
            LaneId::XBottom => LaneId::XBottomOpposite,
            LaneId::XBottomOpposite => LaneId::XBottom,
            LaneId::YLeft => LaneId::YLeftOpposite,
            LaneId::YLeftOpposite => LaneId::YLeft,
            LaneId::YRight => LaneId::YRightOpposite,
            LaneId::YRightOpposite => LaneId::YRight,
        }
    }
}

impl fmt::Display for LaneId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for LaneId {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        LaneId::ALL
            .iter()
            .copied()
            .find(|lane| lane.name() == wanted)
            .ok_or_else(|| anyhow!("unknown lane: {:?}", s))
    }
}

/// Queue of vehicles waiting in one lane.
///
/// Counts are kept in lock-step with the queue so that
/// `queue.len() == vehicle_count` and the ambulance count always matches
/// the ambulances actually queued.
#[derive(Debug, Clone)]
pub struct LaneState {
    /// Which lane this is.
    pub id: LaneId,
    vehicle_count: usize,
    ambulance_count: usize,
    /// Vehicles in arrival order.
    queue: Vec<Vehicle>,
}

impl LaneState {
    pub fn new(id: LaneId) -> Self {
        Self {
            id,
            vehicle_count: 0,
            ambulance_count: 0,
            queue: Vec::new(),
        }
    }

    pub fn vehicle_count(&self) -> usize {
        self.vehicle_count
    }

    pub fn ambulance_count(&self) -> usize {
        self.ambulance_count
    }

    pub fn queue(&self) -> &[Vehicle] {
        &self.queue
    }

    pub fn is_empty(&self) -> bool {
        self.vehicle_count == 0
    }

    /// Appends a vehicle at the back of the queue.
    pub fn push(&mut self, vehicle: Vehicle) {
        if vehicle.is_ambulance() {
            self.ambulance_count += 1;
        }
        self.vehicle_count += 1;
        self.queue.push(vehicle);
    }

    /// Empties the lane and hands back everything that was queued.
    pub fn take_all(&mut self) -> Vec<Vehicle> {
        self.vehicle_count = 0;
        self.ambulance_count = 0;
        std::mem::take(&mut self.queue)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::junction_engine::vehicles::VehicleType;

    #[test]
    fn pairing_is_total_and_symmetric() {
        for lane in LaneId::ALL {
            assert_ne!(lane.paired(), lane);
            assert_eq!(lane.paired().paired(), lane);
        }
    }

    #[test]
    fn names_parse_back_to_the_same_lane() {
        for lane in LaneId::ALL {
            assert_eq!(lane.name().parse::<LaneId>().unwrap(), lane);
        }
        assert!("ztop".parse::<LaneId>().is_err());
        assert_eq!(" -yleft ".parse::<LaneId>().unwrap(), LaneId::YLeftOpposite);
    }

    #[test]
    fn index_follows_scan_order() {
        for (i, lane) in LaneId::ALL.iter().enumerate() {
            assert_eq!(lane.index(), i);
        }
    }

    #[test]
    fn counts_track_queue() {
        let mut lane = LaneState::new(LaneId::YRight);
        lane.push(Vehicle::new(1, VehicleType::Car, LaneId::YRight, 0));
        lane.push(Vehicle::new(2, VehicleType::Ambulance, LaneId::YRight, 1));
        lane.push(Vehicle::new(3, VehicleType::Truck, LaneId::YRight, 2));
        assert_eq!(lane.vehicle_count(), 3);
        assert_eq!(lane.queue().len(), 3);
        assert_eq!(lane.ambulance_count(), 1);

        let taken = lane.take_all();
        assert_eq!(taken.len(), 3);
        assert_eq!(taken[0].id, 1);
        assert!(lane.is_empty());
        assert_eq!(lane.ambulance_count(), 0);
        assert!(lane.queue().is_empty());
    }
}
