// Drawing geometry for the junction, in the junction's own drawing units.
use crate::junction_engine::lanes::LaneId;
use crate::junction_engine::vehicles::VehicleType;
use serde::{Deserialize, Serialize};

// Width and height of the junction drawing area.
pub const DRAWING_WIDTH: f64 = 1000.0;
pub const DRAWING_HEIGHT: f64 = 1000.0;

// Spacing between queued vehicles.
const HORIZONTAL_SLOT_SPACING: f64 = 55.0;
const VERTICAL_SLOT_SPACING: f64 = 100.0;

/// Where and how to draw one vehicle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Placement {
    pub x: f64,
    pub y: f64,
    /// Clockwise rotation in degrees.
    pub rotation_deg: f64,
    /// Display width; height follows the sprite's aspect ratio.
    pub width: f64,
}

/// Screen extent used to size departure motion.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

/// Offset applied to a departing vehicle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Translation {
    pub dx: f64,
    pub dy: f64,
}

/// Draw position and rotation for the vehicle at `slot` in `lane`.
/// Queues grow away from the centre of the junction.
pub fn slot_position(lane: LaneId, slot: usize) -> (f64, f64, f64) {
    let h = slot as f64 * HORIZONTAL_SLOT_SPACING;
    let v = slot as f64 * VERTICAL_SLOT_SPACING;
    match lane {
        LaneId::XTopOpposite => (345.0 - h, 380.0, 0.0),
        LaneId::XTop => (600.0 + h, 380.0, 0.0),
        LaneId::XBottom => (600.0 + h, 530.0, 180.0),
        LaneId::XBottomOpposite => (345.0 - h, 530.0, 180.0),
        LaneId::YLeftOpposite => (430.0, 690.0 + v, -90.0),
        LaneId::YLeft => (430.0, 230.0 - v, -90.0),
        LaneId::YRight => (510.0, 230.0 - v, 90.0),
        LaneId::YRightOpposite => (510.0, 690.0 + v, 90.0),
    }
}

pub fn vehicle_width(vehicle_type: VehicleType) -> f64 {
    match vehicle_type {
        VehicleType::Bike => 60.0,
        VehicleType::Truck => 90.0,
        VehicleType::Car | VehicleType::Ambulance => 80.0,
    }
}

pub fn placement(lane: LaneId, slot: usize, vehicle_type: VehicleType) -> Placement {
    let (x, y, rotation_deg) = slot_position(lane, slot);
    Placement {
        x,
        y,
        rotation_deg,
        width: vehicle_width(vehicle_type),
    }
}

/// Direction each lane's vehicles leave in. Both flows on one side of an
/// axis leave towards the same screen edge.
pub fn departure_vector(lane: LaneId, viewport: Viewport) -> Translation {
    match lane {
        LaneId::XTop | LaneId::XTopOpposite => Translation {
            dx: viewport.width,
            dy: 0.0,
        },
        LaneId::XBottom | LaneId::XBottomOpposite => Translation {
            dx: -viewport.width,
            dy: 0.0,
        },
        LaneId::YLeft | LaneId::YLeftOpposite => Translation {
            dx: 0.0,
            dy: -viewport.height,
        },
        LaneId::YRight | LaneId::YRightOpposite => Translation {
            dx: 0.0,
            dy: viewport.height,
        },
    }
}
