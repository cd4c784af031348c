use crate::control_system::traffic_lights::{LightGroup, Signal};
use crate::junction_engine::junction::Junction;
use crate::junction_engine::layout::{placement, DRAWING_HEIGHT, DRAWING_WIDTH};
use crate::junction_engine::vehicles::VehicleType;
use anyhow::Result;
use plotters::prelude::*;
use std::path::Path;

const IMAGE_SIZE: u32 = 800;
const VEHICLE_DEPTH: f64 = 30.0;
const BULB_RADIUS: i32 = 10;

// Road bands in drawing units.
const HORIZONTAL_ROAD: (f64, f64) = (330.0, 610.0);
const VERTICAL_ROAD: (f64, f64) = (380.0, 580.0);

fn to_px(x: f64, y: f64) -> (i32, i32) {
    let sx = IMAGE_SIZE as f64 / DRAWING_WIDTH;
    let sy = IMAGE_SIZE as f64 / DRAWING_HEIGHT;
    ((x * sx).round() as i32, (y * sy).round() as i32)
}

fn vehicle_color(vehicle_type: VehicleType) -> RGBColor {
    match vehicle_type {
        VehicleType::Car => RGBColor(30, 90, 200),
        VehicleType::Bike => RGBColor(240, 160, 20),
        VehicleType::Ambulance => WHITE,
        VehicleType::Truck => RGBColor(110, 60, 30),
    }
}

// Top-left corner of each signal head, in drawing units.
fn light_anchor(group: LightGroup) -> (f64, f64) {
    match group {
        LightGroup::Top => (600.0, 250.0),
        LightGroup::Bottom => (360.0, 630.0),
        LightGroup::Left => (330.0, 250.0),
        LightGroup::Right => (600.0, 630.0),
    }
}

/// Draws the junction (roads, queued vehicles and every light head) to a PNG.
pub fn save_junction_snapshot<P: AsRef<Path>>(junction: &Junction, path: P) -> Result<()> {
    let root = BitMapBackend::new(path.as_ref(), (IMAGE_SIZE, IMAGE_SIZE)).into_drawing_area();
    root.fill(&RGBColor(90, 150, 80))?;

    let road = RGBColor(70, 70, 70);
    root.draw(&Rectangle::new(
        [to_px(0.0, HORIZONTAL_ROAD.0), to_px(DRAWING_WIDTH, HORIZONTAL_ROAD.1)],
        road.filled(),
    ))?;
    root.draw(&Rectangle::new(
        [to_px(VERTICAL_ROAD.0, 0.0), to_px(VERTICAL_ROAD.1, DRAWING_HEIGHT)],
        road.filled(),
    ))?;

    for lane in junction.lanes() {
        for vehicle in lane.queue() {
            let place = placement(vehicle.lane, vehicle.slot, vehicle.vehicle_type);
            let upright = (place.rotation_deg.abs() - 90.0).abs() < f64::EPSILON;
            let (w, h) = if upright {
                (VEHICLE_DEPTH, place.width)
            } else {
                (place.width, VEHICLE_DEPTH)
            };
            let corners = [
                to_px(place.x, place.y),
                to_px(place.x + w, place.y + h),
            ];
            root.draw(&Rectangle::new(
                corners,
                vehicle_color(vehicle.vehicle_type).filled(),
            ))?;
            root.draw(&Rectangle::new(corners, &BLACK))?;
            if vehicle.is_ambulance() {
                let (cx, cy) = to_px(place.x + w / 2.0, place.y + h / 2.0);
                root.draw(&Circle::new((cx, cy), 5, RED.filled()))?;
            }
        }
    }

    for group in LightGroup::ALL {
        let signal = junction.lights().signal(group);
        let (ax, ay) = to_px(light_anchor(group).0, light_anchor(group).1);
        root.draw(&Rectangle::new(
            [(ax, ay), (ax + 2 * BULB_RADIUS + 8, ay + 6 * BULB_RADIUS + 16)],
            BLACK.filled(),
        ))?;
        let bulbs = [
            (Signal::Red, RED),
            (Signal::Yellow, YELLOW),
            (Signal::Green, GREEN),
        ];
        for (i, (bulb, lit)) in bulbs.iter().enumerate() {
            let color = if *bulb == signal {
                *lit
            } else {
                RGBColor(50, 50, 50)
            };
            let center = (
                ax + BULB_RADIUS + 4,
                ay + BULB_RADIUS + 4 + i as i32 * (2 * BULB_RADIUS + 4),
            );
            root.draw(&Circle::new(center, BULB_RADIUS as u32, color.filled()))?;
        }
    }

    root.present()?;
    log::info!("Junction snapshot saved to {}", path.as_ref().display());
    Ok(())
}
