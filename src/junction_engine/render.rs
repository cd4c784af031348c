use crate::control_system::traffic_lights::{LightGroup, Signal};
use crate::junction_engine::lanes::LaneId;
use crate::junction_engine::layout::{Placement, Translation};
use crate::junction_engine::vehicles::Vehicle;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Presentation side of the junction. The junction tells it what changed;
/// it never calls back into the junction.
pub trait JunctionRenderer: Send {
    fn vehicle_spawned(&mut self, vehicle: &Vehicle, placement: Placement);

    /// Every vehicle in `vehicles` starts moving by `motion` over `duration`.
    fn vehicles_departing(
        &mut self,
        lane: LaneId,
        vehicles: &[Vehicle],
        motion: Translation,
        duration: Duration,
    );

    fn vehicles_removed(&mut self, lane: LaneId, vehicles: &[Vehicle]);

    fn light_changed(&mut self, group: LightGroup, signal: Signal);
}

/// Default renderer: writes every change to the log at debug level.
#[derive(Debug, Default)]
pub struct LogRenderer;

impl JunctionRenderer for LogRenderer {
    fn vehicle_spawned(&mut self, vehicle: &Vehicle, placement: Placement) {
        log::debug!(
            "Vehicle {} {} drawn on lane {} at ({:.0}, {:.0}) rotated {} deg, width {}",
            vehicle.vehicle_type,
            vehicle.id,
            vehicle.lane,
            placement.x,
            placement.y,
            placement.rotation_deg,
            placement.width
        );
    }

    fn vehicles_departing(
        &mut self,
        lane: LaneId,
        vehicles: &[Vehicle],
        motion: Translation,
        duration: Duration,
    ) {
        log::debug!(
            "Lane {}: {} vehicles moving by ({:.0}, {:.0}) over {:?}",
            lane,
            vehicles.len(),
            motion.dx,
            motion.dy,
            duration
        );
    }

    fn vehicles_removed(&mut self, lane: LaneId, vehicles: &[Vehicle]) {
        log::debug!("Lane {}: removed {} vehicles", lane, vehicles.len());
    }

    fn light_changed(&mut self, group: LightGroup, signal: Signal) {
        log::debug!("Light {:?} -> {:?}", group, signal);
    }
}

/// Something a renderer was asked to show.
#[derive(Debug, Clone, PartialEq)]
pub enum RenderEvent {
    Spawned {
        vehicle_id: u64,
        lane: LaneId,
        placement: Placement,
    },
    Departing {
        lane: LaneId,
        vehicle_ids: Vec<u64>,
        motion: Translation,
        duration: Duration,
    },
    Removed {
        lane: LaneId,
        vehicle_ids: Vec<u64>,
    },
    Light {
        group: LightGroup,
        signal: Signal,
    },
}

/// Keeps every render call so it can be inspected later.
/// Clones share the same event list.
#[derive(Debug, Clone, Default)]
pub struct RecordingRenderer {
    events: Arc<Mutex<Vec<RenderEvent>>>,
}

impl RecordingRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<RenderEvent> {
        self.events.lock().unwrap().clone()
    }

    /// Light commands only, in the order they were issued.
    pub fn light_history(&self) -> Vec<(LightGroup, Signal)> {
        self.events
            .lock()
            .unwrap()
            .iter()
            .filter_map(|event| match event {
                RenderEvent::Light { group, signal } => Some((*group, *signal)),
                _ => None,
            })
            .collect()
    }

    pub fn clear(&self) {
        self.events.lock().unwrap().clear();
    }

    fn push(&self, event: RenderEvent) {
        self.events.lock().unwrap().push(event);
    }
}

fn ids(vehicles: &[Vehicle]) -> Vec<u64> {
    vehicles.iter().map(|v| v.id).collect()
}

impl JunctionRenderer for RecordingRenderer {
    fn vehicle_spawned(&mut self, vehicle: &Vehicle, placement: Placement) {
        self.push(RenderEvent::Spawned {
            vehicle_id: vehicle.id,
            lane: vehicle.lane,
            placement,
        });
    }

    fn vehicles_departing(
        &mut self,
        lane: LaneId,
        vehicles: &[Vehicle],
        motion: Translation,
        duration: Duration,
    ) {
        self.push(RenderEvent::Departing {
            lane,
            vehicle_ids: ids(vehicles),
            motion,
            duration,
        });
    }

    fn vehicles_removed(&mut self, lane: LaneId, vehicles: &[Vehicle]) {
        self.push(RenderEvent::Removed {
            lane,
            vehicle_ids: ids(vehicles),
        });
    }

    fn light_changed(&mut self, group: LightGroup, signal: Signal) {
        self.push(RenderEvent::Light { group, signal });
    }
}
