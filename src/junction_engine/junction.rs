use crate::control_system::traffic_lights::{LightController, LightGroup, Signal};
use crate::global_variables::{RANDOM_FILL_MAX, RANDOM_FILL_MIN};
use crate::junction_engine::lanes::{LaneId, LaneState};
use crate::junction_engine::layout::{departure_vector, placement, Viewport};
use crate::junction_engine::render::{JunctionRenderer, LogRenderer};
use crate::junction_engine::vehicles::{Vehicle, VehicleType};
use rand::Rng;
use std::time::Duration;

/// Complete state of the junction: every lane's queue, the light groups and
/// the renderer that mirrors them.
pub struct Junction {
    lanes: [LaneState; 8],
    lights: LightController,
    next_vehicle_id: u64,
    renderer: Box<dyn JunctionRenderer>,
}

impl Default for Junction {
    fn default() -> Self {
        Self::new()
    }
}

impl Junction {
    pub fn new() -> Self {
        Self::with_renderer(LogRenderer)
    }

    pub fn with_renderer<R: JunctionRenderer + 'static>(renderer: R) -> Self {
        Self {
            lanes: LaneId::ALL.map(LaneState::new),
            lights: LightController::new(),
            next_vehicle_id: 1,
            renderer: Box::new(renderer),
        }
    }

    pub fn lane(&self, lane: LaneId) -> &LaneState {
        &self.lanes[lane.index()]
    }

    /// All lanes in scan order.
    pub fn lanes(&self) -> &[LaneState] {
        &self.lanes
    }

    pub fn lights(&self) -> &LightController {
        &self.lights
    }

    pub fn has_any_vehicles(&self) -> bool {
        self.lanes.iter().any(|lane| !lane.is_empty())
    }

    pub fn total_vehicles(&self) -> usize {
        self.lanes.iter().map(|lane| lane.vehicle_count()).sum()
    }

    /// Queues a new vehicle at the back of `lane` and returns its id.
    pub fn add_vehicle(&mut self, lane: LaneId, vehicle_type: VehicleType) -> u64 {
        let id = self.next_vehicle_id;
        self.next_vehicle_id += 1;

        let state = &mut self.lanes[lane.index()];
        let slot = state.vehicle_count();
        let vehicle = Vehicle::new(id, vehicle_type, lane, slot);
        self.renderer
            .vehicle_spawned(&vehicle, placement(lane, slot, vehicle_type));
        state.push(vehicle);

        log::debug!(
            "Vehicle {} {} queued on lane {} (slot {})",
            vehicle_type,
            id,
            lane,
            slot
        );
        id
    }

    /// String form of `add_vehicle`, as used by drop events and the CLI.
    /// Unknown lanes or vehicle types are logged and ignored.
    pub fn add_vehicle_named(&mut self, lane_name: &str, vehicle_type: &str) -> Option<u64> {
        let lane = match lane_name.parse::<LaneId>() {
            Ok(lane) => lane,
            Err(e) => {
                log::warn!("Ignoring drop: {}", e);
                return None;
            }
        };
        let vehicle_type = match vehicle_type.parse::<VehicleType>() {
            Ok(t) => t,
            Err(e) => {
                log::warn!("Ignoring drop on lane {}: {}", lane, e);
                return None;
            }
        };
        Some(self.add_vehicle(lane, vehicle_type))
    }

    /// Adds between 1 and 3 vehicles of random type to every lane.
    /// Returns how many vehicles were added.
    pub fn randomize_all_lanes<R: Rng + ?Sized>(&mut self, rng: &mut R) -> usize {
        let mut added = 0;
        for lane in LaneId::ALL {
            let count = rng.random_range(RANDOM_FILL_MIN..=RANDOM_FILL_MAX);
            for _ in 0..count {
                let vehicle_type = VehicleType::ALL[rng.random_range(0..VehicleType::ALL.len())];
                self.add_vehicle(lane, vehicle_type);
                added += 1;
            }
        }
        log::info!("Random fill added {} vehicles", added);
        added
    }

    /// Empties `lane` and returns the removed vehicles.
    pub fn clear_lane(&mut self, lane: LaneId) -> Vec<Vehicle> {
        let removed = self.lanes[lane.index()].take_all();
        if !removed.is_empty() {
            self.renderer.vehicles_removed(lane, &removed);
        }
        removed
    }

    /// Removes every vehicle immediately and turns every light off.
    pub fn reset_all(&mut self) {
        for lane in LaneId::ALL {
            self.clear_lane(lane);
        }
        self.clear_lights();
        log::info!("Junction reset");
    }

    /// Starts moving every vehicle currently queued in `lane` off screen.
    /// The lane keeps its vehicles until it is cleared.
    pub fn start_departure(
        &mut self,
        lane: LaneId,
        viewport: Viewport,
        duration: Duration,
    ) -> Vec<u64> {
        let vehicles = self.lanes[lane.index()].queue().to_vec();
        let motion = departure_vector(lane, viewport);
        self.renderer
            .vehicles_departing(lane, &vehicles, motion, duration);
        vehicles.iter().map(|v| v.id).collect()
    }

    pub fn set_light(&mut self, lane: LaneId, signal: Signal) {
        let group = self.lights.set_color(lane, signal);
        self.renderer.light_changed(group, signal);
    }

    pub fn set_light_named(&mut self, lane: LaneId, color: &str) {
        let (group, signal) = self.lights.set_color_named(lane, color);
        self.renderer.light_changed(group, signal);
    }

    pub fn set_all_red(&mut self) {
        self.lights.set_all_red();
        self.notify_all_groups();
    }

    pub fn clear_lights(&mut self) {
        self.lights.clear_all();
        self.notify_all_groups();
    }

    fn notify_all_groups(&mut self) {
        for group in LightGroup::ALL {
            self.renderer.light_changed(group, self.lights.signal(group));
        }
    }
}
