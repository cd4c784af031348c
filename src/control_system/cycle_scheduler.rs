use crate::config::TimingConfig;
use crate::control_system::traffic_lights::Signal;
use crate::junction_engine::junction::Junction;
use crate::junction_engine::lanes::LaneId;
use crate::monitoring::cycle_history::{CycleRecord, PriorityReason};
use crate::shared_data::current_timestamp;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use tokio::time::{sleep_until, Duration, Instant};

pub type SharedJunction = Arc<Mutex<Junction>>;

/// The lane pair served by one cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PrioritySelection {
    pub lane: LaneId,
    pub paired: LaneId,
    pub reason: PriorityReason,
}

/// Picks the lane to serve next.
///
/// The first lane (in scan order) holding an ambulance wins outright.
/// Otherwise the lane with the strictly largest queue wins, ties going to
/// the earlier lane. Lanes in `excluded` are skipped. Returns `None` when no
/// remaining lane has a vehicle.
pub fn select_priority_lane(junction: &Junction, excluded: &[LaneId]) -> Option<PrioritySelection> {
    let candidates = || {
        LaneId::ALL
            .into_iter()
            .filter(move |lane| !excluded.contains(lane))
    };

    if let Some(lane) = candidates().find(|lane| junction.lane(*lane).ambulance_count() > 0) {
        return Some(PrioritySelection {
            lane,
            paired: lane.paired(),
            reason: PriorityReason::Ambulance,
        });
    }

    let mut best: Option<(LaneId, usize)> = None;
    for lane in candidates() {
        let count = junction.lane(lane).vehicle_count();
        if count > best.map_or(0, |(_, max)| max) {
            best = Some((lane, count));
        }
    }

    best.map(|(lane, _)| PrioritySelection {
        lane,
        paired: lane.paired(),
        reason: PriorityReason::Congestion,
    })
}

/// A lane whose vehicles are leaving and will be cleared at `due_at`.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingDeparture {
    pub lane: LaneId,
    pub vehicle_ids: Vec<u64>,
    pub due_at: Instant,
}

/// Result of a single cycle.
#[derive(Debug, Clone, PartialEq)]
pub enum CycleOutcome {
    /// A lane pair went through green, yellow and red.
    Completed(CycleRecord),
    /// Every occupied lane is already departing; nothing to serve yet.
    WaitingOnDepartures,
    /// No vehicles left to serve. All lights were set red.
    Halted,
}

/// Why the cycle loop returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopExit {
    AlreadyRunning,
    Stopped,
    Exhausted,
    Halted,
}

/// Runs the junction's light cycles and owns every timed lane clearance.
pub struct CycleScheduler {
    junction: SharedJunction,
    config: TimingConfig,
    is_running: AtomicBool,
    stop_requested: AtomicBool,
    cycles_started: AtomicU64,
    departures: Mutex<Vec<PendingDeparture>>,
    history: Mutex<Vec<CycleRecord>>,
}

impl CycleScheduler {
    pub fn new(junction: SharedJunction, config: TimingConfig) -> Self {
        Self {
            junction,
            config,
            is_running: AtomicBool::new(false),
            stop_requested: AtomicBool::new(false),
            cycles_started: AtomicU64::new(0),
            departures: Mutex::new(Vec::new()),
            history: Mutex::new(Vec::new()),
        }
    }

    pub fn junction(&self) -> SharedJunction {
        Arc::clone(&self.junction)
    }

    pub fn config(&self) -> &TimingConfig {
        &self.config
    }

    pub fn is_running(&self) -> bool {
        self.is_running.load(Ordering::SeqCst)
    }

    pub fn stop_requested(&self) -> bool {
        self.stop_requested.load(Ordering::SeqCst)
    }

    /// Asks the loop to stop. Takes effect once the current cycle has
    /// finished.
    pub fn request_stop(&self) {
        if self.is_running() {
            log::info!("Stop requested; finishing current cycle");
        }
        self.stop_requested.store(true, Ordering::SeqCst);
    }

    /// Cycles completed since the last `drain_history`.
    pub fn history(&self) -> Vec<CycleRecord> {
        self.history.lock().unwrap().clone()
    }

    /// Hands over the completed cycles and forgets them. Cycle numbers keep
    /// counting up across drains.
    pub fn drain_history(&self) -> Vec<CycleRecord> {
        std::mem::take(&mut *self.history.lock().unwrap())
    }

    pub fn pending_departures(&self) -> Vec<PendingDeparture> {
        self.departures.lock().unwrap().clone()
    }

    /// Removes every vehicle, turns all lights off and forgets departures
    /// that were still in flight.
    pub fn reset_junction(&self) {
        self.departures.lock().unwrap().clear();
        self.junction.lock().unwrap().reset_all();
    }

    /// Runs cycles until no vehicles remain or a stop is requested.
    /// A second call while a loop is active returns immediately.
    ///
    /// After a stop, lanes already sent off are still cleared when their
    /// departure falls due; the call returns once they are.
    pub async fn run_cycle_loop(&self) -> LoopExit {
        if self.is_running.swap(true, Ordering::SeqCst) {
            log::info!("Cycle loop already running; ignoring start request");
            return LoopExit::AlreadyRunning;
        }
        self.stop_requested.store(false, Ordering::SeqCst);

        let exit = loop {
            if self.stop_requested() {
                break LoopExit::Stopped;
            }
            {
                let mut junction = self.junction.lock().unwrap();
                if !junction.has_any_vehicles() {
                    junction.set_all_red();
                    break LoopExit::Exhausted;
                }
            }

            match self.run_cycle().await {
                CycleOutcome::Completed(_) => {}
                CycleOutcome::WaitingOnDepartures => {
                    self.wait_for_next_departure().await;
                    continue;
                }
                CycleOutcome::Halted => break LoopExit::Halted,
            }

            self.sleep_processing_departures(self.config.inter_cycle())
                .await;
        };

        self.is_running.store(false, Ordering::SeqCst);
        match exit {
            LoopExit::Stopped => {
                log::info!("Traffic simulation stopped on request");
                self.settle_departures().await;
            }
            _ => log::info!("Traffic simulation completed - all vehicles cleared"),
        }
        exit
    }

    /// One SELECT, GREEN, YELLOW, RED_SETTLE pass.
    pub async fn run_cycle(&self) -> CycleOutcome {
        let departing = self.departing_lanes();
        let record = {
            let mut junction = self.junction.lock().unwrap();
            let selection = match select_priority_lane(&junction, &departing) {
                Some(selection) => selection,
                None if !departing.is_empty() => return CycleOutcome::WaitingOnDepartures,
                None => {
                    junction.set_all_red();
                    return CycleOutcome::Halted;
                }
            };
            self.start_green(&mut junction, selection, &departing)
        };

        self.sleep_processing_departures(self.config.green()).await;
        self.set_pair(record.prioritized_lane, Signal::Yellow);

        self.sleep_processing_departures(self.config.yellow()).await;
        self.set_pair(record.prioritized_lane, Signal::Red);

        log::info!(
            "Traffic cycle completed for lanes: {} and {}",
            record.prioritized_lane,
            record.paired_lane
        );
        self.history.lock().unwrap().push(record.clone());
        CycleOutcome::Completed(record)
    }

    fn start_green(
        &self,
        junction: &mut Junction,
        selection: PrioritySelection,
        departing: &[LaneId],
    ) -> CycleRecord {
        let PrioritySelection {
            lane,
            paired,
            reason,
        } = selection;
        log::info!("Serving lanes {} and {} ({:?})", lane, paired, reason);

        junction.set_light(lane, Signal::Green);
        junction.set_light(paired, Signal::Green);

        let mut vehicles_dispatched = 0;
        let mut ambulances_dispatched = 0;
        let due_at = Instant::now() + self.config.departure();
        for served in [lane, paired] {
            // Already leaving; the earlier clearance covers it.
            if departing.contains(&served) || junction.lane(served).is_empty() {
                continue;
            }
            vehicles_dispatched += junction.lane(served).vehicle_count();
            ambulances_dispatched += junction.lane(served).ambulance_count();
            let vehicle_ids =
                junction.start_departure(served, self.config.viewport(), self.config.departure());
            self.departures.lock().unwrap().push(PendingDeparture {
                lane: served,
                vehicle_ids,
                due_at,
            });
        }

        for other in LaneId::ALL {
            if other == lane || other == paired {
                continue;
            }
            if junction.lane(other).is_empty() {
                junction.set_light(other, Signal::Red);
            } else {
                // Waiting but not served this cycle: no bulb lit.
                junction.set_light(other, Signal::Off);
            }
        }

        let cycle = self.cycles_started.fetch_add(1, Ordering::SeqCst) + 1;
        CycleRecord {
            timestamp: current_timestamp(),
            cycle,
            prioritized_lane: lane,
            paired_lane: paired,
            reason,
            vehicles_dispatched,
            ambulances_dispatched,
        }
    }

    fn set_pair(&self, lane: LaneId, signal: Signal) {
        let mut junction = self.junction.lock().unwrap();
        junction.set_light(lane, signal);
        junction.set_light(lane.paired(), signal);
    }

    fn departing_lanes(&self) -> Vec<LaneId> {
        self.departures
            .lock()
            .unwrap()
            .iter()
            .map(|d| d.lane)
            .collect()
    }

    fn next_departure_due(&self) -> Option<Instant> {
        self.departures
            .lock()
            .unwrap()
            .iter()
            .map(|d| d.due_at)
            .min()
    }

    /// Clears every lane whose departure time has passed.
    fn process_due_departures(&self) {
        let now = Instant::now();
        let due: Vec<PendingDeparture> = {
            let mut departures = self.departures.lock().unwrap();
            let (due, pending): (Vec<_>, Vec<_>) =
                departures.drain(..).partition(|d| d.due_at <= now);
            *departures = pending;
            due
        };
        if due.is_empty() {
            return;
        }
        let mut junction = self.junction.lock().unwrap();
        for departure in due {
            let removed = junction.clear_lane(departure.lane);
            let late_arrivals = removed
                .iter()
                .filter(|v| !departure.vehicle_ids.contains(&v.id))
                .count();
            log::debug!(
                "Lane {} cleared after departure ({} departed, {} arrived while leaving)",
                departure.lane,
                removed.len() - late_arrivals,
                late_arrivals
            );
        }
    }

    /// Sleeps for `duration`, clearing departing lanes as they fall due.
    async fn sleep_processing_departures(&self, duration: Duration) {
        let deadline = Instant::now() + duration;
        loop {
            match self.next_departure_due() {
                Some(due) if due <= deadline => {
                    sleep_until(due).await;
                    self.process_due_departures();
                }
                _ => {
                    sleep_until(deadline).await;
                    self.process_due_departures();
                    return;
                }
            }
        }
    }

    async fn wait_for_next_departure(&self) {
        if let Some(due) = self.next_departure_due() {
            sleep_until(due).await;
        }
        self.process_due_departures();
    }

    /// Waits until every in-flight departure has cleared its lane.
    pub async fn settle_departures(&self) {
        while self.next_departure_due().is_some() {
            self.wait_for_next_departure().await;
        }
    }
}
