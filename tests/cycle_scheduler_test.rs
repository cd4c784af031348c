//! Light cycle scenarios run against a paused tokio clock.

use junction_signals::config::TimingConfig;
use junction_signals::control_system::cycle_scheduler::{CycleOutcome, CycleScheduler, LoopExit};
use junction_signals::control_system::traffic_lights::{LightGroup, Signal};
use junction_signals::junction_engine::junction::Junction;
use junction_signals::junction_engine::lanes::LaneId;
use junction_signals::junction_engine::render::{RecordingRenderer, RenderEvent};
use junction_signals::junction_engine::vehicles::VehicleType;
use junction_signals::monitoring::cycle_history::{PriorityReason, ReportSummary};
use rand::rngs::SmallRng;
use rand::SeedableRng;
use std::sync::{Arc, Mutex};
use tokio::time::{sleep, Duration, Instant};

fn setup(config: TimingConfig) -> (Arc<CycleScheduler>, RecordingRenderer) {
    let recorder = RecordingRenderer::new();
    let junction = Arc::new(Mutex::new(Junction::with_renderer(recorder.clone())));
    (Arc::new(CycleScheduler::new(junction, config)), recorder)
}

fn add(scheduler: &CycleScheduler, lane: LaneId, vehicle_type: VehicleType, count: usize) {
    let junction = scheduler.junction();
    let mut guard = junction.lock().unwrap();
    for _ in 0..count {
        guard.add_vehicle(lane, vehicle_type);
    }
}

fn signal(scheduler: &CycleScheduler, group: LightGroup) -> Signal {
    scheduler.junction().lock().unwrap().lights().signal(group)
}

fn count(scheduler: &CycleScheduler, lane: LaneId) -> usize {
    scheduler.junction().lock().unwrap().lane(lane).vehicle_count()
}

fn short_timings() -> TimingConfig {
    TimingConfig {
        green_ms: 100,
        yellow_ms: 50,
        inter_cycle_ms: 50,
        departure_ms: 1000,
        ..TimingConfig::default()
    }
}

#[tokio::test(start_paused = true)]
async fn busiest_lane_goes_green_yellow_red_then_departs() {
    let (scheduler, recorder) = setup(TimingConfig::default());
    add(&scheduler, LaneId::XTop, VehicleType::Car, 2);
    add(&scheduler, LaneId::YLeftOpposite, VehicleType::Car, 1);

    let s = Arc::clone(&scheduler);
    let cycle = tokio::spawn(async move { s.run_cycle().await });

    sleep(Duration::from_millis(500)).await;
    assert_eq!(signal(&scheduler, LightGroup::Top), Signal::Green);
    // Occupied but not served: dark rather than red.
    assert_eq!(signal(&scheduler, LightGroup::Left), Signal::Off);
    assert_eq!(signal(&scheduler, LightGroup::Bottom), Signal::Red);
    assert_eq!(signal(&scheduler, LightGroup::Right), Signal::Red);

    sleep(Duration::from_millis(600)).await;
    assert_eq!(signal(&scheduler, LightGroup::Top), Signal::Yellow);

    let outcome = cycle.await.unwrap();
    let record = match outcome {
        CycleOutcome::Completed(record) => record,
        other => panic!("unexpected outcome {:?}", other),
    };
    assert_eq!(record.prioritized_lane, LaneId::XTop);
    assert_eq!(record.paired_lane, LaneId::XTopOpposite);
    assert_eq!(record.reason, PriorityReason::Congestion);
    assert_eq!(record.vehicles_dispatched, 2);
    assert_eq!(signal(&scheduler, LightGroup::Top), Signal::Red);

    // Still driving off.
    assert_eq!(count(&scheduler, LaneId::XTop), 2);
    assert_eq!(scheduler.pending_departures().len(), 1);

    let started = Instant::now();
    scheduler.settle_departures().await;
    assert_eq!(started.elapsed(), Duration::from_millis(5000 - 1150));
    assert_eq!(count(&scheduler, LaneId::XTop), 0);
    assert_eq!(count(&scheduler, LaneId::YLeftOpposite), 1);

    let top_history: Vec<Signal> = recorder
        .light_history()
        .into_iter()
        .filter(|(group, _)| *group == LightGroup::Top)
        .map(|(_, s)| s)
        .collect();
    assert_eq!(
        top_history,
        vec![Signal::Green, Signal::Green, Signal::Yellow, Signal::Yellow, Signal::Red, Signal::Red]
    );

    let departing = recorder.events().into_iter().find_map(|event| match event {
        RenderEvent::Departing { lane, motion, vehicle_ids, .. } => Some((lane, motion, vehicle_ids)),
        _ => None,
    });
    let (lane, motion, ids) = departing.expect("departure rendered");
    assert_eq!(lane, LaneId::XTop);
    assert_eq!(motion.dx, TimingConfig::default().viewport_width);
    assert_eq!(ids.len(), 2);
}

#[tokio::test(start_paused = true)]
async fn ambulance_lane_preempts_bigger_queue() {
    let (scheduler, _) = setup(TimingConfig::default());
    add(&scheduler, LaneId::YRight, VehicleType::Ambulance, 1);
    add(&scheduler, LaneId::XBottom, VehicleType::Car, 3);

    match scheduler.run_cycle().await {
        CycleOutcome::Completed(record) => {
            assert_eq!(record.prioritized_lane, LaneId::YRight);
            assert_eq!(record.paired_lane, LaneId::YRightOpposite);
            assert_eq!(record.reason, PriorityReason::Ambulance);
            assert_eq!(record.ambulances_dispatched, 1);
        }
        other => panic!("unexpected outcome {:?}", other),
    }
}

#[tokio::test(start_paused = true)]
async fn empty_junction_exits_immediately_with_all_red() {
    let (scheduler, _) = setup(TimingConfig::default());
    let started = Instant::now();

    assert_eq!(scheduler.run_cycle_loop().await, LoopExit::Exhausted);
    assert_eq!(started.elapsed(), Duration::ZERO);
    assert!(!scheduler.is_running());
    for group in LightGroup::ALL {
        assert_eq!(signal(&scheduler, group), Signal::Red);
    }
    assert!(scheduler.history().is_empty());
}

#[tokio::test(start_paused = true)]
async fn single_cycle_on_empty_junction_halts() {
    let (scheduler, _) = setup(TimingConfig::default());
    assert_eq!(scheduler.run_cycle().await, CycleOutcome::Halted);
    for group in LightGroup::ALL {
        assert_eq!(signal(&scheduler, group), Signal::Red);
    }
}

#[tokio::test(start_paused = true)]
async fn stop_during_green_finishes_the_cycle_first() {
    let (scheduler, _) = setup(TimingConfig::default());
    add(&scheduler, LaneId::XTop, VehicleType::Car, 1);
    add(&scheduler, LaneId::YLeft, VehicleType::Truck, 1);

    let s = Arc::clone(&scheduler);
    let running = tokio::spawn(async move { s.run_cycle_loop().await });

    let started = Instant::now();
    sleep(Duration::from_millis(400)).await;
    assert!(scheduler.is_running());
    assert_eq!(signal(&scheduler, LightGroup::Top), Signal::Green);
    scheduler.request_stop();

    assert_eq!(running.await.unwrap(), LoopExit::Stopped);
    assert!(!scheduler.is_running());
    assert_eq!(scheduler.history().len(), 1);
    assert_eq!(signal(&scheduler, LightGroup::Top), Signal::Red);
    // The served lane still drives off once its departure falls due.
    assert_eq!(started.elapsed(), Duration::from_millis(5000));
    assert_eq!(count(&scheduler, LaneId::XTop), 0);
    assert!(scheduler.pending_departures().is_empty());
    // The other lane was never served.
    assert_eq!(count(&scheduler, LaneId::YLeft), 1);

    sleep(Duration::from_secs(60)).await;
    assert_eq!(count(&scheduler, LaneId::XTop), 0);
    assert_eq!(count(&scheduler, LaneId::YLeft), 1);
}

#[tokio::test(start_paused = true)]
async fn departure_clears_vehicles_that_arrive_while_leaving() {
    let (scheduler, recorder) = setup(short_timings());
    add(&scheduler, LaneId::XBottom, VehicleType::Car, 2);

    scheduler.run_cycle().await;
    let pending = scheduler.pending_departures();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].lane, LaneId::XBottom);
    assert_eq!(pending[0].vehicle_ids.len(), 2);

    add(&scheduler, LaneId::XBottom, VehicleType::Bike, 1);
    scheduler.settle_departures().await;
    assert_eq!(count(&scheduler, LaneId::XBottom), 0);

    let removed = recorder.events().into_iter().find_map(|event| match event {
        RenderEvent::Removed { lane, vehicle_ids } => Some((lane, vehicle_ids)),
        _ => None,
    });
    let (lane, ids) = removed.expect("removal rendered");
    assert_eq!(lane, LaneId::XBottom);
    assert_eq!(ids.len(), 3);
    assert!(pending[0].vehicle_ids.iter().all(|id| ids.contains(id)));
}

#[tokio::test(start_paused = true)]
async fn drained_history_is_forgotten_but_cycle_numbers_keep_counting() {
    let (scheduler, _) = setup(short_timings());
    add(&scheduler, LaneId::XTop, VehicleType::Car, 1);
    assert_eq!(scheduler.run_cycle_loop().await, LoopExit::Exhausted);

    let first = scheduler.drain_history();
    assert_eq!(first.len(), 1);
    assert_eq!(first[0].cycle, 1);
    assert!(scheduler.history().is_empty());

    add(&scheduler, LaneId::YRight, VehicleType::Truck, 1);
    assert_eq!(scheduler.run_cycle_loop().await, LoopExit::Exhausted);
    let second = scheduler.drain_history();
    assert_eq!(second.len(), 1);
    assert_eq!(second[0].cycle, 2);
    assert_eq!(second[0].prioritized_lane, LaneId::YRight);
}

#[tokio::test(start_paused = true)]
async fn second_start_is_ignored_while_running() {
    let (scheduler, _) = setup(short_timings());
    add(&scheduler, LaneId::XBottom, VehicleType::Car, 1);

    let s = Arc::clone(&scheduler);
    let running = tokio::spawn(async move { s.run_cycle_loop().await });
    sleep(Duration::from_millis(10)).await;

    assert_eq!(scheduler.run_cycle_loop().await, LoopExit::AlreadyRunning);
    assert_eq!(running.await.unwrap(), LoopExit::Exhausted);
}

#[tokio::test(start_paused = true)]
async fn lane_clears_exactly_when_departure_falls_due() {
    let (scheduler, _) = setup(short_timings());
    add(&scheduler, LaneId::YLeft, VehicleType::Bike, 2);
    let started = Instant::now();

    assert_eq!(scheduler.run_cycle_loop().await, LoopExit::Exhausted);
    // One cycle, then the loop waits on the departure instead of re-serving.
    assert_eq!(started.elapsed(), Duration::from_millis(1000));
    assert_eq!(scheduler.history().len(), 1);
    assert_eq!(count(&scheduler, LaneId::YLeft), 0);
}

#[tokio::test(start_paused = true)]
async fn random_fill_is_drained_with_one_cycle_per_light_group() {
    let (scheduler, _) = setup(TimingConfig::default());
    {
        let junction = scheduler.junction();
        let mut guard = junction.lock().unwrap();
        guard.randomize_all_lanes(&mut SmallRng::seed_from_u64(3));
    }

    assert_eq!(scheduler.run_cycle_loop().await, LoopExit::Exhausted);
    assert!(!scheduler.junction().lock().unwrap().has_any_vehicles());
    assert!(scheduler.pending_departures().is_empty());

    let history = scheduler.history();
    assert_eq!(history.len(), 4);
    let summary = ReportSummary::from_records(&history);
    for lane in LaneId::ALL {
        assert_eq!(summary.lane_service[&lane], 1, "lane {} served once", lane);
    }
    for group in LightGroup::ALL {
        assert_eq!(signal(&scheduler, group), Signal::Red);
    }
}

#[tokio::test(start_paused = true)]
async fn reset_drops_vehicles_departures_and_lights() {
    let (scheduler, _) = setup(TimingConfig::default());
    add(&scheduler, LaneId::XTopOpposite, VehicleType::Ambulance, 1);
    add(&scheduler, LaneId::YRight, VehicleType::Car, 2);

    scheduler.run_cycle().await;
    assert!(!scheduler.pending_departures().is_empty());

    scheduler.reset_junction();
    assert!(scheduler.pending_departures().is_empty());
    assert!(!scheduler.junction().lock().unwrap().has_any_vehicles());
    for group in LightGroup::ALL {
        assert_eq!(signal(&scheduler, group), Signal::Off);
    }
}

#[tokio::test(start_paused = true)]
async fn vehicles_added_mid_loop_are_served() {
    let (scheduler, _) = setup(short_timings());
    add(&scheduler, LaneId::XTop, VehicleType::Car, 1);

    let s = Arc::clone(&scheduler);
    let running = tokio::spawn(async move { s.run_cycle_loop().await });

    sleep(Duration::from_millis(120)).await;
    add(&scheduler, LaneId::YRightOpposite, VehicleType::Truck, 1);

    assert_eq!(running.await.unwrap(), LoopExit::Exhausted);
    let served: Vec<LaneId> = scheduler
        .history()
        .iter()
        .map(|r| r.prioritized_lane)
        .collect();
    assert_eq!(served, vec![LaneId::XTop, LaneId::YRightOpposite]);
}
