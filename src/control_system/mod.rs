pub mod cycle_scheduler;
pub mod traffic_lights;
