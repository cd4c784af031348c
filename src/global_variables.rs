// Phase timings (ms)
pub const GREEN_DURATION_MS: u64 = 1000;
pub const YELLOW_DURATION_MS: u64 = 150;
pub const INTER_CYCLE_DELAY_MS: u64 = 500;
pub const DEPARTURE_DURATION_MS: u64 = 5000;

// Departure translation magnitude
pub const VIEWPORT_WIDTH: f64 = 1280.0;
pub const VIEWPORT_HEIGHT: f64 = 720.0;

// Random fill: vehicles added per lane
pub const RANDOM_FILL_MIN: usize = 1;
pub const RANDOM_FILL_MAX: usize = 3;

// Monitoring output files
pub const CYCLE_HISTORY_CSV: &str = "cycle_history.csv";
pub const JUNCTION_SNAPSHOT_PNG: &str = "junction_snapshot.png";
