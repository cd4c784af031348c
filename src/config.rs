use crate::global_variables::{
    DEPARTURE_DURATION_MS, GREEN_DURATION_MS, INTER_CYCLE_DELAY_MS, VIEWPORT_HEIGHT,
    VIEWPORT_WIDTH, YELLOW_DURATION_MS,
};
use crate::junction_engine::layout::Viewport;
use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Phase timings for the cycle scheduler. Missing fields in a config file
/// fall back to the built-in constants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    pub green_ms: u64,
    pub yellow_ms: u64,
    pub inter_cycle_ms: u64,
    pub departure_ms: u64,
    pub viewport_width: f64,
    pub viewport_height: f64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            green_ms: GREEN_DURATION_MS,
            yellow_ms: YELLOW_DURATION_MS,
            inter_cycle_ms: INTER_CYCLE_DELAY_MS,
            departure_ms: DEPARTURE_DURATION_MS,
            viewport_width: VIEWPORT_WIDTH,
            viewport_height: VIEWPORT_HEIGHT,
        }
    }
}

impl TimingConfig {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let config = Self::from_json(&content)?;
        log::info!("Loaded timing config from {}", path.as_ref().display());
        Ok(config)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let config: TimingConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let durations = [
            ("green_ms", self.green_ms),
            ("yellow_ms", self.yellow_ms),
            ("inter_cycle_ms", self.inter_cycle_ms),
            ("departure_ms", self.departure_ms),
        ];
        for (name, value) in durations {
            if value == 0 {
                return Err(anyhow!("{} must be greater than zero", name));
            }
        }
        if !(self.viewport_width > 0.0 && self.viewport_height > 0.0) {
            return Err(anyhow!(
                "viewport must be positive, got {}x{}",
                self.viewport_width,
                self.viewport_height
            ));
        }
        Ok(())
    }

    pub fn green(&self) -> Duration {
        Duration::from_millis(self.green_ms)
    }

    pub fn yellow(&self) -> Duration {
        Duration::from_millis(self.yellow_ms)
    }

    pub fn inter_cycle(&self) -> Duration {
        Duration::from_millis(self.inter_cycle_ms)
    }

    pub fn departure(&self) -> Duration {
        Duration::from_millis(self.departure_ms)
    }

    pub fn viewport(&self) -> Viewport {
        Viewport {
            width: self.viewport_width,
            height: self.viewport_height,
        }
    }
}
