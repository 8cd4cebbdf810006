use std::env;

/// km/h over the limit before a sample counts as speeding.
const SPEEDING_THRESHOLD: f64 = 3.0;

/// Seconds of sustained excess before an episode is committed.
const SPEEDING_DURATION: f64 = 3.0;

/// Episode detection thresholds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrackerConfig {
    pub threshold_kmh: f64,
    pub duration_secs: f64,
}

impl TrackerConfig {
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            threshold_kmh: env_f64("SPEEDING_THRESHOLD", SPEEDING_THRESHOLD),
            duration_secs: env_f64("SPEEDING_DURATION", SPEEDING_DURATION),
        }
    }
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self { threshold_kmh: SPEEDING_THRESHOLD, duration_secs: SPEEDING_DURATION }
    }
}

fn env_f64(key: &str, default: f64) -> f64 {
    env::var(key)
        .ok()
        .and_then(|value| value.parse::<f64>().ok())
        .filter(|value| value.is_finite() && *value >= 0.0)
        .unwrap_or(default)
}
