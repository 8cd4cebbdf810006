use std::env;

/// Grid cell size in degrees (~200 m).
const GRID_SIZE: f64 = 0.002;

/// Maximum distorted distance in degrees for a lookup to match (~55 m).
const MATCH_RADIUS: f64 = 0.0005;

/// Longitude compression at ~60°N.
const LNG_SCALE: f64 = 0.55;

/// Spatial index tuning.
///
/// The defaults are calibrated for the Helsinki region. The distance metric
/// is a flat-earth approximation and is not valid far from ~60°N.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IndexConfig {
    pub grid_size: f64,
    pub match_radius: f64,
    pub lng_scale: f64,
}

impl IndexConfig {
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            grid_size: env_f64("GRID_SIZE", GRID_SIZE),
            match_radius: env_f64("MATCH_RADIUS", MATCH_RADIUS),
            lng_scale: env_f64("LNG_SCALE", LNG_SCALE),
        }
    }
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self { grid_size: GRID_SIZE, match_radius: MATCH_RADIUS, lng_scale: LNG_SCALE }
    }
}

fn env_f64(key: &str, default: f64) -> f64 {
    env::var(key)
        .ok()
        .and_then(|value| value.parse::<f64>().ok())
        .filter(|value| value.is_finite() && *value > 0.0)
        .unwrap_or(default)
}
