use std::env;
use std::path::PathBuf;

use chrono_tz::Tz;
use road_network::IndexConfig;
use speeding::TrackerConfig;

/// Application configuration derived from the host environment.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub index: IndexConfig,
    pub tracker: TrackerConfig,
    pub roads_path: PathBuf,
    pub hfp_topic: String,
    pub events_topic: String,
    pub timezone: Tz,
}

impl Config {
    #[must_use]
    pub fn from_env() -> Self {
        let timezone = env::var("TIMEZONE")
            .ok()
            .and_then(|value| value.parse::<Tz>().ok())
            .unwrap_or(chrono_tz::Europe::Helsinki);

        Self {
            index: IndexConfig::from_env(),
            tracker: TrackerConfig::from_env(),
            roads_path: env::var("ROADS_PATH")
                .map_or_else(|_| PathBuf::from("helsinki-speeds.json"), PathBuf::from),
            hfp_topic: env::var("HFP_TOPIC")
                .unwrap_or_else(|_| "/hfp/v2/journey/ongoing/vp/bus/#".to_string()),
            events_topic: env::var("EVENTS_TOPIC")
                .unwrap_or_else(|_| "speedwatch-ui-events.v1".to_string()),
            timezone,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            index: IndexConfig::default(),
            tracker: TrackerConfig::default(),
            roads_path: PathBuf::from("helsinki-speeds.json"),
            hfp_topic: "/hfp/v2/journey/ongoing/vp/bus/#".to_string(),
            events_topic: "speedwatch-ui-events.v1".to_string(),
            timezone: chrono_tz::Europe::Helsinki,
        }
    }
}
