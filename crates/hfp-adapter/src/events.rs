//! Events handed to the rendering layer.

use serde::{Deserialize, Serialize};
use speeding::{SpeedingEpisode, TimeSample};
use uuid::Uuid;

use crate::operators::operator_name;
use crate::subscription::FeedStatus;

/// A derived event for the map UI.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case", rename_all_fields = "camelCase")]
pub enum UiEvent {
    /// Latest position of a vehicle. Emitted for every accepted sample.
    VehicleMoved {
        vehicle_id: String,
        lat: f64,
        lng: f64,
        #[serde(skip_serializing_if = "Option::is_none")]
        speed_kmh: Option<f64>,
        route: String,
        operator_name: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        speed_limit_kmh: Option<u32>,
        #[serde(skip_serializing_if = "Option::is_none")]
        road_name: Option<String>,
        /// Set only while speeding.
        #[serde(skip_serializing_if = "Option::is_none")]
        excess_kmh: Option<f64>,
        speeding: bool,
    },

    /// A vehicle started exceeding the limit.
    EpisodeStarted { vehicle_id: String, episode: EpisodeSnapshot },

    /// An episode lasted long enough to be kept. Carries the archive id that
    /// later `EpisodeExtended` events refer to.
    EpisodeCommitted { vehicle_id: String, episode_id: Uuid, episode: EpisodeSnapshot },

    /// A committed episode grew by one sample.
    EpisodeExtended {
        vehicle_id: String,
        episode_id: Uuid,
        path: Vec<[f64; 2]>,
        time_series: Vec<TimeSample>,
        average_excess_kmh: f64,
        sample_count: u32,
    },

    /// Subscription state with the current totals.
    FeedStatus { status: FeedStatus, total_vehicles_seen: usize, currently_speeding: usize },
}

impl UiEvent {
    /// Vehicle the event is about, if any.
    #[must_use]
    pub fn vehicle_id(&self) -> Option<&str> {
        match self {
            Self::VehicleMoved { vehicle_id, .. }
            | Self::EpisodeStarted { vehicle_id, .. }
            | Self::EpisodeCommitted { vehicle_id, .. }
            | Self::EpisodeExtended { vehicle_id, .. } => Some(vehicle_id),
            Self::FeedStatus { .. } => None,
        }
    }

    /// Event type name as serialized.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::VehicleMoved { .. } => "vehicle-moved",
            Self::EpisodeStarted { .. } => "episode-started",
            Self::EpisodeCommitted { .. } => "episode-committed",
            Self::EpisodeExtended { .. } => "episode-extended",
            Self::FeedStatus { .. } => "feed-status",
        }
    }
}

/// Read-only view of an episode for display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EpisodeSnapshot {
    pub started_at: f64,
    pub route: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub operator_id: Option<u32>,
    pub operator_name: String,
    pub speed_limit_kmh: u32,
    pub sample_count: u32,
    pub average_excess_kmh: f64,
    pub path: Vec<[f64; 2]>,
    pub time_series: Vec<TimeSample>,
}

impl From<&SpeedingEpisode> for EpisodeSnapshot {
    fn from(episode: &SpeedingEpisode) -> Self {
        Self {
            started_at: episode.started_at,
            route: episode.route.clone(),
            operator_id: episode.operator_id,
            operator_name: operator_name(episode.operator_id),
            speed_limit_kmh: episode.last_speed_limit_kmh,
            sample_count: episode.sample_count,
            average_excess_kmh: episode.average_excess_kmh(),
            path: episode.path.clone(),
            time_series: episode.time_series.clone(),
        }
    }
}
