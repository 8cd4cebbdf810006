//! Per-vehicle speeding state machine.
//!
//! ```text
//! Idle ──speeding──▶ Accruing ──elapsed ≥ duration──▶ Committed ─┐
//!  ▲                    │                                 ▲      │ speeding
//!  └────not speeding────┴─────────────────────────────────┴──────┘
//! ```

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::TrackerConfig;
use crate::episode::{Phase, SpeedingEpisode, VehiclePositionSample, excess_kmh};

/// Outcome of folding one sample into a vehicle's state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Transition {
    /// Not speeding or limit unknown. Any live episode was dropped.
    NoOp,
    /// A new episode was opened.
    Started,
    /// An uncommitted episode was extended.
    Accrued,
    /// The episode just reached the duration threshold.
    Committed,
    /// An already committed episode was extended.
    Extended,
}

/// A vehicle's position in the state machine.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum VehicleState<'a> {
    Idle,
    Accruing(&'a SpeedingEpisode),
    Committed(&'a SpeedingEpisode),
}

/// Owns the live episode of every vehicle currently speeding.
///
/// An episode only ends on a later sample from the same vehicle. A vehicle
/// that leaves the feed mid-episode keeps its entry, so the map is bounded
/// by the fleet size rather than by the number of vehicles speeding now.
#[derive(Debug, Clone, Default)]
pub struct EpisodeTracker {
    config: TrackerConfig,
    live: HashMap<String, SpeedingEpisode>,
}

impl EpisodeTracker {
    #[must_use]
    pub fn new(config: TrackerConfig) -> Self {
        Self { config, live: HashMap::new() }
    }

    /// Fold a sample into the state of `sample.vehicle_id`.
    ///
    /// `speed_limit_kmh` is the result of the nearest-limit lookup; `None`
    /// means no road is close enough and the sample can never be speeding.
    /// A missing or non-finite speed is not speeding either.
    pub fn update(
        &mut self, sample: &VehiclePositionSample, speed_limit_kmh: Option<u32>,
    ) -> Transition {
        let vehicle_id = sample.vehicle_id.as_str();

        let speed = sample.speed_kmh.filter(|speed| speed.is_finite());
        let (Some(speed), Some(limit)) = (speed, speed_limit_kmh) else {
            self.end(vehicle_id);
            return Transition::NoOp;
        };
        let excess = excess_kmh(Some(speed), Some(limit));
        if excess <= self.config.threshold_kmh {
            self.end(vehicle_id);
            return Transition::NoOp;
        }

        let Some(episode) = self.live.get_mut(vehicle_id) else {
            debug!(
                monotonic_counter.episodes_started = 1,
                vehicle_id = %vehicle_id,
                excess_kmh = excess,
                limit_kmh = limit,
                "speeding episode started"
            );
            self.live.insert(vehicle_id.to_string(), SpeedingEpisode::start(sample, speed, limit));
            return Transition::Started;
        };

        episode.accrue(sample, speed, limit);

        match episode.phase {
            Phase::Committed => Transition::Extended,
            Phase::Accruing if episode.elapsed_secs() >= self.config.duration_secs => {
                episode.phase = Phase::Committed;
                debug!(
                    monotonic_counter.episodes_committed = 1,
                    vehicle_id = %vehicle_id,
                    samples = episode.sample_count,
                    average_excess_kmh = episode.average_excess_kmh(),
                    "speeding episode committed"
                );
                Transition::Committed
            }
            Phase::Accruing => Transition::Accrued,
        }
    }

    fn end(&mut self, vehicle_id: &str) {
        if let Some(episode) = self.live.remove(vehicle_id) {
            debug!(
                vehicle_id = %vehicle_id,
                committed = episode.is_committed(),
                samples = episode.sample_count,
                "speeding episode ended"
            );
        }
    }

    /// The live episode of a vehicle, if it is speeding.
    #[must_use]
    pub fn episode(&self, vehicle_id: &str) -> Option<&SpeedingEpisode> {
        self.live.get(vehicle_id)
    }

    #[must_use]
    pub fn state(&self, vehicle_id: &str) -> VehicleState<'_> {
        match self.live.get(vehicle_id) {
            None => VehicleState::Idle,
            Some(episode) if episode.is_committed() => VehicleState::Committed(episode),
            Some(episode) => VehicleState::Accruing(episode),
        }
    }

    /// Number of vehicles with a live episode.
    #[must_use]
    pub fn live_count(&self) -> usize {
        self.live.len()
    }

    #[must_use]
    pub const fn config(&self) -> &TrackerConfig {
        &self.config
    }
}
