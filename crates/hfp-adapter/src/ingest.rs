//! Ingest loop.
//!
//! Each accepted message is handled to completion before the next: parse,
//! look up the nearest limit, fold into the tracker, update the vehicle's
//! marker and counters, then emit UI events. A bad message is rejected
//! without touching any state.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use realtime::{Clock, Result, missing_field};
use road_network::SpatialIndex;
use serde::{Deserialize, Serialize};
use speeding::{
    EpisodeArchive, EpisodeTracker, SpeedingEpisode, TrackerConfig, Transition,
    VehiclePositionSample, excess_kmh,
};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::events::{EpisodeSnapshot, UiEvent};
use crate::hfp::HfpMessage;
use crate::operators::operator_name;
use crate::subscription::Subscription;

/// Last known state of a vehicle on the map.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VehicleMarker {
    pub lat: f64,
    pub lng: f64,
    pub speeding: bool,
}

/// Consumes position messages and maintains all derived state.
pub struct IngestLoop<C: Clock + ?Sized> {
    index: SpatialIndex,
    tracker: EpisodeTracker,
    archive: EpisodeArchive,
    markers: HashMap<String, VehicleMarker>,
    // archive id of each vehicle's live committed episode; like the tracker,
    // an entry is only dropped by the vehicle's next non-speeding sample
    live_archive: HashMap<String, Uuid>,
    currently_speeding: usize,
    subscription: Subscription,
    clock: Arc<C>,
    timezone: Tz,
}

impl<C: Clock + ?Sized> IngestLoop<C> {
    #[must_use]
    pub fn new(
        index: SpatialIndex, config: TrackerConfig, subscription: Subscription, clock: Arc<C>,
    ) -> Self {
        let tracker = EpisodeTracker::new(config);
        info!(
            road_points = index.len(),
            grid_size = index.config().grid_size,
            match_radius = index.config().match_radius,
            threshold_kmh = tracker.config().threshold_kmh,
            duration_secs = tracker.config().duration_secs,
            topic = %subscription.topic(),
            "ingest loop ready"
        );

        Self {
            index,
            tracker,
            archive: EpisodeArchive::new(),
            markers: HashMap::new(),
            live_archive: HashMap::new(),
            currently_speeding: 0,
            subscription,
            clock,
            timezone: chrono_tz::Europe::Helsinki,
        }
    }

    /// Time zone used for human readable times in logs.
    #[must_use]
    pub fn with_timezone(mut self, timezone: Tz) -> Self {
        self.timezone = timezone;
        self
    }

    /// Process one raw feed payload.
    ///
    /// Returns the events derived from it: at most one episode event
    /// followed by `vehicle-moved`. Nothing is returned while paused.
    ///
    /// # Errors
    ///
    /// Returns `Error::MalformedMessage` or `Error::MissingField` when the
    /// payload cannot be used. No state is changed in that case.
    pub fn handle(&mut self, payload: &[u8]) -> Result<Vec<UiEvent>> {
        if !self.subscription.is_active() {
            debug!("subscription paused, dropping message");
            return Ok(vec![]);
        }

        let vp = HfpMessage::parse(payload)?;
        let Some((lat, lng)) = vp.position() else {
            return Err(missing_field!("lat"));
        };

        let sample = VehiclePositionSample {
            vehicle_id: vp.vehicle_id(),
            lat,
            lng,
            timestamp_secs: self.clock.now_secs(),
            speed_kmh: vp.speed_kmh(),
            route: vp.route(),
            operator_id: vp.oper,
        };
        let nearest = self.index.lookup(lat, lng);
        let limit = nearest.map(|point| point.speed_limit_kmh);
        let road_name = nearest.and_then(|point| point.road_name.clone());

        let transition = self.tracker.update(&sample, limit);
        let speeding = transition != Transition::NoOp;

        let mut events = Vec::with_capacity(2);
        if let Some(event) = self.episode_event(&sample.vehicle_id, transition) {
            events.push(event);
        }

        self.update_marker(&sample.vehicle_id, lat, lng, speeding);

        events.push(UiEvent::VehicleMoved {
            vehicle_id: sample.vehicle_id,
            lat,
            lng,
            speed_kmh: sample.speed_kmh,
            route: sample.route,
            operator_name: operator_name(sample.operator_id),
            speed_limit_kmh: limit,
            road_name,
            excess_kmh: speeding.then(|| excess_kmh(sample.speed_kmh, limit)),
            speeding,
        });

        Ok(events)
    }

    fn episode_event(&mut self, vehicle_id: &str, transition: Transition) -> Option<UiEvent> {
        match transition {
            Transition::NoOp => {
                self.live_archive.remove(vehicle_id);
                None
            }
            Transition::Accrued => None,
            Transition::Started => {
                let episode = self.tracker.episode(vehicle_id)?;
                Some(UiEvent::EpisodeStarted {
                    vehicle_id: vehicle_id.to_string(),
                    episode: EpisodeSnapshot::from(episode),
                })
            }
            Transition::Committed => {
                let episode = self.tracker.episode(vehicle_id)?;
                let episode_id = self.archive.commit(vehicle_id, episode, self.clock.now_utc());
                self.live_archive.insert(vehicle_id.to_string(), episode_id);
                log_commit(vehicle_id, episode, self.timezone);

                Some(UiEvent::EpisodeCommitted {
                    vehicle_id: vehicle_id.to_string(),
                    episode_id,
                    episode: EpisodeSnapshot::from(episode),
                })
            }
            Transition::Extended => {
                let episode = self.tracker.episode(vehicle_id)?;
                let Some(&episode_id) = self.live_archive.get(vehicle_id) else {
                    warn!(vehicle_id = %vehicle_id, "extended episode was never archived");
                    return None;
                };
                self.archive.extend(episode_id, episode);

                Some(UiEvent::EpisodeExtended {
                    vehicle_id: vehicle_id.to_string(),
                    episode_id,
                    path: episode.path.clone(),
                    time_series: episode.time_series.clone(),
                    average_excess_kmh: episode.average_excess_kmh(),
                    sample_count: episode.sample_count,
                })
            }
        }
    }

    // The speeding counter only moves when a marker's flag flips.
    fn update_marker(&mut self, vehicle_id: &str, lat: f64, lng: f64, speeding: bool) {
        let was_speeding = if let Some(marker) = self.markers.get_mut(vehicle_id) {
            marker.lat = lat;
            marker.lng = lng;
            let was = marker.speeding;
            marker.speeding = speeding;
            was
        } else {
            self.markers.insert(vehicle_id.to_string(), VehicleMarker { lat, lng, speeding });
            info!(gauge.vehicles_seen = self.markers.len());
            false
        };

        match (was_speeding, speeding) {
            (false, true) => self.currently_speeding += 1,
            (true, false) => self.currently_speeding = self.currently_speeding.saturating_sub(1),
            _ => return,
        }
        info!(gauge.currently_speeding = self.currently_speeding);
    }

    /// Stop accepting messages. Returns a `feed-status` event when the state
    /// changed.
    pub fn pause(&mut self) -> Option<UiEvent> {
        self.subscription.pause().then(|| self.status_event())
    }

    /// Accept messages again. Returns a `feed-status` event when the state
    /// changed.
    pub fn resume(&mut self) -> Option<UiEvent> {
        self.subscription.resume().then(|| self.status_event())
    }

    /// The transport connected.
    pub fn connected(&mut self) -> Option<UiEvent> {
        self.subscription.connected().then(|| self.status_event())
    }

    /// The transport failed. In-memory state is kept.
    pub fn failed(&mut self, reason: &str) -> Option<UiEvent> {
        warn!(reason = %reason, topic = %self.subscription.topic(), "feed transport failure");
        self.subscription.failed(reason).then(|| self.status_event())
    }

    /// Current subscription status with totals.
    #[must_use]
    pub fn status_event(&self) -> UiEvent {
        UiEvent::FeedStatus {
            status: self.subscription.status().clone(),
            total_vehicles_seen: self.total_vehicles_seen(),
            currently_speeding: self.currently_speeding,
        }
    }

    #[must_use]
    pub fn total_vehicles_seen(&self) -> usize {
        self.markers.len()
    }

    #[must_use]
    pub const fn currently_speeding(&self) -> usize {
        self.currently_speeding
    }

    #[must_use]
    pub fn marker(&self, vehicle_id: &str) -> Option<&VehicleMarker> {
        self.markers.get(vehicle_id)
    }

    pub fn markers(&self) -> impl Iterator<Item = (&str, &VehicleMarker)> {
        self.markers.iter().map(|(id, marker)| (id.as_str(), marker))
    }

    #[must_use]
    pub const fn tracker(&self) -> &EpisodeTracker {
        &self.tracker
    }

    #[must_use]
    pub const fn archive(&self) -> &EpisodeArchive {
        &self.archive
    }

    #[must_use]
    pub const fn index(&self) -> &SpatialIndex {
        &self.index
    }

    #[must_use]
    pub const fn subscription(&self) -> &Subscription {
        &self.subscription
    }
}

fn log_commit(vehicle_id: &str, episode: &SpeedingEpisode, tz: Tz) {
    info!(
        monotonic_counter.episodes_archived = 1,
        vehicle = %vehicle_id,
        route = %episode.route,
        operator = %operator_name(episode.operator_id),
        average_excess_kmh = episode.average_excess_kmh(),
        limit_kmh = episode.last_speed_limit_kmh,
        started = %format_local(episode.started_at, tz),
        "speeding episode committed"
    );
}

#[allow(clippy::cast_possible_truncation)]
fn format_local(secs: f64, tz: Tz) -> String {
    DateTime::<Utc>::from_timestamp_millis((secs * 1000.0).round() as i64).map_or_else(
        || String::from("unknown"),
        |at| at.with_timezone(&tz).format("%Y-%m-%d %H:%M:%S %Z").to_string(),
    )
}
