//! Finalized episodes.
//!
//! The tracker forgets an episode as soon as its vehicle slows down. The
//! archive keeps every committed episode for the lifetime of the process,
//! newest first, and answers the filter and sort queries of the episode list.

use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::ops::RangeInclusive;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::episode::SpeedingEpisode;

/// A committed episode as kept by the archive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinalizedEpisode {
    pub id: Uuid,
    pub vehicle_id: String,
    pub episode: SpeedingEpisode,
    pub archived_at: DateTime<Utc>,
}

impl FinalizedEpisode {
    #[must_use]
    pub fn average_excess_kmh(&self) -> f64 {
        self.episode.average_excess_kmh()
    }

    /// Episode length in samples. The feed reports once per second, so this
    /// doubles as a duration in seconds.
    #[must_use]
    pub const fn duration(&self) -> u32 {
        self.episode.sample_count
    }
}

/// Episode list ordering.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SortOrder {
    /// Most recently archived first.
    #[default]
    Recent,
    /// Highest average excess first.
    Excess,
    /// Longest first.
    Duration,
}

/// Episode list filter. Unset fields match everything.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EpisodeFilter {
    /// Case-insensitive route prefix.
    pub route_prefix: Option<String>,
    pub operator_id: Option<u32>,
    /// Case-insensitive vehicle id prefix.
    pub vehicle_prefix: Option<String>,
    pub average_excess_kmh: Option<RangeInclusive<f64>>,
    pub limit_kmh: Option<RangeInclusive<u32>>,
    pub duration: Option<RangeInclusive<u32>>,
}

impl EpisodeFilter {
    #[must_use]
    pub fn matches(&self, record: &FinalizedEpisode) -> bool {
        let episode = &record.episode;

        if let Some(prefix) = &self.route_prefix
            && !starts_with_ignore_case(&episode.route, prefix)
        {
            return false;
        }
        if self.operator_id.is_some() && self.operator_id != episode.operator_id {
            return false;
        }
        if let Some(prefix) = &self.vehicle_prefix
            && !starts_with_ignore_case(&record.vehicle_id, prefix)
        {
            return false;
        }
        if let Some(range) = &self.average_excess_kmh
            && !range.contains(&record.average_excess_kmh())
        {
            return false;
        }
        if let Some(range) = &self.limit_kmh
            && !range.contains(&episode.last_speed_limit_kmh)
        {
            return false;
        }
        if let Some(range) = &self.duration
            && !range.contains(&record.duration())
        {
            return false;
        }
        true
    }
}

fn starts_with_ignore_case(value: &str, prefix: &str) -> bool {
    value.to_lowercase().starts_with(&prefix.trim().to_lowercase())
}

/// Committed episodes, newest first.
#[derive(Debug, Clone, Default)]
pub struct EpisodeArchive {
    records: Vec<FinalizedEpisode>,
}

impl EpisodeArchive {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Archive a freshly committed episode and return its id.
    pub fn commit(
        &mut self, vehicle_id: &str, episode: &SpeedingEpisode, archived_at: DateTime<Utc>,
    ) -> Uuid {
        let id = Uuid::new_v4();
        self.records.insert(0, FinalizedEpisode {
            id,
            vehicle_id: vehicle_id.to_string(),
            episode: episode.clone(),
            archived_at,
        });
        id
    }

    /// Replace the snapshot of an archived episode that is still being
    /// extended. Returns `false` when `id` is unknown.
    pub fn extend(&mut self, id: Uuid, episode: &SpeedingEpisode) -> bool {
        let Some(record) = self.records.iter_mut().find(|record| record.id == id) else {
            return false;
        };
        record.episode.clone_from(episode);
        true
    }

    #[must_use]
    pub fn get(&self, id: Uuid) -> Option<&FinalizedEpisode> {
        self.records.iter().find(|record| record.id == id)
    }

    /// All records, newest first.
    pub fn iter(&self) -> impl Iterator<Item = &FinalizedEpisode> {
        self.records.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Records matching `filter`, in `order`. Equal keys keep archive order.
    #[must_use]
    pub fn query(&self, filter: &EpisodeFilter, order: SortOrder) -> Vec<&FinalizedEpisode> {
        let mut result: Vec<_> = self.records.iter().filter(|record| filter.matches(record)).collect();
        match order {
            SortOrder::Recent => result.sort_by(|a, b| b.archived_at.cmp(&a.archived_at)),
            SortOrder::Excess => {
                result.sort_by(|a, b| b.average_excess_kmh().total_cmp(&a.average_excess_kmh()));
            }
            SortOrder::Duration => result.sort_by(|a, b| b.duration().cmp(&a.duration())),
        }
        result
    }

    /// Distinct routes, numeric routes first in numeric order, then the rest
    /// alphabetically.
    #[must_use]
    pub fn routes(&self) -> Vec<&str> {
        let mut routes: Vec<&str> = self
            .records
            .iter()
            .map(|record| record.episode.route.as_str())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        routes.sort_by(|a, b| compare_routes(a, b));
        routes
    }

    /// Distinct operator ids, ascending.
    #[must_use]
    pub fn operators(&self) -> Vec<u32> {
        self.records
            .iter()
            .filter_map(|record| record.episode.operator_id)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Distinct vehicle ids, sorted.
    #[must_use]
    pub fn vehicles(&self) -> Vec<&str> {
        self.records
            .iter()
            .map(|record| record.vehicle_id.as_str())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }
}

fn compare_routes(a: &str, b: &str) -> Ordering {
    match (a.parse::<u64>(), b.parse::<u64>()) {
        (Ok(x), Ok(y)) => x.cmp(&y).then_with(|| a.cmp(b)),
        (Ok(_), Err(_)) => Ordering::Less,
        (Err(_), Ok(_)) => Ordering::Greater,
        (Err(_), Err(_)) => a.cmp(b),
    }
}
