//! Bucketed grid over road sample points.
//!
//! Lookups scan the 3×3 block of cells around the query point and pick the
//! sample minimising `dlat² + (lng_scale·dlng)²`. A sample that is closer
//! than the best in-window candidate but lies outside the 3×3 window is
//! missed. With the default cell size (0.002°) the window always covers the
//! 0.0005° match radius, so this only matters when the grid is configured
//! finer than the radius.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::config::IndexConfig;
use crate::road::RoadSegment;

/// A single road vertex with the limit of the road it belongs to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoadSamplePoint {
    pub lat: f64,
    pub lng: f64,
    pub speed_limit_kmh: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub road_name: Option<String>,
}

/// Grid cell coordinates: `(floor(lat / size), floor(lng / size))`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GridKey {
    pub row: i64,
    pub col: i64,
}

impl GridKey {
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn of(lat: f64, lng: f64, grid_size: f64) -> Self {
        Self { row: (lat / grid_size).floor() as i64, col: (lng / grid_size).floor() as i64 }
    }

    const fn offset(self, d_row: i64, d_col: i64) -> Self {
        Self { row: self.row.saturating_add(d_row), col: self.col.saturating_add(d_col) }
    }
}

/// Build-once, read-many nearest speed limit index.
#[derive(Debug, Clone, Default)]
pub struct SpatialIndex {
    config: IndexConfig,
    cells: HashMap<GridKey, Vec<RoadSamplePoint>>,
    len: usize,
}

impl SpatialIndex {
    /// Build the index from road segments.
    ///
    /// Segments without a usable `maxspeed` or with fewer than two vertices
    /// are skipped. Every other vertex is inserted into the cell its own
    /// coordinates hash to, preserving dataset order within the cell.
    #[must_use]
    pub fn build(roads: &[RoadSegment], config: IndexConfig) -> Self {
        let mut index = Self { config, cells: HashMap::new(), len: 0 };
        let mut skipped = 0_usize;

        for road in roads {
            let Some(limit) = road.speed_limit_kmh().filter(|_| road.is_indexable()) else {
                skipped += 1;
                continue;
            };
            for &[lat, lng] in &road.coords {
                let key = GridKey::of(lat, lng, config.grid_size);
                index.cells.entry(key).or_default().push(RoadSamplePoint {
                    lat,
                    lng,
                    speed_limit_kmh: limit,
                    road_name: road.name.clone(),
                });
                index.len += 1;
            }
        }

        tracing::info!(
            points = index.len,
            cells = index.cells.len(),
            skipped_roads = skipped,
            "spatial grid built"
        );
        index
    }

    /// Nearest known speed limit to `(lat, lng)`, or `None` when nothing lies
    /// within the match radius.
    #[must_use]
    pub fn lookup(&self, lat: f64, lng: f64) -> Option<&RoadSamplePoint> {
        let centre = GridKey::of(lat, lng, self.config.grid_size);
        let mut best: Option<(&RoadSamplePoint, f64)> = None;

        for d_row in -1..=1 {
            for d_col in -1..=1 {
                let Some(cell) = self.cells.get(&centre.offset(d_row, d_col)) else {
                    continue;
                };
                for point in cell {
                    let dist = self.dist_sq(lat, lng, point);
                    // strict: first encountered wins ties
                    if best.is_none_or(|(_, best_dist)| dist < best_dist) {
                        best = Some((point, dist));
                    }
                }
            }
        }

        let max_sq = self.config.match_radius * self.config.match_radius;
        best.filter(|(_, dist)| *dist <= max_sq).map(|(point, _)| point)
    }

    /// Speed limit of the nearest sample point.
    #[must_use]
    pub fn speed_limit(&self, lat: f64, lng: f64) -> Option<u32> {
        self.lookup(lat, lng).map(|point| point.speed_limit_kmh)
    }

    fn dist_sq(&self, lat: f64, lng: f64, point: &RoadSamplePoint) -> f64 {
        let d_lat = lat - point.lat;
        let d_lng = (lng - point.lng) * self.config.lng_scale;
        d_lat * d_lat + d_lng * d_lng
    }

    /// Points stored in a cell, in insertion order.
    #[must_use]
    pub fn cell(&self, key: GridKey) -> &[RoadSamplePoint] {
        self.cells.get(&key).map_or(&[], Vec::as_slice)
    }

    /// Populated cells.
    pub fn cells(&self) -> impl Iterator<Item = (&GridKey, &[RoadSamplePoint])> {
        self.cells.iter().map(|(key, points)| (key, points.as_slice()))
    }

    #[must_use]
    pub const fn config(&self) -> &IndexConfig {
        &self.config
    }

    /// Total number of sample points.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.len
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grid_key_floors_negative_coordinates() {
        let key = GridKey::of(-36.8431, 174.7666, 0.002);
        assert_eq!(key.row, (-36.8431_f64 / 0.002).floor() as i64);
        assert!(key.row < 0);
        assert_eq!(GridKey::of(0.0019, 0.0, 0.002), GridKey { row: 0, col: 0 });
        assert_eq!(GridKey::of(-0.0001, 0.0, 0.002), GridKey { row: -1, col: 0 });
    }

    #[test]
    fn distance_is_scaled_in_longitude() {
        let index = SpatialIndex::default();
        let point =
            RoadSamplePoint { lat: 60.0, lng: 25.0, speed_limit_kmh: 50, road_name: None };
        let d = index.dist_sq(60.0, 25.001, &point);
        assert!((d - (0.001_f64 * 0.55).powi(2)).abs() < 1e-15);
    }

    #[test]
    fn extreme_coordinates_do_not_overflow() {
        let index = SpatialIndex::build(
            &[RoadSegment {
                maxspeed: Some("50".to_string()),
                coords: vec![[60.0, 25.0], [60.001, 25.0]],
                ..RoadSegment::default()
            }],
            IndexConfig::default(),
        );
        assert_eq!(index.lookup(1e20, 24.9), None);
        assert_eq!(index.lookup(-1e20, -1e20), None);
        assert_eq!(index.lookup(f64::NAN, 25.0), None);
    }
}
