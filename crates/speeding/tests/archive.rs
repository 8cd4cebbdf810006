#![allow(missing_docs)]

use chrono::{DateTime, TimeZone, Utc};
use pretty_assertions::assert_eq;
use speeding::{
    EpisodeArchive, EpisodeFilter, EpisodeTracker, SortOrder, SpeedingEpisode, Transition,
    VehiclePositionSample,
};

fn at(secs: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(1_760_000_000 + secs, 0).single().expect("valid timestamp")
}

// Drive a tracker through `samples` seconds at `speed` and return the
// committed episode.
fn episode(route: &str, oper: Option<u32>, speed: f64, limit: u32, samples: u32) -> SpeedingEpisode {
    let mut tracker = EpisodeTracker::default();
    for t in 0..samples {
        let sample = VehiclePositionSample {
            vehicle_id: "v".to_string(),
            lat: 60.2,
            lng: 24.9,
            timestamp_secs: f64::from(t),
            speed_kmh: Some(speed),
            route: route.to_string(),
            operator_id: oper,
        };
        tracker.update(&sample, Some(limit));
    }
    tracker.episode("v").cloned().expect("live episode")
}

fn archive() -> EpisodeArchive {
    let mut archive = EpisodeArchive::new();
    archive.commit("22_801", &episode("550", Some(22), 60.0, 50, 4), at(0));
    archive.commit("12_1502", &episode("23", Some(12), 45.0, 30, 10), at(10));
    archive.commit("22_805", &episode("550B", Some(22), 48.0, 40, 6), at(20));
    archive.commit("40_411", &episode("9", Some(40), 70.0, 40, 5), at(30));
    archive
}

fn vehicles(records: &[&speeding::FinalizedEpisode]) -> Vec<String> {
    records.iter().map(|r| r.vehicle_id.clone()).collect()
}

// Should keep records newest first.
#[test]
fn newest_first() {
    let archive = archive();
    assert_eq!(archive.len(), 4);
    let order: Vec<_> = archive.iter().map(|r| r.vehicle_id.as_str()).collect();
    assert_eq!(order, vec!["40_411", "22_805", "12_1502", "22_801"]);
}

// Should replace the snapshot of an archived episode as it is extended.
#[test]
fn extend_replaces_snapshot() {
    let mut tracker = EpisodeTracker::default();
    let mut archive = EpisodeArchive::new();
    let mut id = None;

    for t in 0..8 {
        let sample = VehiclePositionSample {
            vehicle_id: "22_801".to_string(),
            lat: 60.2,
            lng: 24.9,
            timestamp_secs: f64::from(t),
            speed_kmh: Some(55.0),
            route: "550".to_string(),
            operator_id: Some(22),
        };
        match tracker.update(&sample, Some(40)) {
            Transition::Committed => {
                let episode = tracker.episode("22_801").expect("live");
                id = Some(archive.commit("22_801", episode, at(t.into())));
            }
            Transition::Extended => {
                let episode = tracker.episode("22_801").expect("live");
                assert!(archive.extend(id.expect("committed first"), episode));
            }
            _ => {}
        }
    }

    assert_eq!(archive.len(), 1);
    let record = archive.get(id.expect("committed")).expect("archived");
    assert_eq!(record.duration(), 8);
    assert!((record.average_excess_kmh() - 15.0).abs() < 1e-9);

    // slowing down leaves the record as final
    let slow = VehiclePositionSample {
        vehicle_id: "22_801".to_string(),
        lat: 60.2,
        lng: 24.9,
        timestamp_secs: 8.0,
        speed_kmh: Some(30.0),
        route: "550".to_string(),
        operator_id: Some(22),
    };
    assert_eq!(tracker.update(&slow, Some(40)), Transition::NoOp);
    assert_eq!(archive.get(id.expect("committed")).expect("archived").duration(), 8);
}

// Should report unknown ids.
#[test]
fn extend_unknown() {
    let mut archive = archive();
    let snapshot = episode("1", None, 60.0, 50, 4);
    assert!(!archive.extend(uuid::Uuid::nil(), &snapshot));
}

// Should filter on each criterion.
#[test]
fn filters() {
    let archive = archive();

    let route = EpisodeFilter { route_prefix: Some("550b".to_string()), ..Default::default() };
    assert_eq!(vehicles(&archive.query(&route, SortOrder::Recent)), vec!["22_805"]);

    let route = EpisodeFilter { route_prefix: Some("550".to_string()), ..Default::default() };
    assert_eq!(vehicles(&archive.query(&route, SortOrder::Recent)), vec!["22_805", "22_801"]);

    let oper = EpisodeFilter { operator_id: Some(12), ..Default::default() };
    assert_eq!(vehicles(&archive.query(&oper, SortOrder::Recent)), vec!["12_1502"]);

    let veh = EpisodeFilter { vehicle_prefix: Some("22_".to_string()), ..Default::default() };
    assert_eq!(vehicles(&archive.query(&veh, SortOrder::Recent)), vec!["22_805", "22_801"]);

    let excess = EpisodeFilter { average_excess_kmh: Some(10.0..=20.0), ..Default::default() };
    assert_eq!(vehicles(&archive.query(&excess, SortOrder::Recent)), vec!["12_1502", "22_801"]);

    let limit = EpisodeFilter { limit_kmh: Some(40..=50), ..Default::default() };
    assert_eq!(vehicles(&archive.query(&limit, SortOrder::Recent)), vec![
        "40_411", "22_805", "22_801"
    ]);

    let duration = EpisodeFilter { duration: Some(5..=6), ..Default::default() };
    assert_eq!(vehicles(&archive.query(&duration, SortOrder::Recent)), vec!["40_411", "22_805"]);

    let combined = EpisodeFilter {
        operator_id: Some(22),
        duration: Some(5..=100),
        ..Default::default()
    };
    assert_eq!(vehicles(&archive.query(&combined, SortOrder::Recent)), vec!["22_805"]);

    assert_eq!(archive.query(&EpisodeFilter::default(), SortOrder::Recent).len(), 4);
}

// Should sort by excess and by duration, largest first.
#[test]
fn sort_orders() {
    let archive = archive();
    let all = EpisodeFilter::default();

    // averages: 22_801 10, 12_1502 15, 22_805 8, 40_411 30
    assert_eq!(vehicles(&archive.query(&all, SortOrder::Excess)), vec![
        "40_411", "12_1502", "22_801", "22_805"
    ]);
    assert_eq!(vehicles(&archive.query(&all, SortOrder::Duration)), vec![
        "12_1502", "22_805", "40_411", "22_801"
    ]);
}

// Should list distinct values for the filter choices.
#[test]
fn distinct_values() {
    let mut archive = archive();
    archive.commit("22_801", &episode("550", Some(22), 60.0, 50, 4), at(40));

    assert_eq!(archive.routes(), vec!["9", "23", "550", "550B"]);
    assert_eq!(archive.operators(), vec![12, 22, 40]);
    assert_eq!(archive.vehicles(), vec!["12_1502", "22_801", "22_805", "40_411"]);
}
