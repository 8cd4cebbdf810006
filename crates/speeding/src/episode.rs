use serde::{Deserialize, Serialize};

/// A single position report, already converted to km/h and stamped with its
/// receipt time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VehiclePositionSample {
    pub vehicle_id: String,
    pub lat: f64,
    pub lng: f64,
    pub timestamp_secs: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub speed_kmh: Option<f64>,
    pub route: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub operator_id: Option<u32>,
}

/// One point of an episode's speed chart.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeSample {
    pub t: f64,
    pub speed_kmh: f64,
    pub limit_kmh: u32,
}

/// Whether an episode has lasted long enough to be shown.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Phase {
    #[default]
    Accruing,
    Committed,
}

/// The live working copy of a vehicle's speeding episode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpeedingEpisode {
    pub started_at: f64,
    pub path: Vec<[f64; 2]>,
    pub cumulative_excess_kmh: f64,
    pub sample_count: u32,
    pub route: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub operator_id: Option<u32>,
    pub last_speed_limit_kmh: u32,
    pub phase: Phase,
    pub time_series: Vec<TimeSample>,
}

impl SpeedingEpisode {
    pub(crate) fn start(sample: &VehiclePositionSample, speed_kmh: f64, limit_kmh: u32) -> Self {
        Self {
            started_at: sample.timestamp_secs,
            path: vec![[sample.lat, sample.lng]],
            cumulative_excess_kmh: speed_kmh - f64::from(limit_kmh),
            sample_count: 1,
            route: sample.route.clone(),
            operator_id: sample.operator_id,
            last_speed_limit_kmh: limit_kmh,
            phase: Phase::Accruing,
            time_series: vec![TimeSample { t: sample.timestamp_secs, speed_kmh, limit_kmh }],
        }
    }

    pub(crate) fn accrue(&mut self, sample: &VehiclePositionSample, speed_kmh: f64, limit_kmh: u32) {
        self.path.push([sample.lat, sample.lng]);
        self.time_series.push(TimeSample { t: sample.timestamp_secs, speed_kmh, limit_kmh });
        self.sample_count += 1;
        self.cumulative_excess_kmh += speed_kmh - f64::from(limit_kmh);
        self.last_speed_limit_kmh = limit_kmh;
    }

    /// Mean excess over all samples in the episode.
    #[must_use]
    pub fn average_excess_kmh(&self) -> f64 {
        if self.sample_count == 0 {
            return 0.0;
        }
        self.cumulative_excess_kmh / f64::from(self.sample_count)
    }

    /// Seconds between the first and the latest sample.
    #[must_use]
    pub fn elapsed_secs(&self) -> f64 {
        self.time_series.last().map_or(0.0, |last| last.t - self.started_at)
    }

    #[must_use]
    pub fn is_committed(&self) -> bool {
        self.phase == Phase::Committed
    }
}

/// Reported speed minus the applicable limit. Missing speed or limit counts
/// as no excess.
#[must_use]
pub fn excess_kmh(speed_kmh: Option<f64>, limit_kmh: Option<u32>) -> f64 {
    match (speed_kmh, limit_kmh) {
        (Some(speed), Some(limit)) => speed - f64::from(limit),
        _ => 0.0,
    }
}
