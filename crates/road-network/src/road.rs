//! Road dataset records as produced by the offline Overpass export.

use std::path::Path;

use realtime::{Error, Result};
use serde::{Deserialize, Deserializer, Serialize};

/// One road (OSM way) with its speed limit and geometry.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RoadSegment {
    /// Street name, when tagged.
    #[serde(default)]
    pub name: Option<String>,

    /// Raw `maxspeed` tag. Usually a plain number such as `"40"`.
    #[serde(default, deserialize_with = "deserialize_maxspeed")]
    pub maxspeed: Option<String>,

    /// OSM `highway` classification.
    #[serde(default)]
    pub highway: String,

    /// Geometry vertices as `[lat, lng]` pairs.
    #[serde(default)]
    pub coords: Vec<[f64; 2]>,
}

impl RoadSegment {
    /// Speed limit in km/h parsed from the leading integer of `maxspeed`.
    #[must_use]
    pub fn speed_limit_kmh(&self) -> Option<u32> {
        self.maxspeed.as_deref().and_then(leading_int)
    }

    /// Whether the segment contributes lookup points. Segments without a
    /// usable limit or with fewer than two vertices are still renderable.
    #[must_use]
    pub fn is_indexable(&self) -> bool {
        self.coords.len() >= 2 && self.speed_limit_kmh().is_some()
    }
}

// The export writes `maxspeed` as a string, but hand-edited datasets
// sometimes carry plain numbers.
fn deserialize_maxspeed<'de, D>(deserializer: D) -> anyhow::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(opt.and_then(|v| match v {
        serde_json::Value::String(s) if !s.is_empty() => Some(s),
        serde_json::Value::Number(n) => Some(n.to_string()),
        _ => None,
    }))
}

/// Base-10 leading integer: `"50"`, `" 30"` and `"50 mph"` all parse; `"none"`
/// does not.
fn leading_int(raw: &str) -> Option<u32> {
    let trimmed = raw.trim_start();
    let digits = trimmed.strip_prefix('+').unwrap_or(trimmed);
    let end = digits.find(|c: char| !c.is_ascii_digit()).unwrap_or(digits.len());
    digits[..end].parse().ok()
}

/// Parse a road dataset from JSON bytes.
///
/// # Errors
///
/// Returns `Error::InvalidDataset` when the payload is not a JSON array of
/// road records.
pub fn parse_roads(bytes: &[u8]) -> Result<Vec<RoadSegment>> {
    serde_json::from_slice(bytes)
        .map_err(|err| Error::InvalidDataset(format!("failed to parse road dataset: {err}")))
}

/// Read and parse a road dataset file.
///
/// # Errors
///
/// Returns `Error::InvalidDataset` when the file cannot be read or parsed.
pub fn load_roads(path: impl AsRef<Path>) -> Result<Vec<RoadSegment>> {
    let path = path.as_ref();
    let bytes = std::fs::read(path)
        .map_err(|err| Error::InvalidDataset(format!("reading {}: {err}", path.display())))?;
    let roads = parse_roads(&bytes)?;
    tracing::info!(roads = roads.len(), path = %path.display(), "loaded road dataset");
    Ok(roads)
}
