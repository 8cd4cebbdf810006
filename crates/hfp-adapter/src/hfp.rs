//! HFP vehicle position (`VP`) messages.
//!
//! Only the fields used for speeding detection are modelled; everything else
//! in the payload is ignored.

use std::fmt::{self, Display};

use realtime::{Result, malformed, missing_field};
use serde::{Deserialize, Serialize};

/// m/s to km/h.
const MS_TO_KMH: f64 = 3.6;

/// Placeholder for absent identifiers.
const UNKNOWN: &str = "?";

/// Top-level HFP message. The feed wraps each event type in an object keyed
/// by the event name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HfpMessage {
    #[serde(rename = "VP", default)]
    pub vp: Option<VehiclePosition>,
}

impl HfpMessage {
    /// Parse a raw feed payload and return its vehicle position.
    ///
    /// # Errors
    ///
    /// Returns `Error::MalformedMessage` when the payload is not valid JSON,
    /// and `Error::MissingField` when the `VP` object, `lat` or `long` is
    /// absent or null.
    pub fn parse(payload: &[u8]) -> Result<VehiclePosition> {
        let message: Self = serde_json::from_slice(payload)?;
        let vp = message.vp.ok_or_else(|| missing_field!("VP"))?;
        vp.validate()?;
        Ok(vp)
    }
}

/// Vehicle position event.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VehiclePosition {
    /// Latitude in WGS84.
    #[serde(default)]
    pub lat: Option<f64>,

    /// Longitude in WGS84.
    #[serde(rename = "long", default)]
    pub lng: Option<f64>,

    /// Speed in m/s.
    #[serde(default)]
    pub spd: Option<f64>,

    /// Route number visible to passengers.
    #[serde(default)]
    pub desi: Option<String>,

    /// Operator id.
    #[serde(default)]
    pub oper: Option<u32>,

    /// Vehicle number, unique within an operator.
    #[serde(default)]
    pub veh: Option<VehicleNumber>,
}

impl VehiclePosition {
    /// Checks that the position is present and on the globe.
    ///
    /// # Errors
    ///
    /// Returns `Error::MissingField` naming the first absent coordinate and
    /// `Error::MalformedMessage` for a coordinate outside WGS84 bounds.
    pub fn validate(&self) -> Result<()> {
        let Some(lat) = self.lat else {
            return Err(missing_field!("lat"));
        };
        let Some(lng) = self.lng else {
            return Err(missing_field!("long"));
        };
        if !(-90.0..=90.0).contains(&lat) {
            return Err(malformed!("lat {lat} out of range"));
        }
        if !(-180.0..=180.0).contains(&lng) {
            return Err(malformed!("long {lng} out of range"));
        }
        Ok(())
    }

    /// `(lat, lng)` when both are present.
    #[must_use]
    pub fn position(&self) -> Option<(f64, f64)> {
        self.lat.zip(self.lng)
    }

    /// `<oper>_<veh>`, e.g. `22_801`.
    #[must_use]
    pub fn vehicle_id(&self) -> String {
        let oper = self.oper.map_or_else(|| UNKNOWN.to_string(), |oper| oper.to_string());
        let veh = self.veh.as_ref().map_or_else(|| UNKNOWN.to_string(), ToString::to_string);
        format!("{oper}_{veh}")
    }

    /// Reported speed in km/h.
    #[must_use]
    pub fn speed_kmh(&self) -> Option<f64> {
        self.spd.map(|spd| spd * MS_TO_KMH)
    }

    /// Route label, `?` when absent or empty.
    #[must_use]
    pub fn route(&self) -> String {
        self.desi.as_deref().filter(|desi| !desi.is_empty()).unwrap_or(UNKNOWN).to_string()
    }
}

/// Vehicle numbers are integers on the live feed but strings in some
/// recorded dumps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum VehicleNumber {
    Number(u64),
    Text(String),
}

impl Display for VehicleNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => write!(f, "{s}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_vp() {
        let payload = br#"{"VP": {"desi": "550", "dir": "1", "oper": 22, "veh": 801,
            "tst": "2025-10-19T08:15:00.123Z", "spd": 12.5, "lat": 60.2, "long": 24.9}}"#;
        let vp = HfpMessage::parse(payload).expect("should parse");

        assert_eq!(vp.vehicle_id(), "22_801");
        assert_eq!(vp.route(), "550");
        assert_eq!(vp.position(), Some((60.2, 24.9)));
        assert!((vp.speed_kmh().expect("speed") - 45.0).abs() < 1e-9);
    }

    #[test]
    fn optional_fields() {
        let vp = HfpMessage::parse(br#"{"VP": {"veh": "1502", "lat": 60.2, "long": 24.9}}"#)
            .expect("should parse");

        assert_eq!(vp.vehicle_id(), "?_1502");
        assert_eq!(vp.route(), "?");
        assert_eq!(vp.speed_kmh(), None);
    }

    #[test]
    fn missing_coordinates() {
        let Err(err) = HfpMessage::parse(br#"{"VP": {"lat": null, "long": 24.9}}"#) else {
            panic!("should fail");
        };
        assert_eq!(err.code(), "missing_field");
        assert!(err.to_string().contains("lat"));

        let Err(err) = HfpMessage::parse(br#"{"VP": {"lat": 60.2}}"#) else {
            panic!("should fail");
        };
        assert!(err.to_string().contains("long"));

        let Err(err) = HfpMessage::parse(br#"{"DOO": {"lat": 60.2, "long": 24.9}}"#) else {
            panic!("should fail");
        };
        assert_eq!(err.code(), "missing_field");
    }

    #[test]
    fn out_of_range_coordinates() {
        let Err(err) = HfpMessage::parse(br#"{"VP": {"lat": 1e20, "long": 24.9}}"#) else {
            panic!("should fail");
        };
        assert_eq!(err.code(), "malformed_message");
        assert!(err.to_string().contains("lat"));

        let Err(err) = HfpMessage::parse(br#"{"VP": {"lat": 60.2, "long": -180.5}}"#) else {
            panic!("should fail");
        };
        assert!(err.to_string().contains("long"));

        let vp = HfpMessage::parse(br#"{"VP": {"lat": -90, "long": 180}}"#).expect("bounds");
        assert_eq!(vp.position(), Some((-90.0, 180.0)));
    }

    #[test]
    fn malformed() {
        let Err(err) = HfpMessage::parse(b"not json") else {
            panic!("should fail");
        };
        assert_eq!(err.code(), "malformed_message");
    }
}
