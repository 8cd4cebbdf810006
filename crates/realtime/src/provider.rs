//! # Provider
//!
//! Provider defines external data interfaces for the crates.

use std::collections::HashMap;

use anyhow::Result;
use chrono::{DateTime, Utc};

/// The `Clock` trait supplies the current time.
///
/// Samples are stamped with their receipt time, so tests substitute a
/// manually advanced clock.
pub trait Clock: Send + Sync {
    fn now_utc(&self) -> DateTime<Utc>;

    /// Current time as fractional unix seconds.
    #[allow(clippy::cast_precision_loss)]
    fn now_secs(&self) -> f64 {
        let now = self.now_utc();
        now.timestamp() as f64 + f64::from(now.timestamp_subsec_millis()) / 1000.0
    }
}

/// Wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_utc(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Message represents a message to be published.
#[derive(Clone, Debug)]
pub struct Message {
    pub payload: Vec<u8>,
    pub headers: HashMap<String, String>,
}

impl Message {
    #[must_use]
    pub fn new(payload: &[u8]) -> Self {
        Self { payload: payload.to_vec(), headers: HashMap::new() }
    }
}

/// The `Publisher` trait defines the message publishing behavior.
pub trait Publisher: Send + Sync {
    /// Publish a message to the given topic.
    fn send(&self, topic: &str, message: &Message) -> impl Future<Output = Result<()>> + Send;
}
