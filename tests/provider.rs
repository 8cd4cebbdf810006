#![allow(missing_docs)]
#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use anyhow::{Result, bail};
use chrono::{DateTime, Duration, TimeZone, Utc};
use realtime::{Clock, Message, Publisher};

/// Collects published messages.
#[derive(Clone, Default)]
pub struct MockProvider {
    published: Arc<Mutex<Vec<(String, Message)>>>,
    fail: bool,
}

impl MockProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self { fail: true, ..Self::default() }
    }

    pub fn published(&self) -> Vec<(String, Message)> {
        self.published.lock().expect("should lock").clone()
    }

    /// Published payloads as JSON.
    pub fn events(&self) -> Vec<serde_json::Value> {
        self.published()
            .iter()
            .map(|(_, message)| serde_json::from_slice(&message.payload).expect("should be json"))
            .collect()
    }
}

impl Publisher for MockProvider {
    async fn send(&self, topic: &str, message: &Message) -> Result<()> {
        if self.fail {
            bail!("broker unavailable");
        }
        self.published.lock().expect("should lock").push((topic.to_string(), message.clone()));
        Ok(())
    }
}

/// Clock that moves forward one second every time it is read.
pub struct TickingClock {
    now: Mutex<DateTime<Utc>>,
}

impl TickingClock {
    pub fn new() -> Self {
        let start = Utc.with_ymd_and_hms(2025, 10, 19, 8, 0, 0).single().expect("valid time");
        Self { now: Mutex::new(start) }
    }
}

impl Clock for TickingClock {
    fn now_utc(&self) -> DateTime<Utc> {
        let mut now = self.now.lock().expect("should lock");
        let current = *now;
        *now += Duration::seconds(1);
        current
    }
}
