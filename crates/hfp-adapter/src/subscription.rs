//! Subscription control at the ingestion boundary.
//!
//! Pausing only stops messages from being accepted. Tracker, marker and
//! archive state are left untouched so that resuming continues where the
//! feed left off.

use serde::{Deserialize, Serialize};

/// Feed connection state as shown to the user.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", content = "reason", rename_all = "kebab-case")]
pub enum FeedStatus {
    #[default]
    Connecting,
    Connected,
    Paused,
    Error(String),
}

/// Topic subscription with pause/resume.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subscription {
    topic: String,
    status: FeedStatus,
    // transport error reported while paused, restored on resume
    pending_error: Option<String>,
}

impl Subscription {
    #[must_use]
    pub fn new(topic: impl Into<String>) -> Self {
        Self { topic: topic.into(), status: FeedStatus::Connecting, pending_error: None }
    }

    #[must_use]
    pub fn topic(&self) -> &str {
        &self.topic
    }

    #[must_use]
    pub const fn status(&self) -> &FeedStatus {
        &self.status
    }

    /// Whether incoming messages should be processed.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        !matches!(self.status, FeedStatus::Paused)
    }

    /// The transport (re)connected. A paused subscription stays paused.
    /// Returns `true` when the status changed.
    pub fn connected(&mut self) -> bool {
        self.pending_error = None;
        if matches!(self.status, FeedStatus::Paused | FeedStatus::Connected) {
            return false;
        }
        self.status = FeedStatus::Connected;
        true
    }

    /// Stop accepting messages. Idempotent; returns `true` when the status
    /// changed.
    pub fn pause(&mut self) -> bool {
        if self.status == FeedStatus::Paused {
            return false;
        }
        self.status = FeedStatus::Paused;
        true
    }

    /// Accept messages again. Idempotent; returns `true` when the status
    /// changed. A transport error reported while paused is still in effect.
    pub fn resume(&mut self) -> bool {
        if self.status != FeedStatus::Paused {
            return false;
        }
        self.status = self.pending_error.take().map_or(FeedStatus::Connected, FeedStatus::Error);
        true
    }

    /// The transport reported an error. A paused subscription stays paused
    /// until resumed.
    pub fn failed(&mut self, reason: impl Into<String>) -> bool {
        let reason = reason.into();
        if self.status == FeedStatus::Paused {
            self.pending_error = Some(reason);
            return false;
        }
        let status = FeedStatus::Error(reason);
        if self.status == status {
            return false;
        }
        self.status = status;
        true
    }
}
