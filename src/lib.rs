//! # Speedwatch
//!
//! Detects sustained speeding on the HSL live vehicle position feed and
//! publishes the derived events for the map UI.

mod config;
mod messaging;
mod provider;

use anyhow::{Context, Result};
use futures::{Stream, StreamExt};
use hfp_adapter::{IngestLoop, UiEvent};
use realtime::{Clock, Message, Publisher};
use tracing::{debug, error, info};

pub use self::config::Config;
pub use self::messaging::*;
pub use self::provider::StdoutPublisher;

const SERVICE: &str = "speedwatch";

/// Feeds transport items through the ingest loop and publishes the
/// resulting UI events.
pub struct Speedwatch<C: Clock + ?Sized, P: Publisher> {
    ingest: IngestLoop<C>,
    publisher: P,
    events_topic: String,
}

impl<C: Clock + ?Sized, P: Publisher> Speedwatch<C, P> {
    #[must_use]
    pub fn new(ingest: IngestLoop<C>, publisher: P, events_topic: impl Into<String>) -> Self {
        Self { ingest, publisher, events_topic: events_topic.into() }
    }

    /// Handle one transport item. Never fails: message and publish errors
    /// are logged and counted.
    pub async fn handle(&mut self, item: FeedItem) {
        let events: Vec<UiEvent> = match item {
            FeedItem::Message { topic, payload } => dispatch(&mut self.ingest, &topic, &payload),
            FeedItem::Connected => {
                info!(topic = %self.ingest.subscription().topic(), service = %SERVICE, "feed connected");
                self.ingest.connected().into_iter().collect()
            }
            FeedItem::Pause => self.ingest.pause().into_iter().collect(),
            FeedItem::Resume => self.ingest.resume().into_iter().collect(),
            FeedItem::Error(reason) => self.ingest.failed(&reason).into_iter().collect(),
        };

        for event in &events {
            if let Err(e) = publish(&self.publisher, &self.events_topic, event).await {
                error!(
                    monotonic_counter.processing_errors = 1,
                    error = %e,
                    event = event.kind(),
                    service = %SERVICE
                );
            }
        }
    }

    /// Drain `feed` until it ends.
    pub async fn run<S>(&mut self, feed: S)
    where
        S: Stream<Item = FeedItem>,
    {
        let mut feed = std::pin::pin!(feed);
        while let Some(item) = feed.next().await {
            self.handle(item).await;
        }

        info!(
            total_vehicles_seen = self.ingest.total_vehicles_seen(),
            currently_speeding = self.ingest.currently_speeding(),
            episodes_archived = self.ingest.archive().len(),
            service = %SERVICE,
            "feed ended"
        );
    }

    #[must_use]
    pub const fn ingest(&self) -> &IngestLoop<C> {
        &self.ingest
    }

    #[must_use]
    pub const fn publisher(&self) -> &P {
        &self.publisher
    }
}

async fn publish<P: Publisher>(publisher: &P, topic: &str, event: &UiEvent) -> Result<()> {
    let payload = serde_json::to_vec(event).context("serializing event")?;
    let mut message = Message::new(&payload);
    if let Some(vehicle_id) = event.vehicle_id() {
        message.headers.insert("key".to_string(), vehicle_id.to_string());
    }

    publisher.send(topic, &message).await.context("publishing event")?;
    debug!(monotonic_counter.messages_sent = 1, event = event.kind(), service = %SERVICE);

    Ok(())
}
