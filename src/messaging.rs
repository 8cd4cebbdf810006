use bytes::Bytes;
use hfp_adapter::{IngestLoop, UiEvent};
use realtime::Clock;
use tracing::{debug, error, warn};

use crate::SERVICE;

/// Event type segment of HFP vehicle position topics.
const VP_SEGMENT: &str = "vp";

/// One item from the feed transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedItem {
    Message { topic: String, payload: Bytes },
    Connected,
    Pause,
    Resume,
    Error(String),
}

impl FeedItem {
    /// Parse a line of the line-oriented feed.
    ///
    /// `:pause` and `:resume` toggle the subscription. A line starting with
    /// `/` is `<topic> <payload>`; anything else is a payload on
    /// `default_topic`. Blank lines yield `None`.
    #[must_use]
    pub fn from_line(line: &str, default_topic: &str) -> Option<Self> {
        let line = line.trim();
        match line {
            "" => None,
            ":pause" => Some(Self::Pause),
            ":resume" => Some(Self::Resume),
            _ if line.starts_with('/') => {
                let (topic, payload) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
                Some(Self::Message {
                    topic: topic.to_string(),
                    payload: Bytes::copy_from_slice(payload.trim().as_bytes()),
                })
            }
            _ => Some(Self::Message {
                topic: default_topic.to_string(),
                payload: Bytes::copy_from_slice(line.as_bytes()),
            }),
        }
    }
}

/// Route a feed message by topic.
///
/// Errors are logged and counted here; a bad message never stops the feed.
pub fn dispatch<C>(ingest: &mut IngestLoop<C>, topic: &str, payload: &[u8]) -> Vec<UiEvent>
where
    C: Clock + ?Sized,
{
    debug!(monotonic_counter.messages_received = 1, topic = %topic, service = %SERVICE);

    if !is_position_topic(topic) {
        warn!(monotonic_counter.unhandled_topics = 1, topic = %topic, service = %SERVICE);
        return vec![];
    }

    match ingest.handle(payload) {
        Ok(events) => events,
        Err(e) => {
            error!(
                monotonic_counter.processing_errors = 1,
                error = %e,
                topic = %topic,
                service = %SERVICE
            );
            vec![]
        }
    }
}

fn is_position_topic(topic: &str) -> bool {
    topic.split('/').any(|segment| segment == VP_SEGMENT)
}

/// Topic for lines without one: the subscription pattern up to its first
/// wildcard.
#[must_use]
pub fn default_topic(subscription: &str) -> String {
    subscription.split('/').take_while(|s| *s != "#" && *s != "+").collect::<Vec<_>>().join("/")
}
