//! Line-oriented speedwatch runner.
//!
//! Reads HFP payloads from stdin, one per line, and writes UI events to
//! stdout as JSON lines. `:pause` and `:resume` lines toggle the
//! subscription. Logs go to stderr.

use std::sync::Arc;

use anyhow::{Context, Result};
use futures::stream::{self, StreamExt};
use hfp_adapter::{IngestLoop, Subscription};
use realtime::SystemClock;
use road_network::{SpatialIndex, load_roads};
use speedwatch::{Config, FeedItem, Speedwatch, StdoutPublisher, default_topic};
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Registry, fmt};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    Registry::default().with(filter).with(fmt::layer().with_writer(std::io::stderr)).init();

    let config = Config::from_env();
    let roads = load_roads(&config.roads_path).context("loading road dataset")?;
    let index = SpatialIndex::build(&roads, config.index);

    let ingest = IngestLoop::new(
        index,
        config.tracker,
        Subscription::new(config.hfp_topic.as_str()),
        Arc::new(SystemClock),
    )
    .with_timezone(config.timezone);
    let mut app = Speedwatch::new(ingest, StdoutPublisher, config.events_topic.as_str());

    let topic = default_topic(&config.hfp_topic);
    let lines = BufReader::new(tokio::io::stdin()).lines();
    let feed = stream::once(async { FeedItem::Connected }).chain(stdin_feed(lines, topic));

    app.run(feed).await;
    Ok(())
}

// Ends after EOF, or after reporting a read error.
fn stdin_feed(
    lines: Lines<BufReader<Stdin>>, topic: String,
) -> impl futures::Stream<Item = FeedItem> {
    stream::unfold(Some(lines), move |state| {
        let topic = topic.clone();
        async move {
            let mut lines = state?;
            loop {
                match lines.next_line().await {
                    Ok(Some(line)) => {
                        if let Some(item) = FeedItem::from_line(&line, &topic) {
                            return Some((item, Some(lines)));
                        }
                    }
                    Ok(None) => return None,
                    Err(e) => return Some((FeedItem::Error(e.to_string()), None)),
                }
            }
        }
    })
}
