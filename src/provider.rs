use anyhow::{Context, Result};
use realtime::{Message, Publisher};
use tokio::io::AsyncWriteExt;

/// Writes each published message to stdout as one line. The topic is not
/// written: the UI reads a single event stream.
#[derive(Debug, Clone, Copy, Default)]
pub struct StdoutPublisher;

impl Publisher for StdoutPublisher {
    async fn send(&self, _topic: &str, message: &Message) -> Result<()> {
        let mut line = Vec::with_capacity(message.payload.len() + 1);
        line.extend_from_slice(&message.payload);
        line.push(b'\n');

        let mut stdout = tokio::io::stdout();
        stdout.write_all(&line).await.context("writing to stdout")?;
        stdout.flush().await.context("flushing stdout")?;
        Ok(())
    }
}
