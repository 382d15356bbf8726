//! Channel-backed sink

use tokio::sync::mpsc;

use crate::error::SinkError;
use crate::registry::Entry;

use super::LogSink;

/// Sends entries into a bounded mpsc channel
///
/// When the channel is full, `forward` waits for room, which holds back the
/// producing stream. Dropping the receiver makes every later forward fail.
#[derive(Debug, Clone)]
pub struct ChannelSink {
    tx: mpsc::Sender<Entry>,
}

impl ChannelSink {
    /// Create a sink and the receiver that drains it
    pub fn new(capacity: usize) -> (Self, mpsc::Receiver<Entry>) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        (Self { tx }, rx)
    }
}

impl LogSink for ChannelSink {
    async fn forward(&self, entry: Entry) -> Result<(), SinkError> {
        self.tx.send(entry).await.map_err(|_| SinkError::Closed)
    }
}
