//! Entry sinks
//!
//! A sink receives one entry at a time. The forwarding loop awaits each
//! `forward` call before decoding the next frame, so a slow sink slows down
//! only its own stream.

pub mod channel;
pub mod writer;

use std::future::Future;
use std::sync::Arc;

use crate::error::SinkError;
use crate::registry::Entry;

pub use channel::ChannelSink;
pub use writer::WriterSink;

/// Consumer of decoded entries
///
/// An error is fatal to the stream that produced the entry: its loop closes
/// the stream and deregisters it. Other streams are unaffected.
pub trait LogSink: Send + Sync + 'static {
    /// Deliver one entry
    fn forward(&self, entry: Entry) -> impl Future<Output = Result<(), SinkError>> + Send;
}

impl<S: LogSink> LogSink for Arc<S> {
    fn forward(&self, entry: Entry) -> impl Future<Output = Result<(), SinkError>> + Send {
        (**self).forward(entry)
    }
}
