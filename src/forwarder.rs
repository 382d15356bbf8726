//! Per-stream forwarding loop
//!
//! One loop runs per registered stream:
//!
//! ```text
//!   Registered ──spawn──► Forwarding ──terminal error / close──► Closed
//!                           │    ▲
//!                 decode ok │    │ forward done
//!                           ▼    │
//!                          sink.forward()
//!
//!   framing error: reset framing state, keep buffered bytes, retry
//! ```
//!
//! Frames are decoded and forwarded strictly one after another. A bad frame
//! never ends the loop; only the stream going away, a deregistration, or a
//! sink failure does. On exit the loop releases the reader and removes its own
//! registry entry unless a deregistration already did.

use std::sync::Arc;

use tokio::io::AsyncRead;
use tokio::task::JoinHandle;

use crate::error::FrameError;
use crate::protocol::FrameDecoder;
use crate::registry::{Entry, Registration, StreamRegistry, StreamState};
use crate::sink::LogSink;

/// Why a forwarding loop stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamExit {
    /// The stream was deregistered
    Deregistered,
    /// The stream ended or became unavailable
    StreamEnded,
    /// The sink rejected an entry
    SinkFailed,
}

/// Start the forwarding loop for a registration on the tokio runtime
pub fn spawn<R, S>(
    registry: Arc<StreamRegistry>,
    registration: Registration<R>,
    sink: Arc<S>,
) -> JoinHandle<StreamExit>
where
    R: AsyncRead + Unpin + Send + 'static,
    S: LogSink,
{
    tokio::spawn(async move { run(&registry, registration, sink.as_ref()).await })
}

/// Run the forwarding loop to completion
pub async fn run<R, S>(registry: &StreamRegistry, registration: Registration<R>, sink: &S) -> StreamExit
where
    R: AsyncRead + Unpin,
    S: LogSink,
{
    let Registration {
        id,
        instance,
        info,
        reader,
        closer,
        state,
        counters,
    } = registration;
    let config = registry.config().clone();

    let mut decoder =
        FrameDecoder::with_limits(reader, config.read_buffer_size, config.max_frame_len);

    state.send_replace(StreamState::Forwarding);
    tracing::debug!(
        stream = %id,
        instance = instance,
        max_frame_len = decoder.max_frame_len(),
        "Forwarding started"
    );

    let mut failures: u32 = 0;

    let exit = loop {
        let decoded = tokio::select! {
            biased;
            _ = closer.cancelled() => Err(FrameError::Closed),
            result = decoder.decode() => result,
        };

        match decoded {
            Ok(record) => {
                failures = 0;
                let entry = Entry::from_log_entry(record, id.clone(), Arc::clone(&info));
                let line_len = entry.line.len();

                tracing::trace!(
                    stream = %id,
                    source = %entry.source,
                    timestamp = entry.timestamp_nanos,
                    len = line_len,
                    "Forwarding entry"
                );

                let forwarded = tokio::select! {
                    biased;
                    _ = closer.cancelled() => break StreamExit::Deregistered,
                    result = sink.forward(entry) => result,
                };

                if let Err(e) = forwarded {
                    tracing::warn!(stream = %id, error = %e, "Sink rejected entry, closing stream");
                    break StreamExit::SinkFailed;
                }
                counters.record_entry(line_len);
            }
            Err(FrameError::Closed) => break StreamExit::Deregistered,
            Err(e) if e.is_terminal() => {
                tracing::info!(stream = %id, reason = %e, "Stream closed");
                break StreamExit::StreamEnded;
            }
            Err(e) => {
                failures = failures.saturating_add(1);
                counters.record_framing_error();
                tracing::debug!(
                    stream = %id,
                    error = %e,
                    consecutive = failures,
                    "Frame decode failed, resynchronizing"
                );

                decoder.reset();

                if config.should_back_off(failures) {
                    counters.record_backoff();
                    tokio::select! {
                        biased;
                        _ = closer.cancelled() => break StreamExit::Deregistered,
                        _ = tokio::time::sleep(config.resync_backoff) => {}
                    }
                }
            }
        }
    };

    closer.cancel();
    drop(decoder);
    let removed = registry.remove_instance(&id, instance).await;
    state.send_replace(StreamState::Closed);

    let stats = counters.snapshot();
    tracing::info!(
        stream = %id,
        exit = ?exit,
        removed = removed,
        entries = stats.entries_forwarded,
        framing_errors = stats.framing_errors,
        "Forwarding stopped"
    );

    exit
}
