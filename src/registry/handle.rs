//! Stream handle and lifecycle types
//!
//! This module defines the per-stream state stored in the registry and the
//! registration ticket that carries the reader into its forwarding loop.

use std::sync::Arc;

use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

use crate::info::ContainerInfo;
use crate::stats::{StreamCounters, StreamStats};

use super::entry::StreamId;

/// Lifecycle of one registered stream
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamState {
    /// Stored in the registry, loop not started yet
    Registered,
    /// Loop is decoding and forwarding
    Forwarding,
    /// Loop has exited and released the stream (terminal)
    Closed,
}

/// Registry-side handle for a single stream
///
/// The reader itself lives in the forwarding loop. The handle keeps the close
/// signal for it, so closing the handle unblocks any pending read.
#[derive(Debug)]
pub struct StreamHandle {
    /// Distinguishes successive registrations of the same id
    pub(super) instance: u64,

    /// Source metadata attached to every entry
    pub(super) info: Arc<ContainerInfo>,

    /// Fired to close the stream out from under the loop
    pub(super) closer: CancellationToken,

    /// Lifecycle published by the loop
    pub(super) state: watch::Receiver<StreamState>,

    /// Counters updated by the loop
    pub(super) counters: Arc<StreamCounters>,
}

impl StreamHandle {
    /// Close the underlying stream; calling it again is a no-op
    pub(super) fn close(&self) {
        self.closer.cancel();
    }

    /// Current lifecycle state
    pub fn state(&self) -> StreamState {
        *self.state.borrow()
    }

    /// Counter snapshot
    pub fn stats(&self) -> StreamStats {
        self.counters.snapshot()
    }

    /// Container metadata
    pub fn info(&self) -> &Arc<ContainerInfo> {
        &self.info
    }

    /// Completion signal for this handle's loop
    pub(super) fn closed_signal(&self) -> ClosedSignal {
        ClosedSignal {
            state: self.state.clone(),
        }
    }
}

/// Resolves once a stream's loop has reached [`StreamState::Closed`]
#[derive(Debug)]
pub struct ClosedSignal {
    state: watch::Receiver<StreamState>,
}

impl ClosedSignal {
    /// Wait for the loop to exit
    ///
    /// Also resolves if the loop was never started and its registration was
    /// dropped.
    pub async fn wait(mut self) {
        let _ = self
            .state
            .wait_for(|state| *state == StreamState::Closed)
            .await;
    }
}

/// Ticket returned by a successful registration
///
/// Owns the reader until it is handed to a forwarding loop. Dropping it
/// without starting a loop closes the reader; the registry entry then stays
/// until the stream is deregistered.
pub struct Registration<R> {
    pub(crate) id: StreamId,
    pub(crate) instance: u64,
    pub(crate) info: Arc<ContainerInfo>,
    pub(crate) reader: R,
    pub(crate) closer: CancellationToken,
    pub(crate) state: watch::Sender<StreamState>,
    pub(crate) counters: Arc<StreamCounters>,
}

impl<R> Registration<R> {
    /// Registered stream id
    pub fn id(&self) -> &StreamId {
        &self.id
    }

    /// Registration instance number
    pub fn instance(&self) -> u64 {
        self.instance
    }

    /// Source metadata
    pub fn info(&self) -> &Arc<ContainerInfo> {
        &self.info
    }
}

impl<R> std::fmt::Debug for Registration<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registration")
            .field("id", &self.id)
            .field("instance", &self.instance)
            .finish_non_exhaustive()
    }
}
