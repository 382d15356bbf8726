//! Stream registry implementation
//!
//! The central table of active streams. Registration stores a handle and
//! hands the reader back to the caller, who starts the forwarding loop;
//! deregistration removes the handle and closes the stream.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::sync::{watch, Mutex};
use tokio_util::sync::CancellationToken;

use crate::info::ContainerInfo;
use crate::stats::{StreamCounters, StreamStats};

use super::config::ForwarderConfig;
use super::entry::StreamId;
use super::error::RegistryError;
use super::handle::{ClosedSignal, Registration, StreamHandle, StreamState};

/// Central registry for all active streams
///
/// A single mutex guards the map. It is held only for lookups, inserts and
/// removals, never across a read, a decode or a sink call.
pub struct StreamRegistry {
    /// Map of stream id to stream handle
    streams: Mutex<HashMap<StreamId, StreamHandle>>,

    /// Source of registration instance numbers
    next_instance: AtomicU64,

    /// Configuration for forwarding loops started from this registry
    config: ForwarderConfig,
}

impl StreamRegistry {
    /// Create a new stream registry with default configuration
    pub fn new() -> Self {
        Self::with_config(ForwarderConfig::default())
    }

    /// Create a new stream registry with custom configuration
    pub fn with_config(config: ForwarderConfig) -> Self {
        Self {
            streams: Mutex::new(HashMap::new()),
            next_instance: AtomicU64::new(1),
            config,
        }
    }

    /// Get the forwarding configuration
    pub fn config(&self) -> &ForwarderConfig {
        &self.config
    }

    /// Register an opened stream
    ///
    /// Fails without changing anything if `id` is already registered. On
    /// success the handle is in the table before this returns, so a loop
    /// started from the returned [`Registration`] always finds it.
    pub async fn register<R>(
        &self,
        id: impl Into<StreamId>,
        reader: R,
        info: impl Into<Arc<ContainerInfo>>,
    ) -> Result<Registration<R>, RegistryError> {
        let id = id.into();
        let info = info.into();

        let mut streams = self.streams.lock().await;
        if streams.contains_key(&id) {
            return Err(RegistryError::AlreadyRegistered(id));
        }

        let instance = self.next_instance.fetch_add(1, Ordering::Relaxed);
        let closer = CancellationToken::new();
        let (state_tx, state_rx) = watch::channel(StreamState::Registered);
        let counters = Arc::new(StreamCounters::new());

        streams.insert(
            id.clone(),
            StreamHandle {
                instance,
                info: Arc::clone(&info),
                closer: closer.clone(),
                state: state_rx,
                counters: Arc::clone(&counters),
            },
        );
        let active = streams.len();
        drop(streams);

        tracing::info!(
            stream = %id,
            container = %info.short_id(),
            instance = instance,
            active = active,
            "Stream registered"
        );

        Ok(Registration {
            id,
            instance,
            info,
            reader,
            closer,
            state: state_tx,
            counters,
        })
    }

    /// Deregister a stream
    ///
    /// Closes the stream and removes its entry. Unknown ids are ignored.
    pub async fn deregister(&self, id: &str) {
        self.take_and_close(id).await;
    }

    /// Deregister a stream and wait for its loop to exit
    pub async fn deregister_and_wait(&self, id: &str) {
        if let Some(closed) = self.take_and_close(id).await {
            closed.wait().await;
        }
    }

    async fn take_and_close(&self, id: &str) -> Option<ClosedSignal> {
        let handle = self.streams.lock().await.remove(id)?;

        handle.close();
        tracing::info!(
            stream = %id,
            instance = handle.instance,
            "Stream deregistered"
        );

        Some(handle.closed_signal())
    }

    /// Remove the entry for `id` if it still belongs to `instance`
    ///
    /// Called by a forwarding loop on exit. A newer registration of the same
    /// id is left alone.
    pub(crate) async fn remove_instance(&self, id: &StreamId, instance: u64) -> bool {
        let mut streams = self.streams.lock().await;

        match streams.get(id).map(|handle| handle.instance) {
            Some(current) if current == instance => {
                if let Some(handle) = streams.remove(id) {
                    handle.close();
                }
                true
            }
            Some(current) => {
                tracing::debug!(
                    stream = %id,
                    expected = instance,
                    actual = current,
                    "Stream re-registered, leaving newer entry"
                );
                false
            }
            None => false,
        }
    }

    /// Close every registered stream
    ///
    /// Returns how many streams were closed.
    pub async fn close_all(&self) -> usize {
        let drained: Vec<(StreamId, StreamHandle)> =
            self.streams.lock().await.drain().collect();

        for (id, handle) in &drained {
            handle.close();
            tracing::debug!(stream = %id, "Stream closed on shutdown");
        }

        drained.len()
    }

    /// Check if a stream is registered
    pub async fn contains(&self, id: &str) -> bool {
        self.streams.lock().await.contains_key(id)
    }

    /// Get total number of registered streams
    pub async fn stream_count(&self) -> usize {
        self.streams.lock().await.len()
    }

    /// Registered ids in sorted order
    pub async fn stream_ids(&self) -> Vec<StreamId> {
        let mut ids: Vec<StreamId> = self.streams.lock().await.keys().cloned().collect();
        ids.sort();
        ids
    }

    /// Lifecycle state of a registered stream
    pub async fn stream_state(&self, id: &str) -> Option<StreamState> {
        self.streams.lock().await.get(id).map(StreamHandle::state)
    }

    /// Get stream statistics
    pub async fn stream_stats(&self, id: &str) -> Option<StreamStats> {
        self.streams.lock().await.get(id).map(StreamHandle::stats)
    }

    /// Container metadata of a registered stream
    pub async fn stream_info(&self, id: &str) -> Option<Arc<ContainerInfo>> {
        self.streams
            .lock()
            .await
            .get(id)
            .map(|handle| Arc::clone(handle.info()))
    }
}

impl Default for StreamRegistry {
    fn default() -> Self {
        Self::new()
    }
}
