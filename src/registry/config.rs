//! Forwarding configuration

use std::time::Duration;

use crate::protocol::constants::{
    DEFAULT_READ_BUFFER_SIZE, DEFAULT_RESYNC_BACKOFF, DEFAULT_RESYNC_THRESHOLD, MAX_FRAME_LEN,
};

/// Settings shared by every forwarding loop of a registry
#[derive(Debug, Clone)]
pub struct ForwarderConfig {
    /// Largest accepted frame payload in bytes
    pub max_frame_len: usize,

    /// Capacity of each stream's read buffer
    pub read_buffer_size: usize,

    /// Consecutive framing failures before retries are delayed (0 = always delay)
    pub resync_threshold: u32,

    /// Delay applied to each retry past the threshold
    pub resync_backoff: Duration,
}

impl Default for ForwarderConfig {
    fn default() -> Self {
        Self {
            max_frame_len: MAX_FRAME_LEN,
            read_buffer_size: DEFAULT_READ_BUFFER_SIZE,
            resync_threshold: DEFAULT_RESYNC_THRESHOLD,
            resync_backoff: DEFAULT_RESYNC_BACKOFF,
        }
    }
}

impl ForwarderConfig {
    /// Set the maximum frame length
    pub fn max_frame_len(mut self, len: usize) -> Self {
        self.max_frame_len = len.min(u32::MAX as usize);
        self
    }

    /// Set the read buffer size (at least one length prefix)
    pub fn read_buffer_size(mut self, size: usize) -> Self {
        self.read_buffer_size = size.max(crate::protocol::constants::LENGTH_PREFIX_LEN);
        self
    }

    /// Set how many consecutive failures are retried immediately
    pub fn resync_threshold(mut self, threshold: u32) -> Self {
        self.resync_threshold = threshold;
        self
    }

    /// Set the delay between retries past the threshold
    pub fn resync_backoff(mut self, backoff: Duration) -> Self {
        self.resync_backoff = backoff;
        self
    }

    /// Whether the loop should pause before retry number `consecutive_failures`
    pub(crate) fn should_back_off(&self, consecutive_failures: u32) -> bool {
        !self.resync_backoff.is_zero() && consecutive_failures > self.resync_threshold
    }
}
