//! Statistics for forwarded streams

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// Live counters updated by a forwarding loop
///
/// Shared between the loop and the registry handle, so every field is atomic.
#[derive(Debug)]
pub struct StreamCounters {
    started_at: Instant,
    entries_forwarded: AtomicU64,
    bytes_forwarded: AtomicU64,
    framing_errors: AtomicU64,
    backoffs: AtomicU64,
}

impl StreamCounters {
    pub fn new() -> Self {
        Self {
            started_at: Instant::now(),
            entries_forwarded: AtomicU64::new(0),
            bytes_forwarded: AtomicU64::new(0),
            framing_errors: AtomicU64::new(0),
            backoffs: AtomicU64::new(0),
        }
    }

    /// Record one entry handed to the sink
    pub fn record_entry(&self, line_len: usize) {
        self.entries_forwarded.fetch_add(1, Ordering::Relaxed);
        self.bytes_forwarded
            .fetch_add(line_len as u64, Ordering::Relaxed);
    }

    /// Record a decode failure that led to a resync
    pub fn record_framing_error(&self) {
        self.framing_errors.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a delayed retry
    pub fn record_backoff(&self) {
        self.backoffs.fetch_add(1, Ordering::Relaxed);
    }

    /// Take a point-in-time copy
    pub fn snapshot(&self) -> StreamStats {
        StreamStats {
            entries_forwarded: self.entries_forwarded.load(Ordering::Relaxed),
            bytes_forwarded: self.bytes_forwarded.load(Ordering::Relaxed),
            framing_errors: self.framing_errors.load(Ordering::Relaxed),
            backoffs: self.backoffs.load(Ordering::Relaxed),
            duration: self.started_at.elapsed(),
        }
    }
}

impl Default for StreamCounters {
    fn default() -> Self {
        Self::new()
    }
}

/// Snapshot of a stream's counters
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StreamStats {
    /// Entries handed to the sink
    pub entries_forwarded: u64,
    /// Line bytes handed to the sink
    pub bytes_forwarded: u64,
    /// Frames that failed to decode
    pub framing_errors: u64,
    /// Retries that were delayed
    pub backoffs: u64,
    /// Time since registration
    pub duration: Duration,
}

impl StreamStats {
    /// Entries per second since registration
    pub fn entry_rate(&self) -> f64 {
        let secs = self.duration.as_secs_f64();
        if secs > 0.0 {
            self.entries_forwarded as f64 / secs
        } else {
            0.0
        }
    }
}
