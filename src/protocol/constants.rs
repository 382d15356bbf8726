//! Wire protocol constants

use std::time::Duration;

/// Size of the big-endian length prefix in front of every frame
pub const LENGTH_PREFIX_LEN: usize = 4;

/// Largest payload a producer may declare in a length prefix
pub const MAX_FRAME_LEN: usize = 1_000_000;

/// Default capacity of the per-stream read buffer
pub const DEFAULT_READ_BUFFER_SIZE: usize = 64 * 1024;

/// Consecutive framing failures tolerated before the loop starts backing off
pub const DEFAULT_RESYNC_THRESHOLD: u32 = 8;

/// Pause between retries once the resync threshold is reached
pub const DEFAULT_RESYNC_BACKOFF: Duration = Duration::from_millis(100);
