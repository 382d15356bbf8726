//! Stream identifiers and forwarded entries
//!
//! This module defines the key type for identifying streams and the entries
//! that are handed to sinks.

use std::fmt;
use std::sync::Arc;

use bytes::Bytes;

use crate::info::ContainerInfo;
use crate::protocol::message::{LogEntry, PartialLogEntryMetadata};

/// Unique identifier for a registered stream (normally the FIFO path)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StreamId(Arc<str>);

impl StreamId {
    /// Create a stream id
    pub fn new(id: impl AsRef<str>) -> Self {
        Self(Arc::from(id.as_ref()))
    }

    /// Borrow the id as text
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StreamId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for StreamId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for StreamId {
    fn from(id: String) -> Self {
        Self(Arc::from(id))
    }
}

impl std::borrow::Borrow<str> for StreamId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// A decoded log record on its way to a sink
///
/// Cheap to clone: the line is a reference-counted `Bytes` and the container
/// info is shared by every entry of the stream.
#[derive(Debug, Clone, PartialEq)]
pub struct Entry {
    /// Stream the entry was read from
    pub stream: StreamId,
    /// Container that produced the stream
    pub info: Arc<ContainerInfo>,
    /// Originating output ("stdout" / "stderr")
    pub source: String,
    /// Timestamp in nanoseconds since the unix epoch
    pub timestamp_nanos: i64,
    /// Line content
    pub line: Bytes,
    /// Present when the producer split the line
    pub partial: Option<PartialLogEntryMetadata>,
}

impl Entry {
    /// Build an entry from a decoded wire record
    pub fn from_log_entry(record: LogEntry, stream: StreamId, info: Arc<ContainerInfo>) -> Self {
        let partial = if record.partial {
            Some(record.partial_log_metadata.unwrap_or_default())
        } else {
            None
        };

        Self {
            stream,
            info,
            source: record.source,
            timestamp_nanos: record.time_nano,
            line: record.line,
            partial,
        }
    }

    /// Whether this entry is one chunk of a longer line
    pub fn is_partial(&self) -> bool {
        self.partial.is_some()
    }

    /// Line content as text, replacing invalid UTF-8
    pub fn line_lossy(&self) -> std::borrow::Cow<'_, str> {
        String::from_utf8_lossy(&self.line)
    }
}

impl fmt::Display for Entry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: [{}] [{}] {}",
            self.info.container_id,
            self.source,
            self.timestamp_nanos,
            self.line_lossy()
        )
    }
}
