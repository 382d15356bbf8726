//! Protobuf records carried inside frames
//!
//! Field numbers match `logdriver.LogEntry` so existing producers interoperate.

use bytes::Bytes;

/// One log record as written by the producer
#[derive(Clone, PartialEq, prost::Message)]
pub struct LogEntry {
    /// Originating output ("stdout" / "stderr")
    #[prost(string, tag = "1")]
    pub source: String,
    /// Timestamp in nanoseconds since the unix epoch
    #[prost(int64, tag = "2")]
    pub time_nano: i64,
    /// Raw line content, without trailing newline
    #[prost(bytes = "bytes", tag = "3")]
    pub line: Bytes,
    /// Set when the line was split by the producer
    #[prost(bool, tag = "4")]
    pub partial: bool,
    /// Reassembly metadata for split lines
    #[prost(message, optional, tag = "5")]
    pub partial_log_metadata: Option<PartialLogEntryMetadata>,
}

/// Describes where a partial line fits in its original line
#[derive(Clone, PartialEq, Eq, prost::Message)]
pub struct PartialLogEntryMetadata {
    /// Whether this is the final chunk
    #[prost(bool, tag = "1")]
    pub last: bool,
    /// Identifier shared by all chunks of one line
    #[prost(string, tag = "2")]
    pub id: String,
    /// Position of this chunk, starting at 1
    #[prost(int32, tag = "3")]
    pub ordinal: i32,
}

impl LogEntry {
    /// Create a complete (non-partial) entry
    pub fn new(source: impl Into<String>, time_nano: i64, line: impl Into<Bytes>) -> Self {
        Self {
            source: source.into(),
            time_nano,
            line: line.into(),
            partial: false,
            partial_log_metadata: None,
        }
    }
}
