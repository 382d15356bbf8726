//! Error types
//!
//! `Error` is what the driver surface returns. Frame and sink errors are
//! mostly handled inside the forwarding loop and only show up in logs, but
//! they convert into `Error` so `?` works at every layer.

use std::fmt;
use std::io;
use std::path::PathBuf;

use crate::registry::RegistryError;

/// Result alias used across the crate
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level error type
#[derive(Debug)]
pub enum Error {
    /// Registry rejected the operation
    Registry(RegistryError),
    /// The stream resource could not be opened
    Open { path: PathBuf, source: io::Error },
    /// Frame decoding or encoding failed
    Frame(FrameError),
    /// The sink refused an entry
    Sink(SinkError),
    /// Request was well-formed JSON but semantically invalid
    InvalidRequest(String),
    /// Operation is not implemented by this driver
    NotSupported(&'static str),
    /// Request or response body could not be (de)serialized
    Json(serde_json::Error),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Registry(e) => write!(f, "{}", e),
            Error::Open { path, source } => {
                write!(f, "error opening logger fifo: {:?}: {}", path, source)
            }
            Error::Frame(e) => write!(f, "frame error: {}", e),
            Error::Sink(e) => write!(f, "sink error: {}", e),
            Error::InvalidRequest(msg) => write!(f, "{}", msg),
            Error::NotSupported(op) => write!(f, "{} is not supported", op),
            Error::Json(e) => write!(f, "invalid json: {}", e),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Registry(e) => Some(e),
            Error::Open { source, .. } => Some(source),
            Error::Frame(e) => Some(e),
            Error::Sink(e) => Some(e),
            Error::Json(e) => Some(e),
            Error::InvalidRequest(_) | Error::NotSupported(_) => None,
        }
    }
}

impl From<RegistryError> for Error {
    fn from(e: RegistryError) -> Self {
        Error::Registry(e)
    }
}

impl From<FrameError> for Error {
    fn from(e: FrameError) -> Self {
        Error::Frame(e)
    }
}

impl From<SinkError> for Error {
    fn from(e: SinkError) -> Self {
        Error::Sink(e)
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Json(e)
    }
}

/// Failure to produce one frame from a stream
///
/// Split into terminal kinds (the stream is gone) and transient kinds (this
/// frame is bad, the stream may still be usable); see [`FrameError::is_terminal`].
#[derive(Debug)]
pub enum FrameError {
    /// The stream's close signal fired
    Closed,
    /// Clean end of stream at a frame boundary
    EndOfStream,
    /// Declared length exceeds the configured bound
    FrameTooLarge { len: usize, max: usize },
    /// Stream ended part-way through a frame
    Truncated { expected: usize },
    /// Payload is not a valid log entry
    Decode(prost::DecodeError),
    /// Underlying read failed
    Io(io::Error),
}

impl FrameError {
    /// Whether the stream itself is closed or unavailable.
    pub fn is_terminal(&self) -> bool {
        match self {
            FrameError::Closed | FrameError::EndOfStream => true,
            FrameError::Io(e) => matches!(
                e.kind(),
                io::ErrorKind::BrokenPipe
                    | io::ErrorKind::NotFound
                    | io::ErrorKind::NotConnected
                    | io::ErrorKind::ConnectionReset
                    | io::ErrorKind::ConnectionAborted
            ),
            FrameError::FrameTooLarge { .. } | FrameError::Truncated { .. } | FrameError::Decode(_) => {
                false
            }
        }
    }
}

impl fmt::Display for FrameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FrameError::Closed => write!(f, "stream closed"),
            FrameError::EndOfStream => write!(f, "end of stream"),
            FrameError::FrameTooLarge { len, max } => {
                write!(f, "frame length {} exceeds maximum {}", len, max)
            }
            FrameError::Truncated { expected } => {
                write!(f, "stream ended inside a frame ({} bytes expected)", expected)
            }
            FrameError::Decode(e) => write!(f, "malformed log entry: {}", e),
            FrameError::Io(e) => write!(f, "read failed: {}", e),
        }
    }
}

impl std::error::Error for FrameError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            FrameError::Decode(e) => Some(e),
            FrameError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for FrameError {
    fn from(e: io::Error) -> Self {
        FrameError::Io(e)
    }
}

impl From<prost::DecodeError> for FrameError {
    fn from(e: prost::DecodeError) -> Self {
        FrameError::Decode(e)
    }
}

/// Failure to hand an entry to a sink
#[derive(Debug)]
pub enum SinkError {
    /// Consumer side is gone
    Closed,
    /// Writing the entry failed
    Io(io::Error),
}

impl fmt::Display for SinkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SinkError::Closed => write!(f, "sink closed"),
            SinkError::Io(e) => write!(f, "write failed: {}", e),
        }
    }
}

impl std::error::Error for SinkError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SinkError::Io(e) => Some(e),
            SinkError::Closed => None,
        }
    }
}

impl From<io::Error> for SinkError {
    fn from(e: io::Error) -> Self {
        SinkError::Io(e)
    }
}
