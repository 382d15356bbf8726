//! Registry error types
//!
//! Error types for stream registry operations.

use super::entry::StreamId;

/// Error type for registry operations
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// A stream with this id is already being forwarded
    AlreadyRegistered(StreamId),
}

impl std::fmt::Display for RegistryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RegistryError::AlreadyRegistered(id) => {
                write!(f, "logger for {:?} already exists", id.as_str())
            }
        }
    }
}

impl std::error::Error for RegistryError {}
