//! Plugin request and response bodies
//!
//! JSON shapes of the `LogDriver.*` endpoints. Field names follow the
//! daemon's PascalCase convention.

use serde::{Deserialize, Serialize};

use crate::info::ContainerInfo;

/// `/LogDriver.StartLogging` endpoint
pub const START_LOGGING: &str = "/LogDriver.StartLogging";
/// `/LogDriver.StopLogging` endpoint
pub const STOP_LOGGING: &str = "/LogDriver.StopLogging";
/// `/LogDriver.Capabilities` endpoint
pub const CAPABILITIES: &str = "/LogDriver.Capabilities";
/// `/LogDriver.ReadLogs` endpoint
pub const READ_LOGS: &str = "/LogDriver.ReadLogs";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct StartLoggingRequest {
    /// Path of the FIFO carrying the container's log frames
    pub file: String,
    #[serde(default)]
    pub info: ContainerInfo,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct StopLoggingRequest {
    pub file: String,
}

/// Options of a log retrieval request
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct ReadConfig {
    pub since: Option<String>,
    pub until: Option<String>,
    pub tail: i64,
    pub follow: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ReadLogsRequest {
    #[serde(default)]
    pub info: ContainerInfo,
    #[serde(default)]
    pub config: ReadConfig,
}

/// What the driver can do beyond accepting logs
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Capability {
    pub read_logs: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CapabilitiesResponse {
    pub err: String,
    pub cap: Capability,
}

/// Generic reply: empty `Err` means success
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PluginResponse {
    pub err: String,
}

impl PluginResponse {
    pub fn ok() -> Self {
        Self::default()
    }

    pub fn from_result<T, E: std::fmt::Display>(result: &Result<T, E>) -> Self {
        match result {
            Ok(_) => Self::ok(),
            Err(e) => Self { err: e.to_string() },
        }
    }
}
