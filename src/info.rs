//! Source metadata
//!
//! Describes the container a stream belongs to, as sent by the daemon with
//! each `StartLogging` request. The registry and forwarding loop never look
//! inside it; it is attached unchanged to every entry of the stream.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Length of the abbreviated container id
const SHORT_ID_LEN: usize = 12;

// The daemon is written in Go and sends `null` for empty slices and maps.
mod null_as_default {
    use serde::{Deserialize, Deserializer};

    pub fn deserialize<'de, D, T>(deserializer: D) -> Result<T, D::Error>
    where
        D: Deserializer<'de>,
        T: Default + Deserialize<'de>,
    {
        let opt = Option::<T>::deserialize(deserializer)?;
        Ok(opt.unwrap_or_default())
    }
}

/// Container description carried with a stream
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct ContainerInfo {
    /// Log options passed to the driver (`--log-opt`)
    #[serde(deserialize_with = "null_as_default::deserialize")]
    pub config: HashMap<String, String>,
    #[serde(rename = "ContainerID")]
    pub container_id: String,
    pub container_name: String,
    pub container_entrypoint: String,
    #[serde(deserialize_with = "null_as_default::deserialize")]
    pub container_args: Vec<String>,
    #[serde(rename = "ContainerImageID")]
    pub container_image_id: String,
    pub container_image_name: String,
    /// Creation time as RFC 3339 text
    pub container_created: String,
    #[serde(deserialize_with = "null_as_default::deserialize")]
    pub container_env: Vec<String>,
    #[serde(deserialize_with = "null_as_default::deserialize")]
    pub container_labels: HashMap<String, String>,
    pub log_path: String,
    pub daemon_name: String,
}

impl ContainerInfo {
    /// Create info for a container id, everything else empty
    pub fn new(container_id: impl Into<String>) -> Self {
        Self {
            container_id: container_id.into(),
            ..Default::default()
        }
    }

    /// First 12 characters of the container id
    pub fn short_id(&self) -> &str {
        match self.container_id.char_indices().nth(SHORT_ID_LEN) {
            Some((idx, _)) => &self.container_id[..idx],
            None => &self.container_id,
        }
    }

    /// Container name without the leading slash the daemon adds
    pub fn name(&self) -> &str {
        self.container_name.trim_start_matches('/')
    }
}
