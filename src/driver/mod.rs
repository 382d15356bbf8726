//! Log driver plugin surface
//!
//! Maps the daemon's plugin calls onto the registry and forwarding loops.
//! Transport is left to the caller: [`LogDriver::dispatch`] takes an endpoint
//! path and a JSON body and returns a [`Reply`] that any HTTP layer can
//! serialize.

pub mod api;
pub mod opener;

use std::path::Path;
use std::sync::Arc;

use serde::Serialize;
use tokio::task::JoinHandle;

use crate::error::{Error, Result};
use crate::forwarder::{self, StreamExit};
use crate::registry::{ForwarderConfig, RegistryError, StreamId, StreamRegistry};
use crate::sink::LogSink;

use api::{
    Capability, CapabilitiesResponse, PluginResponse, ReadLogsRequest, StartLoggingRequest,
    StopLoggingRequest,
};
pub use opener::StreamOpener;
#[cfg(unix)]
pub use opener::FifoOpener;

/// Outcome of a dispatched plugin call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    /// Success or in-band error, JSON encoded
    Json(Vec<u8>),
    /// Request body could not be parsed
    BadRequest(String),
    /// Endpoint exists but is not implemented
    NotImplemented(String),
    /// Unknown endpoint
    NotFound,
    /// Reply could not be encoded
    Internal(String),
}

fn json_reply<T: Serialize>(value: &T) -> Reply {
    match serde_json::to_vec(value) {
        Ok(body) => Reply::Json(body),
        Err(e) => Reply::Internal(e.to_string()),
    }
}

/// Log driver: opener + registry + sink
pub struct LogDriver<S, O> {
    registry: Arc<StreamRegistry>,
    sink: Arc<S>,
    opener: O,
}

#[cfg(unix)]
impl<S: LogSink> LogDriver<S, FifoOpener> {
    /// Driver reading from FIFOs with default configuration
    pub fn with_fifos(sink: S) -> Self {
        Self::new(sink, FifoOpener)
    }
}

impl<S, O> LogDriver<S, O>
where
    S: LogSink,
    O: StreamOpener,
{
    /// Create a driver with default forwarding configuration
    pub fn new(sink: S, opener: O) -> Self {
        Self::with_config(sink, opener, ForwarderConfig::default())
    }

    /// Create a driver with custom forwarding configuration
    pub fn with_config(sink: S, opener: O, config: ForwarderConfig) -> Self {
        Self {
            registry: Arc::new(StreamRegistry::with_config(config)),
            sink: Arc::new(sink),
            opener,
        }
    }

    /// Get a reference to the stream registry
    pub fn registry(&self) -> &Arc<StreamRegistry> {
        &self.registry
    }

    /// Begin forwarding a container's log stream
    ///
    /// Opens the stream (waiting for the writer), registers it and starts its
    /// forwarding loop. Nothing is registered if any step fails.
    pub async fn start_logging(&self, req: StartLoggingRequest) -> Result<JoinHandle<StreamExit>> {
        if req.info.container_id.is_empty() {
            return Err(Error::InvalidRequest(
                "must provide container id in log context".into(),
            ));
        }
        if req.file.is_empty() {
            return Err(Error::InvalidRequest("must provide log file path".into()));
        }

        tracing::info!(
            file = %req.file,
            container = %req.info.short_id(),
            name = %req.info.name(),
            "Start logging"
        );

        // Cheap pre-check so a duplicate does not block in open; register()
        // checks again atomically.
        if self.registry.contains(&req.file).await {
            return Err(RegistryError::AlreadyRegistered(StreamId::new(&req.file)).into());
        }

        let path = Path::new(&req.file);
        let reader = self.opener.open(path).await.map_err(|source| Error::Open {
            path: path.to_path_buf(),
            source,
        })?;

        let registration = self
            .registry
            .register(req.file.as_str(), reader, req.info)
            .await?;

        let streams = self.registry.stream_ids().await;
        tracing::debug!(streams = ?streams, "Active streams");

        Ok(forwarder::spawn(
            Arc::clone(&self.registry),
            registration,
            Arc::clone(&self.sink),
        ))
    }

    /// Stop forwarding a stream; unknown files are ignored
    pub async fn stop_logging(&self, req: StopLoggingRequest) -> Result<()> {
        tracing::info!(file = %req.file, "Stop logging");
        self.registry.deregister(&req.file).await;
        Ok(())
    }

    /// Advertised capabilities
    pub fn capabilities(&self) -> CapabilitiesResponse {
        CapabilitiesResponse {
            err: String::new(),
            cap: Capability { read_logs: false },
        }
    }

    /// Log retrieval is not supported
    pub fn read_logs(&self, req: &ReadLogsRequest) -> Result<()> {
        tracing::info!(
            container = %req.info.short_id(),
            "Read logs requested, not supported"
        );
        Err(Error::NotSupported("ReadLogs"))
    }

    /// Close every stream and wait for all forwarding loops to exit
    pub async fn shutdown(&self) {
        let ids = self.registry.stream_ids().await;
        tracing::info!(streams = ids.len(), "Shutting down");

        for id in ids {
            self.registry.deregister_and_wait(id.as_str()).await;
        }
    }

    /// Handle one plugin call
    pub async fn dispatch(&self, endpoint: &str, body: &[u8]) -> Reply {
        match endpoint {
            api::START_LOGGING => match serde_json::from_slice::<StartLoggingRequest>(body) {
                Ok(req) => {
                    let result = self.start_logging(req).await;
                    if let Err(e) = &result {
                        tracing::warn!(error = %e, "Start logging failed");
                    }
                    json_reply(&PluginResponse::from_result(&result))
                }
                Err(e) => Reply::BadRequest(e.to_string()),
            },
            api::STOP_LOGGING => match serde_json::from_slice::<StopLoggingRequest>(body) {
                Ok(req) => json_reply(&PluginResponse::from_result(&self.stop_logging(req).await)),
                Err(e) => Reply::BadRequest(e.to_string()),
            },
            api::CAPABILITIES => json_reply(&self.capabilities()),
            api::READ_LOGS => match serde_json::from_slice::<ReadLogsRequest>(body) {
                Ok(req) => match self.read_logs(&req) {
                    Ok(()) => json_reply(&PluginResponse::ok()),
                    Err(e) => Reply::NotImplemented(e.to_string()),
                },
                Err(e) => Reply::BadRequest(e.to_string()),
            },
            _ => Reply::NotFound,
        }
    }
}
