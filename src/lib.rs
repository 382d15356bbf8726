//! fifo-log-driver: log driver plugin core
//!
//! The container daemon hands the driver one FIFO per container. Each FIFO
//! carries a stream of length-prefixed protobuf `LogEntry` records. The driver
//! registers the stream, runs one forwarding loop per stream and hands every
//! decoded entry to a [`LogSink`].
//!
//! # Example
//!
//! ```no_run
//! use fifo_log_driver::driver::api::StartLoggingRequest;
//! use fifo_log_driver::{ContainerInfo, LogDriver, WriterSink};
//!
//! # async fn run() -> fifo_log_driver::Result<()> {
//! let driver = LogDriver::with_fifos(WriterSink::stdout());
//!
//! driver
//!     .start_logging(StartLoggingRequest {
//!         file: "/run/docker/logging/abc".into(),
//!         info: ContainerInfo::new("abc"),
//!     })
//!     .await?;
//! # Ok(())
//! # }
//! ```

pub mod driver;
pub mod error;
pub mod forwarder;
pub mod info;
pub mod protocol;
pub mod registry;
pub mod sink;
pub mod stats;

pub use driver::{LogDriver, Reply, StreamOpener};
#[cfg(unix)]
pub use driver::FifoOpener;
pub use error::{Error, FrameError, Result, SinkError};
pub use forwarder::StreamExit;
pub use info::ContainerInfo;
pub use protocol::{FrameDecoder, LogEntry, PartialLogEntryMetadata};
pub use registry::{Entry, ForwarderConfig, RegistryError, StreamId, StreamRegistry, StreamState};
pub use sink::{ChannelSink, LogSink, WriterSink};
pub use stats::StreamStats;
