//! Stream registry
//!
//! The registry tracks every stream currently being forwarded and owns the
//! means to close each one. The readers themselves live in their forwarding
//! loops; the registry only holds handles.
//!
//! # Architecture
//!
//! ```text
//!                      Arc<StreamRegistry>
//!                 ┌──────────────────────────┐
//!                 │ streams: HashMap<Id,     │
//!                 │   StreamHandle {         │
//!                 │     closer,              │
//!                 │     state: watch::Rx,    │
//!                 │   }                      │
//!                 │ >                        │
//!                 └──────┬─────────────▲─────┘
//!           register()   │             │ remove_instance()
//!                        ▼             │
//!                  Registration ──► [forwarding loop] ──► LogSink
//!                  (reader, closer)     decode / forward
//! ```
//!
//! # Closing
//!
//! A stream is closed either by `deregister` or by its loop seeing the stream
//! end. Both paths fire the same `CancellationToken`, which is idempotent, and
//! the entry is removed by whichever path reaches the table first. Each
//! registration carries an instance number so a loop never removes a later
//! registration of the same id.

pub mod config;
pub mod entry;
pub mod error;
pub mod handle;
pub mod store;

pub use config::ForwarderConfig;
pub use entry::{Entry, StreamId};
pub use error::RegistryError;
pub use handle::{ClosedSignal, Registration, StreamHandle, StreamState};
pub use store::StreamRegistry;
