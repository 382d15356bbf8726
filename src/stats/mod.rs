//! Per-stream forwarding statistics

pub mod metrics;

pub use metrics::{StreamCounters, StreamStats};
