//! Log entry wire protocol
//!
//! Producers write a sequence of length-prefixed frames onto the stream:
//!
//! ```text
//! +----------------------+------------------------------+
//! | length (u32, BE)     | LogEntry (protobuf, length B)|
//! +----------------------+------------------------------+
//! ```
//!
//! A declared length above [`MAX_FRAME_LEN`](constants::MAX_FRAME_LEN) is a
//! protocol violation. The payload is the `logdriver.LogEntry` protobuf record.

pub mod constants;
pub mod decoder;
pub mod encoder;
pub mod message;

pub use decoder::FrameDecoder;
pub use encoder::encode_frame;
pub use message::{LogEntry, PartialLogEntryMetadata};
