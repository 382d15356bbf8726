//! Frame encoder
//!
//! Producer side of the framing. The driver itself only decodes; this is for
//! producers embedding the crate and for tests.

use bytes::{BufMut, BytesMut};
use prost::Message;

use crate::error::FrameError;
use crate::protocol::constants::LENGTH_PREFIX_LEN;
use crate::protocol::message::LogEntry;

/// Append one frame holding `entry` to `dst`
///
/// Fails without touching `dst` if the encoded entry exceeds `max_frame_len`.
pub fn encode_frame(
    entry: &LogEntry,
    dst: &mut BytesMut,
    max_frame_len: usize,
) -> Result<(), FrameError> {
    let len = entry.encoded_len();
    if len > max_frame_len {
        return Err(FrameError::FrameTooLarge {
            len,
            max: max_frame_len,
        });
    }

    dst.reserve(LENGTH_PREFIX_LEN + len);
    dst.put_u32(len as u32);
    entry
        .encode(dst)
        .map_err(|e| FrameError::Io(std::io::Error::new(std::io::ErrorKind::Other, e)))
}
