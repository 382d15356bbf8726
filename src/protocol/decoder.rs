//! Frame decoder
//!
//! Reads exactly one length-prefixed frame per [`FrameDecoder::decode`] call.
//! Reads go through a buffer that belongs to the decoder for the life of the
//! stream. After a bad frame, [`FrameDecoder::reset`] drops the partial frame
//! state only; bytes already buffered stay queued, so the next decode starts at
//! the byte right after the last one consumed.

use bytes::BytesMut;
use prost::Message;
use tokio::io::{AsyncRead, AsyncReadExt, BufReader};

use crate::error::FrameError;
use crate::protocol::constants::{DEFAULT_READ_BUFFER_SIZE, LENGTH_PREFIX_LEN, MAX_FRAME_LEN};
use crate::protocol::message::LogEntry;

/// Decodes `LogEntry` frames from an async reader
pub struct FrameDecoder<R> {
    reader: BufReader<R>,
    buf: BytesMut,
    max_frame_len: usize,
}

impl<R: AsyncRead + Unpin> FrameDecoder<R> {
    /// Create a decoder with default limits
    pub fn new(reader: R) -> Self {
        Self::with_limits(reader, DEFAULT_READ_BUFFER_SIZE, MAX_FRAME_LEN)
    }

    /// Create a decoder with an explicit read buffer size and frame bound
    pub fn with_limits(reader: R, read_buffer_size: usize, max_frame_len: usize) -> Self {
        Self {
            reader: BufReader::with_capacity(read_buffer_size, reader),
            buf: BytesMut::new(),
            max_frame_len,
        }
    }

    /// Maximum accepted payload length
    pub fn max_frame_len(&self) -> usize {
        self.max_frame_len
    }

    /// Start over with fresh framing state at the current byte position
    ///
    /// Buffered but unconsumed bytes are kept.
    pub fn reset(&mut self) {
        self.buf = BytesMut::new();
    }

    /// Decode the next frame
    ///
    /// Returns `EndOfStream` only when the stream ends cleanly before the first
    /// byte of a length prefix. An end inside a frame is `Truncated`.
    pub async fn decode(&mut self) -> Result<LogEntry, FrameError> {
        let len = self.read_length().await?;

        if len > self.max_frame_len {
            return Err(FrameError::FrameTooLarge {
                len,
                max: self.max_frame_len,
            });
        }

        self.buf.clear();
        self.buf.resize(len, 0);
        if let Err(e) = self.reader.read_exact(&mut self.buf[..]).await {
            return Err(match e.kind() {
                std::io::ErrorKind::UnexpectedEof => FrameError::Truncated { expected: len },
                _ => FrameError::Io(e),
            });
        }

        // Split off the payload so the decoded entry never shares memory with
        // the next read.
        let payload = self.buf.split_to(len).freeze();
        Ok(LogEntry::decode(payload)?)
    }

    async fn read_length(&mut self) -> Result<usize, FrameError> {
        let mut prefix = [0u8; LENGTH_PREFIX_LEN];
        let mut filled = 0;

        while filled < LENGTH_PREFIX_LEN {
            let n = self.reader.read(&mut prefix[filled..]).await?;
            if n == 0 {
                return Err(if filled == 0 {
                    FrameError::EndOfStream
                } else {
                    FrameError::Truncated {
                        expected: LENGTH_PREFIX_LEN,
                    }
                });
            }
            filled += n;
        }

        Ok(u32::from_be_bytes(prefix) as usize)
    }
}
