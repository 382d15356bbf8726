//! Line-oriented writer sink

use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::sync::Mutex;

use crate::error::SinkError;
use crate::registry::Entry;

use super::LogSink;

/// Writes each entry as one text line
///
/// Format: `<container id>: [<source>] [<timestamp nanos>] <line>`.
/// Lines from different streams never interleave within a line.
pub struct WriterSink<W> {
    writer: Mutex<W>,
}

impl<W> WriterSink<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer: Mutex::new(writer),
        }
    }

    /// Recover the writer
    pub fn into_inner(self) -> W {
        self.writer.into_inner()
    }
}

impl WriterSink<tokio::io::Stdout> {
    /// Sink printing to standard output
    pub fn stdout() -> Self {
        Self::new(tokio::io::stdout())
    }
}

impl<W> LogSink for WriterSink<W>
where
    W: AsyncWrite + Unpin + Send + 'static,
{
    async fn forward(&self, entry: Entry) -> Result<(), SinkError> {
        let mut line = entry.to_string().into_bytes();
        line.push(b'\n');

        let mut writer = self.writer.lock().await;
        writer.write_all(&line).await?;
        writer.flush().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use bytes::Bytes;

    use super::*;
    use crate::info::ContainerInfo;
    use crate::registry::StreamId;

    #[tokio::test]
    async fn test_line_format() {
        let sink = WriterSink::new(Vec::new());
        let info = Arc::new(ContainerInfo::new("c0ffee"));

        for (ts, line) in [(100, "hello"), (200, "world")] {
            sink.forward(Entry {
                stream: StreamId::new("a"),
                info: Arc::clone(&info),
                source: "stdout".into(),
                timestamp_nanos: ts,
                line: Bytes::from_static(line.as_bytes()),
                partial: None,
            })
            .await
            .unwrap();
        }

        let written = String::from_utf8(sink.into_inner()).unwrap();
        assert_eq!(
            written,
            "c0ffee: [stdout] [100] hello\nc0ffee: [stdout] [200] world\n"
        );
    }

    #[tokio::test]
    async fn test_write_failure() {
        let mock = tokio_test::io::Builder::new()
            .write_error(std::io::Error::from(std::io::ErrorKind::BrokenPipe))
            .build();
        let sink = WriterSink::new(mock);

        let result = sink
            .forward(Entry {
                stream: StreamId::new("a"),
                info: Arc::default(),
                source: "stderr".into(),
                timestamp_nanos: 1,
                line: Bytes::from_static(b"x"),
                partial: None,
            })
            .await;
        assert!(matches!(result, Err(SinkError::Io(_))));
    }
}
