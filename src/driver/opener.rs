//! Stream acquisition
//!
//! Opening a FIFO for reading blocks until a writer attaches, so the open
//! runs on tokio's blocking pool and the resulting file is then driven by the
//! reactor as a pipe receiver.

use std::future::Future;
use std::io;
use std::path::Path;

use tokio::io::AsyncRead;

/// Opens the readable stream behind a stream id
pub trait StreamOpener: Send + Sync + 'static {
    type Reader: AsyncRead + Unpin + Send + 'static;

    /// Open `path` for reading; may wait for a writer
    fn open(&self, path: &Path) -> impl Future<Output = io::Result<Self::Reader>> + Send;
}

/// Opens named pipes (FIFOs)
#[cfg(unix)]
#[derive(Debug, Clone, Copy, Default)]
pub struct FifoOpener;

#[cfg(unix)]
impl StreamOpener for FifoOpener {
    type Reader = tokio::net::unix::pipe::Receiver;

    async fn open(&self, path: &Path) -> io::Result<Self::Reader> {
        let path = path.to_owned();
        let file = tokio::task::spawn_blocking(move || {
            std::fs::OpenOptions::new().read(true).open(&path)
        })
        .await
        .map_err(|e| io::Error::new(io::ErrorKind::Other, e))??;

        tokio::net::unix::pipe::Receiver::from_file(file)
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_path() {
        let err = FifoOpener
            .open(Path::new("/nonexistent/fifo-log-driver/stream"))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_regular_file_rejected() {
        let path = std::env::temp_dir().join(format!("fifo-log-driver-{}", std::process::id()));
        std::fs::write(&path, b"not a pipe").unwrap();

        let result = FifoOpener.open(&path).await;
        std::fs::remove_file(&path).unwrap();

        assert!(result.is_err());
    }
}
