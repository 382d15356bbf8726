use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;

use bytes::{Bytes, BytesMut};
use tokio::io::{AsyncWriteExt, DuplexStream};
use tokio::time::timeout;

use fifo_log_driver::driver::api::{self, PluginResponse, StartLoggingRequest};
use fifo_log_driver::protocol::constants::MAX_FRAME_LEN;
use fifo_log_driver::protocol::encode_frame;
use fifo_log_driver::{
    ChannelSink, ContainerInfo, LogDriver, LogEntry, PartialLogEntryMetadata, Reply, StreamExit,
    StreamOpener, WriterSink,
};

const WAIT: Duration = Duration::from_secs(5);

#[derive(Default)]
struct MemoryOpener {
    streams: Mutex<HashMap<PathBuf, DuplexStream>>,
}

impl MemoryOpener {
    fn with_streams(paths: &[&str]) -> (Self, Vec<DuplexStream>) {
        let opener = Self::default();
        let mut writers = Vec::new();
        for path in paths {
            let (reader, writer) = tokio::io::duplex(64 * 1024);
            opener
                .streams
                .lock()
                .unwrap()
                .insert(PathBuf::from(path), reader);
            writers.push(writer);
        }
        (opener, writers)
    }
}

impl StreamOpener for MemoryOpener {
    type Reader = DuplexStream;

    async fn open(&self, path: &Path) -> io::Result<DuplexStream> {
        self.streams
            .lock()
            .unwrap()
            .remove(path)
            .ok_or_else(|| io::Error::from(io::ErrorKind::NotFound))
    }
}

fn frame(entry: &LogEntry) -> BytesMut {
    let mut buf = BytesMut::new();
    encode_frame(entry, &mut buf, MAX_FRAME_LEN).unwrap();
    buf
}

fn start(file: &str, container: &str) -> StartLoggingRequest {
    StartLoggingRequest {
        file: file.into(),
        info: ContainerInfo::new(container),
    }
}

#[tokio::test]
async fn test_forwards_in_order_then_ends() {
    let (opener, mut writers) = MemoryOpener::with_streams(&["/run/logs/a"]);
    let (sink, mut rx) = ChannelSink::new(64);
    let driver = LogDriver::new(sink, opener);

    let handle = driver.start_logging(start("/run/logs/a", "c1")).await.unwrap();

    let mut writer = writers.remove(0);
    for i in 0..20 {
        let entry = LogEntry::new("stdout", i, Bytes::from(format!("line {}", i)));
        writer.write_all(&frame(&entry)).await.unwrap();
    }
    drop(writer);

    for i in 0..20 {
        let entry = timeout(WAIT, rx.recv()).await.unwrap().unwrap();
        assert_eq!(entry.timestamp_nanos, i);
        assert_eq!(entry.line_lossy(), format!("line {}", i));
    }

    assert_eq!(timeout(WAIT, handle).await.unwrap().unwrap(), StreamExit::StreamEnded);
    assert!(!driver.registry().contains("/run/logs/a").await);
}

#[tokio::test]
async fn test_partial_metadata_survives() {
    let (opener, mut writers) = MemoryOpener::with_streams(&["/run/logs/p"]);
    let (sink, mut rx) = ChannelSink::new(8);
    let driver = LogDriver::new(sink, opener);

    driver.start_logging(start("/run/logs/p", "c1")).await.unwrap();

    let mut entry = LogEntry::new("stderr", 7, Bytes::from_static(b"first half"));
    entry.partial = true;
    entry.partial_log_metadata = Some(PartialLogEntryMetadata {
        last: false,
        id: "p1".into(),
        ordinal: 1,
    });
    writers[0].write_all(&frame(&entry)).await.unwrap();

    let got = timeout(WAIT, rx.recv()).await.unwrap().unwrap();
    assert!(got.is_partial());
    let meta = got.partial.unwrap();
    assert_eq!(meta.id, "p1");
    assert_eq!(meta.ordinal, 1);
    assert_eq!(got.source, "stderr");
}

#[tokio::test]
async fn test_garbage_between_frames_does_not_stop_stream() {
    let (opener, mut writers) = MemoryOpener::with_streams(&["/run/logs/g"]);
    let (sink, mut rx) = ChannelSink::new(8);
    let driver = LogDriver::new(sink, opener);

    let handle = driver.start_logging(start("/run/logs/g", "c1")).await.unwrap();

    let mut writer = writers.remove(0);
    writer
        .write_all(&frame(&LogEntry::new("stdout", 1, Bytes::from_static(b"before"))))
        .await
        .unwrap();
    let first = timeout(WAIT, rx.recv()).await.unwrap().unwrap();
    assert_eq!(first.line_lossy(), "before");

    // Oversized length prefix
    writer.write_all(&[0xFF, 0xFF, 0xFF, 0xFF]).await.unwrap();
    tokio::time::sleep(Duration::from_millis(50)).await;

    writer
        .write_all(&frame(&LogEntry::new("stdout", 2, Bytes::from_static(b"after"))))
        .await
        .unwrap();
    let second = timeout(WAIT, rx.recv()).await.unwrap().unwrap();
    assert_eq!(second.line_lossy(), "after");

    let stats = driver.registry().stream_stats("/run/logs/g").await.unwrap();
    assert!(stats.framing_errors >= 1);

    drop(writer);
    assert_eq!(timeout(WAIT, handle).await.unwrap().unwrap(), StreamExit::StreamEnded);
}

#[tokio::test]
async fn test_bad_frame_and_good_frames_in_one_write() {
    let (opener, mut writers) = MemoryOpener::with_streams(&["/run/logs/b"]);
    let (sink, mut rx) = ChannelSink::new(8);
    let driver = LogDriver::new(sink, opener);

    driver.start_logging(start("/run/logs/b", "c1")).await.unwrap();

    // Well-framed payload that is not a log entry, then two good frames
    let mut wire = BytesMut::from(&[0u8, 0, 0, 2, 0x0A, 0x05][..]);
    wire.extend_from_slice(&frame(&LogEntry::new("stdout", 1, Bytes::from_static(b"A"))));
    wire.extend_from_slice(&frame(&LogEntry::new("stdout", 2, Bytes::from_static(b"B"))));
    writers[0].write_all(&wire).await.unwrap();

    let a = timeout(WAIT, rx.recv()).await.unwrap().unwrap();
    let b = timeout(WAIT, rx.recv()).await.unwrap().unwrap();
    assert_eq!(a.line_lossy(), "A");
    assert_eq!(b.line_lossy(), "B");

    let stats = driver.registry().stream_stats("/run/logs/b").await.unwrap();
    assert_eq!(stats.framing_errors, 1);
}

#[tokio::test]
async fn test_plugin_calls_through_dispatch() {
    let (opener, mut writers) = MemoryOpener::with_streams(&["/run/logs/d"]);
    let driver = LogDriver::new(WriterSink::new(Vec::new()), opener);

    let reply = driver
        .dispatch(
            api::START_LOGGING,
            br#"{"File":"/run/logs/d","Info":{"ContainerID":"abc","ContainerName":"/web"}}"#,
        )
        .await;
    let body = match reply {
        Reply::Json(body) => serde_json::from_slice::<PluginResponse>(&body).unwrap(),
        other => panic!("unexpected reply {:?}", other),
    };
    assert_eq!(body.err, "");

    let info = driver.registry().stream_info("/run/logs/d").await.unwrap();
    assert_eq!(info.name(), "web");

    writers[0]
        .write_all(&frame(&LogEntry::new("stdout", 1, Bytes::from_static(b"x"))))
        .await
        .unwrap();

    let reply = driver
        .dispatch(api::STOP_LOGGING, br#"{"File":"/run/logs/d"}"#)
        .await;
    assert!(matches!(reply, Reply::Json(_)));
    assert!(!driver.registry().contains("/run/logs/d").await);
}

#[cfg(unix)]
#[tokio::test]
async fn test_real_fifo() {
    use std::io::Write;

    let dir = std::env::temp_dir().join(format!("fifo-log-driver-it-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join("container.fifo");

    let made = std::process::Command::new("mkfifo").arg(&path).status();
    if !matches!(made, Ok(status) if status.success()) {
        // No mkfifo on this host
        let _ = std::fs::remove_dir_all(&dir);
        return;
    }

    let (sink, mut rx) = ChannelSink::new(8);
    let driver = LogDriver::with_fifos(sink);

    let writer_path = path.clone();
    let writer = std::thread::spawn(move || {
        let mut fifo = std::fs::OpenOptions::new()
            .write(true)
            .open(&writer_path)
            .unwrap();
        for (i, line) in ["hello", "world"].iter().enumerate() {
            let entry = LogEntry::new("stdout", i as i64, Bytes::from(line.to_string()));
            fifo.write_all(&frame(&entry)).unwrap();
        }
    });

    let file = path.to_string_lossy().into_owned();
    let handle = timeout(WAIT, driver.start_logging(start(&file, "streamA")))
        .await
        .unwrap()
        .unwrap();

    let hello = timeout(WAIT, rx.recv()).await.unwrap().unwrap();
    let world = timeout(WAIT, rx.recv()).await.unwrap().unwrap();
    assert_eq!(hello.to_string(), "streamA: [stdout] [0] hello");
    assert_eq!(world.to_string(), "streamA: [stdout] [1] world");

    writer.join().unwrap();
    assert_eq!(timeout(WAIT, handle).await.unwrap().unwrap(), StreamExit::StreamEnded);

    std::fs::remove_dir_all(&dir).unwrap();
}
