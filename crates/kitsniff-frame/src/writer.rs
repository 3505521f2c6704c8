use std::io::{ErrorKind, Write};

use bytes::{BufMut, BytesMut};
use tracing::debug;

use crate::codec::FOOTER;
use crate::error::{FrameError, Result};

const INITIAL_BUFFER_CAPACITY: usize = 64;

/// Writes CLI commands to a kit.
///
/// Each command goes out as `<command>\r\n`. The kit answers with text
/// frames that a [`FrameReader`](crate::FrameReader) on the same link picks up.
pub struct CommandWriter<T> {
    inner: T,
    buf: BytesMut,
}

impl<T: Write> CommandWriter<T> {
    pub fn new(inner: T) -> Self {
        Self {
            inner,
            buf: BytesMut::with_capacity(INITIAL_BUFFER_CAPACITY),
        }
    }

    /// Send one command line (blocking).
    ///
    /// The command must not contain CR or LF; the terminator is appended here.
    pub fn send_command(&mut self, command: &str) -> Result<()> {
        if command.contains(['\r', '\n']) {
            return Err(FrameError::InvalidCommand(command.to_string()));
        }

        self.buf.clear();
        self.buf.put_slice(command.as_bytes());
        self.buf.put_slice(&FOOTER);

        let mut offset = 0usize;
        while offset < self.buf.len() {
            match self.inner.write(&self.buf[offset..]) {
                Ok(0) => return Err(FrameError::ConnectionClosed),
                Ok(n) => offset += n,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) if err.kind() == ErrorKind::WouldBlock => continue,
                Err(err) => return Err(FrameError::Io(err)),
            }
        }

        debug!(command, "sent kit command");
        self.flush()
    }

    /// Flush the underlying stream.
    pub fn flush(&mut self) -> Result<()> {
        loop {
            match self.inner.flush() {
                Ok(()) => return Ok(()),
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) if err.kind() == ErrorKind::WouldBlock => continue,
                Err(err) => return Err(FrameError::Io(err)),
            }
        }
    }

    /// Borrow the underlying stream.
    pub fn get_ref(&self) -> &T {
        &self.inner
    }

    /// Mutably borrow the underlying stream.
    pub fn get_mut(&mut self) -> &mut T {
        &mut self.inner
    }

    /// Consume the writer and return the inner stream.
    pub fn into_inner(self) -> T {
        self.inner
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    use super::*;
    use crate::codec::RawFrame;
    use crate::reader::FrameReader;

    fn written(writer: CommandWriter<Cursor<Vec<u8>>>) -> Vec<u8> {
        writer.into_inner().into_inner()
    }

    #[test]
    fn appends_crlf() {
        let mut writer = CommandWriter::new(Cursor::new(Vec::new()));
        writer.send_command("channel 15").unwrap();
        assert_eq!(written(writer), b"channel 15\r\n");
    }

    #[test]
    fn multiple_commands() {
        let mut writer = CommandWriter::new(Cursor::new(Vec::new()));
        writer.send_command("unique").unwrap();
        writer.send_command("sniff").unwrap();
        assert_eq!(written(writer), b"unique\r\nsniff\r\n");
    }

    #[test]
    fn empty_command_is_a_bare_newline() {
        let mut writer = CommandWriter::new(Cursor::new(Vec::new()));
        writer.send_command("").unwrap();
        assert_eq!(written(writer), b"\r\n");
    }

    #[test]
    fn rejects_embedded_line_breaks() {
        let mut writer = CommandWriter::new(Cursor::new(Vec::new()));
        let err = writer.send_command("reset\r\nchannel 11").unwrap_err();
        assert!(matches!(err, FrameError::InvalidCommand(_)));
        assert!(err.to_string().contains("CR or LF"));
        assert!(written(writer).is_empty());
    }

    #[test]
    fn flush_propagates() {
        let sink = FlushTrackingWriter::default();
        let flag = Arc::clone(&sink.flushed);
        let mut writer = CommandWriter::new(sink);

        writer.send_command("x").unwrap();

        assert!(flag.load(Ordering::SeqCst));
    }

    #[test]
    fn accessors_and_into_inner() {
        let mut writer = CommandWriter::new(Cursor::new(Vec::<u8>::new()));

        let _ = writer.get_ref();
        let _ = writer.get_mut();
        let _inner = writer.into_inner();
    }

    #[test]
    fn handles_interrupted_write_and_flush() {
        let mut writer = CommandWriter::new(FlakyWriter::new(ErrorKind::Interrupted));
        writer.send_command("retry").unwrap();
        assert_eq!(writer.into_inner().data, b"retry\r\n");
    }

    #[test]
    fn handles_would_block_write_and_flush() {
        let mut writer = CommandWriter::new(FlakyWriter::new(ErrorKind::WouldBlock));
        writer.send_command("retry").unwrap();
        assert_eq!(writer.into_inner().data, b"retry\r\n");
    }

    #[test]
    fn connection_closed_when_write_returns_zero() {
        let mut writer = CommandWriter::new(ZeroWriter);
        let err = writer.send_command("x").unwrap_err();
        assert!(matches!(err, FrameError::ConnectionClosed));
    }

    #[test]
    fn other_write_errors_propagate() {
        let mut writer = CommandWriter::new(BrokenWriter);
        let err = writer.send_command("x").unwrap_err();
        assert!(matches!(err, FrameError::Io(e) if e.kind() == ErrorKind::BrokenPipe));
    }

    #[test]
    fn written_commands_read_back_as_text() {
        let mut writer = CommandWriter::new(Cursor::new(Vec::new()));
        writer.send_command("unique").unwrap();

        let mut reader = FrameReader::new(Cursor::new(written(writer)));
        match reader.read_frame().unwrap() {
            RawFrame::Text(line) => assert_eq!(line.bytes.as_ref(), b"unique\r\n"),
            other => panic!("unexpected frame: {other:?}"),
        }
    }

    #[derive(Default)]
    struct FlushTrackingWriter {
        flushed: Arc<AtomicBool>,
        data: Vec<u8>,
    }

    impl Write for FlushTrackingWriter {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.data.extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            self.flushed.store(true, Ordering::SeqCst);
            Ok(())
        }
    }

    /// Fails the first write and the first flush with `kind`, then behaves.
    /// Later writes accept at most two bytes to exercise the offset loop.
    struct FlakyWriter {
        kind: ErrorKind,
        wrote_once: bool,
        flushed_once: bool,
        data: Vec<u8>,
    }

    impl FlakyWriter {
        fn new(kind: ErrorKind) -> Self {
            Self {
                kind,
                wrote_once: false,
                flushed_once: false,
                data: Vec::new(),
            }
        }
    }

    impl Write for FlakyWriter {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            if !self.wrote_once {
                self.wrote_once = true;
                return Err(std::io::Error::from(self.kind));
            }
            let n = buf.len().min(2);
            self.data.extend_from_slice(&buf[..n]);
            Ok(n)
        }

        fn flush(&mut self) -> std::io::Result<()> {
            if !self.flushed_once {
                self.flushed_once = true;
                return Err(std::io::Error::from(self.kind));
            }
            Ok(())
        }
    }

    struct ZeroWriter;

    impl Write for ZeroWriter {
        fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
            Ok(0)
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    struct BrokenWriter;

    impl Write for BrokenWriter {
        fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
            Err(std::io::Error::from(ErrorKind::BrokenPipe))
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }
}
