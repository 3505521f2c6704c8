use std::path::Path;

use tracing::debug;

use crate::error::{Result, TransportError};
use crate::traits::KitStream;

/// Read-only byte source backed by a raw capture file.
///
/// A capture file is exactly the byte stream a kit emitted on its serial
/// port, so it runs through the same extractor as a live link.
pub struct ReplayFile;

impl ReplayFile {
    /// Open a capture file for replay.
    pub fn open(path: impl AsRef<Path>) -> Result<KitStream> {
        let path = path.as_ref();
        let file = std::fs::File::open(path).map_err(|source| TransportError::Replay {
            path: path.display().to_string(),
            source,
        })?;
        debug!(?path, "replaying capture file");
        Ok(KitStream::from_file(file, path.display().to_string()))
    }
}

#[cfg(test)]
mod tests {
    use std::io::{ErrorKind, Read, Write};

    use super::*;

    fn temp_file(tag: &str, contents: &[u8]) -> std::path::PathBuf {
        let path = std::env::temp_dir().join(format!(
            "kitsniff-replay-{tag}-{}.bin",
            std::process::id()
        ));
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn replays_file_contents() {
        let path = temp_file("read", b"unique\r\n");
        let mut stream = ReplayFile::open(&path).unwrap();

        let mut out = Vec::new();
        stream.read_to_end(&mut out).unwrap();
        assert_eq!(out, b"unique\r\n");
        assert_eq!(stream.transport_name(), "replay-file");
        assert!(!stream.is_writable());

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn writes_are_rejected() {
        let path = temp_file("write", b"");
        let mut stream = ReplayFile::open(&path).unwrap();

        let err = stream.write(b"help\r\n").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Unsupported);

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn missing_file_reports_path() {
        let err = ReplayFile::open("/nonexistent/kitsniff/capture.bin").unwrap_err();
        assert!(matches!(err, TransportError::Replay { .. }));
        assert!(err.to_string().contains("capture.bin"));
    }

    #[test]
    fn clone_shares_name_and_timeout_is_noop() {
        let path = temp_file("clone", b"x");
        let mut stream = ReplayFile::open(&path).unwrap();
        stream
            .set_read_timeout(Some(std::time::Duration::from_millis(5)))
            .unwrap();

        let cloned = stream.try_clone().unwrap();
        assert_eq!(cloned.name(), stream.name());
        assert!(format!("{cloned:?}").contains("replay-file"));

        let _ = std::fs::remove_file(&path);
    }
}
