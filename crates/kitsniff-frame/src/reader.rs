use std::io::{ErrorKind, Read};
use std::time::Duration;

use kitsniff_transport::{KitStream, TransportError};
use tracing::debug;

use crate::codec::RawFrame;
use crate::error::{FrameError, Result};
use crate::extractor::{ExtractorConfig, FrameExtractor};

const DEFAULT_READ_CHUNK_SIZE: usize = 1024;

/// Configuration for [`FrameReader`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReaderConfig {
    pub extractor: ExtractorConfig,
    /// Upper bound on a single `read` call. Default: 1 KiB.
    pub read_chunk_size: usize,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            extractor: ExtractorConfig::default(),
            read_chunk_size: DEFAULT_READ_CHUNK_SIZE,
        }
    }
}

/// Reads complete kit frames from any `Read` stream.
///
/// Handles partial reads internally; callers always get complete frames.
pub struct FrameReader<T> {
    inner: T,
    extractor: FrameExtractor,
    chunk: Vec<u8>,
}

impl<T: Read> FrameReader<T> {
    /// Create a new frame reader with default configuration.
    pub fn new(inner: T) -> Self {
        Self::with_config(inner, ReaderConfig::default())
    }

    /// Create a new frame reader with explicit configuration.
    pub fn with_config(inner: T, config: ReaderConfig) -> Self {
        Self {
            inner,
            extractor: FrameExtractor::with_config(config.extractor),
            chunk: vec![0u8; config.read_chunk_size.max(1)],
        }
    }

    /// Read the next complete frame (blocking).
    ///
    /// Returns `Err(FrameError::ConnectionClosed)` when EOF is reached; any
    /// partial frame still buffered is dropped. Read timeouts surface as
    /// `FrameError::Io` (see [`FrameError::is_timeout`]) without losing
    /// buffered bytes, so the call can simply be repeated.
    pub fn read_frame(&mut self) -> Result<RawFrame> {
        loop {
            if let Some(frame) = self.extractor.next_frame() {
                return Ok(frame);
            }

            let read = match self.inner.read(&mut self.chunk) {
                Ok(n) => n,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(FrameError::Io(err)),
            };

            if read == 0 {
                self.extractor.reset();
                return Err(FrameError::ConnectionClosed);
            }

            self.extractor.feed(&self.chunk[..read]);
        }
    }

    /// The extractor driven by this reader, for stats and state.
    pub fn extractor(&self) -> &FrameExtractor {
        &self.extractor
    }

    /// Borrow the underlying stream.
    pub fn get_ref(&self) -> &T {
        &self.inner
    }

    /// Mutably borrow the underlying stream.
    pub fn get_mut(&mut self) -> &mut T {
        &mut self.inner
    }

    /// Consume the reader and return the inner stream.
    pub fn into_inner(self) -> T {
        self.inner
    }
}

impl FrameReader<KitStream> {
    /// Create a frame reader for a `KitStream` and apply its read timeout.
    pub fn with_link(
        mut inner: KitStream,
        config: ReaderConfig,
        read_timeout: Option<Duration>,
    ) -> Result<Self> {
        inner
            .set_read_timeout(read_timeout)
            .map_err(transport_to_frame_error)?;
        debug!(
            link = inner.name(),
            transport = inner.transport_name(),
            layout = ?config.extractor.layout,
            "frame reader attached"
        );
        Ok(Self::with_config(inner, config))
    }
}

pub(crate) fn transport_to_frame_error(err: TransportError) -> FrameError {
    match err {
        TransportError::Io(io) | TransportError::Replay { source: io, .. } => FrameError::Io(io),
        other => FrameError::Io(std::io::Error::other(other.to_string())),
    }
}
