/// Errors that can occur while reading or writing kit frames.
#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    /// The payload does not fit the one-byte length field.
    #[error("payload too large ({size} bytes, max {max})")]
    PayloadTooLarge { size: usize, max: usize },

    /// A CLI command contained a line terminator.
    #[error("invalid command {0:?}: commands must not contain CR or LF")]
    InvalidCommand(String),

    /// An I/O error occurred while reading or writing the stream.
    #[error("frame I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The stream ended. Any partially received frame is discarded.
    #[error("connection closed")]
    ConnectionClosed,
}

impl FrameError {
    /// True if this is a read timeout on a serial link, which only means the
    /// kit was quiet for a while.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Io(err) if matches!(err.kind(), std::io::ErrorKind::TimedOut | std::io::ErrorKind::WouldBlock))
    }
}

pub type Result<T> = std::result::Result<T, FrameError>;
