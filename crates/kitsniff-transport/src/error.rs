/// Errors that can occur while opening or driving a kit byte source.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The serial device could not be opened.
    #[error("failed to open serial port {path}: {source}")]
    Open {
        path: String,
        source: serialport::Error,
    },

    /// The serial device rejected a settings change.
    #[error("failed to configure serial port {path}: {source}")]
    Configure {
        path: String,
        source: serialport::Error,
    },

    /// The replay file could not be opened.
    #[error("failed to open replay file {path}: {source}")]
    Replay {
        path: String,
        source: std::io::Error,
    },

    /// An I/O error occurred on the stream.
    #[error("transport I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, TransportError>;
