use std::io::{ErrorKind, Read, Write};
use std::time::Duration;

use crate::error::{Result, TransportError};

// Serial backends have no "infinite" timeout; a day is close enough.
const BLOCKING_READ_TIMEOUT: Duration = Duration::from_secs(24 * 60 * 60);

/// A connected kit byte source implementing Read + Write.
///
/// Serial links are full duplex (frames in, CLI commands out). Replay files
/// are read-only; writing to one fails with `ErrorKind::Unsupported`.
pub struct KitStream {
    inner: KitStreamInner,
    name: String,
}

enum KitStreamInner {
    Serial(Box<dyn serialport::SerialPort>),
    File(std::fs::File),
}

impl Read for KitStream {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        match &mut self.inner {
            KitStreamInner::Serial(port) => port.read(buf),
            KitStreamInner::File(file) => file.read(buf),
        }
    }
}

impl Write for KitStream {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        match &mut self.inner {
            KitStreamInner::Serial(port) => port.write(buf),
            KitStreamInner::File(_) => Err(read_only()),
        }
    }

    fn flush(&mut self) -> std::io::Result<()> {
        match &mut self.inner {
            KitStreamInner::Serial(port) => port.flush(),
            KitStreamInner::File(_) => Ok(()),
        }
    }
}

impl KitStream {
    pub(crate) fn from_serial(port: Box<dyn serialport::SerialPort>, name: String) -> Self {
        Self {
            inner: KitStreamInner::Serial(port),
            name,
        }
    }

    pub(crate) fn from_file(file: std::fs::File, name: String) -> Self {
        Self {
            inner: KitStreamInner::File(file),
            name,
        }
    }

    /// Port path or file name this stream was opened from.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Transport name for diagnostics.
    pub fn transport_name(&self) -> &'static str {
        match &self.inner {
            KitStreamInner::Serial(_) => "serial",
            KitStreamInner::File(_) => "replay-file",
        }
    }

    /// Returns true if the stream accepts CLI commands.
    pub fn is_writable(&self) -> bool {
        matches!(self.inner, KitStreamInner::Serial(_))
    }

    /// Set the read timeout on the underlying device.
    ///
    /// `None` means "block as long as the platform allows". Replay files never
    /// block, so this is a no-op for them.
    pub fn set_read_timeout(&mut self, timeout: Option<Duration>) -> Result<()> {
        match &mut self.inner {
            KitStreamInner::Serial(port) => port
                .set_timeout(timeout.unwrap_or(BLOCKING_READ_TIMEOUT))
                .map_err(|source| TransportError::Configure {
                    path: self.name.clone(),
                    source,
                }),
            KitStreamInner::File(_) => Ok(()),
        }
    }

    /// Try to clone this stream, e.g. to hand the write half to another thread.
    pub fn try_clone(&self) -> Result<Self> {
        let inner = match &self.inner {
            KitStreamInner::Serial(port) => {
                let cloned = port.try_clone().map_err(|source| TransportError::Configure {
                    path: self.name.clone(),
                    source,
                })?;
                KitStreamInner::Serial(cloned)
            }
            KitStreamInner::File(file) => KitStreamInner::File(file.try_clone()?),
        };
        Ok(Self {
            inner,
            name: self.name.clone(),
        })
    }
}

impl std::fmt::Debug for KitStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KitStream")
            .field("type", &self.transport_name())
            .field("name", &self.name)
            .finish()
    }
}

fn read_only() -> std::io::Error {
    std::io::Error::new(ErrorKind::Unsupported, "replay streams are read-only")
}
