use tracing::{debug, info};

use crate::config::LinkConfig;
use crate::error::{Result, TransportError};
use crate::traits::KitStream;

/// Serial port transport for kits on USB virtual COM ports.
///
/// Kits present a CP210x bridge and speak 8N1 with no flow control.
pub struct SerialLink;

impl SerialLink {
    /// Open a serial device with default link settings (115200 8N1).
    pub fn open(path: &str) -> Result<KitStream> {
        Self::open_with_config(path, &LinkConfig::default())
    }

    /// Open a serial device with explicit link settings.
    pub fn open_with_config(path: &str, config: &LinkConfig) -> Result<KitStream> {
        debug!(path, baud = config.baud_rate, "opening serial port");
        let port = serialport::new(path, config.baud_rate)
            .data_bits(serialport::DataBits::Eight)
            .parity(serialport::Parity::None)
            .stop_bits(serialport::StopBits::One)
            .flow_control(serialport::FlowControl::None)
            .timeout(config.read_timeout)
            .open()
            .map_err(|source| TransportError::Open {
                path: path.to_string(),
                source,
            })?;

        info!(path, baud = config.baud_rate, "serial port open");
        Ok(KitStream::from_serial(port, path.to_string()))
    }
}
