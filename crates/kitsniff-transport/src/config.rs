use std::time::Duration;

/// Baud rate the kits' USB bridge runs at out of the box.
pub const DEFAULT_BAUD_RATE: u32 = 115_200;

/// Serial link settings.
///
/// Kits always talk 8N1 without flow control, so only the rate and the read
/// timeout are configurable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkConfig {
    /// Baud rate. Default: 115200.
    pub baud_rate: u32,
    /// How long a blocking read waits before returning `TimedOut`.
    ///
    /// Capture loops use the timeout as a heartbeat to notice shutdown
    /// requests; it does not bound frame completion.
    pub read_timeout: Duration,
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            baud_rate: DEFAULT_BAUD_RATE,
            read_timeout: Duration::from_millis(100),
        }
    }
}
