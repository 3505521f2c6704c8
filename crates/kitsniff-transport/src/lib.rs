//! Byte sources for serial-connected radio test kits.
//!
//! Provides a unified [`KitStream`] over:
//! - USB virtual COM ports (via `serialport`)
//! - Raw capture files replayed from disk
//!
//! This is the lowest layer of kitsniff. The frame extractor only ever sees
//! `Read`, so anything here can be swapped for an in-memory cursor in tests.

pub mod config;
pub mod error;
pub mod replay;
pub mod serial;
pub mod traits;

pub use config::{LinkConfig, DEFAULT_BAUD_RATE};
pub use error::{Result, TransportError};
pub use replay::ReplayFile;
pub use serial::SerialLink;
pub use traits::KitStream;
