//! Passive capture and decoding of IEEE 802.15.4 / 6LoWPAN traffic from
//! serial-connected radio test kits.
//!
//! # Crate Structure
//!
//! - [`transport`]: Byte sources (serial ports, replayed capture files)
//! - [`frame`]: Recovery of binary TX/RX events and CLI text from the kit stream
//! - [`decode`]: Layered packet decoding of event payloads
//!
//! ```
//! use kitsniff::frame::FrameExtractor;
//! use kitsniff::decode::PacketAnalyzer;
//!
//! let mut extractor = FrameExtractor::new();
//! extractor.feed(b"sniffer ready\r\n");
//! assert_eq!(extractor.poll().len(), 1);
//!
//! let packet = PacketAnalyzer::new().analyze(&[0x01, 0x02, 0x03, 0x04], 15);
//! assert_eq!(packet.total_length, 4);
//! ```

/// Re-export transport types.
pub mod transport {
    pub use kitsniff_transport::*;
}

/// Re-export frame types.
pub mod frame {
    pub use kitsniff_frame::*;
}

/// Re-export decoder types.
pub mod decode {
    pub use kitsniff_decode::*;
}
