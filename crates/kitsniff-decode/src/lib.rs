//! Layered decoding of IEEE 802.15.4 / 6LoWPAN payloads captured by radio
//! test kits.
//!
//! A payload decodes, in wire order, into:
//! - the MAC header (PHY header, frame control, sequence, addressing)
//! - the auxiliary security header, when frame control says so
//! - a 6LoWPAN IPHC header, when the dispatch byte matches
//! - an ICMPv6 header and an application payload byte count
//! - the trailing 4-byte MIC
//!
//! Short payloads are not errors: fields that don't fit are left out and the
//! packet comes back with fewer layers. Only unparseable hex input fails.
//!
//! ```
//! let packet = kitsniff_decode::analyze(&[0x01, 0x02, 0x03, 0x04], 20);
//! assert_eq!(packet.layers.len(), 1);
//! assert_eq!(packet.layers[0].name, "MAC encryption MIC");
//! ```

pub mod analyzer;
pub mod bits;
mod cursor;
pub mod error;
pub mod mac;
pub mod model;
mod security;
pub mod sixlowpan;
pub mod tail;

pub use analyzer::{analyze, PacketAnalyzer};
pub use bits::{extract_bits, BitWord, ByteOrder};
pub use error::{DecodeError, Result};
pub use model::{AnalysisReport, DecodedPacket, Field, FieldKind, Layer, LayerKind, Subfield};
