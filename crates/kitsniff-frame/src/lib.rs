//! Frame extraction for radio test kit serial streams.
//!
//! Kits interleave two kinds of output on one serial line:
//! - CLI text, terminated by `\r\n` or a `"> "` prompt
//! - Binary TX/RX events: `0xAA 0x55 | type | len | payload | trailer | \r\n`
//!
//! [`FrameExtractor`] recovers both from an unbounded, partially delivered
//! byte stream and resynchronizes one byte at a time on corruption. Callers
//! never see partial frames.

pub mod accumulator;
pub mod codec;
pub mod error;
pub mod extractor;
pub mod reader;
pub mod status;
pub mod writer;

#[cfg(feature = "async")]
pub mod tokio_codec;

pub use accumulator::ByteAccumulator;
pub use codec::{
    encode_rx_event, encode_tx_event, FrameLayout, KitAddress, RawFrame, RxEvent, TextLine,
    TxEvent, FOOTER, HEADER_SIZE, MARKER, MAX_PAYLOAD, PROMPT, TYPE_RX, TYPE_TX,
};
pub use error::{FrameError, Result};
pub use extractor::{
    ExtractorConfig, ExtractorState, ExtractorStats, FrameExtractor, DEFAULT_MAX_LINE_LEN,
};
pub use reader::{FrameReader, ReaderConfig};
pub use status::{rx_status_name, tx_status_name};
pub use writer::CommandWriter;

#[cfg(feature = "async")]
pub use tokio_codec::KitCodec;
