use std::borrow::Cow;
use std::fmt;

use bytes::{BufMut, Bytes, BytesMut};

use crate::error::{FrameError, Result};

/// Binary frame marker.
pub const MARKER: [u8; 2] = [0xAA, 0x55];

/// Line terminator; also the footer of every binary frame.
pub const FOOTER: [u8; 2] = [0x0D, 0x0A];

/// CLI prompt (`"> "`), which ends a text frame without a newline.
pub const PROMPT: [u8; 2] = [0x3E, 0x20];

/// Binary frame type byte for a transmit event.
pub const TYPE_TX: u8 = 0xFD;

/// Binary frame type byte for a receive event.
pub const TYPE_RX: u8 = 0xF9;

/// Binary header: marker (2) + type (1) + length (1).
pub const HEADER_SIZE: usize = 4;

/// Kit (EUI-64) address length.
pub const KIT_ADDRESS_LEN: usize = 8;

/// Largest payload the one-byte length field can describe.
pub const MAX_PAYLOAD: usize = u8::MAX as usize;

/// Binary frame layout.
///
/// Older kit firmware emits frames without the kit timestamp and with a
/// different trailer order. The two are not offset-compatible, so the
/// layout is always chosen explicitly.
///
/// ```text
/// Canonical TX: AA 55 | FD | len | payload | addr(8) | err | ack | ch | ts(4 LE) | 0D 0A
/// Canonical RX: AA 55 | F9 | len | payload | addr(8) | err | ack | ch | ts(4 LE) | crc | rssi | lqi | 0D 0A
/// Legacy TX:    AA 55 | FD | len | payload | addr(8) | ack | ch | err | 0D 0A
/// Legacy RX:    AA 55 | F9 | len | payload | addr(8) | crc | ack | rssi | lqi | ch | err | 0D 0A
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum FrameLayout {
    #[default]
    Canonical,
    Legacy,
}

impl FrameLayout {
    /// Bytes between the payload and the footer of a TX frame.
    pub const fn tx_trailer_len(self) -> usize {
        match self {
            Self::Canonical => KIT_ADDRESS_LEN + 3 + 4,
            Self::Legacy => KIT_ADDRESS_LEN + 3,
        }
    }

    /// Bytes between the payload and the footer of an RX frame.
    pub const fn rx_trailer_len(self) -> usize {
        match self {
            Self::Canonical => KIT_ADDRESS_LEN + 3 + 4 + 3,
            Self::Legacy => KIT_ADDRESS_LEN + 6,
        }
    }

    /// Total wire size of a TX frame carrying `payload_len` bytes.
    pub const fn tx_frame_len(self, payload_len: usize) -> usize {
        HEADER_SIZE + payload_len + self.tx_trailer_len() + FOOTER.len()
    }

    /// Total wire size of an RX frame carrying `payload_len` bytes.
    pub const fn rx_frame_len(self, payload_len: usize) -> usize {
        HEADER_SIZE + payload_len + self.rx_trailer_len() + FOOTER.len()
    }
}

/// 64-bit kit address, kept in wire order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct KitAddress(pub [u8; KIT_ADDRESS_LEN]);

impl fmt::Display for KitAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in self.0 {
            write!(f, "{byte:02X}")?;
        }
        Ok(())
    }
}

/// A CLI response line, terminator included.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextLine {
    pub bytes: Bytes,
}

impl TextLine {
    /// The line as text with the terminator and surrounding whitespace removed.
    pub fn text(&self) -> Cow<'_, str> {
        match String::from_utf8_lossy(&self.bytes) {
            Cow::Borrowed(s) => Cow::Borrowed(s.trim()),
            Cow::Owned(s) => Cow::Owned(s.trim().to_string()),
        }
    }

    /// True if the line was ended by the `"> "` prompt rather than CRLF.
    pub fn is_prompt(&self) -> bool {
        self.bytes.ends_with(&PROMPT)
    }
}

/// A frame the kit transmitted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxEvent {
    pub payload: Bytes,
    pub kit_address: KitAddress,
    pub error_code: u8,
    pub is_ack: bool,
    pub channel: u8,
    /// Kit clock at transmission. `None` for legacy frames.
    pub kit_timestamp: Option<u32>,
}

/// A frame the kit received.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RxEvent {
    pub payload: Bytes,
    pub kit_address: KitAddress,
    pub error_code: u8,
    pub is_ack: bool,
    pub channel: u8,
    /// Kit clock at reception. `None` for legacy frames.
    pub kit_timestamp: Option<u32>,
    pub crc_passed: bool,
    /// Received signal strength in dBm.
    pub rssi: i8,
    pub lqi: u8,
}

/// One unit of kit output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawFrame {
    Text(TextLine),
    Tx(TxEvent),
    Rx(RxEvent),
}

impl RawFrame {
    /// Short name of the frame kind.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Text(_) => "text",
            Self::Tx(_) => "tx",
            Self::Rx(_) => "rx",
        }
    }

    /// Radio payload, if this is a binary event.
    pub fn payload(&self) -> Option<&Bytes> {
        match self {
            Self::Text(_) => None,
            Self::Tx(tx) => Some(&tx.payload),
            Self::Rx(rx) => Some(&rx.payload),
        }
    }

    /// Radio channel, if this is a binary event.
    pub fn channel(&self) -> Option<u8> {
        match self {
            Self::Text(_) => None,
            Self::Tx(tx) => Some(tx.channel),
            Self::Rx(rx) => Some(rx.channel),
        }
    }
}

/// Parse a footer-verified TX window.
pub(crate) fn parse_tx(window: &Bytes, layout: FrameLayout) -> TxEvent {
    let len = window[3] as usize;
    let payload = window.slice(HEADER_SIZE..HEADER_SIZE + len);
    let t = &window[HEADER_SIZE + len..];
    let kit_address = kit_address(&t[..KIT_ADDRESS_LEN]);
    let t = &t[KIT_ADDRESS_LEN..];

    match layout {
        FrameLayout::Canonical => TxEvent {
            payload,
            kit_address,
            error_code: t[0],
            is_ack: t[1] != 0,
            channel: t[2],
            kit_timestamp: Some(u32::from_le_bytes([t[3], t[4], t[5], t[6]])),
        },
        FrameLayout::Legacy => TxEvent {
            payload,
            kit_address,
            is_ack: t[0] != 0,
            channel: t[1],
            error_code: t[2],
            kit_timestamp: None,
        },
    }
}

/// Parse a footer-verified RX window.
pub(crate) fn parse_rx(window: &Bytes, layout: FrameLayout) -> RxEvent {
    let len = window[3] as usize;
    let payload = window.slice(HEADER_SIZE..HEADER_SIZE + len);
    let t = &window[HEADER_SIZE + len..];
    let kit_address = kit_address(&t[..KIT_ADDRESS_LEN]);
    let t = &t[KIT_ADDRESS_LEN..];

    match layout {
        FrameLayout::Canonical => RxEvent {
            payload,
            kit_address,
            error_code: t[0],
            is_ack: t[1] != 0,
            channel: t[2],
            kit_timestamp: Some(u32::from_le_bytes([t[3], t[4], t[5], t[6]])),
            crc_passed: t[7] != 0,
            rssi: t[8] as i8,
            lqi: t[9],
        },
        FrameLayout::Legacy => RxEvent {
            payload,
            kit_address,
            crc_passed: t[0] != 0,
            is_ack: t[1] != 0,
            rssi: t[2] as i8,
            lqi: t[3],
            channel: t[4],
            error_code: t[5],
            kit_timestamp: None,
        },
    }
}

fn kit_address(bytes: &[u8]) -> KitAddress {
    let mut addr = [0u8; KIT_ADDRESS_LEN];
    addr.copy_from_slice(bytes);
    KitAddress(addr)
}

fn put_header(frame_type: u8, payload: &[u8], dst: &mut BytesMut) -> Result<()> {
    if payload.len() > MAX_PAYLOAD {
        return Err(FrameError::PayloadTooLarge {
            size: payload.len(),
            max: MAX_PAYLOAD,
        });
    }
    dst.put_slice(&MARKER);
    dst.put_u8(frame_type);
    dst.put_u8(payload.len() as u8);
    dst.put_slice(payload);
    Ok(())
}

/// Encode a TX event into the kit wire format.
///
/// A missing timestamp is written as zero in the canonical layout.
pub fn encode_tx_event(event: &TxEvent, layout: FrameLayout, dst: &mut BytesMut) -> Result<()> {
    dst.reserve(layout.tx_frame_len(event.payload.len()));
    put_header(TYPE_TX, &event.payload, dst)?;
    dst.put_slice(&event.kit_address.0);
    match layout {
        FrameLayout::Canonical => {
            dst.put_u8(event.error_code);
            dst.put_u8(event.is_ack as u8);
            dst.put_u8(event.channel);
            dst.put_u32_le(event.kit_timestamp.unwrap_or(0));
        }
        FrameLayout::Legacy => {
            dst.put_u8(event.is_ack as u8);
            dst.put_u8(event.channel);
            dst.put_u8(event.error_code);
        }
    }
    dst.put_slice(&FOOTER);
    Ok(())
}

/// Encode an RX event into the kit wire format.
pub fn encode_rx_event(event: &RxEvent, layout: FrameLayout, dst: &mut BytesMut) -> Result<()> {
    dst.reserve(layout.rx_frame_len(event.payload.len()));
    put_header(TYPE_RX, &event.payload, dst)?;
    dst.put_slice(&event.kit_address.0);
    match layout {
        FrameLayout::Canonical => {
            dst.put_u8(event.error_code);
            dst.put_u8(event.is_ack as u8);
            dst.put_u8(event.channel);
            dst.put_u32_le(event.kit_timestamp.unwrap_or(0));
            dst.put_u8(event.crc_passed as u8);
            dst.put_i8(event.rssi);
            dst.put_u8(event.lqi);
        }
        FrameLayout::Legacy => {
            dst.put_u8(event.crc_passed as u8);
            dst.put_u8(event.is_ack as u8);
            dst.put_i8(event.rssi);
            dst.put_u8(event.lqi);
            dst.put_u8(event.channel);
            dst.put_u8(event.error_code);
        }
    }
    dst.put_slice(&FOOTER);
    Ok(())
}
