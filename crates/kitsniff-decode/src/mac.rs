//! IEEE 802.15.4 MAC header: PHY header, frame control, sequence, addressing.

use tracing::debug;

use crate::bits::{BitWord, ByteOrder};
use crate::cursor::ByteCursor;
use crate::model::{hex_value, Field, Layer, LayerKind, Subfield};

const FRAME_TYPES: [&str; 4] = ["Beacon", "Data", "Acknowledgment", "Command"];
const ADDRESS_MODES: [&str; 4] = [
    "No PAN ID or address",
    "Reserved",
    "Short address",
    "Extended address",
];
const FRAME_VERSIONS: [&str; 4] = ["802.15.4-2003", "802.15.4-2006", "802.15.4-2015", "Reserved"];

const MODE_NONE: u32 = 0;
const MODE_SHORT: u32 = 2;
const MODE_EXTENDED: u32 = 3;

/// PHY header width for a channel: one byte in the 2.4 GHz band
/// (channels 11–26), two bytes otherwise.
pub fn phy_header_len(channel: u8) -> usize {
    if (11..=26).contains(&channel) {
        1
    } else {
        2
    }
}

/// Frame control bits the later layers depend on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct FrameControl {
    pub security_enabled: bool,
    pub pan_id_compression: bool,
    pub dest_mode: u32,
    pub src_mode: u32,
}

impl FrameControl {
    fn from_word(fc: BitWord) -> Self {
        Self {
            security_enabled: fc.flag(3),
            pan_id_compression: fc.flag(6),
            dest_mode: fc.bits(10, 2),
            src_mode: fc.bits(14, 2),
        }
    }
}

pub(crate) struct MacHeader {
    /// `None` when not even the PHY header fit.
    pub layer: Option<Layer>,
    /// `None` when the frame control field was cut off.
    pub frame_control: Option<FrameControl>,
}

impl MacHeader {
    pub(crate) fn consumed(&self) -> usize {
        self.layer.as_ref().map_or(0, |l| l.total_bytes)
    }
}

/// Decode the MAC header at the start of `body`.
///
/// Stops at the first field that doesn't fit; everything decoded up to that
/// point is kept.
pub(crate) fn decode(body: &[u8], channel: u8) -> MacHeader {
    let mut cur = ByteCursor::new(body);
    let mut fields = Vec::new();
    let frame_control = decode_fields(&mut cur, channel, &mut fields);

    let consumed = cur.position();
    let layer = (consumed > 0).then(|| Layer::new(LayerKind::Mac, consumed, fields));
    MacHeader {
        layer,
        frame_control,
    }
}

fn decode_fields(
    cur: &mut ByteCursor<'_>,
    channel: u8,
    fields: &mut Vec<Field>,
) -> Option<FrameControl> {
    let phr_len = phy_header_len(channel);
    let Some(phr) = cur.word(phr_len, ByteOrder::Little) else {
        truncated("PHY Header", cur);
        return None;
    };
    fields.push(phy_header(phr));

    let Some(fc_word) = cur.word(2, ByteOrder::Little) else {
        truncated("Frame Control", cur);
        return None;
    };
    fields.push(frame_control_field(fc_word));
    let fc = FrameControl::from_word(fc_word);

    // Past this point the frame control is known even if addressing is cut short.
    if decode_addressing(cur, fc, fields).is_none() {
        truncated("addressing", cur);
    }
    Some(fc)
}

fn decode_addressing(
    cur: &mut ByteCursor<'_>,
    fc: FrameControl,
    fields: &mut Vec<Field>,
) -> Option<()> {
    fields.push(Field::simple("Sequence", hex_value(cur.u8()?.into(), 2)));

    if fc.dest_mode != MODE_NONE {
        let pan = cur.word(2, ByteOrder::Little)?;
        fields.push(Field::simple("Destination PAN ID", hex_value(pan.value(), 4)));
    }
    let dest = address(
        cur,
        fc.dest_mode,
        "Short Destination Address",
        "Long Destination Address",
    )?;
    fields.extend(dest);

    if fc.src_mode != MODE_NONE && !fc.pan_id_compression {
        let pan = cur.word(2, ByteOrder::Little)?;
        fields.push(Field::simple("Source PAN ID", hex_value(pan.value(), 4)));
    }
    let src = address(cur, fc.src_mode, "Short Source Address", "Long Source Address")?;
    fields.extend(src);
    Some(())
}

/// Outer `None` means the address didn't fit; inner `None` means the mode
/// carries no address.
fn address(
    cur: &mut ByteCursor<'_>,
    mode: u32,
    short_name: &'static str,
    long_name: &'static str,
) -> Option<Option<Field>> {
    match mode {
        MODE_SHORT => {
            let addr = cur.word(2, ByteOrder::Little)?;
            Some(Some(Field::simple(short_name, hex_value(addr.value(), 4))))
        }
        MODE_EXTENDED => {
            let bytes = cur.take(8)?;
            let mut reversed = bytes.to_vec();
            reversed.reverse();
            Some(Some(Field::simple(long_name, hex::encode_upper(reversed))))
        }
        _ => Some(None),
    }
}

fn phy_header(phr: BitWord) -> Field {
    let (len_bits, length) = if phr.width() == 8 {
        (8, phr.value())
    } else {
        (11, phr.bits(0, 11))
    };
    let digits = (phr.width() / 4) as usize;
    Field::bitfield(
        "PHY Header",
        hex_value(phr.value(), digits),
        vec![Subfield {
            name: "Packet Length",
            value: length,
            description: length.to_string(),
            bits: phr.mask_display(0, len_bits),
        }],
    )
}

fn frame_control_field(fc: BitWord) -> Field {
    let flag = |v: u32| if v == 1 { "true" } else { "false" }.to_string();
    let labeled = |table: &'static [&'static str; 4]| {
        move |v: u32| format!("{} ({v})", table.get(v as usize).copied().unwrap_or("Reserved"))
    };

    Field::bitfield(
        "Frame Control",
        hex_value(fc.value(), 4),
        vec![
            Subfield::extract(fc, "Frame Type", 0, 3, labeled(&FRAME_TYPES)),
            Subfield::extract(fc, "Security Enabled", 3, 1, flag),
            Subfield::extract(fc, "Frame Pending", 4, 1, flag),
            Subfield::extract(fc, "Ack Required", 5, 1, flag),
            Subfield::extract(fc, "PAN ID Compression", 6, 1, flag),
            Subfield::extract(fc, "Reserved", 7, 3, |v| hex_value(v, 2)),
            Subfield::extract(fc, "Destination Address Mode", 10, 2, labeled(&ADDRESS_MODES)),
            Subfield::extract(fc, "Frame Version", 12, 2, labeled(&FRAME_VERSIONS)),
            Subfield::extract(fc, "Source Address Mode", 14, 2, labeled(&ADDRESS_MODES)),
        ],
    )
}

fn truncated(field: &'static str, cur: &ByteCursor<'_>) {
    debug!(
        field,
        offset = cur.position(),
        remaining = cur.remaining(),
        "MAC header truncated"
    );
}
