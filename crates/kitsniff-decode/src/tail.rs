//! Trailing layers: ICMPv6 header, application payload, MAC MIC.

use crate::bits::ByteOrder;
use crate::cursor::ByteCursor;
use crate::model::{hex_value, Field, Layer, LayerKind};

/// MAC integrity code length.
pub const MIC_LEN: usize = 4;

const ICMPV6_HEADER_LEN: usize = 4;

fn icmpv6_type_name(icmp_type: u8) -> &'static str {
    match icmp_type {
        0x80 => "Echo Request",
        0x81 => "Echo Reply",
        _ => "Unknown",
    }
}

/// ICMPv6 type, code and checksum from the start of `body`.
pub(crate) fn icmpv6(body: &[u8]) -> Option<Layer> {
    let mut cur = ByteCursor::new(body);
    let header = cur.take(ICMPV6_HEADER_LEN)?;
    let checksum = u16::from_be_bytes([header[2], header[3]]);

    Some(Layer::new(
        LayerKind::Icmpv6,
        ICMPV6_HEADER_LEN,
        vec![
            Field::simple(
                "Type",
                format!("{} (0x{:02X})", icmpv6_type_name(header[0]), header[0]),
            ),
            Field::simple("Code", hex_value(header[1].into(), 2)),
            Field::simple("Checksum", hex_value(checksum.into(), 4)),
        ],
    ))
}

/// Byte count of whatever the earlier layers left over.
pub(crate) fn application(remaining: usize) -> Option<Layer> {
    (remaining > 0).then(|| {
        Layer::new(
            LayerKind::Application,
            remaining,
            vec![Field::simple("Length", format!("{remaining} bytes"))],
        )
    })
}

/// The last four bytes of the payload, regardless of what came before.
pub(crate) fn mic(payload: &[u8]) -> Option<Layer> {
    let start = payload.len().checked_sub(MIC_LEN)?;
    let mut cur = ByteCursor::new(&payload[start..]);
    let word = cur.word(MIC_LEN, ByteOrder::Big)?;

    Some(Layer::new(
        LayerKind::Mic,
        MIC_LEN,
        vec![Field::simple("MAC MIC", format!("{:08X}", word.value()))],
    ))
}
