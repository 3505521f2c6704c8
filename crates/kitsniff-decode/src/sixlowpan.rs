//! 6LoWPAN IPHC base encoding and the compressed destination address.

use tracing::debug;

use crate::bits::ByteOrder;
use crate::cursor::ByteCursor;
use crate::model::{hex_value, Field, Layer, LayerKind, Subfield};

const IPHC_DISPATCH_MASK: u8 = 0xE0;
const IPHC_DISPATCH: u8 = 0x60;

const TRAFFIC_FLOW: [&str; 4] = ["elided", "ECN + DSCP", "ECN + Flow Label", "TC + FL"];
const HOP_LIMIT: [&str; 4] = ["in-line", "limit 1", "limit 64", "limit 255"];
const SOURCE_MODES: [&str; 4] = ["128 bits or unspecified", "64 bits", "16 bits", "0 bits"];
const DEST_MODES_UNICAST: [&str; 4] = [
    "128 or 48M bits",
    "64 or 48M bits",
    "16 or 32M bits",
    "0 or 8M bits",
];
const DEST_MODES_MULTICAST: [&str; 4] = [
    "128 or 48M bits",
    "64 or 32M bits",
    "32 or 16M bits",
    "8 or 8M bits",
];

/// True if `byte` starts an IPHC-compressed header (`011x xxxx`).
pub fn is_iphc_dispatch(byte: u8) -> bool {
    byte & IPHC_DISPATCH_MASK == IPHC_DISPATCH
}

/// In-line destination address length for a (multicast, DAM) pair.
pub fn dest_address_len(multicast: bool, dam: u32) -> usize {
    match (multicast, dam) {
        (false, 1) => 8,
        (false, 2) => 2,
        (false, 3) => 1,
        (true, 0) => 16,
        (true, 1) => 6,
        (true, 2) => 4,
        (true, 3) => 1,
        _ => 0,
    }
}

/// Decode an IPHC header at the start of `body`.
///
/// Returns `None` when the dispatch byte doesn't match or the IPHC word
/// doesn't fit. A destination address that doesn't fit is left out.
pub(crate) fn decode(body: &[u8]) -> Option<Layer> {
    let mut cur = ByteCursor::new(body);
    if !is_iphc_dispatch(cur.peek_u8()?) {
        return None;
    }

    let Some(iphc) = cur.word(2, ByteOrder::Big) else {
        debug!("IPHC dispatch without a full base encoding");
        return None;
    };

    let multicast = iphc.flag(3);
    let dam = iphc.bits(0, 2);
    let dest_modes = if multicast {
        &DEST_MODES_MULTICAST
    } else {
        &DEST_MODES_UNICAST
    };
    let labeled = |table: &'static [&'static str; 4]| {
        move |v: u32| format!("{} ({v})", table[v as usize])
    };
    let flag = |set: &'static str, unset: &'static str| {
        move |v: u32| if v == 1 { set } else { unset }.to_string()
    };

    let mut fields = vec![Field::bitfield(
        "IPHC Base Encoding",
        hex_value(iphc.value(), 4),
        vec![
            Subfield::extract(iphc, "Traffic and Flow", 11, 2, labeled(&TRAFFIC_FLOW)),
            Subfield::extract(
                iphc,
                "Next Header",
                10,
                1,
                flag("compressed (1)", "in-line (0)"),
            ),
            Subfield::extract(iphc, "Hop Limit", 8, 2, labeled(&HOP_LIMIT)),
            Subfield::extract(iphc, "Context ID", 7, 1, flag("in-line (1)", "0 (0)")),
            Subfield::extract(
                iphc,
                "Source Compression",
                6,
                1,
                flag("context-based (1)", "stateless (0)"),
            ),
            Subfield::extract(iphc, "Source Address Mode", 4, 2, labeled(&SOURCE_MODES)),
            Subfield::extract(iphc, "Multicast Compression", 3, 1, flag("true", "false")),
            Subfield::extract(
                iphc,
                "Destination Compression",
                2,
                1,
                flag("context-based (1)", "stateless (0)"),
            ),
            Subfield::extract(iphc, "Destination Address Mode", 0, 2, labeled(dest_modes)),
        ],
    )];

    let addr_len = dest_address_len(multicast, dam);
    if addr_len > 0 {
        match cur.take(addr_len) {
            Some(addr) => fields.push(Field::simple(
                "Destination Address",
                hex::encode_upper(addr),
            )),
            None => debug!(
                needed = addr_len,
                remaining = cur.remaining(),
                "IPHC destination address truncated"
            ),
        }
    }

    Some(Layer::new(LayerKind::SixLowpan, cur.position(), fields))
}
