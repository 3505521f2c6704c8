//! MAC auxiliary security header.

use tracing::debug;

use crate::bits::ByteOrder;
use crate::cursor::ByteCursor;
use crate::model::{hex_value, Field, Layer, LayerKind, Subfield};

const SECURITY_LEVELS: [&str; 8] = [
    "None",
    "MIC-32",
    "MIC-64",
    "MIC-128",
    "ENC",
    "Encrypted, 4 byte MIC",
    "ENC-MIC-64",
    "ENC-MIC-128",
];

const KEY_ID_MODES: [&str; 4] = [
    "No source",
    "Key Index",
    "4-byte Key Source + Key Index",
    "8-byte Key Source + Key Index",
];

/// Decode the auxiliary security header at the start of `body`.
///
/// Returns `None` if `body` is empty. Fields that don't fit are dropped
/// along with everything after them.
pub(crate) fn decode(body: &[u8]) -> Option<Layer> {
    let mut cur = ByteCursor::new(body);
    let mut fields = Vec::new();
    if decode_fields(&mut cur, &mut fields).is_none() {
        debug!(
            offset = cur.position(),
            remaining = cur.remaining(),
            "security header truncated"
        );
    }

    let consumed = cur.position();
    (consumed > 0).then(|| Layer::new(LayerKind::Security, consumed, fields))
}

fn decode_fields(cur: &mut ByteCursor<'_>, fields: &mut Vec<Field>) -> Option<()> {
    let control = cur.word(1, ByteOrder::Little)?;
    let key_id_mode = control.bits(3, 2);
    fields.push(Field::bitfield(
        "Security Control",
        hex_value(control.value(), 2),
        vec![
            Subfield::extract(control, "Security Level", 0, 3, |v| {
                format!("{} ({v})", SECURITY_LEVELS[v as usize])
            }),
            Subfield::extract(control, "Key Identifier Mode", 3, 2, |v| {
                format!("{} ({v})", KEY_ID_MODES[v as usize])
            }),
        ],
    ));

    let counter = cur.word(4, ByteOrder::Little)?;
    fields.push(Field::simple("Frame Counter", hex_value(counter.value(), 8)));

    match key_id_mode {
        2 => {
            let source = cur.take(4)?;
            fields.push(Field::simple("Key Source (4 byte)", hex::encode_upper(source)));
        }
        3 => {
            let source = cur.take(8)?;
            fields.push(Field::simple("Key Source (8 byte)", hex::encode_upper(source)));
        }
        _ => {}
    }

    if key_id_mode > 0 {
        let index = cur.u8()?;
        fields.push(Field::simple("Key Index", hex_value(index.into(), 2)));
    }
    Some(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level5_key_index_mode() {
        // ENC-MIC-32, key id mode 1
        let body = [0x0D, 0x01, 0x00, 0x00, 0x00, 0x07];
        let layer = decode(&body).unwrap();

        assert_eq!(layer.total_bytes, 6);
        let control = layer.field("Security Control").unwrap();
        assert_eq!(control.value, "0x0D");
        assert_eq!(
            control.subfield("Security Level").unwrap().description,
            "Encrypted, 4 byte MIC (5)"
        );
        assert_eq!(control.subfield("Security Level").unwrap().bits, ".... .101");
        assert_eq!(
            control.subfield("Key Identifier Mode").unwrap().description,
            "Key Index (1)"
        );
        assert_eq!(layer.field("Frame Counter").unwrap().value, "0x00000001");
        assert_eq!(layer.field("Key Index").unwrap().value, "0x07");
    }

    #[test]
    fn eight_byte_key_source() {
        let mut body = vec![0x18 | 0x05, 0xEF, 0xBE, 0xAD, 0xDE];
        body.extend_from_slice(&[1, 2, 3, 4, 5, 6, 7, 8]);
        body.push(0x01);

        let layer = decode(&body).unwrap();
        assert_eq!(layer.total_bytes, 14);
        assert_eq!(layer.field("Frame Counter").unwrap().value, "0xDEADBEEF");
        assert_eq!(
            layer.field("Key Source (8 byte)").unwrap().value,
            "0102030405060708"
        );
        assert!(layer.field("Key Index").is_some());
    }

    #[test]
    fn four_byte_key_source() {
        let body = [0x10, 0, 0, 0, 0, 0xAA, 0xBB, 0xCC, 0xDD, 0x02];
        let layer = decode(&body).unwrap();
        assert_eq!(layer.total_bytes, 10);
        assert_eq!(layer.field("Key Source (4 byte)").unwrap().value, "AABBCCDD");
    }

    #[test]
    fn mode_zero_has_no_key_fields() {
        let body = [0x05, 1, 2, 3, 4, 0x99];
        let layer = decode(&body).unwrap();
        assert_eq!(layer.total_bytes, 5);
        assert_eq!(layer.fields.len(), 2);
    }

    #[test]
    fn truncated_counter_keeps_control() {
        let layer = decode(&[0x0D, 0x01, 0x02]).unwrap();
        assert_eq!(layer.total_bytes, 1);
        assert_eq!(layer.fields.len(), 1);
    }

    #[test]
    fn empty_body() {
        assert!(decode(&[]).is_none());
    }
}
