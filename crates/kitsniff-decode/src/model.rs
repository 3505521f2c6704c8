//! Decoded packet tree: packet → layers → fields → subfields.
//!
//! Every value is built fresh per decode call and copied out of the input,
//! so a `DecodedPacket` never borrows the payload it came from.

use serde::{Serialize, Serializer};

use crate::bits::BitWord;

/// Which protocol layer a [`Layer`] describes, in wire order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LayerKind {
    Mac,
    Security,
    SixLowpan,
    Icmpv6,
    Application,
    Mic,
}

impl LayerKind {
    /// Display name used in decoded output.
    pub fn name(self) -> &'static str {
        match self {
            Self::Mac => "IEEE 802.15.4",
            Self::Security => "IEEE 802.15.4 Security",
            Self::SixLowpan => "6lowpan",
            Self::Icmpv6 => "ICMPv6",
            Self::Application => "Application Payload",
            Self::Mic => "MAC encryption MIC",
        }
    }
}

/// Result of decoding one payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DecodedPacket {
    #[serde(rename = "raw_data", serialize_with = "serialize_hex")]
    pub raw: Vec<u8>,
    pub total_length: usize,
    pub layers: Vec<Layer>,
}

impl DecodedPacket {
    /// First layer of the given kind.
    pub fn layer(&self, kind: LayerKind) -> Option<&Layer> {
        self.layers.iter().find(|l| l.kind == kind)
    }

    /// Sum of `total_bytes` over all layers. Never exceeds `total_length`.
    pub fn consumed_bytes(&self) -> usize {
        self.layers.iter().map(|l| l.total_bytes).sum()
    }

    /// The raw payload as uppercase hex.
    pub fn raw_hex(&self) -> String {
        hex::encode_upper(&self.raw)
    }
}

/// One protocol layer and the bytes it consumed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Layer {
    pub kind: LayerKind,
    pub name: &'static str,
    pub total_bytes: usize,
    pub fields: Vec<Field>,
}

impl Layer {
    pub(crate) fn new(kind: LayerKind, total_bytes: usize, fields: Vec<Field>) -> Self {
        Self {
            kind,
            name: kind.name(),
            total_bytes,
            fields,
        }
    }

    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Field {
    pub name: &'static str,
    pub value: String,
    pub description: String,
    #[serde(flatten)]
    pub kind: FieldKind,
}

impl Field {
    pub(crate) fn simple(name: &'static str, value: String) -> Self {
        Self {
            name,
            value,
            description: String::new(),
            kind: FieldKind::Simple,
        }
    }

    pub(crate) fn bitfield(name: &'static str, value: String, subfields: Vec<Subfield>) -> Self {
        Self {
            name,
            value,
            description: String::new(),
            kind: FieldKind::Bitfield { subfields },
        }
    }

    /// Subfields of a bitfield; empty for simple fields.
    pub fn subfields(&self) -> &[Subfield] {
        match &self.kind {
            FieldKind::Simple => &[],
            FieldKind::Bitfield { subfields } => subfields,
        }
    }

    pub fn subfield(&self, name: &str) -> Option<&Subfield> {
        self.subfields().iter().find(|s| s.name == name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FieldKind {
    Simple,
    Bitfield { subfields: Vec<Subfield> },
}

/// One bit range of a bitfield's raw value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Subfield {
    pub name: &'static str,
    pub value: u32,
    pub description: String,
    /// Dotted mask, e.g. `.... .... .... .001`.
    pub bits: String,
}

impl Subfield {
    /// Extract `[start, start + width)` of `word` and describe it.
    pub(crate) fn extract(
        word: BitWord,
        name: &'static str,
        start: u32,
        width: u32,
        describe: impl FnOnce(u32) -> String,
    ) -> Self {
        let value = word.bits(start, width);
        Self {
            name,
            value,
            description: describe(value),
            bits: word.mask_display(start, width),
        }
    }
}

/// Output for callers that need a result even when decoding fails:
/// the raw input and an error message take the place of the layers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnalysisReport {
    pub raw_data: String,
    pub total_length: usize,
    pub layers: Vec<Layer>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl AnalysisReport {
    pub fn from_result(raw_data: &str, result: crate::Result<DecodedPacket>) -> Self {
        match result {
            Ok(packet) => Self {
                raw_data: raw_data.to_string(),
                total_length: packet.total_length,
                layers: packet.layers,
                error: None,
            },
            Err(err) => Self {
                raw_data: raw_data.to_string(),
                total_length: 0,
                layers: Vec::new(),
                error: Some(err.to_string()),
            },
        }
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}

fn serialize_hex<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&hex::encode_upper(bytes))
}

/// `0x`-prefixed uppercase hex, zero-padded to `digits`.
pub(crate) fn hex_value(value: u32, digits: usize) -> String {
    format!("0x{value:0digits$X}")
}
