use kitsniff_decode::{DecodedPacket, PacketAnalyzer};
use kitsniff_frame::{rx_status_name, tx_status_name, RawFrame};
use serde::Serialize;

/// One unit of kit output, ready to print: the event metadata plus the
/// decoded payload for binary events, or the text for CLI lines.
#[derive(Debug, Clone, Serialize)]
pub struct CapturedRecord {
    pub port: String,
    pub kind: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kit_address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub channel: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_code: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_ack: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kit_timestamp: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub crc_passed: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rssi: Option<i8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lqi: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub decoded: Option<DecodedPacket>,
}

impl CapturedRecord {
    fn empty(port: &str, kind: &'static str) -> Self {
        Self {
            port: port.to_string(),
            kind,
            kit_address: None,
            channel: None,
            error_code: None,
            status: None,
            is_ack: None,
            kit_timestamp: None,
            crc_passed: None,
            rssi: None,
            lqi: None,
            text: None,
            decoded: None,
        }
    }

    /// Build a record from an extracted frame, decoding binary payloads on
    /// the channel the kit reported.
    pub fn from_frame(port: &str, frame: &RawFrame, analyzer: &PacketAnalyzer) -> Self {
        let mut record = Self::empty(port, frame.kind_name());
        match frame {
            RawFrame::Text(line) => {
                record.text = Some(line.text().into_owned());
            }
            RawFrame::Tx(tx) => {
                record.kit_address = Some(tx.kit_address.to_string());
                record.channel = Some(tx.channel);
                record.error_code = Some(tx.error_code);
                record.status = Some(tx_status_name(tx.error_code));
                record.is_ack = Some(tx.is_ack);
                record.kit_timestamp = tx.kit_timestamp;
                record.decoded = Some(analyzer.analyze(&tx.payload, tx.channel));
            }
            RawFrame::Rx(rx) => {
                record.kit_address = Some(rx.kit_address.to_string());
                record.channel = Some(rx.channel);
                record.error_code = Some(rx.error_code);
                record.status = Some(rx_status_name(rx.error_code));
                record.is_ack = Some(rx.is_ack);
                record.kit_timestamp = rx.kit_timestamp;
                record.crc_passed = Some(rx.crc_passed);
                record.rssi = Some(rx.rssi);
                record.lqi = Some(rx.lqi);
                record.decoded = Some(analyzer.analyze(&rx.payload, rx.channel));
            }
        }
        record
    }

    pub fn is_text(&self) -> bool {
        self.text.is_some()
    }
}
