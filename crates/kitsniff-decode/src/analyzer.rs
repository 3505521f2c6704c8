use tracing::trace;

use crate::error::{DecodeError, Result};
use crate::model::{AnalysisReport, DecodedPacket};
use crate::tail::MIC_LEN;
use crate::{mac, security, sixlowpan, tail};

/// Decodes kit payloads into layered packets.
///
/// Stateless: one analyzer can be copied or shared across threads freely and
/// gives the same output for the same input.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PacketAnalyzer;

impl PacketAnalyzer {
    pub fn new() -> Self {
        Self
    }

    /// Decode `payload` captured on `channel`.
    ///
    /// The channel only selects the PHY header width. Payloads of four or
    /// more bytes end in a MIC; the header layers never read into it, and
    /// the ICMPv6 and application layers are only decoded in front of it.
    pub fn analyze(&self, payload: &[u8], channel: u8) -> DecodedPacket {
        let mic_len = if payload.len() >= MIC_LEN { MIC_LEN } else { 0 };
        let body = &payload[..payload.len() - mic_len];
        let mut layers = Vec::with_capacity(6);
        let mut offset = 0;

        let mac = mac::decode(body, channel);
        offset += mac.consumed();
        let security_enabled = mac.frame_control.is_some_and(|fc| fc.security_enabled);
        layers.extend(mac.layer);

        if security_enabled {
            if let Some(layer) = security::decode(&body[offset..]) {
                offset += layer.total_bytes;
                layers.push(layer);
            }
        }

        if let Some(layer) = sixlowpan::decode(&body[offset..]) {
            offset += layer.total_bytes;
            layers.push(layer);
        }

        if mic_len > 0 {
            if let Some(layer) = tail::icmpv6(&body[offset..]) {
                offset += layer.total_bytes;
                layers.push(layer);
            }
            if let Some(layer) = tail::application(body.len() - offset) {
                layers.push(layer);
            }
        }

        layers.extend(tail::mic(payload));

        trace!(
            len = payload.len(),
            channel,
            layers = layers.len(),
            "payload decoded"
        );
        DecodedPacket {
            raw: payload.to_vec(),
            total_length: payload.len(),
            layers,
        }
    }

    /// Decode a hex-encoded payload. Surrounding whitespace is ignored and
    /// either letter case is accepted.
    ///
    /// Blank input is [`DecodeError::EmptyPayload`]. A zero-length payload
    /// taken from a kit frame goes through [`analyze`](Self::analyze) and
    /// decodes to zero layers instead.
    pub fn analyze_hex(&self, payload_hex: &str, channel: u8) -> Result<DecodedPacket> {
        let payload = hex::decode(payload_hex.trim())?;
        if payload.is_empty() {
            return Err(DecodeError::EmptyPayload);
        }
        Ok(self.analyze(&payload, channel))
    }

    /// [`analyze_hex`](Self::analyze_hex), with a failure folded into the report.
    pub fn report(&self, payload_hex: &str, channel: u8) -> AnalysisReport {
        AnalysisReport::from_result(payload_hex, self.analyze_hex(payload_hex, channel))
    }
}

/// Decode `payload` with a default [`PacketAnalyzer`].
pub fn analyze(payload: &[u8], channel: u8) -> DecodedPacket {
    PacketAnalyzer.analyze(payload, channel)
}
