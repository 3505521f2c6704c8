//! Kit status code vocabularies.
//!
//! The extractor passes `error_code` through untouched; these tables are
//! what downstream displays show next to it.

pub const TX_SUCCESS: u8 = 0;
pub const TX_CHANNEL_BUSY: u8 = 1;
pub const TX_BLOCKED: u8 = 2;
pub const TX_ABORTED: u8 = 3;
pub const TX_SCHEDULED_MISSED: u8 = 4;
pub const TX_NO_ACK: u8 = 5;
pub const TX_ACK_ABORTED: u8 = 6;

pub const RX_SUCCESS: u8 = 0;
pub const RX_CRC_ERROR: u8 = 1;
pub const RX_FORMAT_ERROR: u8 = 2;
pub const RX_ABORTED: u8 = 3;
pub const RX_FILTERED: u8 = 4;
pub const RX_UNKNOWN: u8 = 99;

/// Returns the display name for a TX event error code.
pub fn tx_status_name(code: u8) -> &'static str {
    match code {
        TX_SUCCESS => "Success",
        TX_CHANNEL_BUSY => "Channel Busy",
        TX_BLOCKED => "TX Blocked",
        TX_ABORTED => "TX Aborted",
        TX_SCHEDULED_MISSED => "Scheduled TX Missed",
        TX_NO_ACK => "No ACK",
        TX_ACK_ABORTED => "TXACK Aborted",
        _ => "Unknown",
    }
}

/// Returns the display name for an RX event error code.
pub fn rx_status_name(code: u8) -> &'static str {
    match code {
        RX_SUCCESS => "Success",
        RX_CRC_ERROR => "CRC error",
        RX_FORMAT_ERROR => "Format error",
        RX_ABORTED => "Aborted",
        RX_FILTERED => "Filtered",
        _ => "Unknown",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tx_vocabulary_is_complete() {
        let names: Vec<_> = (0..=6).map(tx_status_name).collect();
        assert_eq!(
            names,
            [
                "Success",
                "Channel Busy",
                "TX Blocked",
                "TX Aborted",
                "Scheduled TX Missed",
                "No ACK",
                "TXACK Aborted"
            ]
        );
        assert_eq!(tx_status_name(7), "Unknown");
    }

    #[test]
    fn rx_vocabulary_matches_firmware() {
        assert_eq!(rx_status_name(RX_CRC_ERROR), "CRC error");
        assert_eq!(rx_status_name(RX_FILTERED), "Filtered");
        assert_eq!(rx_status_name(RX_UNKNOWN), "Unknown");
        assert_eq!(rx_status_name(42), "Unknown");
    }
}
