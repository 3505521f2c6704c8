use bytes::BytesMut;
use tokio_util::codec::Decoder;

use crate::codec::RawFrame;
use crate::error::FrameError;
use crate::extractor::{ExtractorConfig, FrameExtractor};

/// `tokio_util` decoder over [`FrameExtractor`].
///
/// Every incoming chunk is moved into the extractor, so the framed read
/// buffer never holds more than one read's worth of bytes.
#[derive(Debug, Default)]
pub struct KitCodec {
    extractor: FrameExtractor,
}

impl KitCodec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: ExtractorConfig) -> Self {
        Self {
            extractor: FrameExtractor::with_config(config),
        }
    }

    pub fn extractor(&self) -> &FrameExtractor {
        &self.extractor
    }
}

impl Decoder for KitCodec {
    type Item = RawFrame;
    type Error = FrameError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<RawFrame>, FrameError> {
        if !src.is_empty() {
            self.extractor.feed(src);
            src.clear();
        }
        Ok(self.extractor.next_frame())
    }

    fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<RawFrame>, FrameError> {
        match self.decode(src)? {
            Some(frame) => Ok(Some(frame)),
            None => {
                self.extractor.reset();
                Ok(None)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use bytes::Bytes;
    use futures_util::StreamExt;
    use tokio_util::codec::FramedRead;

    use super::*;
    use crate::codec::{encode_rx_event, FrameLayout, KitAddress, RxEvent};

    fn rx_wire(payload: &'static [u8]) -> (RxEvent, Vec<u8>) {
        let event = RxEvent {
            payload: Bytes::from_static(payload),
            kit_address: KitAddress([0x00, 0x0B, 0x57, 0xFF, 0xFE, 0x01, 0x02, 0x03]),
            error_code: 0,
            is_ack: false,
            channel: 25,
            kit_timestamp: Some(55),
            crc_passed: true,
            rssi: -71,
            lqi: 180,
        };
        let mut buf = BytesMut::new();
        encode_rx_event(&event, FrameLayout::Canonical, &mut buf).unwrap();
        (event, buf.to_vec())
    }

    #[tokio::test]
    async fn framed_read_yields_frames() {
        let (event, wire) = rx_wire(&[0x41, 0xD8, 0x01, 0xCD, 0xAB]);
        let mut stream = b"sniffer ready\r\n".to_vec();
        stream.extend_from_slice(&wire);
        stream.extend_from_slice(b"> ");

        let mut framed = FramedRead::new(stream.as_slice(), KitCodec::new());

        let first = framed.next().await.unwrap().unwrap();
        assert_eq!(first.kind_name(), "text");
        assert_eq!(framed.next().await.unwrap().unwrap(), RawFrame::Rx(event));
        assert_eq!(framed.next().await.unwrap().unwrap().kind_name(), "text");
        assert!(framed.next().await.is_none());
    }

    #[tokio::test]
    async fn trailing_partial_frame_is_dropped_at_eof() {
        let (_, wire) = rx_wire(&[1, 2, 3]);
        let truncated = &wire[..wire.len() - 3];

        let mut framed = FramedRead::new(truncated, KitCodec::new());
        assert!(framed.next().await.is_none());
        assert_eq!(framed.decoder().extractor().buffered_len(), 0);
    }

    #[test]
    fn decode_drains_source_buffer() {
        let (event, wire) = rx_wire(&[9]);
        let mut codec = KitCodec::new();

        let mut src = BytesMut::from(&wire[..5]);
        assert!(codec.decode(&mut src).unwrap().is_none());
        assert!(src.is_empty());

        let mut src = BytesMut::from(&wire[5..]);
        assert_eq!(codec.decode(&mut src).unwrap(), Some(RawFrame::Rx(event)));
    }
}
