//! Property-based tests for the frame extractor.
//!
//! - Output and stats do not depend on how the stream is chunked, including
//!   streams mixing text, noise, corrupted frames and valid events
//! - Encoded events come back unchanged
//! - The buffer stays bounded however many frames are corrupted
//! - A corrupted frame never hides the frame after it
//! - Arbitrary noise never panics and never grows the buffer past the input

use bytes::{Bytes, BytesMut};
use kitsniff_frame::{
    encode_rx_event, encode_tx_event, ExtractorStats, FrameExtractor, FrameLayout, KitAddress,
    RawFrame, RxEvent, TextLine, TxEvent, DEFAULT_MAX_LINE_LEN,
};
use proptest::prelude::*;

fn tx_strategy() -> impl Strategy<Value = TxEvent> {
    (
        prop::collection::vec(any::<u8>(), 0..=127),
        any::<[u8; 8]>(),
        0u8..=6,
        any::<bool>(),
        11u8..=26,
        any::<u32>(),
    )
        .prop_map(|(payload, addr, error_code, is_ack, channel, ts)| TxEvent {
            payload: Bytes::from(payload),
            kit_address: KitAddress(addr),
            error_code,
            is_ack,
            channel,
            kit_timestamp: Some(ts),
        })
}

fn rx_strategy() -> impl Strategy<Value = RxEvent> {
    (
        prop::collection::vec(any::<u8>(), 0..=127),
        any::<[u8; 8]>(),
        any::<bool>(),
        any::<u32>(),
        any::<bool>(),
        any::<i8>(),
        any::<u8>(),
    )
        .prop_map(|(payload, addr, is_ack, ts, crc_passed, rssi, lqi)| RxEvent {
            payload: Bytes::from(payload),
            kit_address: KitAddress(addr),
            error_code: 0,
            is_ack,
            channel: 15,
            kit_timestamp: Some(ts),
            crc_passed,
            rssi,
            lqi,
        })
}

fn event_strategy() -> impl Strategy<Value = RawFrame> {
    prop_oneof![
        tx_strategy().prop_map(RawFrame::Tx),
        rx_strategy().prop_map(RawFrame::Rx),
    ]
}

fn encode(frames: &[RawFrame]) -> Vec<u8> {
    let mut buf = BytesMut::new();
    for frame in frames {
        match frame {
            RawFrame::Tx(tx) => encode_tx_event(tx, FrameLayout::Canonical, &mut buf).unwrap(),
            RawFrame::Rx(rx) => encode_rx_event(rx, FrameLayout::Canonical, &mut buf).unwrap(),
            RawFrame::Text(line) => buf.extend_from_slice(&line.bytes),
        }
    }
    buf.to_vec()
}

/// One piece of a kit stream.
#[derive(Debug, Clone)]
enum Segment {
    Event(RawFrame),
    Text(Vec<u8>),
    Noise(Vec<u8>),
    /// An event whose footer was overwritten.
    Corrupt(RawFrame, u8),
}

fn segment_strategy() -> impl Strategy<Value = Segment> {
    prop_oneof![
        3 => event_strategy().prop_map(Segment::Event),
        2 => ("[a-z0-9 =]{0,40}", prop_oneof![Just(&b"\r\n"[..]), Just(&b"> "[..])]).prop_map(
            |(text, end)| {
                let mut line = text.into_bytes();
                line.extend_from_slice(end);
                Segment::Text(line)
            }
        ),
        1 => prop::collection::vec(any::<u8>(), 1..24).prop_map(Segment::Noise),
        2 => (
            event_strategy(),
            any::<u8>().prop_filter("must differ from LF", |b| *b != 0x0A)
        )
            .prop_map(|(event, footer)| Segment::Corrupt(event, footer)),
    ]
}

fn encode_segments(segments: &[Segment]) -> Vec<u8> {
    let mut wire = Vec::new();
    for segment in segments {
        match segment {
            Segment::Event(frame) => wire.extend(encode(std::slice::from_ref(frame))),
            Segment::Text(bytes) | Segment::Noise(bytes) => wire.extend_from_slice(bytes),
            Segment::Corrupt(frame, footer) => {
                let mut bytes = encode(std::slice::from_ref(frame));
                let last = bytes.len() - 1;
                bytes[last] = *footer;
                wire.extend(bytes);
            }
        }
    }
    wire
}

fn run_chunked(bytes: &[u8], chunk_sizes: &[usize]) -> (Vec<RawFrame>, ExtractorStats, usize) {
    let mut ex = FrameExtractor::new();
    let mut frames = Vec::new();
    let mut rest = bytes;
    let mut sizes = chunk_sizes.iter().cycle();
    while !rest.is_empty() {
        let n = sizes.next().copied().unwrap_or(1).clamp(1, rest.len());
        let (chunk, tail) = rest.split_at(n);
        ex.feed(chunk);
        frames.extend(ex.poll());
        rest = tail;
    }
    (frames, ex.stats(), ex.buffered_len())
}

fn run_whole(bytes: &[u8]) -> (Vec<RawFrame>, ExtractorStats, usize) {
    let mut ex = FrameExtractor::new();
    ex.feed(bytes);
    let frames = ex.poll();
    (frames, ex.stats(), ex.buffered_len())
}

fn extract_chunked(bytes: &[u8], chunk_sizes: &[usize]) -> Vec<RawFrame> {
    let mut ex = FrameExtractor::new();
    let mut frames = Vec::new();
    let mut rest = bytes;
    let mut sizes = chunk_sizes.iter().cycle();
    while !rest.is_empty() {
        let n = sizes.next().copied().unwrap_or(1).clamp(1, rest.len());
        let (chunk, tail) = rest.split_at(n);
        ex.feed(chunk);
        frames.extend(ex.poll());
        rest = tail;
    }
    frames
}

fn extract_whole(bytes: &[u8]) -> Vec<RawFrame> {
    let mut ex = FrameExtractor::new();
    ex.feed(bytes);
    ex.poll()
}

#[test]
fn prop_events_roundtrip() {
    proptest!(|(events in prop::collection::vec(event_strategy(), 1..8))| {
        let wire = encode(&events);
        prop_assert_eq!(extract_whole(&wire), events);
    });
}

#[test]
fn prop_chunking_does_not_change_events() {
    proptest!(|(
        events in prop::collection::vec(event_strategy(), 1..6),
        chunk_sizes in prop::collection::vec(1usize..=32, 1..16),
    )| {
        let wire = encode(&events);
        prop_assert_eq!(extract_chunked(&wire, &chunk_sizes), events.clone());
        prop_assert_eq!(extract_chunked(&wire, &[1]), events);
    });
}

#[test]
fn prop_chunking_does_not_change_noise_handling() {
    proptest!(|(
        noise in prop::collection::vec(any::<u8>(), 0..512),
        chunk_sizes in prop::collection::vec(1usize..=16, 1..8),
    )| {
        prop_assert_eq!(extract_chunked(&noise, &chunk_sizes), extract_whole(&noise));
    });
}

#[test]
fn prop_mixed_stream_is_chunk_invariant() {
    proptest!(ProptestConfig::with_cases(512), |(
        segments in prop::collection::vec(segment_strategy(), 1..24),
        step in 1usize..=7,
    )| {
        let wire = encode_segments(&segments);
        let whole = run_whole(&wire);
        prop_assert_eq!(run_chunked(&wire, &[step]), whole.clone());
        prop_assert_eq!(run_chunked(&wire, &[1]), whole);
    });
}

#[test]
fn prop_text_and_events_interleave_in_order() {
    let clean = segment_strategy().prop_filter("events and text only", |s| {
        matches!(s, Segment::Event(_) | Segment::Text(_))
    });
    proptest!(|(segments in prop::collection::vec(clean, 1..16))| {
        let wire = encode_segments(&segments);
        let expected: Vec<RawFrame> = segments
            .iter()
            .map(|segment| match segment {
                Segment::Event(frame) => frame.clone(),
                Segment::Text(bytes) => RawFrame::Text(TextLine {
                    bytes: Bytes::from(bytes.clone()),
                }),
                other => unreachable!("filtered out: {other:?}"),
            })
            .collect();

        let (frames, stats, buffered) = run_whole(&wire);
        prop_assert_eq!(frames, expected);
        prop_assert_eq!(stats.footer_mismatches, 0);
        prop_assert_eq!(stats.unknown_types, 0);
        prop_assert_eq!(buffered, 0);
    });
}

#[test]
fn prop_corrupted_frames_keep_buffer_bounded() {
    proptest!(ProptestConfig::with_cases(64), |(
        corrupted in prop::collection::vec(
            (event_strategy(), any::<u8>().prop_filter("not LF", |b| *b != 0x0A)),
            40..120,
        ),
    )| {
        let segments: Vec<_> = corrupted
            .into_iter()
            .map(|(event, footer)| Segment::Corrupt(event, footer))
            .collect();
        let wire = encode_segments(&segments);

        let mut ex = FrameExtractor::new();
        let mut peak = 0;
        for chunk in wire.chunks(64) {
            ex.feed(chunk);
            let _ = ex.poll();
            peak = peak.max(ex.buffered_len());
        }
        // Scanned bytes are capped; at most one partial window sits past them.
        let max_window = 4 + 255 + 25 + 64;
        prop_assert!(peak <= DEFAULT_MAX_LINE_LEN + max_window, "peak {}", peak);
    });
}

#[test]
fn prop_noise_never_grows_buffer() {
    proptest!(|(noise in prop::collection::vec(any::<u8>(), 0..1024))| {
        let mut ex = FrameExtractor::new();
        ex.feed(&noise);
        let _ = ex.poll();
        prop_assert!(ex.buffered_len() <= noise.len());
    });
}

#[test]
fn prop_corrupted_footer_then_resync() {
    // Payload bytes that can't start a marker or a terminator keep the
    // corrupted window from pairing with the frame after it.
    let quiet_byte = any::<u8>().prop_filter("marker/terminator lead", |b| {
        !matches!(b, 0xAA | 0x0D | 0x3E)
    });

    proptest!(|(
        bad_payload in prop::collection::vec(quiet_byte.clone(), 0..64),
        good_payload in prop::collection::vec(any::<u8>(), 0..64),
        bad_footer in any::<u8>().prop_filter("must differ from LF", |b| *b != 0x0A),
    )| {
        let event = |payload: Vec<u8>| TxEvent {
            payload: Bytes::from(payload),
            kit_address: KitAddress([0x00, 0x0B, 0x57, 0xFF, 0xFE, 0x01, 0x02, 0x03]),
            error_code: 0,
            is_ack: false,
            channel: 15,
            kit_timestamp: Some(0x0102_0304),
        };

        let good = event(good_payload);
        let mut wire = encode(&[RawFrame::Tx(event(bad_payload))]);
        let last = wire.len() - 1;
        wire[last] = bad_footer;
        wire.extend(encode(&[RawFrame::Tx(good.clone())]));

        let mut ex = FrameExtractor::new();
        ex.feed(&wire);
        let binary: Vec<_> = ex
            .poll()
            .into_iter()
            .filter(|f| !matches!(f, RawFrame::Text(_)))
            .collect();

        prop_assert_eq!(binary, vec![RawFrame::Tx(good)]);
        prop_assert!(ex.stats().footer_mismatches >= 1);
    });
}
