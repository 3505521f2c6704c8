use tracing::{debug, trace};

use crate::accumulator::ByteAccumulator;
use crate::codec::{
    parse_rx, parse_tx, FrameLayout, RawFrame, TextLine, FOOTER, HEADER_SIZE, MARKER, PROMPT,
    TYPE_RX, TYPE_TX,
};

const TEXT_TERMINATORS: [[u8; 2]; 2] = [FOOTER, PROMPT];

/// Default bound on scanned bytes held back for a text line.
pub const DEFAULT_MAX_LINE_LEN: usize = 1024;

/// Extractor state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractorState {
    /// Looking for a binary marker or a text terminator at the cursor.
    Idle,
    /// Marker seen; waiting for the type and length bytes.
    Binary,
    /// Waiting for a complete TX window of `total_len` bytes.
    AwaitingTx { total_len: usize },
    /// Waiting for a complete RX window of `total_len` bytes.
    AwaitingRx { total_len: usize },
}

/// Configuration for the frame extractor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractorConfig {
    /// Binary frame layout the kit firmware speaks. Default: canonical.
    pub layout: FrameLayout,
    /// Most scanned bytes kept waiting for a text terminator. Past this the
    /// oldest scanned bytes are dropped, so a stream of corrupted frames with
    /// no CRLF cannot grow the buffer. Default: 1024.
    pub max_line_len: usize,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            layout: FrameLayout::default(),
            max_line_len: DEFAULT_MAX_LINE_LEN,
        }
    }
}

/// Running counters, for diagnostics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExtractorStats {
    pub text_frames: u64,
    pub tx_frames: u64,
    pub rx_frames: u64,
    /// Windows rejected because the last two bytes were not `0D 0A`.
    pub footer_mismatches: u64,
    /// Markers followed by a type byte that is neither TX nor RX.
    pub unknown_types: u64,
    /// Bytes skipped because they start neither a frame nor a terminator.
    /// Rescanned bytes are not counted again.
    pub noise_bytes: u64,
    /// Scanned bytes dropped to keep the buffer within `max_line_len`.
    pub discarded_bytes: u64,
}

#[derive(Debug, Clone, Copy)]
enum Resync {
    Noise,
    UnknownType(u8),
    FooterMismatch(EventKind, usize),
}

#[derive(Debug, Clone, Copy)]
enum EventKind {
    Tx,
    Rx,
}

enum Step {
    Emit(RawFrame),
    Continue,
    NeedMore,
}

/// Recovers kit frames from a byte stream delivered in arbitrary chunks.
///
/// One extractor serves exactly one serial connection. It never blocks and
/// never fails: malformed input is skipped a byte at a time until a
/// recognizable marker or terminator shows up again.
#[derive(Debug)]
pub struct FrameExtractor {
    acc: ByteAccumulator,
    state: ExtractorState,
    config: ExtractorConfig,
    stats: ExtractorStats,
}

impl Default for FrameExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameExtractor {
    /// Create an extractor for the canonical frame layout.
    pub fn new() -> Self {
        Self::with_config(ExtractorConfig::default())
    }

    /// Create an extractor with explicit configuration.
    pub fn with_config(config: ExtractorConfig) -> Self {
        Self {
            acc: ByteAccumulator::new(),
            state: ExtractorState::Idle,
            config,
            stats: ExtractorStats::default(),
        }
    }

    /// Append newly arrived bytes.
    pub fn feed(&mut self, bytes: &[u8]) {
        self.acc.extend(bytes);
    }

    /// Every frame that is complete so far, in stream order.
    ///
    /// Returns an empty vector when more bytes are needed.
    pub fn poll(&mut self) -> Vec<RawFrame> {
        let mut frames = Vec::new();
        while let Some(frame) = self.next_frame() {
            frames.push(frame);
        }
        frames
    }

    /// The next complete frame, if one is buffered.
    pub fn next_frame(&mut self) -> Option<RawFrame> {
        loop {
            match self.step() {
                Step::Emit(frame) => return Some(frame),
                Step::Continue => continue,
                Step::NeedMore => return None,
            }
        }
    }

    pub fn state(&self) -> ExtractorState {
        self.state
    }

    pub fn stats(&self) -> ExtractorStats {
        self.stats
    }

    pub fn config(&self) -> &ExtractorConfig {
        &self.config
    }

    /// Bytes held back waiting for a frame to complete.
    pub fn buffered_len(&self) -> usize {
        self.acc.len()
    }

    /// Drop all buffered bytes and return to `Idle`.
    pub fn reset(&mut self) {
        if !self.acc.is_empty() {
            debug!(discarded = self.acc.len(), "discarding partial frame data");
        }
        self.acc.clear();
        self.state = ExtractorState::Idle;
    }

    fn step(&mut self) -> Step {
        match self.state {
            ExtractorState::Idle => self.step_idle(),
            ExtractorState::Binary => self.step_binary(),
            ExtractorState::AwaitingTx { total_len } => self.step_window(EventKind::Tx, total_len),
            ExtractorState::AwaitingRx { total_len } => self.step_window(EventKind::Rx, total_len),
        }
    }

    fn step_idle(&mut self) -> Step {
        let Some(lead) = self.acc.peek(0, 2) else {
            return Step::NeedMore;
        };

        if lead == MARKER {
            self.state = ExtractorState::Binary;
            return Step::Continue;
        }

        if TEXT_TERMINATORS.iter().any(|t| lead == t) {
            let Some(at) = self.acc.find_pair(&TEXT_TERMINATORS) else {
                return Step::NeedMore;
            };
            let bytes = self.acc.take_prefix(at + 2);
            self.stats.text_frames += 1;
            trace!(len = bytes.len(), "text frame");
            return Step::Emit(RawFrame::Text(TextLine { bytes }));
        }

        self.resync(Resync::Noise);
        Step::Continue
    }

    fn step_binary(&mut self) -> Step {
        let Some(header) = self.acc.peek(0, HEADER_SIZE) else {
            return Step::NeedMore;
        };
        let (frame_type, payload_len) = (header[2], header[3] as usize);
        let layout = self.config.layout;

        match frame_type {
            TYPE_TX => {
                self.state = ExtractorState::AwaitingTx {
                    total_len: layout.tx_frame_len(payload_len),
                }
            }
            TYPE_RX => {
                self.state = ExtractorState::AwaitingRx {
                    total_len: layout.rx_frame_len(payload_len),
                }
            }
            other => self.resync(Resync::UnknownType(other)),
        }
        Step::Continue
    }

    fn step_window(&mut self, kind: EventKind, total_len: usize) -> Step {
        let Some(window) = self.acc.peek(0, total_len) else {
            return Step::NeedMore;
        };

        if window[total_len - FOOTER.len()..] != FOOTER {
            self.resync(Resync::FooterMismatch(kind, total_len));
            return Step::Continue;
        }

        let window = self.acc.take_window(total_len);
        self.state = ExtractorState::Idle;
        let layout = self.config.layout;

        let frame = match kind {
            EventKind::Tx => {
                self.stats.tx_frames += 1;
                RawFrame::Tx(parse_tx(&window, layout))
            }
            EventKind::Rx => {
                self.stats.rx_frames += 1;
                RawFrame::Rx(parse_rx(&window, layout))
            }
        };
        trace!(kind = frame.kind_name(), len = total_len, "binary frame");
        Step::Emit(frame)
    }

    /// Skip the byte at the cursor and go back to `Idle`. Diagnostics only
    /// count a byte the first time it is skipped.
    fn resync(&mut self, reason: Resync) {
        if self.acc.skip_byte() {
            match reason {
                Resync::Noise => self.stats.noise_bytes += 1,
                Resync::UnknownType(frame_type) => {
                    debug!(
                        frame_type = format_args!("0x{frame_type:02X}"),
                        "unknown binary frame type; resyncing"
                    );
                    self.stats.unknown_types += 1;
                }
                Resync::FooterMismatch(kind, total_len) => {
                    debug!(?kind, total_len, "binary frame footer mismatch; resyncing");
                    self.stats.footer_mismatches += 1;
                }
            }
        }
        self.state = ExtractorState::Idle;

        if self.acc.cursor() > self.config.max_line_len {
            let dropped = self.acc.discard_scanned();
            self.stats.discarded_bytes += dropped as u64;
            debug!(dropped, "dropping unterminated bytes");
        }
    }
}
