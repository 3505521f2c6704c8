use bytes::{Buf, Bytes, BytesMut};

const INITIAL_BUFFER_CAPACITY: usize = 4 * 1024;

/// Append-only byte buffer with a read cursor.
///
/// Bytes before the cursor have been looked at but not consumed; they stay
/// buffered until a frame that starts at or before them is taken out.
///
/// The accumulator also remembers how far the cursor has ever skipped, so a
/// byte that is rescanned after a frame is removed ahead of it is only
/// reported as newly skipped once.
#[derive(Debug, Default)]
pub struct ByteAccumulator {
    buf: BytesMut,
    cursor: usize,
    /// Bytes below this index have already been skipped once.
    skipped: usize,
}

impl ByteAccumulator {
    pub fn new() -> Self {
        Self {
            buf: BytesMut::with_capacity(INITIAL_BUFFER_CAPACITY),
            cursor: 0,
            skipped: 0,
        }
    }

    /// Append newly arrived bytes.
    pub fn extend(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    /// Total buffered bytes, including those before the cursor.
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Bytes available from the cursor onward.
    pub fn available(&self) -> usize {
        self.buf.len() - self.cursor
    }

    /// `len` bytes starting `offset` bytes past the cursor, if buffered.
    pub fn peek(&self, offset: usize, len: usize) -> Option<&[u8]> {
        let start = self.cursor.checked_add(offset)?;
        let end = start.checked_add(len)?;
        self.buf.get(start..end)
    }

    /// Move the cursor forward, never past the end of the buffer.
    pub fn advance_cursor(&mut self, n: usize) {
        self.cursor = (self.cursor + n).min(self.buf.len());
    }

    /// Step the cursor over one byte. Returns `true` the first time that
    /// byte is skipped, `false` when it is being rescanned.
    pub fn skip_byte(&mut self) -> bool {
        let fresh = self.cursor >= self.skipped;
        self.advance_cursor(1);
        if fresh {
            self.skipped = self.cursor;
        }
        fresh
    }

    /// Drop every byte before the cursor without copying it.
    /// Returns how many bytes were dropped.
    pub fn discard_scanned(&mut self) -> usize {
        let n = self.cursor;
        self.buf.advance(n);
        self.cursor = 0;
        self.skipped = self.skipped.saturating_sub(n);
        n
    }

    /// Absolute index of the first two-byte sequence at or after the cursor
    /// that is one of `pairs`.
    pub fn find_pair(&self, pairs: &[[u8; 2]]) -> Option<usize> {
        self.buf[self.cursor..]
            .windows(2)
            .position(|w| pairs.iter().any(|p| w == p))
            .map(|rel| self.cursor + rel)
    }

    /// Remove and return everything before absolute index `end`.
    /// The cursor returns to the start of the buffer.
    pub fn take_prefix(&mut self, end: usize) -> Bytes {
        let end = end.min(self.buf.len());
        let out = Bytes::copy_from_slice(&self.buf[..end]);
        self.buf.advance(end);
        self.cursor = 0;
        self.skipped = self.skipped.saturating_sub(end);
        out
    }

    /// Remove and return `len` bytes starting at the cursor, keeping whatever
    /// precedes the cursor. The cursor returns to the start of the buffer.
    pub fn take_window(&mut self, len: usize) -> Bytes {
        let start = self.cursor;
        let end = (start + len).min(self.buf.len());
        let out = Bytes::copy_from_slice(&self.buf[start..end]);

        if start == 0 {
            self.buf.advance(end);
        } else {
            let tail = self.buf.split_off(end);
            self.buf.truncate(start);
            self.buf.unsplit(tail);
        }
        if self.skipped >= end {
            self.skipped -= end - start;
        } else if self.skipped > start {
            self.skipped = start;
        }
        self.cursor = 0;
        out
    }

    /// Drop everything (connection teardown).
    pub fn clear(&mut self) {
        self.buf.clear();
        self.cursor = 0;
        self.skipped = 0;
    }

    /// The whole buffer, for diagnostics.
    pub fn as_slice(&self) -> &[u8] {
        &self.buf
    }
}
