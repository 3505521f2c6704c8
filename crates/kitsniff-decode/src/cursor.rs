use crate::bits::{BitWord, ByteOrder};

/// Forward-only reader over a payload slice. Reads that don't fit return
/// `None` and leave the position unchanged.
#[derive(Debug, Clone)]
pub(crate) struct ByteCursor<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> ByteCursor<'a> {
    pub(crate) fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    pub(crate) fn position(&self) -> usize {
        self.pos
    }

    pub(crate) fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    pub(crate) fn peek_u8(&self) -> Option<u8> {
        self.data.get(self.pos).copied()
    }

    pub(crate) fn take(&mut self, len: usize) -> Option<&'a [u8]> {
        let end = self.pos.checked_add(len)?;
        let out = self.data.get(self.pos..end)?;
        self.pos = end;
        Some(out)
    }

    pub(crate) fn u8(&mut self) -> Option<u8> {
        self.take(1).map(|b| b[0])
    }

    pub(crate) fn word(&mut self, len: usize, order: ByteOrder) -> Option<BitWord> {
        if len == 0 || len > 4 || self.remaining() < len {
            return None;
        }
        self.take(len).and_then(|b| BitWord::from_bytes(b, order))
    }
}
