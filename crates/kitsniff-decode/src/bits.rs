//! Bit-range extraction over fixed-width header words.

/// Byte order of a multi-byte word on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ByteOrder {
    Little,
    Big,
}

/// Bits `[start, start + width)` of `value`, bit 0 being the LSB.
///
/// Ranges that run past bit 31 are cut off there.
pub fn extract_bits(value: u32, start: u32, width: u32) -> u32 {
    if width == 0 || start >= u32::BITS {
        return 0;
    }
    let shifted = value >> start;
    if width >= u32::BITS {
        shifted
    } else {
        shifted & ((1u32 << width) - 1)
    }
}

/// An unsigned header word of 8, 16, 24 or 32 bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BitWord {
    value: u32,
    width: u32,
}

impl BitWord {
    /// Wrap `value` as a word of `width` bits. Bits above `width` are dropped.
    pub fn new(value: u32, width: u32) -> Self {
        let width = width.clamp(1, u32::BITS);
        Self {
            value: extract_bits(value, 0, width),
            width,
        }
    }

    /// Read a 1 to 4 byte word.
    pub fn from_bytes(bytes: &[u8], order: ByteOrder) -> Option<Self> {
        if bytes.is_empty() || bytes.len() > 4 {
            return None;
        }
        let fold = |acc: u32, b: &u8| (acc << 8) | u32::from(*b);
        let value = match order {
            ByteOrder::Big => bytes.iter().fold(0, fold),
            ByteOrder::Little => bytes.iter().rev().fold(0, fold),
        };
        Some(Self::new(value, bytes.len() as u32 * 8))
    }

    pub fn value(self) -> u32 {
        self.value
    }

    /// Width in bits.
    pub fn width(self) -> u32 {
        self.width
    }

    pub fn bits(self, start: u32, width: u32) -> u32 {
        extract_bits(self.value, start, width)
    }

    pub fn flag(self, bit: u32) -> bool {
        self.bits(bit, 1) == 1
    }

    /// Dotted rendering of one bit range, MSB first, in nibble groups:
    /// bits outside the range print as `.`.
    ///
    /// ```
    /// use kitsniff_decode::BitWord;
    /// assert_eq!(BitWord::new(0x8841, 16).mask_display(0, 3), ".... .... .... .001");
    /// ```
    pub fn mask_display(self, start: u32, width: u32) -> String {
        let end = start.saturating_add(width);
        self.render(|bit| (start..end).contains(&bit))
    }

    /// Every bit of the word, MSB first, in nibble groups.
    pub fn binary_display(self) -> String {
        self.render(|_| true)
    }

    fn render(self, shown: impl Fn(u32) -> bool) -> String {
        let mut out = String::with_capacity(self.width as usize * 5 / 4);
        for bit in (0..self.width).rev() {
            out.push(match (shown(bit), self.flag(bit)) {
                (false, _) => '.',
                (true, true) => '1',
                (true, false) => '0',
            });
            if bit % 4 == 0 && bit != 0 {
                out.push(' ');
            }
        }
        out
    }
}
