//! Big-endian primitive readers and writers
//!
//! `Reader` keeps an integer offset into a borrowed buffer rather than a
//! pointer. Every read is bounded by `end` and returns `None` instead of
//! reading past it, so callers decide whether a short read is fatal.

use super::vlq;

#[derive(Debug, Clone, Copy)]
pub struct Reader<'a> {
    data: &'a [u8],
    pos: usize,
    end: usize,
}

impl<'a> Reader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            data,
            pos: 0,
            end: data.len(),
        }
    }

    /// Reader over `data[pos..end]`, with `end` clamped to the buffer.
    pub fn with_bounds(data: &'a [u8], pos: usize, end: usize) -> Self {
        let end = end.min(data.len());
        Self {
            data,
            pos: pos.min(end),
            end,
        }
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn remaining(&self) -> usize {
        self.end - self.pos
    }

    pub fn is_at_end(&self) -> bool {
        self.pos >= self.end
    }

    /// Look at the next byte without consuming it.
    pub fn peek(&self) -> Option<u8> {
        if self.is_at_end() {
            None
        } else {
            Some(self.data[self.pos])
        }
    }

    pub fn read_u8(&mut self) -> Option<u8> {
        let byte = self.peek()?;
        self.pos += 1;
        Some(byte)
    }

    pub fn read_bytes(&mut self, len: usize) -> Option<&'a [u8]> {
        if self.remaining() < len {
            return None;
        }
        let bytes = &self.data[self.pos..self.pos + len];
        self.pos += len;
        Some(bytes)
    }

    pub fn read_tag(&mut self) -> Option<[u8; 4]> {
        let bytes = self.read_bytes(4)?;
        Some([bytes[0], bytes[1], bytes[2], bytes[3]])
    }

    pub fn read_be16(&mut self) -> Option<u16> {
        let b = self.read_bytes(2)?;
        Some(u16::from_be_bytes([b[0], b[1]]))
    }

    pub fn read_be24(&mut self) -> Option<u32> {
        let b = self.read_bytes(3)?;
        Some(u32::from_be_bytes([0, b[0], b[1], b[2]]))
    }

    pub fn read_be32(&mut self) -> Option<u32> {
        let b = self.read_bytes(4)?;
        Some(u32::from_be_bytes([b[0], b[1], b[2], b[3]]))
    }

    /// Read a variable-length quantity. Lenient: a sequence cut off by `end`
    /// yields the partial value.
    pub fn read_vlq(&mut self) -> u32 {
        let (value, pos) = vlq::decode(self.data, self.pos, self.end);
        self.pos = pos;
        value
    }

    /// Skip `len` bytes. Returns `None`, leaving the reader at `end`, if
    /// fewer than `len` bytes remain.
    pub fn skip(&mut self, len: usize) -> Option<()> {
        if self.remaining() < len {
            self.pos = self.end;
            return None;
        }
        self.pos += len;
        Some(())
    }
}

pub fn write_be16(out: &mut Vec<u8>, value: u16) {
    out.extend_from_slice(&value.to_be_bytes());
}

/// Write the low 24 bits of `value`.
pub fn write_be24(out: &mut Vec<u8>, value: u32) {
    out.extend_from_slice(&value.to_be_bytes()[1..]);
}

pub fn write_be32(out: &mut Vec<u8>, value: u32) {
    out.extend_from_slice(&value.to_be_bytes());
}
