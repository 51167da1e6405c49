/*!
 A bounds-checked cursor over an immutable byte buffer.

 Binary plists store every multi-byte field big-endian; the reader owns the
 current position and fails with [`BinaryPlistError::OutOfBounds`] rather
 than panicking when a read would run past the end of the buffer.
*/

use crate::error::plist::BinaryPlistError;

/// Cursor over the raw plist bytes
#[derive(Debug)]
pub struct StreamReader<'a> {
    /// The buffer we want to parse
    stream: &'a [u8],
    /// The current index we are at in the stream
    idx: usize,
}

impl<'a> StreamReader<'a> {
    pub fn new(stream: &'a [u8]) -> Self {
        Self { stream, idx: 0 }
    }

    /// Total length of the underlying buffer
    pub fn len(&self) -> usize {
        self.stream.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stream.is_empty()
    }

    /// The current cursor position
    pub fn position(&self) -> usize {
        self.idx
    }

    /// Move the cursor to an absolute position
    ///
    /// Seeking past the end is permitted; the next read will fail instead.
    pub fn seek(&mut self, position: usize) {
        self.idx = position;
    }

    /// Advance the cursor without reading
    pub fn skip(&mut self, count: usize) {
        self.idx = self.idx.saturating_add(count);
    }

    /// Whether any bytes remain past the cursor
    pub fn has_more(&self) -> bool {
        self.idx < self.stream.len()
    }

    /// Read exactly `n` bytes from the stream
    pub fn read_exact_bytes(&mut self, n: usize) -> Result<&'a [u8], BinaryPlistError> {
        let end = self
            .idx
            .checked_add(n)
            .ok_or(BinaryPlistError::OutOfBounds(usize::MAX, self.stream.len()))?;
        let range = self
            .stream
            .get(self.idx..end)
            .ok_or(BinaryPlistError::OutOfBounds(end, self.stream.len()))?;
        self.idx = end;
        Ok(range)
    }

    pub fn read_u8(&mut self) -> Result<u8, BinaryPlistError> {
        Ok(self.read_exact_bytes(1)?[0])
    }

    pub fn read_u16(&mut self) -> Result<u16, BinaryPlistError> {
        let bytes = self.read_exact_bytes(2)?;
        Ok(u16::from_be_bytes([bytes[0], bytes[1]]))
    }

    pub fn read_u32(&mut self) -> Result<u32, BinaryPlistError> {
        let bytes = self.read_exact_bytes(4)?;
        Ok(u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    pub fn read_u64(&mut self) -> Result<u64, BinaryPlistError> {
        let bytes = self.read_exact_bytes(8)?;
        Ok(u64::from_be_bytes([
            bytes[0], bytes[1], bytes[2], bytes[3], bytes[4], bytes[5], bytes[6], bytes[7],
        ]))
    }

    /// Read a big-endian unsigned integer of `width` bytes, `width` ≤ 8
    pub fn read_uint(&mut self, width: usize) -> Result<u64, BinaryPlistError> {
        let bytes = self.read_exact_bytes(width)?;
        Ok(bytes.iter().fold(0u64, |acc, byte| (acc << 8) | *byte as u64))
    }
}
