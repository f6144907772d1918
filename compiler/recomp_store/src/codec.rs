//! Varint framing for the binary `dependencies` file.
//!
//! Integers are unsigned LEB128: seven payload bits per byte, high bit set
//! on every byte except the last.

use crate::DecodeError;

/// Cursor over an encoded byte slice.
#[derive(Clone, Debug)]
pub struct Reader<'a> {
    bytes: &'a [u8],
    offset: usize,
}

impl<'a> Reader<'a> {
    #[must_use]
    pub fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, offset: 0 }
    }

    /// True once every byte has been consumed.
    #[must_use]
    pub fn is_at_end(&self) -> bool {
        self.offset >= self.bytes.len()
    }

    pub fn read_u8(&mut self) -> Result<u8, DecodeError> {
        let byte = *self
            .bytes
            .get(self.offset)
            .ok_or(DecodeError::UnexpectedEof)?;
        self.offset += 1;
        Ok(byte)
    }

    pub fn read_uleb128_u64(&mut self) -> Result<u64, DecodeError> {
        let mut result: u64 = 0;
        let mut shift = 0u32;
        loop {
            let byte = self.read_u8()?;
            let payload = u64::from(byte & 0x7f);
            if shift == 63 && payload > 1 {
                return Err(DecodeError::InvalidVarint);
            }
            result |= payload << shift;
            if byte & 0x80 == 0 {
                return Ok(result);
            }
            shift += 7;
            if shift > 63 {
                return Err(DecodeError::InvalidVarint);
            }
        }
    }

    pub fn read_uleb128_usize(&mut self) -> Result<usize, DecodeError> {
        let v = self.read_uleb128_u64()?;
        usize::try_from(v).map_err(|_| DecodeError::InvalidVarint)
    }
}

/// Growable output buffer.
#[derive(Clone, Debug, Default)]
pub struct Writer {
    bytes: Vec<u8>,
}

impl Writer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn write_u8(&mut self, v: u8) {
        self.bytes.push(v);
    }

    pub fn write_uleb128_u64(&mut self, mut v: u64) {
        loop {
            // Masked to seven bits, so the cast is lossless.
            #[allow(clippy::cast_possible_truncation)]
            let byte = (v & 0x7f) as u8;
            v >>= 7;
            if v == 0 {
                self.bytes.push(byte);
                return;
            }
            self.bytes.push(byte | 0x80);
        }
    }

    pub fn write_uleb128_usize(&mut self, v: usize) {
        self.write_uleb128_u64(v as u64);
    }

    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }
}

#[cfg(test)]
mod tests;
