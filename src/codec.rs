//! # Wire Codec
//!
//! Primitive binary encoders/decoders for the Bitcoin-style peer-to-peer wire
//! format: fixed-width little-endian integers, `varint`, `varstr`, and the
//! 256-bit hash type. Every multi-byte integer is little-endian **except**
//! [`Address::port`](crate::types::Address), which is big-endian and is
//! encoded directly by the caller rather than through this module.
//!
//! Decoders never partially mutate their result on failure: a `Reader`
//! advances its cursor only after a read fully succeeds, so a failed decode
//! leaves the buffer position exactly where it was.

use crate::error::CodecError;

/// 32-byte hash, stored and transmitted little-endian.
pub type Hash256 = [u8; 32];

/// A cursor over a byte slice that decodes wire values, failing with
/// [`CodecError::Truncated`] rather than panicking when the slice runs out.
pub struct Reader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    /// Wrap a byte slice for sequential decoding.
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    /// Bytes left to read.
    pub fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    /// Current cursor offset from the start of the slice.
    pub fn position(&self) -> usize {
        self.pos
    }

    fn require(&self, needed: usize) -> Result<(), CodecError> {
        if self.remaining() < needed {
            Err(CodecError::Truncated {
                needed,
                available: self.remaining(),
            })
        } else {
            Ok(())
        }
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8], CodecError> {
        self.require(n)?;
        let slice = &self.buf[self.pos..self.pos + n];
        self.pos += n;
        Ok(slice)
    }

    /// Read a single byte.
    pub fn read_u8(&mut self) -> Result<u8, CodecError> {
        Ok(self.take(1)?[0])
    }

    /// Read a little-endian `u16`.
    pub fn read_u16_le(&mut self) -> Result<u16, CodecError> {
        let b = self.take(2)?;
        Ok(u16::from_le_bytes(b.try_into().unwrap()))
    }

    /// Read a big-endian `u16` (used only for `Address.port`).
    pub fn read_u16_be(&mut self) -> Result<u16, CodecError> {
        let b = self.take(2)?;
        Ok(u16::from_be_bytes(b.try_into().unwrap()))
    }

    /// Read a little-endian `u32`.
    pub fn read_u32_le(&mut self) -> Result<u32, CodecError> {
        let b = self.take(4)?;
        Ok(u32::from_le_bytes(b.try_into().unwrap()))
    }

    /// Read a little-endian `u64`.
    pub fn read_u64_le(&mut self) -> Result<u64, CodecError> {
        let b = self.take(8)?;
        Ok(u64::from_le_bytes(b.try_into().unwrap()))
    }

    /// Read a little-endian `i64`.
    pub fn read_i64_le(&mut self) -> Result<i64, CodecError> {
        let b = self.take(8)?;
        Ok(i64::from_le_bytes(b.try_into().unwrap()))
    }

    /// Read a fixed number of raw bytes.
    pub fn read_bytes(&mut self, n: usize) -> Result<Vec<u8>, CodecError> {
        Ok(self.take(n)?.to_vec())
    }

    /// Read a 32-byte hash, stored little-endian on the wire.
    pub fn read_hash256(&mut self) -> Result<Hash256, CodecError> {
        let b = self.take(32)?;
        let mut out = [0u8; 32];
        out.copy_from_slice(b);
        Ok(out)
    }

    /// Read a `varint`: values `< 0xFD` are one byte; `0xFD`/`0xFE`/`0xFF`
    /// prefix a 2/4/8-byte little-endian value respectively.
    pub fn read_varint(&mut self) -> Result<u64, CodecError> {
        let prefix = self.read_u8()?;
        match prefix {
            0xFF => self.read_u64_le(),
            0xFE => Ok(self.read_u32_le()? as u64),
            0xFD => Ok(self.read_u16_le()? as u64),
            n => Ok(n as u64),
        }
    }

    /// Read a `varint` length clamped to `usize`, for use as a collection or
    /// byte-string length.
    pub fn read_varlen(&mut self) -> Result<usize, CodecError> {
        Ok(self.read_varint()? as usize)
    }

    /// Read a `varstr`: a `varint` length followed by that many raw bytes.
    pub fn read_varstr(&mut self) -> Result<Vec<u8>, CodecError> {
        let len = self.read_varlen()?;
        self.read_bytes(len)
    }
}

/// Append a `varint`-encoded length-or-value.
pub fn write_varint(out: &mut Vec<u8>, value: u64) {
    if value < 0xFD {
        out.push(value as u8);
    } else if value <= 0xFFFF {
        out.push(0xFD);
        out.extend_from_slice(&(value as u16).to_le_bytes());
    } else if value <= 0xFFFF_FFFF {
        out.push(0xFE);
        out.extend_from_slice(&(value as u32).to_le_bytes());
    } else {
        out.push(0xFF);
        out.extend_from_slice(&value.to_le_bytes());
    }
}

/// Append a `varstr`: a `varint` length prefix followed by the raw bytes.
pub fn write_varstr(out: &mut Vec<u8>, bytes: &[u8]) {
    write_varint(out, bytes.len() as u64);
    out.extend_from_slice(bytes);
}

/// Append a 32-byte hash, little-endian on the wire.
pub fn write_hash256(out: &mut Vec<u8>, hash: &Hash256) {
    out.extend_from_slice(hash);
}

/// Returns the number of bytes a `varint` encoding of `value` would occupy.
pub fn varint_len(value: u64) -> usize {
    if value < 0xFD {
        1
    } else if value <= 0xFFFF {
        3
    } else if value <= 0xFFFF_FFFF {
        5
    } else {
        9
    }
}
