use std::io::Write;

use byteorder::{ByteOrder, LittleEndian, WriteBytesExt};

use crate::foundation::error::{ShowError, ShowResult};

/// Tag bodies up to this length fit in the short (16-bit) record header.
pub const SHORT_TAG_MAX_LEN: u32 = 0x3e;

/// Growable little-endian byte buffer holding the structural part of a container.
///
/// Offsets returned by [`SwfOutput::pos`] are stable, which lets the lazy bitmap pipeline record
/// where bitmap tags must be spliced in during assembly.
#[derive(Clone, Debug, Default)]
pub struct SwfOutput {
    buf: Vec<u8>,
}

impl SwfOutput {
    /// Create an empty buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current write offset.
    pub fn pos(&self) -> usize {
        self.buf.len()
    }

    /// Bytes written so far.
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    /// Consume the buffer.
    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }

    /// Append one byte.
    pub fn write_u8(&mut self, v: u8) {
        self.buf.push(v);
    }

    /// Append a little-endian `u16`.
    pub fn write_u16(&mut self, v: u16) {
        let mut b = [0u8; 2];
        LittleEndian::write_u16(&mut b, v);
        self.buf.extend_from_slice(&b);
    }

    /// Append a little-endian `i16`.
    pub fn write_i16(&mut self, v: i16) {
        let mut b = [0u8; 2];
        LittleEndian::write_i16(&mut b, v);
        self.buf.extend_from_slice(&b);
    }

    /// Append a little-endian `u32`.
    pub fn write_u32(&mut self, v: u32) {
        let mut b = [0u8; 4];
        LittleEndian::write_u32(&mut b, v);
        self.buf.extend_from_slice(&b);
    }

    /// Append raw bytes.
    pub fn write_bytes(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    /// Overwrite a previously written little-endian `u32` at `offset`.
    pub fn write_u32_at(&mut self, offset: usize, v: u32) -> ShowResult<()> {
        let end = offset
            .checked_add(4)
            .filter(|&end| end <= self.buf.len())
            .ok_or_else(|| ShowError::state(format!("patch offset {offset} is past the end")))?;
        LittleEndian::write_u32(&mut self.buf[offset..end], v);
        Ok(())
    }

    /// Append a record header for a tag whose body is `len` bytes.
    pub fn write_tag_header(&mut self, code: u16, len: usize, force_long: bool) -> ShowResult<()> {
        let len = u32::try_from(len)
            .map_err(|_| ShowError::state(format!("tag {code} body of {len} bytes is too large")))?;
        write_tag_header(&mut self.buf, code, len, force_long)
            .map_err(|e| ShowError::Other(anyhow::Error::new(e)))
    }

    /// Append a complete tag: header followed by `body`.
    pub fn write_tag(&mut self, code: u16, body: &[u8]) -> ShowResult<()> {
        self.write_tag_header(code, body.len(), false)?;
        self.write_bytes(body);
        Ok(())
    }

    /// Start bit-packed writing at the current position.
    pub fn bits(&mut self) -> BitWriter<'_> {
        BitWriter {
            out: self,
            acc: 0,
            used: 0,
        }
    }
}

impl Write for SwfOutput {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.buf.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

/// Write a record header to any byte sink.
///
/// The short form packs `code << 6 | len` into 16 bits; long bodies (or `force_long`) use the
/// `0x3f` escape followed by a 32-bit length.
pub fn write_tag_header<W: Write>(
    w: &mut W,
    code: u16,
    len: u32,
    force_long: bool,
) -> std::io::Result<()> {
    if len <= SHORT_TAG_MAX_LEN && !force_long {
        w.write_u16::<LittleEndian>((code << 6) | len as u16)
    } else {
        w.write_u16::<LittleEndian>((code << 6) | 0x3f)?;
        w.write_u32::<LittleEndian>(len)
    }
}

/// MSB-first bit packer used for RECT, MATRIX, color transform and shape records.
///
/// Dropping the writer pads the final partial byte with zeros.
pub struct BitWriter<'a> {
    out: &'a mut SwfOutput,
    acc: u8,
    used: u8,
}

impl BitWriter<'_> {
    /// Write the low `nbits` bits of `v`.
    pub fn write_ub(&mut self, nbits: u32, v: u32) {
        for i in (0..nbits).rev() {
            let bit = ((v >> i) & 1) as u8;
            self.acc = (self.acc << 1) | bit;
            self.used += 1;
            if self.used == 8 {
                self.out.write_u8(self.acc);
                self.acc = 0;
                self.used = 0;
            }
        }
    }

    /// Write a two's complement signed value in `nbits` bits.
    pub fn write_sb(&mut self, nbits: u32, v: i32) {
        let mask = if nbits >= 32 {
            u32::MAX
        } else {
            (1u32 << nbits) - 1
        };
        self.write_ub(nbits, (v as u32) & mask);
    }

    /// Write a single flag bit.
    pub fn write_flag(&mut self, flag: bool) {
        self.write_ub(1, u32::from(flag));
    }

    /// Pad to the next byte boundary.
    pub fn align(&mut self) {
        if self.used > 0 {
            let pad = 8 - self.used;
            self.out.write_u8(self.acc << pad);
            self.acc = 0;
            self.used = 0;
        }
    }
}

impl Drop for BitWriter<'_> {
    fn drop(&mut self) {
        self.align();
    }
}

/// Bits needed to store `v` as a signed field.
pub fn signed_bits(v: i32) -> u32 {
    if v >= 0 {
        33 - v.leading_zeros()
    } else {
        33 - (!v).leading_zeros()
    }
}

/// Bits needed to store `v` as an unsigned field.
pub fn unsigned_bits(v: u32) -> u32 {
    32 - v.leading_zeros()
}

#[cfg(test)]
#[path = "../../tests/unit/swf/output.rs"]
mod tests;
