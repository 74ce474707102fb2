//! Fixed-width readers and writers over byte buffers
//!
//! All values are little-endian. Reads fail with [`MeshError::UnexpectedEof`]
//! and leave the cursor where it was; writes only ever append.

use byteorder::{ByteOrder, LittleEndian};

use crate::error::MeshError;

/// Forward-only cursor over an immutable byte buffer
#[derive(Debug, Clone)]
pub struct MeshReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> MeshReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    /// Create a reader starting at `offset`
    pub fn at(data: &'a [u8], offset: usize) -> Result<Self, MeshError> {
        if offset > data.len() {
            return Err(MeshError::UnexpectedEof {
                offset: data.len(),
                needed: offset - data.len(),
                remaining: 0,
            });
        }
        Ok(Self { data, pos: offset })
    }

    /// Current byte offset into the buffer
    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    /// Take the next `len` bytes and advance past them
    pub fn read_bytes(&mut self, len: usize) -> Result<&'a [u8], MeshError> {
        if len > self.remaining() {
            return Err(MeshError::UnexpectedEof {
                offset: self.pos,
                needed: len,
                remaining: self.remaining(),
            });
        }
        let bytes = &self.data[self.pos..self.pos + len];
        self.pos += len;
        Ok(bytes)
    }

    pub fn skip(&mut self, len: usize) -> Result<(), MeshError> {
        self.read_bytes(len).map(|_| ())
    }

    pub fn read_u8(&mut self) -> Result<u8, MeshError> {
        Ok(self.read_bytes(1)?[0])
    }

    /// Read a one-byte boolean (0 or 1)
    pub fn read_bool(&mut self) -> Result<bool, MeshError> {
        let offset = self.pos;
        match self.read_u8()? {
            0 => Ok(false),
            1 => Ok(true),
            value => {
                self.pos = offset;
                Err(MeshError::InvalidBool { offset, value })
            }
        }
    }

    pub fn read_i16(&mut self) -> Result<i16, MeshError> {
        Ok(LittleEndian::read_i16(self.read_bytes(2)?))
    }

    pub fn read_u32(&mut self) -> Result<u32, MeshError> {
        Ok(LittleEndian::read_u32(self.read_bytes(4)?))
    }

    pub fn read_f32(&mut self) -> Result<f32, MeshError> {
        Ok(LittleEndian::read_f32(self.read_bytes(4)?))
    }

    pub fn read_vec2f(&mut self) -> Result<[f32; 2], MeshError> {
        self.read_floats()
    }

    pub fn read_vec3f(&mut self) -> Result<[f32; 3], MeshError> {
        self.read_floats()
    }

    pub fn read_vec4f(&mut self) -> Result<[f32; 4], MeshError> {
        self.read_floats()
    }

    /// Read a 3x3 matrix stored as 9 row-major floats
    pub fn read_mat3f(&mut self) -> Result<[f32; 9], MeshError> {
        self.read_floats()
    }

    fn read_floats<const N: usize>(&mut self) -> Result<[f32; N], MeshError> {
        let bytes = self.read_bytes(N * 4)?;
        let mut out = [0.0f32; N];
        LittleEndian::read_f32_into(bytes, &mut out);
        Ok(out)
    }

    /// Read exactly `len` bytes as a UTF-8 string
    pub fn read_fixed_string(&mut self, len: usize) -> Result<String, MeshError> {
        let offset = self.pos;
        let bytes = self.read_bytes(len)?;
        match std::str::from_utf8(bytes) {
            Ok(s) => Ok(s.to_string()),
            Err(_) => {
                self.pos = offset;
                Err(MeshError::InvalidString { offset })
            }
        }
    }

    /// Read a u32 length followed by that many UTF-8 bytes
    pub fn read_prefixed_string(&mut self) -> Result<String, MeshError> {
        let offset = self.pos;
        let len = self.read_u32()? as usize;
        self.read_fixed_string(len).inspect_err(|_| self.pos = offset)
    }
}

/// Append-only little-endian writer
#[derive(Debug, Default, Clone)]
pub struct MeshWriter {
    buf: Vec<u8>,
}

impl MeshWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: Vec::with_capacity(capacity),
        }
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn into_inner(self) -> Vec<u8> {
        self.buf
    }

    pub fn write_bytes(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    pub fn write_zeros(&mut self, len: usize) {
        self.buf.resize(self.buf.len() + len, 0);
    }

    pub fn write_u8(&mut self, value: u8) {
        self.buf.push(value);
    }

    pub fn write_bool(&mut self, value: bool) {
        self.buf.push(u8::from(value));
    }

    pub fn write_i16(&mut self, value: i16) {
        let mut bytes = [0u8; 2];
        LittleEndian::write_i16(&mut bytes, value);
        self.write_bytes(&bytes);
    }

    pub fn write_u32(&mut self, value: u32) {
        let mut bytes = [0u8; 4];
        LittleEndian::write_u32(&mut bytes, value);
        self.write_bytes(&bytes);
    }

    pub fn write_f32(&mut self, value: f32) {
        let mut bytes = [0u8; 4];
        LittleEndian::write_f32(&mut bytes, value);
        self.write_bytes(&bytes);
    }

    pub fn write_vec2f(&mut self, value: &[f32; 2]) {
        self.write_floats(value);
    }

    pub fn write_vec3f(&mut self, value: &[f32; 3]) {
        self.write_floats(value);
    }

    pub fn write_vec4f(&mut self, value: &[f32; 4]) {
        self.write_floats(value);
    }

    pub fn write_mat3f(&mut self, value: &[f32; 9]) {
        self.write_floats(value);
    }

    fn write_floats(&mut self, values: &[f32]) {
        let start = self.buf.len();
        self.write_zeros(values.len() * 4);
        LittleEndian::write_f32_into(values, &mut self.buf[start..]);
    }

    /// Write the string's bytes with no length prefix
    pub fn write_fixed_string(&mut self, value: &str) {
        self.write_bytes(value.as_bytes());
    }

    /// Write a u32 byte length followed by the string's bytes
    pub fn write_prefixed_string(&mut self, value: &str) {
        self.write_u32(value.len() as u32);
        self.write_fixed_string(value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalars_little_endian() {
        let data = [0x01, 0x02, 0x03, 0x04, 0xFE, 0xFF, 0x01];
        let mut r = MeshReader::new(&data);
        assert_eq!(r.read_u32().unwrap(), 0x0403_0201);
        assert_eq!(r.read_i16().unwrap(), -2);
        assert!(r.read_bool().unwrap());
        assert!(r.is_empty());
    }

    #[test]
    fn test_short_read_does_not_advance() {
        let data = [0u8; 3];
        let mut r = MeshReader::new(&data);
        let err = r.read_u32().unwrap_err();
        assert!(matches!(
            err,
            MeshError::UnexpectedEof {
                offset: 0,
                needed: 4,
                remaining: 3
            }
        ));
        assert_eq!(r.position(), 0);
    }

    #[test]
    fn test_invalid_bool_rejected() {
        let data = [2u8];
        let mut r = MeshReader::new(&data);
        assert!(matches!(
            r.read_bool(),
            Err(MeshError::InvalidBool {
                offset: 0,
                value: 2
            })
        ));
        assert_eq!(r.position(), 0);
    }

    #[test]
    fn test_prefixed_string_past_end() {
        let mut w = MeshWriter::new();
        w.write_u32(10);
        w.write_fixed_string("short");
        let data = w.into_inner();

        let mut r = MeshReader::new(&data);
        assert!(matches!(
            r.read_prefixed_string(),
            Err(MeshError::UnexpectedEof { needed: 10, .. })
        ));
        assert_eq!(r.position(), 0);
    }

    #[test]
    fn test_invalid_utf8() {
        let data = [2, 0, 0, 0, 0xC3, 0x28];
        let mut r = MeshReader::new(&data);
        assert!(matches!(
            r.read_prefixed_string(),
            Err(MeshError::InvalidString { offset: 4 })
        ));
    }

    #[test]
    fn test_writer_mirrors_reader() {
        let mut w = MeshWriter::new();
        w.write_vec3f(&[1.0, -2.5, 3.25]);
        w.write_mat3f(&[1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0]);
        w.write_prefixed_string("hangar.0");
        w.write_zeros(4);
        assert_eq!(w.len(), 12 + 36 + 4 + 8 + 4);

        let data = w.into_inner();
        let mut r = MeshReader::new(&data);
        assert_eq!(r.read_vec3f().unwrap(), [1.0, -2.5, 3.25]);
        assert_eq!(r.read_mat3f().unwrap()[4], 1.0);
        assert_eq!(r.read_prefixed_string().unwrap(), "hangar.0");
        r.skip(4).unwrap();
        assert!(r.is_empty());
    }

    #[test]
    fn test_reader_at_offset() {
        let data = [0u8, 0, 7, 0, 0, 0];
        let mut r = MeshReader::at(&data, 2).unwrap();
        assert_eq!(r.read_u32().unwrap(), 7);
        assert!(MeshReader::at(&data, 7).is_err());
    }
}
