/// Fixed-offset field access over raw account data.
///
/// Program accounts are plain `#[repr(C)]` structs behind an 8-byte
/// discriminator, so every field sits at a known offset. Each record layout
/// is declared as a table of [`Field`] constants and read through a
/// [`Reader`], which bounds-checks every access and reports the length it
/// needed instead of panicking on short buffers.
use solana_pubkey::Pubkey;

use crate::error::DecodeError;

/// Account discriminator width. Skipped by both record decoders.
pub const DISCRIMINATOR_SIZE: usize = 8;

/// A field of `width` bytes starting at `offset`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Field {
    pub offset: usize,
    pub width: usize,
}

impl Field {
    pub const fn new(offset: usize, width: usize) -> Self {
        Self { offset, width }
    }

    /// First byte past the field.
    pub const fn end(&self) -> usize {
        self.offset + self.width
    }

    /// Element `index` of an array of `elem`-wide values stored in this field.
    const fn element(&self, index: usize, elem: usize) -> Field {
        Field::new(self.offset + index * elem, elem)
    }
}

// ── Reader ──────────────────────────────────────────────────────────────────

pub struct Reader<'a> {
    data: &'a [u8],
}

impl<'a> Reader<'a> {
    /// Wrap `data`, rejecting it up front if shorter than `min_len`.
    pub fn new(data: &'a [u8], min_len: usize) -> Result<Self, DecodeError> {
        if data.len() < min_len {
            return Err(DecodeError::TooShort {
                needed: min_len,
                actual: data.len(),
            });
        }
        Ok(Self { data })
    }

    pub fn bytes(&self, field: Field) -> Result<&'a [u8], DecodeError> {
        self.data
            .get(field.offset..field.end())
            .ok_or(DecodeError::TooShort {
                needed: field.end(),
                actual: self.data.len(),
            })
    }

    pub fn array<const N: usize>(&self, field: Field) -> Result<[u8; N], DecodeError> {
        debug_assert_eq!(field.width, N);
        let mut out = [0u8; N];
        out.copy_from_slice(self.bytes(field)?);
        Ok(out)
    }

    pub fn u64(&self, field: Field) -> Result<u64, DecodeError> {
        self.array::<8>(field).map(u64::from_le_bytes)
    }

    pub fn i64(&self, field: Field) -> Result<i64, DecodeError> {
        self.array::<8>(field).map(i64::from_le_bytes)
    }

    pub fn pubkey(&self, field: Field) -> Result<Pubkey, DecodeError> {
        self.array::<32>(field).map(Pubkey::new_from_array)
    }

    /// `N` consecutive little-endian u64s.
    pub fn u64_array<const N: usize>(&self, field: Field) -> Result<[u64; N], DecodeError> {
        debug_assert_eq!(field.width, N * 8);
        let mut out = [0u64; N];
        for (i, slot) in out.iter_mut().enumerate() {
            *slot = self.u64(field.element(i, 8))?;
        }
        Ok(out)
    }
}

// ── Writer ──────────────────────────────────────────────────────────────────

/// Inverse of [`Reader`], used to build account images from typed records.
/// Writes past the end of the buffer, or with fewer bytes than the field
/// is wide, are dropped.
pub struct Writer {
    data: Vec<u8>,
}

impl Writer {
    pub fn zeroed(len: usize) -> Self {
        Self { data: vec![0u8; len] }
    }

    pub fn put(&mut self, field: Field, bytes: &[u8]) -> &mut Self {
        if let (Some(dst), Some(src)) = (
            self.data.get_mut(field.offset..field.end()),
            bytes.get(..field.width),
        ) {
            dst.copy_from_slice(src);
        }
        self
    }

    pub fn put_u64(&mut self, field: Field, value: u64) -> &mut Self {
        self.put(field, &value.to_le_bytes())
    }

    pub fn put_i64(&mut self, field: Field, value: i64) -> &mut Self {
        self.put(field, &value.to_le_bytes())
    }

    pub fn put_pubkey(&mut self, field: Field, key: &Pubkey) -> &mut Self {
        self.put(field, key.as_ref())
    }

    pub fn put_u64_array(&mut self, field: Field, values: &[u64]) -> &mut Self {
        for (i, v) in values.iter().enumerate() {
            self.put_u64(field.element(i, 8), *v);
        }
        self
    }

    pub fn finish(self) -> Vec<u8> {
        self.data
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const A: Field = Field::new(8, 8);
    const B: Field = Field::new(16, 32);

    #[test]
    fn reader_rejects_short_buffer() {
        let data = vec![0u8; 10];
        let err = Reader::new(&data, 48).err();
        assert_eq!(err, Some(DecodeError::TooShort { needed: 48, actual: 10 }));
    }

    #[test]
    fn field_past_end_is_an_error_not_a_panic() {
        let data = vec![0u8; 20];
        let reader = Reader::new(&data, 0).unwrap();
        assert_eq!(
            reader.pubkey(B),
            Err(DecodeError::TooShort { needed: 48, actual: 20 })
        );
    }

    #[test]
    fn little_endian_reads() {
        let mut data = vec![0u8; 48];
        data[8] = 0x01;
        data[9] = 0x02;
        let reader = Reader::new(&data, 48).unwrap();
        assert_eq!(reader.u64(A).unwrap(), 0x0201);
    }

    #[test]
    fn writer_output_reads_back() {
        let key = Pubkey::new_from_array([7u8; 32]);
        let mut w = Writer::zeroed(48);
        w.put_u64(A, 42).put_pubkey(B, &key);
        let data = w.finish();

        let reader = Reader::new(&data, 48).unwrap();
        assert_eq!(reader.u64(A).unwrap(), 42);
        assert_eq!(reader.pubkey(B).unwrap(), key);
    }

    #[test]
    fn short_source_or_out_of_range_write_is_dropped() {
        let mut w = Writer::zeroed(24);
        w.put(A, &[0xff; 4]).put(B, &[0xff; 32]);
        assert_eq!(w.finish(), vec![0u8; 24]);
    }

    #[test]
    fn u64_array_reads_each_element() {
        let arr = Field::new(0, 24);
        let mut w = Writer::zeroed(24);
        w.put_u64_array(arr, &[1, 2, 3]);
        let data = w.finish();

        let reader = Reader::new(&data, 24).unwrap();
        assert_eq!(reader.u64_array::<3>(arr).unwrap(), [1, 2, 3]);
    }
}
