use crate::{Error, Result};

/// Random-access, MSB-first view of a byte buffer as one continuous bit string.
///
/// Bit 0 is the most significant bit of the first byte. Reads never consume; every
/// read names its absolute bit offset.
///
/// # Example
/// ```
/// use aopcs::bits::BitReader;
///
/// let bits = BitReader::new(&[0b1010_0000, 0xff]);
/// assert_eq!(bits.read_uint(0, 3).unwrap(), 0b101);
/// assert_eq!(bits.read_uint(4, 8).unwrap(), 0x0f);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct BitReader<'a> {
    data: &'a [u8],
}

impl<'a> BitReader<'a> {
    /// Max number of bits a single read can return.
    pub const MAX_WIDTH: usize = 64;

    #[must_use]
    pub fn new(data: &'a [u8]) -> Self {
        BitReader { data }
    }

    /// Total number of bits in the backing buffer.
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len() * 8
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Read `width` bits starting at bit `offset` as a big-endian unsigned integer.
    ///
    /// A zero width read returns 0.
    ///
    /// # Errors
    /// [Error::OutOfRange] if `offset + width` is past the end of the buffer, or
    /// [Error::BitWidth] if `width` is more than [Self::MAX_WIDTH].
    pub fn read_uint(&self, offset: usize, width: usize) -> Result<u64> {
        if width > Self::MAX_WIDTH {
            return Err(Error::BitWidth(width));
        }
        let end = offset.checked_add(width).ok_or(Error::OutOfRange {
            offset,
            width,
            len: self.len(),
        })?;
        if end > self.len() {
            return Err(Error::OutOfRange {
                offset,
                width,
                len: self.len(),
            });
        }
        if width == 0 {
            return Ok(0);
        }

        // At most 9 bytes are spanned by 64 bits at a non-zero bit alignment, so the
        // whole span fits in a u128.
        let first = offset / 8;
        let last = (end - 1) / 8;
        let mut acc: u128 = 0;
        for b in &self.data[first..=last] {
            acc = (acc << 8) | u128::from(*b);
        }
        let trailing = (last + 1) * 8 - end;
        let mask = (1u128 << width) - 1;
        Ok(((acc >> trailing) & mask) as u64)
    }

    /// Read a single bit as a bool.
    ///
    /// # Errors
    /// [Error::OutOfRange] if `offset` is past the end of the buffer.
    pub fn read_bool(&self, offset: usize) -> Result<bool> {
        Ok(self.read_uint(offset, 1)? == 1)
    }
}
