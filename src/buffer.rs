use crate::error::FlatError;
use crate::types::Scalar;
use log::debug;
use std::ops::Range;

// ─── Bounds ─────────────────────────────────────────────────────────────────

#[inline]
fn checked_range(pos: usize, len: usize, buf_len: usize) -> Result<Range<usize>, FlatError> {
    match pos.checked_add(len) {
        Some(end) if end <= buf_len => Ok(pos..end),
        _ => Err(FlatError::Bounds { pos, len, buf_len }),
    }
}

/// Read a little-endian scalar at an absolute position of a finished buffer.
#[inline]
pub fn read_scalar_at<T: Scalar>(buf: &[u8], pos: usize) -> Result<T, FlatError> {
    let range = checked_range(pos, T::SIZE, buf.len())?;
    Ok(T::read_le(&buf[range]))
}

/// Borrow `len` bytes at an absolute position of a finished buffer.
#[inline]
pub fn read_bytes_at(buf: &[u8], pos: usize, len: usize) -> Result<&[u8], FlatError> {
    let range = checked_range(pos, len, buf.len())?;
    Ok(&buf[range])
}

// ─── ByteBuffer ─────────────────────────────────────────────────────────────

/// Growable backing store for the builder.
///
/// Used bytes always sit at the tail of the allocation; free space is at the
/// front. Growing copies the tail into the back of a larger allocation, so any
/// absolute position taken before a grow is stale afterwards. Distances from
/// the end survive.
#[derive(Debug, Clone)]
pub struct ByteBuffer {
    bytes: Vec<u8>,
    max_size: usize,
}

impl ByteBuffer {
    /// Allocate `capacity` zeroed bytes, clamped to `max_size`.
    pub fn allocate(capacity: usize, max_size: usize) -> Self {
        Self {
            bytes: vec![0u8; capacity.min(max_size)],
            max_size,
        }
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.bytes.len()
    }

    #[inline]
    pub fn max_size(&self) -> usize {
        self.max_size
    }

    #[inline]
    pub fn as_slice(&self) -> &[u8] {
        &self.bytes
    }

    /// Make room for `extra` more bytes in front of the `used` tail bytes.
    ///
    /// Capacity doubles until it fits, but never past `max_size`.
    /// Returns `true` when the storage was reallocated.
    pub fn grow_if_needed(&mut self, used: usize, extra: usize) -> Result<bool, FlatError> {
        let old_cap = self.bytes.len();
        let needed = used.checked_add(extra).ok_or(FlatError::Capacity {
            requested: usize::MAX,
            max: self.max_size,
        })?;
        if needed <= old_cap {
            return Ok(false);
        }
        if needed > self.max_size {
            return Err(FlatError::Capacity {
                requested: needed,
                max: self.max_size,
            });
        }

        let mut new_cap = old_cap.max(1);
        while new_cap < needed {
            new_cap = new_cap.saturating_mul(2);
        }
        let new_cap = new_cap.min(self.max_size);

        let mut grown = vec![0u8; new_cap];
        grown[new_cap - used..].copy_from_slice(&self.bytes[old_cap - used..]);
        self.bytes = grown;
        debug!("byte buffer grew from {old_cap} to {new_cap} bytes ({used} used)");
        Ok(true)
    }

    #[inline]
    pub fn write_scalar_at<T: Scalar>(&mut self, pos: usize, value: T) -> Result<(), FlatError> {
        let range = checked_range(pos, T::SIZE, self.bytes.len())?;
        value.write_le(&mut self.bytes[range]);
        Ok(())
    }

    #[inline]
    pub fn write_bytes_at(&mut self, pos: usize, data: &[u8]) -> Result<(), FlatError> {
        let range = checked_range(pos, data.len(), self.bytes.len())?;
        self.bytes[range].copy_from_slice(data);
        Ok(())
    }

    #[inline]
    pub fn fill_zero_at(&mut self, pos: usize, len: usize) -> Result<(), FlatError> {
        let range = checked_range(pos, len, self.bytes.len())?;
        self.bytes[range].fill(0);
        Ok(())
    }

    #[inline]
    pub fn read_scalar_at<T: Scalar>(&self, pos: usize) -> Result<T, FlatError> {
        read_scalar_at(&self.bytes, pos)
    }

    #[inline]
    pub fn read_bytes_at(&self, pos: usize, len: usize) -> Result<&[u8], FlatError> {
        read_bytes_at(&self.bytes, pos, len)
    }

    /// Zero the whole allocation, keeping its capacity.
    pub fn clear(&mut self) {
        self.bytes.fill(0);
    }

    /// Consume the buffer and return the bytes from `start` to the end.
    pub fn into_tail(mut self, start: usize) -> Vec<u8> {
        self.bytes.drain(..start.min(self.bytes.len()));
        self.bytes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalar_roundtrip_unaligned() {
        let mut buf = ByteBuffer::allocate(32, 1024);
        buf.write_scalar_at(1, 0xDEAD_BEEFu32).unwrap();
        buf.write_scalar_at(7, -2i16).unwrap();
        buf.write_scalar_at(11, 1.5f64).unwrap();
        buf.write_scalar_at(19, true).unwrap();

        assert_eq!(buf.read_scalar_at::<u32>(1).unwrap(), 0xDEAD_BEEF);
        assert_eq!(buf.read_scalar_at::<i16>(7).unwrap(), -2);
        assert_eq!(buf.read_scalar_at::<f64>(11).unwrap(), 1.5);
        assert!(buf.read_scalar_at::<bool>(19).unwrap());
    }

    #[test]
    fn test_little_endian_layout() {
        let mut buf = ByteBuffer::allocate(4, 1024);
        buf.write_scalar_at(0, 0x0102_0304u32).unwrap();
        assert_eq!(buf.as_slice(), &[0x04, 0x03, 0x02, 0x01]);
    }

    #[test]
    fn test_out_of_bounds_write_and_read() {
        let mut buf = ByteBuffer::allocate(8, 1024);
        assert_eq!(
            buf.write_scalar_at(6, 1u32),
            Err(FlatError::Bounds { pos: 6, len: 4, buf_len: 8 })
        );
        assert!(buf.read_scalar_at::<u64>(1).is_err());
        assert!(buf.write_bytes_at(usize::MAX, &[1]).is_err());
        assert!(read_scalar_at::<u16>(&[1u8], 0).is_err());
    }

    #[test]
    fn test_grow_keeps_tail() {
        let mut buf = ByteBuffer::allocate(4, 1024);
        buf.write_bytes_at(2, &[0xAA, 0xBB]).unwrap();

        assert!(buf.grow_if_needed(2, 5).unwrap());
        assert_eq!(buf.capacity(), 8);
        assert_eq!(&buf.as_slice()[6..], &[0xAA, 0xBB]);
        assert!(buf.as_slice()[..6].iter().all(|b| *b == 0));
    }

    #[test]
    fn test_grow_not_needed() {
        let mut buf = ByteBuffer::allocate(16, 1024);
        assert!(!buf.grow_if_needed(8, 8).unwrap());
        assert_eq!(buf.capacity(), 16);
    }

    #[test]
    fn test_grow_from_zero_capacity() {
        let mut buf = ByteBuffer::allocate(0, 1024);
        assert!(buf.grow_if_needed(0, 3).unwrap());
        assert_eq!(buf.capacity(), 4);
    }

    #[test]
    fn test_grow_clamps_to_max() {
        let mut buf = ByteBuffer::allocate(8, 12);
        assert!(buf.grow_if_needed(8, 4).unwrap());
        assert_eq!(buf.capacity(), 12);
    }

    #[test]
    fn test_grow_past_max_fails() {
        let mut buf = ByteBuffer::allocate(8, 12);
        assert_eq!(
            buf.grow_if_needed(8, 5),
            Err(FlatError::Capacity { requested: 13, max: 12 })
        );
        assert_eq!(buf.capacity(), 8);
    }

    #[test]
    fn test_into_tail() {
        let mut buf = ByteBuffer::allocate(6, 1024);
        buf.write_bytes_at(4, &[1, 2]).unwrap();
        assert_eq!(buf.into_tail(4), vec![1, 2]);
    }
}
