use super::table::Table;
use super::vector::Vector;
use crate::buffer::{read_bytes_at, read_scalar_at};
use crate::error::FlatError;
use crate::types::*;

/// Resolve a `u32` forward offset stored at `pos`.
#[inline]
pub(crate) fn follow_uoffset(buf: &[u8], pos: usize) -> Result<usize, FlatError> {
    let rel: u32 = read_scalar_at(buf, pos)?;
    pos.checked_add(rel as usize).ok_or(FlatError::Bounds {
        pos,
        len: SIZE_UOFFSET,
        buf_len: buf.len(),
    })
}

/// Borrow the payload of a length-prefixed region (strings, vectors).
/// Returns the payload and its element count.
#[inline]
pub(crate) fn read_prefixed(buf: &[u8], pos: usize, elem_size: usize) -> Result<(&[u8], usize), FlatError> {
    let len: u32 = read_scalar_at(buf, pos)?;
    let len = len as usize;
    let byte_len = len.checked_mul(elem_size).ok_or(FlatError::Bounds {
        pos,
        len: usize::MAX,
        buf_len: buf.len(),
    })?;
    let data = read_bytes_at(buf, pos + SIZE_UOFFSET, byte_len)?;
    Ok((data, len))
}

impl<'a> Table<'a> {
    // ════════════════════════════════════════════════════════════════════════
    // Field resolution
    // ════════════════════════════════════════════════════════════════════════

    /// Byte offset of `slot` from the table start, 0 when the field is absent.
    #[inline]
    pub fn field_offset(&self, slot: u16) -> Result<u16, FlatError> {
        self.vtable()?.get(slot)
    }

    #[inline]
    pub fn has_field(&self, slot: u16) -> Result<bool, FlatError> {
        Ok(self.field_offset(slot)? != 0)
    }

    /// Absolute position of the slot's inline storage, if present.
    #[inline]
    fn field_pos(&self, slot: u16) -> Result<Option<usize>, FlatError> {
        let off = self.field_offset(slot)?;
        Ok((off != 0).then(|| self.loc + off as usize))
    }

    /// Absolute position an offset-typed slot points to, if present.
    #[inline]
    fn indirect(&self, slot: u16) -> Result<Option<usize>, FlatError> {
        match self.field_pos(slot)? {
            Some(pos) => follow_uoffset(self.buf, pos).map(Some),
            None => Ok(None),
        }
    }

    // ════════════════════════════════════════════════════════════════════════
    // Typed reads (zero-copy)
    // ════════════════════════════════════════════════════════════════════════

    /// Read a scalar, falling back to `default` when absent.
    #[inline]
    pub fn get_scalar<T: Scalar>(&self, slot: u16, default: T) -> Result<T, FlatError> {
        Ok(self.get_scalar_opt(slot)?.unwrap_or(default))
    }

    /// Read a scalar; `None` when absent.
    #[inline]
    pub fn get_scalar_opt<T: Scalar>(&self, slot: u16) -> Result<Option<T>, FlatError> {
        match self.field_pos(slot)? {
            Some(pos) => read_scalar_at(self.buf, pos).map(Some),
            None => Ok(None),
        }
    }

    /// Get a string field (zero-copy). An explicitly written empty string is
    /// `Some("")`; an absent one is `None`.
    pub fn get_str(&self, slot: u16) -> Result<Option<&'a str>, FlatError> {
        let Some(pos) = self.indirect(slot)? else {
            return Ok(None);
        };
        let (bytes, _) = read_prefixed(self.buf, pos, 1)?;
        std::str::from_utf8(bytes)
            .map(Some)
            .map_err(|_| FlatError::InvalidUtf8(pos))
    }

    /// Get a byte vector field (zero-copy).
    pub fn get_bytes(&self, slot: u16) -> Result<Option<&'a [u8]>, FlatError> {
        let Some(pos) = self.indirect(slot)? else {
            return Ok(None);
        };
        read_prefixed(self.buf, pos, 1).map(|(bytes, _)| Some(bytes))
    }

    /// Get a vector of scalars (zero-copy).
    pub fn get_vector<T: Scalar>(&self, slot: u16) -> Result<Option<Vector<'a, T>>, FlatError> {
        let Some(pos) = self.indirect(slot)? else {
            return Ok(None);
        };
        let (data, len) = read_prefixed(self.buf, pos, T::SIZE)?;
        Ok(Some(Vector::new(data, len)))
    }

    /// Raw payload of a vector field whose element size is only known at
    /// runtime.
    pub fn get_vector_raw(&self, slot: u16, elem_size: usize) -> Result<Option<(&'a [u8], usize)>, FlatError> {
        let Some(pos) = self.indirect(slot)? else {
            return Ok(None);
        };
        read_prefixed(self.buf, pos, elem_size).map(Some)
    }

    /// Get a nested table.
    pub fn get_table(&self, slot: u16) -> Result<Option<Table<'a>>, FlatError> {
        Ok(self.indirect(slot)?.map(|pos| Table::new(self.buf, pos)))
    }
}
