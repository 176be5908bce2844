use crate::buffer::{read_bytes_at, read_scalar_at};
use crate::error::FlatError;
use crate::types::*;

// ─── Reader (zero-copy) ────────────────────────────────────────────────────

/// Zero-copy view of one table inside a finished buffer.
/// Nothing is parsed until a field is requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Table<'a> {
    pub(crate) buf: &'a [u8],
    pub(crate) loc: usize,
}

impl<'a> Table<'a> {
    #[inline]
    pub fn new(buf: &'a [u8], loc: usize) -> Self {
        Self { buf, loc }
    }

    #[inline]
    pub fn buf(&self) -> &'a [u8] {
        self.buf
    }

    #[inline]
    pub fn loc(&self) -> usize {
        self.loc
    }

    /// Follow the header to this table's vtable.
    pub fn vtable(&self) -> Result<VTable<'a>, FlatError> {
        let header: i32 = read_scalar_at(self.buf, self.loc)?;
        let loc = self.loc as i64 - header as i64;
        if loc < 0 {
            return Err(FlatError::Bounds {
                pos: self.loc,
                len: SIZE_SOFFSET,
                buf_len: self.buf.len(),
            });
        }
        Ok(VTable {
            buf: self.buf,
            loc: loc as usize,
        })
    }
}

// ─── VTable ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VTable<'a> {
    buf: &'a [u8],
    loc: usize,
}

impl<'a> VTable<'a> {
    #[inline]
    pub fn loc(&self) -> usize {
        self.loc
    }

    /// Byte length of the vtable including its 4-byte prefix.
    #[inline]
    pub fn num_bytes(&self) -> Result<u16, FlatError> {
        read_scalar_at(self.buf, self.loc)
    }

    /// Inline byte length of the table the vtable describes.
    #[inline]
    pub fn object_num_bytes(&self) -> Result<u16, FlatError> {
        read_scalar_at(self.buf, self.loc + SIZE_VOFFSET)
    }

    /// Slots recorded in this vtable; higher slots are absent.
    #[inline]
    pub fn num_slots(&self) -> Result<usize, FlatError> {
        let len = self.num_bytes()? as usize;
        Ok(len.saturating_sub(VTABLE_METADATA_SIZE) / SIZE_VOFFSET)
    }

    /// Byte offset of `slot` from the table start, 0 when absent.
    ///
    /// Slots beyond the vtable's length were added to the schema after the
    /// buffer was written and read as absent.
    #[inline]
    pub fn get(&self, slot: u16) -> Result<u16, FlatError> {
        let voffset = slot_to_voffset(slot);
        if voffset >= self.num_bytes()? as usize {
            return Ok(0);
        }
        read_scalar_at(self.buf, self.loc + voffset)
    }

    /// Raw vtable bytes.
    pub fn as_bytes(&self) -> Result<&'a [u8], FlatError> {
        let len = self.num_bytes()? as usize;
        read_bytes_at(self.buf, self.loc, len)
    }
}

// ─── Root access ────────────────────────────────────────────────────────────

/// The root table of a finished buffer.
pub fn root_table(buf: &[u8]) -> Result<Table<'_>, FlatError> {
    let offset: u32 = read_scalar_at(buf, 0)?;
    Ok(Table::new(buf, offset as usize))
}

/// The root table of a buffer written with `finish_size_prefixed`.
///
/// The view covers exactly the prefixed length; trailing bytes are ignored.
pub fn size_prefixed_root_table(buf: &[u8]) -> Result<Table<'_>, FlatError> {
    let size: u32 = read_scalar_at(buf, 0)?;
    let body = read_bytes_at(buf, SIZE_SIZE_PREFIX, size as usize)?;
    root_table(body)
}

/// Whether the buffer carries `ident` right after its root offset.
pub fn buffer_has_identifier(buf: &[u8], ident: &[u8; FILE_IDENTIFIER_LENGTH], size_prefixed: bool) -> bool {
    let start = if size_prefixed { SIZE_SIZE_PREFIX } else { 0 } + SIZE_UOFFSET;
    buf.get(start..start + FILE_IDENTIFIER_LENGTH) == Some(&ident[..])
}
