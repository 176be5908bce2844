use super::vtable_cache::VTableCache;
use crate::buffer::ByteBuffer;
use crate::config::BuilderOptions;
use crate::error::FlatError;
use crate::types::*;
use log::debug;

// ─── Build state ────────────────────────────────────────────────────────────

/// One open object. Objects may nest; frames close in LIFO order.
#[derive(Debug, Clone, Copy)]
pub(crate) struct ObjectFrame {
    /// Used space when the object was started.
    pub(crate) start: usize,
    pub(crate) field_count: u16,
    /// First entry of this object in `field_locs`.
    pub(crate) locs_start: usize,
}

/// A field written for the innermost open object.
#[derive(Debug, Clone, Copy)]
pub(crate) struct FieldLoc {
    /// Used space right after the field was written.
    pub(crate) off: usize,
    pub(crate) slot: u16,
}

/// The vector currently under construction.
#[derive(Debug, Clone, Copy)]
pub(crate) struct VectorFrame {
    pub(crate) elem_size: usize,
    pub(crate) declared: usize,
    pub(crate) pushed: usize,
}

// ─── FlatBuilder ────────────────────────────────────────────────────────────

/// Builds one buffer back-to-front.
///
/// Strings, vectors and child tables are written first; the tables that
/// reference them afterwards; the root offset last. `finish` seals the
/// buffer, `reset` makes the builder reusable for the next message.
#[derive(Debug)]
pub struct FlatBuilder {
    pub(crate) buf: ByteBuffer,
    /// Start of the used region; everything before it is free.
    pub(crate) head: usize,
    pub(crate) min_align: usize,
    pub(crate) frames: Vec<ObjectFrame>,
    pub(crate) field_locs: Vec<FieldLoc>,
    pub(crate) vector: Option<VectorFrame>,
    pub(crate) vtables: VTableCache,
    pub(crate) vtable_scratch: Vec<u8>,
    pub(crate) vtables_written: usize,
    pub(crate) finished: bool,
    pub(crate) generation: u32,
    pub(crate) options: BuilderOptions,
}

impl Default for FlatBuilder {
    fn default() -> Self {
        Self::with_options(BuilderOptions::default())
    }
}

impl FlatBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(initial_capacity: usize) -> Self {
        Self::with_options(BuilderOptions {
            initial_capacity,
            ..Default::default()
        })
    }

    pub fn with_options(options: BuilderOptions) -> Self {
        let buf = ByteBuffer::allocate(options.initial_capacity, options.buffer_limit());
        let head = buf.capacity();
        Self {
            buf,
            head,
            min_align: 1,
            frames: Vec::new(),
            field_locs: Vec::new(),
            vector: None,
            vtables: VTableCache::default(),
            vtable_scratch: Vec::new(),
            vtables_written: 0,
            finished: false,
            generation: 0,
            options,
        }
    }

    #[inline]
    pub fn options(&self) -> &BuilderOptions {
        &self.options
    }

    /// Bytes written so far.
    #[inline]
    pub fn used_space(&self) -> usize {
        self.buf.capacity() - self.head
    }

    #[inline]
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Build pass counter; offsets from earlier passes are rejected.
    #[inline]
    pub fn generation(&self) -> u32 {
        self.generation
    }

    /// Number of vtables physically written in this pass.
    #[inline]
    pub fn num_vtables(&self) -> usize {
        self.vtables_written
    }

    /// Clear everything and start a new message, keeping the allocation.
    pub fn reset(&mut self) {
        self.buf.clear();
        self.head = self.buf.capacity();
        self.min_align = 1;
        self.frames.clear();
        self.field_locs.clear();
        self.vector = None;
        self.vtables.clear();
        self.vtables_written = 0;
        self.finished = false;
        self.generation = self.generation.wrapping_add(1);
    }

    // ════════════════════════════════════════════════════════════════════════
    // Internal: space & alignment
    // ════════════════════════════════════════════════════════════════════════

    #[inline]
    pub(crate) fn ensure_mutable(&self) -> Result<(), FlatError> {
        if self.finished {
            return Err(FlatError::Finalized);
        }
        Ok(())
    }

    /// Reserve `n` bytes in front of the used region, growing if needed.
    /// Returns the absolute position of the reserved bytes.
    pub(crate) fn make_space(&mut self, n: usize) -> Result<usize, FlatError> {
        let used = self.used_space();
        if self.buf.grow_if_needed(used, n)? {
            self.head = self.buf.capacity() - used;
        }
        self.head -= n;
        Ok(self.head)
    }

    /// Pad so that after writing `len` more bytes the used space is a
    /// multiple of `alignment` (a power of two).
    pub(crate) fn align(&mut self, len: usize, alignment: usize) -> Result<(), FlatError> {
        self.min_align = self.min_align.max(alignment);
        let end = self.used_space().checked_add(len).ok_or(FlatError::Capacity {
            requested: usize::MAX,
            max: self.buf.max_size(),
        })?;
        let pad = end.wrapping_neg() & (alignment - 1);
        if pad > 0 {
            let pos = self.make_space(pad)?;
            self.buf.fill_zero_at(pos, pad)?;
        }
        Ok(())
    }

    /// Write a scalar, aligned to its own size. Returns the used space
    /// after the write, which identifies the value's position.
    pub(crate) fn push<T: Scalar>(&mut self, value: T) -> Result<usize, FlatError> {
        self.align(T::SIZE, T::SIZE)?;
        let pos = self.make_space(T::SIZE)?;
        self.buf.write_scalar_at(pos, value)?;
        Ok(self.used_space())
    }

    /// Write a u32 offset pointing forward to an already written child.
    pub(crate) fn push_uoffset<T>(&mut self, target: Offset<T>) -> Result<usize, FlatError> {
        if target.generation() != self.generation {
            return Err(FlatError::Ordering("offset belongs to another build pass"));
        }
        self.align(SIZE_UOFFSET, SIZE_UOFFSET)?;
        let used = self.used_space();
        let target = target.value() as usize;
        if target > used {
            return Err(FlatError::Ordering("offset points to data that is not written yet"));
        }
        let relative = (used + SIZE_UOFFSET - target) as u32;
        self.push(relative)
    }

    // ════════════════════════════════════════════════════════════════════════
    // Finish
    // ════════════════════════════════════════════════════════════════════════

    /// Seal the buffer with `root` as its root table.
    pub fn finish(&mut self, root: Offset<TableMarker>) -> Result<(), FlatError> {
        self.finish_with(root, None, false)
    }

    /// Seal the buffer with a 4-byte file identifier after the root offset.
    pub fn finish_with_identifier(
        &mut self,
        root: Offset<TableMarker>,
        file_identifier: &[u8; FILE_IDENTIFIER_LENGTH],
    ) -> Result<(), FlatError> {
        self.finish_with(root, Some(file_identifier), false)
    }

    /// Seal the buffer with a u32 length in front of it.
    pub fn finish_size_prefixed(&mut self, root: Offset<TableMarker>) -> Result<(), FlatError> {
        self.finish_with(root, None, true)
    }

    pub fn finish_with(
        &mut self,
        root: Offset<TableMarker>,
        file_identifier: Option<&[u8; FILE_IDENTIFIER_LENGTH]>,
        size_prefixed: bool,
    ) -> Result<(), FlatError> {
        self.ensure_mutable()?;
        if !self.frames.is_empty() || self.vector.is_some() {
            return Err(FlatError::Nesting("finish called with an unfinished object or vector"));
        }

        let mut trailer = SIZE_UOFFSET;
        if file_identifier.is_some() {
            trailer += FILE_IDENTIFIER_LENGTH;
        }
        if size_prefixed {
            trailer += SIZE_SIZE_PREFIX;
        }
        let min_align = self.min_align.max(SIZE_UOFFSET);
        self.align(trailer, min_align)?;

        if let Some(ident) = file_identifier {
            let pos = self.make_space(FILE_IDENTIFIER_LENGTH)?;
            self.buf.write_bytes_at(pos, ident)?;
        }
        self.push_uoffset(root)?;
        if size_prefixed {
            let size = self.used_space() as u32;
            self.push(size)?;
        }

        self.finished = true;
        debug!(
            "finished buffer: {} bytes, {} vtables, align {}",
            self.used_space(),
            self.vtables_written,
            self.min_align
        );
        Ok(())
    }

    /// The sealed buffer.
    pub fn finished_data(&self) -> Result<&[u8], FlatError> {
        if !self.finished {
            return Err(FlatError::NotFinished);
        }
        Ok(&self.buf.as_slice()[self.head..])
    }

    /// Consume the builder and return the sealed buffer.
    pub fn into_bytes(self) -> Result<Vec<u8>, FlatError> {
        if !self.finished {
            return Err(FlatError::NotFinished);
        }
        Ok(self.buf.into_tail(self.head))
    }
}
