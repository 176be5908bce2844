use super::builder::{FieldLoc, FlatBuilder, ObjectFrame};
use super::vtable_cache::VTableCache;
use crate::error::FlatError;
use crate::types::*;
use log::trace;

impl FlatBuilder {
    // ════════════════════════════════════════════════════════════════════════
    // Object lifecycle
    // ════════════════════════════════════════════════════════════════════════

    /// Open a table with room for `field_count` slots.
    ///
    /// Tables may be opened inside other tables; `end_object` always closes
    /// the innermost one.
    pub fn start_object(&mut self, field_count: u16) -> Result<(), FlatError> {
        self.ensure_mutable()?;
        if self.vector.is_some() {
            return Err(FlatError::Nesting("start_object while a vector is under construction"));
        }
        if self.frames.len() >= self.options.max_depth {
            return Err(FlatError::Nesting("object nesting exceeds max_depth"));
        }
        self.frames.push(ObjectFrame {
            start: self.used_space(),
            field_count,
            locs_start: self.field_locs.len(),
        });
        Ok(())
    }

    /// Validate that a field for `slot` may be written right now.
    fn check_field(&self, slot: u16) -> Result<(), FlatError> {
        self.ensure_mutable()?;
        if self.vector.is_some() {
            return Err(FlatError::Ordering("field added while a vector is under construction"));
        }
        let frame = self
            .frames
            .last()
            .ok_or(FlatError::Nesting("field added outside of an object"))?;
        if slot >= frame.field_count {
            return Err(FlatError::SlotOutOfRange {
                slot,
                field_count: frame.field_count,
            });
        }
        Ok(())
    }

    /// Add a scalar field. Skipped when `value == default`, unless the
    /// builder forces defaults; readers then see the default anyway.
    #[inline]
    pub fn add_field<T: Scalar>(&mut self, slot: u16, value: T, default: T) -> Result<(), FlatError> {
        self.check_field(slot)?;
        if value == default && !self.options.force_defaults {
            return Ok(());
        }
        let off = self.push(value)?;
        self.field_locs.push(FieldLoc { off, slot });
        Ok(())
    }

    /// Add a scalar field regardless of its default.
    #[inline]
    pub fn add_field_always<T: Scalar>(&mut self, slot: u16, value: T) -> Result<(), FlatError> {
        self.check_field(slot)?;
        let off = self.push(value)?;
        self.field_locs.push(FieldLoc { off, slot });
        Ok(())
    }

    /// Add a field referencing a finished string, vector or table.
    pub fn add_offset_field<T>(&mut self, slot: u16, target: Offset<T>) -> Result<(), FlatError> {
        self.check_field(slot)?;
        let off = self.push_uoffset(target)?;
        self.field_locs.push(FieldLoc { off, slot });
        Ok(())
    }

    /// Close the innermost object: write its header and vtable.
    ///
    /// The vtable covers slots up to the last present one. When an identical
    /// vtable was already written in this pass it is shared instead.
    pub fn end_object(&mut self) -> Result<Offset<TableMarker>, FlatError> {
        self.ensure_mutable()?;
        if self.vector.is_some() {
            return Err(FlatError::Nesting("end_object while a vector is under construction"));
        }
        let frame = *self.frames.last().ok_or(FlatError::IncompleteObject)?;

        // Size the object before writing anything so a failure leaves the
        // frame open and the buffer untouched.
        let pad = self.used_space().wrapping_neg() & (SIZE_SOFFSET - 1);
        let object_len = self.used_space() + pad + SIZE_SOFFSET - frame.start;
        if object_len > u16::MAX as usize {
            return Err(FlatError::Capacity {
                requested: object_len,
                max: u16::MAX as usize,
            });
        }

        // Header placeholder, patched once the vtable position is known.
        let object_revloc = self.push(0i32)?;

        let locs = &self.field_locs[frame.locs_start..];
        let num_slots = locs.iter().map(|l| l.slot as usize + 1).max().unwrap_or(0);
        let vtable_len = VTABLE_METADATA_SIZE + num_slots * SIZE_VOFFSET;

        let mut vtable = std::mem::take(&mut self.vtable_scratch);
        vtable.clear();
        vtable.resize(vtable_len, 0);
        vtable[0..2].copy_from_slice(&(vtable_len as u16).to_le_bytes());
        vtable[2..4].copy_from_slice(&(object_len as u16).to_le_bytes());
        for loc in locs {
            let field_offset = (object_revloc - loc.off) as u16;
            let idx = slot_to_voffset(loc.slot);
            vtable[idx..idx + SIZE_VOFFSET].copy_from_slice(&field_offset.to_le_bytes());
        }

        let hash = VTableCache::hash(&vtable);
        let cached = if self.options.dedup_vtables {
            self.vtables.find(hash, &vtable, self.buf.as_slice())
        } else {
            None
        };

        let vtable_revloc = match cached {
            Some(revloc) => {
                trace!("reusing vtable at {revloc} for object at {object_revloc}");
                revloc as usize
            }
            None => {
                let revloc = match self.write_vtable(&vtable) {
                    Ok(revloc) => revloc,
                    Err(err) => {
                        self.vtable_scratch = vtable;
                        return Err(err);
                    }
                };
                if self.options.dedup_vtables {
                    self.vtables.insert(hash, revloc as u32);
                }
                self.vtables_written += 1;
                revloc
            }
        };
        self.vtable_scratch = vtable;

        // table_pos - header = vtable_pos
        let header = vtable_revloc as i64 - object_revloc as i64;
        let object_pos = self.buf.capacity() - object_revloc;
        self.buf.write_scalar_at(object_pos, header as i32)?;

        self.frames.pop();
        self.field_locs.truncate(frame.locs_start);
        Ok(Offset::new(object_revloc as u32, self.generation))
    }

    fn write_vtable(&mut self, vtable: &[u8]) -> Result<usize, FlatError> {
        let pos = self.make_space(vtable.len())?;
        self.buf.write_bytes_at(pos, vtable)?;
        Ok(self.used_space())
    }

    /// Number of objects currently open.
    #[inline]
    pub fn depth(&self) -> usize {
        self.frames.len()
    }
}
