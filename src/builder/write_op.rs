use super::builder::{FlatBuilder, VectorFrame};
use crate::error::FlatError;
use crate::types::*;

impl FlatBuilder {
    #[inline]
    fn check_standalone(&self) -> Result<(), FlatError> {
        self.ensure_mutable()?;
        if self.vector.is_some() {
            return Err(FlatError::Ordering(
                "strings and vectors must be finished before the vector that holds them",
            ));
        }
        Ok(())
    }

    #[inline]
    fn vector_bytes<T: Scalar>(&self, num_elems: usize) -> Result<usize, FlatError> {
        num_elems.checked_mul(T::SIZE).ok_or(FlatError::Capacity {
            requested: usize::MAX,
            max: self.buf.max_size(),
        })
    }

    // ════════════════════════════════════════════════════════════════════════
    // Strings & byte vectors
    // ════════════════════════════════════════════════════════════════════════

    /// Write a length-prefixed, NUL-terminated UTF-8 string.
    pub fn create_string(&mut self, text: &str) -> Result<Offset<StrMarker>, FlatError> {
        let used = self.write_prefixed(text.as_bytes(), true)?;
        Ok(Offset::new(used as u32, self.generation))
    }

    /// Write a length-prefixed byte vector.
    pub fn create_byte_vector(&mut self, bytes: &[u8]) -> Result<Offset<VectorMarker<u8>>, FlatError> {
        let used = self.write_prefixed(bytes, false)?;
        Ok(Offset::new(used as u32, self.generation))
    }

    fn write_prefixed(&mut self, bytes: &[u8], nul_terminated: bool) -> Result<usize, FlatError> {
        self.check_standalone()?;
        let payload = bytes.len() + nul_terminated as usize;
        self.align(payload, SIZE_UOFFSET)?;
        let pos = self.make_space(payload)?;
        self.buf.write_bytes_at(pos, bytes)?;
        if nul_terminated {
            self.buf.write_scalar_at(pos + bytes.len(), 0u8)?;
        }
        self.push(bytes.len() as u32)
    }

    // ════════════════════════════════════════════════════════════════════════
    // Scalar vectors
    // ════════════════════════════════════════════════════════════════════════

    /// Write a whole vector of scalars in one go.
    pub fn create_vector<T: Scalar>(&mut self, items: &[T]) -> Result<Offset<VectorMarker<T>>, FlatError> {
        self.check_standalone()?;
        let total = self.vector_bytes::<T>(items.len())?;
        self.align(total, T::SIZE.max(SIZE_UOFFSET))?;
        let pos = self.make_space(total)?;
        for (i, item) in items.iter().enumerate() {
            self.buf.write_scalar_at(pos + i * T::SIZE, *item)?;
        }
        let used = self.push(items.len() as u32)?;
        Ok(Offset::new(used as u32, self.generation))
    }

    /// Open a vector of `num_elems` scalars of type `T`.
    ///
    /// Elements are pushed last to first: the final `push_element` call
    /// becomes element 0.
    pub fn start_vector<T: Scalar>(&mut self, num_elems: usize) -> Result<(), FlatError> {
        self.ensure_mutable()?;
        if self.vector.is_some() {
            return Err(FlatError::Nesting("vectors cannot be nested"));
        }
        let total = self.vector_bytes::<T>(num_elems)?;
        self.align(total, T::SIZE.max(SIZE_UOFFSET))?;
        self.vector = Some(VectorFrame {
            elem_size: T::SIZE,
            declared: num_elems,
            pushed: 0,
        });
        Ok(())
    }

    pub fn push_element<T: Scalar>(&mut self, value: T) -> Result<(), FlatError> {
        self.ensure_mutable()?;
        let frame = self
            .vector
            .ok_or(FlatError::Nesting("push_element outside of a vector"))?;
        if frame.elem_size != T::SIZE {
            return Err(FlatError::Ordering("element size differs from start_vector"));
        }
        if frame.pushed >= frame.declared {
            return Err(FlatError::VectorLength {
                declared: frame.declared,
                pushed: frame.pushed + 1,
            });
        }
        self.push(value)?;
        if let Some(frame) = self.vector.as_mut() {
            frame.pushed += 1;
        }
        Ok(())
    }

    /// Close the open vector and write its length.
    pub fn end_vector<T: Scalar>(&mut self) -> Result<Offset<VectorMarker<T>>, FlatError> {
        self.ensure_mutable()?;
        let frame = self
            .vector
            .ok_or(FlatError::Nesting("end_vector without start_vector"))?;
        if frame.elem_size != T::SIZE {
            return Err(FlatError::Ordering("element size differs from start_vector"));
        }
        if frame.pushed != frame.declared {
            return Err(FlatError::VectorLength {
                declared: frame.declared,
                pushed: frame.pushed,
            });
        }
        self.vector = None;
        let used = self.push(frame.declared as u32)?;
        Ok(Offset::new(used as u32, self.generation))
    }
}
