use crate::types::Scalar;
use std::marker::PhantomData;

/// Zero-copy view of a scalar vector. The payload was bounds-checked when
/// the view was created, so element access cannot fail.
#[derive(Debug, Clone, Copy)]
pub struct Vector<'a, T> {
    data: &'a [u8],
    len: usize,
    _marker: PhantomData<T>,
}

impl<'a, T: Scalar> Vector<'a, T> {
    #[inline]
    pub(crate) fn new(data: &'a [u8], len: usize) -> Self {
        debug_assert_eq!(data.len(), len * T::SIZE);
        Self {
            data,
            len,
            _marker: PhantomData,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    pub fn get(&self, i: usize) -> Option<T> {
        if i >= self.len {
            return None;
        }
        Some(T::read_le(&self.data[i * T::SIZE..]))
    }

    /// Raw little-endian payload.
    #[inline]
    pub fn as_bytes(&self) -> &'a [u8] {
        self.data
    }

    pub fn iter(&self) -> VectorIter<'a, T> {
        VectorIter { vector: *self, pos: 0 }
    }

    pub fn to_vec(&self) -> Vec<T> {
        self.iter().collect()
    }
}

impl<'a, T: Scalar> IntoIterator for Vector<'a, T> {
    type Item = T;
    type IntoIter = VectorIter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

// ─── Iterator ───────────────────────────────────────────────────────────────

pub struct VectorIter<'a, T> {
    vector: Vector<'a, T>,
    pos: usize,
}

impl<'a, T: Scalar> Iterator for VectorIter<'a, T> {
    type Item = T;

    fn next(&mut self) -> Option<Self::Item> {
        let item = self.vector.get(self.pos)?;
        self.pos += 1;
        Some(item)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.vector.len - self.pos;
        (remaining, Some(remaining))
    }
}

impl<'a, T: Scalar> ExactSizeIterator for VectorIter<'a, T> {}
