use crate::types::FastMap;
use arrayvec::ArrayVec;
use log::trace;
use xxhash_rust::xxh64::xxh64;

/// Positions kept per hash value. A full bucket stops caching new vtables
/// with that hash; they are still written, just not shared.
const BUCKET_CAPACITY: usize = 4;

/// Vtables already written by one builder, keyed by the hash of their bytes.
///
/// Positions are distances from the end of the buffer, so they stay valid
/// while the builder grows. The cache belongs to a single build pass and is
/// cleared together with the buffer.
#[derive(Debug, Default)]
pub struct VTableCache {
    buckets: FastMap<u64, ArrayVec<u32, BUCKET_CAPACITY>>,
}

impl VTableCache {
    #[inline]
    pub fn hash(vtable: &[u8]) -> u64 {
        xxh64(vtable, 0)
    }

    /// Find a written vtable whose bytes equal `vtable` exactly.
    ///
    /// `buf` is the builder's whole allocation; candidates are read from its
    /// tail.
    pub fn find(&self, hash: u64, vtable: &[u8], buf: &[u8]) -> Option<u32> {
        let bucket = self.buckets.get(&hash)?;
        bucket.iter().copied().find(|&revloc| {
            let Some(start) = buf.len().checked_sub(revloc as usize) else {
                return false;
            };
            buf.get(start..start + vtable.len()) == Some(vtable)
        })
    }

    pub fn insert(&mut self, hash: u64, revloc: u32) {
        let bucket = self.buckets.entry(hash).or_default();
        if bucket.try_push(revloc).is_err() {
            trace!("vtable bucket {hash:#018x} is full, vtable at {revloc} stays unshared");
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.buckets.values().map(|b| b.len()).sum()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    pub fn clear(&mut self) {
        self.buckets.clear();
    }
}
