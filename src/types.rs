use rustc_hash::FxHasher;
use std::hash::BuildHasherDefault;
use std::marker::PhantomData;

// ─── Binary Layout ──────────────────────────────────────────────────────────
//
//  Buffers are written back-to-front: children first, the root offset last.
//
//  ┌──────────────────────────────────────────────┐
//  │ [size prefix: u32 (LE)]           optional   │
//  │ root offset: u32 (LE)  → root table          │
//  │ [file identifier: [u8; 4]]        optional   │
//  ├──────────────────────────────────────────────┤
//  │ Vtable                                       │
//  │   vtable_len:   u16 (LE)                     │
//  │   object_len:   u16 (LE)                     │
//  │   field_offset: u16 (LE) × slots  (0=absent) │
//  ├──────────────────────────────────────────────┤
//  │ Table                                        │
//  │   header: i32 (LE)  table_pos - header = vt  │
//  │   inline fields, scalars or u32 offsets      │
//  ├──────────────────────────────────────────────┤
//  │ Strings / vectors                            │
//  │   len: u32 (LE), payload, [NUL for strings]  │
//  └──────────────────────────────────────────────┘
//
//  Offset fields are resolved as `field_pos + stored_u32`.

pub const SIZE_UOFFSET: usize = 4;
pub const SIZE_SOFFSET: usize = 4;
pub const SIZE_VOFFSET: usize = 2;
pub const SIZE_SIZE_PREFIX: usize = 4;
pub const FILE_IDENTIFIER_LENGTH: usize = 4;

/// Byte length of the vtable prefix (`vtable_len` + `object_len`).
pub const VTABLE_METADATA_SIZE: usize = 2 * SIZE_VOFFSET;

/// Largest buffer the format can address with signed 32-bit offsets.
pub const MAX_BUFFER_SIZE: usize = (1usize << 31) - 1;

/// Byte position of a slot's entry inside its vtable.
#[inline]
pub const fn slot_to_voffset(slot: u16) -> usize {
    VTABLE_METADATA_SIZE + slot as usize * SIZE_VOFFSET
}

// ─── Scalar ─────────────────────────────────────────────────────────────────

/// Fixed-size little-endian value that can be stored inline in a table,
/// a vector or the buffer header.
///
/// Reads and writes go through byte arrays, so any byte position works
/// regardless of alignment.
pub trait Scalar: Copy + PartialEq + std::fmt::Debug {
    const SIZE: usize;

    /// Write `self` into `dst[..Self::SIZE]`.
    fn write_le(self, dst: &mut [u8]);

    /// Read a value from `src[..Self::SIZE]`.
    fn read_le(src: &[u8]) -> Self;
}

macro_rules! impl_scalar {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Scalar for $ty {
                const SIZE: usize = std::mem::size_of::<$ty>();

                #[inline]
                fn write_le(self, dst: &mut [u8]) {
                    dst[..Self::SIZE].copy_from_slice(&self.to_le_bytes());
                }

                #[inline]
                fn read_le(src: &[u8]) -> Self {
                    let mut bytes = [0u8; std::mem::size_of::<$ty>()];
                    bytes.copy_from_slice(&src[..Self::SIZE]);
                    <$ty>::from_le_bytes(bytes)
                }
            }
        )*
    };
}

impl_scalar!(u8, i8, u16, i16, u32, i32, u64, i64, f32, f64);

impl Scalar for bool {
    const SIZE: usize = 1;

    #[inline]
    fn write_le(self, dst: &mut [u8]) {
        dst[0] = self as u8;
    }

    #[inline]
    fn read_le(src: &[u8]) -> Self {
        src[0] != 0
    }
}

// ─── Offsets ────────────────────────────────────────────────────────────────

/// Marker for offsets to tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableMarker;

/// Marker for offsets to length-prefixed UTF-8 strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StrMarker;

/// Marker for offsets to vectors of `T`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VectorMarker<T>(PhantomData<T>);

/// A finished child inside a buffer that is still being built.
///
/// `value` is the distance from the end of the buffer, which stays stable
/// while the builder grows toward lower addresses. `generation` ties the
/// offset to one build pass of one builder.
#[derive(Debug)]
pub struct Offset<T> {
    value: u32,
    generation: u32,
    _marker: PhantomData<T>,
}

impl<T> Clone for Offset<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Offset<T> {}

impl<T> PartialEq for Offset<T> {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value && self.generation == other.generation
    }
}

impl<T> Eq for Offset<T> {}

impl<T> Offset<T> {
    #[inline]
    pub(crate) fn new(value: u32, generation: u32) -> Self {
        Self {
            value,
            generation,
            _marker: PhantomData,
        }
    }

    #[inline]
    pub fn value(&self) -> u32 {
        self.value
    }

    #[inline]
    pub fn generation(&self) -> u32 {
        self.generation
    }

    /// Drop the type tag; used by the schema layer which tracks kinds itself.
    #[inline]
    pub fn as_untyped(&self) -> Offset<()> {
        Offset::new(self.value, self.generation)
    }
}

// ─── Maps ───────────────────────────────────────────────────────────────────

pub type FastMap<K, V> = std::collections::HashMap<K, V, BuildHasherDefault<FxHasher>>;
