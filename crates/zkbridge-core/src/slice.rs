//! C-layout value types exchanged with the proving engine.
//!
//! The engine is a Go `c-shared` library, so its parameters follow cgo's
//! layouts:
//!
//! ```c
//! typedef struct { void *data; GoInt len; GoInt cap; } GoSlice;
//! struct Prove_return { void *r0; GoInt r1; };
//! ```
//!
//! [`SliceDescriptor`] mirrors `GoSlice` and [`ProofRegion`] mirrors
//! `Prove_return`. Both are `#[repr(C)]` and passed by value.

use std::ffi::c_void;
use std::fmt;
use std::marker::PhantomData;
use std::ptr::{self, NonNull};

/// cgo's `GoInt` on the 64-bit targets the engine ships for.
pub type GoInt = i64;

/// Borrowed view of a host buffer in `GoSlice` layout.
///
/// A descriptor never owns memory. It records the address, length and
/// capacity of a slice it was built from and carries that slice's lifetime,
/// so it cannot outlive the buffer it points into.
///
/// **Invariants**
/// - `len == cap`, and `len` is the exact byte count of the source slice.
/// - `data` is never null (empty slices use a dangling, well-aligned address).
#[repr(C)]
#[derive(Clone, Copy)]
pub struct SliceDescriptor<'a> {
    data: *mut c_void,
    len: GoInt,
    cap: GoInt,
    _borrow: PhantomData<&'a [u8]>,
}

impl<'a> SliceDescriptor<'a> {
    /// Describe `bytes` without copying them.
    #[must_use]
    pub fn from_slice(bytes: &'a [u8]) -> Self {
        // Slice lengths never exceed `isize::MAX`, so this cannot wrap.
        #[allow(clippy::cast_possible_wrap)]
        let len = bytes.len() as GoInt;
        Self {
            data: bytes.as_ptr().cast_mut().cast::<c_void>(),
            len,
            cap: len,
            _borrow: PhantomData,
        }
    }

    /// Address of the first byte.
    #[must_use]
    pub const fn as_ptr(&self) -> *const u8 {
        self.data.cast_const().cast::<u8>()
    }

    /// Number of valid bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        usize::try_from(self.len).unwrap_or(0)
    }

    /// Capacity recorded in the descriptor (always equal to [`Self::len`]).
    #[must_use]
    pub fn capacity(&self) -> usize {
        usize::try_from(self.cap).unwrap_or(0)
    }

    /// `true` when the descriptor covers no bytes.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The bytes this descriptor was built from.
    #[must_use]
    pub fn as_bytes(&self) -> &'a [u8] {
        // SAFETY: descriptors are only built by `from_slice`, which stores the
        // address and length of a live `&'a [u8]`; the lifetime is carried along.
        unsafe { std::slice::from_raw_parts(self.as_ptr(), self.len()) }
    }
}

impl fmt::Debug for SliceDescriptor<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SliceDescriptor")
            .field("data", &self.data)
            .field("len", &self.len)
            .field("cap", &self.cap)
            .finish()
    }
}

/// Engine-allocated result of a proof computation (`Prove_return`).
///
/// The memory behind `ptr` belongs to the engine's allocator. The bridge reads
/// it once, copies it, and hands `ptr` back to the engine's `Free` exactly once.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProofRegion {
    /// Start of the engine allocation, or null when the engine produced nothing.
    pub ptr: *mut c_void,
    /// Byte length of the allocation; values `<= 0` mean "no result".
    pub len: GoInt,
}

impl ProofRegion {
    /// The region an engine returns when it has no result.
    #[must_use]
    pub const fn null() -> Self {
        Self {
            ptr: ptr::null_mut(),
            len: 0,
        }
    }

    /// `true` when the region holds bytes that must be copied and released.
    #[must_use]
    pub fn is_present(&self) -> bool {
        !self.ptr.is_null() && self.len > 0
    }

    /// Non-null start address, if any.
    #[must_use]
    pub fn addr(&self) -> Option<NonNull<c_void>> {
        NonNull::new(self.ptr)
    }
}

impl Default for ProofRegion {
    fn default() -> Self {
        Self::null()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::mem::{align_of, size_of};

    #[test]
    fn layouts_match_cgo() {
        assert_eq!(size_of::<SliceDescriptor<'_>>(), 3 * size_of::<u64>());
        assert_eq!(align_of::<SliceDescriptor<'_>>(), align_of::<*mut c_void>());
        assert_eq!(size_of::<ProofRegion>(), 2 * size_of::<u64>());
    }

    #[test]
    fn descriptor_points_at_source_without_copy() {
        let pk = vec![7u8; 64];
        let d = SliceDescriptor::from_slice(&pk);
        assert_eq!(d.as_ptr(), pk.as_ptr());
        assert_eq!(d.len(), 64);
        assert_eq!(d.capacity(), d.len());
        assert_eq!(d.as_bytes().as_ptr(), pk.as_ptr());
    }

    #[test]
    fn empty_descriptor_is_non_null() {
        let d = SliceDescriptor::from_slice(&[]);
        assert!(d.is_empty());
        assert!(!d.as_ptr().is_null());
        assert!(d.as_bytes().is_empty());
    }

    #[test]
    fn region_presence() {
        let byte = 0u8;
        let addr = std::ptr::addr_of!(byte).cast_mut().cast::<c_void>();
        assert!(!ProofRegion::null().is_present());
        assert!(!ProofRegion { ptr: addr, len: 0 }.is_present());
        assert!(!ProofRegion { ptr: addr, len: -3 }.is_present());
        assert!(!ProofRegion { ptr: ptr::null_mut(), len: 5 }.is_present());
        assert!(ProofRegion { ptr: addr, len: 1 }.is_present());
    }
}
