//! The narrow seam between the bridge and the native proving engine.
//!
//! The engine is opaque: three entry points, all synchronous, all reporting
//! failure through their return values. Anything that can answer those three
//! calls (the linked Go library, a test stub) can sit behind a [`crate::Bridge`].
//!
//! ## Ownership rules
//! - Inputs arrive as [`SliceDescriptor`]s borrowed from host memory. An engine
//!   must not keep the pointer after the call returns; if it needs the bytes
//!   later it copies them.
//! - [`Engine::prove`] returns memory the engine allocated. The bridge copies it
//!   and hands the address back through [`Engine::release`] exactly once.

use std::ffi::c_void;

use crate::slice::{ProofRegion, SliceDescriptor};

/// A proving engine reachable through the init/prove/free ABI.
///
/// # Safety
/// Implementors promise that every [`ProofRegion`] returned from
/// [`Engine::prove`] with a non-null `ptr` and `len > 0` is readable for `len`
/// bytes until the same `ptr` is passed to [`Engine::release`]. The bridge reads
/// result regions on that promise alone.
pub unsafe trait Engine: Send {
    /// Build the proving context for `algorithm` from a proving key and a
    /// constraint system. Returns the engine's boolean-like byte (0 = failure).
    fn init_algorithm(
        &mut self,
        algorithm: u8,
        proving_key: SliceDescriptor<'_>,
        constraint_system: SliceDescriptor<'_>,
    ) -> u8;

    /// Compute a proof for a UTF-8 witness.
    fn prove(&mut self, witness: SliceDescriptor<'_>) -> ProofRegion;

    /// Return a result allocation to the engine's allocator.
    ///
    /// # Safety
    /// `ptr` must be the `ptr` of a present [`ProofRegion`] obtained from this
    /// engine's [`Engine::prove`], and must not have been released before.
    unsafe fn release(&mut self, ptr: *mut c_void);
}

/// Sole owner of one engine result allocation.
///
/// Created only for present regions; dropping it releases the allocation, so
/// the release happens exactly once on every exit path, including unwinding
/// out of a decode.
pub(crate) struct ResultRegion<'e, E: Engine + ?Sized> {
    engine: &'e mut E,
    region: ProofRegion,
}

impl<'e, E: Engine + ?Sized> ResultRegion<'e, E> {
    /// Take ownership of `region`, or `None` if there is nothing to own.
    pub(crate) fn adopt(engine: &'e mut E, region: ProofRegion) -> Option<Self> {
        // Lazily: a guard built for an absent region would release it on drop.
        region.is_present().then(|| Self { engine, region })
    }

    /// Copy the region into a host string.
    pub(crate) fn decode(&self) -> Option<String> {
        // SAFETY: `adopt` only accepts present regions, and the `Engine` contract
        // keeps them readable until `release`, which only `drop` calls.
        unsafe { crate::marshal::decode_result(self.region.ptr.cast_const(), self.region.len) }
    }
}

impl<E: Engine + ?Sized> Drop for ResultRegion<'_, E> {
    fn drop(&mut self) {
        tracing::trace!(ptr = ?self.region.ptr, len = self.region.len, "releasing proof region");
        // SAFETY: the region came from this engine's `prove`, and `drop` runs once.
        unsafe { self.engine.release(self.region.ptr) };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stub::StubEngine;

    #[test]
    fn absent_regions_are_not_adopted_or_released() {
        let mut engine = StubEngine::new();
        let marker = 0u8;
        let regions = [
            ProofRegion::null(),
            ProofRegion {
                ptr: std::ptr::addr_of!(marker).cast_mut().cast::<c_void>(),
                len: 0,
            },
            ProofRegion {
                ptr: std::ptr::addr_of!(marker).cast_mut().cast::<c_void>(),
                len: -1,
            },
        ];
        for region in regions {
            assert!(ResultRegion::adopt(&mut engine, region).is_none());
        }
        assert!(engine.calls().released.is_empty());
        assert!(engine.calls().bogus_releases.is_empty());
    }
}
