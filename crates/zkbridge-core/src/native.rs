//! The real engine: `libgnarkprover`, a Go `c-shared` build.
//!
//! With the `link` feature the three cgo exports are declared and linked (see
//! `build.rs`). Without it [`NativeEngine`] cannot be constructed and
//! [`shared`] reports [`BridgeError::EngineUnavailable`], which host bindings
//! turn into their failure sentinel without attempting a call.
//!
//! [`BridgeError::EngineUnavailable`]: crate::BridgeError::EngineUnavailable

use std::ffi::c_void;

use crate::bridge::Bridge;
use crate::engine::Engine;
use crate::error::Result;
use crate::slice::{ProofRegion, SliceDescriptor};

#[cfg(feature = "link")]
#[derive(Debug)]
enum Linked {
    Yes,
}

#[cfg(not(feature = "link"))]
#[derive(Debug)]
enum Linked {}

/// Handle to the linked engine's process-wide state.
///
/// The Go runtime keeps a single instance per process, so only one handle is
/// ever created, inside [`shared`].
#[derive(Debug)]
pub struct NativeEngine {
    linked: Linked,
}

#[cfg(feature = "link")]
mod ffi {
    use super::{ProofRegion, SliceDescriptor};
    use std::ffi::c_void;

    #[allow(non_snake_case)]
    extern "C" {
        pub(super) fn InitAlgorithm(
            algorithm_id: u8,
            proving_key: SliceDescriptor<'_>,
            r1cs: SliceDescriptor<'_>,
        ) -> u8;
        pub(super) fn Prove(params: SliceDescriptor<'_>) -> ProofRegion;
        pub(super) fn Free(pointer: *mut c_void);
    }
}

// SAFETY: `Prove` returns a C.malloc'd buffer of `r1` bytes that stays valid
// until handed to `Free`.
#[cfg(feature = "link")]
unsafe impl Engine for NativeEngine {
    fn init_algorithm(
        &mut self,
        algorithm: u8,
        proving_key: SliceDescriptor<'_>,
        constraint_system: SliceDescriptor<'_>,
    ) -> u8 {
        let Linked::Yes = self.linked;
        // SAFETY: both descriptors borrow live host slices for this call; the
        // engine copies what it keeps.
        unsafe { ffi::InitAlgorithm(algorithm, proving_key, constraint_system) }
    }

    fn prove(&mut self, witness: SliceDescriptor<'_>) -> ProofRegion {
        let Linked::Yes = self.linked;
        // SAFETY: as above, the witness outlives the call.
        unsafe { ffi::Prove(witness) }
    }

    unsafe fn release(&mut self, ptr: *mut c_void) {
        let Linked::Yes = self.linked;
        // SAFETY: forwarded contract of `Engine::release`.
        unsafe { ffi::Free(ptr) }
    }
}

// SAFETY: never constructed without `link`.
#[cfg(not(feature = "link"))]
unsafe impl Engine for NativeEngine {
    fn init_algorithm(&mut self, _: u8, _: SliceDescriptor<'_>, _: SliceDescriptor<'_>) -> u8 {
        match self.linked {}
    }

    fn prove(&mut self, _: SliceDescriptor<'_>) -> ProofRegion {
        match self.linked {}
    }

    unsafe fn release(&mut self, _: *mut c_void) {
        match self.linked {}
    }
}

/// The process-wide bridge over the linked engine.
///
/// # Errors
/// [`EngineUnavailable`](crate::BridgeError::EngineUnavailable) when built
/// without the `link` feature.
pub fn shared() -> Result<&'static Bridge<NativeEngine>> {
    #[cfg(feature = "link")]
    {
        static BRIDGE: std::sync::OnceLock<Bridge<NativeEngine>> = std::sync::OnceLock::new();
        Ok(BRIDGE.get_or_init(|| {
            Bridge::new(NativeEngine {
                linked: Linked::Yes,
            })
        }))
    }

    #[cfg(not(feature = "link"))]
    {
        Err(crate::error::BridgeError::EngineUnavailable)
    }
}

/// `true` when this build can reach the native engine.
#[must_use]
pub const fn is_linked() -> bool {
    cfg!(feature = "link")
}

#[cfg(all(test, not(feature = "link")))]
mod tests {
    use super::*;
    use crate::error::BridgeError;

    #[test]
    fn unlinked_build_reports_unavailable() {
        assert!(!is_linked());
        assert!(matches!(shared(), Err(BridgeError::EngineUnavailable)));
    }
}
