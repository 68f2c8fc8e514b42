//! `zkbridge-ffi`: C ABI surface for hosts that link Rust directly (iOS/Swift).
//!
//! By default this crate builds a plain Rust library. Enable `cabi` to export
//! the `zkbridge_*` symbols, and `link` to reach the real engine; without
//! `link` every exported call returns its failure sentinel.
//!
//! ## What's exported with `--features cabi`
//! - `zkbridge_abi_version() -> uint32_t`
//! - `zkbridge_version() -> const char*` (static, do not free)
//! - `zkbridge_init_algorithm(id, pk, pk_len, r1cs, r1cs_len) -> int32_t`
//!   (0 = failure, the engine's nonzero byte otherwise)
//! - `zkbridge_prove(witness) -> char*` (NULL = no result)
//! - `zkbridge_string_free(char*)` for strings returned by `zkbridge_prove`
//!
//! ### Minimal C usage
//! ```c
//! #include "zkbridge.h"
//!
//! if (zkbridge_init_algorithm(1, pk, pk_len, r1cs, r1cs_len) == 0) { /* not ready */ }
//! char *proof = zkbridge_prove("{\"cipher\":\"aes-128-ctr\"}");
//! if (proof) {
//!   puts(proof);
//!   zkbridge_string_free(proof);
//! }
//! ```
//!
//! ### Ownership
//! Input buffers stay owned by the caller and are only read during the call.
//! Returned strings are fresh allocations owned by this library; they never
//! point into engine memory, and must go back through `zkbridge_string_free`.

#![deny(rust_2018_idioms)]
#![warn(
    missing_docs,
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::doc_markdown
)]

/// Stable ABI contract version (bump on breaking C ABI changes).
pub const ZKBRIDGE_FFI_ABI_VERSION: u32 = 1;

pub mod host {
    //! Engine-generic bodies of the exported functions.
    //!
    //! The `extern "C"` wrappers bind these to the process-wide native bridge;
    //! tests bind them to a stub.

    use std::ffi::{c_char, CStr, CString};
    use std::panic::{self, AssertUnwindSafe};

    use tracing::warn;
    use zkbridge_core::{AlgorithmId, Bridge, BridgeError, Engine, Result};

    /// Run `f`, turning a panic into `fallback`; unwinding into C is undefined.
    pub fn guard<T>(fallback: T, f: impl FnOnce() -> T) -> T {
        panic::catch_unwind(AssertUnwindSafe(f)).unwrap_or_else(|_| {
            warn!("panic caught at the C boundary");
            fallback
        })
    }

    /// Borrow a caller buffer for the duration of one call.
    ///
    /// # Safety
    /// If non-null, `ptr` must be valid for reads of `len` bytes and not be
    /// mutated for the lifetime `'a`.
    unsafe fn borrow_bytes<'a>(ptr: *const u8, len: usize, what: &'static str) -> Result<&'a [u8]> {
        if ptr.is_null() {
            return Err(BridgeError::Marshal(what));
        }
        // SAFETY: non-null, readable for `len` bytes per the caller's contract.
        Ok(unsafe { std::slice::from_raw_parts(ptr, len) })
    }

    /// Body of `zkbridge_init_algorithm`.
    ///
    /// Returns the engine's byte widened to `i32`, or 0 without calling the
    /// engine when a buffer is null or the id does not fit in a byte.
    ///
    /// # Safety
    /// Non-null buffers must be readable for their stated lengths for the
    /// duration of the call.
    pub unsafe fn init_algorithm<E: Engine>(
        bridge: &Bridge<E>,
        algorithm_id: u32,
        proving_key: *const u8,
        proving_key_len: usize,
        r1cs: *const u8,
        r1cs_len: usize,
    ) -> i32 {
        let marshaled = AlgorithmId::try_from(algorithm_id).and_then(|id| {
            // SAFETY: forwarded from this function's contract.
            let pk = unsafe { borrow_bytes(proving_key, proving_key_len, "null proving key") }?;
            // SAFETY: as above.
            let cs = unsafe { borrow_bytes(r1cs, r1cs_len, "null constraint system") }?;
            Ok((id, pk, cs))
        });

        match marshaled {
            Ok((id, pk, cs)) => i32::from(bridge.init_algorithm(id, pk, cs).raw()),
            Err(e) => {
                warn!(algorithm_id, error = %e, "init not attempted");
                0
            }
        }
    }

    /// Body of `zkbridge_prove`.
    ///
    /// Returns a fresh NUL-terminated copy of the engine's result, or null when
    /// the witness is null, the engine produced nothing, or the result contains
    /// an interior NUL and cannot be represented as a C string.
    ///
    /// # Safety
    /// A non-null `witness` must point to a NUL-terminated string that stays
    /// valid for the duration of the call.
    pub unsafe fn prove<E: Engine>(bridge: &Bridge<E>, witness: *const c_char) -> *mut c_char {
        if witness.is_null() {
            warn!("prove not attempted: null witness");
            return std::ptr::null_mut();
        }
        // SAFETY: non-null and NUL-terminated per the caller's contract.
        let witness = unsafe { CStr::from_ptr(witness) };

        match bridge.prove_bytes(witness.to_bytes()).map(CString::new) {
            Some(Ok(text)) => text.into_raw(),
            Some(Err(e)) => {
                warn!(nul_at = e.nul_position(), "proof result has an interior NUL");
                std::ptr::null_mut()
            }
            None => std::ptr::null_mut(),
        }
    }

    /// Body of `zkbridge_string_free`. Null is ignored.
    ///
    /// # Safety
    /// `ptr` must be null or a pointer returned by [`prove`] that has not been
    /// freed yet.
    pub unsafe fn string_free(ptr: *mut c_char) {
        if ptr.is_null() {
            return;
        }
        // SAFETY: produced by `CString::into_raw` in `prove`, freed once.
        drop(unsafe { CString::from_raw(ptr) });
    }
}

#[cfg(feature = "cabi")]
mod cabi {
    use std::ffi::{c_char, CString};
    use std::sync::OnceLock;

    use tracing::warn;
    use zkbridge_core::native;

    use super::{host, ZKBRIDGE_FFI_ABI_VERSION};

    // Lazily constructed NUL-terminated version string with 'static lifetime.
    static VERSION_CSTR: OnceLock<CString> = OnceLock::new();

    /// Return the stable ABI contract version.
    #[no_mangle]
    pub extern "C" fn zkbridge_abi_version() -> u32 {
        ZKBRIDGE_FFI_ABI_VERSION
    }

    /// Return a pointer to a static, NUL-terminated version string.
    ///
    /// The caller must **not** free this pointer.
    #[no_mangle]
    pub extern "C" fn zkbridge_version() -> *const c_char {
        VERSION_CSTR
            .get_or_init(|| CString::new(env!("CARGO_PKG_VERSION")).unwrap_or_default())
            .as_ptr()
    }

    /// Initialise an algorithm from a proving key and constraint system.
    ///
    /// # Safety
    /// Non-null buffers must be readable for their stated lengths during the call.
    #[no_mangle]
    pub unsafe extern "C" fn zkbridge_init_algorithm(
        algorithm_id: u32,
        proving_key: *const u8,
        proving_key_len: usize,
        r1cs: *const u8,
        r1cs_len: usize,
    ) -> i32 {
        host::guard(0, || match native::shared() {
            // SAFETY: forwarded from this function's contract.
            Ok(bridge) => unsafe {
                host::init_algorithm(bridge, algorithm_id, proving_key, proving_key_len, r1cs, r1cs_len)
            },
            Err(e) => {
                warn!(error = %e, "init not attempted");
                0
            }
        })
    }

    /// Compute a proof for a NUL-terminated UTF-8 witness.
    ///
    /// # Safety
    /// `witness` must be null or a valid NUL-terminated string.
    #[no_mangle]
    pub unsafe extern "C" fn zkbridge_prove(witness: *const c_char) -> *mut c_char {
        host::guard(std::ptr::null_mut(), || match native::shared() {
            // SAFETY: forwarded from this function's contract.
            Ok(bridge) => unsafe { host::prove(bridge, witness) },
            Err(e) => {
                warn!(error = %e, "prove not attempted");
                std::ptr::null_mut()
            }
        })
    }

    /// Free a string returned by [`zkbridge_prove`]. Null is ignored.
    ///
    /// # Safety
    /// `s` must be null or an unfreed pointer from `zkbridge_prove`.
    #[no_mangle]
    pub unsafe extern "C" fn zkbridge_string_free(s: *mut c_char) {
        // SAFETY: forwarded from this function's contract.
        host::guard((), || unsafe { host::string_free(s) });
    }
}

#[cfg(feature = "cabi")]
pub use cabi::{
    zkbridge_abi_version, zkbridge_init_algorithm, zkbridge_prove, zkbridge_string_free,
    zkbridge_version,
};

#[cfg(test)]
mod tests {
    #[cfg(feature = "cabi")]
    #[test]
    fn abi_and_version_present() {
        assert!(super::zkbridge_abi_version() >= 1);
        let v = unsafe {
            // Safe: zkbridge_version guarantees a static, non-null, valid C string pointer.
            std::ffi::CStr::from_ptr(super::zkbridge_version())
        };
        assert!(!v.to_bytes().is_empty());
    }

    #[cfg(all(feature = "cabi", not(feature = "link")))]
    #[test]
    fn unlinked_exports_return_sentinels() {
        let pk = [0u8; 64];
        let rc = unsafe { super::zkbridge_init_algorithm(1, pk.as_ptr(), 64, pk.as_ptr(), 64) };
        assert_eq!(rc, 0);
        let out = unsafe { super::zkbridge_prove(b"{}\0".as_ptr().cast()) };
        assert!(out.is_null());
    }
}
