//! `zkbridge-jni`: optional JNI bindings for the Android host.
//!
//! ## What this crate does
//! - By default, this compiles as a normal Rust library so the workspace builds
//!   without an Android toolchain.
//! - When the `jni` feature is enabled, it exports the two native methods of
//!   `com.zkp2preactnativesdk.Zkp2pGnarkModule`:
//!   - `nativeInitAlgorithm(int, byte[], byte[]): int`
//!   - `nativeProve(String): String?`
//!
//! Java arrays are pinned for exactly one engine call and released without
//! copy-back; the witness is read through `GetStringUTFChars`. Failures come
//! back as `0` / `null` and never as Java exceptions.
//!
//! ## Building the library (locally)
//! ```bash
//! # Default: Rust-only library (no Android toolchain required)
//! cargo build -p zkbridge-jni
//!
//! # Shared object for jniLibs (cross toolchain + libgnarkprover required)
//! cargo build -p zkbridge-jni --features jni,link --release --target aarch64-linux-android
//! ```
//!
//! For packaging, switch `crate-type` to include `"cdylib"` in `Cargo.toml`
//! (see inline comment there).

#![deny(rust_2018_idioms)]
#![warn(
    missing_docs,
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    clippy::unwrap_used,
    clippy::expect_used
)]

/// View pinned JNI byte elements (`jbyte` is signed) as unsigned bytes.
///
/// The returned slice has the same address and length as `elements`, so the
/// engine sees the JVM's buffer directly.
#[must_use]
pub fn host_bytes(elements: &[i8]) -> &[u8] {
    // SAFETY: `i8` and `u8` have identical size and alignment, and the
    // returned slice borrows `elements` for the same lifetime.
    unsafe { std::slice::from_raw_parts(elements.as_ptr().cast::<u8>(), elements.len()) }
}

#[cfg(feature = "jni")]
#[allow(non_snake_case)]
mod android {
    use std::panic::{self, AssertUnwindSafe};
    use std::ptr;

    use jni::objects::{JByteArray, JObject, JString, ReleaseMode};
    use jni::sys::{jint, jstring};
    use jni::JNIEnv;
    use tracing::warn;
    use zkbridge_core::{native, AlgorithmId, Bridge, Engine};

    use super::host_bytes;

    fn guard<T>(fallback: T, f: impl FnOnce() -> T) -> T {
        panic::catch_unwind(AssertUnwindSafe(f)).unwrap_or_else(|_| {
            warn!("panic caught at the JNI boundary");
            fallback
        })
    }

    fn init_algorithm<E: Engine>(
        env: &mut JNIEnv<'_>,
        bridge: &Bridge<E>,
        algorithm_id: jint,
        proving_key: &JByteArray<'_>,
        r1cs: &JByteArray<'_>,
    ) -> jint {
        let id = match AlgorithmId::try_from(algorithm_id) {
            Ok(id) => id,
            Err(e) => {
                warn!(algorithm_id, error = %e, "init not attempted");
                return 0;
            }
        };
        if proving_key.is_null() || r1cs.is_null() {
            warn!(algorithm_id, "init not attempted: null array");
            return 0;
        }

        // SAFETY: nothing else touches either array while its elements are
        // held, and NoCopyBack discards any writes on release.
        let pinned = unsafe { env.get_array_elements(proving_key, ReleaseMode::NoCopyBack) }
            .and_then(|pk| {
                // SAFETY: as above.
                unsafe { env.get_array_elements(r1cs, ReleaseMode::NoCopyBack) }.map(|cs| (pk, cs))
            });
        let (pk, cs) = match pinned {
            Ok(pinned) => pinned,
            Err(e) => {
                warn!(algorithm_id, error = %e, "failed to pin byte arrays");
                return 0;
            }
        };

        let outcome = bridge.init_algorithm(id, host_bytes(&pk), host_bytes(&cs));
        drop((pk, cs));
        jint::from(outcome.raw())
    }

    fn prove<E: Engine>(env: &mut JNIEnv<'_>, bridge: &Bridge<E>, witness: &JString<'_>) -> jstring {
        if witness.is_null() {
            warn!("prove not attempted: null witness");
            return ptr::null_mut();
        }

        let result = match env.get_string(witness) {
            Ok(pinned) => bridge.prove_bytes(pinned.to_bytes()),
            Err(e) => {
                warn!(error = %e, "failed to read witness string");
                return ptr::null_mut();
            }
        };

        match result.map(|text| env.new_string(text)) {
            Some(Ok(text)) => text.into_raw(),
            Some(Err(e)) => {
                warn!(error = %e, "failed to create result string");
                ptr::null_mut()
            }
            None => ptr::null_mut(),
        }
    }

    /// `Zkp2pGnarkModule.nativeInitAlgorithm(algorithmId, provingKey, r1cs)`.
    #[no_mangle]
    pub extern "system" fn Java_com_zkp2preactnativesdk_Zkp2pGnarkModule_nativeInitAlgorithm<'local>(
        mut env: JNIEnv<'local>,
        _this: JObject<'local>,
        algorithm_id: jint,
        proving_key: JByteArray<'local>,
        r1cs: JByteArray<'local>,
    ) -> jint {
        guard(0, || match native::shared() {
            Ok(bridge) => init_algorithm(&mut env, bridge, algorithm_id, &proving_key, &r1cs),
            Err(e) => {
                warn!(error = %e, "init not attempted");
                0
            }
        })
    }

    /// `Zkp2pGnarkModule.nativeProve(witnessJson)`.
    #[no_mangle]
    pub extern "system" fn Java_com_zkp2preactnativesdk_Zkp2pGnarkModule_nativeProve<'local>(
        mut env: JNIEnv<'local>,
        _this: JObject<'local>,
        witness: JString<'local>,
    ) -> jstring {
        guard(ptr::null_mut(), || match native::shared() {
            Ok(bridge) => prove(&mut env, bridge, &witness),
            Err(e) => {
                warn!(error = %e, "prove not attempted");
                ptr::null_mut()
            }
        })
    }
}

#[cfg(feature = "jni")]
pub use android::{
    Java_com_zkp2preactnativesdk_Zkp2pGnarkModule_nativeInitAlgorithm,
    Java_com_zkp2preactnativesdk_Zkp2pGnarkModule_nativeProve,
};

#[cfg(test)]
mod tests {
    use super::host_bytes;

    #[test]
    fn host_bytes_aliases_and_reinterprets() {
        let elements: [i8; 4] = [0, 1, -1, -128];
        let bytes = host_bytes(&elements);
        assert_eq!(bytes.as_ptr() as usize, elements.as_ptr() as usize);
        assert_eq!(bytes, &[0x00, 0x01, 0xFF, 0x80]);
    }

    #[test]
    fn host_bytes_empty() {
        assert!(host_bytes(&[]).is_empty());
    }
}
