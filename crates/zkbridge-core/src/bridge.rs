//! Serialized invoker for the engine's init and prove entry points.
//!
//! [`Bridge`] owns an [`Engine`] behind a single mutex. Every call into the
//! engine happens while that lock is held, so a single-instance engine never
//! sees overlapping calls no matter how many host threads use the bridge.
//! The calling thread blocks for the whole engine computation; there is no
//! queueing, no timeout and no way to interrupt a call in flight.

use std::collections::BTreeSet;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Instant;

use tracing::{debug, trace};

use crate::algorithm::AlgorithmId;
use crate::engine::{Engine, ResultRegion};
use crate::marshal::preview;
use crate::slice::SliceDescriptor;

struct Inner<E> {
    engine: E,
    initialized: BTreeSet<AlgorithmId>,
}

/// Marshaling front-end over one engine instance.
pub struct Bridge<E: Engine> {
    inner: Mutex<Inner<E>>,
}

/// What the engine answered to an init call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InitOutcome {
    algorithm: AlgorithmId,
    raw: u8,
}

impl InitOutcome {
    /// Algorithm the call was for.
    #[must_use]
    pub const fn algorithm(&self) -> AlgorithmId {
        self.algorithm
    }

    /// The engine's byte, unchanged (0 = failure, anything else = success).
    #[must_use]
    pub const fn raw(&self) -> u8 {
        self.raw
    }

    /// `true` when the engine reported success.
    #[must_use]
    pub const fn is_ready(&self) -> bool {
        self.raw != 0
    }

    /// Capability for the algorithm, if the engine accepted it.
    #[must_use]
    pub fn context<E: Engine>(self, bridge: &Bridge<E>) -> Option<AlgorithmContext<'_, E>> {
        self.is_ready().then_some(AlgorithmContext {
            bridge,
            algorithm: self.algorithm,
        })
    }
}

/// Capability for an algorithm the engine has accepted.
///
/// Obtained from [`InitOutcome::context`] or [`Bridge::context`] after a
/// successful init. The engine keeps
/// the real state process-wide; this value only proves that the init happened
/// through this bridge, and lets callers issue proofs against it.
pub struct AlgorithmContext<'b, E: Engine> {
    bridge: &'b Bridge<E>,
    algorithm: AlgorithmId,
}

impl<E: Engine> Clone for AlgorithmContext<'_, E> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<E: Engine> Copy for AlgorithmContext<'_, E> {}

impl<E: Engine> AlgorithmContext<'_, E> {
    /// Algorithm this context was initialised for.
    #[must_use]
    pub const fn algorithm(&self) -> AlgorithmId {
        self.algorithm
    }

    /// Compute a proof; see [`Bridge::prove`].
    #[must_use]
    pub fn prove(&self, witness: &str) -> Option<String> {
        self.bridge.prove(witness)
    }
}

impl<E: Engine> std::fmt::Debug for AlgorithmContext<'_, E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AlgorithmContext")
            .field("algorithm", &self.algorithm)
            .finish_non_exhaustive()
    }
}

impl<E: Engine> Bridge<E> {
    /// Wrap an engine.
    #[must_use]
    pub fn new(engine: E) -> Self {
        Self {
            inner: Mutex::new(Inner {
                engine,
                initialized: BTreeSet::new(),
            }),
        }
    }

    // A panic while the lock was held can only come from inside an engine call
    // or a decode; the bookkeeping is updated after those, so it stays valid.
    fn lock(&self) -> MutexGuard<'_, Inner<E>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Initialise `algorithm` from a proving key and constraint system.
    ///
    /// Both buffers are passed to the engine by reference and are free to be
    /// dropped or reused as soon as this returns. The engine's answer is
    /// returned unchanged; a zero byte is a value, not an error.
    pub fn init_algorithm(
        &self,
        algorithm: AlgorithmId,
        proving_key: &[u8],
        constraint_system: &[u8],
    ) -> InitOutcome {
        debug!(
            algorithm = algorithm.raw(),
            pk_len = proving_key.len(),
            r1cs_len = constraint_system.len(),
            pk_head = %preview(proving_key),
            r1cs_head = %preview(constraint_system),
            "calling engine init"
        );

        let started = Instant::now();
        let mut inner = self.lock();
        let raw = inner.engine.init_algorithm(
            algorithm.raw(),
            SliceDescriptor::from_slice(proving_key),
            SliceDescriptor::from_slice(constraint_system),
        );
        if raw != 0 {
            inner.initialized.insert(algorithm);
        }
        drop(inner);

        debug!(
            algorithm = algorithm.raw(),
            raw,
            elapsed_ms = started.elapsed().as_millis(),
            "engine init returned"
        );
        InitOutcome { algorithm, raw }
    }

    /// Compute a proof for a UTF-8 witness.
    ///
    /// Returns `None` when the engine produced no result (null address or
    /// non-positive length). Otherwise the result is copied into a host string
    /// and the engine allocation is released before this returns.
    #[must_use]
    pub fn prove(&self, witness: &str) -> Option<String> {
        self.prove_bytes(witness.as_bytes())
    }

    /// [`Bridge::prove`] over raw witness bytes, for hosts whose strings arrive
    /// as encoded buffers (e.g. JNI's modified UTF-8).
    #[must_use]
    pub fn prove_bytes(&self, witness: &[u8]) -> Option<String> {
        debug!(witness_len = witness.len(), "calling engine prove");

        let started = Instant::now();
        let mut inner = self.lock();
        let region = inner.engine.prove(SliceDescriptor::from_slice(witness));
        trace!(ptr = ?region.ptr, len = region.len, "engine prove returned");

        let result = ResultRegion::adopt(&mut inner.engine, region).and_then(|owned| {
            let text = owned.decode();
            drop(owned);
            text
        });
        drop(inner);

        debug!(
            produced = result.is_some(),
            result_len = result.as_ref().map_or(0, String::len),
            elapsed_ms = started.elapsed().as_millis(),
            "engine prove finished"
        );
        result
    }

    /// Capability for `algorithm`, if an init for it has succeeded.
    #[must_use]
    pub fn context(&self, algorithm: AlgorithmId) -> Option<AlgorithmContext<'_, E>> {
        self.is_initialized(algorithm)
            .then_some(AlgorithmContext {
                bridge: self,
                algorithm,
            })
    }

    /// `true` once any init for `algorithm` has succeeded.
    #[must_use]
    pub fn is_initialized(&self, algorithm: AlgorithmId) -> bool {
        self.lock().initialized.contains(&algorithm)
    }

    /// Algorithms with a successful init, in id order.
    #[must_use]
    pub fn initialized(&self) -> Vec<AlgorithmId> {
        self.lock().initialized.iter().copied().collect()
    }

    /// Run `f` with shared access to the engine (under the lock).
    pub fn with_engine<R>(&self, f: impl FnOnce(&E) -> R) -> R {
        f(&self.lock().engine)
    }
}

impl<E: Engine> std::fmt::Debug for Bridge<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Bridge")
            .field("initialized", &self.initialized())
            .finish_non_exhaustive()
    }
}
