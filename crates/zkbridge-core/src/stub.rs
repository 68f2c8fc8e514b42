//! In-process stand-in for the native engine.
//!
//! [`StubEngine`] answers the three engine calls from configuration and
//! records everything the bridge hands it, so marshaling and ownership rules
//! can be checked without the real library. Result allocations are real heap
//! allocations owned by the stub until released, which makes leaks and
//! double releases observable through [`StubEngine::outstanding`] and
//! [`StubCalls::bogus_releases`].
//!
//! Hosts also use it for dry runs (the CLI's `--dry-run`) where the marshaling
//! path should be exercised without the native library.

use std::collections::HashMap;
use std::ffi::c_void;

use crate::engine::Engine;
use crate::slice::{GoInt, ProofRegion, SliceDescriptor};

/// Stand-in address for regions that carry no allocation.
static EMPTY_REGION: u8 = 0;

/// What [`StubEngine::prove`](Engine::prove) hands back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StubProof {
    /// `(null, 0)`: no result.
    Null,
    /// A fresh allocation holding these bytes.
    Bytes(Vec<u8>),
    /// A non-null static address with the given length (meant for `len <= 0`).
    Degenerate(GoInt),
}

impl StubProof {
    /// Allocate `bytes` for every proof.
    pub fn bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Self::Bytes(bytes.into())
    }
}

/// Addresses and lengths of one `InitAlgorithm` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InitCall {
    /// Algorithm byte as received.
    pub algorithm: u8,
    /// Proving key descriptor `(address, len, cap)`.
    pub proving_key: (usize, usize, usize),
    /// Constraint system descriptor `(address, len, cap)`.
    pub constraint_system: (usize, usize, usize),
}

/// Log of everything the bridge did to the stub.
#[derive(Debug, Clone, Default)]
pub struct StubCalls {
    /// Every init call, in order.
    pub inits: Vec<InitCall>,
    /// Copy of every witness taken while the prove call was running.
    pub witnesses: Vec<Vec<u8>>,
    /// Addresses handed out by `prove`, in order.
    pub allocated: Vec<usize>,
    /// Addresses passed to `release`, in order.
    pub released: Vec<usize>,
    /// Releases of addresses the stub did not have outstanding.
    pub bogus_releases: Vec<usize>,
}

/// Configurable engine double.
#[derive(Debug)]
pub struct StubEngine {
    init_result: u8,
    proof: StubProof,
    live: HashMap<usize, Box<[u8]>>,
    calls: StubCalls,
}

impl Default for StubEngine {
    fn default() -> Self {
        Self::new()
    }
}

fn describe(d: &SliceDescriptor<'_>) -> (usize, usize, usize) {
    (d.as_ptr() as usize, d.len(), d.capacity())
}

impl StubEngine {
    /// Accepts every init (returns 1) and produces no proof.
    #[must_use]
    pub fn new() -> Self {
        Self {
            init_result: 1,
            proof: StubProof::Null,
            live: HashMap::new(),
            calls: StubCalls::default(),
        }
    }

    /// Byte to answer init calls with.
    #[must_use]
    pub fn init_result(mut self, raw: u8) -> Self {
        self.init_result = raw;
        self
    }

    /// Shape of every proof result.
    #[must_use]
    pub fn proof(mut self, proof: StubProof) -> Self {
        self.proof = proof;
        self
    }

    /// Everything recorded so far.
    #[must_use]
    pub const fn calls(&self) -> &StubCalls {
        &self.calls
    }

    /// Result allocations handed out and not yet released.
    #[must_use]
    pub fn outstanding(&self) -> usize {
        self.live.len()
    }
}

// SAFETY: `Bytes` regions point into boxes held in `live` until `release`
// removes them; `Degenerate` and `Null` regions are never present.
unsafe impl Engine for StubEngine {
    fn init_algorithm(
        &mut self,
        algorithm: u8,
        proving_key: SliceDescriptor<'_>,
        constraint_system: SliceDescriptor<'_>,
    ) -> u8 {
        self.calls.inits.push(InitCall {
            algorithm,
            proving_key: describe(&proving_key),
            constraint_system: describe(&constraint_system),
        });
        self.init_result
    }

    fn prove(&mut self, witness: SliceDescriptor<'_>) -> ProofRegion {
        self.calls.witnesses.push(witness.as_bytes().to_vec());

        match &self.proof {
            StubProof::Null => ProofRegion::null(),
            StubProof::Degenerate(len) => ProofRegion {
                ptr: std::ptr::addr_of!(EMPTY_REGION).cast_mut().cast::<c_void>(),
                len: *len,
            },
            StubProof::Bytes(bytes) if bytes.is_empty() => ProofRegion::null(),
            StubProof::Bytes(bytes) => {
                let mut owned: Box<[u8]> = bytes.clone().into_boxed_slice();
                let ptr = owned.as_mut_ptr();
                let len = GoInt::try_from(owned.len()).unwrap_or(GoInt::MAX);
                self.calls.allocated.push(ptr as usize);
                self.live.insert(ptr as usize, owned);
                ProofRegion {
                    ptr: ptr.cast::<c_void>(),
                    len,
                }
            }
        }
    }

    unsafe fn release(&mut self, ptr: *mut c_void) {
        let addr = ptr as usize;
        self.calls.released.push(addr);
        if self.live.remove(&addr).is_none() {
            self.calls.bogus_releases.push(addr);
        }
    }
}
