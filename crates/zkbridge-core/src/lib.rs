//! `zkbridge-core`: marshaling and memory ownership for a native gnark prover.
//!
//! The proving engine is a Go `c-shared` library with three exports:
//! `InitAlgorithm(id, pk, r1cs) -> u8`, `Prove(witness) -> (ptr, len)` and
//! `Free(ptr)`. This crate is everything between a host runtime's buffers and
//! those exports:
//! - [`SliceDescriptor`] / [`ProofRegion`]: the engine's C layouts,
//! - [`Engine`]: the three calls as a trait, so a stub can stand in for tests,
//! - [`Bridge`]: serialized, synchronous invocation with copy-then-release of
//!   every engine result,
//! - catalogue, circuit loading, result parsing and config for hosts.
//!
//! ```
//! use zkbridge_core::{Algorithm, Bridge};
//! # use zkbridge_core::stub::{StubEngine, StubProof};
//! # let engine = StubEngine::new().proof(StubProof::bytes("proof"));
//! let bridge = Bridge::new(engine);
//! let outcome = bridge.init_algorithm(Algorithm::ChaCha20.id(), &[0u8; 64], &[0u8; 64]);
//! assert!(outcome.is_ready());
//! assert_eq!(bridge.prove(r#"{"x":1}"#).as_deref(), Some("proof"));
//! ```
//!
//! ## Ownership in one paragraph
//! Host buffers are borrowed, never copied, for exactly one engine call. Engine
//! results are copied into host memory and released through the engine's own
//! `Free` before the call returns; nothing ever hands out a pointer into engine
//! memory.

#![deny(rust_2018_idioms)]
#![deny(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(
    clippy::missing_errors_doc,
    clippy::module_name_repetitions,
    clippy::doc_markdown
)]

/// Algorithm identifiers and the shipped circuit catalogue.
pub mod algorithm;
/// Serialized engine invoker and the algorithm capability it hands out.
pub mod bridge;
/// Circuit files on disk and bulk initialisation.
pub mod circuits;
/// Layered runtime configuration.
pub mod config;
/// The engine trait and result-region ownership.
pub mod engine;
/// Bridge error type.
pub mod error;
/// Copying engine results into host memory.
pub mod marshal;
/// The linked native engine (`link` feature).
pub mod native;
/// Parsing engine proof results.
pub mod proof;
/// C-layout descriptors exchanged with the engine.
pub mod slice;
/// In-process engine double for tests and host-side dry runs.
pub mod stub;
/// Unwrapping base64 witness envelopes from the app's RPC layer.
pub mod witness;

pub use algorithm::{Algorithm, AlgorithmId};
pub use bridge::{AlgorithmContext, Bridge, InitOutcome};
pub use circuits::{init_all, CircuitFiles, CircuitMaterial, InitReport, InitStatus};
pub use config::BridgeConfig;
pub use engine::Engine;
pub use error::{BridgeError, Result};
pub use native::NativeEngine;
pub use proof::{witness_cipher, ProofOutput};
pub use slice::{GoInt, ProofRegion, SliceDescriptor};
pub use witness::decode_envelope;
