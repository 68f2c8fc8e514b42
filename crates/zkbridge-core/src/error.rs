//! Bridge error type.
//!
//! Only the bridge's own preconditions are errors. An engine answering
//! "failed" (a zero init byte, a null proof region) is a normal value and is
//! passed through unchanged; see [`crate::InitOutcome`] and
//! [`crate::Bridge::prove`].

use std::path::PathBuf;

/// Errors raised by the bridge and its host-side helpers.
#[derive(Debug, thiserror::Error)]
pub enum BridgeError {
    /// The native engine is not linked into this build or not reachable.
    #[error("proving engine is not available in this build (enable the `link` feature)")]
    EngineUnavailable,

    /// A host buffer could not be accessed or converted; the engine was not called.
    #[error("marshaling failed: {0}")]
    Marshal(&'static str),

    /// The engine returned a plain error message where a proof was expected.
    #[error("engine error: {0}")]
    Engine(String),

    /// The engine returned JSON without the expected proof fields.
    #[error("malformed proof result: {0}")]
    MalformedProof(String),

    /// A witness envelope could not be unwrapped (bad base64).
    #[error("invalid witness envelope: {0}")]
    Witness(String),

    /// A circuit file could not be read.
    #[error("reading {}: {source}", path.display())]
    Io {
        /// File that failed.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, BridgeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_are_descriptive() {
        let e = BridgeError::Marshal("null witness");
        assert_eq!(e.to_string(), "marshaling failed: null witness");

        let e = BridgeError::Io {
            path: PathBuf::from("circuits/pk.aes128"),
            source: std::io::Error::from(std::io::ErrorKind::NotFound),
        };
        assert!(e.to_string().starts_with("reading circuits/pk.aes128"));
    }
}
