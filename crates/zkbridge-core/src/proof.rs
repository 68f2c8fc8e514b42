//! Interpreting what the engine's prove call returned.
//!
//! On success the engine returns a JSON object with `proof` and
//! `publicSignals`. On failure it returns a bare error message instead. The
//! bridge itself passes either through untouched; these helpers are for the
//! application layer that consumes the string.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::algorithm::Algorithm;
use crate::error::{BridgeError, Result};

/// A Groth16 proof and its public signals, as produced by the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProofOutput {
    /// Encoded proof.
    pub proof: String,
    /// Encoded public signals.
    #[serde(rename = "publicSignals")]
    pub public_signals: String,
}

impl ProofOutput {
    /// Parse an engine result string.
    ///
    /// Non-string field values are kept in their JSON text form.
    ///
    /// # Errors
    /// - [`BridgeError::Engine`] when the result is not JSON at all (the engine's
    ///   error message is carried verbatim).
    /// - [`BridgeError::MalformedProof`] when it is JSON but unparsable, or lacks
    ///   a non-empty `proof` or `publicSignals`.
    pub fn parse(result: &str) -> Result<Self> {
        let trimmed = result.trim_start();
        if !trimmed.starts_with('{') && !trimmed.starts_with('[') {
            return Err(BridgeError::Engine(result.to_owned()));
        }

        let value: Value = serde_json::from_str(result)
            .map_err(|e| BridgeError::MalformedProof(format!("failed to parse result: {e}")))?;

        match (field(&value, "proof"), field(&value, "publicSignals")) {
            (Some(proof), Some(public_signals)) => Ok(Self {
                proof,
                public_signals,
            }),
            _ => Err(BridgeError::MalformedProof(
                "missing proof or publicSignals in result".to_owned(),
            )),
        }
    }
}

fn field(value: &Value, key: &str) -> Option<String> {
    let text = match value.get(key)? {
        Value::Null => return None,
        Value::String(s) => s.clone(),
        other => other.to_string(),
    };
    (!text.is_empty()).then_some(text)
}

/// The `cipher` a witness declares, if it is JSON and names a known algorithm.
///
/// Used only to warn early when a proof targets an algorithm that was never
/// initialised; the engine makes the real decision.
#[must_use]
pub fn witness_cipher(witness: &str) -> Option<Algorithm> {
    let value: Value = serde_json::from_str(witness).ok()?;
    value.get("cipher")?.as_str()?.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_engine_json() {
        let out = ProofOutput::parse(r#"{"proof":"0xab","publicSignals":"[1,2]"}"#).unwrap();
        assert_eq!(out.proof, "0xab");
        assert_eq!(out.public_signals, "[1,2]");
    }

    #[test]
    fn non_string_fields_keep_json_text() {
        let out = ProofOutput::parse(r#"{"proof":{"a":[1]},"publicSignals":[3]}"#).unwrap();
        assert_eq!(out.proof, r#"{"a":[1]}"#);
        assert_eq!(out.public_signals, "[3]");
    }

    #[test]
    fn bare_text_is_an_engine_error() {
        match ProofOutput::parse("witness parse failed: unexpected EOF") {
            Err(BridgeError::Engine(msg)) => assert!(msg.contains("unexpected EOF")),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn missing_fields_are_malformed() {
        assert!(matches!(
            ProofOutput::parse(r#"{"proof":"x"}"#),
            Err(BridgeError::MalformedProof(_))
        ));
        assert!(matches!(
            ProofOutput::parse(r#"{"proof":"","publicSignals":"y"}"#),
            Err(BridgeError::MalformedProof(_))
        ));
        assert!(matches!(
            ProofOutput::parse("{not json"),
            Err(BridgeError::MalformedProof(_))
        ));
    }

    #[test]
    fn serializes_with_host_field_names() {
        let out = ProofOutput {
            proof: "p".into(),
            public_signals: "s".into(),
        };
        assert_eq!(
            serde_json::to_string(&out).unwrap(),
            r#"{"proof":"p","publicSignals":"s"}"#
        );
    }

    #[test]
    fn cipher_hint() {
        assert_eq!(
            witness_cipher(r#"{"cipher":"aes-128-ctr","key":[]}"#),
            Some(Algorithm::Aes128Ctr)
        );
        assert_eq!(witness_cipher(r#"{"cipher":"rot13"}"#), None);
        assert_eq!(witness_cipher("not json"), None);
    }
}
