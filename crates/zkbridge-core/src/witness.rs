//! Witness envelopes as the app's RPC layer sends them.
//!
//! The JS side hands the native module base64, either bare or wrapped as
//! `{"value": "<base64>"}`. Plain witness JSON (an object without a string
//! `value`) is passed through unchanged, so captured witnesses and hand-written
//! ones go through the same door.

use base64::alphabet;
use base64::engine::general_purpose::{GeneralPurpose, PAD};
use base64::engine::DecodePaddingMode;
use base64::Engine as _;
use serde_json::Value;

use crate::error::{BridgeError, Result};

/// Standard alphabet; padding optional on decode.
const LENIENT: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    PAD.with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Turn an RPC witness argument into the witness JSON the engine expects.
///
/// Line breaks and other ASCII whitespace inside the base64 are ignored.
/// Decoded bytes that are not UTF-8 are replaced with `U+FFFD`.
///
/// # Errors
/// [`BridgeError::Witness`] when the payload is not valid base64.
pub fn decode_envelope(input: &str) -> Result<String> {
    let trimmed = input.trim();
    let encoded = match serde_json::from_str::<Value>(trimmed) {
        Ok(Value::Object(map)) => match map.get("value") {
            Some(Value::String(value)) => value.clone(),
            _ => return Ok(input.to_owned()),
        },
        Ok(Value::String(bare)) => bare,
        Ok(_) | Err(_) => trimmed.to_owned(),
    };

    let compact: String = encoded
        .chars()
        .filter(|c| !c.is_ascii_whitespace())
        .collect();
    let bytes = LENIENT.decode(compact).map_err(|e| {
        BridgeError::Witness(format!("failed to decode base64 witness data: {e}"))
    })?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}
