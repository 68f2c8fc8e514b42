//! Algorithm identifiers and the catalogue of circuits the app ships.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::BridgeError;

/// Identifier selecting a proving configuration inside the engine.
///
/// Any byte is accepted here; values the engine does not know are rejected by
/// the engine itself (its init call returns 0), not by the bridge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AlgorithmId(u8);

impl AlgorithmId {
    /// Wrap a raw identifier.
    #[must_use]
    pub const fn new(raw: u8) -> Self {
        Self(raw)
    }

    /// The raw byte passed to the engine.
    #[must_use]
    pub const fn raw(self) -> u8 {
        self.0
    }
}

impl From<u8> for AlgorithmId {
    fn from(raw: u8) -> Self {
        Self(raw)
    }
}

/// Host runtimes hand identifiers over as 32-bit ints.
impl TryFrom<i32> for AlgorithmId {
    type Error = BridgeError;

    fn try_from(raw: i32) -> Result<Self, Self::Error> {
        u8::try_from(raw)
            .map(Self)
            .map_err(|_| BridgeError::Marshal("algorithm id out of range"))
    }
}

impl TryFrom<u32> for AlgorithmId {
    type Error = BridgeError;

    fn try_from(raw: u32) -> Result<Self, Self::Error> {
        u8::try_from(raw)
            .map(Self)
            .map_err(|_| BridgeError::Marshal("algorithm id out of range"))
    }
}

impl fmt::Display for AlgorithmId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Cipher circuits compiled into the shipped engine build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Algorithm {
    /// ChaCha20 stream cipher circuit.
    #[serde(rename = "chacha20")]
    ChaCha20,
    /// AES-128 in counter mode.
    #[serde(rename = "aes-128-ctr")]
    Aes128Ctr,
    /// AES-256 in counter mode.
    #[serde(rename = "aes-256-ctr")]
    Aes256Ctr,
}

impl Algorithm {
    /// Every catalogue entry, in engine-id order.
    pub const ALL: [Self; 3] = [Self::ChaCha20, Self::Aes128Ctr, Self::Aes256Ctr];

    /// Engine identifier for this circuit.
    #[must_use]
    pub const fn id(self) -> AlgorithmId {
        match self {
            Self::ChaCha20 => AlgorithmId(0),
            Self::Aes128Ctr => AlgorithmId(1),
            Self::Aes256Ctr => AlgorithmId(2),
        }
    }

    /// Name used by witnesses (`"cipher"`) and the app layer.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::ChaCha20 => "chacha20",
            Self::Aes128Ctr => "aes-128-ctr",
            Self::Aes256Ctr => "aes-256-ctr",
        }
    }

    /// Suffix of the circuit files: `pk.<suffix>` and `r1cs.<suffix>`.
    #[must_use]
    pub const fn file_suffix(self) -> &'static str {
        match self {
            Self::ChaCha20 => "chacha20",
            Self::Aes128Ctr => "aes128",
            Self::Aes256Ctr => "aes256",
        }
    }

    /// Look up a catalogue entry by engine identifier.
    #[must_use]
    pub fn from_id(id: AlgorithmId) -> Option<Self> {
        Self::ALL.into_iter().find(|a| a.id() == id)
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Algorithm {
    type Err = BridgeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|a| a.name().eq_ignore_ascii_case(s) || a.file_suffix().eq_ignore_ascii_case(s))
            .ok_or(BridgeError::Marshal("unknown algorithm name"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalogue_ids_are_stable() {
        assert_eq!(Algorithm::ChaCha20.id().raw(), 0);
        assert_eq!(Algorithm::Aes128Ctr.id().raw(), 1);
        assert_eq!(Algorithm::Aes256Ctr.id().raw(), 2);
        for a in Algorithm::ALL {
            assert_eq!(Algorithm::from_id(a.id()), Some(a));
        }
        assert_eq!(Algorithm::from_id(AlgorithmId::new(9)), None);
    }

    #[test]
    fn parses_names_and_suffixes() {
        assert_eq!("aes-128-ctr".parse::<Algorithm>().unwrap(), Algorithm::Aes128Ctr);
        assert_eq!("AES256".parse::<Algorithm>().unwrap(), Algorithm::Aes256Ctr);
        assert!("des".parse::<Algorithm>().is_err());
    }

    #[test]
    fn host_ints_outside_u8_are_rejected() {
        assert_eq!(AlgorithmId::try_from(2i32).unwrap(), AlgorithmId::new(2));
        assert!(AlgorithmId::try_from(-1i32).is_err());
        assert!(AlgorithmId::try_from(256u32).is_err());
    }

    #[test]
    fn serde_uses_witness_names() {
        let s = serde_json::to_string(&Algorithm::ChaCha20).unwrap();
        assert_eq!(s, "\"chacha20\"");
        let a: Algorithm = serde_json::from_str("\"aes-256-ctr\"").unwrap();
        assert_eq!(a, Algorithm::Aes256Ctr);
    }
}
