//! Runtime configuration for hosts that drive the bridge from files.
//!
//! Resolution order: built-in defaults, then an optional TOML file, then
//! environment overrides (`ZKBRIDGE_CIRCUITS_DIR`, `ZKBRIDGE_LOG`).
//!
//! ```toml
//! circuits_dir = "assets/gnark-circuits"
//! log_filter = "zkbridge_core=debug,info"
//! ```

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Environment variable overriding [`BridgeConfig::circuits_dir`].
pub const ENV_CIRCUITS_DIR: &str = "ZKBRIDGE_CIRCUITS_DIR";
/// Environment variable overriding [`BridgeConfig::log_filter`].
pub const ENV_LOG: &str = "ZKBRIDGE_LOG";

/// Settings shared by the CLI and host glue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    /// Directory holding `pk.<suffix>` / `r1cs.<suffix>` pairs.
    pub circuits_dir: PathBuf,
    /// `tracing_subscriber::EnvFilter` directive.
    pub log_filter: String,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            circuits_dir: PathBuf::from("gnark-circuits"),
            log_filter: "info".to_owned(),
        }
    }
}

impl BridgeConfig {
    /// Parse a TOML document; absent keys keep their defaults.
    pub fn from_toml(text: &str) -> Result<Self> {
        toml::from_str(text).context("parsing bridge config TOML")
    }

    /// Defaults, then `path` (if given), then environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut cfg = match path {
            Some(p) => {
                let text = std::fs::read_to_string(p)
                    .with_context(|| format!("reading config {}", p.display()))?;
                Self::from_toml(&text).with_context(|| format!("in {}", p.display()))?
            }
            None => Self::default(),
        };
        cfg.apply_overrides(|key| std::env::var(key).ok());
        Ok(cfg)
    }

    /// Apply overrides from a key lookup (the process environment in [`Self::load`]).
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(dir) = lookup(ENV_CIRCUITS_DIR).filter(|v| !v.is_empty()) {
            self.circuits_dir = PathBuf::from(dir);
        }
        if let Some(filter) = lookup(ENV_LOG).filter(|v| !v.is_empty()) {
            self.log_filter = filter;
        }
    }
}
