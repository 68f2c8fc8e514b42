//! Circuit material on disk and start-up initialisation of every algorithm.
//!
//! The app ships one proving key and one constraint system per catalogue
//! entry, named `pk.<suffix>` and `r1cs.<suffix>` (see
//! [`Algorithm::file_suffix`]). A missing pair is not fatal: that algorithm is
//! simply left uninitialised and proofs for it will fail inside the engine.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{error, info, warn};

use crate::algorithm::Algorithm;
use crate::bridge::Bridge;
use crate::engine::Engine;
use crate::error::{BridgeError, Result};

/// Paths of one algorithm's circuit files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CircuitFiles {
    /// Algorithm these files belong to.
    pub algorithm: Algorithm,
    /// Serialized proving key.
    pub proving_key: PathBuf,
    /// Serialized R1CS constraint system.
    pub constraint_system: PathBuf,
}

impl CircuitFiles {
    /// Expected file locations for `algorithm` under `dir`.
    #[must_use]
    pub fn locate(dir: &Path, algorithm: Algorithm) -> Self {
        let suffix = algorithm.file_suffix();
        Self {
            algorithm,
            proving_key: dir.join(format!("pk.{suffix}")),
            constraint_system: dir.join(format!("r1cs.{suffix}")),
        }
    }

    /// Read both files into memory.
    ///
    /// # Errors
    /// [`BridgeError::Io`] naming the first file that could not be read.
    pub fn load(&self) -> Result<CircuitMaterial> {
        Ok(CircuitMaterial {
            algorithm: self.algorithm,
            proving_key: read(&self.proving_key)?,
            constraint_system: read(&self.constraint_system)?,
        })
    }
}

fn read(path: &Path) -> Result<Vec<u8>> {
    fs::read(path).map_err(|source| BridgeError::Io {
        path: path.to_owned(),
        source,
    })
}

/// Circuit bytes ready to hand to [`Bridge::init_algorithm`].
#[derive(Clone, PartialEq, Eq)]
pub struct CircuitMaterial {
    /// Algorithm the material is for.
    pub algorithm: Algorithm,
    /// Proving key bytes.
    pub proving_key: Vec<u8>,
    /// Constraint system bytes.
    pub constraint_system: Vec<u8>,
}

impl std::fmt::Debug for CircuitMaterial {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CircuitMaterial")
            .field("algorithm", &self.algorithm)
            .field("proving_key_len", &self.proving_key.len())
            .field("constraint_system_len", &self.constraint_system.len())
            .finish()
    }
}

/// Result of initialising one catalogue entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum InitStatus {
    /// The engine accepted the circuit.
    Ready,
    /// The engine returned 0.
    Rejected,
    /// Circuit files could not be read; the engine was not called.
    Missing,
}

/// Per-algorithm line of an [`init_all`] run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct InitReport {
    /// Catalogue entry.
    pub algorithm: Algorithm,
    /// What happened.
    pub status: InitStatus,
}

/// Initialise every catalogue entry whose files exist under `dir`.
///
/// Buffers are read, handed to the engine, and dropped one algorithm at a
/// time, so at most one circuit's material is resident at once.
pub fn init_all<E: Engine>(bridge: &Bridge<E>, dir: &Path) -> Vec<InitReport> {
    Algorithm::ALL
        .into_iter()
        .map(|algorithm| {
            let status = match CircuitFiles::locate(dir, algorithm).load() {
                Err(e) => {
                    error!(%algorithm, error = %e, "circuit files not found");
                    InitStatus::Missing
                }
                Ok(material) => {
                    let outcome = bridge.init_algorithm(
                        algorithm.id(),
                        &material.proving_key,
                        &material.constraint_system,
                    );
                    if outcome.is_ready() {
                        InitStatus::Ready
                    } else {
                        warn!(%algorithm, id = %algorithm.id(), "engine rejected circuit");
                        InitStatus::Rejected
                    }
                }
            };
            InitReport { algorithm, status }
        })
        .inspect(|r| info!(algorithm = %r.algorithm, status = ?r.status, "init"))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stub::StubEngine;

    fn tmp_dir(name: &str) -> PathBuf {
        let nanos = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        let dir = std::env::temp_dir().join(format!("zkbridge_circuits_{name}_{nanos}"));
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn locate_uses_catalogue_suffixes() {
        let files = CircuitFiles::locate(Path::new("gnark-circuits"), Algorithm::Aes128Ctr);
        assert_eq!(files.proving_key, Path::new("gnark-circuits/pk.aes128"));
        assert_eq!(files.constraint_system, Path::new("gnark-circuits/r1cs.aes128"));
    }

    #[test]
    fn load_reports_missing_file() {
        let dir = tmp_dir("missing");
        fs::write(dir.join("pk.chacha20"), [1u8, 2, 3]).unwrap();
        let err = CircuitFiles::locate(&dir, Algorithm::ChaCha20).load().unwrap_err();
        match err {
            BridgeError::Io { path, .. } => assert!(path.ends_with("r1cs.chacha20")),
            other => panic!("unexpected error: {other}"),
        }
        let _ = fs::remove_dir_all(dir);
    }

    #[test]
    fn init_all_skips_missing_and_passes_bytes() {
        let dir = tmp_dir("init_all");
        fs::write(dir.join("pk.aes256"), vec![0xAAu8; 16]).unwrap();
        fs::write(dir.join("r1cs.aes256"), vec![0xBBu8; 24]).unwrap();

        let bridge = Bridge::new(StubEngine::new());
        let reports = init_all(&bridge, &dir);

        assert_eq!(
            reports,
            vec![
                InitReport { algorithm: Algorithm::ChaCha20, status: InitStatus::Missing },
                InitReport { algorithm: Algorithm::Aes128Ctr, status: InitStatus::Missing },
                InitReport { algorithm: Algorithm::Aes256Ctr, status: InitStatus::Ready },
            ]
        );
        bridge.with_engine(|e| {
            let inits = &e.calls().inits;
            assert_eq!(inits.len(), 1);
            assert_eq!(inits[0].algorithm, 2);
            assert_eq!(inits[0].proving_key.1, 16);
            assert_eq!(inits[0].constraint_system.1, 24);
        });
        assert_eq!(bridge.initialized(), vec![Algorithm::Aes256Ctr.id()]);
        let _ = fs::remove_dir_all(dir);
    }

    #[test]
    fn init_all_reports_rejections() {
        let dir = tmp_dir("rejected");
        for a in Algorithm::ALL {
            let files = CircuitFiles::locate(&dir, a);
            fs::write(files.proving_key, [1u8]).unwrap();
            fs::write(files.constraint_system, [2u8]).unwrap();
        }
        let bridge = Bridge::new(StubEngine::new().init_result(0));
        let reports = init_all(&bridge, &dir);
        assert!(reports.iter().all(|r| r.status == InitStatus::Rejected));
        assert!(bridge.initialized().is_empty());
        let _ = fs::remove_dir_all(dir);
    }
}
