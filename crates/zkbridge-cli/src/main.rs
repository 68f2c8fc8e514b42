// crates/zkbridge-cli/src/main.rs

#![forbid(unsafe_code)]
#![deny(
    rust_2018_idioms,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::todo
)]

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use zkbridge_core::stub::{StubEngine, StubProof};
use zkbridge_core::{
    decode_envelope, init_all, native, witness_cipher, Algorithm, AlgorithmId, Bridge, BridgeConfig,
    CircuitFiles, Engine, InitReport, InitStatus, NativeEngine, ProofOutput,
};

/// Result the stub engine returns under `--dry-run`.
const DRY_RUN_PROOF: &str = r#"{"proof":"dry-run","publicSignals":"[]"}"#;

#[derive(Parser, Debug)]
#[command(
    name = "zkbridge-cli",
    about = "Drive the gnark proving engine through zkbridge",
    long_about = "Drive the gnark proving engine through zkbridge.\n\nUse this tool to list the supported algorithms, check circuit material, and produce proofs from witness JSON.",
    version = env!("CARGO_PKG_VERSION"),
    disable_help_subcommand = true
)]
struct Cli {
    /// TOML config file (circuits_dir, log_filter)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Use the in-process stub engine instead of the linked library
    #[arg(long, global = true, default_value_t = false)]
    dry_run: bool,

    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(Subcommand, Debug)]
enum Cmd {
    /// List the algorithm catalogue
    Algorithms {
        /// Print JSON instead of a table
        #[arg(long, default_value_t = false)]
        json: bool,
    },

    /// Initialise one algorithm from a proving key and constraint system
    Init {
        /// Algorithm name or file suffix (chacha20, aes-128-ctr, aes256, ...)
        #[arg(long)]
        algorithm: Algorithm,

        /// Serialized proving key
        #[arg(long)]
        pk: PathBuf,

        /// Serialized R1CS constraint system
        #[arg(long)]
        r1cs: PathBuf,
    },

    /// Initialise every algorithm found in a circuits directory, then prove a witness
    Prove {
        /// Directory holding pk.<suffix> / r1cs.<suffix> (defaults to the config's circuits_dir)
        #[arg(long)]
        circuits: Option<PathBuf>,

        /// Witness file: plain JSON, bare base64, or {"value": "<base64>"}
        #[arg(long)]
        witness: PathBuf,

        /// Output path for the proof JSON (stdout if omitted)
        #[arg(long)]
        out: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let cfg = BridgeConfig::load(cli.config.as_deref())?;
    init_tracing(&cfg.log_filter);

    if cli.dry_run {
        warn!("dry run: using the stub engine, no real proofs are produced");
    }

    match cli.cmd {
        Cmd::Algorithms { json } => list_algorithms(json),

        Cmd::Init { algorithm, pk, r1cs } => {
            let files = CircuitFiles {
                algorithm,
                proving_key: pk,
                constraint_system: r1cs,
            };
            let report = if cli.dry_run {
                init_one(&dry_run_bridge(), &files)?
            } else {
                init_one(linked_bridge()?, &files)?
            };
            println!("{}", serde_json::to_string_pretty(&report)?);
            Ok(())
        }

        Cmd::Prove {
            circuits,
            witness,
            out,
        } => {
            let dir = circuits.unwrap_or(cfg.circuits_dir);
            let raw = fs::read_to_string(&witness)
                .with_context(|| format!("reading witness {}", witness.display()))?;
            let witness = decode_envelope(&raw)
                .with_context(|| format!("unwrapping witness {}", witness.display()))?;
            let output = if cli.dry_run {
                prove_witness(&dry_run_bridge(), &dir, &witness)?
            } else {
                prove_witness(linked_bridge()?, &dir, &witness)?
            };
            write_output(&output, out.as_deref())
        }
    }
}

/// Initialize tracing subscriber with env-based filtering, falling back to
/// the configured filter.
fn init_tracing(default_filter: &str) {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    let fmt_layer = fmt::layer().with_target(false).with_level(true).compact();

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init();
}

/// Ensure the parent directory for a file exists.
fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(dir) = path.parent() {
        if !dir.as_os_str().is_empty() {
            fs::create_dir_all(dir)
                .with_context(|| format!("creating parent directory {}", dir.display()))?;
        }
    }
    Ok(())
}

fn linked_bridge() -> Result<&'static Bridge<NativeEngine>> {
    native::shared().context("rebuild with `--features link` or pass --dry-run")
}

fn dry_run_bridge() -> Bridge<StubEngine> {
    Bridge::new(StubEngine::new().proof(StubProof::bytes(DRY_RUN_PROOF)))
}

#[derive(Serialize)]
struct CatalogueRow {
    id: AlgorithmId,
    name: &'static str,
    file_suffix: &'static str,
}

fn list_algorithms(json: bool) -> Result<()> {
    let rows: Vec<CatalogueRow> = Algorithm::ALL
        .into_iter()
        .map(|a| CatalogueRow {
            id: a.id(),
            name: a.name(),
            file_suffix: a.file_suffix(),
        })
        .collect();

    if json {
        println!("{}", serde_json::to_string_pretty(&rows)?);
    } else {
        for r in &rows {
            println!("{:>3}  {:<12} {}", r.id.raw(), r.name, r.file_suffix);
        }
    }
    Ok(())
}

fn init_one<E: Engine>(bridge: &Bridge<E>, files: &CircuitFiles) -> Result<InitReport> {
    let material = files.load()?;
    info!(
        algorithm = %files.algorithm,
        pk = %files.proving_key.display(),
        r1cs = %files.constraint_system.display(),
        "initialising"
    );

    let outcome = bridge.init_algorithm(
        files.algorithm.id(),
        &material.proving_key,
        &material.constraint_system,
    );
    if !outcome.is_ready() {
        bail!("engine rejected {} circuit (returned 0)", files.algorithm);
    }
    Ok(InitReport {
        algorithm: files.algorithm,
        status: InitStatus::Ready,
    })
}

fn prove_witness<E: Engine>(bridge: &Bridge<E>, dir: &Path, witness: &str) -> Result<ProofOutput> {
    info!(circuits = %dir.display(), "initialising algorithms");
    let reports = init_all(bridge, dir);
    if !reports.iter().any(|r| r.status == InitStatus::Ready) {
        bail!(
            "no algorithms have been initialized; circuit files may be missing from {}",
            dir.display()
        );
    }

    if let Some(cipher) = witness_cipher(witness) {
        if !bridge.is_initialized(cipher.id()) {
            warn!(%cipher, "witness targets an algorithm that is not initialised");
        }
    }

    let Some(result) = bridge.prove(witness) else {
        bail!("engine returned no result");
    };
    Ok(ProofOutput::parse(&result)?)
}

fn write_output(output: &ProofOutput, out: Option<&Path>) -> Result<()> {
    let json = serde_json::to_string_pretty(output)?;
    match out {
        Some(path) => {
            ensure_parent_dir(path)?;
            fs::write(path, json).with_context(|| format!("writing {}", path.display()))?;
            info!(out = %path.display(), "wrote proof");
        }
        None => println!("{json}"),
    }
    Ok(())
}
