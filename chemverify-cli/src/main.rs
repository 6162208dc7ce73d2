//! `chemverify`: the CLI front end over `chemverify-core`. Owns every
//! piece of I/O the core itself refuses to do: argument parsing, file
//! reading, policy-file loading, output formatting, and process exit
//! codes.

mod policy_loader;
mod run_store;
mod sarif;

use anyhow::{Context, Result};
use chemverify_core::model::Severity;
use chemverify_core::{verify_text, verify_text_with_policy, AuditArtifact};
use clap::{Parser, Subcommand, ValueEnum};
use run_store::RunStore;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

const DEFAULT_PROFILE_NAME: &str = "Default";
const DEFAULT_MAX_INPUT_CHARS: usize = 500_000;
const POLICIES_DIR: &str = "./policies";

#[derive(Parser)]
#[command(name = "chemverify")]
#[command(about = "Deterministic verification engine for chemistry procedural text")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyzes a text file and reports findings, risk score, and verdict.
    Analyze {
        /// Path to the file containing the text to analyze.
        path: PathBuf,

        #[arg(long, default_value = "Default")]
        profile: String,

        #[arg(long, value_enum, default_value = "json")]
        format: OutputFormat,

        /// Destination file; stdout if omitted.
        #[arg(long)]
        out: Option<PathBuf>,

        #[arg(long, default_value_t = DEFAULT_MAX_INPUT_CHARS)]
        max_input_chars: usize,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    Json,
    Sarif,
}

/// Exit codes (§6): 0 OK/Low, 1 Warning/Medium, 2 RiskHigh/High-Critical,
/// 3 EngineError.
const EXIT_OK: i32 = 0;
const EXIT_WARNING: i32 = 1;
const EXIT_RISK_HIGH: i32 = 2;
const EXIT_ENGINE_ERROR: i32 = 3;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .compact()
        .init();

    let cli = Cli::parse();
    let Commands::Analyze {
        path,
        profile,
        format,
        out,
        max_input_chars,
    } = cli.command;

    std::process::exit(run_analyze(&path, &profile, format, out.as_deref(), max_input_chars));
}

fn run_analyze(
    path: &Path,
    profile: &str,
    format: OutputFormat,
    out: Option<&Path>,
    max_input_chars: usize,
) -> i32 {
    let text = match std::fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            eprintln!("file not found");
            return EXIT_ENGINE_ERROR;
        }
        Err(err) => {
            eprintln!("failed to read {}: {err}", path.display());
            return EXIT_ENGINE_ERROR;
        }
    };

    if text.chars().count() > max_input_chars {
        eprintln!(
            "input exceeds --max-input-chars limit ({} > {})",
            text.chars().count(),
            max_input_chars
        );
        return EXIT_ENGINE_ERROR;
    }

    let artifact = match analyze(&text, profile) {
        Ok(artifact) => artifact,
        Err(err) => {
            eprintln!("{err:#}");
            return EXIT_ENGINE_ERROR;
        }
    };

    // Routed through the in-memory store so a persisted run can later be
    // looked up by id the same way a CLI-adjacent service would, rather
    // than `--out` being a bare file dump.
    let severity = artifact.report.severity;
    let mut store = RunStore::new();
    let run_id = store.insert(artifact);
    let stored = store.get(run_id).expect("just inserted");

    let rendered = match format {
        OutputFormat::Json => {
            serde_json::to_string_pretty(stored).expect("AuditArtifact is always serializable")
        }
        OutputFormat::Sarif => serde_json::to_string_pretty(&sarif::render(stored))
            .expect("SARIF document is always serializable"),
    };

    match out {
        Some(path) => {
            if let Err(err) = std::fs::write(path, &rendered) {
                eprintln!("failed to write {}: {err}", path.display());
                return EXIT_ENGINE_ERROR;
            }
        }
        None => println!("{rendered}"),
    }

    exit_code_for(severity)
}

fn analyze(text: &str, profile: &str) -> Result<AuditArtifact> {
    debug!(profile, "resolving policy profile");
    if profile == DEFAULT_PROFILE_NAME {
        info!("running analysis under the default policy");
        return Ok(verify_text(text, None));
    }

    let policies_dir = PathBuf::from(POLICIES_DIR);
    let policy = policy_loader::resolve(&policies_dir, Some(profile))
        .with_context(|| format!("resolving policy profile '{profile}'"))?;
    info!(profile, "running analysis under a named policy profile");
    Ok(verify_text_with_policy(text, profile, &policy))
}

fn exit_code_for(severity: Severity) -> i32 {
    match severity {
        Severity::Low => EXIT_OK,
        Severity::Medium => EXIT_WARNING,
        Severity::High | Severity::Critical => EXIT_RISK_HIGH,
    }
}
