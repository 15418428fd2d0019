//! Knapsnack CLI - check manifests, run the intake wizard and inspect saved
//! progress.

#![allow(
    clippy::needless_pass_by_value,
    clippy::missing_errors_doc,
    clippy::doc_markdown
)]

mod file_slot;
mod prompt;

use clap::{Args, Parser, Subcommand};
use file_slot::FileSlot;
use knapsnack::IntakeSession;
use knapsnack_core::{LoadOutcome, PersistenceStore};
use knapsnack_yaml::Manifest;
use prompt::Outcome;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "knapsnack")]
#[command(about = "Knapsnack intake wizard CLI")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check YAML manifest validity
    Check {
        /// Path to manifest file
        #[arg(default_value = "intake.yaml")]
        manifest: PathBuf,
    },

    /// Run the intake wizard in the terminal, resuming saved progress
    Run {
        #[command(flatten)]
        state: StateArgs,
    },

    /// Print the saved snapshot
    Show {
        #[command(flatten)]
        state: StateArgs,
    },

    /// Delete the saved snapshot
    Reset {
        #[command(flatten)]
        state: StateArgs,
    },
}

#[derive(Args)]
struct StateArgs {
    /// Manifest describing the wizard (default: the standard intake)
    #[arg(short, long, env = "KNAPSNACK_MANIFEST")]
    manifest: Option<PathBuf>,

    /// Directory holding saved progress
    #[arg(short, long, env = "KNAPSNACK_STATE_DIR", default_value = ".knapsnack")]
    state_dir: PathBuf,
}

fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "knapsnack=info,knapsnack_core=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Check { manifest } => {
            check_manifest(&manifest);
        }
        Commands::Run { state } => {
            run_wizard(&state);
        }
        Commands::Show { state } => {
            show_snapshot(&state);
        }
        Commands::Reset { state } => {
            reset_snapshot(&state);
        }
    }
}

fn read_manifest(path: &Path) -> Manifest {
    let content = match fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to read manifest: {e}");
            std::process::exit(1);
        }
    };

    match Manifest::from_yaml(&content) {
        Ok(manifest) => manifest,
        Err(e) => {
            eprintln!("Manifest invalid: {e}");
            std::process::exit(1);
        }
    }
}

fn load_manifest(state: &StateArgs) -> Manifest {
    match &state.manifest {
        Some(path) => {
            debug!(path = %path.display(), "loading manifest");
            read_manifest(path)
        }
        None => Manifest::standard(),
    }
}

fn check_manifest(path: &Path) {
    println!("Checking manifest: {}", path.display());

    let manifest = read_manifest(path);
    if let Err(e) = manifest.catalog() {
        eprintln!("Manifest invalid: {e}");
        std::process::exit(1);
    }

    println!("Manifest valid!");
    println!("  Version: {}", manifest.knapsnack);
    println!("  Storage key: {}", manifest.storage_key);
    println!(
        "  Limits: age {}-{}, weight {}-{} kg, height {}-{} cm",
        manifest.limits.age.min,
        manifest.limits.age.max,
        manifest.limits.weight.min,
        manifest.limits.weight.max,
        manifest.limits.height.min,
        manifest.limits.height.max
    );
    println!("  Steps: {}", manifest.steps.len());
    for (i, step) in manifest.steps.iter().enumerate() {
        let validator = step
            .validate
            .as_ref()
            .and_then(|v| serde_json::to_value(v).ok())
            .and_then(|v| v["type"].as_str().map(str::to_string))
            .unwrap_or_else(|| "-".to_string());
        println!("    {}. {} [{}] {}", i + 1, step.field, validator, step.title);
    }
}

fn run_wizard(state: &StateArgs) {
    let manifest = load_manifest(state);
    let slot = FileSlot::new(&state.state_dir);
    debug!(dir = %slot.dir().display(), key = %manifest.storage_key, "using state directory");
    let mut session = match IntakeSession::from_manifest(&manifest, slot) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Manifest invalid: {e}");
            std::process::exit(1);
        }
    };

    let stdin = io::stdin();
    match prompt::run(&mut session, stdin.lock(), io::stdout()) {
        Ok(Outcome::Submitted(form)) => {
            info!(state_dir = %state.state_dir.display(), "intake submitted");
            match serde_json::to_string_pretty(&form) {
                Ok(json) => println!("{json}"),
                Err(e) => {
                    eprintln!("Failed to encode form: {e}");
                    std::process::exit(1);
                }
            }
        }
        Ok(Outcome::Stopped) => {}
        Err(e) => {
            eprintln!("Terminal I/O failed: {e}");
            std::process::exit(1);
        }
    }
}

fn show_snapshot(state: &StateArgs) {
    let manifest = load_manifest(state);
    let store = PersistenceStore::with_key(FileSlot::new(&state.state_dir), manifest.storage_key);
    match store.load() {
        LoadOutcome::Snapshot(snapshot) => match serde_json::to_string_pretty(&snapshot) {
            Ok(json) => println!("{json}"),
            Err(e) => {
                eprintln!("Failed to encode snapshot: {e}");
                std::process::exit(1);
            }
        },
        LoadOutcome::Absent(reason) => {
            println!(
                "No saved progress in {} ({reason:?})",
                store.slot().path_for(store.key()).display()
            );
        }
    }
}

fn reset_snapshot(state: &StateArgs) {
    let manifest = load_manifest(state);
    let store = PersistenceStore::with_key(FileSlot::new(&state.state_dir), manifest.storage_key);
    if store.clear() {
        println!("Saved progress cleared.");
    } else {
        eprintln!(
            "Failed to clear {}",
            store.slot().path_for(store.key()).display()
        );
        std::process::exit(1);
    }
}
