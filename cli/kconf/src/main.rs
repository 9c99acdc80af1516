//! kconf CLI: resolve tristate feature configuration schemas.

mod commands;
mod manifest;

use std::path::{Path, PathBuf};
use std::process;

use clap::{ArgAction, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::{Format, OverrideSources};
use manifest::KconfManifest;

#[derive(Parser)]
#[command(name = "kconf", version, about = "Resolve tristate feature configuration schemas")]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve the schema and print the resulting configuration
    Resolve {
        /// Schema file (default: [schema] path in kconf.toml)
        #[arg(long)]
        schema: Option<PathBuf>,
        /// Manifest variant whose overrides apply first
        #[arg(long)]
        variant: Option<String>,
        /// Override file (.toml or .json), may be repeated
        #[arg(long = "overrides")]
        overrides: Vec<PathBuf>,
        /// Single override NAME=VALUE, may be repeated
        #[arg(long = "set")]
        set: Vec<String>,
        /// Output format (text, json)
        #[arg(long)]
        format: Option<String>,
        /// Fail if any diagnostic is reported
        #[arg(long)]
        strict: bool,
    },
    /// Validate the schema and resolve it without overrides
    Check {
        /// Schema file (default: [schema] path in kconf.toml)
        #[arg(long)]
        schema: Option<PathBuf>,
    },
    /// Explain how an option got its value
    Explain {
        /// Option name
        name: String,
        /// Schema file (default: [schema] path in kconf.toml)
        #[arg(long)]
        schema: Option<PathBuf>,
        /// Manifest variant whose overrides apply first
        #[arg(long)]
        variant: Option<String>,
        /// Override file (.toml or .json), may be repeated
        #[arg(long = "overrides")]
        overrides: Vec<PathBuf>,
        /// Single override NAME=VALUE, may be repeated
        #[arg(long = "set")]
        set: Vec<String>,
    },
    /// Resolve every variant defined in kconf.toml
    Variants {
        /// Schema file (default: [schema] path in kconf.toml)
        #[arg(long)]
        schema: Option<PathBuf>,
        /// Output format (text, json)
        #[arg(long)]
        format: Option<String>,
    },
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = run(cli);
    if let Err(e) = result {
        eprintln!("error: {e:#}");
        process::exit(1);
    }
}

/// Log to stderr so results on stdout stay machine-readable. `RUST_LOG`
/// wins over `-v`.
fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)))
        .with_writer(std::io::stderr)
        .without_time()
        .init();
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let cwd = std::env::current_dir()?;
    let (manifest, project_dir) = load_manifest_optional(&cwd)?;
    let project_dir = project_dir.unwrap_or(cwd);

    match cli.command {
        Commands::Resolve {
            schema,
            variant,
            overrides,
            set,
            format,
            strict,
        } => {
            let sources = OverrideSources {
                variant: variant.as_deref(),
                files: &overrides,
                assignments: &set,
            };
            commands::resolve::run(
                &project_dir,
                manifest.as_ref(),
                schema.as_deref(),
                &sources,
                Format::parse(format.as_deref())?,
                strict,
            )
        }

        Commands::Check { schema } => {
            commands::check::run(&project_dir, manifest.as_ref(), schema.as_deref())
        }

        Commands::Explain {
            name,
            schema,
            variant,
            overrides,
            set,
        } => {
            let sources = OverrideSources {
                variant: variant.as_deref(),
                files: &overrides,
                assignments: &set,
            };
            commands::explain::run(
                &project_dir,
                manifest.as_ref(),
                schema.as_deref(),
                &sources,
                &name,
            )
        }

        Commands::Variants { schema, format } => {
            let Some(manifest) = manifest else {
                anyhow::bail!("no kconf.toml found; variants are defined there");
            };
            commands::variants::run(
                &project_dir,
                &manifest,
                schema.as_deref(),
                Format::parse(format.as_deref())?,
            )
        }
    }
}

/// Try to load a manifest from the current directory upward. Returns (None, None) if not found.
fn load_manifest_optional(cwd: &Path) -> anyhow::Result<(Option<KconfManifest>, Option<PathBuf>)> {
    match KconfManifest::find_and_load(cwd)? {
        Some((manifest, dir)) => Ok((Some(manifest), Some(dir))),
        None => Ok((None, None)),
    }
}
