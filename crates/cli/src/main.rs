// pscreen - wastewater permit roster screening (headless)

mod diff;
mod enrich;
mod exit_codes;
mod export;
mod runs;
mod screen;
mod validate;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueEnum};

use exit_codes::{
    lookup_exit_code, screen_exit_code, store_exit_code, EXIT_SUCCESS, EXIT_USAGE,
};

#[derive(Parser)]
#[command(name = "pscreen")]
#[command(about = "Screen permitted wastewater rosters for non-treatment facilities")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse and validate a screening config
    #[command(after_help = "\
Examples:
  pscreen validate screen.toml")]
    Validate {
        /// Config file (TOML)
        config: PathBuf,
    },

    /// Look up codes for every roster facility and snapshot the result
    #[command(after_help = "\
The code source is the registry CSV or remote endpoint from the config's
[lookup] section; --registry / --endpoint override it.

Examples:
  pscreen enrich screen.toml --label baseline
  pscreen enrich screen.toml --label baseline --registry sic_registry.csv
  pscreen enrich screen.toml --label q3 --endpoint https://registry.example.gov --api-key $KEY
  pscreen enrich screen.toml --label q3 --workers 8 --quiet")]
    Enrich {
        /// Config file (TOML)
        config: PathBuf,

        /// Label for the enrichment snapshot
        #[arg(long)]
        label: String,

        /// Snapshot store path
        #[arg(long, env = "PSCREEN_STORE", default_value = "pscreen.db")]
        store: PathBuf,

        /// Registry CSV (overrides config)
        #[arg(long)]
        registry: Option<PathBuf>,

        /// Remote registry endpoint (overrides config)
        #[arg(long)]
        endpoint: Option<String>,

        /// Remote registry API key
        #[arg(long, env = "PSCREEN_API_KEY", hide_env_values = true)]
        api_key: Option<String>,

        /// Concurrent lookup workers (overrides config)
        #[arg(long)]
        workers: Option<usize>,

        /// Suppress stderr progress
        #[arg(long, short = 'q')]
        quiet: bool,
    },

    /// Run the retention rules over an enrichment snapshot
    #[command(after_help = "\
Examples:
  pscreen screen screen.toml --enrichment baseline --label weekly
  pscreen screen screen.toml --enrichment baseline --label weekly --out candidates.csv
  pscreen screen screen.toml --enrichment baseline --label weekly --review review.csv
  pscreen screen screen.toml --enrichment baseline --label weekly --json")]
    Screen {
        /// Config file (TOML)
        config: PathBuf,

        /// Enrichment snapshot to screen
        #[arg(long)]
        enrichment: String,

        /// Label for the screen snapshot
        #[arg(long)]
        label: String,

        /// Snapshot store path
        #[arg(long, env = "PSCREEN_STORE", default_value = "pscreen.db")]
        store: PathBuf,

        /// Review mapping CSV (overrides config)
        #[arg(long)]
        review: Option<PathBuf>,

        /// Write removal candidates to this CSV
        #[arg(long, short = 'o')]
        out: Option<PathBuf>,

        /// Print the summary as JSON on stdout
        #[arg(long)]
        json: bool,

        /// Suppress stderr summary
        #[arg(long, short = 'q')]
        quiet: bool,
    },

    /// Reconcile two screen runs (exit 0 = identical candidates, exit 1 = differences)
    #[command(after_help = "\
Exit code 1 indicates the candidate lists differ. Facilities are compared
by their roster fields only; looked-up codes and verdicts may change
between enrichment snapshots without counting as differences.

Examples:
  pscreen diff weekly-old weekly-new
  pscreen diff original revised --out csv --output divergence.csv")]
    Diff {
        /// Baseline screen snapshot label
        left: String,

        /// Comparison screen snapshot label
        right: String,

        /// Snapshot store path
        #[arg(long, env = "PSCREEN_STORE", default_value = "pscreen.db")]
        store: PathBuf,

        /// Output format
        #[arg(long, alias = "format", default_value = "json")]
        out: DiffOutputFormat,

        /// Output file (default: stdout)
        #[arg(long)]
        output: Option<PathBuf>,

        /// Suppress stderr summary
        #[arg(long, short = 'q')]
        quiet: bool,
    },

    /// Export a screen snapshot to CSV
    #[command(after_help = "\
Examples:
  pscreen export weekly
  pscreen export weekly --set retained --output retained.csv
  pscreen export weekly --delimiter $'\\t' --output candidates.tsv")]
    Export {
        /// Screen snapshot label
        label: String,

        /// Snapshot store path
        #[arg(long, env = "PSCREEN_STORE", default_value = "pscreen.db")]
        store: PathBuf,

        /// Which facilities to export
        #[arg(long, default_value = "candidates")]
        set: ExportSet,

        /// Field delimiter
        #[arg(long, default_value = ",")]
        delimiter: char,

        /// Output file (default: stdout)
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,
    },

    /// List snapshots in the store
    Runs {
        /// Snapshot store path
        #[arg(long, env = "PSCREEN_STORE", default_value = "pscreen.db")]
        store: PathBuf,

        /// Machine-readable output
        #[arg(long)]
        json: bool,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum DiffOutputFormat {
    Json,
    Csv,
}

#[derive(Clone, Copy, ValueEnum)]
enum ExportSet {
    Candidates,
    Retained,
    All,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Validate { config } => validate::cmd_validate(config),
        Commands::Enrich {
            config,
            label,
            store,
            registry,
            endpoint,
            api_key,
            workers,
            quiet,
        } => enrich::cmd_enrich(config, label, store, registry, endpoint, api_key, workers, quiet),
        Commands::Screen {
            config,
            enrichment,
            label,
            store,
            review,
            out,
            json,
            quiet,
        } => screen::cmd_screen(config, enrichment, label, store, review, out, json, quiet),
        Commands::Diff {
            left,
            right,
            store,
            out,
            output,
            quiet,
        } => diff::cmd_diff(left, right, store, out, output, quiet),
        Commands::Export {
            label,
            store,
            set,
            delimiter,
            output,
        } => export::cmd_export(label, store, set, delimiter, output),
        Commands::Runs { store, json } => runs::cmd_runs(store, json),
    };

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(CliError { code, message, hint }) => {
            if !message.is_empty() {
                eprintln!("error: {}", message);
            }
            if let Some(hint) = hint {
                eprintln!("hint:  {}", hint);
            }
            ExitCode::from(code)
        }
    }
}

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    pub fn args(msg: impl Into<String>) -> Self {
        Self { code: EXIT_USAGE, message: msg.into(), hint: None }
    }

    pub fn exit(code: u8) -> Self {
        Self { code, message: String::new(), hint: None }
    }
}

impl From<permitscreen_engine::ScreenError> for CliError {
    fn from(err: permitscreen_engine::ScreenError) -> Self {
        Self {
            code: screen_exit_code(&err),
            message: err.to_string(),
            hint: None,
        }
    }
}

impl From<permitscreen_io::StoreError> for CliError {
    fn from(err: permitscreen_io::StoreError) -> Self {
        let hint = match &err {
            permitscreen_io::StoreError::UnknownLabel { .. } => {
                Some("run `pscreen runs` to list available snapshots".to_string())
            }
            _ => None,
        };
        Self {
            code: store_exit_code(&err),
            message: err.to_string(),
            hint,
        }
    }
}

impl From<permitscreen_lookup::LookupError> for CliError {
    fn from(err: permitscreen_lookup::LookupError) -> Self {
        Self {
            code: lookup_exit_code(&err),
            message: err.to_string(),
            hint: None,
        }
    }
}
