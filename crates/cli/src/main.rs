// sheetjoin CLI - join roster exports with answer-sheet exports

mod config;
mod exit_codes;
mod run;
mod scan;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{ArgAction, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use exit_codes::{EXIT_SUCCESS, EXIT_USAGE};

#[derive(Parser)]
#[command(name = "sheetjoin")]
#[command(about = "Reconcile class rosters with scanned answer sheets")]
#[command(version)]
struct Cli {
    /// Config file (default: <config dir>/sheetjoin/sheetjoin.toml if present)
    #[arg(long, global = true, env = "SHEETJOIN_CONFIG", value_name = "FILE")]
    config: Option<PathBuf>,

    /// More log output on stderr (-v info, -vv debug). RUST_LOG overrides.
    #[arg(long, short = 'v', global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Discover exports, reconcile them and write the results workbook
    #[command(after_help = "\
Examples:
  sheetjoin run
  sheetjoin run ./exports --out-dir ./results
  sheetjoin run --roster nomes_8º.txt --answers respostas_8º.txt --no-export --json
  sheetjoin run ./exports --csv matched.csv --strict
  sheetjoin run ./exports --tsv matched.tsv --report report.json")]
    Run(run::RunArgs),

    /// Parse one export and list what was recognized
    #[command(subcommand)]
    Scan(scan::ScanCommands),

    /// Show the grade a file name maps to
    #[command(after_help = "\
Examples:
  sheetjoin classify nomes_8º.txt respostas_1ª_serie.txt")]
    Classify {
        #[arg(required = true)]
        names: Vec<String>,
    },

    /// Inspect configuration
    #[command(subcommand)]
    Config(config::ConfigCommands),
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
}

fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    // keep an already-installed subscriber
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config_path = cli.config.as_deref();
    let result = match cli.command {
        None => {
            eprintln!("Usage: sheetjoin <command> [options]");
            eprintln!("       sheetjoin --help for more information");
            Err(CliError::args(""))
        }
        Some(Commands::Run(args)) => config::load(config_path).and_then(|c| run::cmd_run(args, c)),
        Some(Commands::Scan(cmd)) => config::load(config_path).and_then(|c| scan::cmd_scan(cmd, c)),
        Some(Commands::Classify { names }) => scan::cmd_classify(names),
        Some(Commands::Config(cmd)) => config::cmd_config(cmd, config_path),
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
