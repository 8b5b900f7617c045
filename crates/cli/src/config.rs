//! `sheetjoin config` and config-file lookup shared by every command.

use std::path::{Path, PathBuf};

use clap::Subcommand;
use sheetjoin_recon::ReconConfig;

use crate::exit_codes::{recon_exit_code, EXIT_CONFIG, EXIT_USAGE};
use crate::CliError;

const CONFIG_FILE: &str = "sheetjoin.toml";

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Print the default config file location
    Path,

    /// Print the effective configuration as TOML
    #[command(after_help = "\
Examples:
  sheetjoin config show
  sheetjoin config show --config school.toml > sheetjoin.toml")]
    Show,
}

/// `<config dir>/sheetjoin/sheetjoin.toml`, if the platform has a config dir.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("sheetjoin").join(CONFIG_FILE))
}

/// Load the config: the explicit file if given (it must exist), else the
/// default location if present, else built-in defaults.
pub fn load(explicit: Option<&Path>) -> Result<ReconConfig, CliError> {
    let path = match explicit {
        Some(p) => {
            if !p.is_file() {
                return Err(CliError {
                    code: EXIT_USAGE,
                    message: format!("config file not found: {}", p.display()),
                    hint: None,
                });
            }
            p.to_path_buf()
        }
        None => match default_config_path() {
            Some(p) if p.is_file() => p,
            _ => {
                log::debug!("no config file, using defaults");
                return Ok(ReconConfig::default());
            }
        },
    };

    let text = std::fs::read_to_string(&path).map_err(|e| CliError {
        code: EXIT_CONFIG,
        message: format!("cannot read config {}: {e}", path.display()),
        hint: None,
    })?;
    let config = ReconConfig::from_toml(&text).map_err(|e| CliError {
        code: recon_exit_code(&e),
        message: format!("{}: {e}", path.display()),
        hint: None,
    })?;
    log::info!("loaded config from {}", path.display());
    Ok(config)
}

pub fn cmd_config(cmd: ConfigCommands, explicit: Option<&Path>) -> Result<(), CliError> {
    match cmd {
        ConfigCommands::Path => {
            let path = default_config_path().ok_or_else(|| CliError {
                code: EXIT_USAGE,
                message: "no config directory on this platform".into(),
                hint: Some("pass --config PATH instead".into()),
            })?;
            println!("{}", path.display());
            if !path.is_file() {
                eprintln!("(not present; built-in defaults apply)");
            }
            Ok(())
        }
        ConfigCommands::Show => {
            let config = load(explicit)?;
            let text = config.to_toml().map_err(|e| CliError {
                code: recon_exit_code(&e),
                message: e.to_string(),
                hint: None,
            })?;
            print!("{text}");
            Ok(())
        }
    }
}
