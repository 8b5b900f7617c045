//! `sheetjoin scan` and `sheetjoin classify`: inspect single inputs without
//! reconciling.

use std::path::{Path, PathBuf};

use clap::Subcommand;
use sheetjoin_recon::answers::AnswerRules;
use sheetjoin_recon::engine::{scan_answer_file, scan_roster_file};
use sheetjoin_recon::roster::RosterRules;
use sheetjoin_recon::{classify, ReconConfig, ReconError};

use crate::exit_codes::{recon_exit_code, EXIT_ERROR};
use crate::CliError;

#[derive(Subcommand)]
pub enum ScanCommands {
    /// Parse a roster export and list the student records found
    #[command(after_help = "\
Examples:
  sheetjoin scan roster nomes_8º.txt
  sheetjoin scan roster nomes_8º.txt --json")]
    Roster {
        file: PathBuf,

        /// Output JSON to stdout instead of a tab-separated listing
        #[arg(long)]
        json: bool,
    },

    /// Parse an answer-sheet export and list the cards found
    #[command(after_help = "\
Examples:
  sheetjoin scan answers respostas_8º.txt
  sheetjoin scan answers respostas_8º.txt --max-slots 90 --json")]
    Answers {
        file: PathBuf,

        /// Output JSON to stdout instead of a tab-separated listing
        #[arg(long)]
        json: bool,

        /// Slot array width (overrides the config file)
        #[arg(long)]
        max_slots: Option<usize>,
    },
}

fn engine_err(e: ReconError) -> CliError {
    CliError { code: recon_exit_code(&e), message: e.to_string(), hint: None }
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<String, CliError> {
    serde_json::to_string_pretty(value).map_err(|e| CliError {
        code: EXIT_ERROR,
        message: format!("JSON serialization error: {e}"),
        hint: None,
    })
}

pub fn cmd_scan(cmd: ScanCommands, mut config: ReconConfig) -> Result<(), CliError> {
    match cmd {
        ScanCommands::Roster { file, json } => scan_roster(&file, json, &config),
        ScanCommands::Answers { file, json, max_slots } => {
            if let Some(n) = max_slots {
                config.answers.max_slots = n;
                config.validate().map_err(engine_err)?;
            }
            scan_answers(&file, json, &config)
        }
    }
}

fn scan_roster(file: &Path, json: bool, config: &ReconConfig) -> Result<(), CliError> {
    let rules = RosterRules::from_config(&config.roster).map_err(engine_err)?;
    let records = scan_roster_file(&rules, file).map_err(engine_err)?;

    if json {
        println!("{}", to_json(&records)?);
    } else {
        let unidentified = &config.roster.unidentified_room;
        for r in &records {
            println!(
                "{}\t{}\t{}\t{}\t{}",
                r.id_raw,
                r.id_key,
                r.room_label(unidentified),
                r.grade,
                r.name
            );
        }
    }

    eprintln!(
        "{}: {} roster records ({})",
        file.display(),
        records.len(),
        classify(&file.display().to_string())
    );
    Ok(())
}

fn scan_answers(file: &Path, json: bool, config: &ReconConfig) -> Result<(), CliError> {
    let rules = AnswerRules::from_config(&config.answers).map_err(engine_err)?;
    let scan = scan_answer_file(&rules, file).map_err(engine_err)?;

    if json {
        println!("{}", to_json(&scan.records)?);
    } else {
        for a in &scan.records {
            println!("{}\t{}\t{}\t{}\t{}", a.id_raw, a.id_key, a.grade, a.total_marks, a.answers);
        }
    }

    eprintln!(
        "{}: {} answer records ({})",
        file.display(),
        scan.records.len(),
        classify(&file.display().to_string())
    );
    if scan.slot_overflows > 0 {
        eprintln!(
            "warning: {} answer run(s) longer than {} slots were truncated",
            scan.slot_overflows,
            rules.max_slots()
        );
    }
    Ok(())
}

/// Print the grade each file name classifies to.
pub fn cmd_classify(names: Vec<String>) -> Result<(), CliError> {
    for name in names {
        println!("{}\t{}", name, classify(&name));
    }
    Ok(())
}
