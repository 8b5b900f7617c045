//! `sheetjoin run`: discover, reconcile, export.

use std::path::{Path, PathBuf};

use clap::Args;
use sheetjoin_io::{csv, discover, json, table, xlsx};
use sheetjoin_recon::evidence::grade_counts;
use sheetjoin_recon::model::{RunReport, SourceKind};
use sheetjoin_recon::{ReconConfig, ReconError, SourceSet};

use crate::exit_codes::{recon_exit_code, EXIT_CONFIG, EXIT_EXPORT, EXIT_NO_FILES, EXIT_STRICT};
use crate::CliError;

#[derive(Args)]
pub struct RunArgs {
    /// Directory searched for roster and answer exports
    #[arg(default_value = ".")]
    pub dir: PathBuf,

    /// Roster file (repeatable). Skips roster discovery.
    #[arg(long = "roster", value_name = "FILE")]
    pub roster: Vec<PathBuf>,

    /// Answer-sheet file (repeatable). Skips answer discovery.
    #[arg(long = "answers", value_name = "FILE")]
    pub answers: Vec<PathBuf>,

    /// Directory the workbook is written to (overrides the config file)
    #[arg(long, value_name = "DIR")]
    pub out_dir: Option<PathBuf>,

    /// Exact workbook path (overrides --out-dir and the timestamped name)
    #[arg(long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Also write the matched table as CSV
    #[arg(long, value_name = "FILE")]
    pub csv: Option<PathBuf>,

    /// Also write the matched table as tab-separated text
    #[arg(long, value_name = "FILE")]
    pub tsv: Option<PathBuf>,

    /// Print the full run report as JSON to stdout
    #[arg(long)]
    pub json: bool,

    /// Write the full run report as JSON to a file
    #[arg(long, value_name = "FILE")]
    pub report: Option<PathBuf>,

    /// Slot array width (overrides the config file)
    #[arg(long, value_name = "N")]
    pub max_slots: Option<usize>,

    /// Fail (exit 8) if any file was unreadable or any answer run was truncated
    #[arg(long)]
    pub strict: bool,

    /// Reconcile and report, but write no workbook
    #[arg(long)]
    pub no_export: bool,

    /// Suppress the human summary on stderr
    #[arg(long, short = 'q')]
    pub quiet: bool,
}

fn engine_err(e: ReconError) -> CliError {
    let hint = match &e {
        ReconError::NoFilesFound { kind: SourceKind::Roster } => {
            Some("roster exports are found as nomes*.txt; or pass --roster FILE".to_string())
        }
        ReconError::NoFilesFound { kind: SourceKind::Answers } => {
            Some("answer exports are found as respostas*.txt; or pass --answers FILE".to_string())
        }
        ReconError::NoMatches { .. } => {
            Some("check that both exports come from the same class list".to_string())
        }
        _ => None,
    };
    CliError { code: recon_exit_code(&e), message: e.to_string(), hint }
}

fn export_err(msg: impl Into<String>) -> CliError {
    CliError { code: EXIT_EXPORT, message: msg.into(), hint: None }
}

pub fn cmd_run(args: RunArgs, mut config: ReconConfig) -> Result<(), CliError> {
    if let Some(n) = args.max_slots {
        config.answers.max_slots = n;
    }
    if let Some(dir) = &args.out_dir {
        config.output.dir = Some(dir.display().to_string());
    }
    config.validate().map_err(engine_err)?;

    let sources = resolve_sources(&args, &config)?;
    if !args.quiet {
        print_sources(&sources);
    }

    let report = sheetjoin_recon::run(&config, &sources).map_err(engine_err)?;
    let unidentified = config.roster.unidentified_room.as_str();

    if !args.quiet {
        print_summary(&report, &config);
    }

    if !args.no_export {
        let path = workbook_path(&args, &config)?;
        let result = xlsx::export(&report, unidentified, &path).map_err(export_err)?;
        if !args.quiet {
            eprintln!("wrote {} ({})", path.display(), result.summary());
        }
    }

    if args.csv.is_some() || args.tsv.is_some() {
        let matched = table::matched_table(&report, unidentified);
        if let Some(path) = &args.csv {
            csv::export(&matched, path).map_err(export_err)?;
            if !args.quiet {
                eprintln!("wrote {}", path.display());
            }
        }
        if let Some(path) = &args.tsv {
            csv::export_tsv(&matched, path).map_err(export_err)?;
            if !args.quiet {
                eprintln!("wrote {}", path.display());
            }
        }
    }

    if let Some(path) = &args.report {
        json::export(&report, path).map_err(export_err)?;
        if !args.quiet {
            eprintln!("wrote {}", path.display());
        }
    }

    if args.json {
        json::write(&report, std::io::stdout().lock()).map_err(export_err)?;
    }

    if args.strict && (!report.issues.is_empty() || report.slot_overflows > 0) {
        return Err(CliError {
            code: EXIT_STRICT,
            message: format!(
                "strict: {} unreadable file(s), {} truncated answer run(s)",
                report.issues.len(),
                report.slot_overflows
            ),
            hint: None,
        });
    }

    Ok(())
}

/// Explicit file lists win per kind; the other kind is discovered under `dir`.
fn resolve_sources(args: &RunArgs, config: &ReconConfig) -> Result<SourceSet, CliError> {
    if !args.roster.is_empty() && !args.answers.is_empty() {
        return Ok(SourceSet::new(args.roster.clone(), args.answers.clone()));
    }

    if !args.dir.is_dir() {
        return Err(CliError {
            code: EXIT_NO_FILES,
            message: format!("not a directory: {}", args.dir.display()),
            hint: None,
        });
    }

    let found = discover::discover(&args.dir, &config.discovery)
        .map_err(|e| CliError { code: EXIT_CONFIG, message: e, hint: None })?;

    let roster = if args.roster.is_empty() { found.roster_files } else { args.roster.clone() };
    let answers = if args.answers.is_empty() { found.answer_files } else { args.answers.clone() };
    Ok(SourceSet::new(roster, answers))
}

fn workbook_path(args: &RunArgs, config: &ReconConfig) -> Result<PathBuf, CliError> {
    if let Some(path) = &args.output {
        return Ok(path.clone());
    }

    let dir = config.output.dir.as_deref().map(Path::new).unwrap_or(Path::new("."));
    if !dir.exists() {
        std::fs::create_dir_all(dir)
            .map_err(|e| export_err(format!("cannot create {}: {e}", dir.display())))?;
    }
    Ok(dir.join(xlsx::file_name(&config.output.prefix, chrono::Local::now())))
}

fn print_sources(sources: &SourceSet) {
    eprintln!("roster files ({}):", sources.roster_files.len());
    for p in &sources.roster_files {
        eprintln!("  {}", p.display());
    }
    eprintln!("answer files ({}):", sources.answer_files.len());
    for p in &sources.answer_files {
        eprintln!("  {}", p.display());
    }
}

fn print_summary(report: &RunReport, config: &ReconConfig) {
    for f in &report.files {
        eprintln!("  {} [{}]: {} {} records", f.path, f.grade, f.records, f.kind);
    }
    for issue in &report.issues {
        eprintln!("  skipped {}: {}", issue.path, issue.reason);
    }

    if !report.roster_rooms.is_empty() {
        let rooms: Vec<String> = report
            .roster_rooms
            .iter()
            .map(|(room, n)| format!("{room} ({n})"))
            .collect();
        eprintln!("rooms: {}", rooms.join(", "));
    }

    if let Some(l) = &report.answer_lengths {
        eprintln!("answer runs: min {}, max {}, mean {:.1}", l.min, l.max, l.mean);
    }
    if report.slot_overflows > 0 {
        eprintln!(
            "warning: {} answer run(s) longer than {} slots were truncated",
            report.slot_overflows, config.answers.max_slots
        );
    }

    let grades: Vec<String> = grade_counts(&report.outcome.matched)
        .into_iter()
        .map(|(grade, n)| format!("{grade} ({n})"))
        .collect();
    if !grades.is_empty() {
        eprintln!("matched by grade: {}", grades.join(", "));
    }

    let s = &report.outcome.stats;
    eprintln!(
        "{} roster / {} answer records: {} matched, {} roster only, {} answers only ({:.1}% matched)",
        s.roster_count,
        s.answers_count,
        s.matched,
        s.roster_only,
        s.answers_only,
        s.match_rate_percent(),
    );
}
