use std::path::{Path, PathBuf};

use crate::answers::{scan_answers_with, AnswerRules, AnswerScan};
use crate::config::ReconConfig;
use crate::error::ReconError;
use crate::evidence::{length_stats, roster_room_counts};
use crate::matcher::reconcile;
use crate::model::{FileIssue, FileSummary, ReconMeta, RosterRecord, RunReport, SourceKind};
use crate::roster::{scan_roster_with, RosterRules};
use crate::series::classify;

/// Input files for one run, each list sorted and de-duplicated.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceSet {
    pub roster_files: Vec<PathBuf>,
    pub answer_files: Vec<PathBuf>,
}

impl SourceSet {
    pub fn new(mut roster_files: Vec<PathBuf>, mut answer_files: Vec<PathBuf>) -> Self {
        roster_files.sort();
        roster_files.dedup();
        answer_files.sort();
        answer_files.dedup();
        Self {
            roster_files,
            answer_files,
        }
    }
}

/// Read a whole export as UTF-8. A leading byte-order mark is dropped.
pub fn read_source(path: &Path) -> Result<String, ReconError> {
    let text = std::fs::read_to_string(path).map_err(|e| ReconError::FileUnreadable {
        path: path.display().to_string(),
        reason: e.to_string(),
    })?;
    Ok(match text.strip_prefix('\u{feff}') {
        Some(rest) => rest.to_string(),
        None => text,
    })
}

pub fn scan_roster_file(rules: &RosterRules, path: &Path) -> Result<Vec<RosterRecord>, ReconError> {
    let text = read_source(path)?;
    Ok(scan_roster_with(rules, text.lines(), &path.display().to_string()))
}

pub fn scan_answer_file(rules: &AnswerRules, path: &Path) -> Result<AnswerScan, ReconError> {
    let text = read_source(path)?;
    Ok(scan_answers_with(rules, text.lines(), &path.display().to_string()))
}

/// Scan every file, reconcile, and summarize.
///
/// A file that cannot be read contributes nothing and is listed in
/// `RunReport::issues`; the run carries on. The run itself fails when a side
/// has no files, when a side parses to zero records, or when nothing matches.
pub fn run(config: &ReconConfig, sources: &SourceSet) -> Result<RunReport, ReconError> {
    let roster_rules = RosterRules::from_config(&config.roster)?;
    let answer_rules = AnswerRules::from_config(&config.answers)?;

    if sources.roster_files.is_empty() {
        return Err(ReconError::NoFilesFound { kind: SourceKind::Roster });
    }
    if sources.answer_files.is_empty() {
        return Err(ReconError::NoFilesFound { kind: SourceKind::Answers });
    }

    let mut files = Vec::new();
    let mut issues = Vec::new();

    let mut roster = Vec::new();
    for path in &sources.roster_files {
        match scan_roster_file(&roster_rules, path) {
            Ok(records) => {
                log::info!("{}: {} roster records", path.display(), records.len());
                files.push(FileSummary {
                    path: path.display().to_string(),
                    kind: SourceKind::Roster,
                    grade: classify(&path.display().to_string()),
                    records: records.len(),
                });
                roster.extend(records);
            }
            Err(e) => {
                log::warn!("{e}");
                issues.push(FileIssue {
                    path: path.display().to_string(),
                    kind: SourceKind::Roster,
                    reason: e.to_string(),
                });
            }
        }
    }

    let mut answers = Vec::new();
    let mut slot_overflows = 0;
    for path in &sources.answer_files {
        match scan_answer_file(&answer_rules, path) {
            Ok(scan) => {
                log::info!("{}: {} answer records", path.display(), scan.records.len());
                files.push(FileSummary {
                    path: path.display().to_string(),
                    kind: SourceKind::Answers,
                    grade: classify(&path.display().to_string()),
                    records: scan.records.len(),
                });
                slot_overflows += scan.slot_overflows;
                answers.extend(scan.records);
            }
            Err(e) => {
                log::warn!("{e}");
                issues.push(FileIssue {
                    path: path.display().to_string(),
                    kind: SourceKind::Answers,
                    reason: e.to_string(),
                });
            }
        }
    }

    if roster.is_empty() {
        return Err(ReconError::EmptyPostParse { kind: SourceKind::Roster });
    }
    if answers.is_empty() {
        return Err(ReconError::EmptyPostParse { kind: SourceKind::Answers });
    }

    let outcome = reconcile(&roster, &answers);
    if outcome.matched.is_empty() {
        return Err(ReconError::NoMatches {
            roster: roster.len(),
            answers: answers.len(),
        });
    }

    Ok(RunReport {
        meta: ReconMeta {
            engine_version: env!("CARGO_PKG_VERSION").to_string(),
            run_at: chrono::Local::now().to_rfc3339(),
            slot_width: answer_rules.max_slots(),
        },
        files,
        issues,
        slot_overflows,
        answer_lengths: length_stats(&answers),
        roster_rooms: roster_room_counts(&roster, &config.roster.unidentified_room),
        outcome,
    })
}
