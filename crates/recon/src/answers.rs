//! Answer-sheet export scanner.
//!
//! Each recognized line reads `<marker><card digits><run>`, e.g.
//! `N00012345ABCDE*`, where the run uses the marks `A`–`E` plus a wildcard for
//! illegible or multiply-marked bubbles.

use regex::Regex;

use crate::config::AnswerConfig;
use crate::error::ReconError;
use crate::model::AnswerRecord;
use crate::series::classify;

/// Compiled answer-line rule plus the slot width records are projected onto.
#[derive(Debug, Clone)]
pub struct AnswerRules {
    line: Regex,
    max_slots: usize,
}

impl AnswerRules {
    pub fn from_config(config: &AnswerConfig) -> Result<Self, ReconError> {
        let pattern = format!(
            r"{}\s*(\d+)\s*([A-E{}]+)",
            regex::escape(config.marker.trim()),
            regex::escape(&config.wildcard.to_string()),
        );
        let line = Regex::new(&pattern).map_err(|e| ReconError::InvalidPattern {
            pattern: pattern.clone(),
            reason: e.to_string(),
        })?;
        Ok(Self {
            line,
            max_slots: config.max_slots,
        })
    }

    pub fn builtin() -> Result<Self, ReconError> {
        Self::from_config(&AnswerConfig::default())
    }

    pub fn with_max_slots(mut self, max_slots: usize) -> Self {
        self.max_slots = max_slots;
        self
    }

    pub fn max_slots(&self) -> usize {
        self.max_slots
    }

    /// Card number and mark run of a line, if it is an answer line.
    pub fn parse_line<'a>(&self, line: &'a str) -> Option<(&'a str, &'a str)> {
        let caps = self.line.captures(line)?;
        Some((caps.get(1)?.as_str(), caps.get(2)?.as_str()))
    }
}

/// Records from one answer file plus the overflow tally.
#[derive(Debug, Clone, Default)]
pub struct AnswerScan {
    pub records: Vec<AnswerRecord>,
    /// Records whose run was longer than the slot width.
    pub slot_overflows: usize,
}

/// Scan answer lines with the built-in marker and wildcard.
pub fn scan_answers<I, S>(lines: I, source_file: &str, max_slots: usize) -> AnswerScan
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    match AnswerRules::builtin() {
        Ok(rules) => scan_answers_with(&rules.with_max_slots(max_slots), lines, source_file),
        Err(e) => {
            log::error!("built-in answer rule failed to compile: {e}");
            AnswerScan::default()
        }
    }
}

pub fn scan_answers_with<I, S>(rules: &AnswerRules, lines: I, source_file: &str) -> AnswerScan
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let grade = classify(source_file);
    let mut scan = AnswerScan::default();

    for line in lines {
        let line = line.as_ref().trim();
        if line.is_empty() {
            continue;
        }
        let Some((id_raw, run)) = rules.parse_line(line) else {
            continue;
        };

        let record = AnswerRecord::new(id_raw, run, rules.max_slots, grade, source_file);
        if record.overflowed() {
            log::warn!(
                "{source_file}: card {id_raw} has {} marks, only the first {} are kept",
                record.total_marks,
                rules.max_slots,
            );
            scan.slot_overflows += 1;
        }
        scan.records.push(record);
    }

    scan
}
