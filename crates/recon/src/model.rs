use std::collections::BTreeMap;
use std::fmt;

use serde::ser::SerializeSeq;
use serde::{Deserialize, Serialize, Serializer};

use crate::normalize::{answer_key, roster_key};

/// Width of the per-question slot array handed to the export layer.
pub const DEFAULT_SLOT_WIDTH: usize = 150;

/// Widest slot array a worksheet can hold next to the five leading columns
/// (xlsx sheets stop at 16384 columns).
pub const MAX_SLOT_WIDTH: usize = 16_384 - 5;

/// Rendered room for students seen before any room header.
pub const UNIDENTIFIED_ROOM: &str = "Sala_Não_Identificada";

// ---------------------------------------------------------------------------
// Grade
// ---------------------------------------------------------------------------

/// Academic level a file (and therefore its records) belongs to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Grade {
    #[serde(rename = "8º Ano")]
    Year8,
    #[serde(rename = "9º Ano")]
    Year9,
    #[serde(rename = "1ª Série")]
    Series1,
    #[serde(rename = "2ª Série")]
    Series2,
    #[default]
    #[serde(rename = "Série não identificada")]
    Unidentified,
}

impl Grade {
    /// Identified grades in report order.
    pub const REPORT_ORDER: [Grade; 4] = [Grade::Year8, Grade::Year9, Grade::Series1, Grade::Series2];

    pub fn label(&self) -> &'static str {
        match self {
            Self::Year8 => "8º Ano",
            Self::Year9 => "9º Ano",
            Self::Series1 => "1ª Série",
            Self::Series2 => "2ª Série",
            Self::Unidentified => "Série não identificada",
        }
    }

    /// Worksheet name used for the per-grade export sheet.
    pub fn sheet_name(&self) -> Option<&'static str> {
        match self {
            Self::Year8 => Some("8_Ano"),
            Self::Year9 => Some("9_Ano"),
            Self::Series1 => Some("1_Serie"),
            Self::Series2 => Some("2_Serie"),
            Self::Unidentified => None,
        }
    }

    pub fn is_identified(&self) -> bool {
        !matches!(self, Self::Unidentified)
    }

    /// `self` if identified, otherwise `other`.
    pub fn or(self, other: Grade) -> Grade {
        if self.is_identified() {
            self
        } else {
            other
        }
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Which export a file or record came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    Roster,
    Answers,
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Roster => write!(f, "roster"),
            Self::Answers => write!(f, "answer"),
        }
    }
}

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

/// One recognized student line from a roster export.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RosterRecord {
    pub id_raw: String,
    pub id_key: String,
    pub name: String,
    pub room: Option<String>,
    pub grade: Grade,
    pub source_file: String,
}

impl RosterRecord {
    pub fn new(
        id_raw: impl Into<String>,
        name: impl Into<String>,
        room: Option<String>,
        grade: Grade,
        source_file: impl Into<String>,
    ) -> Self {
        let id_raw = id_raw.into();
        Self {
            id_key: roster_key(&id_raw),
            id_raw,
            name: name.into(),
            room,
            grade,
            source_file: source_file.into(),
        }
    }

    pub fn room_label<'a>(&'a self, unidentified: &'a str) -> &'a str {
        self.room.as_deref().unwrap_or(unidentified)
    }
}

/// Fixed-width positional projection of an answer run.
///
/// Position `i` of the run always lands in slot `i`; marks past the width are
/// dropped and empty slots are `None`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Slots {
    marks: Box<[Option<char>]>,
}

impl Slots {
    pub fn project(run: &str, width: usize) -> Self {
        let mut marks = vec![None; width];
        for (slot, mark) in marks.iter_mut().zip(run.chars()) {
            *slot = Some(mark);
        }
        Self { marks: marks.into_boxed_slice() }
    }

    pub fn width(&self) -> usize {
        self.marks.len()
    }

    pub fn get(&self, index: usize) -> Option<char> {
        self.marks.get(index).copied().flatten()
    }

    pub fn iter(&self) -> impl Iterator<Item = Option<char>> + '_ {
        self.marks.iter().copied()
    }

    /// Number of non-empty slots.
    pub fn filled(&self) -> usize {
        self.marks.iter().filter(|m| m.is_some()).count()
    }
}

impl Serialize for Slots {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.marks.len()))?;
        for mark in self.marks.iter() {
            match mark {
                Some(c) => seq.serialize_element(&c.to_string())?,
                None => seq.serialize_element("")?,
            }
        }
        seq.end()
    }
}

/// One recognized line from an answer-sheet export.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnswerRecord {
    pub id_raw: String,
    pub id_key: String,
    /// Captured run, verbatim (wildcards included).
    pub answers: String,
    pub slots: Slots,
    pub total_marks: usize,
    pub grade: Grade,
    pub source_file: String,
}

impl AnswerRecord {
    pub fn new(
        id_raw: impl Into<String>,
        answers: impl Into<String>,
        width: usize,
        grade: Grade,
        source_file: impl Into<String>,
    ) -> Self {
        let id_raw = id_raw.into();
        let answers = answers.into();
        Self {
            id_key: answer_key(&id_raw),
            id_raw,
            slots: Slots::project(&answers, width),
            total_marks: answers.chars().count(),
            answers,
            grade,
            source_file: source_file.into(),
        }
    }

    /// True when the run was longer than the slot array.
    pub fn overflowed(&self) -> bool {
        self.total_marks > self.slots.width()
    }
}

// ---------------------------------------------------------------------------
// Reconciliation
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchStatus {
    Matched,
    RosterOnly,
    AnswersOnly,
}

impl fmt::Display for MatchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Matched => write!(f, "matched"),
            Self::RosterOnly => write!(f, "roster_only"),
            Self::AnswersOnly => write!(f, "answers_only"),
        }
    }
}

/// A roster record joined with at most one answer record (or the reverse).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReconciledRow {
    pub id_key: String,
    pub match_status: MatchStatus,
    pub grade: Grade,
    pub roster: Option<RosterRecord>,
    pub answers: Option<AnswerRecord>,
}

impl ReconciledRow {
    pub fn matched(roster: &RosterRecord, answers: &AnswerRecord) -> Self {
        Self {
            id_key: roster.id_key.clone(),
            match_status: MatchStatus::Matched,
            grade: roster.grade.or(answers.grade),
            roster: Some(roster.clone()),
            answers: Some(answers.clone()),
        }
    }

    pub fn roster_only(roster: &RosterRecord) -> Self {
        Self {
            id_key: roster.id_key.clone(),
            match_status: MatchStatus::RosterOnly,
            grade: roster.grade,
            roster: Some(roster.clone()),
            answers: None,
        }
    }

    pub fn answers_only(answers: &AnswerRecord) -> Self {
        Self {
            id_key: answers.id_key.clone(),
            match_status: MatchStatus::AnswersOnly,
            grade: answers.grade,
            roster: None,
            answers: Some(answers.clone()),
        }
    }

    /// Identifier shown in reports: the dot-free roster id when present,
    /// otherwise the card's raw id.
    pub fn display_id(&self) -> &str {
        match (&self.roster, &self.answers) {
            (Some(r), _) => &r.id_key,
            (None, Some(a)) => &a.id_raw,
            (None, None) => &self.id_key,
        }
    }

    pub fn name(&self) -> &str {
        self.roster.as_ref().map(|r| r.name.as_str()).unwrap_or("")
    }

    pub fn room_label<'a>(&'a self, unidentified: &'a str) -> &'a str {
        self.roster
            .as_ref()
            .and_then(|r| r.room.as_deref())
            .unwrap_or(unidentified)
    }

    pub fn answer_run(&self) -> &str {
        self.answers.as_ref().map(|a| a.answers.as_str()).unwrap_or("")
    }

    pub fn slots(&self) -> Option<&Slots> {
        self.answers.as_ref().map(|a| &a.slots)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReconStats {
    pub roster_count: usize,
    pub answers_count: usize,
    pub matched: usize,
    pub roster_only: usize,
    pub answers_only: usize,
    /// matched / max(roster_count, answers_count); 0 when both are empty.
    pub match_rate: f64,
}

impl ReconStats {
    /// Match rate as a percentage rounded to one decimal.
    pub fn match_rate_percent(&self) -> f64 {
        (self.match_rate * 1000.0).round() / 10.0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReconOutcome {
    pub matched: Vec<ReconciledRow>,
    pub roster_only: Vec<RosterRecord>,
    pub answers_only: Vec<AnswerRecord>,
    pub stats: ReconStats,
}

// ---------------------------------------------------------------------------
// Run report
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct FileSummary {
    pub path: String,
    pub kind: SourceKind,
    pub grade: Grade,
    pub records: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct FileIssue {
    pub path: String,
    pub kind: SourceKind,
    pub reason: String,
}

/// Distribution of answer-run lengths across all answer records.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LengthStats {
    pub min: usize,
    pub max: usize,
    pub mean: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReconMeta {
    pub engine_version: String,
    pub run_at: String,
    pub slot_width: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub meta: ReconMeta,
    pub files: Vec<FileSummary>,
    pub issues: Vec<FileIssue>,
    pub slot_overflows: usize,
    pub answer_lengths: Option<LengthStats>,
    /// Roster records per room label, across all roster files.
    pub roster_rooms: BTreeMap<String, usize>,
    pub outcome: ReconOutcome,
}
