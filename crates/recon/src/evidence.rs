use std::collections::BTreeMap;

use crate::model::{AnswerRecord, Grade, LengthStats, ReconStats, ReconciledRow, RosterRecord};

/// Bucket counts plus match rate over the larger side.
pub fn compute_stats(
    roster_count: usize,
    answers_count: usize,
    matched: usize,
    roster_only: usize,
    answers_only: usize,
) -> ReconStats {
    let denominator = roster_count.max(answers_count);
    let match_rate = if denominator == 0 {
        0.0
    } else {
        matched as f64 / denominator as f64
    };

    ReconStats {
        roster_count,
        answers_count,
        matched,
        roster_only,
        answers_only,
        match_rate,
    }
}

/// Matched rows per room label.
pub fn room_counts(rows: &[ReconciledRow], unidentified_room: &str) -> BTreeMap<String, usize> {
    let mut counts = BTreeMap::new();
    for row in rows {
        *counts.entry(row.room_label(unidentified_room).to_string()).or_insert(0) += 1;
    }
    counts
}

/// Roster records per room label.
pub fn roster_room_counts(records: &[RosterRecord], unidentified_room: &str) -> BTreeMap<String, usize> {
    let mut counts = BTreeMap::new();
    for r in records {
        *counts.entry(r.room_label(unidentified_room).to_string()).or_insert(0) += 1;
    }
    counts
}

/// Matched rows per grade, in report order, unidentified last. Grades with no
/// rows are omitted.
pub fn grade_counts(rows: &[ReconciledRow]) -> Vec<(Grade, usize)> {
    Grade::REPORT_ORDER
        .iter()
        .chain(std::iter::once(&Grade::Unidentified))
        .map(|g| (*g, rows.iter().filter(|r| r.grade == *g).count()))
        .filter(|(_, n)| *n > 0)
        .collect()
}

/// Min / max / mean answer-run length, `None` without records.
pub fn length_stats(records: &[AnswerRecord]) -> Option<LengthStats> {
    let min = records.iter().map(|r| r.total_marks).min()?;
    let max = records.iter().map(|r| r.total_marks).max()?;
    let total: usize = records.iter().map(|r| r.total_marks).sum();
    let mean = (total as f64 / records.len() as f64 * 10.0).round() / 10.0;
    Some(LengthStats { min, max, mean })
}
