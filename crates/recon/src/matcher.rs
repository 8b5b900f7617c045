use std::collections::BTreeMap;

use crate::evidence::compute_stats;
use crate::model::{AnswerRecord, ReconOutcome, ReconciledRow, RosterRecord};

/// Full outer join of roster and answer records on `id_key`.
///
/// Keys are visited in ascending order. A key present on both sides yields
/// one matched row per (roster, answer) pair, so duplicates expand instead of
/// being collapsed; within a key, input order is kept on both sides.
pub fn reconcile(roster: &[RosterRecord], answers: &[AnswerRecord]) -> ReconOutcome {
    let mut buckets: BTreeMap<&str, (Vec<&RosterRecord>, Vec<&AnswerRecord>)> = BTreeMap::new();
    for r in roster {
        buckets.entry(r.id_key.as_str()).or_default().0.push(r);
    }
    for a in answers {
        buckets.entry(a.id_key.as_str()).or_default().1.push(a);
    }

    let mut matched = Vec::new();
    let mut roster_only = Vec::new();
    let mut answers_only = Vec::new();

    for (key, (left, right)) in buckets {
        if left.len() > 1 || right.len() > 1 {
            log::debug!("key {key:?}: {} roster x {} answer records", left.len(), right.len());
        }
        match (left.is_empty(), right.is_empty()) {
            (false, false) => {
                for r in &left {
                    for a in &right {
                        matched.push(ReconciledRow::matched(r, a));
                    }
                }
            }
            (false, true) => roster_only.extend(left.into_iter().cloned()),
            (true, false) => answers_only.extend(right.into_iter().cloned()),
            (true, true) => {}
        }
    }

    let stats = compute_stats(
        roster.len(),
        answers.len(),
        matched.len(),
        roster_only.len(),
        answers_only.len(),
    );

    ReconOutcome {
        matched,
        roster_only,
        answers_only,
        stats,
    }
}
