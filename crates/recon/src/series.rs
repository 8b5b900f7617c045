//! Grade inference from export file names.

use std::sync::OnceLock;

use regex::Regex;

use crate::model::Grade;

/// One entry of the classification cascade.
#[derive(Debug, Clone, Copy)]
pub struct SeriesRule {
    pub pattern: &'static str,
    pub grade: Grade,
}

/// Ordered cascade, first match wins. Patterns overlap on digits, so the
/// order is part of the contract.
pub const SERIES_RULES: &[SeriesRule] = &[
    SeriesRule { pattern: r"1[°ºª]|1\s*serie", grade: Grade::Series1 },
    SeriesRule { pattern: r"2[°ºª]|2\s*serie", grade: Grade::Series2 },
    SeriesRule { pattern: r"8[°ºª]|8\s*serie|8th\s*grade", grade: Grade::Year8 },
    SeriesRule { pattern: r"9[°ºª]|9\s*serie", grade: Grade::Year9 },
];

fn compiled() -> &'static [(Regex, Grade)] {
    static RULES: OnceLock<Vec<(Regex, Grade)>> = OnceLock::new();
    RULES.get_or_init(|| {
        SERIES_RULES
            .iter()
            .map(|rule| (Regex::new(rule.pattern).unwrap(), rule.grade))
            .collect()
    })
}

/// Classify a file name or path. The whole path is inspected, so exports
/// kept in per-grade folders (`9° ano/respostas.txt`) pick up the folder's grade.
pub fn classify(filename: &str) -> Grade {
    let name = filename.to_lowercase();

    compiled()
        .iter()
        .find(|(re, _)| re.is_match(&name))
        .map(|(_, grade)| *grade)
        .unwrap_or(Grade::Unidentified)
}
