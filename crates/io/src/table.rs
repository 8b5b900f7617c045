// Flat tables built from a run report. Every export format writes these.

use sheetjoin_recon::evidence::room_counts;
use sheetjoin_recon::model::{AnswerRecord, Grade, ReconciledRow, RosterRecord, RunReport};

#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Text(String),
    Number(f64),
    Empty,
}

impl Cell {
    fn text(s: impl Into<String>) -> Self {
        let s = s.into();
        if s.is_empty() {
            Cell::Empty
        } else {
            Cell::Text(s)
        }
    }

    /// Plain-text rendering, used by the CSV writer.
    pub fn display(&self) -> String {
        match self {
            Cell::Text(s) => s.clone(),
            Cell::Number(n) if n.fract() == 0.0 => format!("{}", *n as i64),
            Cell::Number(n) => n.to_string(),
            Cell::Empty => String::new(),
        }
    }
}

/// One worksheet worth of data: a header row plus body rows.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    pub name: String,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

/// Column header for 0-based slot `index`: Slot001, Slot002, ...
pub fn slot_header(index: usize) -> String {
    format!("Slot{:03}", index + 1)
}

fn answer_headers(slot_width: usize) -> Vec<String> {
    let mut headers: Vec<String> = ["ID", "Name", "Room", "Grade", "AnswerRun"]
        .iter()
        .map(|s| s.to_string())
        .collect();
    headers.extend((0..slot_width).map(slot_header));
    headers
}

fn matched_row(row: &ReconciledRow, slot_width: usize, unidentified_room: &str) -> Vec<Cell> {
    let mut cells = vec![
        Cell::text(row.display_id()),
        Cell::text(row.name()),
        Cell::text(row.room_label(unidentified_room)),
        Cell::text(row.grade.label()),
        Cell::text(row.answer_run()),
    ];
    match row.slots() {
        Some(slots) => cells.extend(
            slots
                .iter()
                .take(slot_width)
                .map(|m| m.map_or(Cell::Empty, |c| Cell::Text(c.to_string()))),
        ),
        None => cells.extend((0..slot_width).map(|_| Cell::Empty)),
    }
    cells.resize(5 + slot_width, Cell::Empty);
    cells
}

fn answer_table<'a>(
    name: &str,
    rows: impl Iterator<Item = &'a ReconciledRow>,
    slot_width: usize,
    unidentified_room: &str,
) -> Table {
    Table {
        name: name.to_string(),
        headers: answer_headers(slot_width),
        rows: rows.map(|r| matched_row(r, slot_width, unidentified_room)).collect(),
    }
}

/// Every matched row with its full slot array.
pub fn matched_table(report: &RunReport, unidentified_room: &str) -> Table {
    answer_table(
        "Matched",
        report.outcome.matched.iter(),
        report.meta.slot_width,
        unidentified_room,
    )
}

/// Matched rows of one grade; `None` for the unidentified grade.
pub fn grade_table(report: &RunReport, grade: Grade, unidentified_room: &str) -> Option<Table> {
    let name = grade.sheet_name()?;
    Some(answer_table(
        name,
        report.outcome.matched.iter().filter(|r| r.grade == grade),
        report.meta.slot_width,
        unidentified_room,
    ))
}

pub fn roster_only_table(records: &[RosterRecord], unidentified_room: &str) -> Table {
    Table {
        name: "Roster_Only".into(),
        headers: vec!["ID".into(), "Name".into(), "Room".into(), "Grade".into()],
        rows: records
            .iter()
            .map(ReconciledRow::roster_only)
            .map(|row| {
                vec![
                    Cell::text(row.display_id()),
                    Cell::text(row.name()),
                    Cell::text(row.room_label(unidentified_room)),
                    Cell::text(row.grade.label()),
                ]
            })
            .collect(),
    }
}

pub fn answers_only_table(records: &[AnswerRecord]) -> Table {
    Table {
        name: "Answers_Only".into(),
        headers: vec!["CardID".into(), "Key".into(), "Grade".into(), "AnswerRun".into()],
        rows: records
            .iter()
            .map(ReconciledRow::answers_only)
            .map(|row| {
                vec![
                    Cell::text(row.display_id()),
                    Cell::text(row.id_key.as_str()),
                    Cell::text(row.grade.label()),
                    Cell::text(row.answer_run()),
                ]
            })
            .collect(),
    }
}

/// Metric / value pairs for the run.
pub fn summary_table(report: &RunReport) -> Table {
    let s = &report.outcome.stats;
    let count = |label: &str, n: usize| vec![Cell::text(label), Cell::Number(n as f64)];

    let mut rows = vec![
        count("Roster records", s.roster_count),
        count("Answer records", s.answers_count),
        count("Matched", s.matched),
        count("Roster only", s.roster_only),
        count("Answers only", s.answers_only),
        vec![Cell::text("Match rate (%)"), Cell::Number(s.match_rate_percent())],
        count("Slot width", report.meta.slot_width),
        count("Slot overflows", report.slot_overflows),
        count("Unreadable files", report.issues.len()),
    ];
    if let Some(lengths) = &report.answer_lengths {
        rows.push(count("Shortest answer run", lengths.min));
        rows.push(count("Longest answer run", lengths.max));
        rows.push(vec![Cell::text("Mean answer run"), Cell::Number(lengths.mean)]);
    }
    rows.push(vec![Cell::text("Run at"), Cell::text(report.meta.run_at.as_str())]);

    Table {
        name: "Summary".into(),
        headers: vec!["Metric".into(), "Value".into()],
        rows,
    }
}

/// Matched rows per room.
pub fn rooms_table(report: &RunReport, unidentified_room: &str) -> Table {
    Table {
        name: "Rooms".into(),
        headers: vec!["Room".into(), "Students".into()],
        rows: room_counts(&report.outcome.matched, unidentified_room)
            .into_iter()
            .map(|(room, n)| vec![Cell::Text(room), Cell::Number(n as f64)])
            .collect(),
    }
}

/// All workbook sheets in export order. Empty unmatched sheets and grades
/// with no matched rows are left out.
pub fn workbook_tables(report: &RunReport, unidentified_room: &str) -> Vec<Table> {
    let outcome = &report.outcome;
    let mut tables = vec![matched_table(report, unidentified_room)];

    if !outcome.roster_only.is_empty() {
        tables.push(roster_only_table(&outcome.roster_only, unidentified_room));
    }
    if !outcome.answers_only.is_empty() {
        tables.push(answers_only_table(&outcome.answers_only));
    }
    tables.push(summary_table(report));

    for grade in Grade::REPORT_ORDER {
        if outcome.matched.iter().any(|r| r.grade == grade) {
            tables.extend(grade_table(report, grade, unidentified_room));
        }
    }

    tables.push(rooms_table(report, unidentified_room));
    tables
}
