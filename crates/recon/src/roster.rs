//! Roster export scanner.
//!
//! Roster exports list students under room headers:
//!
//! ```text
//! 7AM - 8º Ano
//! Código Aluno	Nome
//! 1234.5	JOAO SILVA
//! ```
//!
//! The scanner is a single pass over the lines with a two-state room machine
//! ([`RoomState`]); a room header moves it to `InRoom`, every later student line
//! is stamped with that room until the next header.

use regex::{Regex, RegexBuilder};

use crate::config::RosterConfig;
use crate::error::ReconError;
use crate::model::{Grade, RosterRecord};
use crate::series::classify;

/// Built-in room-header cascade: (pattern, grade descriptor), first match wins.
pub const ROOM_RULES: &[(&str, Option<Grade>)] = &[
    (r"(\d+CM)\s*-\s*9º\s*Ano", Some(Grade::Year9)),
    (r"(\d+DM)\s*-\s*1ª\s*Série", Some(Grade::Series1)),
    (r"(\d+EM)\s*-\s*2ª\s*Série", Some(Grade::Series2)),
    (r"(\d+AM)\s*-\s*8º\s*Ano", Some(Grade::Year8)),
    // Bare room codes, for exports that drop the descriptor.
    (r"(\d+[ACDE]M)", None),
];

const STUDENT_LINE: &str = r"^\d+\.\d+";
const BARE_NUMBER: &str = r"^\d+\.?\d*$";

#[derive(Debug, Clone)]
struct RoomRule {
    regex: Regex,
    grade: Option<Grade>,
}

/// Compiled roster rules: room cascade, header keywords, student-line shape.
#[derive(Debug, Clone)]
pub struct RosterRules {
    rooms: Vec<RoomRule>,
    header_keywords: Vec<String>,
    student: Regex,
    bare_number: Regex,
}

fn compile(pattern: &str, case_insensitive: bool) -> Result<Regex, ReconError> {
    RegexBuilder::new(pattern)
        .case_insensitive(case_insensitive)
        .build()
        .map_err(|e| ReconError::InvalidPattern {
            pattern: pattern.to_string(),
            reason: e.to_string(),
        })
}

impl RosterRules {
    /// Configured room rules first, then the built-in cascade.
    pub fn from_config(config: &RosterConfig) -> Result<Self, ReconError> {
        let mut rooms = Vec::with_capacity(config.room_rules.len() + ROOM_RULES.len());
        for rule in &config.room_rules {
            let regex = compile(&rule.pattern, true)?;
            if regex.captures_len() < 2 {
                return Err(ReconError::InvalidPattern {
                    pattern: rule.pattern.clone(),
                    reason: "room rule needs a capture group for the room code".into(),
                });
            }
            rooms.push(RoomRule { regex, grade: rule.grade });
        }
        for (pattern, grade) in ROOM_RULES {
            rooms.push(RoomRule {
                regex: compile(pattern, true)?,
                grade: *grade,
            });
        }

        Ok(Self {
            rooms,
            header_keywords: config.header_keywords.clone(),
            student: compile(STUDENT_LINE, false)?,
            bare_number: compile(BARE_NUMBER, false)?,
        })
    }

    pub fn builtin() -> Result<Self, ReconError> {
        Self::from_config(&RosterConfig::default())
    }

    /// Classify one trimmed line.
    pub fn classify_line<'a>(&self, line: &'a str) -> LineKind<'a> {
        for rule in &self.rooms {
            if let Some(code) = rule.regex.captures(line).and_then(|c| c.get(1)) {
                return LineKind::RoomHeader {
                    code: code.as_str().to_uppercase(),
                    grade: rule.grade,
                };
            }
        }

        if self.header_keywords.iter().any(|k| line.contains(k.as_str())) {
            return LineKind::Header;
        }

        if self.student.is_match(line) {
            let fields: Vec<&str> = line.split('\t').collect();
            let id_raw = fields[0].trim();
            return match pick_name(&fields[1..], &self.bare_number) {
                Some(name) if !id_raw.is_empty() => LineKind::Student { id_raw, name },
                _ => LineKind::Ignored,
            };
        }

        LineKind::Ignored
    }
}

/// What a roster line turned out to be.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineKind<'a> {
    RoomHeader { code: String, grade: Option<Grade> },
    Header,
    Student { id_raw: &'a str, name: &'a str },
    Ignored,
}

/// Pick the name among the fields that follow the identifier: the first one
/// that is non-empty and not a bare number. Exports disagree on which column
/// holds the name.
pub fn pick_name<'a>(fields: &[&'a str], bare_number: &Regex) -> Option<&'a str> {
    fields
        .iter()
        .map(|f| f.trim())
        .find(|f| !f.is_empty() && !bare_number.is_match(f))
}

// ---------------------------------------------------------------------------
// Room state machine
// ---------------------------------------------------------------------------

/// Room carried across lines of one file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum RoomState {
    #[default]
    NoRoom,
    InRoom { code: String, grade: Option<Grade> },
}

impl RoomState {
    pub fn enter(&mut self, code: String, grade: Option<Grade>) {
        *self = RoomState::InRoom { code, grade };
    }

    pub fn room(&self) -> Option<&str> {
        match self {
            RoomState::NoRoom => None,
            RoomState::InRoom { code, .. } => Some(code),
        }
    }

    /// Grade descriptor printed on the current room header, if any.
    pub fn grade(&self) -> Grade {
        match self {
            RoomState::InRoom { grade: Some(g), .. } => *g,
            _ => Grade::Unidentified,
        }
    }
}

// ---------------------------------------------------------------------------
// Scanning
// ---------------------------------------------------------------------------

/// Scan roster lines with the built-in rules.
pub fn scan_roster<I, S>(lines: I, source_file: &str) -> Vec<RosterRecord>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    match RosterRules::builtin() {
        Ok(rules) => scan_roster_with(&rules, lines, source_file),
        Err(e) => {
            log::error!("built-in roster rules failed to compile: {e}");
            Vec::new()
        }
    }
}

/// Scan roster lines. Records come out in line order; the record grade is the
/// file-name grade, or the room header's descriptor when the name has none.
pub fn scan_roster_with<I, S>(rules: &RosterRules, lines: I, source_file: &str) -> Vec<RosterRecord>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let file_grade = classify(source_file);
    let mut state = RoomState::default();
    let mut records = Vec::new();

    for line in lines {
        let line = line.as_ref().trim();
        match rules.classify_line(line) {
            LineKind::RoomHeader { code, grade } => {
                log::debug!("{source_file}: room {code}");
                state.enter(code, grade);
            }
            LineKind::Header => {}
            LineKind::Student { id_raw, name } => {
                records.push(RosterRecord::new(
                    id_raw,
                    name,
                    state.room().map(str::to_string),
                    file_grade.or(state.grade()),
                    source_file,
                ));
            }
            LineKind::Ignored => {
                if !line.is_empty() {
                    log::trace!("{source_file}: ignored line {line:?}");
                }
            }
        }
    }

    records
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RoomRuleConfig;

    fn rules() -> RosterRules {
        RosterRules::builtin().unwrap()
    }

    #[test]
    fn scenario_room_header_then_student() {
        let lines = ["7AM - 8º Ano", "1234.5\tJOAO SILVA"];
        let records = scan_roster(lines, "nomes.txt");
        assert_eq!(records.len(), 1);
        let r = &records[0];
        assert_eq!(r.id_raw, "1234.5");
        assert_eq!(r.id_key, "12345");
        assert_eq!(r.name, "JOAO SILVA");
        assert_eq!(r.room.as_deref(), Some("7AM"));
        assert_eq!(r.grade, Grade::Year8);
        assert_eq!(r.source_file, "nomes.txt");
    }

    #[test]
    fn file_name_grade_beats_header_descriptor() {
        let lines = ["7AM - 8º Ano", "1234.5\tJOAO SILVA"];
        let records = scan_roster(lines, "nomes_9º.txt");
        assert_eq!(records[0].grade, Grade::Year9);
    }

    #[test]
    fn room_carries_until_next_header() {
        let lines = [
            "1CM - 9º Ano",
            "Código Aluno\tNome",
            "100.1\tANA",
            "100.2\tBRUNO",
            "2DM - 1ª Série",
            "200.1\tCARLA",
        ];
        let records = scan_roster(lines, "nomes.txt");
        let rooms: Vec<_> = records.iter().map(|r| r.room.as_deref()).collect();
        assert_eq!(rooms, vec![Some("1CM"), Some("1CM"), Some("2DM")]);
        assert_eq!(records[0].grade, Grade::Year9);
        assert_eq!(records[2].grade, Grade::Series1);
    }

    #[test]
    fn students_before_any_header_have_no_room() {
        let records = scan_roster(["55.1\tDIEGO"], "nomes.txt");
        assert_eq!(records[0].room, None);
        assert_eq!(records[0].room_label("Sala_Não_Identificada"), "Sala_Não_Identificada");
        assert_eq!(records[0].grade, Grade::Unidentified);
    }

    #[test]
    fn state_does_not_leak_between_scans() {
        let first = scan_roster(["3EM - 2ª Série", "1.1\tA"], "nomes_a.txt");
        let second = scan_roster(["2.2\tB"], "nomes_b.txt");
        assert_eq!(first[0].room.as_deref(), Some("3EM"));
        assert_eq!(second[0].room, None);
    }

    #[test]
    fn room_codes_uppercased_and_case_insensitive() {
        let records = scan_roster(["4am - 8º ano", "9.9\tEVA"], "nomes.txt");
        assert_eq!(records[0].room.as_deref(), Some("4AM"));
        assert_eq!(records[0].grade, Grade::Year8);
    }

    #[test]
    fn bare_room_code_has_no_descriptor() {
        let records = scan_roster(["Sala 12CM", "9.9\tEVA"], "nomes.txt");
        assert_eq!(records[0].room.as_deref(), Some("12CM"));
        assert_eq!(records[0].grade, Grade::Unidentified);
    }

    #[test]
    fn name_column_varies() {
        let lines = [
            "10.1\t\t3\tFERNANDA LIMA",
            "10.2\t15.0\t  GUSTAVO  \t7",
            "10.3\t12\t\t",
        ];
        let records = scan_roster(lines, "nomes.txt");
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].name, "FERNANDA LIMA");
        assert_eq!(records[1].name, "GUSTAVO");
    }

    #[test]
    fn pick_name_skips_numbers() {
        let bare = Regex::new(BARE_NUMBER).unwrap();
        assert_eq!(pick_name(&["", "42", "3.5", "MARIA"], &bare), Some("MARIA"));
        assert_eq!(pick_name(&["12.", " HELENA "], &bare), Some("HELENA"));
        assert_eq!(pick_name(&["A1"], &bare), Some("A1"));
        assert_eq!(pick_name(&["", "7"], &bare), None);
        assert_eq!(pick_name(&[], &bare), None);
    }

    #[test]
    fn non_student_lines_ignored() {
        let lines = ["", "Relatório de alunos", "1234\tSEM PONTO", "  ", "abc.1\tX"];
        assert!(scan_roster(lines, "nomes.txt").is_empty());
    }

    #[test]
    fn classify_line_kinds() {
        let rules = rules();
        assert_eq!(
            rules.classify_line("7AM - 8º Ano"),
            LineKind::RoomHeader { code: "7AM".into(), grade: Some(Grade::Year8) }
        );
        assert_eq!(rules.classify_line("Código\tNome"), LineKind::Header);
        assert_eq!(
            rules.classify_line("1.2\tIVO"),
            LineKind::Student { id_raw: "1.2", name: "IVO" }
        );
        assert_eq!(rules.classify_line("qualquer coisa"), LineKind::Ignored);
    }

    #[test]
    fn configured_rules_take_priority() {
        let config = RosterConfig {
            room_rules: vec![RoomRuleConfig {
                pattern: r"Turma\s+(\w+)".into(),
                grade: Some(Grade::Series2),
            }],
            ..RosterConfig::default()
        };
        let rules = RosterRules::from_config(&config).unwrap();
        let records = scan_roster_with(&rules, ["Turma 5am", "1.1\tJULIA"], "nomes.txt");
        assert_eq!(records[0].room.as_deref(), Some("5AM"));
        assert_eq!(records[0].grade, Grade::Series2);
    }

    #[test]
    fn configured_rule_without_group_rejected() {
        let config = RosterConfig {
            room_rules: vec![RoomRuleConfig { pattern: r"Turma \w+".into(), grade: None }],
            ..RosterConfig::default()
        };
        let err = RosterRules::from_config(&config).unwrap_err();
        assert!(matches!(err, ReconError::InvalidPattern { .. }));
    }

    #[test]
    fn room_state_transitions() {
        let mut state = RoomState::default();
        assert_eq!(state.room(), None);
        state.enter("1CM".into(), Some(Grade::Year9));
        assert_eq!(state.room(), Some("1CM"));
        assert_eq!(state.grade(), Grade::Year9);
        state.enter("2CM".into(), None);
        assert_eq!(state.room(), Some("2CM"));
        assert_eq!(state.grade(), Grade::Unidentified);
    }
}
