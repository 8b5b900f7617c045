use serde::{Deserialize, Serialize};

use crate::error::ReconError;
use crate::model::{Grade, DEFAULT_SLOT_WIDTH, MAX_SLOT_WIDTH, UNIDENTIFIED_ROOM};

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

/// Run configuration, loaded from `sheetjoin.toml`. Every section defaults.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ReconConfig {
    pub roster: RosterConfig,
    pub answers: AnswerConfig,
    pub discovery: DiscoveryConfig,
    pub output: OutputConfig,
}

impl ReconConfig {
    /// Parse and validate a TOML config.
    pub fn from_toml(s: &str) -> Result<Self, ReconError> {
        let config: Self = toml::from_str(s).map_err(|e| ReconError::ConfigParse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml(&self) -> Result<String, ReconError> {
        toml::to_string_pretty(self).map_err(|e| ReconError::ConfigParse(e.to_string()))
    }

    pub fn validate(&self) -> Result<(), ReconError> {
        if self.answers.max_slots == 0 {
            return Err(ReconError::ConfigValidation(
                "answers.max_slots must be at least 1".into(),
            ));
        }
        if self.answers.max_slots > MAX_SLOT_WIDTH {
            return Err(ReconError::ConfigValidation(format!(
                "answers.max_slots must be at most {MAX_SLOT_WIDTH} ({} given)",
                self.answers.max_slots
            )));
        }
        if self.answers.marker.trim().is_empty() {
            return Err(ReconError::ConfigValidation(
                "answers.marker must not be empty".into(),
            ));
        }
        if ('A'..='E').contains(&self.answers.wildcard) || self.answers.wildcard.is_whitespace() {
            return Err(ReconError::ConfigValidation(format!(
                "answers.wildcard '{}' collides with the mark alphabet",
                self.answers.wildcard
            )));
        }
        if self.roster.unidentified_room.trim().is_empty() {
            return Err(ReconError::ConfigValidation(
                "roster.unidentified_room must not be empty".into(),
            ));
        }
        for (kind, patterns) in [
            ("roster", &self.discovery.roster_patterns),
            ("answer", &self.discovery.answer_patterns),
        ] {
            if patterns.is_empty() {
                return Err(ReconError::ConfigValidation(format!(
                    "discovery: at least one {kind} pattern is required"
                )));
            }
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Roster
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct RosterConfig {
    /// Lines containing any of these are column headers and are skipped.
    pub header_keywords: Vec<String>,
    /// Label used for students listed before any room header.
    pub unidentified_room: String,
    /// Extra room-header rules, tried before the built-in cascade.
    pub room_rules: Vec<RoomRuleConfig>,
}

impl Default for RosterConfig {
    fn default() -> Self {
        Self {
            header_keywords: vec!["Código".into()],
            unidentified_room: UNIDENTIFIED_ROOM.into(),
            room_rules: Vec::new(),
        }
    }
}

/// A room-header pattern. Group 1 must capture the room code.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct RoomRuleConfig {
    pub pattern: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grade: Option<Grade>,
}

// ---------------------------------------------------------------------------
// Answers
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct AnswerConfig {
    /// Text that precedes the card number on every answer line.
    pub marker: String,
    /// Mark printed for an illegible or multiply-marked bubble.
    pub wildcard: char,
    /// Width of the slot array. Longer runs are truncated and reported.
    pub max_slots: usize,
}

impl Default for AnswerConfig {
    fn default() -> Self {
        Self {
            marker: "N".into(),
            wildcard: '*',
            max_slots: DEFAULT_SLOT_WIDTH,
        }
    }
}

// ---------------------------------------------------------------------------
// Discovery + Output
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct DiscoveryConfig {
    pub roster_patterns: Vec<String>,
    pub answer_patterns: Vec<String>,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            roster_patterns: vec!["**/nomes*.txt".into(), "**/nome*.txt".into()],
            answer_patterns: vec!["**/respostas*.txt".into(), "**/resposta*.txt".into()],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Directory the workbook is written to (default: current directory).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dir: Option<String>,
    /// Workbook file name prefix; a timestamp is appended.
    pub prefix: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: None,
            prefix: "Results".into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_is_all_defaults() {
        let config = ReconConfig::from_toml("").unwrap();
        assert_eq!(config, ReconConfig::default());
        assert_eq!(config.answers.max_slots, 150);
        assert_eq!(config.answers.wildcard, '*');
        assert_eq!(config.roster.header_keywords, vec!["Código".to_string()]);
    }

    #[test]
    fn partial_sections() {
        let toml = r#"
[answers]
max_slots = 90

[[roster.room_rules]]
pattern = '(\d+FM)\s*-\s*3ª\s*Série'

[[roster.room_rules]]
pattern = '(\d+GM)'
grade = "9º Ano"

[output]
dir = "out"
"#;
        let config = ReconConfig::from_toml(toml).unwrap();
        assert_eq!(config.answers.max_slots, 90);
        assert_eq!(config.answers.marker, "N");
        assert_eq!(config.roster.room_rules.len(), 2);
        assert_eq!(config.roster.room_rules[0].grade, None);
        assert_eq!(config.roster.room_rules[1].grade, Some(Grade::Year9));
        assert_eq!(config.output.dir.as_deref(), Some("out"));
        assert_eq!(config.output.prefix, "Results");
    }

    #[test]
    fn zero_slots_rejected() {
        let err = ReconConfig::from_toml("[answers]\nmax_slots = 0\n").unwrap_err();
        assert!(matches!(err, ReconError::ConfigValidation(_)));
    }

    #[test]
    fn slot_width_capped_at_sheet_columns() {
        let err = ReconConfig::from_toml("[answers]\nmax_slots = 16380\n").unwrap_err();
        assert!(matches!(err, ReconError::ConfigValidation(ref m) if m.contains("16379")));

        let config = ReconConfig::from_toml("[answers]\nmax_slots = 16379\n").unwrap();
        assert_eq!(config.answers.max_slots, MAX_SLOT_WIDTH);
    }

    #[test]
    fn wildcard_inside_alphabet_rejected() {
        let err = ReconConfig::from_toml("[answers]\nwildcard = \"C\"\n").unwrap_err();
        assert!(matches!(err, ReconError::ConfigValidation(_)));
    }

    #[test]
    fn unknown_grade_is_a_parse_error() {
        let toml = r#"
[[roster.room_rules]]
pattern = '(\d+ZM)'
grade = "10º Ano"
"#;
        let err = ReconConfig::from_toml(toml).unwrap_err();
        assert!(matches!(err, ReconError::ConfigParse(_)));
    }

    #[test]
    fn empty_discovery_rejected() {
        let err = ReconConfig::from_toml("[discovery]\nroster_patterns = []\n").unwrap_err();
        assert!(matches!(err, ReconError::ConfigValidation(_)));
    }

    #[test]
    fn toml_round_trip_of_defaults() {
        let text = ReconConfig::default().to_toml().unwrap();
        assert_eq!(ReconConfig::from_toml(&text).unwrap(), ReconConfig::default());
    }
}
