use std::fmt;

use crate::model::SourceKind;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconError {
    /// TOML parse / deserialization error.
    ConfigParse(String),
    /// Config validation error (zero slot width, bad marker, etc.).
    ConfigValidation(String),
    /// A configured rule pattern does not compile.
    InvalidPattern { pattern: String, reason: String },
    /// One input file could not be read or decoded. Recovered per file.
    FileUnreadable { path: String, reason: String },
    /// Discovery produced no files of this kind.
    NoFilesFound { kind: SourceKind },
    /// Files of this kind were read but no line was recognized.
    EmptyPostParse { kind: SourceKind },
    /// Both sides parsed, but no key appears on both.
    NoMatches { roster: usize, answers: usize },
}

impl fmt::Display for ReconError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ConfigParse(msg) => write!(f, "config parse error: {msg}"),
            Self::ConfigValidation(msg) => write!(f, "config validation error: {msg}"),
            Self::InvalidPattern { pattern, reason } => {
                write!(f, "invalid pattern '{pattern}': {reason}")
            }
            Self::FileUnreadable { path, reason } => {
                write!(f, "cannot read '{path}': {reason}")
            }
            Self::NoFilesFound { kind } => write!(f, "no {kind} files found"),
            Self::EmptyPostParse { kind } => {
                write!(f, "{kind} files contained no recognizable records")
            }
            Self::NoMatches { roster, answers } => write!(
                f,
                "no identifiers matched ({roster} roster records, {answers} answer records)"
            ),
        }
    }
}

impl std::error::Error for ReconError {}
