//! `sheetjoin-recon`: roster / answer-sheet reconciliation engine.
//!
//! Pure engine crate: scans the two text exports into records, joins them on
//! a normalized student key and classifies every row. No export or CLI
//! dependencies.

pub mod answers;
pub mod config;
pub mod engine;
pub mod error;
pub mod evidence;
pub mod matcher;
pub mod model;
pub mod normalize;
pub mod roster;
pub mod series;

pub use answers::{scan_answers, AnswerScan};
pub use config::ReconConfig;
pub use engine::{run, SourceSet};
pub use error::ReconError;
pub use matcher::reconcile;
pub use model::{
    AnswerRecord, Grade, MatchStatus, ReconOutcome, ReconStats, ReconciledRow, RosterRecord,
    RunReport, SourceKind,
};
pub use roster::scan_roster;
pub use series::classify;
