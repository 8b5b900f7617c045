//! CLI Exit Code Registry
//!
//! This is the single source of truth for all CLI exit codes.
//! Exit codes are part of the shell contract: scripts rely on them.
//!
//! # Exit Codes
//!
//! | Code | Meaning                                              |
//! |------|------------------------------------------------------|
//! | 0    | Success                                              |
//! | 1    | General error (unspecified)                          |
//! | 2    | CLI usage error (bad args, missing file)             |
//! | 3    | No roster or no answer files found                   |
//! | 4    | Files found but one side parsed to zero records      |
//! | 5    | Both sides parsed but no key matched                 |
//! | 6    | Invalid configuration (TOML, values, patterns)       |
//! | 7    | Export failed (workbook, CSV or JSON)                |
//! | 8    | `--strict` tripped (unreadable files or overflow)    |
//!
//! # Adding New Exit Codes
//!
//! 1. Add the constant
//! 2. Document what triggers it
//! 3. Update the table above
//! 4. Wire it into the relevant command's error handling

use sheetjoin_recon::ReconError;

// =============================================================================
// Universal (0-2)
// =============================================================================

/// Success - command completed without errors.
pub const EXIT_SUCCESS: u8 = 0;

/// General error - unspecified failure.
/// Avoid using this; prefer a specific error code.
pub const EXIT_ERROR: u8 = 1;

/// Usage error - bad arguments, missing required options.
pub const EXIT_USAGE: u8 = 2;

// =============================================================================
// Run (3-8)
// =============================================================================

/// Discovery (or the explicit file lists) produced no files for a side.
pub const EXIT_NO_FILES: u8 = 3;

/// Files were read but one side yielded zero records.
pub const EXIT_EMPTY_PARSE: u8 = 4;

/// Both sides had records but the join matched nothing.
pub const EXIT_NO_MATCHES: u8 = 5;

/// Config file unreadable as TOML, failed validation, or carries a bad pattern.
pub const EXIT_CONFIG: u8 = 6;

/// Writing the workbook, CSV or JSON output failed.
pub const EXIT_EXPORT: u8 = 7;

/// Run completed, but `--strict` was set and files were skipped or answer
/// runs were truncated.
pub const EXIT_STRICT: u8 = 8;

/// Map an engine error to its exit code.
pub fn recon_exit_code(err: &ReconError) -> u8 {
    match err {
        ReconError::NoFilesFound { .. } => EXIT_NO_FILES,
        ReconError::EmptyPostParse { .. } => EXIT_EMPTY_PARSE,
        ReconError::NoMatches { .. } => EXIT_NO_MATCHES,
        ReconError::ConfigParse(_)
        | ReconError::ConfigValidation(_)
        | ReconError::InvalidPattern { .. } => EXIT_CONFIG,
        ReconError::FileUnreadable { .. } => EXIT_USAGE,
    }
}
