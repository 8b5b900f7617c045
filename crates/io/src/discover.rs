// Input discovery: glob the working tree for roster and answer exports.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use sheetjoin_recon::config::DiscoveryConfig;
use sheetjoin_recon::SourceSet;

const MATCH_OPTS: glob::MatchOptions = glob::MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: false,
};

/// Find roster and answer files under `root`.
///
/// Patterns are relative to `root`. Each kind is de-duplicated across its
/// patterns and sorted. Directories and entries that cannot be read are
/// skipped. Only a malformed pattern is an error.
pub fn discover(root: &Path, config: &DiscoveryConfig) -> Result<SourceSet, String> {
    let roster = find_all(root, &config.roster_patterns)?;
    let answers = find_all(root, &config.answer_patterns)?;
    log::info!(
        "discovered {} roster and {} answer files under {}",
        roster.len(),
        answers.len(),
        root.display()
    );
    Ok(SourceSet::new(roster, answers))
}

fn find_all(root: &Path, patterns: &[String]) -> Result<Vec<PathBuf>, String> {
    let base = glob::Pattern::escape(&root.to_string_lossy());
    let mut found = BTreeSet::new();

    for pattern in patterns {
        let full = format!("{}/{}", base.trim_end_matches('/'), pattern);
        let entries = glob::glob_with(&full, MATCH_OPTS)
            .map_err(|e| format!("Invalid discovery pattern '{}': {}", pattern, e))?;

        for entry in entries {
            match entry {
                Ok(path) if path.is_file() => {
                    found.insert(path);
                }
                Ok(_) => {}
                Err(e) => log::warn!("skipping {}: {}", e.path().display(), e.error()),
            }
        }
    }

    Ok(found.into_iter().collect())
}
