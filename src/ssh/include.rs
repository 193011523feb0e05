// ABOUTME: Include directive expansion for SSH config files
// ABOUTME: Resolves patterns against the SSH directory and expands globs into regular files

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// How many files a single `Include` pattern contributes.
#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum IncludeMatches {
    /// Every matching file, in path order.
    #[default]
    All,
    /// Only the first matching file.
    First,
}

/// Turn an include pattern into an absolute glob pattern.
///
/// Relative patterns are resolved against `ssh_dir`, `~/` against the home
/// directory, absolute patterns are left untouched. The base directory is
/// escaped so only the user's part of the pattern can match wildcards.
pub fn resolve_include_pattern(pattern: &str, ssh_dir: &Path) -> PathBuf {
    if let Some(rest) = pattern.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return escape_base(&home).join(rest);
        }
    }

    let path = PathBuf::from(pattern);
    if path.is_absolute() {
        path
    } else {
        escape_base(ssh_dir).join(path)
    }
}

fn escape_base(dir: &Path) -> PathBuf {
    PathBuf::from(glob::Pattern::escape(&dir.to_string_lossy()))
}

// Like OpenSSH, wildcards never match a leading dot
const INCLUDE_MATCH_OPTIONS: glob::MatchOptions = glob::MatchOptions {
    case_sensitive: true,
    require_literal_separator: false,
    require_literal_leading_dot: true,
};

/// Expand an include pattern into the regular files it names.
///
/// An invalid pattern or a pattern that matches nothing yields no files.
pub fn expand_include(pattern: &str, ssh_dir: &Path, matches: IncludeMatches) -> Vec<PathBuf> {
    let resolved = resolve_include_pattern(pattern, ssh_dir);
    let resolved = resolved.to_string_lossy();

    let paths = match glob::glob_with(&resolved, INCLUDE_MATCH_OPTIONS) {
        Ok(paths) => paths,
        Err(e) => {
            tracing::debug!("Invalid include pattern '{}': {}", resolved, e);
            return Vec::new();
        }
    };

    let files = paths.filter_map(Result::ok).filter(|path| path.is_file());
    let files: Vec<PathBuf> = match matches {
        IncludeMatches::All => files.collect(),
        IncludeMatches::First => files.take(1).collect(),
    };

    if files.is_empty() {
        tracing::debug!("Include pattern '{}' matched no files", resolved);
    }

    files
}
