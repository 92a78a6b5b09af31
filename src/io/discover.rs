use std::path::{Path, PathBuf};
use std::time::SystemTime;

use glob::{MatchOptions, Pattern, glob_with};

use crate::error::{Result, ToolError};

/// Workbook extensions accepted for the call log and the lookup.
pub const WORKBOOK_PATTERNS: [&str; 2] = ["*.xlsx", "*.xls"];
/// Extensions accepted for contact files.
pub const CONTACT_PATTERNS: [&str; 1] = ["*.csv"];

/// Prefix Excel gives the lock file of an open workbook.
const OFFICE_LOCK_PREFIX: &str = "~$";

/// Lists the files in `dir` (not recursing) matching any of `patterns`,
/// case-insensitively, sorted by path.
pub fn list_files(dir: &Path, patterns: &[&str]) -> Result<Vec<PathBuf>> {
    let options = MatchOptions {
        case_sensitive: false,
        ..MatchOptions::new()
    };
    let base = Pattern::escape(&dir.to_string_lossy());

    let mut files = Vec::new();
    for pattern in patterns {
        let full = Path::new(&base).join(pattern);
        for entry in glob_with(&full.to_string_lossy(), options)? {
            let path = entry.map_err(glob::GlobError::into_error)?;
            if path.is_file() && !is_lock_file(&path) {
                files.push(path);
            }
        }
    }
    files.sort();
    files.dedup();

    if files.is_empty() {
        return Err(ToolError::NoMatchingFiles {
            dir: dir.to_path_buf(),
            patterns: patterns.iter().map(|p| p.to_string()).collect(),
        });
    }
    Ok(files)
}

/// The matching file in `dir` with the most recent modification time. Ties
/// go to the last path in sorted order.
pub fn latest_file(dir: &Path, patterns: &[&str]) -> Result<PathBuf> {
    let mut latest: Option<(SystemTime, PathBuf)> = None;
    for path in list_files(dir, patterns)? {
        let modified = path.metadata()?.modified()?;
        if latest
            .as_ref()
            .is_none_or(|(newest, _)| modified >= *newest)
        {
            latest = Some((modified, path));
        }
    }
    latest
        .map(|(_, path)| path)
        .ok_or_else(|| ToolError::NoMatchingFiles {
            dir: dir.to_path_buf(),
            patterns: patterns.iter().map(|p| p.to_string()).collect(),
        })
}

fn is_lock_file(path: &Path) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| name.starts_with(OFFICE_LOCK_PREFIX))
}
