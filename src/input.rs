//! Reading device and command list files

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

/// Read a list file: one entry per line, surrounding whitespace
/// trimmed, blank lines skipped. Order is preserved and nothing else
/// is interpreted; a `#` is part of the entry, not a comment.
pub fn read_lines(path: &Path) -> Result<Vec<String>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;

    Ok(content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(String::from)
        .collect())
}

/// Tilde-expand a user-supplied path.
pub fn expand_path(path: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(path).into_owned())
}
