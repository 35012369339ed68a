//! On-disk migration discovery and scaffolding.
//!
//! A migration is a matched pair of scripts sharing a name stem:
//! `<stem>.up.sql` (required) and `<stem>.down.sql` (optional). Stems begin
//! with a sortable timestamp, so lexicographic order over stems is
//! chronological application order. Discovery sorts by stem regardless of
//! filesystem listing order; the rest of the runner depends on that.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::Utc;
use tracing::debug;

use crate::error::{MigrateError, Result};

const UP_SUFFIX: &str = ".up.sql";
const DOWN_SUFFIX: &str = ".down.sql";

/// Timestamp prefix format: ISO-8601 with colons replaced by dashes, so the
/// stem stays filesystem-safe and sorts chronologically.
const STEM_TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H-%M-%S";

/// A discovered on-disk migration pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationFile {
    /// Name stem shared by both scripts; unique within the directory.
    pub name: String,
    /// Forward script, always present.
    pub up_path: PathBuf,
    /// Inverse script; `None` makes rollback a warned no-op.
    pub down_path: Option<PathBuf>,
}

/// Scans a directory for migration pairs, sorted by name stem.
///
/// A nonexistent directory yields an empty list rather than an error, so a
/// project without migrations can still run `status`.
pub fn discover(dir: &Path) -> Result<Vec<MigrationFile>> {
    if !dir.exists() {
        debug!(dir = %dir.display(), "migrations directory absent");
        return Ok(Vec::new());
    }

    let mut found = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        let Some(file_name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        let Some(stem) = file_name.strip_suffix(UP_SUFFIX) else {
            continue;
        };
        let down_path = dir.join(format!("{stem}{DOWN_SUFFIX}"));
        found.push(MigrationFile {
            name: stem.to_string(),
            up_path: path.clone(),
            down_path: down_path.exists().then_some(down_path),
        });
    }

    found.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(found)
}

/// Scaffolds a new migration pair in `dir`, creating the directory if
/// needed.
///
/// The stem is the current UTC timestamp plus a slug of `name` (every
/// character other than alphanumerics, `_`, and `-` becomes `_`). Returns
/// the paths of the two template files written.
///
/// # Errors
///
/// [`MigrateError::InvalidName`] if the slug comes out empty;
/// [`MigrateError::AlreadyExists`] if either file is already on disk.
pub fn create(dir: &Path, name: &str) -> Result<(PathBuf, PathBuf)> {
    let slug = slugify(name);
    if slug.chars().all(|c| c == '_') {
        return Err(MigrateError::InvalidName);
    }

    let stem = format!("{}_{slug}", Utc::now().format(STEM_TIMESTAMP_FORMAT));
    let up_path = dir.join(format!("{stem}{UP_SUFFIX}"));
    let down_path = dir.join(format!("{stem}{DOWN_SUFFIX}"));
    if up_path.exists() || down_path.exists() {
        return Err(MigrateError::AlreadyExists(stem));
    }

    fs::create_dir_all(dir)?;
    fs::write(&up_path, format!("-- {stem}\n-- Forward schema change; applied inside one transaction.\n"))?;
    fs::write(&down_path, format!("-- {stem}\n-- Inverse of the forward change; delete this file for a forward-only migration.\n"))?;
    debug!(stem = %stem, dir = %dir.display(), "scaffolded migration pair");
    Ok((up_path, down_path))
}

fn slugify(name: &str) -> String {
    name.trim()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
                c
            } else {
                '_'
            }
        })
        .collect()
}
