//! Run configuration.

use crate::filter::NameFilter;
use anyhow::{bail, Result};
use std::path::{Path, PathBuf};

/// Marker filename whose presence makes the traversal skip a directory and
/// everything beneath it.
pub const IGNORE_FILE_NAME: &str = ".cleanupignore";

/// Validated parameters for one cleanup run, built once at startup.
#[derive(Debug)]
pub struct RunConfig {
    /// Directory the traversal starts from; depth 0, never deleted itself
    pub root: PathBuf,
    /// Delete files at least this many days old; 0 deletes every file that
    /// passes the filters, regardless of timestamps
    pub max_age_days: u32,
    /// Visit subdirectories at all
    pub recurse: bool,
    /// Remove directories left empty after file deletion
    pub delete_empty_dirs: bool,
    /// Minimum depth below the root at which empty directories may be
    /// removed; always at least 1, so the root is never prunable
    pub empty_dir_min_depth: usize,
    /// Report what would happen without touching the filesystem
    pub simulate: bool,
    /// Only files matching this filter are deletion candidates
    pub include: Option<NameFilter>,
    /// Files matching this filter are never deleted
    pub exclude: Option<NameFilter>,
    /// Name of the per-directory skip marker
    pub ignore_file_name: String,
}

impl RunConfig {
    /// Create a configuration with default flags for the given root and age
    /// threshold. Fails if the root does not exist as a directory.
    pub fn new(root: &Path, max_age_days: u32) -> Result<Self> {
        let config = RunConfig {
            root: strip_trailing_separator(root),
            max_age_days,
            recurse: false,
            delete_empty_dirs: false,
            empty_dir_min_depth: 1,
            simulate: false,
            include: None,
            exclude: None,
            ignore_file_name: IGNORE_FILE_NAME.to_string(),
        };
        config.validate()?;
        Ok(config)
    }

    /// Re-check the invariants the traversal engine relies on. Called again
    /// after the CLI has filled in optional fields.
    pub fn validate(&self) -> Result<()> {
        if !self.root.is_dir() {
            bail!("Directory {} does not exist", self.root.display());
        }
        if self.empty_dir_min_depth < 1 {
            bail!("Minimum empty-directory depth must be at least 1");
        }
        if self.ignore_file_name.is_empty() {
            bail!("Ignore marker filename must not be empty");
        }
        Ok(())
    }
}

/// Strip a trailing path separator so the root compares and displays
/// consistently; a bare root like `/` is left alone.
fn strip_trailing_separator(path: &Path) -> PathBuf {
    match path.to_str() {
        Some(s) if s.len() > 1 => {
            let trimmed = s.trim_end_matches(std::path::MAIN_SEPARATOR);
            if trimmed.is_empty() {
                path.to_path_buf()
            } else {
                PathBuf::from(trimmed)
            }
        }
        _ => path.to_path_buf(),
    }
}
