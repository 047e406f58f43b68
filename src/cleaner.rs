//! The traversal engine: a single recursive, post-order walk that deletes old
//! files, prunes emptied directories bottom-up, and accumulates run totals.
//!
//! Every filesystem call site is fallible in isolation: a failure is turned
//! into one error event and one counter increment, and the walk moves on to
//! the next entry. Nothing escapes `run` as an error.

use crate::age::file_age_days;
use crate::config::RunConfig;
use crate::events::{Event, EventSink};
use crate::{age, filter};

use chrono::NaiveDateTime;
use std::fs::{self, Metadata};
use std::io;
use std::path::{Path, PathBuf};

/// Totals for one run. Counters only increase, and only in lockstep with a
/// matching emitted event.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RunStats {
    pub files_deleted: u64,
    pub bytes_deleted: u64,
    pub directories_deleted: u64,
    pub errors: u64,
}

/// Walk the configured tree, deleting eligible files and pruning emptied
/// directories, emitting one event per outcome. Returns the accumulated
/// totals after emitting the summary event.
///
/// Expects a validated [`RunConfig`]. In simulate mode the filesystem is
/// never touched but events and counters are produced identically, with
/// deletion events relabeled as hypothetical.
pub fn run(config: &RunConfig, sink: &mut dyn EventSink) -> RunStats {
    let mut stats = RunStats::default();
    let today = age::start_of_today();

    clean_directory(config, &config.root, 0, today, &mut stats, sink);

    sink.emit(&Event::Summary {
        files: stats.files_deleted,
        bytes: stats.bytes_deleted,
        directories: stats.directories_deleted,
        errors: stats.errors,
        simulate: config.simulate,
    });

    stats
}

/// Process one directory at the given depth below the root. Returns true if
/// the directory was removed (or would have been, when simulating), so the
/// parent can account for it in its own emptiness check.
fn clean_directory(
    config: &RunConfig,
    dir: &Path,
    depth: usize,
    today: NaiveDateTime,
    stats: &mut RunStats,
    sink: &mut dyn EventSink,
) -> bool {
    // The ignore marker short-circuits the whole subtree, before any listing
    if dir.join(&config.ignore_file_name).exists() {
        sink.emit(&Event::DirectorySkipped {
            path: dir.to_path_buf(),
            marker: config.ignore_file_name.clone(),
        });
        return false;
    }

    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(err) => {
            report_error(dir, &err, stats, sink);
            return false;
        }
    };

    let mut subdirs: Vec<PathBuf> = Vec::new();
    let mut files: Vec<(PathBuf, Metadata)> = Vec::new();

    for entry in entries {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                report_error(dir, &err, stats, sink);
                continue;
            }
        };

        let path = entry.path();
        // symlink_metadata so links are treated as plain files, never followed
        match fs::symlink_metadata(&path) {
            Ok(meta) if meta.is_dir() => subdirs.push(path),
            Ok(meta) => files.push((path, meta)),
            Err(err) => report_error(&path, &err, stats, sink),
        }
    }

    // Children are finalized, including their own pruning, before this
    // directory's files and emptiness are evaluated; that is what lets a
    // chain of nested now-empty directories collapse in a single pass.
    let mut remaining_subdirs = subdirs.len();
    if config.recurse {
        for subdir in &subdirs {
            if clean_directory(config, subdir, depth + 1, today, stats, sink) {
                remaining_subdirs -= 1;
            }
        }
    }

    let mut remaining_files = files.len();
    for (path, meta) in &files {
        // Filtered-out files are skipped silently: no event, no counter
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        if !filter::passes(&name, &config.include, &config.exclude) {
            continue;
        }

        let age_days = match file_age_days(meta, today) {
            Ok(age_days) => age_days,
            Err(err) => {
                report_error(path, &err, stats, sink);
                continue;
            }
        };

        // Age 0 means delete everything, even future-dated files
        if config.max_age_days > 0 && age_days < i64::from(config.max_age_days) {
            continue;
        }

        let size = meta.len();
        if !config.simulate {
            if let Err(err) = delete_file(path, meta) {
                report_error(path, &err, stats, sink);
                continue;
            }
        }

        sink.emit(&Event::FileDeleted {
            path: path.clone(),
            age_days,
            size,
            simulated: config.simulate,
        });
        stats.files_deleted += 1;
        stats.bytes_deleted += size;
        remaining_files -= 1;
    }

    if config.delete_empty_dirs && depth >= config.empty_dir_min_depth {
        // A real run re-checks the directory live, so entries created
        // concurrently keep it alive; a simulated run can only reason from
        // what it would have removed.
        let empty = if config.simulate {
            remaining_files == 0 && remaining_subdirs == 0
        } else {
            match is_empty(dir) {
                Ok(empty) => empty,
                Err(err) => {
                    report_error(dir, &err, stats, sink);
                    false
                }
            }
        };

        if empty {
            if !config.simulate {
                if let Err(err) = fs::remove_dir(dir) {
                    report_error(dir, &err, stats, sink);
                    return false;
                }
            }
            sink.emit(&Event::DirectoryDeleted {
                path: dir.to_path_buf(),
                simulated: config.simulate,
            });
            stats.directories_deleted += 1;
            return true;
        }
    }

    false
}

/// Clear a read-only permission bit if present, then delete the file.
fn delete_file(path: &Path, meta: &Metadata) -> io::Result<()> {
    let mut permissions = meta.permissions();
    if permissions.readonly() {
        permissions.set_readonly(false);
        fs::set_permissions(path, permissions)?;
    }
    fs::remove_file(path)
}

fn is_empty(dir: &Path) -> io::Result<bool> {
    Ok(fs::read_dir(dir)?.next().is_none())
}

fn report_error(
    path: &Path,
    err: &dyn std::fmt::Display,
    stats: &mut RunStats,
    sink: &mut dyn EventSink,
) {
    sink.emit(&Event::EntryError {
        path: path.to_path_buf(),
        message: err.to_string(),
    });
    stats.errors += 1;
}
