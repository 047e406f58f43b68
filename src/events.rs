//! Run events and their console/log rendering.
//!
//! The traversal engine emits one event per outcome (skip, deletion, error,
//! summary); sinks decide how to render them. The console sink writes colored
//! lines to stdout/stderr and can mirror every line, timestamped, into an
//! append-only log file.

use anyhow::{Context, Result};
use chrono::Local;
use colored::Colorize;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

/// A single run outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// The run has started; the filter patterns are echoed so a log reader
    /// can tell which parameters produced the deletions that follow
    RunStarted {
        root: PathBuf,
        simulate: bool,
        include: Option<String>,
        exclude: Option<String>,
    },
    /// A directory (and its whole subtree) was skipped due to an ignore marker
    DirectorySkipped { path: PathBuf, marker: String },
    /// A file was deleted, or would have been in simulation
    FileDeleted {
        path: PathBuf,
        age_days: i64,
        size: u64,
        simulated: bool,
    },
    /// An emptied directory was removed, or would have been in simulation
    DirectoryDeleted { path: PathBuf, simulated: bool },
    /// A single entry could not be processed; the run continues
    EntryError { path: PathBuf, message: String },
    /// End-of-run totals
    Summary {
        files: u64,
        bytes: u64,
        directories: u64,
        errors: u64,
        simulate: bool,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Deletion,
    Error,
    Summary,
}

impl Event {
    pub fn severity(&self) -> Severity {
        match self {
            Event::RunStarted { .. } | Event::DirectorySkipped { .. } => Severity::Info,
            Event::FileDeleted { .. } | Event::DirectoryDeleted { .. } => Severity::Deletion,
            Event::EntryError { .. } => Severity::Error,
            Event::Summary { .. } => Severity::Summary,
        }
    }

    /// Render the event as a single human-readable line
    pub fn render(&self) -> String {
        match self {
            Event::RunStarted {
                root,
                simulate,
                include,
                exclude,
            } => {
                let mut line = format!("Cleanup of {} started", root.display());
                if let Some(pattern) = include {
                    line.push_str(&format!(", including only {pattern}"));
                }
                if let Some(pattern) = exclude {
                    line.push_str(&format!(", excluding {pattern}"));
                }
                if *simulate {
                    line.push_str(" (simulation, nothing will be deleted)");
                }
                line
            }
            Event::DirectorySkipped { path, marker } => {
                format!("Skipping directory: {} ({} present)", path.display(), marker)
            }
            Event::FileDeleted {
                path,
                age_days,
                size,
                simulated,
            } => {
                let verb = if *simulated { "Would delete file" } else { "Deleted file" };
                format!(
                    "{}: {} Age({}) Size({})",
                    verb,
                    path.display(),
                    age_days,
                    format_size(*size)
                )
            }
            Event::DirectoryDeleted { path, simulated } => {
                let verb = if *simulated { "Would delete dir" } else { "Deleted dir" };
                format!("{}: {}", verb, path.display())
            }
            Event::EntryError { path, message } => {
                format!("Error: {} ({})", path.display(), message)
            }
            Event::Summary {
                files,
                bytes,
                directories,
                errors,
                simulate,
            } => {
                let verb = if *simulate { "Would have deleted" } else { "Deleted" };
                format!(
                    "{} {} files ({}) and {} directories, encountered {} errors.",
                    verb,
                    files,
                    format_size(*bytes),
                    directories,
                    errors
                )
            }
        }
    }
}

/// Consumer of the ordered event stream produced by one run.
pub trait EventSink {
    fn emit(&mut self, event: &Event);
}

/// Collecting sink for tests and embedding
impl EventSink for Vec<Event> {
    fn emit(&mut self, event: &Event) {
        self.push(event.clone());
    }
}

/// Renders events to the console, optionally mirroring them into a log file.
pub struct ConsoleSink {
    log: Option<File>,
}

impl ConsoleSink {
    pub fn new() -> Self {
        ConsoleSink { log: None }
    }

    /// Console sink that also appends every line to `path`, prefixed with a
    /// local timestamp. Fails up front if the file cannot be opened for
    /// appending.
    pub fn with_log_file(path: &Path) -> Result<Self> {
        let log = OpenOptions::new()
            .append(true)
            .create(true)
            .open(path)
            .with_context(|| format!("Unable to write to log file {}", path.display()))?;

        Ok(ConsoleSink { log: Some(log) })
    }
}

impl Default for ConsoleSink {
    fn default() -> Self {
        Self::new()
    }
}

impl EventSink for ConsoleSink {
    fn emit(&mut self, event: &Event) {
        let line = event.render();

        match event.severity() {
            Severity::Error => eprintln!("{}", line.red()),
            Severity::Summary => println!("\n{}", line.bold()),
            Severity::Info | Severity::Deletion => println!("{}", line),
        }

        if let Some(log) = self.log.as_mut() {
            // A failed log write should not take down the run
            let _ = writeln!(log, "{} {}", Local::now().format("%Y-%m-%d %H:%M:%S"), line);
        }
    }
}

const SIZE_UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];

/// Format a byte count for humans: divide by 1024 until the value drops under
/// 1024 or units run out at GB, then print with at most two decimal places.
pub fn format_size(bytes: u64) -> String {
    let mut value = bytes as f64;
    let mut unit = 0;

    while value >= 1024.0 && unit + 1 < SIZE_UNITS.len() {
        value /= 1024.0;
        unit += 1;
    }

    let mut rendered = format!("{value:.2}");
    if rendered.contains('.') {
        rendered = rendered
            .trim_end_matches('0')
            .trim_end_matches('.')
            .to_string();
    }

    format!("{} {}", rendered, SIZE_UNITS[unit])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_size_zero() {
        assert_eq!(format_size(0), "0 B");
    }

    #[test]
    fn test_format_size_bytes() {
        assert_eq!(format_size(512), "512 B");
        assert_eq!(format_size(1023), "1023 B");
    }

    #[test]
    fn test_format_size_kilobytes() {
        assert_eq!(format_size(1024), "1 KB");
        assert_eq!(format_size(1536), "1.5 KB");
    }

    #[test]
    fn test_format_size_two_decimals() {
        // 1.2509765625 KB rounds to 1.25
        assert_eq!(format_size(1281), "1.25 KB");
    }

    #[test]
    fn test_format_size_gigabytes() {
        assert_eq!(format_size(1_073_741_824), "1 GB");
    }

    #[test]
    fn test_format_size_does_not_escalate_past_gb() {
        assert_eq!(format_size(5_368_709_120), "5 GB");
    }

    #[test]
    fn test_banner_echoes_filter_patterns() {
        let event = Event::RunStarted {
            root: PathBuf::from("/data"),
            simulate: true,
            include: Some("report*.csv".to_string()),
            exclude: Some("*archive*".to_string()),
        };
        assert_eq!(
            event.render(),
            "Cleanup of /data started, including only report*.csv, \
             excluding *archive* (simulation, nothing will be deleted)"
        );
    }

    #[test]
    fn test_banner_without_filters() {
        let event = Event::RunStarted {
            root: PathBuf::from("/data"),
            simulate: false,
            include: None,
            exclude: None,
        };
        assert_eq!(event.render(), "Cleanup of /data started");
    }

    #[test]
    fn test_severity_tags() {
        let error = Event::EntryError {
            path: PathBuf::from("/tmp/x"),
            message: "denied".to_string(),
        };
        assert_eq!(error.severity(), Severity::Error);

        let skip = Event::DirectorySkipped {
            path: PathBuf::from("/tmp/x"),
            marker: ".cleanupignore".to_string(),
        };
        assert_eq!(skip.severity(), Severity::Info);
    }

    #[test]
    fn test_simulated_wording() {
        let event = Event::FileDeleted {
            path: PathBuf::from("/tmp/old.log"),
            age_days: 12,
            size: 1536,
            simulated: true,
        };
        let line = event.render();
        assert!(line.starts_with("Would delete file"));
        assert!(line.contains("Age(12)"));
        assert!(line.contains("Size(1.5 KB)"));
    }

    #[test]
    fn test_summary_wording() {
        let real = Event::Summary {
            files: 3,
            bytes: 2048,
            directories: 1,
            errors: 0,
            simulate: false,
        };
        assert_eq!(
            real.render(),
            "Deleted 3 files (2 KB) and 1 directories, encountered 0 errors."
        );

        let simulated = Event::Summary {
            files: 3,
            bytes: 2048,
            directories: 1,
            errors: 0,
            simulate: true,
        };
        assert!(simulated.render().starts_with("Would have deleted"));
    }

    #[test]
    fn test_vec_sink_collects_in_order() {
        let mut sink: Vec<Event> = Vec::new();
        let first = Event::RunStarted {
            root: PathBuf::from("/tmp"),
            simulate: false,
            include: None,
            exclude: None,
        };
        let second = Event::DirectoryDeleted {
            path: PathBuf::from("/tmp/a"),
            simulated: false,
        };
        sink.emit(&first);
        sink.emit(&second);
        assert_eq!(sink, vec![first, second]);
    }
}
