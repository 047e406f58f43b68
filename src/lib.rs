//! staleclean - delete old files and prune the directories they leave empty.
//!
//! Given a root directory and a maximum file age in days, staleclean deletes
//! files older than that age (optionally filtered by `*`/`?` name patterns),
//! optionally removes subdirectories left empty, and reports every outcome as
//! an ordered stream of events. A simulation mode produces the identical
//! event and counter trace without touching the filesystem.
//!
//! The walk is strictly sequential and post-order: a directory's children are
//! fully processed, including their own possible pruning, before the
//! directory's own files and emptiness are evaluated, so chains of nested
//! now-empty directories collapse bottom-up in a single pass. A directory
//! containing a `.cleanupignore` marker is skipped along with its whole
//! subtree. Per-entry failures are counted and reported, never fatal.

pub mod age;
pub mod cleaner;
pub mod config;
pub mod events;
pub mod filter;

// Re-export commonly used items
pub use cleaner::{run, RunStats};
pub use config::{RunConfig, IGNORE_FILE_NAME};
pub use events::{format_size, ConsoleSink, Event, EventSink, Severity};
pub use filter::NameFilter;
