use anyhow::Result;
use clap::Parser;
use staleclean::cleaner;
use staleclean::config::RunConfig;
use staleclean::events::{ConsoleSink, Event, EventSink};
use staleclean::filter::NameFilter;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Delete files older than a given age and prune the directories they leave empty",
    long_about = None
)]
struct Args {
    /// Directory to clean
    root: PathBuf,

    /// Delete files older than this many days (0 deletes every matching file)
    age: u32,

    /// Recurse into subdirectories
    #[arg(long, short)]
    recurse: bool,

    /// Remove subdirectories left empty after deletion
    #[arg(long, short)]
    delete_empty: bool,

    /// Minimum depth below the root at which empty directories may be removed
    #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u16).range(1..))]
    min_depth: u16,

    /// Report what would be deleted without touching the filesystem
    #[arg(long, short)]
    simulate: bool,

    /// Only delete files whose name matches this pattern (* and ? wildcards)
    #[arg(long, value_name = "PATTERN")]
    include: Option<String>,

    /// Never delete files whose name matches this pattern
    #[arg(long, value_name = "PATTERN")]
    exclude: Option<String>,

    /// Append output to a log file
    #[arg(
        long,
        value_name = "FILE",
        num_args = 0..=1,
        require_equals = true,
        default_missing_value = "staleclean.log"
    )]
    log: Option<PathBuf>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = RunConfig::new(&args.root, args.age)?;
    config.recurse = args.recurse;
    config.delete_empty_dirs = args.delete_empty;
    config.empty_dir_min_depth = usize::from(args.min_depth);
    config.simulate = args.simulate;
    if let Some(pattern) = args.include.as_deref() {
        config.include = Some(NameFilter::compile(pattern)?);
    }
    if let Some(pattern) = args.exclude.as_deref() {
        config.exclude = Some(NameFilter::compile(pattern)?);
    }
    config.validate()?;

    let mut sink = match &args.log {
        Some(path) => ConsoleSink::with_log_file(path)?,
        None => ConsoleSink::new(),
    };

    sink.emit(&Event::RunStarted {
        root: config.root.clone(),
        simulate: config.simulate,
        include: config.include.as_ref().map(|f| f.pattern().to_string()),
        exclude: config.exclude.as_ref().map(|f| f.pattern().to_string()),
    });
    cleaner::run(&config, &mut sink);

    Ok(())
}
