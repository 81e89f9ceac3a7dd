//! keepenex command-line entry point.
//!
//! # Responsibility
//! - Parse and validate flags, expand inputs, resolve the output target.
//! - Run the core conversion and map outcomes to exit codes.
//!
//! # Invariants
//! - Exit code 0 on success (including a closed stdout consumer), 1 on a
//!   fatal conversion error, 2 on a usage error.
//! - Log output never goes to stdout.

mod inputs;

use clap::error::ErrorKind;
use clap::{CommandFactory, Parser};
use keepenex_core::{
    convert, default_log_level, init_logging, ConvertOptions, LogSink, LogTarget, NoteFilter,
    TagPolicy, DEFAULT_BATCH_SIZE, DEFAULT_IMPORT_TAG,
};
use log::error;
use std::num::NonZeroUsize;
use std::path::PathBuf;
use std::process::ExitCode;

/// Keep-to-ENEX converter for migrating Google Keep notes to Evernote,
/// Joplin and other ENEX importers.
#[derive(Debug, Parser)]
#[command(name = "keepenex", version)]
struct Cli {
    /// Maximum number of notes to write to each ENEX document.
    #[arg(long, value_name = "INT", default_value_t = default_size(), value_parser = parse_batch_size)]
    size: NonZeroUsize,

    /// Tag(s) to apply to imported notes (default: 'keep-import').
    #[arg(long = "tag", value_name = "NAME", conflicts_with_all = ["no_extra_tag", "no_tags"])]
    tags: Vec<String>,

    /// Do not apply additional tag(s) to imported notes.
    #[arg(long)]
    no_extra_tag: bool,

    /// Do not recreate imported notes' tags (from Keep).
    #[arg(long)]
    no_import_tag: bool,

    /// Do not create any tags at all.
    #[arg(long, conflicts_with_all = ["no_import_tag", "no_extra_tag"])]
    no_tags: bool,

    /// Only import notes with these tag(s).
    #[arg(long, value_name = "NAME")]
    only_tagged: Vec<String>,

    /// Only import pinned notes.
    #[arg(long, conflicts_with = "none_pinned")]
    only_pinned: bool,

    /// Do not import pinned notes.
    #[arg(long)]
    none_pinned: bool,

    /// Do not import archived notes.
    #[arg(long, conflicts_with = "only_in_archive")]
    none_in_archive: bool,

    /// Only import archived notes.
    #[arg(long)]
    only_in_archive: bool,

    /// Path to an output directory or file (default: stdout).
    #[arg(long, value_name = "PATH", default_value = "-")]
    out: String,

    /// Log level: trace|debug|info|warn|error.
    #[arg(long, value_name = "LEVEL")]
    log_level: Option<String>,

    /// Write logs to rolling files in this absolute directory instead of stderr.
    #[arg(long, value_name = "DIR")]
    log_dir: Option<PathBuf>,

    /// Path to a JSON file or a directory of JSON file(s).
    #[arg(value_name = "PATH", required = true)]
    paths: Vec<PathBuf>,
}

impl Cli {
    fn options(&self) -> ConvertOptions {
        let universal_tags = if self.no_tags || self.no_extra_tag {
            Vec::new()
        } else {
            std::iter::once(DEFAULT_IMPORT_TAG.to_string())
                .chain(self.tags.iter().cloned())
                .collect()
        };

        ConvertOptions {
            filter: NoteFilter {
                pinned_only: self.only_pinned,
                exclude_pinned: self.none_pinned,
                archived_only: self.only_in_archive,
                exclude_archived: self.none_in_archive,
                tag_allowlist: None,
            }
            .with_tag_allowlist(self.only_tagged.iter().cloned()),
            batch_size: self.size,
            tags: TagPolicy {
                import_labels: !self.no_tags && !self.no_import_tag,
                universal_tags,
            },
        }
    }
}

fn default_size() -> NonZeroUsize {
    NonZeroUsize::new(DEFAULT_BATCH_SIZE).unwrap_or(NonZeroUsize::MIN)
}

fn parse_batch_size(value: &str) -> Result<NonZeroUsize, String> {
    value
        .trim()
        .parse::<NonZeroUsize>()
        .map_err(|_| format!("expected a positive integer, got `{value}`"))
}

fn usage_error(kind: ErrorKind, message: String) -> ExitCode {
    let err = Cli::command().error(kind, message);
    // Prints to stderr; clap reserves stdout for --help/--version.
    let _ = err.print();
    ExitCode::from(2)
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = cli.log_level.as_deref().unwrap_or(default_log_level());
    let target = match &cli.log_dir {
        Some(dir) => LogTarget::Directory(dir.clone()),
        None => LogTarget::Stderr,
    };
    if let Err(message) = init_logging(level, target) {
        return usage_error(ErrorKind::InvalidValue, message);
    }

    let paths = match inputs::expand_inputs(&cli.paths) {
        Ok(paths) => paths,
        Err(message) => return usage_error(ErrorKind::ValueValidation, message),
    };
    let output = match inputs::resolve_output(&cli.out) {
        Ok(output) => output,
        Err(message) => return usage_error(ErrorKind::ValueValidation, message),
    };

    match convert(paths, &output, &cli.options(), &mut LogSink) {
        Ok(_) => ExitCode::SUCCESS,
        Err(err) => {
            // Stderr logging would print the same failure twice.
            if cli.log_dir.is_some() {
                error!("event=convert_done module=cli status=error error={err}");
            }
            eprintln!("keepenex: {err}");
            ExitCode::from(1)
        }
    }
}
