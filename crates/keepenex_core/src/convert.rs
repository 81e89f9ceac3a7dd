//! Conversion driver: source → filter → batches → documents → destination.
//!
//! # Responsibility
//! - Run the pipeline end to end for one output target.
//! - Open, write and release one destination per batch, in order.
//!
//! # Invariants
//! - Source errors abort the run before the failing batch is written.
//! - A closed stdout consumer stops the run quietly.
//! - No two batches hold an open destination at the same time.

use crate::config::ConvertOptions;
use crate::diagnostics::{CountingSink, DiagnosticSink};
use crate::enex::builder::DocumentBuilder;
use crate::enex::tree::{write_document, Element, XmlTreeWriter};
use crate::model::note::NoteRecord;
use crate::pipeline::{batched, filter_records};
use crate::source::{RecordSource, SourceError};
use chrono::{DateTime, Utc};
use log::info;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::fs::OpenOptions;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;

/// Where batch documents are written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputTarget {
    /// All documents, one after another, on standard output.
    Stdout,
    /// One `conversion-<start>-<n>.enex` file per batch.
    Directory(PathBuf),
    /// First batch at the path, later batches at `<stem>-<n>.<ext>`.
    File(PathBuf),
}

impl OutputTarget {
    /// Destination path of batch `index`; `None` for stdout.
    pub fn batch_path(&self, started_unix: i64, index: usize) -> Option<PathBuf> {
        match self {
            Self::Stdout => None,
            Self::Directory(dir) => Some(dir.join(format!("conversion-{started_unix}-{index}.enex"))),
            Self::File(path) => Some(numbered_sibling(path, index)),
        }
    }
}

/// Fatal conversion failure.
#[derive(Debug)]
pub enum ConvertError {
    Source(SourceError),
    InvalidOptions(String),
    OutputOpen {
        path: PathBuf,
        source: io::Error,
    },
    OutputWrite {
        target: String,
        source: io::Error,
    },
}

impl Display for ConvertError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Source(err) => write!(f, "{err}"),
            Self::InvalidOptions(details) => write!(f, "invalid conversion options: {details}"),
            Self::OutputOpen { path, source } => {
                write!(f, "cannot open output `{}`: {source}", path.display())
            }
            Self::OutputWrite { target, source } => {
                write!(f, "cannot write output `{target}`: {source}")
            }
        }
    }
}

impl Error for ConvertError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Source(err) => Some(err),
            Self::OutputOpen { source, .. } | Self::OutputWrite { source, .. } => Some(source),
            Self::InvalidOptions(_) => None,
        }
    }
}

impl From<SourceError> for ConvertError {
    fn from(value: SourceError) -> Self {
        Self::Source(value)
    }
}

/// Summary of a finished run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConversionReport {
    /// Documents written.
    pub batches: usize,
    pub notes_written: usize,
    pub notes_dropped: usize,
    pub attachments_skipped: usize,
    /// Files written, in batch order; empty for stdout.
    pub outputs: Vec<PathBuf>,
    /// The stdout consumer went away before the run finished.
    pub stopped_early: bool,
}

enum BatchOutcome {
    Written(Option<PathBuf>),
    Closed,
}

/// Converts the given input files, stamping documents with the current time.
pub fn convert(
    paths: impl IntoIterator<Item = PathBuf>,
    target: &OutputTarget,
    options: &ConvertOptions,
    sink: &mut dyn DiagnosticSink,
) -> Result<ConversionReport, ConvertError> {
    convert_at(paths, target, options, sink, Utc::now())
}

/// Converts the given input files with an explicit export timestamp.
///
/// # Errors
/// - [`ConvertError::Source`] when an input file is unreadable or malformed.
/// - [`ConvertError::OutputOpen`] / [`ConvertError::OutputWrite`] on
///   destination failures other than a closed stdout consumer.
/// - [`ConvertError::InvalidOptions`] when `options` fail validation.
pub fn convert_at(
    paths: impl IntoIterator<Item = PathBuf>,
    target: &OutputTarget,
    options: &ConvertOptions,
    sink: &mut dyn DiagnosticSink,
    started_at: DateTime<Utc>,
) -> Result<ConversionReport, ConvertError> {
    options.validate().map_err(ConvertError::InvalidOptions)?;

    let timer = Instant::now();
    info!(
        "event=convert_start module=convert status=start batch_size={} target={:?}",
        options.batch_size, target
    );

    let mut counting = CountingSink::new(sink);
    let builder = DocumentBuilder::new(&options.tags, started_at);
    let records = filter_records(RecordSource::new(paths), &options.filter);
    let mut report = ConversionReport::default();

    for (index, window) in batched(records, options.batch_size).enumerate() {
        let window = window.into_iter().collect::<Result<Vec<NoteRecord>, _>>()?;
        let document = builder.build(&window, &mut counting);

        match write_batch(target, started_at.timestamp(), index, &document.root)? {
            BatchOutcome::Written(path) => {
                info!(
                    "event=batch_written module=convert status=ok batch={} notes={} output={}",
                    index,
                    document.notes,
                    path.as_deref()
                        .map(|path| path.display().to_string())
                        .unwrap_or_else(|| "stdout".to_string())
                );
                report.batches += 1;
                report.notes_written += document.notes;
                report.outputs.extend(path);
            }
            BatchOutcome::Closed => {
                info!("event=output_closed module=convert status=skip batch={index}");
                report.stopped_early = true;
                break;
            }
        }
    }

    report.notes_dropped = counting.notes_dropped;
    report.attachments_skipped = counting.attachments_skipped;
    info!(
        "event=convert_done module=convert status=ok duration_ms={} batches={} notes={} dropped={} attachments_skipped={}",
        timer.elapsed().as_millis(),
        report.batches,
        report.notes_written,
        report.notes_dropped,
        report.attachments_skipped
    );
    Ok(report)
}

fn write_batch(
    target: &OutputTarget,
    started_unix: i64,
    index: usize,
    root: &Element,
) -> Result<BatchOutcome, ConvertError> {
    match target.batch_path(started_unix, index) {
        None => {
            let stdout = io::stdout();
            let mut handle = stdout.lock();
            write_stream(&mut handle, root)
        }
        Some(path) => write_file(path, root).map(|path| BatchOutcome::Written(Some(path))),
    }
}

fn write_stream(out: &mut dyn Write, root: &Element) -> Result<BatchOutcome, ConvertError> {
    match write_document(root, out, &XmlTreeWriter) {
        Ok(()) => Ok(BatchOutcome::Written(None)),
        Err(err) if err.kind() == io::ErrorKind::BrokenPipe => Ok(BatchOutcome::Closed),
        Err(source) => Err(ConvertError::OutputWrite {
            target: "stdout".to_string(),
            source,
        }),
    }
}

fn write_file(path: PathBuf, root: &Element) -> Result<PathBuf, ConvertError> {
    // Existing files are never truncated.
    let file = match OpenOptions::new().write(true).create_new(true).open(&path) {
        Ok(file) => file,
        Err(source) => return Err(ConvertError::OutputOpen { path, source }),
    };
    let mut writer = BufWriter::new(file);
    if let Err(source) = write_document(root, &mut writer, &XmlTreeWriter) {
        return Err(ConvertError::OutputWrite {
            target: path.display().to_string(),
            source,
        });
    }
    Ok(path)
}

/// `notes.enex` → `notes-2.enex` for `index == 2`; index 0 is the path itself.
fn numbered_sibling(path: &Path, index: usize) -> PathBuf {
    if index == 0 {
        return path.to_path_buf();
    }
    let stem = path
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default();
    let name = match path.extension() {
        Some(ext) => format!("{stem}-{index}.{}", ext.to_string_lossy()),
        None => format!("{stem}-{index}"),
    };
    path.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::{numbered_sibling, write_stream, BatchOutcome, ConvertError, OutputTarget};
    use crate::enex::tree::Element;
    use std::io::{self, Write};
    use std::path::{Path, PathBuf};

    struct ClosedPipe;

    impl Write for ClosedPipe {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::from(io::ErrorKind::BrokenPipe))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    struct FullDisk;

    impl Write for FullDisk {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::other("no space left"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn broken_pipe_is_a_quiet_stop() {
        let outcome = write_stream(&mut ClosedPipe, &Element::new("en-export")).unwrap();
        assert!(matches!(outcome, BatchOutcome::Closed));
    }

    #[test]
    fn other_stream_failures_are_fatal() {
        let err = write_stream(&mut FullDisk, &Element::new("en-export"))
            .err()
            .expect("write failure must surface");
        assert!(matches!(err, ConvertError::OutputWrite { .. }));
    }

    #[test]
    fn batch_paths_follow_target_kind() {
        assert_eq!(OutputTarget::Stdout.batch_path(10, 0), None);
        assert_eq!(
            OutputTarget::Directory(PathBuf::from("/out")).batch_path(1700, 3),
            Some(PathBuf::from("/out/conversion-1700-3.enex"))
        );
        assert_eq!(
            OutputTarget::File(PathBuf::from("/out/notes.enex")).batch_path(1700, 0),
            Some(PathBuf::from("/out/notes.enex"))
        );
    }

    #[test]
    fn numbered_sibling_keeps_extension() {
        assert_eq!(
            numbered_sibling(Path::new("/out/notes.enex"), 2),
            PathBuf::from("/out/notes-2.enex")
        );
        assert_eq!(numbered_sibling(Path::new("plain"), 1), PathBuf::from("plain-1"));
    }
}
