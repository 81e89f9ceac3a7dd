//! Lazy record source over Keep export files.
//!
//! # Responsibility
//! - Read one JSON document per input path, in the given order.
//! - Attach provenance to every record it yields.
//!
//! # Invariants
//! - At most one file is read per `next()` call.
//! - A read or parse failure is yielded as an error item; callers treat it
//!   as fatal for the run.

use crate::model::note::NoteRecord;
use log::debug;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

pub type SourceResult<T> = Result<T, SourceError>;

/// Failure to turn one input file into a note record.
#[derive(Debug)]
pub enum SourceError {
    /// The file could not be read.
    Unreadable {
        path: PathBuf,
        source: std::io::Error,
    },
    /// The file is not a JSON object of the expected shape.
    Malformed {
        path: PathBuf,
        source: serde_json::Error,
    },
}

impl SourceError {
    /// Input path that failed.
    pub fn path(&self) -> &PathBuf {
        match self {
            Self::Unreadable { path, .. } | Self::Malformed { path, .. } => path,
        }
    }
}

impl Display for SourceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unreadable { path, source } => {
                write!(f, "cannot read note file `{}`: {source}", path.display())
            }
            Self::Malformed { path, source } => {
                write!(f, "malformed note file `{}`: {source}", path.display())
            }
        }
    }
}

impl Error for SourceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Unreadable { source, .. } => Some(source),
            Self::Malformed { source, .. } => Some(source),
        }
    }
}

/// Iterator yielding one [`NoteRecord`] per input path.
pub struct RecordSource<I> {
    paths: I,
}

impl<I> RecordSource<I>
where
    I: Iterator<Item = PathBuf>,
{
    /// Creates a source over the given ordered input locations.
    pub fn new(paths: impl IntoIterator<Item = PathBuf, IntoIter = I>) -> Self {
        Self {
            paths: paths.into_iter(),
        }
    }
}

impl<I> Iterator for RecordSource<I>
where
    I: Iterator<Item = PathBuf>,
{
    type Item = SourceResult<NoteRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        let path = self.paths.next()?;
        Some(read_record(path))
    }
}

/// Reads and parses one Keep export file.
pub fn read_record(path: PathBuf) -> SourceResult<NoteRecord> {
    let raw = match std::fs::read_to_string(&path) {
        Ok(raw) => raw,
        Err(source) => return Err(SourceError::Unreadable { path, source }),
    };
    match NoteRecord::from_json_str(&raw, path.clone()) {
        Ok(record) => {
            debug!(
                "event=record_read module=source status=ok file={}",
                path.display()
            );
            Ok(record)
        }
        Err(source) => Err(SourceError::Malformed { path, source }),
    }
}
