//! Per-note and per-attachment diagnostics.
//!
//! # Responsibility
//! - Carry isolated failures (dropped note, skipped attachment) from the
//!   document builder to a caller-supplied sink.
//!
//! # Invariants
//! - Reporting a diagnostic never aborts the batch or the run.

use crate::logging::sanitize_message;
use log::warn;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

/// Isolated failure worth reporting to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    /// The note was left out of the output document.
    NoteDropped { provenance: PathBuf, reason: String },
    /// One attachment of the note was left out; the note itself was kept.
    AttachmentSkipped {
        provenance: PathBuf,
        attachment: String,
        reason: String,
    },
}

impl Display for Diagnostic {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoteDropped { provenance, reason } => {
                write!(f, "note `{}` dropped: {reason}", provenance.display())
            }
            Self::AttachmentSkipped {
                provenance,
                attachment,
                reason,
            } => write!(
                f,
                "attachment `{attachment}` of note `{}` skipped: {reason}",
                provenance.display()
            ),
        }
    }
}

/// Receiver of isolated failures.
pub trait DiagnosticSink {
    fn report(&mut self, diagnostic: Diagnostic);
}

impl DiagnosticSink for Vec<Diagnostic> {
    fn report(&mut self, diagnostic: Diagnostic) {
        self.push(diagnostic);
    }
}

/// Sink writing every diagnostic to the log at `warn` level.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl DiagnosticSink for LogSink {
    fn report(&mut self, diagnostic: Diagnostic) {
        match &diagnostic {
            Diagnostic::NoteDropped { provenance, reason } => warn!(
                "event=note_dropped module=enex status=error file={} error={}",
                provenance.display(),
                sanitize_message(reason, 240)
            ),
            Diagnostic::AttachmentSkipped {
                provenance,
                attachment,
                reason,
            } => warn!(
                "event=attachment_skipped module=enex status=skip file={} attachment={:?} error={}",
                provenance.display(),
                attachment,
                sanitize_message(reason, 240)
            ),
        }
    }
}

/// Sink wrapper counting what passes through.
pub struct CountingSink<'a> {
    inner: &'a mut dyn DiagnosticSink,
    pub notes_dropped: usize,
    pub attachments_skipped: usize,
}

impl<'a> CountingSink<'a> {
    pub fn new(inner: &'a mut dyn DiagnosticSink) -> Self {
        Self {
            inner,
            notes_dropped: 0,
            attachments_skipped: 0,
        }
    }
}

impl DiagnosticSink for CountingSink<'_> {
    fn report(&mut self, diagnostic: Diagnostic) {
        match diagnostic {
            Diagnostic::NoteDropped { .. } => self.notes_dropped += 1,
            Diagnostic::AttachmentSkipped { .. } => self.attachments_skipped += 1,
        }
        self.inner.report(diagnostic);
    }
}
