//! Batch document assembly.

use crate::diagnostics::{Diagnostic, DiagnosticSink};
use crate::enex::render::{render_note, TagPolicy};
use crate::enex::time::enex_datetime;
use crate::enex::tree::Element;
use crate::enex::{format_version, APP_NAME};
use crate::model::note::NoteRecord;
use chrono::{DateTime, Utc};
use log::debug;

/// Builds one `en-export` tree per batch of records.
pub struct DocumentBuilder<'a> {
    tags: &'a TagPolicy,
    export_date: String,
}

/// Output tree of one batch with its surviving note count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuiltDocument {
    pub root: Element,
    pub notes: usize,
}

impl<'a> DocumentBuilder<'a> {
    pub fn new(tags: &'a TagPolicy, export_date: DateTime<Utc>) -> Self {
        Self {
            tags,
            export_date: enex_datetime(export_date),
        }
    }

    /// Renders every record of the batch in order.
    ///
    /// Notes whose content fails to parse are reported to `sink` as
    /// [`Diagnostic::NoteDropped`] and left out; the batch continues.
    pub fn build(&self, records: &[NoteRecord], sink: &mut dyn DiagnosticSink) -> BuiltDocument {
        let mut root = Element::new("en-export")
            .attribute("export-date", self.export_date.as_str())
            .attribute("application", APP_NAME)
            .attribute("version", format_version());

        let mut notes = 0;
        for record in records {
            match render_note(record, self.tags, sink) {
                Ok(rendered) => {
                    root.push_element(rendered.to_element());
                    notes += 1;
                }
                Err(err) => sink.report(Diagnostic::NoteDropped {
                    provenance: record.provenance.clone(),
                    reason: err.to_string(),
                }),
            }
        }

        debug!(
            "event=document_built module=enex status=ok notes={} dropped={}",
            notes,
            records.len() - notes
        );
        BuiltDocument { root, notes }
    }
}
