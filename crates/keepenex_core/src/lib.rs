//! Core conversion logic for keepenex.
//! Turns Google Keep export records into ENEX documents for note importers.

pub mod config;
pub mod convert;
pub mod diagnostics;
pub mod enex;
pub mod logging;
pub mod model;
pub mod pipeline;
pub mod source;

pub use config::ConvertOptions;
pub use convert::{convert, convert_at, ConversionReport, ConvertError, OutputTarget};
pub use diagnostics::{Diagnostic, DiagnosticSink, LogSink};
pub use enex::builder::{BuiltDocument, DocumentBuilder};
pub use enex::render::{render_note, NoteBuildError, RenderedNote, TagPolicy, DEFAULT_IMPORT_TAG};
pub use enex::tree::{write_document, Element, Node, TreeWriter, XmlTreeWriter};
pub use logging::{default_log_level, init_logging, logging_status, LogTarget};
pub use model::note::{Annotation, Attachment, ChecklistItem, Label, NoteRecord};
pub use pipeline::{batched, filter_records, NoteFilter, DEFAULT_BATCH_SIZE};
pub use source::{RecordSource, SourceError};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
