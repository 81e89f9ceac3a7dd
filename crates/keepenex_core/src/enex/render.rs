//! Per-note rendering into the ENEX note surface.
//!
//! # Responsibility
//! - Turn one [`NoteRecord`] into a [`RenderedNote`]: title, content
//!   document, tags, attributes and resources.
//! - Isolate failures: a bad content document drops the note, an unreadable
//!   attachment drops only that resource.
//!
//! # Invariants
//! - Records are read, never mutated.
//! - Tags are own labels (when imported) followed by universal tags, in
//!   order, without deduplication.

use crate::diagnostics::{Diagnostic, DiagnosticSink};
use crate::enex::content::{content_document, merge_content};
use crate::enex::time::{enex_datetime_from_usec, enex_epoch};
use crate::enex::title::derive_title;
use crate::enex::tree::{Element, Node};
use crate::enex::{code_name, SOURCE_APPLICATION};
use crate::model::note::{Attachment, NoteRecord};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

/// Tag emitted on every imported note unless configured otherwise.
pub const DEFAULT_IMPORT_TAG: &str = "keep-import";
/// Text of `reminder-order`; the importer only checks for its presence.
pub const REMINDER_ORDER_MARK: &str = "yes";

/// Which tags are written for each note.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagPolicy {
    /// Re-create the note's own Keep labels as tags.
    pub import_labels: bool,
    /// Tags appended to every note, in order.
    pub universal_tags: Vec<String>,
}

impl Default for TagPolicy {
    fn default() -> Self {
        Self {
            import_labels: true,
            universal_tags: vec![DEFAULT_IMPORT_TAG.to_string()],
        }
    }
}

impl TagPolicy {
    /// Final tag list for one note.
    pub fn tags_for(&self, record: &NoteRecord) -> Vec<String> {
        let own = record
            .label_names()
            .filter(|_| self.import_labels)
            .map(str::to_string);
        own.chain(self.universal_tags.iter().cloned()).collect()
    }
}

/// Reason a note could not be rendered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NoteBuildError {
    /// Merged markup did not parse as a content document.
    ContentParse { provenance: PathBuf, reason: String },
}

impl Display for NoteBuildError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ContentParse { provenance, reason } => write!(
                f,
                "content re-parsing error in `{}`: {reason}",
                provenance.display()
            ),
        }
    }
}

impl Error for NoteBuildError {}

/// Reason one attachment could not be embedded.
#[derive(Debug)]
pub enum AttachmentError {
    /// The attachment entry has no file path.
    NoPath,
    Missing(PathBuf),
    NotAFile(PathBuf),
    Unreadable {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl Display for AttachmentError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoPath => write!(f, "attachment has no file path"),
            Self::Missing(path) => write!(f, "file not found: `{}`", path.display()),
            Self::NotAFile(path) => write!(f, "not a regular file: `{}`", path.display()),
            Self::Unreadable { path, source } => {
                write!(f, "cannot read `{}`: {source}", path.display())
            }
        }
    }
}

impl Error for AttachmentError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Unreadable { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Embedded attachment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resource {
    /// Base64 (standard alphabet, padded) file bytes.
    pub data: String,
    pub mime: Option<String>,
}

/// Task-list marker derived from the checklist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reminder {
    /// At least one item is unchecked.
    Open,
    /// Every item is checked; completion time is the note's update time.
    Done { at: String },
}

/// `note-attributes` block of a rendered note.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteAttributes {
    pub source_url: Option<String>,
    pub reminder: Option<Reminder>,
    /// File name of the source JSON document.
    pub takeout_file: String,
}

/// Derived, output-ready view of one note.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedNote {
    pub title: String,
    pub created: String,
    pub updated: String,
    pub tags: Vec<String>,
    /// Complete content document, including its own preamble.
    pub content: String,
    pub attributes: NoteAttributes,
    pub resources: Vec<Resource>,
}

impl RenderedNote {
    /// Builds the `note` element of the export tree.
    pub fn to_element(&self) -> Element {
        let mut note = Element::new("note");
        note.push_element(Element::with_text("title", self.title.as_str()));
        note.push_element(Element::with_text("created", self.created.as_str()));
        note.push_element(Element::with_text("updated", self.updated.as_str()));
        for tag in &self.tags {
            note.push_element(Element::with_text("tag", tag.as_str()));
        }

        let mut content = Element::new("content");
        content.push(Node::RawText(self.content.clone()));
        note.push_element(content);

        let mut attributes = Element::new("note-attributes");
        attributes.push_element(Element::with_text("source", code_name()));
        attributes.push_element(Element::with_text("source-application", SOURCE_APPLICATION));
        match &self.attributes.reminder {
            Some(Reminder::Open) => {
                attributes.push_element(Element::with_text("reminder-order", REMINDER_ORDER_MARK));
            }
            Some(Reminder::Done { at }) => {
                attributes.push_element(Element::with_text("reminder-order", REMINDER_ORDER_MARK));
                attributes.push_element(Element::with_text("reminder-done-time", at.as_str()));
            }
            None => {}
        }
        if let Some(url) = &self.attributes.source_url {
            attributes.push_element(Element::with_text("source-url", url.as_str()));
        }
        attributes.push_element(Element::with_text(
            "takeout-file",
            self.attributes.takeout_file.as_str(),
        ));
        note.push_element(attributes);

        for resource in &self.resources {
            let mut element = Element::new("resource");
            element.push_element(
                Element::with_text("data", resource.data.as_str()).attribute("encoding", "base64"),
            );
            if let Some(mime) = &resource.mime {
                element.push_element(Element::with_text("mime", mime.as_str()));
            }
            note.push_element(element);
        }

        note
    }
}

/// Renders one note, reporting skipped attachments to `sink`.
///
/// # Errors
/// - Returns [`NoteBuildError::ContentParse`] when the merged markup is not
///   well-formed; the caller drops the note.
pub fn render_note(
    record: &NoteRecord,
    tags: &TagPolicy,
    sink: &mut dyn DiagnosticSink,
) -> Result<RenderedNote, NoteBuildError> {
    let title = derive_title(record);
    let markup = merge_content(record, &title);
    let content = content_document(&markup).map_err(|reason| NoteBuildError::ContentParse {
        provenance: record.provenance.clone(),
        reason,
    })?;

    let updated = enex_datetime_from_usec(record.edited_usec);
    let reminder = reminder_for(record, &updated);
    let source_url = record
        .sole_annotation()
        .and_then(|annotation| annotation.url())
        .map(str::to_string);

    let mut resources = Vec::with_capacity(record.attachments.len());
    for attachment in &record.attachments {
        match load_resource(record, attachment) {
            Ok(resource) => resources.push(resource),
            Err(err) => sink.report(Diagnostic::AttachmentSkipped {
                provenance: record.provenance.clone(),
                attachment: attachment.file_path.clone().unwrap_or_default(),
                reason: err.to_string(),
            }),
        }
    }

    Ok(RenderedNote {
        title,
        created: enex_epoch(),
        tags: tags.tags_for(record),
        content,
        attributes: NoteAttributes {
            source_url,
            reminder,
            takeout_file: record.provenance_file_name(),
        },
        resources,
        updated,
    })
}

/// Checklist notes become task lists; fully checked ones are completed at
/// `updated`.
pub fn reminder_for(record: &NoteRecord, updated: &str) -> Option<Reminder> {
    if record.checklist.is_empty() {
        return None;
    }
    if record.checklist.iter().all(|item| item.is_checked) {
        Some(Reminder::Done {
            at: updated.to_string(),
        })
    } else {
        Some(Reminder::Open)
    }
}

/// Reads one attachment relative to the note's directory and encodes it.
///
/// # Errors
/// - Returns an [`AttachmentError`] when the path is absent, missing, not a
///   regular file, or unreadable.
pub fn load_resource(record: &NoteRecord, attachment: &Attachment) -> Result<Resource, AttachmentError> {
    let relative = attachment
        .file_path
        .as_deref()
        .filter(|path| !path.is_empty())
        .ok_or(AttachmentError::NoPath)?;
    let path = record.provenance_dir().join(relative);

    let metadata = match std::fs::metadata(&path) {
        Ok(metadata) => metadata,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            return Err(AttachmentError::Missing(path))
        }
        Err(source) => return Err(AttachmentError::Unreadable { path, source }),
    };
    if !metadata.is_file() {
        return Err(AttachmentError::NotAFile(path));
    }

    let bytes = match std::fs::read(&path) {
        Ok(bytes) => bytes,
        Err(source) => return Err(AttachmentError::Unreadable { path, source }),
    };

    Ok(Resource {
        data: STANDARD.encode(bytes),
        mime: attachment.mime_type.clone().filter(|mime| !mime.is_empty()),
    })
}
