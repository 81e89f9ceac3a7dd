//! Keep note record model.
//!
//! # Responsibility
//! - Mirror the fields of a Keep export JSON document that the converter
//!   consumes, with defaults for anything absent.
//! - Attach provenance once, at read time.
//!
//! # Invariants
//! - `text_content` is stored trimmed; derivation code relies on that.
//! - `provenance` is set exactly once by [`NoteRecord::from_json_str`].

use serde::Deserialize;
use std::path::{Path, PathBuf};

/// One to-do line of a Keep checklist note.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ChecklistItem {
    pub text: String,
    pub is_checked: bool,
}

/// Keep label; used for filtering and optional tag emission.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Label {
    pub name: String,
}

/// Auxiliary reference attached to a note, e.g. a saved web link.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Annotation {
    pub title: Option<String>,
    pub description: Option<String>,
    pub url: Option<String>,
}

impl Annotation {
    /// Title, treating an empty string as absent.
    pub fn title(&self) -> Option<&str> {
        non_empty(self.title.as_deref())
    }

    /// Description, treating an empty string as absent.
    pub fn description(&self) -> Option<&str> {
        non_empty(self.description.as_deref())
    }

    /// URL, treating an empty string as absent.
    pub fn url(&self) -> Option<&str> {
        non_empty(self.url.as_deref())
    }
}

/// Binary attachment stored next to the note JSON file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Attachment {
    /// Path relative to the directory holding the note JSON file.
    pub file_path: Option<String>,
    #[serde(rename = "mimetype")]
    pub mime_type: Option<String>,
}

/// Wire shape of a Keep export file, before provenance is attached.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct KeepNoteJson {
    title: Option<String>,
    text_content: String,
    list_content: Vec<ChecklistItem>,
    labels: Vec<Label>,
    annotations: Vec<Annotation>,
    attachments: Vec<Attachment>,
    is_pinned: bool,
    is_archived: bool,
    user_edited_timestamp_usec: i64,
}

/// Immutable note record with provenance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteRecord {
    /// Explicit title; may be absent or empty.
    pub title: Option<String>,
    /// Body text, trimmed at both ends.
    pub text_content: String,
    pub checklist: Vec<ChecklistItem>,
    pub labels: Vec<Label>,
    pub annotations: Vec<Annotation>,
    pub attachments: Vec<Attachment>,
    pub is_pinned: bool,
    pub is_archived: bool,
    /// Last user edit, microseconds since the Unix epoch.
    pub edited_usec: i64,
    /// File the record was read from.
    pub provenance: PathBuf,
}

impl NoteRecord {
    /// Parses one Keep export document and attaches its provenance.
    ///
    /// # Errors
    /// - Returns the JSON error when `raw` is not a JSON object of the
    ///   expected shape.
    pub fn from_json_str(raw: &str, provenance: impl Into<PathBuf>) -> serde_json::Result<Self> {
        let wire: KeepNoteJson = serde_json::from_str(raw)?;
        Ok(Self {
            title: wire.title,
            text_content: wire.text_content.trim().to_string(),
            checklist: wire.list_content,
            labels: wire.labels,
            annotations: wire.annotations,
            attachments: wire.attachments,
            is_pinned: wire.is_pinned,
            is_archived: wire.is_archived,
            edited_usec: wire.user_edited_timestamp_usec,
            provenance: provenance.into(),
        })
    }

    /// Explicit title, treating an empty string as absent.
    pub fn explicit_title(&self) -> Option<&str> {
        non_empty(self.title.as_deref())
    }

    /// The single annotation, when the note has exactly one.
    pub fn sole_annotation(&self) -> Option<&Annotation> {
        match self.annotations.as_slice() {
            [annotation] => Some(annotation),
            _ => None,
        }
    }

    /// Label names in source order.
    pub fn label_names(&self) -> impl Iterator<Item = &str> {
        self.labels.iter().map(|label| label.name.as_str())
    }

    /// File name of the provenance path, for output metadata.
    pub fn provenance_file_name(&self) -> String {
        self.provenance
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    /// Directory that attachment paths are resolved against.
    pub fn provenance_dir(&self) -> &Path {
        self.provenance.parent().unwrap_or_else(|| Path::new(""))
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|value| !value.is_empty())
}
