//! Note content merging and content-document construction.
//!
//! # Responsibility
//! - Merge body text, checklist and annotations into one markup string.
//! - Wrap the markup in an `en-note` content document and verify it parses.
//!
//! # Invariants
//! - All source text is entity-escaped before it is merged; the only markup
//!   introduced here is `<br />`.
//! - Body newlines become `<br />` because the importer drops bare newlines.

use crate::enex::tree::escape_text;
use crate::model::note::{Annotation, ChecklistItem, NoteRecord};
use quick_xml::events::Event;
use quick_xml::Reader;

/// Explicit line break used in place of body newlines.
pub const LINE_BREAK: &str = "<br />";
const RULE_SEPARATOR: &str = "\n\n---\n\n";
const ANNOTATION_LEAD: &str = "<br /><br />---\n\n";

/// XML declaration of the embedded content document.
pub const CONTENT_DECLARATION: &str =
    "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"no\"?>";
/// Document type of the embedded content document.
pub const CONTENT_DOCTYPE: &str =
    "<!DOCTYPE en-note SYSTEM \"http://xml.evernote.com/pub/enml2.dtd\">";

/// Merges body, checklist and annotations into the final markup.
///
/// `title` is the already-derived title; it takes part in the redundant
/// body check.
pub fn merge_content(record: &NoteRecord, title: &str) -> String {
    let body = if is_redundant_body(record, title) {
        ""
    } else {
        record.text_content.as_str()
    };
    let mut text = escape_text(body).replace('\n', LINE_BREAK);

    if !record.checklist.is_empty() {
        let checklist = record
            .checklist
            .iter()
            .map(|item| escape_text(&checklist_line(item)))
            .collect::<Vec<_>>()
            .join("\n\n");
        text = if text.is_empty() {
            checklist
        } else {
            format!("{text}{RULE_SEPARATOR}{checklist}")
        };
    }

    let annotations = record
        .annotations
        .iter()
        .map(|annotation| escape_text(&annotation_block(annotation)))
        .collect::<Vec<_>>()
        .join(RULE_SEPARATOR);

    match (text.is_empty(), annotations.is_empty()) {
        (false, false) => format!("{text}{ANNOTATION_LEAD}{annotations}"),
        (false, true) => text,
        (true, _) => annotations,
    }
}

/// Returns whether the body only repeats the sole annotation, either as its
/// bare URL or as `"<title>\n<url>"`.
///
/// Notes with several annotations are never deduplicated.
pub fn is_redundant_body(record: &NoteRecord, title: &str) -> bool {
    let Some(annotation) = record.sole_annotation() else {
        return false;
    };
    let url = annotation.url.as_deref().unwrap_or_default();
    let body = record.text_content.as_str();
    body == url || (!title.is_empty() && body == format!("{title}\n{url}"))
}

/// Markdown checkbox line, e.g. `- [x] milk`.
pub fn checklist_line(item: &ChecklistItem) -> String {
    let mark = if item.is_checked { 'x' } else { ' ' };
    let text = item.text.trim_end();
    if text.is_empty() {
        format!("- [{mark}]")
    } else {
        format!("- [{mark}] {text}")
    }
}

/// Heading, quote and link lines of one annotation, blank-line separated.
pub fn annotation_block(annotation: &Annotation) -> String {
    let heading = annotation.title().map(|title| format!("## {title}"));
    let quote = annotation
        .description()
        .map(|description| format!("> {description}"));
    let link = annotation.url().map(|url| format!("[source]({url})"));

    [heading, quote, link]
        .into_iter()
        .flatten()
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Wraps merged markup into a complete content document.
///
/// # Errors
/// - Returns a reason string when the wrapped markup is not well-formed XML.
pub fn content_document(markup: &str) -> Result<String, String> {
    let note = format!("<en-note>{markup}</en-note>");
    check_well_formed(&note)?;
    Ok(format!("{CONTENT_DECLARATION}\n{CONTENT_DOCTYPE}\n{note}"))
}

fn check_well_formed(xml: &str) -> Result<(), String> {
    if let Some(invalid) = xml.chars().find(|ch| !is_xml_char(*ch)) {
        return Err(format!(
            "character U+{:04X} is not allowed in XML",
            u32::from(invalid)
        ));
    }

    let mut reader = Reader::from_str(xml);
    let mut depth = 0usize;
    loop {
        match reader.read_event() {
            Ok(Event::Start(_)) => depth += 1,
            Ok(Event::End(_)) => depth = depth.saturating_sub(1),
            Ok(Event::Text(text)) => {
                text.unescape()
                    .map_err(|err| format!("bad entity reference: {err}"))?;
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(err) => {
                return Err(format!(
                    "malformed markup near byte {}: {err}",
                    reader.buffer_position()
                ))
            }
        }
    }

    if depth != 0 {
        return Err("unclosed element at end of content".to_string());
    }
    Ok(())
}

fn is_xml_char(ch: char) -> bool {
    matches!(
        ch,
        '\t' | '\n' | '\r' | '\u{20}'..='\u{D7FF}' | '\u{E000}'..='\u{FFFD}' | '\u{10000}'..='\u{10FFFF}'
    )
}
