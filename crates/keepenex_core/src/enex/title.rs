//! Note title derivation.
//!
//! Attempts, first success wins:
//! 1. explicit title;
//! 2. snippet of the first body line;
//! 3. the sole annotation's title, when the title is still empty or is a
//!    bare URL;
//! 4. snippet of the first non-empty checklist item;
//! 5. snippet of the first non-empty annotation title.

use crate::model::note::{Annotation, NoteRecord};

/// Longest first line used as a title without truncation.
pub const TITLE_MAX_CHARS: usize = 80;
/// Marker appended to truncated titles.
pub const ELLIPSIS: &str = " …";

/// Derives the output title for a note; may be empty only when the note has
/// no body, no checklist text and no titled annotation.
pub fn derive_title(record: &NoteRecord) -> String {
    let mut title = match record.explicit_title() {
        Some(explicit) => explicit.to_string(),
        None => snippet(first_line(&record.text_content)),
    };

    if let Some(annotation_title) = record.sole_annotation().and_then(Annotation::title) {
        if title.is_empty() || looks_like_bare_url(&title) {
            title = annotation_title.to_string();
        }
    }

    if title.is_empty() {
        if let Some(item_text) = record
            .checklist
            .iter()
            .map(|item| item.text.trim())
            .find(|text| !text.is_empty())
        {
            title = snippet(first_line(item_text));
        }
    }

    if title.is_empty() {
        if let Some(annotation_title) = record
            .annotations
            .iter()
            .filter_map(Annotation::title)
            .map(str::trim)
            .find(|text| !text.is_empty())
        {
            title = snippet(first_line(annotation_title));
        }
    }

    title
}

/// Shortens a line to a title: verbatim up to 80 chars, otherwise cut at the
/// last space within the first 79 chars (or hard-cut at 78) plus `" …"`.
pub fn snippet(line: &str) -> String {
    if line.chars().count() <= TITLE_MAX_CHARS {
        return line.to_string();
    }

    let head: String = line.chars().take(TITLE_MAX_CHARS - 1).collect();
    let mut cut = match head.rfind(' ') {
        Some(index) => head[..index].to_string(),
        None => head,
    };
    if cut.chars().count() > TITLE_MAX_CHARS - 2 {
        cut = line.chars().take(TITLE_MAX_CHARS - 2).collect();
    }
    cut.push_str(ELLIPSIS);
    cut
}

/// Title that is only a link, e.g. a pasted URL or its truncated snippet.
pub fn looks_like_bare_url(title: &str) -> bool {
    title.starts_with("http") && !title.trim_matches([' ', '…']).contains(' ')
}

fn first_line(text: &str) -> &str {
    text.split('\n').next().unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::{looks_like_bare_url, snippet};

    #[test]
    fn short_lines_are_kept_verbatim() {
        let line = "x".repeat(80);
        assert_eq!(snippet(&line), line);
    }

    #[test]
    fn long_line_is_cut_at_last_space_in_window() {
        let line = format!("{} {}", "a".repeat(60), "b".repeat(29));
        assert_eq!(line.chars().count(), 90);
        assert_eq!(snippet(&line), format!("{} …", "a".repeat(60)));
    }

    #[test]
    fn long_line_without_space_is_hard_cut_at_78() {
        let line = format!("{} tail", "c".repeat(85));
        assert_eq!(snippet(&line), format!("{} …", "c".repeat(78)));
    }

    #[test]
    fn space_at_window_end_keeps_78_chars() {
        let line = format!("{} {}", "d".repeat(78), "e".repeat(20));
        assert_eq!(snippet(&line), format!("{} …", "d".repeat(78)));
    }

    #[test]
    fn truncation_counts_characters_not_bytes() {
        let line = "é".repeat(81);
        let title = snippet(&line);
        assert_eq!(title, format!("{} …", "é".repeat(78)));
    }

    #[test]
    fn bare_url_detection_ignores_ellipsis() {
        assert!(looks_like_bare_url("https://example.com/a"));
        assert!(looks_like_bare_url("https://example.com/very/long …"));
        assert!(!looks_like_bare_url("https://example.com is great"));
        assert!(!looks_like_bare_url("example.com"));
    }
}
