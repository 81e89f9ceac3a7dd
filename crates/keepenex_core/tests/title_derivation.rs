use keepenex_core::enex::title::derive_title;
use keepenex_core::NoteRecord;

fn note(raw: &str) -> NoteRecord {
    NoteRecord::from_json_str(raw, "/takeout/Keep/note.json").unwrap()
}

#[test]
fn explicit_title_wins() {
    let record = note(r#"{"title": "Groceries", "textContent": "milk\neggs"}"#);
    assert_eq!(derive_title(&record), "Groceries");
}

#[test]
fn empty_explicit_title_falls_back_to_first_body_line() {
    let record = note(r#"{"title": "", "textContent": "  first line\nsecond line"}"#);
    assert_eq!(derive_title(&record), "first line");
}

#[test]
fn long_first_line_is_truncated_at_word_boundary() {
    let line = format!("{} {}", "w".repeat(60), "x".repeat(29));
    let raw = serde_json::json!({ "textContent": line }).to_string();
    assert_eq!(derive_title(&note(&raw)), format!("{} …", "w".repeat(60)));
}

#[test]
fn long_first_line_without_space_is_hard_cut() {
    let raw = serde_json::json!({ "textContent": "z".repeat(90) }).to_string();
    let title = derive_title(&note(&raw));
    assert_eq!(title, format!("{} …", "z".repeat(78)));
}

#[test]
fn sole_annotation_title_replaces_bare_url_title() {
    let record = note(
        r#"{"textContent": "https://example.com/article",
            "annotations": [{"title": "An Article", "url": "https://example.com/article"}]}"#,
    );
    assert_eq!(derive_title(&record), "An Article");
}

#[test]
fn sole_annotation_title_does_not_replace_prose_title() {
    let record = note(
        r#"{"textContent": "read this later",
            "annotations": [{"title": "An Article", "url": "https://example.com"}]}"#,
    );
    assert_eq!(derive_title(&record), "read this later");
}

#[test]
fn several_annotations_supply_first_titled_one_when_nothing_else_does() {
    let record = note(
        r#"{"annotations": [{"url": "https://z"}, {"title": "A", "url": "https://a"}, {"title": "B", "url": "https://b"}]}"#,
    );
    assert_eq!(derive_title(&record), "A");
}

#[test]
fn several_annotations_do_not_replace_bare_url_title() {
    let record = note(
        r#"{"textContent": "https://a",
            "annotations": [{"title": "A", "url": "https://a"}, {"title": "B", "url": "https://b"}]}"#,
    );
    assert_eq!(derive_title(&record), "https://a");
}

#[test]
fn sole_annotation_title_fills_empty_title() {
    let record = note(r#"{"annotations": [{"title": "Saved link", "url": "https://a"}]}"#);
    assert_eq!(derive_title(&record), "Saved link");
}

#[test]
fn checklist_only_note_gets_title_from_first_item() {
    let record = note(r#"{"listContent": [{"text": ""}, {"text": "buy stamps"}]}"#);
    assert_eq!(derive_title(&record), "buy stamps");
}

#[test]
fn note_without_any_content_keeps_empty_title() {
    assert_eq!(derive_title(&note("{}")), "");
}

#[test]
fn title_is_non_empty_whenever_content_exists() {
    let cases = [
        r#"{"textContent": "x"}"#,
        r#"{"textContent": "\n\n  tail"}"#,
        r#"{"listContent": [{"text": "one", "isChecked": true}]}"#,
        r#"{"annotations": [{"title": "t"}]}"#,
        r#"{"annotations": [{"title": "A", "url": "https://a"}, {"title": "B", "url": "https://b"}]}"#,
        r#"{"textContent": "https://only.example", "annotations": [{"url": "https://only.example"}]}"#,
    ];
    for raw in cases {
        assert!(!derive_title(&note(raw)).is_empty(), "empty title for {raw}");
    }
}
