use chrono::{TimeZone, Utc};
use keepenex_core::enex::render::Reminder;
use keepenex_core::enex::tree::document_to_string;
use keepenex_core::source::read_record;
use keepenex_core::{render_note, Diagnostic, DocumentBuilder, NoteRecord, TagPolicy};
use std::path::Path;

fn note(raw: &str) -> NoteRecord {
    NoteRecord::from_json_str(raw, "/takeout/Keep/note.json").unwrap()
}

fn write_note(dir: &Path, name: &str, raw: &str) -> std::path::PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, raw).unwrap();
    path
}

#[test]
fn end_to_end_note_has_title_tags_and_escaped_content() {
    let record = note(r#"{"textContent": "Buy milk", "labels": [{"name": "errand"}]}"#);
    let mut diagnostics: Vec<Diagnostic> = Vec::new();
    let rendered = render_note(&record, &TagPolicy::default(), &mut diagnostics).unwrap();

    assert_eq!(rendered.title, "Buy milk");
    assert_eq!(rendered.tags, vec!["errand".to_string(), "keep-import".to_string()]);
    assert!(rendered.content.contains("<en-note>Buy milk</en-note>"));
    assert_eq!(rendered.created, "19700101T000000Z");
    assert_eq!(rendered.attributes.takeout_file, "note.json");
    assert!(diagnostics.is_empty());
}

#[test]
fn note_element_surface_matches_enex_layout() {
    let record = note(
        r#"{"textContent": "see link", "userEditedTimestampUsec": 1700000000000000,
            "listContent": [{"text": "a", "isChecked": true}],
            "annotations": [{"title": "Site", "url": "https://site.example/?a=1&b=2"}]}"#,
    );
    let rendered = render_note(&record, &TagPolicy::default(), &mut Vec::<Diagnostic>::new()).unwrap();
    let element = rendered.to_element();

    let names: Vec<&str> = element
        .children
        .iter()
        .filter_map(|node| match node {
            keepenex_core::Node::Element(child) => Some(child.name.as_str()),
            _ => None,
        })
        .collect();
    assert_eq!(
        names,
        vec!["title", "created", "updated", "tag", "content", "note-attributes"]
    );

    let attributes = element.element("note-attributes").unwrap();
    assert_eq!(
        attributes.element("source").unwrap().text(),
        keepenex_core::enex::code_name()
    );
    assert_eq!(attributes.element("reminder-order").unwrap().text(), "yes");
    assert_eq!(
        attributes.element("reminder-done-time").unwrap().text(),
        element.element("updated").unwrap().text()
    );
    assert_eq!(
        attributes.element("source-url").unwrap().text(),
        "https://site.example/?a=1&b=2"
    );

    let xml = document_to_string(&element);
    assert!(xml.contains("<source-url>https://site.example/?a=1&amp;b=2</source-url>"));
    assert!(xml.contains("<content>\n<![CDATA[<?xml version=\"1.0\""));
    assert!(xml.contains("[source](https://site.example/?a=1&amp;b=2)"));
}

#[test]
fn partially_checked_list_is_open_task_without_done_time() {
    let record = note(r#"{"listContent": [{"text": "a", "isChecked": true}, {"text": "b"}]}"#);
    let rendered = render_note(&record, &TagPolicy::default(), &mut Vec::<Diagnostic>::new()).unwrap();
    assert_eq!(rendered.attributes.reminder, Some(Reminder::Open));

    let element = rendered.to_element();
    let attributes = element.element("note-attributes").unwrap();
    assert!(attributes.element("reminder-order").is_some());
    assert!(attributes.element("reminder-done-time").is_none());
}

#[test]
fn fully_checked_list_completes_at_updated_time() {
    let record = note(
        r#"{"userEditedTimestampUsec": 1600000000000000,
            "listContent": [{"text": "a", "isChecked": true}, {"text": "b", "isChecked": true}]}"#,
    );
    let rendered = render_note(&record, &TagPolicy::default(), &mut Vec::<Diagnostic>::new()).unwrap();
    assert_eq!(rendered.updated, "20200913T122640Z");
    assert_eq!(
        rendered.attributes.reminder,
        Some(Reminder::Done {
            at: rendered.updated.clone()
        })
    );
}

#[test]
fn missing_attachment_is_skipped_and_reported() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("photo.png"), [1u8, 2, 3]).unwrap();
    let path = write_note(
        dir.path(),
        "note.json",
        r#"{"textContent": "pics", "attachments": [
            {"filePath": "photo.png", "mimetype": "image/png"},
            {"filePath": "gone.jpg", "mimetype": "image/jpeg"}]}"#,
    );
    let record = read_record(path).unwrap();

    let mut diagnostics: Vec<Diagnostic> = Vec::new();
    let rendered = render_note(&record, &TagPolicy::default(), &mut diagnostics).unwrap();

    assert_eq!(rendered.resources.len(), 1);
    assert_eq!(rendered.resources[0].data, "AQID");
    assert_eq!(rendered.resources[0].mime.as_deref(), Some("image/png"));
    assert_eq!(diagnostics.len(), 1);
    assert!(matches!(
        &diagnostics[0],
        Diagnostic::AttachmentSkipped { attachment, .. } if attachment == "gone.jpg"
    ));

    let element = rendered.to_element();
    let resource = element.element("resource").unwrap();
    let data = resource.element("data").unwrap();
    assert_eq!(data.attr("encoding"), Some("base64"));
    assert_eq!(data.text(), "AQID");
    assert_eq!(element.elements_named("resource").count(), 1);
}

#[test]
fn directory_attachment_is_not_a_resource() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::create_dir(dir.path().join("folder")).unwrap();
    let path = write_note(
        dir.path(),
        "note.json",
        r#"{"textContent": "x", "attachments": [{"filePath": "folder"}, {}]}"#,
    );
    let record = read_record(path).unwrap();

    let mut diagnostics: Vec<Diagnostic> = Vec::new();
    let rendered = render_note(&record, &TagPolicy::default(), &mut diagnostics).unwrap();
    assert!(rendered.resources.is_empty());
    assert_eq!(diagnostics.len(), 2);
}

#[test]
fn unparseable_content_drops_only_that_note() {
    let records = vec![
        note(r#"{"textContent": "first"}"#),
        NoteRecord::from_json_str(r#"{"textContent": "bad \u000b char"}"#, "/takeout/Keep/bad.json")
            .unwrap(),
        note(r#"{"textContent": "third"}"#),
    ];
    let policy = TagPolicy::default();
    let export_date = Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap();
    let builder = DocumentBuilder::new(&policy, export_date);

    let mut diagnostics: Vec<Diagnostic> = Vec::new();
    let document = builder.build(&records, &mut diagnostics);

    assert_eq!(document.notes, 2);
    assert_eq!(document.root.attr("export-date"), Some("20240102T030405Z"));
    let titles: Vec<String> = document
        .root
        .elements_named("note")
        .map(|note| note.element("title").unwrap().text())
        .collect();
    assert_eq!(titles, vec!["first".to_string(), "third".to_string()]);
    assert!(matches!(
        &diagnostics[..],
        [Diagnostic::NoteDropped { provenance, .. }] if provenance.ends_with("bad.json")
    ));
}

#[test]
fn serialized_document_has_single_preamble_and_root_metadata() {
    let policy = TagPolicy::default();
    let builder = DocumentBuilder::new(&policy, Utc.timestamp_opt(0, 0).unwrap());
    let document = builder.build(&[note(r#"{"textContent": "a\nb"}"#)], &mut Vec::<Diagnostic>::new());
    let xml = document_to_string(&document.root);

    assert!(xml.starts_with(
        "<?xml version='1.0' encoding='UTF-8'?>\n<!DOCTYPE en-export SYSTEM \"http://xml.evernote.com/pub/evernote-export3.dtd\">\n<en-export "
    ));
    assert_eq!(xml.matches("<!DOCTYPE en-export").count(), 1);
    assert!(xml.contains("export-date=\"19700101T000000Z\""));
    assert!(xml.contains(&format!("version=\"{}\"", keepenex_core::core_version())));
    assert!(xml.contains("<en-note>a<br />b</en-note>"));
}
