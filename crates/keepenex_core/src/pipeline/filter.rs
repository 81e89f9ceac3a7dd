//! Pinned/archived/tag predicates over note records.

use crate::model::note::NoteRecord;
use crate::source::SourceResult;
use std::collections::BTreeSet;

/// Conjunction of optional record predicates.
///
/// Mutually exclusive flag pairs (`pinned_only`/`exclude_pinned`,
/// `archived_only`/`exclude_archived`) are validated by the CLI; setting
/// both simply selects nothing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NoteFilter {
    pub pinned_only: bool,
    pub exclude_pinned: bool,
    pub archived_only: bool,
    pub exclude_archived: bool,
    /// Keep notes carrying at least one of these labels (exact match).
    /// `None` disables the predicate.
    pub tag_allowlist: Option<BTreeSet<String>>,
}

impl NoteFilter {
    /// Builds a tag allowlist predicate; an empty name list disables it.
    pub fn with_tag_allowlist<S: Into<String>>(mut self, names: impl IntoIterator<Item = S>) -> Self {
        let names: BTreeSet<String> = names.into_iter().map(Into::into).collect();
        self.tag_allowlist = if names.is_empty() { None } else { Some(names) };
        self
    }

    /// Returns whether every active predicate accepts the record.
    pub fn matches(&self, record: &NoteRecord) -> bool {
        if self.pinned_only && !record.is_pinned {
            return false;
        }
        if self.exclude_pinned && record.is_pinned {
            return false;
        }
        if self.archived_only && !record.is_archived {
            return false;
        }
        if self.exclude_archived && record.is_archived {
            return false;
        }
        match &self.tag_allowlist {
            Some(allowed) => record.label_names().any(|name| allowed.contains(name)),
            None => true,
        }
    }
}

/// Record stream adapter applying a [`NoteFilter`]; source errors pass
/// through so the driver can abort on them.
pub struct FilteredRecords<'f, I> {
    inner: I,
    filter: &'f NoteFilter,
}

impl<I> Iterator for FilteredRecords<'_, I>
where
    I: Iterator<Item = SourceResult<NoteRecord>>,
{
    type Item = SourceResult<NoteRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let item = self.inner.next()?;
            match &item {
                Ok(record) if !self.filter.matches(record) => continue,
                _ => return Some(item),
            }
        }
    }
}

/// Lazily filters a record stream, preserving order.
pub fn filter_records<I>(records: I, filter: &NoteFilter) -> FilteredRecords<'_, I::IntoIter>
where
    I: IntoIterator<Item = SourceResult<NoteRecord>>,
{
    FilteredRecords {
        inner: records.into_iter(),
        filter,
    }
}

#[cfg(test)]
mod tests {
    use super::NoteFilter;
    use crate::model::note::NoteRecord;

    fn record(raw: &str) -> NoteRecord {
        NoteRecord::from_json_str(raw, "note.json").unwrap()
    }

    #[test]
    fn default_filter_accepts_everything() {
        let filter = NoteFilter::default();
        assert!(filter.matches(&record("{}")));
        assert!(filter.matches(&record(r#"{"isPinned": true, "isArchived": true}"#)));
    }

    #[test]
    fn pinned_and_archived_predicates_combine_as_conjunction() {
        let filter = NoteFilter {
            pinned_only: true,
            exclude_archived: true,
            ..NoteFilter::default()
        };
        assert!(filter.matches(&record(r#"{"isPinned": true}"#)));
        assert!(!filter.matches(&record(r#"{"isPinned": true, "isArchived": true}"#)));
        assert!(!filter.matches(&record("{}")));

        let filter = NoteFilter {
            exclude_pinned: true,
            archived_only: true,
            ..NoteFilter::default()
        };
        assert!(filter.matches(&record(r#"{"isArchived": true}"#)));
        assert!(!filter.matches(&record(r#"{"isPinned": true, "isArchived": true}"#)));
    }

    #[test]
    fn tag_allowlist_is_case_sensitive_any_match() {
        let filter = NoteFilter::default().with_tag_allowlist(["Work", "home"]);
        assert!(filter.matches(&record(r#"{"labels": [{"name": "x"}, {"name": "home"}]}"#)));
        assert!(!filter.matches(&record(r#"{"labels": [{"name": "work"}]}"#)));
        assert!(!filter.matches(&record("{}")));
    }

    #[test]
    fn filtered_stream_keeps_order_and_errors() {
        use super::filter_records;
        use crate::source::SourceError;

        let filter = NoteFilter {
            pinned_only: true,
            ..NoteFilter::default()
        };
        let bad = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let items = vec![
            Ok(record(r#"{"title": "a", "isPinned": true}"#)),
            Ok(record(r#"{"title": "b"}"#)),
            Err(SourceError::Malformed {
                path: "c.json".into(),
                source: bad,
            }),
            Ok(record(r#"{"title": "d", "isPinned": true}"#)),
        ];
        let kept: Vec<Option<String>> = filter_records(items, &filter)
            .map(|item| item.ok().and_then(|record| record.title))
            .collect();
        assert_eq!(kept, vec![Some("a".to_string()), None, Some("d".to_string())]);
    }

    #[test]
    fn empty_allowlist_disables_the_predicate() {
        let filter = NoteFilter::default().with_tag_allowlist(Vec::<String>::new());
        assert_eq!(filter.tag_allowlist, None);
        assert!(filter.matches(&record("{}")));
    }
}
