//! Document, selection and workspace-edit model.
//!
//! Offsets are byte offsets into the document text.

use std::ops::Range;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Identity of one editor instance.
///
/// Monotonically increasing counter, unique within the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EditorId(u64);

impl EditorId {
    pub fn new() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(1);
        Self(COUNTER.fetch_add(1, Ordering::Relaxed))
    }
}

impl Default for EditorId {
    fn default() -> Self {
        Self::new()
    }
}

/// Snapshot of an open text document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    uri: String,
    language_id: String,
    version: u32,
    text: Arc<str>,
}

impl Document {
    pub fn new(uri: impl Into<String>, language_id: impl Into<String>, text: impl Into<Arc<str>>) -> Self {
        Self {
            uri: uri.into(),
            language_id: language_id.into(),
            version: 1,
            text: text.into(),
        }
    }

    pub fn uri(&self) -> &str {
        &self.uri
    }

    /// URI scheme, e.g. `file` or `untitled`. Empty if the URI has none.
    pub fn scheme(&self) -> &str {
        self.uri.split_once(':').map_or("", |(scheme, _)| scheme)
    }

    pub fn language_id(&self) -> &str {
        &self.language_id
    }

    pub fn version(&self) -> u32 {
        self.version
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Text covered by `selection`, or `None` if it is out of bounds or
    /// splits a character.
    pub fn slice(&self, selection: Selection) -> Option<&str> {
        self.text.get(selection.range())
    }

    /// The next version of this document with new text.
    pub fn with_text(&self, text: impl Into<Arc<str>>) -> Self {
        Self {
            uri: self.uri.clone(),
            language_id: self.language_id.clone(),
            version: self.version + 1,
            text: text.into(),
        }
    }
}

/// A selection: `anchor` is where it started, `active` where the caret is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Selection {
    pub anchor: usize,
    pub active: usize,
}

impl Selection {
    pub fn new(anchor: usize, active: usize) -> Self {
        Self { anchor, active }
    }

    pub fn caret(offset: usize) -> Self {
        Self::new(offset, offset)
    }

    pub fn start(&self) -> usize {
        self.anchor.min(self.active)
    }

    pub fn end(&self) -> usize {
        self.anchor.max(self.active)
    }

    pub fn is_empty(&self) -> bool {
        self.anchor == self.active
    }

    pub fn range(&self) -> Range<usize> {
        self.start()..self.end()
    }
}

/// Replacement of a byte range in one document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextEdit {
    pub uri: String,
    pub range: Range<usize>,
    pub new_text: String,
}

/// A workspace-scoped edit: text edits across one or more documents.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorkspaceEdit {
    edits: Vec<TextEdit>,
}

/// The edit chosen to fulfill a paste.
pub type PasteEdit = WorkspaceEdit;

impl WorkspaceEdit {
    pub fn new() -> Self {
        Self::default()
    }

    /// An edit replacing `selection` in `uri` with `text`.
    pub fn replacing(uri: impl Into<String>, selection: Selection, text: impl Into<String>) -> Self {
        let mut edit = Self::new();
        edit.replace(uri, selection, text);
        edit
    }

    pub fn replace(&mut self, uri: impl Into<String>, selection: Selection, text: impl Into<String>) {
        self.edits.push(TextEdit {
            uri: uri.into(),
            range: selection.range(),
            new_text: text.into(),
        });
    }

    pub fn edits(&self) -> &[TextEdit] {
        &self.edits
    }

    pub fn into_edits(self) -> Vec<TextEdit> {
        self.edits
    }

    pub fn is_empty(&self) -> bool {
        self.edits.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn editor_ids_are_unique() {
        assert_ne!(EditorId::new(), EditorId::new());
    }

    #[test]
    fn selection_normalizes_direction() {
        let s = Selection::new(9, 3);
        assert_eq!(s.start(), 3);
        assert_eq!(s.end(), 9);
        assert_eq!(s.range(), 3..9);
        assert!(!s.is_empty());
        assert!(Selection::caret(4).is_empty());
    }

    #[test]
    fn slice_respects_bounds_and_char_boundaries() {
        let doc = Document::new("file:///a.md", "markdown", "héllo");
        assert_eq!(doc.slice(Selection::new(0, 1)), Some("h"));
        assert_eq!(doc.slice(Selection::new(1, 2)), None);
        assert_eq!(doc.slice(Selection::new(0, 99)), None);
    }

    #[test]
    fn scheme_of_uri() {
        assert_eq!(Document::new("file:///a.rs", "rust", "").scheme(), "file");
        assert_eq!(Document::new("untitled:1", "plaintext", "").scheme(), "untitled");
        assert_eq!(Document::new("scratch", "plaintext", "").scheme(), "");
    }

    #[test]
    fn with_text_bumps_version() {
        let doc = Document::new("file:///a.rs", "rust", "fn a() {}");
        let next = doc.with_text("fn b() {}");
        assert_eq!(next.version(), 2);
        assert_eq!(next.uri(), doc.uri());
        assert_eq!(next.text(), "fn b() {}");
    }

    #[test]
    fn replacing_builds_single_edit() {
        let edit = WorkspaceEdit::replacing("file:///a.md", Selection::new(2, 5), "x");
        assert_eq!(
            edit.edits(),
            &[TextEdit {
                uri: "file:///a.md".into(),
                range: 2..5,
                new_text: "x".into(),
            }]
        );
        assert!(WorkspaceEdit::new().is_empty());
    }
}
