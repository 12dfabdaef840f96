//! In-memory editor host.
//!
//! [`MemoryEditor`] holds one open document and selection and applies
//! workspace edits to it directly. The binary drives scripted sessions
//! through it.

use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;

use crate::controller::{ApplyOptions, EditApplier, EditError, EditorHost};
use crate::document::{Document, EditorId, Selection, WorkspaceEdit};

#[derive(Debug, Default)]
struct EditorState {
    document: Option<Document>,
    selection: Option<Selection>,
}

/// A single-document editor kept in memory.
#[derive(Debug)]
pub struct MemoryEditor {
    id: EditorId,
    state: Mutex<EditorState>,
}

impl MemoryEditor {
    /// An editor with no document open.
    pub fn new() -> Self {
        Self {
            id: EditorId::new(),
            state: Mutex::new(EditorState::default()),
        }
    }

    /// An editor showing `document` with the caret at offset 0.
    pub fn with_document(document: Document) -> Self {
        let editor = Self::new();
        editor.open(document);
        editor
    }

    /// Switch to `document`, placing the caret at offset 0.
    pub fn open(&self, document: Document) {
        let mut state = self.lock();
        state.document = Some(document);
        state.selection = Some(Selection::caret(0));
    }

    pub fn close(&self) {
        let mut state = self.lock();
        state.document = None;
        state.selection = None;
    }

    pub fn select(&self, selection: Selection) {
        self.lock().selection = Some(selection);
    }

    pub fn clear_selection(&self) {
        self.lock().selection = None;
    }

    pub fn text(&self) -> Option<String> {
        self.lock()
            .document
            .as_ref()
            .map(|document| document.text().to_owned())
    }

    fn lock(&self) -> MutexGuard<'_, EditorState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for MemoryEditor {
    fn default() -> Self {
        Self::new()
    }
}

impl EditorHost for MemoryEditor {
    fn id(&self) -> EditorId {
        self.id
    }

    fn document(&self) -> Option<Document> {
        self.lock().document.clone()
    }

    fn selection(&self) -> Option<Selection> {
        self.lock().selection
    }
}

#[async_trait]
impl EditApplier for MemoryEditor {
    /// Apply every text edit atomically: either all edits land or none.
    ///
    /// The caret ends up after the text inserted by the first edit.
    async fn apply(&self, edit: WorkspaceEdit, options: ApplyOptions) -> Result<(), EditError> {
        if options.editor != self.id {
            return Err(EditError::UnknownEditor);
        }
        let mut state = self.lock();
        let document = state.document.as_ref().ok_or(EditError::NoDocument)?;

        let mut edits = edit.into_edits();
        if edits.is_empty() {
            return Ok(());
        }
        if let Some(foreign) = edits.iter().find(|e| e.uri != document.uri()) {
            return Err(EditError::UnknownDocument(foreign.uri.clone()));
        }
        for e in &edits {
            if e.range.start > e.range.end || document.text().get(e.range.clone()).is_none() {
                return Err(EditError::InvalidRange {
                    start: e.range.start,
                    end: e.range.end,
                });
            }
        }
        edits.sort_by(|a, b| b.range.start.cmp(&a.range.start));
        if edits
            .windows(2)
            .any(|pair| pair[1].range.end > pair[0].range.start)
        {
            return Err(EditError::Overlapping);
        }

        let mut text = document.text().to_owned();
        for e in &edits {
            text.replace_range(e.range.clone(), &e.new_text);
        }
        let caret = edits
            .last()
            .map_or(0, |first| first.range.start + first.new_text.len());

        tracing::debug!(
            uri = document.uri(),
            edits = edits.len(),
            "applied workspace edit"
        );
        let next = document.with_text(text);
        state.document = Some(next);
        state.selection = Some(Selection::caret(caret));
        Ok(())
    }
}
