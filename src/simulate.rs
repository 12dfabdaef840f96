//! Scripted copy/paste sessions over files on disk.
//!
//! A [`Session`] wires a [`MemoryEditor`] to a controller with the
//! built-in providers registered, then replays copy and paste the way a
//! platform would: events carry a clipboard payload, and a declined paste
//! falls back to inserting `text/plain`.

use std::io;
use std::ops::Range;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::builtin::{self, URI_LIST_MIME};
use crate::config::Config;
use crate::controller::{
    ApplyOptions, ClipboardHandle, CopyOutcome, CopyPasteController, DeclineReason, EditApplier,
    EditError, EditorHost, PasteDecision, PasteError, PasteOutcome,
};
use crate::document::{Document, Selection, WorkspaceEdit};
use crate::host::MemoryEditor;
use crate::platform::{COPY_ID_MIME, ClipboardData, ClipboardEvent, TEXT_PLAIN_MIME};
use crate::provider::LanguageRegistry;
use crate::transfer::adapter::file_uri;

#[derive(Debug, thiserror::Error)]
pub enum SimulateError {
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("no document is open")]
    NotOpen,
    #[error("range {start}..{end} is not valid in {uri}")]
    Range { start: usize, end: usize, uri: String },
    #[error("copy was declined: {0:?}")]
    CopyDeclined(DeclineReason),
    #[error(transparent)]
    Paste(#[from] PasteError),
    #[error("default paste failed: {0}")]
    Apply(#[from] EditError),
}

/// How a simulated paste was carried out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PasteReport {
    /// The controller declined; the platform pasted `text/plain`.
    Default(DeclineReason),
    /// The controller took the paste.
    Coordinated(PasteOutcome),
}

pub struct Session {
    editor: Arc<MemoryEditor>,
    controller: CopyPasteController,
}

impl Session {
    pub fn new(config: Config) -> Self {
        let editor = Arc::new(MemoryEditor::new());
        let registry = Arc::new(LanguageRegistry::new());
        builtin::register_defaults(&registry);
        let controller =
            CopyPasteController::new(editor.clone(), registry, editor.clone(), config);
        Self { editor, controller }
    }

    /// Load `path` into the editor.
    pub async fn open(&self, path: &Path) -> Result<(), SimulateError> {
        let read_err = |source| SimulateError::Read {
            path: path.to_path_buf(),
            source,
        };
        let text = tokio::fs::read_to_string(path).await.map_err(read_err)?;
        let absolute = std::path::absolute(path).map_err(read_err)?;
        let uri = file_uri(&absolute.to_string_lossy());
        tracing::debug!(%uri, "opening document");
        self.editor
            .open(Document::new(uri, language_for_path(path), text));
        Ok(())
    }

    /// Select `range` and copy it. Returns what the clipboard now holds.
    pub fn copy(&mut self, range: Range<usize>) -> Result<ClipboardData, SimulateError> {
        let document = self.editor.document().ok_or(SimulateError::NotOpen)?;
        let selection = Selection::new(range.start, range.end);
        let selected = document.slice(selection).ok_or_else(|| SimulateError::Range {
            start: range.start,
            end: range.end,
            uri: document.uri().to_string(),
        })?;
        self.editor.select(selection);

        let mut event =
            ClipboardEvent::new(ClipboardData::new().with_string(TEXT_PLAIN_MIME, selected));
        match self.controller.handle_copy(&mut event) {
            CopyOutcome::Started(handle) => tracing::debug!(%handle, "copy handled"),
            CopyOutcome::Declined(reason) => return Err(SimulateError::CopyDeclined(reason)),
        }
        Ok(event.into_data().unwrap_or_default())
    }

    /// Place the caret at `at` and paste `data`.
    pub async fn paste(&self, at: usize, data: ClipboardData) -> Result<PasteReport, SimulateError> {
        let document = self.editor.document().ok_or(SimulateError::NotOpen)?;
        let caret = Selection::caret(at);
        if document.slice(caret).is_none() {
            return Err(SimulateError::Range {
                start: at,
                end: at,
                uri: document.uri().to_string(),
            });
        }
        self.editor.select(caret);

        let mut event = ClipboardEvent::new(data);
        let reason = match self.controller.handle_paste(&mut event) {
            PasteDecision::Taken(operation) => {
                return Ok(PasteReport::Coordinated(operation.run().await?));
            }
            PasteDecision::Declined(reason) => reason,
        };

        tracing::debug!(?reason, "paste declined, inserting plain text");
        if let Some(text) = event.data().and_then(|data| data.get_data(TEXT_PLAIN_MIME)) {
            let edit = WorkspaceEdit::replacing(document.uri(), caret, text);
            let options = ApplyOptions {
                editor: self.editor.id(),
            };
            self.editor.apply(edit, options).await?;
        }
        Ok(PasteReport::Default(reason))
    }

    /// Current text of the open document.
    pub fn text(&self) -> Result<String, SimulateError> {
        self.editor.text().ok_or(SimulateError::NotOpen)
    }
}

/// Copy `range` of `source` and paste it into `target` at `at`.
///
/// Returns the resulting text of `target`. Files are not modified.
pub async fn transplant(
    config: Config,
    source: &Path,
    range: Range<usize>,
    target: &Path,
    at: usize,
) -> Result<String, SimulateError> {
    let mut session = Session::new(config);
    session.open(source).await?;
    let clipboard = session.copy(range)?;
    session.open(target).await?;
    let report = session.paste(at, clipboard).await?;
    tracing::info!(?report, target = %target.display(), "transplant finished");
    session.text()
}

/// Paste `uris` into `target` at `at` as if dragged in from another window.
pub async fn paste_uris(
    config: Config,
    target: &Path,
    at: usize,
    uris: &[String],
) -> Result<String, SimulateError> {
    let session = Session::new(config);
    session.open(target).await?;
    // Handle written by some other editor instance.
    let clipboard = ClipboardData::new()
        .with_string(TEXT_PLAIN_MIME, uris.join("\n"))
        .with_string(URI_LIST_MIME, uris.join("\r\n"))
        .with_string(COPY_ID_MIME, ClipboardHandle::generate().to_string());
    let report = session.paste(at, clipboard).await?;
    tracing::info!(?report, target = %target.display(), "paste finished");
    session.text()
}

/// Editor language id for a file, from its extension.
pub fn language_for_path(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase);
    match ext.as_deref() {
        Some("md" | "markdown") => "markdown",
        Some("rs") => "rust",
        Some("py") => "python",
        Some("js" | "mjs") => "javascript",
        Some("ts") => "typescript",
        Some("toml") => "toml",
        Some("json") => "json",
        Some("sh" | "bash") => "shellscript",
        Some("c" | "h") => "c",
        Some("cc" | "cpp" | "hpp") => "cpp",
        Some("go") => "go",
        _ => "plaintext",
    }
}

/// Parse a `START..END` byte range.
pub fn parse_range(raw: &str) -> Result<Range<usize>, String> {
    let (start, end) = raw
        .split_once("..")
        .ok_or_else(|| format!("expected START..END, got '{raw}'"))?;
    let start: usize = start.trim().parse().map_err(|e| format!("bad start '{start}': {e}"))?;
    let end: usize = end.trim().parse().map_err(|e| format!("bad end '{end}': {e}"))?;
    if start > end {
        return Err(format!("range start {start} is after end {end}"));
    }
    Ok(start..end)
}
