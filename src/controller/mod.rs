//! Per-editor copy/paste controller.
//!
//! The controller sits between platform clipboard events and the
//! registered providers. A copy fans out to every copy-capable provider
//! and parks the aggregate result under a fresh handle that is embedded
//! in the clipboard. A later paste that carries the same handle merges
//! that result back in before offering paste providers, in order, the
//! chance to replace the default paste.
//!
//! The pending copy result is the only state shared across the copy/paste
//! boundary. It is owned by the controller and replaced on every copy.

mod copy;
mod paste;
mod pending;

use std::sync::Arc;

use async_trait::async_trait;

use crate::config::Config;
use crate::document::{Document, EditorId, Selection, WorkspaceEdit};
use crate::provider::ProviderRegistry;

pub use copy::CopyOutcome;
pub use paste::{PasteDecision, PasteError, PasteOperation, PasteOutcome};
pub use pending::ClipboardHandle;

use pending::PendingCopy;

/// The editor a controller is attached to.
pub trait EditorHost: Send + Sync {
    fn id(&self) -> EditorId;

    /// The document currently shown, if any.
    fn document(&self) -> Option<Document>;

    fn selection(&self) -> Option<Selection>;
}

/// Options for [`EditApplier::apply`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ApplyOptions {
    /// Editor the edit originates from.
    pub editor: EditorId,
}

/// Errors applying a workspace edit.
#[derive(Debug, thiserror::Error)]
pub enum EditError {
    #[error("edit targets an unknown editor")]
    UnknownEditor,
    #[error("no document is open")]
    NoDocument,
    #[error("document {0} is not open")]
    UnknownDocument(String),
    #[error("edit range {start}..{end} is out of bounds")]
    InvalidRange { start: usize, end: usize },
    #[error("edit ranges overlap")]
    Overlapping,
}

/// Applies workspace edits transactionally.
#[async_trait]
pub trait EditApplier: Send + Sync {
    async fn apply(&self, edit: WorkspaceEdit, options: ApplyOptions) -> Result<(), EditError>;
}

/// Why a copy or paste left the platform's default behavior alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeclineReason {
    NoClipboardData,
    NoDocument,
    NoSelection,
    EmptySelection,
    NoProviders,
    /// The paste payload carries no correlation handle.
    NoCopyId,
}

/// Copy/paste coordination for one editor instance.
///
/// Must be driven from within a Tokio runtime: copy computations are
/// spawned as tasks.
pub struct CopyPasteController {
    editor: Arc<dyn EditorHost>,
    registry: Arc<dyn ProviderRegistry>,
    bridge: Arc<dyn EditApplier>,
    config: Config,
    pending: Option<PendingCopy>,
}

impl CopyPasteController {
    pub fn new(
        editor: Arc<dyn EditorHost>,
        registry: Arc<dyn ProviderRegistry>,
        bridge: Arc<dyn EditApplier>,
        config: Config,
    ) -> Self {
        Self {
            editor,
            registry,
            bridge,
            config,
            pending: None,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Handle of the copy whose result a paste can currently pick up.
    pub fn pending_handle(&self) -> Option<ClipboardHandle> {
        self.pending.as_ref().map(PendingCopy::handle)
    }

    /// Cancel and discard the pending copy result.
    pub fn dispose(&mut self) {
        if let Some(pending) = self.pending.take() {
            tracing::debug!(handle = %pending.handle(), "discarding pending copy");
            pending.cancel();
        }
    }
}

impl Drop for CopyPasteController {
    fn drop(&mut self) {
        self.dispose();
    }
}
