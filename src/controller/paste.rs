//! Paste coordination. Correlate with the pending copy, then offer the
//! merged transfer to paste providers until one supplies an edit.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::document::{Document, EditorId, Selection, WorkspaceEdit};
use crate::platform::{COPY_ID_MIME, ClipboardEvent, TEXT_PLAIN_MIME};
use crate::provider::{Capability, PasteEditProvider, ProviderError};
use crate::transfer::{DataTransfer, adapter};

use super::pending::{ClipboardHandle, CopyResult};
use super::{ApplyOptions, CopyPasteController, DeclineReason, EditApplier, EditError};

/// Result of the synchronous half of paste handling.
#[derive(Debug)]
pub enum PasteDecision {
    /// Default paste proceeds; nothing else happens.
    Declined(DeclineReason),
    /// Default paste was suppressed. Run the operation to finish the paste.
    Taken(PasteOperation),
}

/// How a taken paste ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PasteOutcome {
    /// A provider's edit replaced the selection.
    Applied { provider: String },
    /// No provider produced an edit; `text/plain` was inserted instead.
    PlainText,
    /// No provider produced an edit and nothing was inserted.
    NoEdit,
    /// The event was cancelled before an edit was chosen.
    Cancelled,
}

#[derive(Debug, thiserror::Error)]
pub enum PasteError {
    #[error("paste provider {provider} failed: {source}")]
    Provider {
        provider: String,
        #[source]
        source: ProviderError,
    },
    #[error("failed to apply paste edit: {0}")]
    Apply(#[from] EditError),
}

impl CopyPasteController {
    /// Handle a paste event.
    ///
    /// Decides synchronously whether to take over. When it does, the
    /// event's default is prevented before this returns, and the caller
    /// must run the returned [`PasteOperation`] to complete the paste.
    ///
    /// The correlation handle is only read from inline string items. A
    /// deferred string under that key counts as no handle at all.
    pub fn handle_paste(&self, event: &mut ClipboardEvent) -> PasteDecision {
        let Some(document) = self.editor.document() else {
            return PasteDecision::Declined(DeclineReason::NoDocument);
        };
        let Some(selection) = self.editor.selection() else {
            return PasteDecision::Declined(DeclineReason::NoSelection);
        };
        let Some(data) = event.data() else {
            return PasteDecision::Declined(DeclineReason::NoClipboardData);
        };

        let providers: Vec<(Arc<str>, Arc<dyn PasteEditProvider>)> = self
            .registry
            .ordered_with(&document, Capability::PasteEdits)
            .into_iter()
            .filter_map(|p| p.paste().map(|paste| (Arc::from(p.name()), Arc::clone(paste))))
            .collect();
        if providers.is_empty() {
            return PasteDecision::Declined(DeclineReason::NoProviders);
        }

        let Some(raw_handle) = data.get_data(COPY_ID_MIME) else {
            return PasteDecision::Declined(DeclineReason::NoCopyId);
        };

        let transfer = adapter::normalize(data);
        let supplement = self
            .pending
            .as_ref()
            .filter(|pending| pending.matches(raw_handle))
            .map(|pending| (pending.handle(), pending.result()));
        if supplement.is_none() {
            tracing::debug!(raw_handle, "paste handle does not match pending copy");
        }

        event.prevent_default();

        PasteDecision::Taken(PasteOperation {
            editor: self.editor.id(),
            document,
            selection,
            transfer,
            supplement,
            providers,
            bridge: Arc::clone(&self.bridge),
            token: event.token().clone(),
            plain_text_fallback: self.config.plain_text_fallback,
            copy_wait_timeout: self.config.copy_wait_timeout(),
        })
    }
}

/// The asynchronous half of a taken paste.
///
/// Owns everything it needs, so it can be spawned or awaited after the
/// controller has moved on to other events.
pub struct PasteOperation {
    editor: EditorId,
    document: Document,
    selection: Selection,
    transfer: DataTransfer,
    supplement: Option<(ClipboardHandle, CopyResult)>,
    providers: Vec<(Arc<str>, Arc<dyn PasteEditProvider>)>,
    bridge: Arc<dyn EditApplier>,
    token: CancellationToken,
    plain_text_fallback: bool,
    copy_wait_timeout: Option<Duration>,
}

impl fmt::Debug for PasteOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PasteOperation")
            .field("editor", &self.editor)
            .field("uri", &self.document.uri())
            .field("selection", &self.selection)
            .field("handle", &self.supplement.as_ref().map(|(handle, _)| *handle))
            .field("providers", &self.providers.iter().map(|(name, _)| name).collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}

enum CopyWait {
    Ready(Option<Arc<DataTransfer>>),
    TimedOut,
    Cancelled,
}

impl PasteOperation {
    /// Whether the paste payload matched the pending copy.
    pub fn is_correlated(&self) -> bool {
        self.supplement.is_some()
    }

    pub async fn run(self) -> Result<PasteOutcome, PasteError> {
        let PasteOperation {
            editor,
            document,
            selection,
            mut transfer,
            supplement,
            providers,
            bridge,
            token,
            plain_text_fallback,
            copy_wait_timeout,
        } = self;

        if let Some((handle, result)) = supplement {
            match wait_for_copy(result, &token, copy_wait_timeout).await {
                CopyWait::Ready(Some(copied)) => {
                    tracing::debug!(%handle, items = copied.len(), "merging copy data");
                    transfer.merge(&copied);
                }
                CopyWait::Ready(None) => {
                    tracing::debug!(%handle, "copy produced no data");
                }
                CopyWait::TimedOut => {
                    tracing::warn!(%handle, "timed out waiting for copy data");
                }
                CopyWait::Cancelled => return Ok(PasteOutcome::Cancelled),
            }
        }
        transfer.delete(COPY_ID_MIME);

        let options = ApplyOptions { editor };
        for (name, provider) in &providers {
            if token.is_cancelled() {
                return Ok(PasteOutcome::Cancelled);
            }
            let edit = match provider
                .provide_paste_edits(&document, selection, &transfer, &token)
                .await
            {
                Ok(edit) => edit,
                Err(ProviderError::Cancelled) if token.is_cancelled() => {
                    return Ok(PasteOutcome::Cancelled);
                }
                Err(source) => {
                    return Err(PasteError::Provider {
                        provider: name.to_string(),
                        source,
                    });
                }
            };
            match edit {
                Some(edit) if !edit.is_empty() => {
                    bridge.apply(edit, options).await?;
                    tracing::info!(provider = &**name, uri = document.uri(), "paste edit applied");
                    return Ok(PasteOutcome::Applied {
                        provider: name.to_string(),
                    });
                }
                Some(_) => tracing::debug!(provider = &**name, "empty paste edit ignored"),
                None => {}
            }
        }

        if plain_text_fallback {
            if let Some(item) = transfer.get(TEXT_PLAIN_MIME) {
                let text = item.as_string().await;
                bridge
                    .apply(WorkspaceEdit::replacing(document.uri(), selection, text), options)
                    .await?;
                tracing::debug!(uri = document.uri(), "pasted plain text");
                return Ok(PasteOutcome::PlainText);
            }
        }
        tracing::debug!(uri = document.uri(), "no paste edit produced");
        Ok(PasteOutcome::NoEdit)
    }
}

async fn wait_for_copy(
    result: CopyResult,
    token: &CancellationToken,
    limit: Option<Duration>,
) -> CopyWait {
    let wait = async move {
        match limit {
            Some(limit) => tokio::time::timeout(limit, result)
                .await
                .map_or(CopyWait::TimedOut, CopyWait::Ready),
            None => CopyWait::Ready(result.await),
        }
    };
    tokio::select! {
        biased;
        _ = token.cancelled() => CopyWait::Cancelled,
        outcome = wait => outcome,
    }
}
