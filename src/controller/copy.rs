//! Copy coordination. Fan out to copy providers and park the result.

use std::sync::Arc;

use futures::future::join_all;
use tokio_util::sync::CancellationToken;

use crate::config::CopyFailurePolicy;
use crate::document::{Document, Selection};
use crate::platform::{COPY_ID_MIME, ClipboardEvent};
use crate::provider::{Capability, CopyDataProvider};
use crate::transfer::{DataTransfer, adapter};

use super::pending::{ClipboardHandle, PendingCopy};
use super::{CopyPasteController, DeclineReason};

/// Result of handling a copy event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CopyOutcome {
    /// Nothing was written; the platform copy proceeds untouched.
    Declined(DeclineReason),
    /// The handle is on the clipboard and providers are running.
    Started(ClipboardHandle),
}

impl CopyPasteController {
    /// Handle a copy event.
    ///
    /// Synchronous up to the point where the correlation handle is on the
    /// clipboard: when this returns [`CopyOutcome::Started`], the payload
    /// already carries the handle while providers may still be running.
    /// The previous pending copy, if any, is superseded without being
    /// cancelled.
    pub fn handle_copy(&mut self, event: &mut ClipboardEvent) -> CopyOutcome {
        let Some(data) = event.data_mut() else {
            return CopyOutcome::Declined(DeclineReason::NoClipboardData);
        };
        let Some(document) = self.editor.document() else {
            return CopyOutcome::Declined(DeclineReason::NoDocument);
        };
        let Some(selection) = self.editor.selection() else {
            return CopyOutcome::Declined(DeclineReason::NoSelection);
        };
        if selection.is_empty() {
            return CopyOutcome::Declined(DeclineReason::EmptySelection);
        }

        let providers: Vec<(Arc<str>, Arc<dyn CopyDataProvider>)> = self
            .registry
            .ordered_with(&document, Capability::CopyData)
            .into_iter()
            .filter_map(|p| p.copy().map(|copy| (Arc::from(p.name()), Arc::clone(copy))))
            .collect();
        if providers.is_empty() {
            return CopyOutcome::Declined(DeclineReason::NoProviders);
        }

        let mut transfer = adapter::normalize(data);
        transfer.delete(COPY_ID_MIME);

        let handle = ClipboardHandle::generate();
        data.set_data(COPY_ID_MIME, handle.to_string());

        tracing::debug!(%handle, uri = document.uri(), providers = providers.len(), "copy started");

        let token = CancellationToken::new();
        let computation = collect_copy_data(
            handle,
            providers,
            document,
            selection,
            transfer,
            token.clone(),
            self.config.copy_failure,
        );
        let pending = PendingCopy::spawn(handle, token, computation);
        if let Some(previous) = self.pending.replace(pending) {
            tracing::debug!(previous = %previous.handle(), current = %handle, "pending copy superseded");
        }
        CopyOutcome::Started(handle)
    }
}

/// Run every copy provider concurrently, each on its own fork of
/// `transfer`, and fold the successful forks back lowest priority first,
/// so the highest-priority provider's value wins a key collision.
async fn collect_copy_data(
    handle: ClipboardHandle,
    providers: Vec<(Arc<str>, Arc<dyn CopyDataProvider>)>,
    document: Document,
    selection: Selection,
    mut transfer: DataTransfer,
    token: CancellationToken,
    policy: CopyFailurePolicy,
) -> Option<DataTransfer> {
    let mut forks: Vec<DataTransfer> = providers.iter().map(|_| transfer.fork()).collect();
    let results = join_all(
        providers
            .iter()
            .zip(forks.iter_mut())
            .map(|((_, provider), fork)| provider.provide_copy_data(&document, selection, fork, &token)),
    )
    .await;

    if token.is_cancelled() {
        tracing::debug!(%handle, "copy cancelled");
        return None;
    }

    let mut failed = 0usize;
    for (((name, _), fork), result) in providers.iter().zip(forks).zip(results).rev() {
        match result {
            Ok(()) => transfer.absorb(fork),
            Err(e) => {
                failed += 1;
                tracing::warn!(%handle, provider = &**name, error = %e, "copy provider failed");
            }
        }
    }

    if failed > 0 && policy == CopyFailurePolicy::AbortAll {
        tracing::warn!(%handle, failed, "discarding copy data after provider failure");
        return None;
    }
    tracing::debug!(%handle, items = transfer.len(), failed, "copy data collected");
    Some(transfer)
}
