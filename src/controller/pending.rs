//! Pending copy results and the handles that name them.

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use futures::FutureExt;
use futures::future::{BoxFuture, Shared};
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::transfer::DataTransfer;

/// Opaque token correlating a copy with a later paste.
///
/// Written to the clipboard as a hyphenated UUID v4 string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ClipboardHandle(Uuid);

impl ClipboardHandle {
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parse a handle read back from the clipboard. Strings that are not
    /// handles yield `None`.
    pub fn parse(raw: &str) -> Option<Self> {
        Uuid::parse_str(raw).ok().map(Self)
    }
}

impl fmt::Display for ClipboardHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.hyphenated())
    }
}

/// Memoized result of a copy computation. `None` when the computation
/// was cancelled, aborted, or failed as a whole.
pub(crate) type CopyResult = Shared<BoxFuture<'static, Option<Arc<DataTransfer>>>>;

/// A copy whose provider computation may still be running.
pub(crate) struct PendingCopy {
    handle: ClipboardHandle,
    result: CopyResult,
    token: CancellationToken,
}

impl PendingCopy {
    /// Spawn `computation` onto the runtime and park its result.
    ///
    /// The task runs to completion whether or not anyone awaits it.
    pub(crate) fn spawn<F>(handle: ClipboardHandle, token: CancellationToken, computation: F) -> Self
    where
        F: Future<Output = Option<DataTransfer>> + Send + 'static,
    {
        let task = tokio::spawn(computation);
        let result = async move {
            match task.await {
                Ok(transfer) => transfer.map(Arc::new),
                Err(e) => {
                    tracing::warn!(%handle, error = %e, "copy computation did not complete");
                    None
                }
            }
        }
        .boxed()
        .shared();
        Self {
            handle,
            result,
            token,
        }
    }

    pub(crate) fn handle(&self) -> ClipboardHandle {
        self.handle
    }

    /// Whether `raw`, read from a paste payload, names this copy.
    pub(crate) fn matches(&self, raw: &str) -> bool {
        ClipboardHandle::parse(raw) == Some(self.handle)
    }

    pub(crate) fn result(&self) -> CopyResult {
        self.result.clone()
    }

    pub(crate) fn cancel(&self) {
        self.token.cancel();
    }
}
