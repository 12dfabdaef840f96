//! Copy/paste providers, the external contributors of copy-time data and
//! paste-time edits.
//!
//! A [`Provider`] is a tagged entry with two optional capabilities. The
//! registry hands out providers in priority order and callers filter by
//! the [`Capability`] they need.

pub mod registry;

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::document::{Document, PasteEdit, Selection};
use crate::transfer::{DataTransfer, TransferError};

pub use registry::{DocumentSelector, LanguageRegistry, ProviderRegistry, Registration};

/// Errors returned by provider operations.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    /// The provider observed the cancellation signal and gave up.
    #[error("cancelled")]
    Cancelled,

    #[error("transfer: {0}")]
    Transfer(#[from] TransferError),

    #[error("{0}")]
    Failed(String),
}

/// Contributes data to the clipboard when the user copies.
#[async_trait]
pub trait CopyDataProvider: Send + Sync {
    /// Write additional items into `transfer`, keyed by MIME type.
    ///
    /// `transfer` already holds the platform's own copy payload.
    async fn provide_copy_data(
        &self,
        document: &Document,
        selection: Selection,
        transfer: &mut DataTransfer,
        token: &CancellationToken,
    ) -> Result<(), ProviderError>;
}

/// Produces an edit that replaces the default paste.
#[async_trait]
pub trait PasteEditProvider: Send + Sync {
    /// Return `Ok(None)` to let the next provider try.
    async fn provide_paste_edits(
        &self,
        document: &Document,
        selection: Selection,
        transfer: &DataTransfer,
        token: &CancellationToken,
    ) -> Result<Option<PasteEdit>, ProviderError>;
}

/// Provider capability, used to filter registry results.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    CopyData,
    PasteEdits,
}

/// A registered provider and the capabilities it implements.
#[derive(Clone)]
pub struct Provider {
    name: Arc<str>,
    copy: Option<Arc<dyn CopyDataProvider>>,
    paste: Option<Arc<dyn PasteEditProvider>>,
}

impl Provider {
    /// A provider with no capabilities yet.
    pub fn new(name: impl Into<Arc<str>>) -> Self {
        Self {
            name: name.into(),
            copy: None,
            paste: None,
        }
    }

    /// A provider implementing both capabilities with one value.
    pub fn both<T>(name: impl Into<Arc<str>>, provider: Arc<T>) -> Self
    where
        T: CopyDataProvider + PasteEditProvider + 'static,
    {
        Self::new(name)
            .with_copy(provider.clone())
            .with_paste(provider)
    }

    pub fn with_copy(mut self, provider: Arc<dyn CopyDataProvider>) -> Self {
        self.copy = Some(provider);
        self
    }

    pub fn with_paste(mut self, provider: Arc<dyn PasteEditProvider>) -> Self {
        self.paste = Some(provider);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn copy(&self) -> Option<&Arc<dyn CopyDataProvider>> {
        self.copy.as_ref()
    }

    pub fn paste(&self) -> Option<&Arc<dyn PasteEditProvider>> {
        self.paste.as_ref()
    }

    pub fn supports(&self, capability: Capability) -> bool {
        match capability {
            Capability::CopyData => self.copy.is_some(),
            Capability::PasteEdits => self.paste.is_some(),
        }
    }
}

impl fmt::Debug for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Provider")
            .field("name", &self.name)
            .field("copy", &self.copy.is_some())
            .field("paste", &self.paste.is_some())
            .finish()
    }
}
