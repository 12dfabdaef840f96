//! Data transfer — MIME-keyed items flowing through one copy or paste.
//!
//! Values are lazily resolvable. A text item's future and a file item's
//! byte accessor are each resolved at most once and shared between every
//! clone of the item, so reading an item twice never re-triggers the
//! underlying platform read.

pub mod adapter;

use std::collections::HashSet;
use std::fmt;
use std::future::Future;

use bytes::Bytes;
use futures::FutureExt;
use futures::future::{BoxFuture, Shared};

/// Memoized text value.
pub type SharedText = Shared<BoxFuture<'static, String>>;

/// Memoized file content.
pub type SharedBytes = Shared<BoxFuture<'static, Result<Bytes, TransferError>>>;

/// Errors resolving transfer values.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransferError {
    #[error("file '{name}' could not be read: {reason}")]
    FileRead { name: String, reason: String },
}

/// A file-like transfer value.
#[derive(Clone)]
pub struct TransferFile {
    name: String,
    uri: Option<String>,
    data: SharedBytes,
}

impl TransferFile {
    /// Wrap a deferred content read. `content` is not polled until the
    /// first call to [`TransferFile::data`].
    pub fn new<F>(name: impl Into<String>, uri: Option<String>, content: F) -> Self
    where
        F: Future<Output = Result<Bytes, TransferError>> + Send + 'static,
    {
        Self {
            name: name.into(),
            uri,
            data: content.boxed().shared(),
        }
    }

    pub fn from_bytes(name: impl Into<String>, uri: Option<String>, bytes: Bytes) -> Self {
        Self::new(name, uri, futures::future::ready(Ok(bytes)))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Originating location of the file, if known.
    pub fn uri(&self) -> Option<&str> {
        self.uri.as_deref()
    }

    pub async fn data(&self) -> Result<Bytes, TransferError> {
        self.data.clone().await
    }
}

impl fmt::Debug for TransferFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransferFile")
            .field("name", &self.name)
            .field("uri", &self.uri)
            .finish_non_exhaustive()
    }
}

/// A single transfer value.
#[derive(Clone)]
pub enum TransferItem {
    Text(SharedText),
    File(TransferFile),
}

impl TransferItem {
    /// An already resolved text value.
    pub fn text(value: impl Into<String>) -> Self {
        Self::deferred_text(futures::future::ready(value.into()))
    }

    pub fn deferred_text<F>(value: F) -> Self
    where
        F: Future<Output = String> + Send + 'static,
    {
        Self::Text(value.boxed().shared())
    }

    pub fn file(file: TransferFile) -> Self {
        Self::File(file)
    }

    /// Resolve the item as text. File items resolve to an empty string.
    pub async fn as_string(&self) -> String {
        match self {
            Self::Text(value) => value.clone().await,
            Self::File(_) => String::new(),
        }
    }

    pub fn as_file(&self) -> Option<&TransferFile> {
        match self {
            Self::File(file) => Some(file),
            Self::Text(_) => None,
        }
    }
}

impl fmt::Debug for TransferItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(value) => match value.peek() {
                Some(text) => f.debug_tuple("Text").field(text).finish(),
                None => f.write_str("Text(<pending>)"),
            },
            Self::File(file) => f.debug_tuple("File").field(file).finish(),
        }
    }
}

/// Ordered MIME-keyed collection of [`TransferItem`]s.
///
/// Keys are unique. Setting an existing key replaces its value in place,
/// keeping the key's original position.
#[derive(Debug, Clone, Default)]
pub struct DataTransfer {
    items: Vec<(String, TransferItem)>,
    /// Keys set or deleted since creation or the last [`DataTransfer::fork`].
    touched: HashSet<String>,
}

impl DataTransfer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, mime: &str) -> Option<&TransferItem> {
        self.items
            .iter()
            .find(|(key, _)| key == mime)
            .map(|(_, item)| item)
    }

    pub fn contains(&self, mime: &str) -> bool {
        self.get(mime).is_some()
    }

    pub fn set(&mut self, mime: impl Into<String>, item: TransferItem) {
        let mime = mime.into();
        self.touched.insert(mime.clone());
        match self.items.iter_mut().find(|(key, _)| *key == mime) {
            Some((_, existing)) => *existing = item,
            None => self.items.push((mime, item)),
        }
    }

    pub fn delete(&mut self, mime: &str) -> Option<TransferItem> {
        let index = self.items.iter().position(|(key, _)| key == mime)?;
        self.touched.insert(mime.to_owned());
        Some(self.items.remove(index).1)
    }

    /// Iterate `(mime, item)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &TransferItem)> {
        self.items.iter().map(|(key, item)| (key.as_str(), item))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.items.iter().map(|(key, _)| key.as_str())
    }

    /// Copy every item of `other` into `self`, overwriting on key collision.
    pub fn merge(&mut self, other: &DataTransfer) {
        for (mime, item) in other.iter() {
            self.set(mime, item.clone());
        }
    }

    /// Clone the items into a transfer with a clean change record.
    ///
    /// Values are shared with `self`; resolving a value through the fork
    /// resolves it for both.
    pub fn fork(&self) -> DataTransfer {
        DataTransfer {
            items: self.items.clone(),
            touched: HashSet::new(),
        }
    }

    /// Replay the sets and deletes recorded on `fork` onto `self`.
    pub fn absorb(&mut self, fork: DataTransfer) {
        let DataTransfer { items, mut touched } = fork;
        for (mime, item) in items {
            if touched.remove(&mime) {
                self.set(mime, item);
            }
        }
        // Whatever is left was deleted on the fork.
        for mime in touched {
            self.delete(&mime);
        }
    }
}

impl FromIterator<(String, TransferItem)> for DataTransfer {
    fn from_iter<I: IntoIterator<Item = (String, TransferItem)>>(iter: I) -> Self {
        let mut transfer = DataTransfer::new();
        for (mime, item) in iter {
            transfer.set(mime, item);
        }
        transfer
    }
}
