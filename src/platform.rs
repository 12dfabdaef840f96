//! Platform clipboard payload — what the host hands us on copy and paste.
//!
//! A payload is a list of typed items. String items carry either inline
//! data (written synchronously while a copy event is dispatched) or a
//! deferred platform read. File items carry a reference whose bytes are
//! only read on demand.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use tokio_util::sync::CancellationToken;

/// Reserved MIME key carrying the copy correlation handle.
///
/// Private to the coordination layer. Providers never see it on paste.
pub const COPY_ID_MIME: &str = "x-clipweave/id";

/// Plain-text MIME key written natively by the editor on copy.
pub const TEXT_PLAIN_MIME: &str = "text/plain";

/// Errors surfaced by platform clipboard sources.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PlatformError {
    #[error("file read failed: {0}")]
    FileRead(String),
}

/// Deferred string read from the platform clipboard.
#[async_trait]
pub trait StringSource: Send + Sync {
    async fn read_string(&self) -> String;
}

/// File reference on the platform clipboard.
#[async_trait]
pub trait FileSource: Send + Sync {
    /// Display name of the file.
    fn name(&self) -> &str;

    /// Filesystem path or URI the file originates from, when the
    /// platform exposes one.
    fn path(&self) -> Option<&str>;

    /// Read the file's raw bytes.
    async fn read_bytes(&self) -> Result<Bytes, PlatformError>;
}

/// String data of a string-kind item.
#[derive(Clone)]
pub enum StringData {
    Inline(String),
    Deferred(Arc<dyn StringSource>),
}

impl fmt::Debug for StringData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Inline(s) => f.debug_tuple("Inline").field(s).finish(),
            Self::Deferred(_) => f.write_str("Deferred(..)"),
        }
    }
}

/// One typed entry of a platform clipboard payload.
#[derive(Clone)]
pub enum PlatformItem {
    String { mime: String, data: StringData },
    /// `file` is `None` when the platform advertises a file it cannot
    /// hand out.
    File {
        mime: String,
        file: Option<Arc<dyn FileSource>>,
    },
    /// An item kind the platform exposes but we cannot interpret.
    Unsupported { mime: String },
}

impl PlatformItem {
    pub fn mime(&self) -> &str {
        match self {
            Self::String { mime, .. } | Self::File { mime, .. } | Self::Unsupported { mime } => {
                mime
            }
        }
    }
}

impl fmt::Debug for PlatformItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::String { mime, data } => f
                .debug_struct("String")
                .field("mime", mime)
                .field("data", data)
                .finish(),
            Self::File { mime, file } => f
                .debug_struct("File")
                .field("mime", mime)
                .field("name", &file.as_ref().map(|file| file.name().to_owned()))
                .finish(),
            Self::Unsupported { mime } => {
                f.debug_struct("Unsupported").field("mime", mime).finish()
            }
        }
    }
}

/// A platform clipboard payload.
#[derive(Debug, Clone, Default)]
pub struct ClipboardData {
    items: Vec<PlatformItem>,
}

impl ClipboardData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`ClipboardData::set_data`].
    pub fn with_string(mut self, mime: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_data(mime, value);
        self
    }

    /// Builder form of [`ClipboardData::push`].
    pub fn with_item(mut self, item: PlatformItem) -> Self {
        self.push(item);
        self
    }

    pub fn push(&mut self, item: PlatformItem) {
        self.items.push(item);
    }

    pub fn items(&self) -> &[PlatformItem] {
        &self.items
    }

    /// Write inline string data, replacing any item with the same MIME type.
    pub fn set_data(&mut self, mime: impl Into<String>, value: impl Into<String>) {
        let mime = mime.into();
        let item = PlatformItem::String {
            data: StringData::Inline(value.into()),
            mime: mime.clone(),
        };
        match self.items.iter_mut().find(|existing| existing.mime() == mime) {
            Some(existing) => *existing = item,
            None => self.items.push(item),
        }
    }

    /// Synchronously read inline string data.
    ///
    /// Returns `None` for missing keys, file items and deferred strings.
    pub fn get_data(&self, mime: &str) -> Option<&str> {
        self.items.iter().find_map(|item| match item {
            PlatformItem::String {
                mime: m,
                data: StringData::Inline(value),
            } if m == mime => Some(value.as_str()),
            _ => None,
        })
    }

    pub fn contains(&self, mime: &str) -> bool {
        self.items.iter().any(|item| item.mime() == mime)
    }
}

/// A copy or paste event as dispatched by the host.
///
/// Cancelling `token` abandons any paste work still waiting on it.
#[derive(Debug, Default)]
pub struct ClipboardEvent {
    data: Option<ClipboardData>,
    default_prevented: bool,
    token: CancellationToken,
}

impl ClipboardEvent {
    pub fn new(data: ClipboardData) -> Self {
        Self {
            data: Some(data),
            ..Self::default()
        }
    }

    /// An event the platform dispatched without a payload.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn with_token(mut self, token: CancellationToken) -> Self {
        self.token = token;
        self
    }

    pub fn data(&self) -> Option<&ClipboardData> {
        self.data.as_ref()
    }

    pub fn data_mut(&mut self) -> Option<&mut ClipboardData> {
        self.data.as_mut()
    }

    /// Hand the payload back, e.g. to place it on the system clipboard.
    pub fn into_data(self) -> Option<ClipboardData> {
        self.data
    }

    pub fn prevent_default(&mut self) {
        self.default_prevented = true;
    }

    /// Whether the platform's default handling was suppressed.
    pub fn default_prevented(&self) -> bool {
        self.default_prevented
    }

    pub fn token(&self) -> &CancellationToken {
        &self.token
    }
}

/// A file held in memory, for hosts that already buffered the content.
#[derive(Debug, Clone)]
pub struct MemoryFile {
    name: String,
    path: Option<String>,
    bytes: Bytes,
}

impl MemoryFile {
    pub fn new(name: impl Into<String>, path: Option<String>, bytes: impl Into<Bytes>) -> Self {
        Self {
            name: name.into(),
            path,
            bytes: bytes.into(),
        }
    }
}

#[async_trait]
impl FileSource for MemoryFile {
    fn name(&self) -> &str {
        &self.name
    }

    fn path(&self) -> Option<&str> {
        self.path.as_deref()
    }

    async fn read_bytes(&self) -> Result<Bytes, PlatformError> {
        Ok(self.bytes.clone())
    }
}
