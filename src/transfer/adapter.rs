//! Platform payload → [`DataTransfer`] normalization.

use std::sync::Arc;

use crate::platform::{ClipboardData, PlatformItem, StringData};

use super::{DataTransfer, TransferError, TransferFile, TransferItem};

/// Build a transfer from a platform clipboard payload.
///
/// Never blocks on platform I/O: deferred strings and file contents are
/// wrapped in memoized futures that read on first access. Items that
/// cannot be interpreted are omitted.
pub fn normalize(payload: &ClipboardData) -> DataTransfer {
    let mut transfer = DataTransfer::new();
    for item in payload.items() {
        match item {
            PlatformItem::String { mime, data } => {
                transfer.set(mime.clone(), string_item(data));
            }
            PlatformItem::File {
                mime,
                file: Some(file),
            } => {
                let name = file.name().to_owned();
                let uri = file.path().map(file_uri);
                let source = Arc::clone(file);
                let file_name = name.clone();
                let content = async move {
                    source
                        .read_bytes()
                        .await
                        .map_err(|e| TransferError::FileRead {
                            name: file_name,
                            reason: e.to_string(),
                        })
                };
                transfer.set(mime.clone(), TransferItem::file(TransferFile::new(name, uri, content)));
            }
            PlatformItem::File { mime, file: None } => {
                tracing::trace!(mime = %mime, "skipping file item without a file");
            }
            PlatformItem::Unsupported { mime } => {
                tracing::trace!(mime = %mime, "skipping unsupported clipboard item");
            }
        }
    }
    transfer
}

fn string_item(data: &StringData) -> TransferItem {
    match data {
        StringData::Inline(value) => TransferItem::text(value.clone()),
        StringData::Deferred(source) => {
            let source = Arc::clone(source);
            TransferItem::deferred_text(async move { source.read_string().await })
        }
    }
}

/// Turn a platform file path into a URI. Values that already carry a
/// scheme are kept as-is.
pub(crate) fn file_uri(path: &str) -> String {
    if path.contains("://") {
        path.to_owned()
    } else if path.starts_with('/') {
        format!("file://{path}")
    } else {
        format!("file:///{}", path.replace('\\', "/"))
    }
}
