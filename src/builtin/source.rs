//! Source snippets that remember where they were copied from.
//!
//! On copy the selected text is recorded together with the document's URI
//! and language. Pasting that record into markdown from another language
//! produces a fenced code block tagged with the source language.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

use crate::document::{Document, PasteEdit, Selection};
use crate::provider::{CopyDataProvider, PasteEditProvider, ProviderError};
use crate::transfer::{DataTransfer, TransferItem};

pub const SOURCE_SNIPPET_MIME: &str = "application/vnd.clipweave.source+json";

/// JSON payload stored under [`SOURCE_SNIPPET_MIME`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceSnippet {
    pub uri: String,
    pub language: String,
    pub text: String,
}

impl SourceSnippet {
    /// The snippet as a markdown fenced block.
    ///
    /// The fence is longer than any backtick run inside the text.
    pub fn to_fenced_block(&self) -> String {
        let longest_run = self
            .text
            .split(|c| c != '`')
            .map(str::len)
            .max()
            .unwrap_or(0);
        let fence = "`".repeat(longest_run.max(2) + 1);
        let body = self.text.trim_end_matches(['\r', '\n']);
        format!("{fence}{}\n{body}\n{fence}", self.language)
    }
}

#[derive(Debug, Default)]
pub struct SourceSnippetProvider;

#[async_trait]
impl CopyDataProvider for SourceSnippetProvider {
    async fn provide_copy_data(
        &self,
        document: &Document,
        selection: Selection,
        transfer: &mut DataTransfer,
        _token: &CancellationToken,
    ) -> Result<(), ProviderError> {
        let Some(text) = document.slice(selection) else {
            return Err(ProviderError::Failed(format!(
                "selection {}..{} is outside {}",
                selection.start(),
                selection.end(),
                document.uri()
            )));
        };
        let snippet = SourceSnippet {
            uri: document.uri().to_string(),
            language: document.language_id().to_string(),
            text: text.to_string(),
        };
        let json = serde_json::to_string(&snippet)
            .map_err(|e| ProviderError::Failed(format!("encode snippet: {e}")))?;
        transfer.set(SOURCE_SNIPPET_MIME, TransferItem::text(json));
        Ok(())
    }
}

#[async_trait]
impl PasteEditProvider for SourceSnippetProvider {
    async fn provide_paste_edits(
        &self,
        document: &Document,
        selection: Selection,
        transfer: &DataTransfer,
        _token: &CancellationToken,
    ) -> Result<Option<PasteEdit>, ProviderError> {
        if document.language_id() != "markdown" {
            return Ok(None);
        }
        let Some(item) = transfer.get(SOURCE_SNIPPET_MIME) else {
            return Ok(None);
        };
        let raw = item.as_string().await;
        let snippet: SourceSnippet = match serde_json::from_str(&raw) {
            Ok(snippet) => snippet,
            Err(e) => {
                tracing::debug!(error = %e, "ignoring malformed source snippet");
                return Ok(None);
            }
        };
        if snippet.language == document.language_id() {
            return Ok(None);
        }
        Ok(Some(PasteEdit::replacing(
            document.uri(),
            selection,
            snippet.to_fenced_block(),
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rust_document() -> Document {
        Document::new("file:///src/lib.rs", "rust", "fn main() {}\n")
    }

    fn snippet_transfer(snippet: &SourceSnippet) -> DataTransfer {
        let mut transfer = DataTransfer::new();
        transfer.set(
            SOURCE_SNIPPET_MIME,
            TransferItem::text(serde_json::to_string(snippet).unwrap()),
        );
        transfer
    }

    async fn paste_into(document: &Document, transfer: &DataTransfer) -> Option<PasteEdit> {
        SourceSnippetProvider
            .provide_paste_edits(document, Selection::caret(0), transfer, &CancellationToken::new())
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn copy_records_selection_and_origin() {
        let mut transfer = DataTransfer::new();
        SourceSnippetProvider
            .provide_copy_data(
                &rust_document(),
                Selection::new(0, 9),
                &mut transfer,
                &CancellationToken::new(),
            )
            .await
            .unwrap();

        let raw = transfer.get(SOURCE_SNIPPET_MIME).unwrap().as_string().await;
        let snippet: SourceSnippet = serde_json::from_str(&raw).unwrap();
        assert_eq!(
            snippet,
            SourceSnippet {
                uri: "file:///src/lib.rs".into(),
                language: "rust".into(),
                text: "fn main()".into(),
            }
        );
    }

    #[tokio::test]
    async fn copy_rejects_out_of_range_selection() {
        let mut transfer = DataTransfer::new();
        let err = SourceSnippetProvider
            .provide_copy_data(
                &rust_document(),
                Selection::new(0, 99),
                &mut transfer,
                &CancellationToken::new(),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::Failed(_)));
        assert!(transfer.is_empty());
    }

    #[tokio::test]
    async fn pastes_fenced_block_into_markdown() {
        let transfer = snippet_transfer(&SourceSnippet {
            uri: "file:///src/lib.rs".into(),
            language: "rust".into(),
            text: "let x = 1;\n".into(),
        });
        let doc = Document::new("file:///notes/a.md", "markdown", "");
        let edit = paste_into(&doc, &transfer).await.unwrap();
        assert_eq!(edit.edits()[0].new_text, "```rust\nlet x = 1;\n```");
    }

    #[tokio::test]
    async fn same_language_or_non_markdown_target_is_skipped() {
        let markdown = SourceSnippet {
            uri: "file:///notes/b.md".into(),
            language: "markdown".into(),
            text: "# title".into(),
        };
        let doc = Document::new("file:///notes/a.md", "markdown", "");
        assert!(paste_into(&doc, &snippet_transfer(&markdown)).await.is_none());

        let rust = SourceSnippet {
            language: "rust".into(),
            ..markdown
        };
        assert!(paste_into(&rust_document(), &snippet_transfer(&rust)).await.is_none());
    }

    #[tokio::test]
    async fn malformed_payload_is_ignored() {
        let mut transfer = DataTransfer::new();
        transfer.set(SOURCE_SNIPPET_MIME, TransferItem::text("{not json"));
        let doc = Document::new("file:///notes/a.md", "markdown", "");
        assert!(paste_into(&doc, &transfer).await.is_none());
    }

    #[test]
    fn fence_outgrows_backticks_in_text() {
        let snippet = SourceSnippet {
            uri: "file:///README.md".into(),
            language: "text".into(),
            text: "use ```` here".into(),
        };
        assert_eq!(snippet.to_fenced_block(), "`````text\nuse ```` here\n`````");
    }
}
