//! Paste a `text/uri-list` into markdown as links.
//!
//! Each listed URI becomes `[name](target)`, or `![name](target)` when
//! it names an image. Targets that share the document's scheme are
//! written relative to the document's directory.

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::document::{Document, PasteEdit, Selection};
use crate::provider::{PasteEditProvider, ProviderError};
use crate::transfer::DataTransfer;

pub const URI_LIST_MIME: &str = "text/uri-list";

const IMAGE_EXTENSIONS: &[&str] = &[
    "bmp", "gif", "ico", "jpe", "jpeg", "jpg", "png", "psd", "svg", "tga", "tif", "tiff", "webp",
];

#[derive(Debug, Default)]
pub struct UriListPasteProvider;

#[async_trait]
impl PasteEditProvider for UriListPasteProvider {
    async fn provide_paste_edits(
        &self,
        document: &Document,
        selection: Selection,
        transfer: &DataTransfer,
        token: &CancellationToken,
    ) -> Result<Option<PasteEdit>, ProviderError> {
        let Some(item) = transfer.get(URI_LIST_MIME) else {
            return Ok(None);
        };
        let list = item.as_string().await;
        if token.is_cancelled() {
            return Err(ProviderError::Cancelled);
        }

        let links: Vec<String> = parse_uri_list(&list)
            .map(|uri| markdown_link(document.uri(), uri))
            .collect();
        if links.is_empty() {
            return Ok(None);
        }
        Ok(Some(PasteEdit::replacing(
            document.uri(),
            selection,
            links.join(" "),
        )))
    }
}

/// URIs in a `text/uri-list` body, skipping blanks and `#` comments.
pub fn parse_uri_list(list: &str) -> impl Iterator<Item = &str> {
    list.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
}

/// Markdown link to `uri` as written from the document at `document_uri`.
pub fn markdown_link(document_uri: &str, uri: &str) -> String {
    let path = split_uri(uri).map_or(uri, |(_, path)| path);
    let name = path.trim_end_matches('/').rsplit('/').next().unwrap_or_default();
    let name = if name.is_empty() { uri } else { name };

    let target = match (split_uri(document_uri), split_uri(uri)) {
        (Some((doc_scheme, doc_path)), Some((scheme, path))) if doc_scheme == scheme => {
            let dir = doc_path.rsplit_once('/').map_or("", |(dir, _)| dir);
            match relative_path(dir, path) {
                relative if relative.is_empty() => ".".to_string(),
                relative => encode_destination(&relative),
            }
        }
        _ => encode_destination(uri),
    };

    let bang = if is_image(name) { "!" } else { "" };
    format!("{bang}[{}]({target})", escape_link_text(name))
}

/// Split `scheme://authority/path?query#fragment` into scheme and path.
fn split_uri(uri: &str) -> Option<(&str, &str)> {
    let (scheme, rest) = uri.split_once("://")?;
    let path = rest.find('/').map_or("", |i| &rest[i..]);
    let path = path.split(['?', '#']).next().unwrap_or(path);
    Some((scheme, path))
}

fn relative_path(from_dir: &str, to: &str) -> String {
    let from: Vec<&str> = from_dir.split('/').filter(|s| !s.is_empty()).collect();
    let to: Vec<&str> = to.split('/').filter(|s| !s.is_empty()).collect();
    let common = from.iter().zip(&to).take_while(|(a, b)| a == b).count();

    let mut parts = vec![".."; from.len() - common];
    parts.extend_from_slice(&to[common..]);
    parts.join("/")
}

/// Percent-encode the characters that end or split a link destination.
fn encode_destination(target: &str) -> String {
    let mut encoded = String::with_capacity(target.len());
    for c in target.chars() {
        match c {
            ' ' => encoded.push_str("%20"),
            '(' => encoded.push_str("%28"),
            ')' => encoded.push_str("%29"),
            '<' => encoded.push_str("%3C"),
            '>' => encoded.push_str("%3E"),
            c => encoded.push(c),
        }
    }
    encoded
}

fn is_image(name: &str) -> bool {
    name.rsplit_once('.').is_some_and(|(_, ext)| {
        IMAGE_EXTENSIONS
            .iter()
            .any(|image| image.eq_ignore_ascii_case(ext))
    })
}

fn escape_link_text(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, '[' | ']') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}
