//! Providers shipped with the crate.

pub mod markdown;
pub mod source;

use std::sync::Arc;

use crate::provider::{DocumentSelector, LanguageRegistry, Provider, Registration};

pub use markdown::{URI_LIST_MIME, UriListPasteProvider};
pub use source::{SOURCE_SNIPPET_MIME, SourceSnippet, SourceSnippetProvider};

/// Register the built-in providers on `registry`.
pub fn register_defaults(registry: &LanguageRegistry) -> Vec<Registration> {
    vec![
        registry.register(
            DocumentSelector::any(),
            Provider::both("source-snippet", Arc::new(SourceSnippetProvider)),
        ),
        registry.register(
            DocumentSelector::language("markdown"),
            Provider::new("markdown-uri-list").with_paste(Arc::new(UriListPasteProvider)),
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Document;
    use crate::provider::{Capability, ProviderRegistry};

    fn names(registry: &LanguageRegistry, document: &Document, capability: Capability) -> Vec<String> {
        registry
            .ordered_with(document, capability)
            .iter()
            .map(|p| p.name().to_string())
            .collect()
    }

    #[test]
    fn markdown_documents_get_both_paste_providers() {
        let registry = LanguageRegistry::new();
        register_defaults(&registry);
        let doc = Document::new("file:///a.md", "markdown", "");
        assert_eq!(
            names(&registry, &doc, Capability::PasteEdits),
            vec!["markdown-uri-list", "source-snippet"]
        );
        assert_eq!(names(&registry, &doc, Capability::CopyData), vec!["source-snippet"]);
    }

    #[test]
    fn other_documents_only_get_snippets() {
        let registry = LanguageRegistry::new();
        let registrations = register_defaults(&registry);
        let doc = Document::new("file:///a.rs", "rust", "");
        assert_eq!(names(&registry, &doc, Capability::PasteEdits), vec!["source-snippet"]);

        for registration in registrations {
            assert!(registry.deregister(registration));
        }
        assert!(registry.is_empty());
    }
}
