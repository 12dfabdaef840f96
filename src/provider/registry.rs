//! Provider registry: selector-scoped, priority-ordered provider lookup.
//!
//! Ordering: highest selector score first; among equal scores the most
//! recently registered provider wins. The order is stable for a given
//! document as long as registrations do not change.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{PoisonError, RwLock};

use regex::Regex;

use crate::document::Document;

use super::{Capability, Provider};

/// Source of ordered providers for a document.
pub trait ProviderRegistry: Send + Sync {
    /// All providers applicable to `document`, in priority order.
    fn ordered(&self, document: &Document) -> Vec<Provider>;

    /// [`ProviderRegistry::ordered`], keeping only providers that
    /// implement `capability`.
    fn ordered_with(&self, document: &Document, capability: Capability) -> Vec<Provider> {
        self.ordered(document)
            .into_iter()
            .filter(|provider| provider.supports(capability))
            .collect()
    }
}

/// Which documents a provider applies to.
///
/// `"*"` matches any language or scheme. Every field that is set must
/// match; an all-empty selector matches nothing.
#[derive(Debug, Clone, Default)]
pub struct DocumentSelector {
    language: Option<String>,
    scheme: Option<String>,
    pattern: Option<Regex>,
}

impl DocumentSelector {
    pub fn language(language: impl Into<String>) -> Self {
        Self {
            language: Some(language.into()),
            ..Self::default()
        }
    }

    /// Matches every document.
    pub fn any() -> Self {
        Self::language("*")
    }

    pub fn with_scheme(mut self, scheme: impl Into<String>) -> Self {
        self.scheme = Some(scheme.into());
        self
    }

    /// Restrict to documents whose URI matches `pattern`.
    pub fn with_pattern(mut self, pattern: &str) -> Result<Self, regex::Error> {
        self.pattern = Some(Regex::new(pattern)?);
        Ok(self)
    }

    /// Match score for `document`: 0 is no match, 10 an exact match, 5 a
    /// wildcard match.
    pub fn score(&self, document: &Document) -> u32 {
        let mut score = 0;
        if let Some(language) = &self.language {
            match component_score(language, document.language_id()) {
                0 => return 0,
                s => score = score.max(s),
            }
        }
        if let Some(scheme) = &self.scheme {
            match component_score(scheme, document.scheme()) {
                0 => return 0,
                s => score = score.max(s),
            }
        }
        if let Some(pattern) = &self.pattern {
            if !pattern.is_match(document.uri()) {
                return 0;
            }
            score = 10;
        }
        score
    }
}

fn component_score(wanted: &str, actual: &str) -> u32 {
    if wanted == actual {
        10
    } else if wanted == "*" {
        5
    } else {
        0
    }
}

/// Token returned by [`LanguageRegistry::register`], used to deregister.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Registration(u64);

#[derive(Debug)]
struct Entry {
    registration: Registration,
    selector: DocumentSelector,
    provider: Provider,
}

/// In-process [`ProviderRegistry`] keyed by [`DocumentSelector`]s.
#[derive(Debug, Default)]
pub struct LanguageRegistry {
    entries: RwLock<Vec<Entry>>,
    next_id: AtomicU64,
}

impl LanguageRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, selector: DocumentSelector, provider: Provider) -> Registration {
        let registration = Registration(self.next_id.fetch_add(1, Ordering::Relaxed));
        tracing::debug!(provider = provider.name(), ?registration, "provider registered");
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Entry {
                registration,
                selector,
                provider,
            });
        registration
    }

    /// Remove a provider. Returns `false` if it was already removed.
    pub fn deregister(&self, registration: Registration) -> bool {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        let before = entries.len();
        entries.retain(|entry| entry.registration != registration);
        entries.len() != before
    }

    pub fn len(&self) -> usize {
        self.entries.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ProviderRegistry for LanguageRegistry {
    fn ordered(&self, document: &Document) -> Vec<Provider> {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        let mut matched: Vec<(u32, Registration, &Provider)> = entries
            .iter()
            .filter_map(|entry| match entry.selector.score(document) {
                0 => None,
                score => Some((score, entry.registration, &entry.provider)),
            })
            .collect();
        matched.sort_by(|a, b| b.0.cmp(&a.0).then(b.1.cmp(&a.1)));
        matched
            .into_iter()
            .map(|(_, _, provider)| provider.clone())
            .collect()
    }
}
