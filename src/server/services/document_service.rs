//! Document service for open editor buffers.
//!
//! Buffers are kept so outline and cursor lookups see unsaved text; they
//! are separate from the symbol index, which outlives closed documents.

use compact_str::CompactString;
use dashmap::DashMap;
use std::sync::Arc;
use tower_lsp::lsp_types::{TextDocumentContentChangeEvent, Url};

/// Text and metadata of one open document.
#[derive(Debug, Clone)]
pub struct DocumentState {
    pub uri: Url,
    pub language_id: CompactString,
    pub content: Arc<String>,
    pub version: i32,
}

/// Service for document management operations.
#[derive(Clone, Default)]
pub struct DocumentService {
    documents: Arc<DashMap<Url, DocumentState>>,
}

impl DocumentService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn open(&self, uri: Url, language_id: String, content: String, version: i32) {
        self.documents.insert(
            uri.clone(),
            DocumentState {
                uri,
                language_id: CompactString::from(language_id),
                content: Arc::new(content),
                version,
            },
        );
    }

    /// Applies full-document changes and returns the resulting text.
    /// Ranged changes are ignored; the server advertises full sync.
    pub fn update(
        &self,
        uri: &Url,
        changes: Vec<TextDocumentContentChangeEvent>,
        version: i32,
    ) -> Option<Arc<String>> {
        let mut entry = self.documents.get_mut(uri)?;
        for change in changes {
            if change.range.is_none() {
                entry.content = Arc::new(change.text);
            }
        }
        entry.version = version;
        Some(entry.content.clone())
    }

    pub fn close(&self, uri: &Url) {
        self.documents.remove(uri);
    }

    pub fn get(&self, uri: &Url) -> Option<DocumentState> {
        self.documents.get(uri).map(|entry| entry.value().clone())
    }

    pub fn content(&self, uri: &Url) -> Option<Arc<String>> {
        self.documents.get(uri).map(|entry| entry.content.clone())
    }

    pub fn all_uris(&self) -> Vec<Url> {
        self.documents.iter().map(|entry| entry.key().clone()).collect()
    }

    pub fn document_count(&self) -> usize {
        self.documents.len()
    }
}
