//! Index service: URI-facing wrapper over [`MakefileIndex`].
//!
//! Converts editor URIs to file paths and times each query; the index
//! itself stays free of protocol types.

use crate::analysis::{IndexError, MakefileIndex};
use crate::constants::SLOW_RESOLUTION_MS;
use crate::server::error::LspError;
use crate::types::{Entity, SymbolLocation};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tower_lsp::lsp_types::Url;

#[derive(Clone)]
pub struct IndexService {
    index: Arc<MakefileIndex>,
}

impl IndexService {
    pub fn new(index: Arc<MakefileIndex>) -> Self {
        Self { index }
    }

    pub fn file_path(uri: &Url) -> Result<PathBuf, LspError> {
        uri.to_file_path().map_err(|_| LspError::not_a_file(uri))
    }

    pub fn build_symbol_index(&self, uri: &Url, content: &str) -> Result<Vec<Entity>, LspError> {
        let path = Self::file_path(uri)?;
        Ok(self.index.build_symbol_index(content, &path))
    }

    pub fn ensure_indexed(&self, uri: &Url, content: Option<&str>) -> Result<(), LspError> {
        let path = Self::file_path(uri)?;
        self.index.ensure_indexed(&path, content)?;
        Ok(())
    }

    pub fn reindex_content(&self, uri: &Url, content: &str) -> Result<(), LspError> {
        let path = Self::file_path(uri)?;
        self.index.reindex_content(&path, content)?;
        Ok(())
    }

    pub fn invalidate_and_reindex(&self, uri: &Url) -> Result<(), LspError> {
        let path = Self::file_path(uri)?;
        self.index.invalidate_and_reindex(&path).map_err(LspError::from)
    }

    pub fn resolve_definition(&self, uri: &Url, name: &str) -> Result<Vec<SymbolLocation>, LspError> {
        let path = Self::file_path(uri)?;
        let start = Instant::now();
        let locations = self.index.resolve_definition(&path, name);
        warn_if_slow("definition", name, start);
        Ok(locations)
    }

    pub fn resolve_hover_value(
        &self,
        uri: &Url,
        name: &str,
        line: u32,
    ) -> Result<Option<String>, LspError> {
        let path = Self::file_path(uri)?;
        let start = Instant::now();
        let value = self.index.resolve_hover_value(&path, name, line);
        warn_if_slow("hover", name, start);
        Ok(value)
    }

    pub fn set_max_expansion_depth(&self, depth: usize) {
        self.index.set_max_expansion_depth(depth);
    }
}

/// Whether an index error is worth telling the user about.
pub fn is_reportable(err: &LspError) -> bool {
    matches!(err, LspError::Index(IndexError::Io { .. }))
}

fn warn_if_slow(query: &str, name: &str, start: Instant) {
    let elapsed = start.elapsed();
    if elapsed.as_millis() > SLOW_RESOLUTION_MS {
        tracing::warn!("Slow {} resolution: {:?} for '{}'", query, elapsed, name);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> IndexService {
        IndexService::new(Arc::new(MakefileIndex::new()))
    }

    #[test]
    fn test_non_file_uri_is_rejected() {
        let uri = Url::parse("untitled:Untitled-1").unwrap();
        let err = service().ensure_indexed(&uri, Some("A = 1")).unwrap_err();
        assert!(matches!(err, LspError::NotAFile { .. }));
        assert!(!is_reportable(&err));
    }

    #[test]
    fn test_unreadable_include_is_reportable() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("rules.mk")).unwrap();
        let uri = Url::from_file_path(dir.path().join("Makefile")).unwrap();

        let err = service()
            .ensure_indexed(&uri, Some("include rules.mk\n"))
            .unwrap_err();
        assert!(is_reportable(&err));
    }

    #[test]
    fn test_queries_go_through_the_shared_index() {
        let service = service();
        let uri = Url::from_file_path("/ws/Makefile").unwrap();
        service.ensure_indexed(&uri, Some("CC := gcc\n")).unwrap();

        let cloned = service.clone();
        assert_eq!(
            cloned.resolve_hover_value(&uri, "CC", 4).unwrap().as_deref(),
            Some("gcc")
        );
        assert_eq!(cloned.resolve_definition(&uri, "CC").unwrap().len(), 1);
    }
}
