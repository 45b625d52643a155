//! The index facade the editor adapter talks to.
//!
//! Every operation runs to completion on the calling thread; nothing here
//! awaits or spawns. The cache is owned by this value and shared by handle,
//! so independent instances (tests, several workspaces) never interfere.

use crate::analysis::cache::IndexCache;
use crate::analysis::error::IndexError;
use crate::analysis::expander::ValueExpander;
use crate::analysis::file_index::scan;
use crate::analysis::indexer::{normalize_path, Indexer};
use crate::constants::DEFAULT_MAX_EXPANSION_DEPTH;
use crate::error_ext::ResultExt;
use crate::types::{Entity, SymbolLocation};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tracing::debug;

pub struct MakefileIndex {
    cache: Arc<IndexCache>,
    max_expansion_depth: AtomicUsize,
}

impl MakefileIndex {
    pub fn new() -> Self {
        Self::with_cache(Arc::new(IndexCache::new()))
    }

    pub fn with_cache(cache: Arc<IndexCache>) -> Self {
        Self {
            cache,
            max_expansion_depth: AtomicUsize::new(DEFAULT_MAX_EXPANSION_DEPTH),
        }
    }

    pub fn cache(&self) -> &Arc<IndexCache> {
        &self.cache
    }

    pub fn set_max_expansion_depth(&self, depth: usize) {
        self.max_expansion_depth.store(depth.max(1), Ordering::Relaxed);
    }

    pub fn max_expansion_depth(&self) -> usize {
        self.max_expansion_depth.load(Ordering::Relaxed)
    }

    /// Entities of one file's text in line order, for an outline view.
    /// Does not consult or change the cache.
    pub fn build_symbol_index(&self, content: &str, path: &Path) -> Vec<Entity> {
        scan(content, &absolute(path)).entities
    }

    /// Re-scans `path` from disk, replacing its entry. A file that vanished
    /// loses its entry. A read fault on an included file is returned after
    /// every readable entry is stored.
    pub fn invalidate_and_reindex(&self, path: &Path) -> Result<(), IndexError> {
        let path = absolute(path);
        let mut indexer = Indexer::new(&self.cache);
        indexer.index_path(&path)?;
        if !path.exists() && self.cache.remove(&path).is_some() {
            debug!("Dropped index of deleted build file {}", path.display());
        }
        indexer.finish()
    }

    /// Populates the entry for `path` if it is absent, from `content` when
    /// the caller holds the text, otherwise from disk.
    pub fn ensure_indexed(&self, path: &Path, content: Option<&str>) -> Result<(), IndexError> {
        let path = absolute(path);
        if self.cache.contains(&path) {
            return Ok(());
        }
        let mut indexer = Indexer::new(&self.cache);
        match content {
            Some(text) => indexer.index_content(&path, text),
            None => indexer.index_path(&path)?,
        }
        indexer.finish()
    }

    /// Replaces the entry for `path` with a scan of in-memory `content`.
    pub fn reindex_content(&self, path: &Path, content: &str) -> Result<(), IndexError> {
        let mut indexer = Indexer::new(&self.cache);
        indexer.index_content(&absolute(path), content);
        indexer.finish()
    }

    /// One location per entity named `name` visible from `path`: the file's
    /// own entities first, then those of every included file.
    pub fn resolve_definition(&self, path: &Path, name: &str) -> Vec<SymbolLocation> {
        let path = absolute(path);
        let _ = self.ensure_indexed(&path, None).ok_warn("resolve_definition");

        let mut locations: Vec<SymbolLocation> = self
            .cache
            .get(&path)
            .map(|index| index.lookup(name).map(Entity::location).collect())
            .unwrap_or_default();

        for include in self.cache.include_closure(&path) {
            if let Some(index) = self.cache.get(&include) {
                locations.extend(index.lookup(name).map(Entity::location));
            }
        }

        locations
    }

    /// Fully substituted value of `name` as seen from `line` of `path`.
    pub fn resolve_hover_value(&self, path: &Path, name: &str, line: u32) -> Option<String> {
        let path = absolute(path);
        let _ = self.ensure_indexed(&path, None).ok_warn("resolve_hover_value");
        ValueExpander::new(&self.cache, self.max_expansion_depth()).expand(name, &path, line)
    }

    /// Transitive include closure of `path`, in discovery order.
    pub fn include_set(&self, path: &Path) -> Vec<PathBuf> {
        self.cache.include_closure(&absolute(path))
    }

    pub fn is_indexed(&self, path: &Path) -> bool {
        self.cache.contains(&absolute(path))
    }
}

impl Default for MakefileIndex {
    fn default() -> Self {
        Self::new()
    }
}

fn absolute(path: &Path) -> PathBuf {
    if path.is_absolute() {
        return normalize_path(path);
    }
    match std::env::current_dir().ok_logged("current_dir") {
        Some(cwd) => normalize_path(&cwd.join(path)),
        None => normalize_path(path),
    }
}
