//! Process-lifetime store of per-file indices.
//!
//! Thread safety:
//! - `DashMap` for concurrent reads (the common case: queries)
//! - An entry is an `Arc<FileIndex>` swapped in whole, so readers see either
//!   the previous scan or the new one, never a partial one

use crate::analysis::file_index::FileIndex;
use dashmap::DashMap;
use rustc_hash::FxHashSet;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// File path to file index. Entries are never evicted; they are replaced
/// wholesale on re-scan.
#[derive(Debug, Default)]
pub struct IndexCache {
    entries: DashMap<PathBuf, Arc<FileIndex>>,
    scans: AtomicUsize,
}

impl IndexCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, path: &Path) -> Option<Arc<FileIndex>> {
        self.entries.get(path).map(|e| Arc::clone(e.value()))
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.entries.contains_key(path)
    }

    /// Stores a freshly scanned index, replacing any previous entry.
    pub fn insert(&self, index: FileIndex) {
        self.scans.fetch_add(1, Ordering::Relaxed);
        self.entries
            .insert(index.path().to_path_buf(), Arc::new(index));
    }

    pub fn remove(&self, path: &Path) -> Option<Arc<FileIndex>> {
        self.entries.remove(path).map(|(_, index)| index)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of scans stored since this cache was created.
    pub fn scan_count(&self) -> usize {
        self.scans.load(Ordering::Relaxed)
    }

    /// Every file reachable from `path` through include directives, in
    /// discovery order. `path` itself is excluded even when an include
    /// cycle leads back to it.
    pub fn include_closure(&self, path: &Path) -> Vec<PathBuf> {
        let mut seen: FxHashSet<PathBuf> = FxHashSet::default();
        seen.insert(path.to_path_buf());
        let mut order = Vec::new();
        let mut queue: Vec<PathBuf> = self
            .get(path)
            .map(|index| index.includes().to_vec())
            .unwrap_or_default();
        queue.reverse();

        while let Some(next) = queue.pop() {
            if !seen.insert(next.clone()) {
                continue;
            }
            if let Some(index) = self.get(&next) {
                queue.extend(index.includes().iter().rev().cloned());
            }
            order.push(next);
        }

        order
    }
}
