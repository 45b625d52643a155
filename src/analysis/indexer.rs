//! File index builder and include resolution.
//!
//! Building a file scans it, resolves each include directive against the
//! including file's directory, builds any included file the cache does not
//! yet hold, and finally stores the file's own entry. A stack of paths
//! currently being built stops circular include graphs from recursing.
//! Read faults on included files do not stop the pass; they are collected
//! and handed back by [`Indexer::finish`].

use crate::analysis::cache::IndexCache;
use crate::analysis::error::IndexError;
use crate::analysis::file_index::{scan, FileIndex};
use rustc_hash::FxHashSet;
use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};
use tracing::{debug, info, warn};

/// Resolves `target` as written in an include directive of `including`.
pub fn resolve_include_path(including: &Path, target: &str) -> PathBuf {
    let target = Path::new(target);
    if target.is_absolute() {
        return normalize_path(target);
    }
    let base = including.parent().unwrap_or_else(|| Path::new(""));
    normalize_path(&base.join(target))
}

/// Normalize a path by resolving `.` and `..` components.
///
/// Unlike `canonicalize()`, this doesn't require the path to exist
/// and doesn't resolve symlinks.
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut components = Vec::new();

    for component in path.components() {
        match component {
            Component::ParentDir => {
                if matches!(components.last(), Some(Component::Normal(_))) {
                    components.pop();
                }
            }
            Component::CurDir => {}
            _ => components.push(component),
        }
    }

    components.iter().collect()
}

/// One build pass over a file and everything it pulls in.
pub struct Indexer<'a> {
    cache: &'a IndexCache,
    in_progress: FxHashSet<PathBuf>,
    include_faults: Vec<IndexError>,
}

impl<'a> Indexer<'a> {
    pub fn new(cache: &'a IndexCache) -> Self {
        Self {
            cache,
            in_progress: FxHashSet::default(),
            include_faults: Vec::new(),
        }
    }

    /// Reads `path` from disk and rebuilds its entry. A file that does not
    /// exist is a no-op: no entry, no error. Bytes that are not UTF-8 are
    /// replaced, never rejected.
    pub fn index_path(&mut self, path: &Path) -> Result<(), IndexError> {
        let content = match std::fs::read(path) {
            Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("Build file not found, skipping: {}", path.display());
                return Ok(());
            }
            Err(source) => {
                return Err(IndexError::Io {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };
        self.index_content(path, &content);
        Ok(())
    }

    /// Rebuilds the entry for `path` from `content`.
    pub fn index_content(&mut self, path: &Path, content: &str) {
        let path = normalize_path(path);
        if !self.in_progress.insert(path.clone()) {
            debug!("Include cycle, not re-entering {}", path.display());
            return;
        }

        let scanned = scan(content, &path);
        let mut includes = Vec::with_capacity(scanned.includes.len());

        for (line, raw) in &scanned.includes {
            if raw.contains('$') {
                debug!(
                    "Skipping include with unexpanded reference at {}:{}: {}",
                    path.display(),
                    line,
                    raw
                );
                continue;
            }
            let resolved = resolve_include_path(&path, raw);
            includes.push(resolved.clone());
            self.resolve_include(&resolved);
        }

        let entity_count = scanned.entities.len();
        self.cache
            .insert(FileIndex::new(path.clone(), scanned.entities, includes));
        self.in_progress.remove(&path);

        info!(
            "Indexed build file {} ({} entities)",
            path.display(),
            entity_count
        );
    }

    /// Makes sure an included file has a cache entry. Entries already cached
    /// are trusted as fresh.
    fn resolve_include(&mut self, resolved: &Path) {
        if self.cache.contains(resolved) {
            debug!("Included build file already cached: {}", resolved.display());
            return;
        }
        if self.in_progress.contains(resolved) {
            debug!("Include cycle, not re-entering {}", resolved.display());
            return;
        }
        if let Err(e) = self.index_path(resolved) {
            warn!("Included build file unreadable: {}", e);
            self.include_faults.push(e);
            return;
        }
        debug!("Included build file processed: {}", resolved.display());
    }

    /// Ends the pass. Entries are already stored; the first read fault met
    /// on an included file, if any, is returned.
    pub fn finish(self) -> Result<(), IndexError> {
        match self.include_faults.into_iter().next() {
            Some(fault) => Err(fault),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_resolve_relative_and_absolute() {
        let including = Path::new("/ws/sub/Makefile");
        assert_eq!(
            resolve_include_path(including, "rules.mk"),
            PathBuf::from("/ws/sub/rules.mk")
        );
        assert_eq!(
            resolve_include_path(including, "../common/./defs.mk"),
            PathBuf::from("/ws/common/defs.mk")
        );
        assert_eq!(
            resolve_include_path(including, "/opt/make/base.mk"),
            PathBuf::from("/opt/make/base.mk")
        );
    }

    #[test]
    fn test_normalize_does_not_climb_past_root() {
        assert_eq!(normalize_path(Path::new("/../a/b")), PathBuf::from("/a/b"));
    }

    #[test]
    fn test_missing_file_is_a_noop() {
        let cache = IndexCache::new();
        let mut indexer = Indexer::new(&cache);
        assert!(indexer.index_path(Path::new("/definitely/not/here.mk")).is_ok());
        assert!(cache.is_empty());
        assert_eq!(cache.scan_count(), 0);
    }

    #[test]
    fn test_includes_are_built_once() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        fs::write(root.join("Makefile"), "include a.mk\ninclude a.mk\nX := 1\n").unwrap();
        fs::write(root.join("a.mk"), "Y := 2\n").unwrap();

        let cache = IndexCache::new();
        Indexer::new(&cache).index_path(&root.join("Makefile")).unwrap();

        assert_eq!(cache.len(), 2);
        assert_eq!(cache.scan_count(), 2);
        let main = cache.get(&root.join("Makefile")).unwrap();
        assert_eq!(main.includes().len(), 2);
    }

    #[test]
    fn test_circular_includes_terminate() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        fs::write(root.join("a.mk"), "include b.mk\nA := 1\n").unwrap();
        fs::write(root.join("b.mk"), "include a.mk\nB := 2\n").unwrap();

        let cache = IndexCache::new();
        Indexer::new(&cache).index_path(&root.join("a.mk")).unwrap();

        assert_eq!(cache.len(), 2);
        let b = cache.get(&root.join("b.mk")).unwrap();
        assert_eq!(b.includes(), &[root.join("a.mk")]);
        assert!(cache.get(&root.join("a.mk")).unwrap().contains("A"));
    }

    #[test]
    fn test_missing_include_is_recorded_but_not_cached() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        fs::write(root.join("Makefile"), "-include gone.mk\n").unwrap();

        let cache = IndexCache::new();
        Indexer::new(&cache).index_path(&root.join("Makefile")).unwrap();

        assert_eq!(cache.len(), 1);
        assert!(!cache.contains(&root.join("gone.mk")));
    }

    #[test]
    fn test_invalid_utf8_is_decoded_lossily() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("Makefile");
        fs::write(&path, b"# Autor: Jos\xe9\nCC := gcc\n").unwrap();

        let cache = IndexCache::new();
        Indexer::new(&cache).index_path(&path).unwrap();

        let entry = cache.get(&path).unwrap();
        let cc: Vec<_> = entry.lookup("CC").collect();
        assert_eq!(cc.len(), 1);
        assert_eq!(cc[0].value(), "gcc");
        assert_eq!(cc[0].line(), 1);
    }

    #[test]
    fn test_unreadable_include_is_returned_after_storing_entries() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        fs::create_dir(root.join("sub.mk")).unwrap();
        fs::write(root.join("Makefile"), "include sub.mk ok.mk
X := 1
").unwrap();
        fs::write(root.join("ok.mk"), "Y := 2
").unwrap();

        let cache = IndexCache::new();
        let mut indexer = Indexer::new(&cache);
        indexer.index_path(&root.join("Makefile")).unwrap();
        let err = indexer.finish().unwrap_err();

        let IndexError::Io { path, .. } = &err;
        assert_eq!(path, &root.join("sub.mk"));
        assert!(cache.get(&root.join("Makefile")).unwrap().contains("X"));
        assert!(cache.contains(&root.join("ok.mk")));
        assert!(!cache.contains(&root.join("sub.mk")));
    }

    #[test]
    fn test_clean_pass_finishes_ok() {
        let cache = IndexCache::new();
        let mut indexer = Indexer::new(&cache);
        indexer.index_content(Path::new("/ws/Makefile"), "-include none.mk
A := 1
");
        assert!(indexer.finish().is_ok());
    }

    #[test]
    fn test_include_with_variable_is_skipped() {
        let cache = IndexCache::new();
        Indexer::new(&cache).index_content(Path::new("/ws/Makefile"), "include $(ROOT)/x.mk\n");
        let entry = cache.get(Path::new("/ws/Makefile")).unwrap();
        assert!(entry.includes().is_empty());
    }
}
