//! Recursive `$(NAME)` / `${NAME}` substitution for hover values.
//!
//! Each inner reference is resolved at the definition site of the value it
//! appears in, not at the original query point, so substitution follows the
//! chain of definitions across files. The `(name, file, line)` keys of the
//! definitions being expanded are kept on a stack; meeting one again ends
//! that branch and leaves the reference as written.

use crate::analysis::cache::IndexCache;
use crate::types::Entity;
use compact_str::CompactString;
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use tracing::{debug, warn};

static INNER_REFERENCE: OnceLock<Option<Regex>> = OnceLock::new();

fn inner_reference() -> Option<&'static Regex> {
    INNER_REFERENCE
        .get_or_init(|| match Regex::new(r"\$[({](\w+)[)}]") {
            Ok(re) => Some(re),
            Err(e) => {
                tracing::error!(error = %e, "Failed to compile inner reference pattern");
                None
            }
        })
        .as_ref()
}

/// The definition of `name` in effect at `line` of `file`.
///
/// Same-file definitions win: the last one at or before `line`. When the
/// file has none that qualify, the definitions of its included files are
/// the fallback pool, and the last definition in include discovery order is
/// taken. References and calls are uses and never qualify.
pub fn find_definition(cache: &IndexCache, name: &str, file: &Path, line: u32) -> Option<Entity> {
    if let Some(index) = cache.get(file) {
        let nearest = index
            .lookup(name)
            .filter(|e| e.kind().is_definition())
            .take_while(|e| e.line() <= line)
            .last();
        if let Some(entity) = nearest {
            return Some(entity.clone());
        }
    }

    cache
        .include_closure(file)
        .iter()
        .filter_map(|path| cache.get(path))
        .filter_map(|index| {
            index
                .lookup(name)
                .filter(|e| e.kind().is_definition())
                .last()
                .cloned()
        })
        .last()
}

type ExpansionKey = (CompactString, PathBuf, u32);

/// One hover expansion. Not reusable across queries.
pub struct ValueExpander<'a> {
    cache: &'a IndexCache,
    max_depth: usize,
    stack: Vec<ExpansionKey>,
}

impl<'a> ValueExpander<'a> {
    pub fn new(cache: &'a IndexCache, max_depth: usize) -> Self {
        Self {
            cache,
            max_depth,
            stack: Vec::new(),
        }
    }

    /// Fully substituted value of `name` as seen from `line` of `file`, or
    /// `None` when no definition is reachable.
    pub fn expand(&mut self, name: &str, file: &Path, line: u32) -> Option<String> {
        let definition = find_definition(self.cache, name, file, line)?;
        let key: ExpansionKey = (
            CompactString::from(name),
            definition.file().to_path_buf(),
            definition.line(),
        );

        if self.stack.contains(&key) {
            debug!(
                "Cyclic definition of {} at {}:{}, leaving unexpanded",
                name,
                definition.file().display(),
                definition.line()
            );
            return None;
        }
        if self.stack.len() >= self.max_depth {
            warn!(
                "Expansion of {} stopped at depth {}",
                name, self.max_depth
            );
            return None;
        }

        self.stack.push(key);
        let value = self.substitute(&definition);
        self.stack.pop();

        Some(value)
    }

    fn substitute(&mut self, definition: &Entity) -> String {
        let mut value = definition.value().to_string();
        let Some(re) = inner_reference() else {
            return value;
        };

        let mut cursor = 0;
        loop {
            let Some((start, end, inner)) = re.captures_at(&value, cursor).and_then(|caps| {
                let whole = caps.get(0)?;
                let inner = caps.get(1)?;
                Some((whole.start(), whole.end(), CompactString::from(inner.as_str())))
            }) else {
                break;
            };

            match self.expand(&inner, definition.file(), definition.line()) {
                Some(replacement) => {
                    value.replace_range(start..end, &replacement);
                    cursor = start + replacement.len();
                }
                None => cursor = end,
            }
        }

        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::indexer::Indexer;
    use std::time::{Duration, Instant};

    const FILE: &str = "/ws/Makefile";

    fn cache_with(content: &str) -> IndexCache {
        let cache = IndexCache::new();
        Indexer::new(&cache).index_content(Path::new(FILE), content);
        cache
    }

    fn expand(cache: &IndexCache, name: &str, line: u32) -> Option<String> {
        ValueExpander::new(cache, 64).expand(name, Path::new(FILE), line)
    }

    #[test]
    fn test_nearest_preceding_definition() {
        let cache = cache_with("X := 1\n\n\n\n\nX := 2\n");
        assert_eq!(expand(&cache, "X", 3).as_deref(), Some("1"));
        assert_eq!(expand(&cache, "X", 5).as_deref(), Some("2"));
        assert_eq!(expand(&cache, "X", 6).as_deref(), Some("2"));
    }

    #[test]
    fn test_query_before_any_definition_is_none() {
        let cache = cache_with("\n\nX := 1\n");
        assert_eq!(expand(&cache, "X", 1), None);
        assert_eq!(expand(&cache, "UNKNOWN", 10), None);
    }

    #[test]
    fn test_inner_substitution() {
        let cache = cache_with("A := foo\nB := $(A)bar\n");
        assert_eq!(expand(&cache, "B", 5).as_deref(), Some("foobar"));
    }

    #[test]
    fn test_three_level_chain_flattens() {
        let cache = cache_with("A := a\nB := ${A}-b\nC := $(B)-c $(A)\n");
        assert_eq!(expand(&cache, "C", 3).as_deref(), Some("a-b-c a"));
    }

    #[test]
    fn test_inner_resolved_at_definition_site() {
        let cache = cache_with("A := old\nB = $(A)\nA := new\n");
        assert_eq!(expand(&cache, "B", 10).as_deref(), Some("old"));
    }

    #[test]
    fn test_unresolved_inner_reference_stays_literal() {
        let cache = cache_with("B := $(NOPE) and $(A)\nA := x\n");
        assert_eq!(expand(&cache, "B", 5).as_deref(), Some("$(NOPE) and $(A)"));
    }

    #[test]
    fn test_self_reference_is_bounded() {
        let cache = cache_with("A = $(A) more\n");
        let start = Instant::now();
        assert_eq!(expand(&cache, "A", 0).as_deref(), Some("$(A) more"));
        assert!(start.elapsed() < Duration::from_secs(1));
    }

    #[test]
    fn test_depth_ceiling() {
        let cache = cache_with("A := x\nB := $(A)\nC := $(B)\n");
        let value = ValueExpander::new(&cache, 2).expand("C", Path::new(FILE), 5);
        assert_eq!(value.as_deref(), Some("$(A)"));
    }

    #[test]
    fn test_reference_entities_are_not_definitions() {
        let cache = cache_with("CFLAGS := -O2\nrun $(CFLAGS) now\n");
        assert_eq!(expand(&cache, "CFLAGS", 1).as_deref(), Some("-O2"));
    }
}
