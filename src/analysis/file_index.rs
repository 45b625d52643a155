//! Per-file symbol index.

use crate::analysis::classifier::{classify, LineMatch};
use crate::analysis::preprocess::logical_lines;
use crate::types::{Entity, EntityKind};
use compact_str::CompactString;
use rustc_hash::FxHashMap;
use smallvec::SmallVec;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Everything found in one top-to-bottom scan of a file.
#[derive(Debug, Clone, Default)]
pub struct FileScan {
    /// Entities in scan order (ascending line).
    pub entities: Vec<Entity>,
    /// Raw include paths with the logical line they appeared on.
    pub includes: Vec<(u32, CompactString)>,
}

/// Scans `content` as the text of `file`. Pure: touches neither the disk nor
/// any cache.
pub fn scan(content: &str, file: &Path) -> FileScan {
    let file: Arc<Path> = Arc::from(file);
    let mut result = FileScan::default();

    for (ln, line) in logical_lines(content).iter().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let ln = ln as u32;
        for m in classify(line) {
            let entity = match m {
                LineMatch::Target { name, column } => {
                    Entity::new(name, EntityKind::Target, "", file.clone(), ln, column)
                }
                LineMatch::Variable {
                    name,
                    column,
                    value,
                    ..
                } => Entity::new(name, EntityKind::Variable, &value, file.clone(), ln, column),
                LineMatch::Reference { name, column } => {
                    Entity::new(name, EntityKind::Reference, "", file.clone(), ln, column)
                }
                LineMatch::Function { name, column } => {
                    Entity::new(name, EntityKind::Function, "", file.clone(), ln, column)
                }
                LineMatch::FunctionCall { name, column } => {
                    Entity::new(name, EntityKind::FunctionCall, "", file.clone(), ln, column)
                }
                LineMatch::Include { paths } => {
                    result
                        .includes
                        .extend(paths.into_iter().map(|path| (ln, path)));
                    continue;
                }
                LineMatch::SpecialTarget { .. } => continue,
            };
            result.entities.push(entity);
        }
    }

    result
}

/// Name-to-entities mapping for one file, plus the files it directly
/// includes (already resolved to absolute paths).
#[derive(Debug, Clone)]
pub struct FileIndex {
    path: PathBuf,
    entities: Vec<Entity>,
    by_name: FxHashMap<CompactString, SmallVec<[usize; 2]>>,
    includes: Vec<PathBuf>,
}

impl FileIndex {
    pub fn new(path: PathBuf, entities: Vec<Entity>, includes: Vec<PathBuf>) -> Self {
        let mut by_name: FxHashMap<CompactString, SmallVec<[usize; 2]>> = FxHashMap::default();
        for (i, entity) in entities.iter().enumerate() {
            by_name
                .entry(CompactString::from(entity.name()))
                .or_default()
                .push(i);
        }
        Self {
            path,
            entities,
            by_name,
            includes,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// All entities in ascending line order.
    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    /// Entities named `name`, in ascending line order.
    pub fn lookup<'a>(&'a self, name: &str) -> impl Iterator<Item = &'a Entity> + 'a {
        self.by_name
            .get(name)
            .into_iter()
            .flat_map(move |indices| indices.iter().map(move |&i| &self.entities[i]))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    /// Directly included files, in the order their directives appear.
    pub fn includes(&self) -> &[PathBuf] {
        &self.includes
    }

    pub fn symbol_count(&self) -> usize {
        self.by_name.len()
    }
}
