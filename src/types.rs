use compact_str::CompactString;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// What kind of symbol occurrence an [`Entity`] records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    /// `name: prerequisites`
    Target,
    /// `NAME = value` and the other assignment operators
    Variable,
    /// `$(NAME)` used after a leading token
    Reference,
    /// `define NAME`
    Function,
    /// `$(call NAME, ...)`
    FunctionCall,
}

impl EntityKind {
    /// Whether this occurrence introduces the name rather than using it.
    pub fn is_definition(self) -> bool {
        matches!(self, Self::Target | Self::Variable | Self::Function)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Target => "target",
            Self::Variable => "variable",
            Self::Reference => "reference",
            Self::Function => "function",
            Self::FunctionCall => "call",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One named symbol occurrence found while scanning a build file.
///
/// Fields are private so an entity cannot change after the scan that
/// produced it; `file`, `line` and `column` together with `name` give a
/// stable navigation target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entity {
    name: CompactString,
    kind: EntityKind,
    value: CompactString,
    file: Arc<Path>,
    line: u32,
    column: u32,
}

impl Entity {
    /// Builds an entity. `value` has its leading whitespace trimmed and is
    /// only kept for variables.
    pub fn new(
        name: impl Into<CompactString>,
        kind: EntityKind,
        value: &str,
        file: Arc<Path>,
        line: u32,
        column: u32,
    ) -> Self {
        let value = match kind {
            EntityKind::Variable => CompactString::from(value.trim_start()),
            _ => CompactString::default(),
        };
        Self {
            name: name.into(),
            kind,
            value,
            file,
            line,
            column,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> EntityKind {
        self.kind
    }

    /// Raw right-hand side text; empty for everything but variables.
    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn file(&self) -> &Path {
        &self.file
    }

    /// Zero-based logical line.
    pub fn line(&self) -> u32 {
        self.line
    }

    /// Zero-based character offset of the name on its line.
    pub fn column(&self) -> u32 {
        self.column
    }

    pub fn location(&self) -> SymbolLocation {
        let width = self.name.chars().count() as u32;
        SymbolLocation {
            file: self.file.to_path_buf(),
            start_line: self.line,
            start_column: self.column,
            end_line: self.line,
            end_column: self.column + width,
        }
    }
}

/// Editor-neutral source range of a symbol name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SymbolLocation {
    pub file: PathBuf,
    pub start_line: u32,
    pub start_column: u32,
    pub end_line: u32,
    pub end_column: u32,
}
