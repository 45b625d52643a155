//! Ordered line classification.
//!
//! A logical line yields at most one primary match (target or variable,
//! tried in that order). Reference, include, `define` and `$(call ...)`
//! patterns are independent passes and are tried on every line, so a single
//! line can produce several matches.

use compact_str::CompactString;
use regex::{Captures, Regex};
use smallvec::SmallVec;
use std::sync::OnceLock;

/// Special built-in target names. They consume the line but never become
/// symbols.
pub const SPECIAL_TARGETS: &[&str] = &[
    ".PHONY",
    ".SUFFIXES",
    ".DEFAULT",
    ".PRECIOUS",
    ".INTERMEDIATE",
    ".NOTINTERMEDIATE",
    ".SECONDARY",
    ".SECONDEXPANSION",
    ".DELETE_ON_ERROR",
    ".IGNORE",
    ".LOW_RESOLUTION_TIME",
    ".SILENT",
    ".EXPORT_ALL_VARIABLES",
    ".NOTPARALLEL",
    ".ONESHELL",
    ".POSIX",
];

/// One structural fact recognised on a line. Columns are character offsets
/// of the captured name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineMatch {
    Target {
        name: CompactString,
        column: u32,
    },
    /// A special target such as `.PHONY`; recognised but not indexed.
    SpecialTarget {
        name: CompactString,
    },
    Variable {
        name: CompactString,
        column: u32,
        value: CompactString,
    },
    Reference {
        name: CompactString,
        column: u32,
    },
    /// Raw, unresolved include paths in source order.
    Include {
        paths: SmallVec<[CompactString; 2]>,
    },
    Function {
        name: CompactString,
        column: u32,
    },
    FunctionCall {
        name: CompactString,
        column: u32,
    },
}

pub type LineMatches = SmallVec<[LineMatch; 2]>;

struct Patterns {
    target: Regex,
    variable: Regex,
    reference: Regex,
    include: Regex,
    function: Regex,
    call: Regex,
}

static PATTERNS: OnceLock<Option<Patterns>> = OnceLock::new();

fn patterns() -> Option<&'static Patterns> {
    PATTERNS
        .get_or_init(|| match compile_patterns() {
            Ok(patterns) => Some(patterns),
            Err(e) => {
                tracing::error!(error = %e, "Failed to compile line patterns, classification disabled");
                None
            }
        })
        .as_ref()
}

fn compile_patterns() -> Result<Patterns, regex::Error> {
    Ok(Patterns {
        target: Regex::new(r"^([^:#=\s]+)\s*:[^=]*$")?,
        variable: Regex::new(r"^([^:#=\s]+?)\s*(:::=|::=|:=|\?=|=)(.*)$")?,
        reference: Regex::new(r"^[^:#=\s]+\s+\$[({]([^:#=\s(){}$]+)[)}]?\s+.*$")?,
        include: Regex::new(r"^(?:-|s)?include\s+([^:#=\s]+(?:\s+[^:#=\s]+)*)\s*$")?,
        function: Regex::new(r"^define\s+([^:#=\s]+)\s*(?:=|:=|::=|:::=|\?=)?\s*$")?,
        call: Regex::new(r"\$\(call\s+([^\s,()$]+)")?,
    })
}

/// Character column of capture `group` within `line`.
fn column_of(line: &str, caps: &Captures<'_>, group: usize) -> u32 {
    let start = caps.get(group).map(|m| m.start()).unwrap_or(0);
    line[..start].chars().count() as u32
}

fn capture(caps: &Captures<'_>, group: usize) -> CompactString {
    caps.get(group)
        .map(|m| CompactString::from(m.as_str()))
        .unwrap_or_default()
}

/// Classifies one logical line. An empty result means the line matched
/// nothing, which is not an error.
pub fn classify(line: &str) -> LineMatches {
    let mut out = LineMatches::new();
    let Some(p) = patterns() else {
        return out;
    };

    if let Some(caps) = p.target.captures(line) {
        let name = capture(&caps, 1);
        if SPECIAL_TARGETS.contains(&name.as_str()) {
            out.push(LineMatch::SpecialTarget { name });
        } else {
            out.push(LineMatch::Target {
                column: column_of(line, &caps, 1),
                name,
            });
        }
    } else if let Some(caps) = p.variable.captures(line) {
        out.push(LineMatch::Variable {
            name: capture(&caps, 1),
            column: column_of(line, &caps, 1),
            value: CompactString::from(caps.get(3).map(|m| m.as_str().trim_start()).unwrap_or("")),
        });
    }

    if let Some(caps) = p.reference.captures(line) {
        out.push(LineMatch::Reference {
            name: capture(&caps, 1),
            column: column_of(line, &caps, 1),
        });
    }

    if let Some(caps) = p.include.captures(line) {
        let paths: SmallVec<[CompactString; 2]> = caps
            .get(1)
            .map(|m| m.as_str().split_whitespace().map(CompactString::from).collect())
            .unwrap_or_default();
        if !paths.is_empty() {
            out.push(LineMatch::Include { paths });
        }
    }

    if let Some(caps) = p.function.captures(line) {
        out.push(LineMatch::Function {
            name: capture(&caps, 1),
            column: column_of(line, &caps, 1),
        });
    }

    for caps in p.call.captures_iter(line) {
        out.push(LineMatch::FunctionCall {
            name: capture(&caps, 1),
            column: column_of(line, &caps, 1),
        });
    }

    out
}
