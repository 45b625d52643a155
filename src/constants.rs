//! Constants used throughout the codebase.

/// Default ceiling on nested `$(...)` substitution depth during hover expansion.
pub const DEFAULT_MAX_EXPANSION_DEPTH: usize = 64;

/// Resolutions slower than this are logged as warnings (milliseconds).
pub const SLOW_RESOLUTION_MS: u128 = 100;

/// Per-workspace configuration file name.
pub const CONFIG_FILE_NAME: &str = "makefile-lsp.toml";

/// Language id editors use for build files.
pub const MAKEFILE_LANGUAGE_ID: &str = "makefile";

/// File names treated as build files when no configuration overrides them.
pub const DEFAULT_FILE_PATTERNS: &[&str] = &["Makefile", "makefile", "GNUmakefile", "*.mk", "*.make"];
