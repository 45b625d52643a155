//! Error handling extensions for more ergonomic error management.
//!
//! Build trees are routinely half-edited, so many failures are expected and
//! absorbed. These helpers make sure absorbed failures still leave a trace.

use tracing::{error, warn};

/// Extension trait for Result types that provides logging variants of `.ok()`.
pub trait ResultExt<T, E: std::fmt::Display> {
    /// Convert to Option, logging the error at error level if Err.
    fn ok_logged(self, context: &str) -> Option<T>;

    /// Convert to Option, logging the error at warn level if Err.
    ///
    /// Use this when the error is expected in some circumstances
    /// but should still be tracked.
    fn ok_warn(self, context: &str) -> Option<T>;
}

impl<T, E: std::fmt::Display> ResultExt<T, E> for Result<T, E> {
    fn ok_logged(self, context: &str) -> Option<T> {
        match self {
            Ok(v) => Some(v),
            Err(e) => {
                error!(context = %context, error = %e, "Operation failed");
                None
            }
        }
    }

    fn ok_warn(self, context: &str) -> Option<T> {
        match self {
            Ok(v) => Some(v),
            Err(e) => {
                warn!(context = %context, error = %e, "Operation failed (expected in some cases)");
                None
            }
        }
    }
}
