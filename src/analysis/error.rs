use std::path::PathBuf;
use thiserror::Error;

/// Failures the index reports to its caller.
///
/// A missing file is not one of them: absent build files and includes are
/// routine in partially edited trees and simply produce no entries.
#[derive(Debug, Error)]
pub enum IndexError {
    #[error("Failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
