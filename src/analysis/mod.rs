pub mod cache;
pub mod classifier;
pub mod engine;
pub mod error;
pub mod expander;
pub mod file_index;
pub mod indexer;
pub mod preprocess;

pub use cache::IndexCache;
pub use classifier::{classify, LineMatch};
pub use engine::MakefileIndex;
pub use error::IndexError;
pub use expander::ValueExpander;
pub use file_index::{scan, FileIndex, FileScan};
pub use indexer::Indexer;
