pub mod analysis;
pub mod constants;
pub mod error_ext;
pub mod server;
pub mod types;

pub use analysis::MakefileIndex;
pub use server::config::{FeatureConfig, IndexConfig, MakefileLspConfig};
pub use server::LspServer;
pub use types::{Entity, EntityKind, SymbolLocation};
