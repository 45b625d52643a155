//! Service layer for the LSP server.
//!
//! One service per concern: open buffers and the symbol index.

pub mod document_service;
pub mod index_service;

pub use document_service::{DocumentService, DocumentState};
pub use index_service::IndexService;
