//! Server state management.
//!
//! `ServerState` is a thin coordinator over the services; handlers receive
//! it by reference and never own any of its parts.

use crate::analysis::MakefileIndex;
use crate::server::config::ConfigManager;
use crate::server::services::{DocumentService, IndexService};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Clone)]
pub struct ServerState {
    /// Open editor buffers.
    pub documents: DocumentService,
    /// Symbol index shared by every request.
    pub index: IndexService,
    /// Configuration manager.
    pub config: Arc<ConfigManager>,
    /// Workspace root, known after `initialize`.
    pub root: Arc<RwLock<Option<PathBuf>>>,
}

impl ServerState {
    pub fn new(index: Arc<MakefileIndex>, config: Arc<ConfigManager>) -> Self {
        Self {
            documents: DocumentService::new(),
            index: IndexService::new(index),
            config,
            root: Arc::new(RwLock::new(None)),
        }
    }

    pub async fn workspace_root(&self) -> Option<PathBuf> {
        self.root.read().await.clone()
    }

    pub async fn set_workspace_root(&self, root: PathBuf) {
        *self.root.write().await = Some(root);
    }
}
