#![allow(dead_code)]

use makefile_lsp::server::config::ConfigManager;
use makefile_lsp::server::state::ServerState;
use makefile_lsp::MakefileIndex;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;
use tower_lsp::lsp_types::Url;

pub struct TestFixture {
    pub temp_dir: TempDir,
    pub index: Arc<MakefileIndex>,
    pub state: ServerState,
}

impl TestFixture {
    pub fn new() -> Self {
        let temp_dir = tempfile::tempdir().unwrap();
        let index = Arc::new(MakefileIndex::new());
        let config = Arc::new(ConfigManager::new());
        let state = ServerState::new(index.clone(), config);
        Self {
            temp_dir,
            index,
            state,
        }
    }

    pub fn root(&self) -> &Path {
        self.temp_dir.path()
    }

    pub fn path(&self, name: &str) -> PathBuf {
        self.temp_dir.path().join(name)
    }

    pub fn uri(&self, name: &str) -> Url {
        Url::from_file_path(self.path(name)).unwrap()
    }

    pub fn create_file(&self, name: &str, content: &str) -> PathBuf {
        let path = self.path(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).ok();
        }
        fs::write(&path, content).unwrap();
        path
    }

    /// Writes the file and opens it as an editor buffer, the way `didOpen`
    /// does.
    pub fn open_document(&self, name: &str, content: &str) -> Url {
        self.create_file(name, content);
        let uri = self.uri(name);
        self.state
            .documents
            .open(uri.clone(), "makefile".to_string(), content.to_string(), 1);
        self.state
            .index
            .ensure_indexed(&uri, Some(content))
            .unwrap();
        uri
    }
}
