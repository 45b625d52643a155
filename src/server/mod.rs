pub mod config;
pub mod error;
pub mod handlers;
pub mod services;
pub mod state;

pub use error::LspError;

use crate::analysis::MakefileIndex;
use crate::constants::CONFIG_FILE_NAME;
use crate::server::config::ConfigManager;
use crate::server::services::index_service::is_reportable;
use crate::server::state::ServerState;
use std::path::PathBuf;
use std::sync::Arc;
use tower_lsp::jsonrpc::Result;
use tower_lsp::lsp_types::*;
use tower_lsp::{Client, LanguageServer};
use tracing::info;

pub struct LspServer {
    pub client: Client,
    pub state: ServerState,
}

impl LspServer {
    pub fn new_with_config(client: Client, config: Arc<ConfigManager>) -> Self {
        let index = Arc::new(MakefileIndex::new());
        let state = ServerState::new(index, config);
        Self { client, state }
    }

    pub async fn register_watched_files(&self) {
        let watchers = vec![FileSystemWatcher {
            glob_pattern: GlobPattern::String(format!("**/{}", CONFIG_FILE_NAME)),
            kind: None,
        }];

        let register_options =
            match serde_json::to_value(DidChangeWatchedFilesRegistrationOptions { watchers }) {
                Ok(value) => value,
                Err(e) => {
                    LspError::Internal(e.to_string()).log_warn();
                    return;
                }
            };
        let registration = Registration {
            id: "makefile-lsp-config-watcher".to_string(),
            method: "workspace/didChangeWatchedFiles".to_string(),
            register_options: Some(register_options),
        };
        if let Err(e) = self.client.register_capability(vec![registration]).await {
            self.client
                .log_message(
                    MessageType::ERROR,
                    format!("Failed to register watcher: {}", e),
                )
                .await;
        }
    }

    /// Loads the workspace config and applies its index settings.
    async fn reload_config(&self) {
        let Some(root) = self.state.workspace_root().await else {
            return;
        };
        match self.state.config.load_from_workspace(&root).await {
            Ok(config) => {
                self.state
                    .index
                    .set_max_expansion_depth(config.index.max_expansion_depth);
                self.client
                    .log_message(
                        MessageType::INFO,
                        format!("Loaded configuration from {}", root.display()),
                    )
                    .await;
            }
            Err(e) => {
                LspError::Config(e.clone()).log_warn();
                self.client
                    .show_message(MessageType::WARNING, format!("makefile-lsp: {}", e))
                    .await;
            }
        }
    }

    async fn is_build_document(&self, uri: &Url, language_id: Option<&str>) -> bool {
        let Ok(path) = uri.to_file_path() else {
            return false;
        };
        let config = self.state.config.get_config();
        let config = config.read().await;
        config.is_build_file(&path, language_id)
    }

    /// Index faults that are not routine are shown to the user; none of them
    /// interrupt the request.
    async fn report(&self, result: std::result::Result<(), LspError>) {
        let Err(e) = result else {
            return;
        };
        if is_reportable(&e) {
            e.log_warn();
            self.client
                .show_message(MessageType::WARNING, e.to_string())
                .await;
        } else {
            e.log_debug();
        }
    }
}

fn workspace_root_from(params: &InitializeParams) -> Option<PathBuf> {
    if let Some(folder) = params.workspace_folders.as_ref().and_then(|f| f.first()) {
        if let Ok(path) = folder.uri.to_file_path() {
            return Some(path);
        }
    }
    #[allow(deprecated)]
    let root_uri = params.root_uri.as_ref();
    root_uri.and_then(|uri| uri.to_file_path().ok())
}

#[tower_lsp::async_trait]
impl LanguageServer for LspServer {
    async fn initialize(&self, params: InitializeParams) -> Result<InitializeResult> {
        let root = workspace_root_from(&params)
            .or_else(|| std::env::current_dir().ok())
            .unwrap_or_else(|| PathBuf::from("."));
        self.state.set_workspace_root(root).await;
        self.state
            .config
            .set_init_settings(params.initialization_options.clone())
            .await;

        Ok(InitializeResult {
            capabilities: ServerCapabilities {
                text_document_sync: Some(TextDocumentSyncCapability::Options(
                    TextDocumentSyncOptions {
                        open_close: Some(true),
                        change: Some(TextDocumentSyncKind::FULL),
                        save: Some(TextDocumentSyncSaveOptions::SaveOptions(SaveOptions {
                            include_text: Some(false),
                        })),
                        ..Default::default()
                    },
                )),
                document_symbol_provider: Some(OneOf::Left(true)),
                definition_provider: Some(OneOf::Left(true)),
                hover_provider: Some(HoverProviderCapability::Simple(true)),
                ..Default::default()
            },
            server_info: Some(ServerInfo {
                name: env!("CARGO_PKG_NAME").to_string(),
                version: Some(env!("CARGO_PKG_VERSION").to_string()),
            }),
        })
    }

    async fn initialized(&self, _params: InitializedParams) {
        self.client
            .log_message(MessageType::INFO, "makefile-lsp initialized!")
            .await;
        self.reload_config().await;
        self.register_watched_files().await;
        info!("Server initialized");
    }

    async fn shutdown(&self) -> Result<()> {
        Ok(())
    }

    async fn did_open(&self, params: DidOpenTextDocumentParams) {
        let doc = params.text_document;
        let is_build = self
            .is_build_document(&doc.uri, Some(doc.language_id.as_str()))
            .await;

        self.state
            .documents
            .open(doc.uri.clone(), doc.language_id, doc.text.clone(), doc.version);

        if is_build {
            let result = self.state.index.ensure_indexed(&doc.uri, Some(doc.text.as_str()));
            self.report(result).await;
        }
    }

    async fn did_change(&self, params: DidChangeTextDocumentParams) {
        let uri = params.text_document.uri;
        let Some(content) =
            self.state
                .documents
                .update(&uri, params.content_changes, params.text_document.version)
        else {
            return;
        };

        let language_id = self.state.documents.get(&uri).map(|d| d.language_id);
        if !self
            .is_build_document(&uri, language_id.as_deref())
            .await
        {
            return;
        }

        let reindex = {
            let config = self.state.config.get_config();
            let config = config.read().await;
            config.index.reindex_on_change
        };
        let result = if reindex {
            self.state.index.reindex_content(&uri, &content)
        } else {
            self.state.index.ensure_indexed(&uri, Some(content.as_str()))
        };
        self.report(result).await;
    }

    async fn did_save(&self, params: DidSaveTextDocumentParams) {
        let uri = params.text_document.uri;
        let language_id = self.state.documents.get(&uri).map(|d| d.language_id);
        if !self
            .is_build_document(&uri, language_id.as_deref())
            .await
        {
            return;
        }
        let result = self.state.index.invalidate_and_reindex(&uri);
        self.report(result).await;
    }

    async fn did_close(&self, params: DidCloseTextDocumentParams) {
        self.state.documents.close(&params.text_document.uri);
    }

    async fn did_change_watched_files(&self, params: DidChangeWatchedFilesParams) {
        let config_changed = params.changes.iter().any(|change| {
            change
                .uri
                .to_file_path()
                .map(|p| p.ends_with(CONFIG_FILE_NAME))
                .unwrap_or(false)
        });
        if config_changed {
            self.client
                .log_message(MessageType::INFO, "Reloading configuration...")
                .await;
            self.reload_config().await;
        }
    }

    async fn document_symbol(
        &self,
        params: DocumentSymbolParams,
    ) -> Result<Option<DocumentSymbolResponse>> {
        Ok(handlers::handle_document_symbol(params, &self.state).await)
    }

    async fn goto_definition(
        &self,
        params: GotoDefinitionParams,
    ) -> Result<Option<GotoDefinitionResponse>> {
        Ok(handlers::handle_definition(params, &self.state).await)
    }

    async fn hover(&self, params: HoverParams) -> Result<Option<Hover>> {
        Ok(handlers::handle_hover(params, &self.state).await)
    }
}
