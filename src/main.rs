use anyhow::Context;
use makefile_lsp::error_ext::ResultExt;
use makefile_lsp::server::config::ConfigManager;
use makefile_lsp::server::LspServer;
use std::sync::Arc;
use tower_lsp::{LspService, Server};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // stdout carries the protocol stream
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    let root = std::env::current_dir().context("Failed to determine working directory")?;

    // a broken config file falls back to defaults; initialized reports it
    let config_manager = ConfigManager::new();
    let _ = config_manager
        .load_from_workspace(&root)
        .await
        .ok_warn("load configuration");
    let config_arc = Arc::new(config_manager);

    let stdin = tokio::io::stdin();
    let stdout = tokio::io::stdout();

    let (service, socket) = LspService::new(|client| LspServer::new_with_config(client, config_arc));
    Server::new(stdin, stdout, socket).serve(service).await;

    Ok(())
}
