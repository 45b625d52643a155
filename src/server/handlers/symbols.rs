use crate::server::handlers::util::document_text;
use crate::server::error::LspError;
use crate::server::state::ServerState;
use crate::types::EntityKind;
use std::time::Instant;
use tower_lsp::lsp_types::{
    DocumentSymbolParams, DocumentSymbolResponse, Location, Position, Range, SymbolInformation,
    SymbolKind,
};

fn symbol_kind(kind: EntityKind) -> Option<SymbolKind> {
    match kind {
        EntityKind::Target => Some(SymbolKind::FIELD),
        EntityKind::Variable => Some(SymbolKind::VARIABLE),
        EntityKind::Function => Some(SymbolKind::FUNCTION),
        EntityKind::Reference | EntityKind::FunctionCall => None,
    }
}

#[allow(deprecated)]
pub async fn handle_document_symbol(
    params: DocumentSymbolParams,
    state: &ServerState,
) -> Option<DocumentSymbolResponse> {
    let uri = &params.text_document.uri;
    tracing::debug!("[HANDLE_DOCUMENT_SYMBOL_ENTER] uri={}", uri);
    let start = Instant::now();

    if !state.config.features().await.document_symbols {
        LspError::feature_disabled("document_symbols").log_debug();
        tracing::debug!(
            "[HANDLE_DOCUMENT_SYMBOL_EXIT] disabled elapsed_ms={}",
            start.elapsed().as_millis()
        );
        return None;
    }

    let content = document_text(state, uri).await?;
    let entities = match state.index.build_symbol_index(uri, &content) {
        Ok(entities) => entities,
        Err(e) => {
            e.log_debug();
            return None;
        }
    };

    let symbols: Vec<SymbolInformation> = entities
        .iter()
        .filter_map(|entity| {
            let kind = symbol_kind(entity.kind())?;
            let loc = entity.location();
            Some(SymbolInformation {
                name: entity.name().to_string(),
                kind,
                tags: None,
                deprecated: None,
                location: Location {
                    uri: uri.clone(),
                    range: Range::new(
                        Position::new(loc.start_line, loc.start_column),
                        Position::new(loc.end_line, loc.end_column),
                    ),
                },
                container_name: None,
            })
        })
        .collect();

    tracing::debug!(
        "[HANDLE_DOCUMENT_SYMBOL_EXIT] count={} elapsed_ms={}",
        symbols.len(),
        start.elapsed().as_millis()
    );
    Some(DocumentSymbolResponse::Flat(symbols))
}
