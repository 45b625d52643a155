use crate::server::handlers::util::{document_text, to_lsp_location, word_at_position};
use crate::server::error::LspError;
use crate::server::state::ServerState;
use std::time::Instant;
use tower_lsp::lsp_types::{GotoDefinitionParams, GotoDefinitionResponse, Location};

pub async fn handle_definition(
    params: GotoDefinitionParams,
    state: &ServerState,
) -> Option<GotoDefinitionResponse> {
    let uri = &params.text_document_position_params.text_document.uri;
    let position = params.text_document_position_params.position;
    tracing::debug!(
        "[HANDLE_DEFINITION_ENTER] uri={} pos={}:{}",
        uri,
        position.line,
        position.character
    );
    let start = Instant::now();

    if !state.config.features().await.definition {
        LspError::feature_disabled("definition").log_debug();
        tracing::debug!(
            "[HANDLE_DEFINITION_EXIT] disabled elapsed_ms={}",
            start.elapsed().as_millis()
        );
        return None;
    }

    let content = document_text(state, uri).await?;
    let Some((name, _)) = word_at_position(&content, position) else {
        tracing::debug!(
            "[HANDLE_DEFINITION_EXIT] no_word elapsed_ms={}",
            start.elapsed().as_millis()
        );
        return None;
    };

    let locations: Vec<Location> = match state.index.resolve_definition(uri, &name) {
        Ok(found) => found.iter().filter_map(to_lsp_location).collect(),
        Err(e) => {
            e.log_debug();
            Vec::new()
        }
    };

    if locations.is_empty() {
        tracing::debug!(
            "[HANDLE_DEFINITION_EXIT] not_found elapsed_ms={}",
            start.elapsed().as_millis()
        );
        return None;
    }

    tracing::debug!(
        "[HANDLE_DEFINITION_EXIT] count={} elapsed_ms={}",
        locations.len(),
        start.elapsed().as_millis()
    );
    Some(GotoDefinitionResponse::Array(locations))
}
