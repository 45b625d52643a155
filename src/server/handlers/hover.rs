use crate::server::handlers::util::{document_text, format_hover_markdown, word_at_position};
use crate::server::error::LspError;
use crate::server::state::ServerState;
use std::time::Instant;
use tower_lsp::lsp_types::{Hover, HoverContents, HoverParams, MarkupContent, MarkupKind};

pub async fn handle_hover(params: HoverParams, state: &ServerState) -> Option<Hover> {
    let uri = &params.text_document_position_params.text_document.uri;
    let position = params.text_document_position_params.position;
    tracing::debug!(
        "[HANDLE_HOVER_ENTER] uri={} pos={}:{}",
        uri,
        position.line,
        position.character
    );
    let start = Instant::now();

    if !state.config.features().await.hover {
        LspError::feature_disabled("hover").log_debug();
        tracing::debug!(
            "[HANDLE_HOVER_EXIT] disabled elapsed_ms={}",
            start.elapsed().as_millis()
        );
        return None;
    }

    let content = document_text(state, uri).await?;
    let Some((name, range)) = word_at_position(&content, position) else {
        LspError::invalid_position(uri, position).log_debug();
        tracing::debug!(
            "[HANDLE_HOVER_EXIT] no_word elapsed_ms={}",
            start.elapsed().as_millis()
        );
        return None;
    };

    let value = match state.index.resolve_hover_value(uri, &name, position.line) {
        Ok(Some(value)) => value,
        Ok(None) => {
            tracing::debug!(
                "[HANDLE_HOVER_EXIT] not_found elapsed_ms={}",
                start.elapsed().as_millis()
            );
            return None;
        }
        Err(e) => {
            e.log_debug();
            return None;
        }
    };

    tracing::debug!(
        "[HANDLE_HOVER_EXIT] found elapsed_ms={}",
        start.elapsed().as_millis()
    );
    Some(Hover {
        contents: HoverContents::Markup(MarkupContent {
            kind: MarkupKind::Markdown,
            value: format_hover_markdown(&name, &value),
        }),
        range: Some(range),
    })
}
