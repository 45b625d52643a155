use crate::server::error::LspError;
use crate::server::state::ServerState;
use crate::types::SymbolLocation;
use compact_str::CompactString;
use ropey::Rope;
use std::sync::Arc;
use tower_lsp::lsp_types::{Location, Position, Range, Url};

/// Characters that end a symbol name under the cursor.
fn is_word_char(ch: char) -> bool {
    !ch.is_whitespace() && !matches!(ch, ':' | '#' | '=' | '$' | '(' | ')' | '{' | '}' | ',')
}

/// The symbol name touching `position`, with its range. A cursor right
/// after the last character still counts as on the word.
pub(crate) fn word_at_position(content: &str, position: Position) -> Option<(CompactString, Range)> {
    let rope = Rope::from_str(content);
    let line = rope.get_line(position.line as usize)?;
    let chars: Vec<char> = line.chars().collect();
    let cursor = (position.character as usize).min(chars.len());

    let anchor = if cursor < chars.len() && is_word_char(chars[cursor]) {
        cursor
    } else if cursor > 0 && is_word_char(chars[cursor - 1]) {
        cursor - 1
    } else {
        return None;
    };

    let mut start = anchor;
    while start > 0 && is_word_char(chars[start - 1]) {
        start -= 1;
    }
    let mut end = anchor + 1;
    while end < chars.len() && is_word_char(chars[end]) {
        end += 1;
    }

    let word: CompactString = chars[start..end].iter().collect();
    let range = Range::new(
        Position::new(position.line, start as u32),
        Position::new(position.line, end as u32),
    );
    Some((word, range))
}

/// Text of `uri`: the open buffer if there is one, else the file on disk.
pub(crate) async fn document_text(state: &ServerState, uri: &Url) -> Option<Arc<String>> {
    if let Some(content) = state.documents.content(uri) {
        return Some(content);
    }
    let Ok(path) = uri.to_file_path() else {
        LspError::not_a_file(uri).log_debug();
        return None;
    };
    match tokio::fs::read(&path).await {
        Ok(bytes) => Some(Arc::new(String::from_utf8_lossy(&bytes).into_owned())),
        Err(e) => {
            tracing::debug!("No text for {}: {}", uri, e);
            LspError::document_not_found(uri).log_debug();
            None
        }
    }
}

pub(crate) fn to_lsp_location(location: &SymbolLocation) -> Option<Location> {
    let uri = Url::from_file_path(&location.file).ok()?;
    Some(Location {
        uri,
        range: Range::new(
            Position::new(location.start_line, location.start_column),
            Position::new(location.end_line, location.end_column),
        ),
    })
}

pub(crate) fn format_hover_markdown(name: &str, value: &str) -> String {
    format!(
        "```makefile\n{}\n```\nexpands to:\n```makefile\n{}\n```",
        name, value
    )
}
