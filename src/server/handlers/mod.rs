mod definition;
mod hover;
mod symbols;
pub(crate) mod util;

pub use definition::handle_definition;
pub use hover::handle_hover;
pub use symbols::handle_document_symbol;
