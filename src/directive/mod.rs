//! Action directives embedded in generated chat text.

pub mod parser;
pub mod types;

pub use parser::{parse_directives, ParsedReply};
pub use types::{Directive, DirectiveKind};
