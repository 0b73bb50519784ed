//! Lexer and declaration parser for `.ci` source units.
//!
//! Both stages are written with chumsky. The lexer works on the decoded text
//! and yields [`Token`]s with byte spans; the parser turns the token slice into
//! the declaration nodes of `ci-tree`, stamped with the unit's `SourceId`.

pub mod error;
pub mod lexer;
pub mod parser;
pub mod span;
pub mod token;

use ci_span::SourceId;
use ci_tree::node::Decl;
use log::debug;

pub use error::SyntaxError;
pub use lexer::tokenize;
pub use parser::parse;

pub mod prelude {
    pub use crate::error::SyntaxError;
    pub use crate::lexer::{TokenizeResult, tokenize};
    pub use crate::parser::{ParseResult, parse};
    pub use crate::parse_unit;
    pub use crate::token::{Ctrl, Kw, Token, Tokens};
}

/// Lexes and parses one source unit.
///
/// Errors are returned in source order; lexical errors stop the unit before
/// parsing starts.
pub fn parse_unit(source: SourceId, text: &str) -> Result<Vec<Decl>, Vec<SyntaxError>> {
    let lexer::TokenizeResult { tokens, errors } = lexer::tokenize(text);

    let tokens = match tokens {
        Some(tokens) if errors.is_empty() => tokens,
        _ => return Err(errors),
    };

    debug!("{source}: {} tokens", tokens.len());

    let parser::ParseResult { decls, errors } = parser::parse(source, &tokens, text.len());

    match decls {
        Some(decls) if errors.is_empty() => Ok(decls),
        _ => Err(errors),
    }
}
