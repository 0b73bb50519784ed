pub mod modifier;
pub mod primitives;
pub mod rules;

use chumsky::prelude::*;
use ci_span::SourceId;
use ci_tree::node::Decl;

use crate::{error::SyntaxError, span::Span, token::Token};

pub type Error<'t> = Rich<'t, Token<'t>, Span>;
pub type Extra<'t> = extra::Err<Error<'t>>;

pub struct ParseResult {
    pub decls: Option<Vec<Decl>>,
    pub errors: Vec<SyntaxError>,
}

/// Parses the tokens of one unit, stamping every declaration with `source`.
///
/// `len` is the byte length of the unit's text and positions end-of-input errors.
pub fn parse<'t>(source: SourceId, tokens: &'t [(Token<'t>, Span)], len: usize) -> ParseResult {
    let eoi = Span::from(len..len);
    let input = tokens.map(eoi, |(t, s)| (t, s));

    let (decls, errors) = rules::unit_parser(source)
        .parse(input)
        .into_output_errors();

    ParseResult {
        decls,
        errors: errors.into_iter().map(SyntaxError::from).collect(),
    }
}
