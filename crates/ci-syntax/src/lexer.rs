use chumsky::prelude::*;

use crate::{
    error::SyntaxError,
    span::{Span, Spanned},
    token::{Ctrl, Kw, Token, Tokens},
};

pub struct TokenizeResult<'a> {
    pub tokens: Option<Tokens<'a>>,
    pub errors: Vec<SyntaxError>,
}

pub fn tokenize(input: &str) -> TokenizeResult<'_> {
    let (tokens, errors) = lexer().parse(input).into_output_errors();

    let errors = errors.into_iter().map(SyntaxError::from).collect();
    TokenizeResult { tokens, errors }
}

pub type Extra<'src> = extra::Err<Rich<'src, char, Span>>;

pub fn lexer<'src>() -> impl Parser<'src, &'src str, Vec<Spanned<Token<'src>>>, Extra<'src>> {
    let num = text::int(10)
        .then(just('.').then(text::digits(10)).or_not())
        .to_slice()
        .map(Token::Num);

    // Escapes are kept verbatim, only their extent matters here
    let escape = just('\\').then(any()).ignored();

    let character = just('\'')
        .ignore_then(
            none_of("\\'\n")
                .ignored()
                .or(escape.clone())
                .repeated()
                .to_slice(),
        )
        .then(just('\'').or_not())
        .validate(|(c, close), e, emitter| {
            if close.is_none() {
                emitter.emit(Rich::custom(e.span(), "unterminated character literal"));
            }
            Token::Char(c)
        });

    let string = just('"')
        .ignore_then(
            none_of("\\\"\n")
                .ignored()
                .or(escape)
                .repeated()
                .to_slice(),
        )
        .then(just('"').or_not())
        .validate(|(s, close), e, emitter| {
            if close.is_none() {
                emitter.emit(Rich::custom(e.span(), "unterminated string literal"));
            }
            Token::Str(s)
        });

    // Longer tokens must come before their prefixes

    let multi_op = choice((
        just("=="),
        just("!="),
        just("<="),
        just(">="),
        just("&&"),
        just("||"),
        just("++"),
        just("--"),
        just("+="),
        just("-="),
        just("*="),
        just("/="),
        just("<<"),
        just(">>"),
    ))
    .to_slice()
    .map(Token::Op);

    let ctrl = choice((
        just("=>").to(Ctrl::FatArrow),
        just('{').to(Ctrl::LBrace),
        just('}').to(Ctrl::RBrace),
        just('(').to(Ctrl::LParen),
        just(')').to(Ctrl::RParen),
        just('[').to(Ctrl::LBracket),
        just(']').to(Ctrl::RBracket),
        just(';').to(Ctrl::Semi),
        just(':').to(Ctrl::Colon),
        just(',').to(Ctrl::Comma),
        just('.').to(Ctrl::Dot),
        just('=').to(Ctrl::Assign),
        just('?').to(Ctrl::Question),
    ))
    .map(Token::Ctrl);

    let single_op = one_of("+-*/%<>!&|^~").to_slice().map(Token::Op);

    let word = text::ident().map(|ident: &'src str| match Kw::from_word(ident) {
        Some(kw) => Token::Kw(kw),
        None => Token::Ident(ident),
    });

    let token = choice((num, character, string, multi_op, ctrl, single_op, word));

    let line_comment = just("//")
        .then(any().and_is(just('\n').not()).repeated())
        .ignored();

    let block_comment = just("/*")
        .ignore_then(any().and_is(just("*/").not()).repeated())
        .ignore_then(just("*/").or_not())
        .validate(|close, e, emitter| {
            if close.is_none() {
                emitter.emit(Rich::custom(e.span(), "unterminated block comment"));
            }
        });

    let comment = line_comment.or(block_comment);

    // whitespace (comment whitespace)*
    let trivia = text::whitespace()
        .then(comment.then(text::whitespace()).repeated())
        .ignored()
        .boxed();

    just('\u{feff}')
        .or_not()
        .ignore_then(trivia.clone())
        .ignore_then(
            token
                .map_with(|t, e| (t, e.span()))
                .then_ignore(trivia)
                // On error skip a character and retry, so later errors are reported too
                .recover_with(skip_then_retry_until(any().ignored(), end()))
                .repeated()
                .collect(),
        )
}
