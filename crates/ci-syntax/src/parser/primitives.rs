use chumsky::{input::ValueInput, prelude::*};
use ci_tree::node::{Init, Literal, Name, TypeExpr};

use super::Extra;
use crate::{
    span::Span,
    token::{Ctrl, Kw, Token},
};

pub fn kw<'t, I>(kw: Kw) -> impl Parser<'t, I, (), Extra<'t>> + Clone
where
    I: ValueInput<'t, Token = Token<'t>, Span = Span>,
{
    just(Token::Kw(kw)).ignored()
}

pub fn ctrl<'t, I>(ctrl: Ctrl) -> impl Parser<'t, I, (), Extra<'t>> + Clone
where
    I: ValueInput<'t, Token = Token<'t>, Span = Span>,
{
    just(Token::Ctrl(ctrl)).ignored()
}

pub fn op<'t, I>(op: &'static str) -> impl Parser<'t, I, (), Extra<'t>> + Clone
where
    I: ValueInput<'t, Token = Token<'t>, Span = Span>,
{
    just(Token::Op(op)).ignored()
}

pub fn name<'t, I>() -> impl Parser<'t, I, Name, Extra<'t>> + Clone
where
    I: ValueInput<'t, Token = Token<'t>, Span = Span>,
{
    select! { Token::Ident(s) => s }
        .map_with(|s, e| {
            let span: Span = e.span();
            Name::new(s, span.into())
        })
        .labelled("identifier")
}

/// `-`? NUMBER, kept as written.
pub fn number<'t, I>() -> impl Parser<'t, I, String, Extra<'t>> + Clone
where
    I: ValueInput<'t, Token = Token<'t>, Span = Span>,
{
    op("-")
        .or_not()
        .then(select! { Token::Num(n) => n })
        .map(|(neg, n)| match neg {
            Some(()) => format!("-{n}"),
            None => n.to_owned(),
        })
        .labelled("number")
}

/// Grammar:
/// ```bnf
/// type ::= IDENT ( '[' ']' )* '?'?
/// ```
pub fn type_expr<'t, I>() -> impl Parser<'t, I, TypeExpr, Extra<'t>> + Clone
where
    I: ValueInput<'t, Token = Token<'t>, Span = Span>,
{
    name()
        .then(
            ctrl(Ctrl::LBracket)
                .then(ctrl(Ctrl::RBracket))
                .repeated()
                .collect::<Vec<_>>()
                .map(|dims| dims.len()),
        )
        .then(ctrl(Ctrl::Question).or_not())
        .map(|((name, rank), nullable)| TypeExpr {
            name,
            rank,
            nullable: nullable.is_some(),
        })
        .labelled("type")
}

/// Grammar:
/// ```bnf
/// init ::= '-'? NUMBER | STRING | CHAR | 'true' | 'false' | 'null'
///        | IDENT ( '.' IDENT )?
/// ```
pub fn init<'t, I>() -> impl Parser<'t, I, Init, Extra<'t>> + Clone
where
    I: ValueInput<'t, Token = Token<'t>, Span = Span>,
{
    let literal = number().map(Literal::Number).or(select! {
        Token::Str(s) => Literal::Str(s.to_owned()),
        Token::Char(c) => Literal::Char(c.to_owned()),
        Token::Kw(Kw::True) => Literal::Bool(true),
        Token::Kw(Kw::False) => Literal::Bool(false),
        Token::Kw(Kw::Null) => Literal::Null,
    });

    let path = name()
        .separated_by(ctrl(Ctrl::Dot))
        .at_least(1)
        .at_most(2)
        .collect::<Vec<_>>();

    literal
        .map(Init::Literal)
        .or(path.map(Init::Ref))
        .labelled("initializer")
}

#[cfg(test)]
mod tests {
    use chumsky::prelude::*;
    use ci_tree::node::{Init, Literal};

    use super::*;
    use crate::lexer::tokenize;

    fn with_tokens<T>(src: &str, f: impl FnOnce(&[(Token<'_>, Span)]) -> T) -> T {
        let tokens = tokenize(src).tokens.unwrap();
        f(&tokens)
    }

    #[test]
    fn array_and_nullable_types() {
        let ty = with_tokens("string[][]?", |tokens| {
            let input = tokens.map(Span::from(11..11), |(t, s)| (t, s));
            type_expr().parse(input).into_result().unwrap()
        });

        assert_eq!(ty.name.as_str(), "string");
        assert_eq!(ty.rank, 2);
        assert!(ty.nullable);
        assert_eq!(ty.to_string(), "string[][]?");
    }

    #[test]
    fn negative_number_initializer() {
        let init = with_tokens("-12", |tokens| {
            let input = tokens.map(Span::from(3..3), |(t, s)| (t, s));
            init().parse(input).into_result().unwrap()
        });

        assert_eq!(init, Init::Literal(Literal::Number("-12".into())));
    }

    #[test]
    fn qualified_reference() {
        let init = with_tokens("Color.Red", |tokens| {
            let input = tokens.map(Span::from(9..9), |(t, s)| (t, s));
            init().parse(input).into_result().unwrap()
        });

        assert_eq!(init.to_string(), "Color.Red");
        assert_eq!(init.span().map(|s| s.start..s.end), Some(0..9));
    }
}
