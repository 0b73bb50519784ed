use chumsky::{input::ValueInput, prelude::*};
use ci_tree::node::Visibility;
use derive_more::Display;

use super::{Error, Extra};
use crate::{
    span::{Span, Spanned},
    token::{Kw, Token},
};

#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Modifier {
    #[display("public")]
    Public,
    #[display("internal")]
    Internal,
    #[display("protected")]
    Protected,
    #[display("private")]
    Private,
    #[display("abstract")]
    Abstract,
    #[display("sealed")]
    Sealed,
    #[display("static")]
    Static,
    #[display("virtual")]
    Virtual,
    #[display("override")]
    Override,
}

impl Modifier {
    pub fn visibility(self) -> Option<Visibility> {
        match self {
            Self::Public => Some(Visibility::Public),
            Self::Internal => Some(Visibility::Internal),
            Self::Protected => Some(Visibility::Protected),
            Self::Private => Some(Visibility::Private),
            _ => None,
        }
    }
}

pub fn modifier<'t, I>() -> impl Parser<'t, I, Modifier, Extra<'t>> + Clone
where
    I: ValueInput<'t, Token = Token<'t>, Span = Span>,
{
    select! {
        Token::Kw(Kw::Public) => Modifier::Public,
        Token::Kw(Kw::Internal) => Modifier::Internal,
        Token::Kw(Kw::Protected) => Modifier::Protected,
        Token::Kw(Kw::Private) => Modifier::Private,
        Token::Kw(Kw::Abstract) => Modifier::Abstract,
        Token::Kw(Kw::Sealed) => Modifier::Sealed,
        Token::Kw(Kw::Static) => Modifier::Static,
        Token::Kw(Kw::Virtual) => Modifier::Virtual,
        Token::Kw(Kw::Override) => Modifier::Override,
    }
}

/// Zero or more modifiers, rejecting repeats and a second visibility.
pub fn modifiers<'t, I>() -> impl Parser<'t, I, Modifiers, Extra<'t>> + Clone
where
    I: ValueInput<'t, Token = Token<'t>, Span = Span>,
{
    modifier()
        .map_with(|m, e| (m, e.span()))
        .repeated()
        .collect::<Vec<_>>()
        .validate(|list, _, emitter| {
            Modifiers::new(list).unwrap_or_else(|err| {
                emitter.emit(err);
                Modifiers::default()
            })
        })
}

/// The modifiers written in front of a declaration or member.
#[derive(Debug, Clone, Default)]
pub struct Modifiers {
    visibility: Option<Spanned<Visibility>>,
    others: Vec<Spanned<Modifier>>,
}

impl Modifiers {
    pub fn new<'t>(list: Vec<Spanned<Modifier>>) -> Result<Self, Error<'t>> {
        let mut this = Self::default();

        for (i, &(modifier, span)) in list.iter().enumerate() {
            if list[..i].iter().any(|&(seen, _)| seen == modifier) {
                return Err(Rich::custom(span, format!("repeated modifier `{modifier}`")));
            }

            match modifier.visibility() {
                Some(visibility) => {
                    if let Some((first, _)) = this.visibility {
                        return Err(Rich::custom(
                            span,
                            format!("conflicting visibility `{visibility}`, already `{first}`"),
                        ));
                    }
                    this.visibility = Some((visibility, span));
                }
                None => this.others.push((modifier, span)),
            }
        }

        Ok(this)
    }

    /// The written visibility if it is one of `allowed`, otherwise `default`.
    pub fn visibility<'t>(
        &self,
        allowed: &[Visibility],
        default: Visibility,
        what: &str,
    ) -> Result<Visibility, Error<'t>> {
        match self.visibility {
            Some((visibility, span)) if !allowed.contains(&visibility) => Err(Rich::custom(
                span,
                format!("visibility `{visibility}` is not allowed on {what}"),
            )),
            Some((visibility, _)) => Ok(visibility),
            None => Ok(default),
        }
    }

    /// At most one non-visibility modifier, taken from `allowed`.
    pub fn pick<'t>(&self, allowed: &[Modifier], what: &str) -> Result<Option<Modifier>, Error<'t>> {
        if let Some(&(modifier, span)) = self.others.iter().find(|(m, _)| !allowed.contains(m)) {
            return Err(Rich::custom(
                span,
                format!("modifier `{modifier}` is not allowed on {what}"),
            ));
        }

        match self.others.as_slice() {
            [] => Ok(None),
            [(modifier, _)] => Ok(Some(*modifier)),
            [(first, _), (second, span), ..] => Err(Rich::custom(
                *span,
                format!("conflicting modifiers `{first}` and `{second}`"),
            )),
        }
    }

    /// Span of the given modifier, if it was written.
    pub fn span_of(&self, modifier: Modifier) -> Option<Span> {
        self.others
            .iter()
            .find(|(m, _)| *m == modifier)
            .map(|&(_, span)| span)
    }
}
