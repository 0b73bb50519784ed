use std::fmt;

use chumsky::error::{Rich, RichPattern, RichReason};
use ci_span::Span;

/// A lexical or syntactic error, detached from the token lifetime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxError {
    pub message: String,
    pub span: Span,
}

impl SyntaxError {
    pub fn new(message: impl Into<String>, span: Span) -> Self {
        Self {
            message: message.into(),
            span,
        }
    }
}

impl fmt::Display for SyntaxError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for SyntaxError {}

impl<'src, T> From<Rich<'src, T>> for SyntaxError
where
    T: fmt::Display,
{
    fn from(e: Rich<'src, T>) -> Self {
        let span = Span::from(*e.span());

        let message = match e.reason() {
            RichReason::Custom(message) => message.clone(),
            _ => {
                let found = e
                    .found()
                    .map_or_else(|| "end of input".to_owned(), |t| format!("`{t}`"));

                let mut expected = e.expected().map(describe).collect::<Vec<_>>();
                expected.sort();
                expected.dedup();

                if expected.is_empty() {
                    format!("unexpected {found}")
                } else {
                    format!("found {found}, expected {}", expected.join(", "))
                }
            }
        };

        Self { message, span }
    }
}

fn describe<T: fmt::Display>(pattern: &RichPattern<'_, T>) -> String {
    match pattern {
        RichPattern::Token(t) => format!("`{}`", &**t),
        RichPattern::Label(label) => label.to_string(),
        RichPattern::Identifier(ident) => format!("`{ident}`"),
        RichPattern::Any => "any token".to_owned(),
        RichPattern::SomethingElse => "something else".to_owned(),
        RichPattern::EndOfInput => "end of input".to_owned(),
    }
}
