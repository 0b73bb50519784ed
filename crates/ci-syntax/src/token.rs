use derive_more::Display;
use std::fmt;

use crate::span::Spanned;

pub type Tokens<'a> = Vec<Spanned<Token<'a>>>;

#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kw {
    // Visibility
    #[display("public")]
    Public,
    #[display("internal")]
    Internal,
    #[display("protected")]
    Protected,
    #[display("private")]
    Private,
    // Class and method modifiers
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
    // Declarations
    #[display("const")]
    Const,
    #[display("class")]
    Class,
    #[display("enum")]
    Enum,
    // Literals
    #[display("true")]
    True,
    #[display("false")]
    False,
    #[display("null")]
    Null,
}

impl Kw {
    pub fn from_word(word: &str) -> Option<Self> {
        let kw = match word {
            "public" => Self::Public,
            "internal" => Self::Internal,
            "protected" => Self::Protected,
            "private" => Self::Private,
            "abstract" => Self::Abstract,
            "sealed" => Self::Sealed,
            "static" => Self::Static,
            "virtual" => Self::Virtual,
            "override" => Self::Override,
            "const" => Self::Const,
            "class" => Self::Class,
            "enum" => Self::Enum,
            "true" => Self::True,
            "false" => Self::False,
            "null" => Self::Null,
            _ => return None,
        };
        Some(kw)
    }
}

#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Ctrl {
    #[display("{{")]
    LBrace,
    #[display("}}")]
    RBrace,
    #[display("(")]
    LParen,
    #[display(")")]
    RParen,
    #[display("[")]
    LBracket,
    #[display("]")]
    RBracket,
    #[display(";")]
    Semi,
    #[display(":")]
    Colon,
    #[display(",")]
    Comma,
    #[display(".")]
    Dot,
    #[display("=")]
    Assign,
    #[display("=>")]
    FatArrow,
    #[display("?")]
    Question,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Token<'src> {
    Ident(&'src str),
    // Literals, as written (quotes stripped)
    Num(&'src str),
    Str(&'src str),
    Char(&'src str),
    Kw(Kw),
    Ctrl(Ctrl),
    Op(&'src str),
}

impl fmt::Display for Token<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ident(s) | Self::Num(s) | Self::Op(s) => f.write_str(s),
            Self::Str(s) => write!(f, "\"{s}\""),
            Self::Char(c) => write!(f, "'{c}'"),
            Self::Kw(kw) => kw.fmt(f),
            Self::Ctrl(ctrl) => ctrl.fmt(f),
        }
    }
}
