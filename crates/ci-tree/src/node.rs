use std::fmt;

use ci_span::{Loc, Span};
use derive_more::{Display, From};

/// An identifier together with where it was written.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Name {
    pub text: String,
    pub span: Span,
}

impl Name {
    pub fn new(text: impl Into<String>, span: Span) -> Self {
        Self {
            text: text.into(),
            span,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }
}

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

#[derive(Debug, Display, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Visibility {
    #[display("private")]
    #[default]
    Private,
    #[display("internal")]
    Internal,
    #[display("protected")]
    Protected,
    #[display("public")]
    Public,
}

#[derive(Debug, Display, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum ClassModifier {
    #[display("")]
    #[default]
    Normal,
    #[display("abstract")]
    Abstract,
    #[display("sealed")]
    Sealed,
    #[display("static")]
    Static,
}

#[derive(Debug, Display, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum MethodKind {
    #[display("")]
    #[default]
    Normal,
    #[display("static")]
    Static,
    #[display("abstract")]
    Abstract,
    #[display("virtual")]
    Virtual,
    #[display("override")]
    Override,
    #[display("sealed")]
    Sealed,
}

/// A reference to a type: `Name`, `Name[]`, `Name?`, `Name[][]?`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TypeExpr {
    pub name: Name,
    pub rank: usize,
    pub nullable: bool,
}

impl TypeExpr {
    pub fn named(name: Name) -> Self {
        Self {
            name,
            rank: 0,
            nullable: false,
        }
    }

    pub fn span(&self) -> Span {
        self.name.span
    }
}

impl fmt::Display for TypeExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)?;
        for _ in 0..self.rank {
            f.write_str("[]")?;
        }
        if self.nullable {
            f.write_str("?")?;
        }
        Ok(())
    }
}

#[derive(Debug, Display, Clone, PartialEq)]
pub enum Literal {
    #[display("{_0}")]
    Number(String),
    #[display("\"{_0}\"")]
    Str(String),
    #[display("'{_0}'")]
    Char(String),
    #[display("{_0}")]
    Bool(bool),
    #[display("null")]
    Null,
}

/// The value a constant or field is initialised with.
#[derive(Debug, Clone, PartialEq, From)]
pub enum Init {
    Literal(Literal),
    /// `Name` or `Owner.Name`.
    Ref(Vec<Name>),
}

impl Init {
    pub fn span(&self) -> Option<Span> {
        match self {
            Self::Literal(_) => None,
            Self::Ref(path) => path
                .iter()
                .map(|name| name.span)
                .reduce(|a, b| a.union(b)),
        }
    }
}

impl fmt::Display for Init {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Literal(literal) => literal.fmt(f),
            Self::Ref(path) => {
                for (i, name) in path.iter().enumerate() {
                    if i != 0 {
                        f.write_str(".")?;
                    }
                    name.fmt(f)?;
                }
                Ok(())
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConstDecl {
    pub ty: TypeExpr,
    pub value: Init,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EnumValue {
    pub name: Name,
    pub value: i64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EnumDecl {
    /// Declared with `enum*`: values are bit flags.
    pub flags: bool,
    pub values: Vec<EnumValue>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    pub ty: TypeExpr,
    pub name: Name,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MethodBody {
    /// `;`
    None,
    /// `=> expr ;`
    Expr(Span),
    /// `{ ... }`
    Block(Span),
}

#[derive(Debug, Clone, PartialEq)]
pub enum MemberKind {
    Const(ConstDecl),
    Field {
        ty: TypeExpr,
        init: Option<Init>,
    },
    Method {
        kind: MethodKind,
        ret: TypeExpr,
        params: Vec<Param>,
        body: MethodBody,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Member {
    pub name: Name,
    pub visibility: Visibility,
    pub kind: MemberKind,
    pub span: Span,
}

impl Member {
    pub fn kind_name(&self) -> &'static str {
        match self.kind {
            MemberKind::Const(_) => "constant",
            MemberKind::Field { .. } => "field",
            MemberKind::Method { .. } => "method",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClassDecl {
    pub modifier: ClassModifier,
    pub base: Option<Name>,
    pub members: Vec<Member>,
}

#[derive(Debug, Clone, PartialEq, From)]
pub enum DeclKind {
    Const(ConstDecl),
    Enum(EnumDecl),
    Class(ClassDecl),
}

/// A top-level declaration of a source unit.
#[derive(Debug, Clone, PartialEq)]
pub struct Decl {
    pub name: Name,
    pub visibility: Visibility,
    pub kind: DeclKind,
    /// Covers the whole declaration, modifiers included.
    pub loc: Loc,
}

impl Decl {
    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    /// Location of the declared name, used for diagnostics.
    pub fn name_loc(&self) -> Loc {
        Loc::new(self.loc.source, self.name.span)
    }

    pub fn kind_name(&self) -> &'static str {
        match self.kind {
            DeclKind::Const(_) => "constant",
            DeclKind::Enum(_) => "enum",
            DeclKind::Class(_) => "class",
        }
    }
}

/// One line summary, e.g. `public class Circle : Shape (3 members)`.
impl fmt::Display for Decl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ", self.visibility)?;
        match &self.kind {
            DeclKind::Const(ConstDecl { ty, value }) => {
                write!(f, "const {ty} {} = {value}", self.name)
            }
            DeclKind::Enum(EnumDecl { flags, values }) => {
                let star = if *flags { "*" } else { "" };
                write!(f, "enum{star} {} ({} values)", self.name, values.len())
            }
            DeclKind::Class(ClassDecl {
                modifier,
                base,
                members,
            }) => {
                if *modifier != ClassModifier::Normal {
                    write!(f, "{modifier} ")?;
                }
                write!(f, "class {}", self.name)?;
                if let Some(base) = base {
                    write!(f, " : {base}")?;
                }
                write!(f, " ({} members)", members.len())
            }
        }
    }
}
