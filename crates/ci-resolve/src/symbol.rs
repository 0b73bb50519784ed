use std::fmt;

use ci_span::Loc;
use ci_tree::node::{ClassModifier, Decl, DeclKind, MemberKind, Visibility};
use derive_more::Display;
use indexmap::IndexMap;

/// Types every program can refer to without declaring them.
pub const BUILTINS: [&str; 11] = [
    "byte", "short", "ushort", "int", "uint", "long", "float", "double", "bool", "string",
    "void",
];

/// Where a symbol was bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Origin {
    System,
    Source(Loc),
}

impl Origin {
    pub fn loc(self) -> Option<Loc> {
        match self {
            Self::System => None,
            Self::Source(loc) => Some(loc),
        }
    }
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::System => f.write_str("built-in"),
            Self::Source(loc) => loc.fmt(f),
        }
    }
}

#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MemberDef {
    #[display("constant")]
    Const,
    #[display("field")]
    Field,
    #[display("method")]
    Method,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DefKind {
    Builtin,
    Class {
        modifier: ClassModifier,
        base: Option<String>,
        members: IndexMap<String, MemberDef>,
    },
    Enum {
        flags: bool,
        values: IndexMap<String, i64>,
    },
    Const {
        ty: String,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Definition {
    pub kind: DefKind,
    pub visibility: Visibility,
    pub origin: Origin,
}

impl Definition {
    pub fn builtin() -> Self {
        Self {
            kind: DefKind::Builtin,
            visibility: Visibility::Public,
            origin: Origin::System,
        }
    }

    /// The symbol a top-level declaration binds, located at its name.
    pub fn from_decl(decl: &Decl) -> Self {
        let kind = match &decl.kind {
            DeclKind::Const(c) => DefKind::Const {
                ty: c.ty.to_string(),
            },
            DeclKind::Enum(e) => DefKind::Enum {
                flags: e.flags,
                values: e
                    .values
                    .iter()
                    .map(|v| (v.name.to_string(), v.value))
                    .collect(),
            },
            DeclKind::Class(c) => DefKind::Class {
                modifier: c.modifier,
                base: c.base.as_ref().map(ToString::to_string),
                members: c
                    .members
                    .iter()
                    .map(|m| {
                        let def = match m.kind {
                            MemberKind::Const(_) => MemberDef::Const,
                            MemberKind::Field { .. } => MemberDef::Field,
                            MemberKind::Method { .. } => MemberDef::Method,
                        };
                        (m.name.to_string(), def)
                    })
                    .collect(),
            },
        };

        Self {
            kind,
            visibility: decl.visibility,
            origin: Origin::Source(decl.name_loc()),
        }
    }

    /// Whether the symbol can be used where a type is expected.
    pub fn is_type(&self) -> bool {
        matches!(
            self.kind,
            DefKind::Builtin | DefKind::Class { .. } | DefKind::Enum { .. }
        )
    }

    /// Article and kind, e.g. `a constant`.
    pub fn describe(&self) -> &'static str {
        match self.kind {
            DefKind::Builtin => "a built-in type",
            DefKind::Class { .. } => "a class",
            DefKind::Enum { .. } => "an enum",
            DefKind::Const { .. } => "a constant",
        }
    }
}
