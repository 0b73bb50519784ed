use ci_span::Loc;
use ci_tree::node::ClassModifier;
use thiserror::Error;

use crate::symbol::Origin;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("`{name}` is already declared")]
pub struct DuplicateSymbol {
    pub name: String,
    /// Origin of the rejected definition.
    pub origin: Origin,
    pub previous: Origin,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    #[error("`{name}` is already declared")]
    Duplicate {
        name: String,
        loc: Loc,
        previous: Origin,
    },
    #[error("`{owner}` already has a {what} named `{name}`")]
    DuplicateMember {
        owner: String,
        what: &'static str,
        name: String,
        loc: Loc,
        previous: Loc,
    },
    #[error("cannot find `{name}`")]
    Unresolved { name: String, loc: Loc },
    #[error("`{name}` is {found}, expected {expected}")]
    KindMismatch {
        name: String,
        loc: Loc,
        expected: &'static str,
        found: &'static str,
    },
    #[error("`{owner}` has no member `{name}`")]
    NoMember {
        owner: String,
        name: String,
        loc: Loc,
    },
    #[error("class `{name}` inherits from itself")]
    CyclicBase { name: String, loc: Loc },
    #[error("class `{name}` cannot derive from {modifier} class `{base}`")]
    SealedBase {
        name: String,
        base: String,
        modifier: ClassModifier,
        loc: Loc,
    },
    #[error("`void` is only valid as a method return type")]
    VoidValue { loc: Loc },
}

impl ResolveError {
    /// The offending name.
    pub fn loc(&self) -> Loc {
        match self {
            Self::Duplicate { loc, .. }
            | Self::DuplicateMember { loc, .. }
            | Self::Unresolved { loc, .. }
            | Self::KindMismatch { loc, .. }
            | Self::NoMember { loc, .. }
            | Self::CyclicBase { loc, .. }
            | Self::SealedBase { loc, .. }
            | Self::VoidValue { loc } => *loc,
        }
    }

    /// The earlier binding this error collides with, if any.
    pub fn previous(&self) -> Option<Origin> {
        match self {
            Self::Duplicate { previous, .. } => Some(*previous),
            Self::DuplicateMember { previous, .. } => Some(Origin::Source(*previous)),
            _ => None,
        }
    }

    pub fn help(&self) -> Option<&'static str> {
        match self {
            Self::Duplicate {
                previous: Origin::System,
                ..
            } => Some("built-in type names cannot be redeclared"),
            Self::Unresolved { .. } => {
                Some("a file can only refer to names declared in itself or in earlier files")
            }
            Self::SealedBase { .. } => Some("only normal and abstract classes can be derived from"),
            Self::VoidValue { .. } => Some("use a concrete type"),
            _ => None,
        }
    }
}
