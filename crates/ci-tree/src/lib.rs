//! Declaration nodes and the [`Program`] they are accumulated into.

pub mod node;
pub mod program;

pub mod prelude {
    pub use crate::node::{
        ClassDecl, ClassModifier, ConstDecl, Decl, DeclKind, EnumDecl, EnumValue, Init, Literal,
        Member, MemberKind, MethodBody, MethodKind, Name, Param, TypeExpr, Visibility,
    };
    pub use crate::program::{Program, Unit};
}
