//! Symbol registration and reference checking for parsed units.

pub mod context;
pub mod declare;
pub mod error;
pub mod symbol;

pub use context::{ResolutionContext, Transaction};
pub use declare::declare_unit;
pub use error::{DuplicateSymbol, ResolveError};
pub use symbol::{BUILTINS, DefKind, Definition, MemberDef, Origin};

pub mod prelude {
    pub use crate::context::{ResolutionContext, Transaction};
    pub use crate::declare::declare_unit;
    pub use crate::error::{DuplicateSymbol, ResolveError};
    pub use crate::symbol::{DefKind, Definition, MemberDef, Origin};
}
