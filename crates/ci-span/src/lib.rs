//! Source positions and related helper functions.
//!
//! Important concepts in this module include:
//!
//! - the *span*, a byte range inside one source unit, represented by [`Span`];
//! - the *location*, a span tagged with the unit it belongs to, represented by [`Loc`];
//! - the *line index*, which turns byte offsets into [`LineCol`] positions.

mod line;
mod loc;
mod source;
mod span;

pub use line::{LineCol, LineIndex};
pub use loc::Loc;
pub use source::SourceId;
pub use span::Span;
