//! Runs the parser over an ordered list of files, stopping at the first failure.
//!
//! [`FileParser`] handles one unit against a shared [`ResolutionContext`] and
//! [`Program`]; [`Driver`] feeds it files one step at a time.

pub mod driver;
pub mod error;
pub mod parser;

pub use ci_resolve::ResolutionContext;
pub use ci_tree::program::Program;
pub use driver::{Driver, DriverState, Outcome};
pub use error::{DriverError, ParseError, ParseErrorKind};
pub use parser::{FileParser, SourceUnit};
