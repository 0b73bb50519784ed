use camino::Utf8Path;
use ci_resolve::{ResolutionContext, declare_unit};
use ci_span::{LineIndex, SourceId, Span};
use ci_syntax::SyntaxError;
use ci_tree::program::Program;
use log::debug;

use crate::error::ParseError;

/// One input file: its name and raw content, borrowed for a single parse.
#[derive(Debug, Clone, Copy)]
pub struct SourceUnit<'a> {
    pub name: &'a Utf8Path,
    pub bytes: &'a [u8],
}

/// Parses units into a shared context and program.
///
/// A unit either lands completely (its symbols in the context, its
/// declarations appended to the program) or leaves both untouched.
pub struct FileParser<'a> {
    context: &'a mut ResolutionContext,
    program: &'a mut Program,
}

impl<'a> FileParser<'a> {
    pub fn new(context: &'a mut ResolutionContext, program: &'a mut Program) -> Self {
        Self { context, program }
    }

    pub fn parse(&mut self, file_name: &Utf8Path, bytes: &[u8]) -> Result<SourceId, ParseError> {
        self.parse_unit(SourceUnit {
            name: file_name,
            bytes,
        })
    }

    pub fn parse_unit(&mut self, unit: SourceUnit<'_>) -> Result<SourceId, ParseError> {
        let SourceUnit { name, bytes } = unit;

        let text =
            std::str::from_utf8(bytes).map_err(|err| ParseError::encoding(name, bytes, err))?;
        let lines = LineIndex::new(text);
        let source = self.program.next_source();

        debug!("{name}: {} bytes, {} lines, unit {source}", bytes.len(), lines.lines());

        let decls = ci_syntax::parse_unit(source, text).map_err(|errors| {
            debug!("{name}: {} syntax errors", errors.len());

            let first = errors.into_iter().next().unwrap_or_else(|| {
                SyntaxError::new("malformed source unit", Span::point(text.len()))
            });
            ParseError::syntax(name, text, &lines, first)
        })?;

        let mut tx = self.context.transaction();
        if let Err(err) = declare_unit(&mut tx, &decls) {
            debug!("{name}: {err}");
            return Err(ParseError::resolve(name, text, &lines, self.program, &err));
        }
        tx.commit();

        let count = decls.len();
        let id = self.program.append_unit(name, lines, decls);
        debug!("{name}: committed {count} declarations as unit {id}");

        Ok(id)
    }
}
