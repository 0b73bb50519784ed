use std::{fmt, io};

use camino::{Utf8Path, Utf8PathBuf};
use ci_resolve::{Origin, ResolveError};
use ci_span::LineIndex;
use ci_syntax::SyntaxError;
use ci_tree::program::Program;
use miette::{Diagnostic, LabeledSpan, NamedSource, SourceCode, SourceSpan};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParseErrorKind {
    Encoding,
    Syntax,
    Resolve,
}

impl ParseErrorKind {
    pub fn code(self) -> &'static str {
        match self {
            Self::Encoding => "ci::encoding",
            Self::Syntax => "ci::syntax",
            Self::Resolve => "ci::resolve",
        }
    }

    fn label(self) -> &'static str {
        match self {
            Self::Encoding => "invalid UTF-8 starts here",
            Self::Syntax => "here",
            Self::Resolve => "this name",
        }
    }
}

/// Why a single unit was rejected.
///
/// Keeps the failing unit's text so the error can be rendered on its own,
/// after the unit's bytes are gone.
#[derive(Debug, Error)]
#[error("{file}:{line}:{column}: {message}")]
pub struct ParseError {
    pub kind: ParseErrorKind,
    pub file: Utf8PathBuf,
    /// Byte offset into the unit.
    pub offset: usize,
    pub len: usize,
    pub line: usize,
    /// Byte column, 1-based.
    pub column: usize,
    pub message: String,
    pub help: Option<String>,
    src: NamedSource<String>,
}

impl ParseError {
    fn new(
        kind: ParseErrorKind,
        file: &Utf8Path,
        text: String,
        lines: &LineIndex,
        offset: usize,
        len: usize,
        message: String,
    ) -> Self {
        let at = lines.line_col(offset);

        Self {
            kind,
            file: file.to_owned(),
            offset,
            len,
            line: at.line,
            column: at.column,
            message,
            help: None,
            src: NamedSource::new(file.as_str(), text),
        }
    }

    fn with_help(mut self, help: Option<String>) -> Self {
        self.help = help;
        self
    }

    pub fn encoding(file: &Utf8Path, bytes: &[u8], error: std::str::Utf8Error) -> Self {
        let text = String::from_utf8_lossy(bytes).into_owned();
        let lines = LineIndex::new(&text);
        let offset = error.valid_up_to();

        Self::new(
            ParseErrorKind::Encoding,
            file,
            text,
            &lines,
            offset,
            error.error_len().unwrap_or(1),
            format!("invalid UTF-8 at byte {offset}"),
        )
        .with_help(Some("source files must be UTF-8 encoded".to_owned()))
    }

    pub fn syntax(file: &Utf8Path, text: &str, lines: &LineIndex, error: SyntaxError) -> Self {
        let SyntaxError { message, span } = error;

        Self::new(
            ParseErrorKind::Syntax,
            file,
            text.to_owned(),
            lines,
            span.start,
            span.len(),
            message,
        )
    }

    /// `program` locates bindings from earlier units, `lines` those of the
    /// failing unit itself.
    pub fn resolve(
        file: &Utf8Path,
        text: &str,
        lines: &LineIndex,
        program: &Program,
        error: &ResolveError,
    ) -> Self {
        let loc = error.loc();

        let previous = error.previous().map(|origin| match origin {
            Origin::System => "the name is taken by a built-in type".to_owned(),
            Origin::Source(prev) if prev.source == loc.source => {
                format!("previously declared at {file}:{}", lines.line_col(prev.span.start))
            }
            Origin::Source(prev) => match program.locate(prev) {
                Some((prev_file, at)) => format!("previously declared at {prev_file}:{at}"),
                None => format!("previously declared at {prev}"),
            },
        });
        let help = previous.or_else(|| error.help().map(str::to_owned));

        Self::new(
            ParseErrorKind::Resolve,
            file,
            text.to_owned(),
            lines,
            loc.span.start,
            loc.span.len(),
            error.to_string(),
        )
        .with_help(help)
    }

    /// The text of the failing unit.
    pub fn source_text(&self) -> &str {
        self.src.inner()
    }

    /// The labelled span, never empty so a marker is always drawn.
    ///
    /// An empty span inside the text covers the next byte. At the end of
    /// the text it moves back onto the last visible character.
    fn label_span(&self) -> SourceSpan {
        if self.len != 0 {
            return SourceSpan::from((self.offset, self.len));
        }

        let text = self.source_text();
        if self.offset < text.len() {
            let width = text[self.offset..].chars().next().map_or(1, char::len_utf8);
            return SourceSpan::from((self.offset, width));
        }

        match text.trim_end().char_indices().next_back() {
            Some((at, c)) => SourceSpan::from((at, c.len_utf8())),
            None => SourceSpan::from((self.offset, 0)),
        }
    }
}

impl Diagnostic for ParseError {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        Some(Box::new(self.kind.code()))
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        self.help
            .as_ref()
            .map(|help| Box::new(help) as Box<dyn fmt::Display + 'a>)
    }

    fn source_code(&self) -> Option<&dyn SourceCode> {
        Some(&self.src)
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        let span = self.label_span();
        let label = LabeledSpan::new_with_span(Some(self.kind.label().to_owned()), span);

        Some(Box::new(std::iter::once(label)))
    }
}

#[derive(Debug, Error, Diagnostic)]
pub enum DriverError {
    #[error("cannot read `{path}`")]
    #[diagnostic(code(ci::io), help("check that the file exists and is readable"))]
    Io {
        path: Utf8PathBuf,
        #[source]
        source: io::Error,
    },
    #[error(transparent)]
    #[diagnostic(transparent)]
    Parse(#[from] ParseError),
}

impl DriverError {
    /// The file the run stopped at.
    pub fn path(&self) -> &Utf8Path {
        match self {
            Self::Io { path, .. } => path,
            Self::Parse(err) => &err.file,
        }
    }
}
