use std::ops::Range;

use camino::{Utf8Path, Utf8PathBuf};
use ci_span::{LineCol, LineIndex, Loc, SourceId};

use crate::node::Decl;

/// A source unit that has been committed to a [`Program`].
#[derive(Debug, Clone, PartialEq)]
pub struct Unit {
    pub name: Utf8PathBuf,
    pub lines: LineIndex,
    decls: Range<usize>,
}

impl Unit {
    /// Number of top-level declarations the unit contributed.
    pub fn len(&self) -> usize {
        self.decls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.decls.is_empty()
    }
}

/// The translation unit all source files are merged into.
///
/// Declarations are only ever appended: a unit's declarations keep their
/// source order and units follow each other in the order they were appended.
/// Nothing is reordered, deduplicated or removed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Program {
    units: Vec<Unit>,
    decls: Vec<Decl>,
}

impl Program {
    pub fn new() -> Self {
        Self::default()
    }

    /// The id the next appended unit will receive.
    pub fn next_source(&self) -> SourceId {
        SourceId::new(self.units.len())
    }

    /// Appends the declarations of one source unit.
    ///
    /// Every declaration must have been located in the unit returned by
    /// [`Program::next_source`].
    pub fn append_unit(
        &mut self,
        name: impl Into<Utf8PathBuf>,
        lines: LineIndex,
        decls: Vec<Decl>,
    ) -> SourceId {
        let source = self.next_source();
        debug_assert!(decls.iter().all(|decl| decl.loc.source == source));

        let start = self.decls.len();
        self.decls.extend(decls);

        self.units.push(Unit {
            name: name.into(),
            lines,
            decls: start..self.decls.len(),
        });

        source
    }

    /// All declarations in program order.
    pub fn decls(&self) -> &[Decl] {
        &self.decls
    }

    pub fn units(&self) -> &[Unit] {
        &self.units
    }

    /// Each unit together with its declarations.
    pub fn iter_units(&self) -> impl Iterator<Item = (&Unit, &[Decl])> {
        self.units
            .iter()
            .map(|unit| (unit, &self.decls[unit.decls.clone()]))
    }

    pub fn unit(&self, source: SourceId) -> Option<&Unit> {
        self.units.get(source.index())
    }

    pub fn unit_decls(&self, source: SourceId) -> &[Decl] {
        match self.unit(source) {
            Some(unit) => &self.decls[unit.decls.clone()],
            None => &[],
        }
    }

    pub fn file_name(&self, source: SourceId) -> Option<&Utf8Path> {
        self.unit(source).map(|unit| unit.name.as_path())
    }

    /// File the declaration came from.
    pub fn origin(&self, decl: &Decl) -> Option<&Utf8Path> {
        self.file_name(decl.loc.source)
    }

    /// File name and position of the start of `loc`.
    pub fn locate(&self, loc: Loc) -> Option<(&Utf8Path, LineCol)> {
        let unit = self.unit(loc.source)?;
        Some((unit.name.as_path(), unit.lines.line_col(loc.span.start)))
    }

    /// Number of declarations across all units.
    pub fn len(&self) -> usize {
        self.decls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.decls.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use ci_span::Span;

    use super::*;
    use crate::node::{ConstDecl, DeclKind, Init, Literal, Name, TypeExpr, Visibility};

    fn constant(source: SourceId, name: &str, start: usize) -> Decl {
        let span = Span::new(start, start + name.len());
        Decl {
            name: Name::new(name, span),
            visibility: Visibility::Internal,
            kind: DeclKind::Const(ConstDecl {
                ty: TypeExpr::named(Name::new("int", span)),
                value: Init::Literal(Literal::Number("1".to_owned())),
            }),
            loc: Loc::new(source, span),
        }
    }

    #[test]
    fn units_are_concatenated_in_order() {
        let mut program = Program::new();

        let a = program.next_source();
        let decls = vec![constant(a, "B", 0), constant(a, "A", 20)];
        assert_eq!(program.append_unit("a.ci", LineIndex::new("x"), decls), a);

        let b = program.next_source();
        assert_ne!(a, b);
        program.append_unit("b.ci", LineIndex::new("y"), vec![constant(b, "C", 0)]);

        let names = program.decls().iter().map(Decl::name).collect::<Vec<_>>();
        assert_eq!(names, ["B", "A", "C"]);

        assert_eq!(program.unit_decls(a).len(), 2);
        assert_eq!(program.unit_decls(b)[0].name(), "C");
        assert_eq!(program.origin(&program.decls()[2]), Some(Utf8Path::new("b.ci")));
    }

    #[test]
    fn empty_units_are_recorded() {
        let mut program = Program::new();

        let empty = program.append_unit("empty.ci", LineIndex::new(""), Vec::new());

        assert!(program.is_empty());
        assert_eq!(program.units().len(), 1);
        assert!(program.unit(empty).is_some_and(Unit::is_empty));
        assert_eq!(program.next_source(), SourceId::new(1));
    }

    #[test]
    fn locate_reports_line_and_column() {
        let mut program = Program::new();
        let text = "// header\nconst int A = 1;";

        let source = program.next_source();
        let decl = constant(source, "A", 20);
        let loc = decl.name_loc();
        program.append_unit("a.ci", LineIndex::new(text), vec![decl]);

        let (file, pos) = program.locate(loc).unwrap();
        assert_eq!(file, Utf8Path::new("a.ci"));
        assert_eq!(pos, LineCol { line: 2, column: 11 });
    }
}
