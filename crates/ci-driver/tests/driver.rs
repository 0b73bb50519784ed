use std::rc::Rc;

use camino::{Utf8Path, Utf8PathBuf};
use ci_driver::{Driver, DriverError, DriverState, Outcome, ParseErrorKind};
use ci_utils::io::MockFileSystem;

const SHAPES: &str = "\
public enum Color { Red, Green, Blue }

public abstract class Shape
{
    public const int Sides = 0;
    protected Color fill = Color.Red;
    public abstract double Area();
}
";

const CIRCLE: &str = "\
public class Circle : Shape
{
    public const int Sides = Shape.Sides;
    double radius;
    public override double Area() => 3.14 * radius * radius;
}
";

const SQUARE: &str = "\
public sealed class Square : Shape
{
    double side;
    public override double Area() { return side * side; }
}
";

fn mock(files: &[(&str, &str)]) -> Rc<MockFileSystem> {
    let mut io = MockFileSystem::new();
    for (path, content) in files {
        io.add_file(*path, *content);
    }
    Rc::new(io)
}

fn paths(names: &[&str]) -> Vec<Utf8PathBuf> {
    names.iter().map(Utf8PathBuf::from).collect()
}

fn run(io: &Rc<MockFileSystem>, names: &[&str]) -> Outcome {
    Driver::new(Rc::clone(io), paths(names)).run()
}

fn decl_names(outcome: &Outcome) -> Vec<&str> {
    outcome.program.decls().iter().map(|d| d.name()).collect()
}

fn symbol_names(outcome: &Outcome) -> Vec<&str> {
    outcome.context.symbols().map(|(name, _)| name).collect()
}

#[test]
fn all_files_succeed_in_order() {
    let io = mock(&[("shapes.ci", SHAPES), ("circle.ci", CIRCLE), ("square.ci", SQUARE)]);
    let outcome = run(&io, &["shapes.ci", "circle.ci", "square.ci"]);

    assert!(outcome.is_success());
    assert_eq!(decl_names(&outcome), ["Color", "Shape", "Circle", "Square"]);
    assert_eq!(symbol_names(&outcome), ["Color", "Shape", "Circle", "Square"]);
    assert_eq!(outcome.program.units().len(), 3);
    assert_eq!(io.reads(), paths(&["shapes.ci", "circle.ci", "square.ci"]));
}

#[test]
fn failure_stops_before_later_files() {
    let io = mock(&[
        ("shapes.ci", SHAPES),
        ("broken.ci", "public class Oops : {"),
        ("square.ci", SQUARE),
    ]);
    let outcome = run(&io, &["shapes.ci", "broken.ci", "square.ci"]);

    match &outcome.result {
        Err(DriverError::Parse(err)) => {
            assert_eq!(err.kind, ParseErrorKind::Syntax);
            assert_eq!(err.file, Utf8Path::new("broken.ci"));
        }
        other => panic!("expected a parse error, got {other:?}"),
    }

    assert_eq!(decl_names(&outcome), ["Color", "Shape"]);
    assert_eq!(symbol_names(&outcome), ["Color", "Shape"]);
    assert_eq!(io.reads(), paths(&["shapes.ci", "broken.ci"]));
}

#[test]
fn failing_file_contributes_nothing() {
    // The first two declarations are fine, the third is not
    let partial = "const int A = 1;\nconst int B = A;\nconst int C = Missing;";
    let io = mock(&[("shapes.ci", SHAPES), ("partial.ci", partial)]);
    let outcome = run(&io, &["shapes.ci", "partial.ci"]);

    assert!(!outcome.is_success());
    assert!(outcome.context.lookup("A").is_none());
    assert!(outcome.context.lookup("B").is_none());
    assert_eq!(outcome.program.units().len(), 1);
    assert_eq!(decl_names(&outcome), ["Color", "Shape"]);
}

#[test]
fn dependency_order_matters() {
    let io = mock(&[("shapes.ci", SHAPES), ("circle.ci", CIRCLE)]);

    let forward = run(&io, &["shapes.ci", "circle.ci"]);
    assert!(forward.is_success());

    let backward = run(&io, &["circle.ci", "shapes.ci"]);
    match &backward.result {
        Err(DriverError::Parse(err)) => {
            assert_eq!(err.kind, ParseErrorKind::Resolve);
            assert_eq!(err.file, Utf8Path::new("circle.ci"));
            assert_eq!((err.line, err.column), (1, 23));
        }
        other => panic!("expected a resolve error, got {other:?}"),
    }
    assert!(backward.program.is_empty());
    assert!(backward.context.is_empty());

    // Same input, same failure
    let again = run(&io, &["circle.ci", "shapes.ci"]);
    assert_eq!(
        again.result.unwrap_err().to_string(),
        backward.result.unwrap_err().to_string()
    );
}

#[test]
fn duplicate_across_files() {
    let io = mock(&[
        ("a.ci", "public const int Limit = 10;"),
        ("b.ci", "// again\npublic const int Limit = 20;"),
    ]);
    let outcome = run(&io, &["a.ci", "b.ci"]);

    let Err(DriverError::Parse(err)) = &outcome.result else {
        panic!("expected a parse error");
    };
    assert_eq!(err.kind, ParseErrorKind::Resolve);
    assert_eq!(err.file, Utf8Path::new("b.ci"));
    assert_eq!((err.line, err.column), (2, 18));
    assert!(err.message.contains("already declared"));
    assert_eq!(err.help.as_deref(), Some("previously declared at a.ci:1:18"));

    assert_eq!(decl_names(&outcome), ["Limit"]);
    assert_eq!(outcome.program.units().len(), 1);
}

#[test]
fn missing_file_is_an_io_error() {
    let io = mock(&[("shapes.ci", SHAPES), ("circle.ci", CIRCLE)]);
    let outcome = run(&io, &["missing.ci", "shapes.ci", "circle.ci"]);

    match &outcome.result {
        Err(DriverError::Io { path, source }) => {
            assert_eq!(path, Utf8Path::new("missing.ci"));
            assert_eq!(source.kind(), std::io::ErrorKind::NotFound);
        }
        other => panic!("expected an io error, got {other:?}"),
    }

    assert!(outcome.program.is_empty());
    assert!(outcome.context.is_empty());
    assert_eq!(io.reads(), paths(&["missing.ci"]));
}

#[test]
fn directory_is_an_io_error() {
    let mut io = MockFileSystem::new();
    io.add_dir("src");
    let outcome = Driver::new(io, ["src"]).run();

    assert!(matches!(outcome.result, Err(DriverError::Io { .. })));
}

#[test]
fn runs_are_idempotent() {
    let io = mock(&[("shapes.ci", SHAPES), ("circle.ci", CIRCLE), ("square.ci", SQUARE)]);

    let first = run(&io, &["shapes.ci", "circle.ci", "square.ci"]);
    let second = run(&io, &["shapes.ci", "circle.ci", "square.ci"]);

    assert!(first.is_success() && second.is_success());
    assert_eq!(first.program, second.program);
    assert_eq!(first.context, second.context);
}

#[test]
fn empty_files_and_empty_lists() {
    let io = mock(&[("empty.ci", ""), ("comments.ci", "// nothing\n/* here */")]);
    let outcome = run(&io, &["empty.ci", "comments.ci"]);

    assert!(outcome.is_success());
    assert_eq!(outcome.program.units().len(), 2);
    assert!(outcome.program.is_empty());

    let outcome = run(&io, &[]);
    assert!(outcome.is_success());
    assert!(outcome.program.units().is_empty());
}

#[test]
fn invalid_utf8_is_a_parse_error() {
    let mut io = MockFileSystem::new();
    io.add_file("latin1.ci", b"const string S = \"caf\xe9\";".to_vec());
    let outcome = Driver::new(io, ["latin1.ci"]).run();

    let Err(DriverError::Parse(err)) = &outcome.result else {
        panic!("expected a parse error");
    };
    assert_eq!(err.kind, ParseErrorKind::Encoding);
    assert_eq!(err.offset, 21);
}

#[test]
fn stepping_walks_the_state_machine() {
    let io = mock(&[("shapes.ci", SHAPES), ("broken.ci", "enum {")]);
    let mut driver = Driver::new(Rc::clone(&io), paths(&["shapes.ci", "broken.ci", "never.ci"]));

    assert!(matches!(driver.state(), DriverState::Pending(p) if p.len() == 3));

    assert!(matches!(driver.step(), DriverState::Pending(p) if p.len() == 2));
    assert_eq!(driver.program().units().len(), 1);

    assert!(matches!(driver.step(), DriverState::Failed(DriverError::Parse(_))));

    // Terminal states stay put
    assert!(matches!(driver.step(), DriverState::Failed(_)));
    assert_eq!(io.reads(), paths(&["shapes.ci", "broken.ci"]));
    assert_eq!(driver.context().len(), 2);
}

#[test]
fn stepping_an_empty_list_succeeds() {
    let mut driver = Driver::new(MockFileSystem::new(), Vec::<Utf8PathBuf>::new());

    assert!(matches!(driver.step(), DriverState::Succeeded));
    assert!(matches!(driver.step(), DriverState::Succeeded));
}
