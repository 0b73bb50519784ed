use chumsky::{
    input::{Emitter, ValueInput},
    prelude::*,
};
use ci_span::{Loc, SourceId};
use ci_tree::prelude::*;
use log::trace;

use super::{
    Error, Extra,
    modifier::{Modifier, Modifiers, modifiers},
    primitives::{ctrl, init, kw, name, op, type_expr},
};
use crate::{
    span::Span,
    token::{Ctrl, Kw, Token},
};

/*
unit     := decl*
decl     := modifier* ( const | enum | class )
const    := 'const' type IDENT '=' init ';'
enum     := 'enum' '*'? IDENT '{' ( value (',' value)* ','? )? '}'
value    := IDENT ( '=' '-'? NUMBER )?
class    := 'class' IDENT ( ':' IDENT )? '{' member* '}'
member   := modifier* ( const | type IDENT ( ('=' init)? ';' | '(' params ')' body ) )
params   := ( type IDENT (',' type IDENT)* )?
body     := ';' | '=>' token+ ';' | block
block    := '{' ( block | token )* '}'
*/

const TOP_LEVEL: [Visibility; 2] = [Visibility::Public, Visibility::Internal];
const ANY_VISIBILITY: [Visibility; 4] = [
    Visibility::Public,
    Visibility::Internal,
    Visibility::Protected,
    Visibility::Private,
];

pub fn unit_parser<'t, I>(source: SourceId) -> impl Parser<'t, I, Vec<Decl>, Extra<'t>> + Clone
where
    I: ValueInput<'t, Token = Token<'t>, Span = Span>,
{
    decl_parser(source).repeated().collect()
}

pub fn decl_parser<'t, I>(source: SourceId) -> impl Parser<'t, I, Decl, Extra<'t>> + Clone
where
    I: ValueInput<'t, Token = Token<'t>, Span = Span>,
{
    let item = choice((
        const_parser().map(|(name, decl)| (name, DeclKind::Const(decl))),
        enum_parser().map(|(name, decl)| (name, DeclKind::Enum(decl))),
        class_parser().map(|(name, decl)| (name, DeclKind::Class(decl))),
    ));

    modifiers()
        .then(item)
        .validate(move |(mods, (name, kind)), e, emitter| {
            let decl = finish_decl(source, mods, name, kind, e.span(), emitter);
            trace!("parsed {} `{}` at {}", decl.kind_name(), decl.name, decl.loc);
            decl
        })
        .boxed()
}

/// Applies the written modifiers, reporting the ones this kind of
/// declaration does not accept.
fn finish_decl<'t>(
    source: SourceId,
    mods: Modifiers,
    name: Name,
    mut kind: DeclKind,
    span: Span,
    emitter: &mut Emitter<Error<'t>>,
) -> Decl {
    let what = match kind {
        DeclKind::Const(_) => "a constant",
        DeclKind::Enum(_) => "an enum",
        DeclKind::Class(_) => "a class",
    };
    let visibility = mods
        .visibility(&TOP_LEVEL, Visibility::Internal, what)
        .unwrap_or_else(|err| {
            emitter.emit(err);
            Visibility::Internal
        });

    if let DeclKind::Class(class) = &mut kind {
        let allowed = [Modifier::Abstract, Modifier::Sealed, Modifier::Static];
        class.modifier = match mods.pick(&allowed, what) {
            Ok(Some(Modifier::Abstract)) => ClassModifier::Abstract,
            Ok(Some(Modifier::Sealed)) => ClassModifier::Sealed,
            Ok(Some(Modifier::Static)) => ClassModifier::Static,
            Ok(_) => ClassModifier::Normal,
            Err(err) => {
                emitter.emit(err);
                ClassModifier::Normal
            }
        };

        if class.modifier != ClassModifier::Abstract {
            let stray = class.members.iter().filter(|member| {
                matches!(
                    member.kind,
                    MemberKind::Method {
                        kind: MethodKind::Abstract,
                        ..
                    }
                )
            });

            for member in stray {
                emitter.emit(Rich::custom(
                    Span::from(member.name.span.start..member.name.span.end),
                    format!(
                        "abstract method `{}` in non-abstract class `{name}`",
                        member.name
                    ),
                ));
            }
        }
    } else if let Err(err) = mods.pick(&[], what) {
        emitter.emit(err);
    }

    Decl {
        name,
        visibility,
        kind,
        loc: Loc::new(source, span.into()),
    }
}

/// Grammar:
/// ```bnf
/// const ::= 'const' type IDENT '=' init ';'
/// ```
pub fn const_parser<'t, I>() -> impl Parser<'t, I, (Name, ConstDecl), Extra<'t>> + Clone
where
    I: ValueInput<'t, Token = Token<'t>, Span = Span>,
{
    kw(Kw::Const)
        .ignore_then(type_expr())
        .then(name())
        .then_ignore(ctrl(Ctrl::Assign))
        .then(init())
        .then_ignore(ctrl(Ctrl::Semi))
        .map(|((ty, name), value)| (name, ConstDecl { ty, value }))
        .boxed()
}

/// Grammar:
/// ```bnf
/// enum  ::= 'enum' '*'? IDENT '{' ( value (',' value)* ','? )? '}'
/// value ::= IDENT ( '=' '-'? NUMBER )?
/// ```
pub fn enum_parser<'t, I>() -> impl Parser<'t, I, (Name, EnumDecl), Extra<'t>> + Clone
where
    I: ValueInput<'t, Token = Token<'t>, Span = Span>,
{
    let int = select! { Token::Num(n) => n }.validate(|n: &str, e, emitter| {
        n.parse::<i64>().unwrap_or_else(|_| {
            emitter.emit(Rich::custom(
                e.span(),
                format!("enum value `{n}` is not an integer"),
            ));
            0
        })
    });

    let explicit = ctrl(Ctrl::Assign)
        .ignore_then(op("-").or_not())
        .then(int)
        .map(|(neg, n)| if neg.is_some() { -n } else { n });

    let value = name().then(explicit.or_not());

    let values = value
        .separated_by(ctrl(Ctrl::Comma))
        .allow_trailing()
        .collect::<Vec<_>>()
        .delimited_by(ctrl(Ctrl::LBrace), ctrl(Ctrl::RBrace));

    kw(Kw::Enum)
        .ignore_then(op("*").or_not())
        .then(name())
        .then(values)
        .validate(|((star, name), values), e, emitter| {
            let flags = star.is_some();
            let values = number_values(flags, values).unwrap_or_else(|| {
                emitter.emit(Rich::custom(
                    e.span(),
                    format!("values of enum `{name}` overflow"),
                ));
                Vec::new()
            });

            (name, EnumDecl { flags, values })
        })
        .boxed()
}

/// Assigns implicit values: the previous value plus one, or for flag enums
/// the next power of two above it.
fn number_values(flags: bool, values: Vec<(Name, Option<i64>)>) -> Option<Vec<EnumValue>> {
    let mut previous: Option<i64> = None;
    let mut numbered = Vec::with_capacity(values.len());

    for (name, explicit) in values {
        let value = match (explicit, previous) {
            (Some(value), _) => value,
            (None, None) if flags => 1,
            (None, None) => 0,
            (None, Some(prev)) if flags => {
                let above = u64::try_from(prev).unwrap_or(0).checked_add(1)?;
                i64::try_from(above.checked_next_power_of_two()?).ok()?
            }
            (None, Some(prev)) => prev.checked_add(1)?,
        };

        previous = Some(value);
        numbered.push(EnumValue { name, value });
    }

    Some(numbered)
}

/// Grammar:
/// ```bnf
/// class ::= 'class' IDENT ( ':' IDENT )? '{' member* '}'
/// ```
///
/// The class modifier is filled in by the enclosing declaration.
pub fn class_parser<'t, I>() -> impl Parser<'t, I, (Name, ClassDecl), Extra<'t>> + Clone
where
    I: ValueInput<'t, Token = Token<'t>, Span = Span>,
{
    kw(Kw::Class)
        .ignore_then(name())
        .then(ctrl(Ctrl::Colon).ignore_then(name()).or_not())
        .then(
            member_parser()
                .repeated()
                .collect::<Vec<_>>()
                .delimited_by(ctrl(Ctrl::LBrace), ctrl(Ctrl::RBrace)),
        )
        .map(|((name, base), members)| {
            (
                name,
                ClassDecl {
                    modifier: ClassModifier::Normal,
                    base,
                    members,
                },
            )
        })
        .boxed()
}

#[derive(Debug, Clone)]
enum Tail {
    Field(Option<Init>),
    Method(Vec<Param>, MethodBody),
}

/// Grammar:
/// ```bnf
/// member ::= modifier* ( const | type IDENT ( ('=' init)? ';' | '(' params ')' body ) )
/// params ::= ( type IDENT (',' type IDENT)* )?
/// ```
pub fn member_parser<'t, I>() -> impl Parser<'t, I, Member, Extra<'t>> + Clone
where
    I: ValueInput<'t, Token = Token<'t>, Span = Span>,
{
    let params = type_expr()
        .then(name())
        .map(|(ty, name)| Param { ty, name })
        .separated_by(ctrl(Ctrl::Comma))
        .collect::<Vec<_>>()
        .delimited_by(ctrl(Ctrl::LParen), ctrl(Ctrl::RParen));

    let tail = choice((
        ctrl(Ctrl::Assign)
            .ignore_then(init())
            .then_ignore(ctrl(Ctrl::Semi))
            .map(|init| Tail::Field(Some(init))),
        ctrl(Ctrl::Semi).map(|()| Tail::Field(None)),
        params
            .then(body_parser())
            .map(|(params, body)| Tail::Method(params, body)),
    ));

    let typed = type_expr().then(name()).then(tail);

    let item = const_parser()
        .map(|(name, decl)| (name, MemberKind::Const(decl)))
        .or(typed.map(|((ty, name), tail)| {
            let kind = match tail {
                Tail::Field(init) => MemberKind::Field { ty, init },
                Tail::Method(params, body) => MemberKind::Method {
                    kind: MethodKind::Normal,
                    ret: ty,
                    params,
                    body,
                },
            };
            (name, kind)
        }));

    modifiers()
        .then(item)
        .validate(|(mods, (name, kind)), e, emitter| {
            finish_member(mods, name, kind, e.span(), emitter)
        })
        .boxed()
}

fn finish_member<'t>(
    mods: Modifiers,
    name: Name,
    mut kind: MemberKind,
    span: Span,
    emitter: &mut Emitter<Error<'t>>,
) -> Member {
    let what = match kind {
        MemberKind::Const(_) => "a constant",
        MemberKind::Field { .. } => "a field",
        MemberKind::Method { .. } => "a method",
    };
    let visibility = mods
        .visibility(&ANY_VISIBILITY, Visibility::Private, what)
        .unwrap_or_else(|err| {
            emitter.emit(err);
            Visibility::Private
        });

    if let MemberKind::Method {
        kind: method_kind,
        body,
        ..
    } = &mut kind
    {
        let allowed = [
            Modifier::Static,
            Modifier::Abstract,
            Modifier::Virtual,
            Modifier::Override,
            Modifier::Sealed,
        ];
        *method_kind = match mods.pick(&allowed, what) {
            Ok(Some(Modifier::Static)) => MethodKind::Static,
            Ok(Some(Modifier::Abstract)) => MethodKind::Abstract,
            Ok(Some(Modifier::Virtual)) => MethodKind::Virtual,
            Ok(Some(Modifier::Override)) => MethodKind::Override,
            Ok(Some(Modifier::Sealed)) => MethodKind::Sealed,
            Ok(_) => MethodKind::Normal,
            Err(err) => {
                emitter.emit(err);
                MethodKind::Normal
            }
        };

        match (*method_kind, *body) {
            (MethodKind::Abstract, MethodBody::None) => {}
            (MethodKind::Abstract, _) => {
                let at = mods.span_of(Modifier::Abstract).unwrap_or(span);
                emitter.emit(Rich::custom(
                    at,
                    format!("abstract method `{name}` cannot have a body"),
                ));
            }
            (_, MethodBody::None) => {
                emitter.emit(Rich::custom(span, format!("method `{name}` needs a body")));
            }
            _ => {}
        }
    } else if let Err(err) = mods.pick(&[], what) {
        emitter.emit(err);
    }

    Member {
        name,
        visibility,
        kind,
        span: span.into(),
    }
}

/// Grammar:
/// ```bnf
/// body  ::= ';' | '=>' token+ ';' | block
/// block ::= '{' ( block | token )* '}'
/// ```
///
/// Statements are not parsed, only their extent is recorded.
pub fn body_parser<'t, I>() -> impl Parser<'t, I, MethodBody, Extra<'t>> + Clone
where
    I: ValueInput<'t, Token = Token<'t>, Span = Span>,
{
    let braces = [Token::Ctrl(Ctrl::LBrace), Token::Ctrl(Ctrl::RBrace)];

    let block = recursive(|block| {
        block
            .or(none_of(braces).ignored())
            .repeated()
            .delimited_by(ctrl(Ctrl::LBrace), ctrl(Ctrl::RBrace))
            .ignored()
    });

    let expr = ctrl(Ctrl::FatArrow)
        .ignore_then(
            none_of([Token::Ctrl(Ctrl::Semi)])
                .repeated()
                .at_least(1)
                .map_with(|(), e| {
                    let span: Span = e.span();
                    MethodBody::Expr(span.into())
                }),
        )
        .then_ignore(ctrl(Ctrl::Semi));

    choice((
        ctrl(Ctrl::Semi).map(|()| MethodBody::None),
        expr,
        block.map_with(|(), e| {
            let span: Span = e.span();
            MethodBody::Block(span.into())
        }),
    ))
    .labelled("method body")
    .boxed()
}

#[cfg(test)]
mod tests {
    use ci_span::SourceId;
    use ci_tree::prelude::*;

    use crate::parse_unit;

    fn parse_ok(src: &str) -> Vec<Decl> {
        match parse_unit(SourceId::new(0), src) {
            Ok(decls) => decls,
            Err(errors) => panic!("unexpected errors: {errors:?}"),
        }
    }

    fn parse_err(src: &str) -> String {
        match parse_unit(SourceId::new(0), src) {
            Ok(decls) => panic!("expected an error, got {decls:?}"),
            Err(errors) => errors[0].message.clone(),
        }
    }

    #[test]
    fn const_decl() {
        let decls = parse_ok("public const int Answer = 42;");

        assert_eq!(decls.len(), 1);
        assert_eq!(decls[0].name(), "Answer");
        assert_eq!(decls[0].visibility, Visibility::Public);
        assert_eq!(decls[0].loc.span.start, 0);
        assert_eq!(decls[0].loc.span.end, 29);
        assert_eq!(decls[0].to_string(), "public const int Answer = 42");
    }

    #[test]
    fn top_level_defaults_to_internal() {
        let decls = parse_ok("enum E { A }");
        assert_eq!(decls[0].visibility, Visibility::Internal);
    }

    #[test]
    fn enum_numbering() {
        let decls = parse_ok("enum Color { Red, Green = 5, Blue, }\nenum* Flags { A, B, C = 8, D }");

        let values = |decl: &Decl| match &decl.kind {
            DeclKind::Enum(e) => e
                .values
                .iter()
                .map(|v| (v.name.to_string(), v.value))
                .collect::<Vec<_>>(),
            other => panic!("not an enum: {other:?}"),
        };

        assert_eq!(
            values(&decls[0]),
            [("Red".to_owned(), 0), ("Green".to_owned(), 5), ("Blue".to_owned(), 6)]
        );
        assert_eq!(
            values(&decls[1]),
            [
                ("A".to_owned(), 1),
                ("B".to_owned(), 2),
                ("C".to_owned(), 8),
                ("D".to_owned(), 16)
            ]
        );
    }

    #[test]
    fn member_and_body_spans() {
        let decls = parse_ok("class C { int Twice(int x) => x * 2; void M() {} }");
        let DeclKind::Class(class) = &decls[0].kind else {
            panic!("not a class");
        };

        let spans = class
            .members
            .iter()
            .map(|member| match &member.kind {
                MemberKind::Method {
                    body: MethodBody::Expr(body) | MethodBody::Block(body),
                    ..
                } => (member.name.span.start, body.start, body.end),
                other => panic!("not a method with a body: {other:?}"),
            })
            .collect::<Vec<_>>();

        assert_eq!(spans, [(14, 30, 35), (42, 46, 48)]);
        assert!(matches!(
            class.members[0].kind,
            MemberKind::Method { body: MethodBody::Expr(_), .. }
        ));
    }

    #[test]
    fn class_with_members() {
        let src = r#"
            public abstract class Shape : Base
            {
                public const int Sides = 0;
                protected string Name = "shape";
                int[] cache;
                public abstract double Area();
                public virtual string Describe(int indent, bool verbose)
                {
                    if (verbose) { return Name; }
                    return "";
                }
                public static int Twice(int x) => x * 2;
            }
        "#;
        let decls = parse_ok(src);
        let DeclKind::Class(class) = &decls[0].kind else {
            panic!("not a class");
        };

        assert_eq!(class.modifier, ClassModifier::Abstract);
        assert_eq!(class.base.as_ref().map(Name::as_str), Some("Base"));
        assert_eq!(
            class
                .members
                .iter()
                .map(|m| m.name.as_str())
                .collect::<Vec<_>>(),
            ["Sides", "Name", "cache", "Area", "Describe", "Twice"]
        );
        assert_eq!(class.members[2].visibility, Visibility::Private);

        match &class.members[4].kind {
            MemberKind::Method {
                kind, params, body, ..
            } => {
                assert_eq!(*kind, MethodKind::Virtual);
                assert_eq!(params.len(), 2);
                assert!(matches!(body, MethodBody::Block(_)));
            }
            other => panic!("not a method: {other:?}"),
        }
    }

    #[test]
    fn source_id_is_stamped() {
        let decls = parse_unit(SourceId::new(3), "const int A = 1;").unwrap();
        assert_eq!(decls[0].loc.source, SourceId::new(3));
    }

    #[test]
    fn empty_unit() {
        assert!(parse_ok("").is_empty());
        assert!(parse_ok("// only a comment\n").is_empty());
    }

    #[test]
    fn missing_semicolon() {
        let message = parse_err("const int A = 1");
        assert!(message.starts_with("found end of input, expected"), "{message}");
        assert!(message.contains("`;`"), "{message}");
        assert!(!message.contains('\''), "{message}");
    }

    #[test]
    fn modifier_errors() {
        assert!(parse_err("private class A {}").contains("not allowed"));
        assert!(parse_err("public public enum E {}").contains("repeated modifier"));
        assert!(parse_err("abstract sealed class A {}").contains("conflicting modifiers"));
        assert!(parse_err("static const int A = 1;").contains("not allowed"));
        assert!(parse_err("class A { void M(); }").contains("needs a body"));
        assert!(parse_err("abstract class A { abstract void M() {} }").contains("cannot have a body"));
        assert!(parse_err("class A { abstract void M(); }").contains("non-abstract class"));
    }

    #[test]
    fn enum_value_must_be_integer() {
        assert!(parse_err("enum E { A = 1.5 }").contains("not an integer"));
    }

    #[test]
    fn unbalanced_block() {
        parse_err("class A { void M() { { } }");
    }
}
