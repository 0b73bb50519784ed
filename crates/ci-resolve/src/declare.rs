use std::collections::HashMap;

use ci_span::{Loc, SourceId};
use ci_tree::node::{
    ClassDecl, ClassModifier, ConstDecl, Decl, DeclKind, EnumDecl, Init, MemberKind, Name,
    TypeExpr,
};
use log::{debug, trace};

use crate::{
    context::Transaction,
    error::ResolveError,
    symbol::{DefKind, Definition, MemberDef},
};

/// Declares the top-level names of one unit and checks every reference it makes.
///
/// All names of the unit are declared before any reference is resolved, so the
/// order of declarations inside a unit does not matter. Names from later units
/// are not visible.
pub fn declare_unit(tx: &mut Transaction<'_>, decls: &[Decl]) -> Result<(), ResolveError> {
    for decl in decls {
        tx.declare(decl.name(), Definition::from_decl(decl))
            .map_err(|dup| ResolveError::Duplicate {
                name: dup.name,
                loc: decl.name_loc(),
                previous: dup.previous,
            })?;
        trace!("declared {} `{}`", decl.kind_name(), decl.name);

        check_unique_members(decl)?;
    }

    for decl in decls {
        let resolver = Resolver {
            tx: &*tx,
            source: decl.loc.source,
        };

        match &decl.kind {
            DeclKind::Const(c) => resolver.constant(c, None)?,
            DeclKind::Enum(_) => {}
            DeclKind::Class(c) => resolver.class(&decl.name, c)?,
        }
    }

    debug!("checked {} declarations", decls.len());
    Ok(())
}

fn check_unique_members(decl: &Decl) -> Result<(), ResolveError> {
    let source = decl.loc.source;

    match &decl.kind {
        DeclKind::Const(_) => Ok(()),
        DeclKind::Enum(EnumDecl { values, .. }) => {
            unique(source, decl.name(), "value", values.iter().map(|v| &v.name))
        }
        DeclKind::Class(ClassDecl { members, .. }) => {
            unique(source, decl.name(), "member", members.iter().map(|m| &m.name))?;

            for member in members {
                if let MemberKind::Method { params, .. } = &member.kind {
                    unique(
                        source,
                        member.name.as_str(),
                        "parameter",
                        params.iter().map(|p| &p.name),
                    )?;
                }
            }

            Ok(())
        }
    }
}

fn unique<'a>(
    source: SourceId,
    owner: &str,
    what: &'static str,
    names: impl IntoIterator<Item = &'a Name>,
) -> Result<(), ResolveError> {
    let mut seen = HashMap::new();

    for name in names {
        if let Some(previous) = seen.insert(name.as_str(), name.span) {
            return Err(ResolveError::DuplicateMember {
                owner: owner.to_owned(),
                what,
                name: name.to_string(),
                loc: Loc::new(source, name.span),
                previous: Loc::new(source, previous),
            });
        }
    }

    Ok(())
}

struct Resolver<'r, 'a> {
    tx: &'r Transaction<'a>,
    source: SourceId,
}

impl Resolver<'_, '_> {
    fn loc(&self, name: &Name) -> Loc {
        Loc::new(self.source, name.span)
    }

    fn lookup(&self, name: &Name) -> Result<&Definition, ResolveError> {
        self.tx
            .lookup(name.as_str())
            .ok_or_else(|| ResolveError::Unresolved {
                name: name.to_string(),
                loc: self.loc(name),
            })
    }

    fn class(&self, name: &Name, class: &ClassDecl) -> Result<(), ResolveError> {
        if let Some(base) = &class.base {
            self.base(name, base)?;
        }

        for member in &class.members {
            match &member.kind {
                MemberKind::Const(c) => self.constant(c, Some(class))?,
                MemberKind::Field { ty, init } => {
                    self.ty(ty, false)?;
                    if let Some(init) = init {
                        self.init(init, Some(class))?;
                    }
                }
                MemberKind::Method { ret, params, .. } => {
                    self.ty(ret, true)?;
                    for param in params {
                        self.ty(&param.ty, false)?;
                    }
                }
            }
        }

        Ok(())
    }

    fn base(&self, name: &Name, base: &Name) -> Result<(), ResolveError> {
        let loc = self.loc(base);

        match &self.lookup(base)?.kind {
            DefKind::Class { modifier, .. } => match modifier {
                ClassModifier::Sealed | ClassModifier::Static => {
                    return Err(ResolveError::SealedBase {
                        name: name.to_string(),
                        base: base.to_string(),
                        modifier: *modifier,
                        loc,
                    });
                }
                ClassModifier::Normal | ClassModifier::Abstract => {}
            },
            _ => return Err(self.mismatch(base, "a class")),
        }

        // A cycle further up the chain that does not pass through `name`
        // belongs to the classes on it and is reported when they are checked.
        let mut chain = vec![name.as_str()];
        let mut next = base.as_str();

        while let Some(DefKind::Class {
            base: Some(parent),
            ..
        }) = self.tx.lookup(next).map(|def| &def.kind)
        {
            if next == name.as_str() {
                return Err(ResolveError::CyclicBase {
                    name: name.to_string(),
                    loc,
                });
            }
            if chain.contains(&next) {
                break;
            }

            chain.push(next);
            next = parent;
        }

        Ok(())
    }

    fn constant(&self, c: &ConstDecl, scope: Option<&ClassDecl>) -> Result<(), ResolveError> {
        self.ty(&c.ty, false)?;
        self.init(&c.value, scope)
    }

    fn ty(&self, ty: &TypeExpr, allow_void: bool) -> Result<(), ResolveError> {
        if ty.name.as_str() == "void" {
            return if allow_void && ty.rank == 0 && !ty.nullable {
                Ok(())
            } else {
                Err(ResolveError::VoidValue {
                    loc: self.loc(&ty.name),
                })
            };
        }

        let def = self.lookup(&ty.name)?;
        if def.is_type() {
            Ok(())
        } else {
            Err(self.mismatch(&ty.name, "a type"))
        }
    }

    fn init(&self, init: &Init, scope: Option<&ClassDecl>) -> Result<(), ResolveError> {
        let Init::Ref(path) = init else {
            return Ok(());
        };

        match path.as_slice() {
            [name] => {
                // Constants of the enclosing class shadow top-level names
                let local = scope.is_some_and(|class| {
                    class
                        .members
                        .iter()
                        .any(|m| m.name.as_str() == name.as_str() && matches!(m.kind, MemberKind::Const(_)))
                });

                if local || matches!(self.lookup(name)?.kind, DefKind::Const { .. }) {
                    Ok(())
                } else {
                    Err(self.mismatch(name, "a constant"))
                }
            }
            [owner, member] => {
                let found = match &self.lookup(owner)?.kind {
                    DefKind::Enum { values, .. } => values.contains_key(member.as_str()),
                    DefKind::Class { members, .. } => match members.get(member.as_str()) {
                        Some(MemberDef::Const) => true,
                        Some(other) => {
                            return Err(ResolveError::KindMismatch {
                                name: format!("{owner}.{member}"),
                                loc: self.loc(member),
                                expected: "a constant",
                                found: match other {
                                    MemberDef::Field => "a field",
                                    _ => "a method",
                                },
                            });
                        }
                        None => false,
                    },
                    _ => return Err(self.mismatch(owner, "an enum or class")),
                };

                if found {
                    Ok(())
                } else {
                    Err(ResolveError::NoMember {
                        owner: owner.to_string(),
                        name: member.to_string(),
                        loc: self.loc(member),
                    })
                }
            }
            // The parser never produces longer paths
            _ => Ok(()),
        }
    }

    fn mismatch(&self, name: &Name, expected: &'static str) -> ResolveError {
        let found = self
            .tx
            .lookup(name.as_str())
            .map_or("undeclared", Definition::describe);

        ResolveError::KindMismatch {
            name: name.to_string(),
            loc: self.loc(name),
            expected,
            found,
        }
    }
}
