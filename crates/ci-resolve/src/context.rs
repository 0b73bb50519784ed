use ci_utils::interner::{StrInterner, StrKey};
use indexmap::IndexMap;
use log::trace;

use crate::{
    error::DuplicateSymbol,
    symbol::{BUILTINS, Definition},
};

/// The names known to a run: built-in types plus everything declared by the
/// files parsed so far.
///
/// Bindings are append-only. A name bound in either scope cannot be bound
/// again.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolutionContext {
    interner: StrInterner,
    system: IndexMap<StrKey, Definition>,
    program: IndexMap<StrKey, Definition>,
}

impl Default for ResolutionContext {
    fn default() -> Self {
        Self::new()
    }
}

impl ResolutionContext {
    pub fn new() -> Self {
        let mut interner = StrInterner::with_capacity(BUILTINS.len());
        let system = BUILTINS
            .iter()
            .map(|&name| (interner.intern(name), Definition::builtin()))
            .collect();

        Self {
            interner,
            system,
            program: IndexMap::new(),
        }
    }

    pub fn declare(&mut self, name: &str, def: Definition) -> Result<(), DuplicateSymbol> {
        if let Some(previous) = self.lookup(name) {
            return Err(DuplicateSymbol {
                name: name.to_owned(),
                origin: def.origin,
                previous: previous.origin,
            });
        }

        self.bind(name, def);
        Ok(())
    }

    fn bind(&mut self, name: &str, def: Definition) {
        trace!("bind `{name}` ({}) at {}", def.describe(), def.origin);

        let key = self.interner.intern(name);
        self.program.insert(key, def);
    }

    /// Program scope first, then the built-in types.
    pub fn lookup(&self, name: &str) -> Option<&Definition> {
        let key = self.interner.lookup(name)?;
        self.program.get(&key).or_else(|| self.system.get(&key))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.lookup(name).is_some()
    }

    /// Program symbols in declaration order.
    pub fn symbols(&self) -> impl Iterator<Item = (&str, &Definition)> {
        self.program
            .iter()
            .map(|(&key, def)| (&self.interner[key], def))
    }

    /// Number of program symbols.
    pub fn len(&self) -> usize {
        self.program.len()
    }

    pub fn is_empty(&self) -> bool {
        self.program.is_empty()
    }

    /// Stages declarations on top of this context.
    ///
    /// Nothing becomes visible here until [`Transaction::commit`]; dropping the
    /// transaction discards every staged symbol.
    pub fn transaction(&mut self) -> Transaction<'_> {
        Transaction {
            context: self,
            pending: IndexMap::new(),
        }
    }
}

#[derive(Debug)]
pub struct Transaction<'a> {
    context: &'a mut ResolutionContext,
    pending: IndexMap<String, Definition>,
}

impl Transaction<'_> {
    pub fn declare(&mut self, name: &str, def: Definition) -> Result<(), DuplicateSymbol> {
        if let Some(previous) = self.lookup(name) {
            return Err(DuplicateSymbol {
                name: name.to_owned(),
                origin: def.origin,
                previous: previous.origin,
            });
        }

        self.pending.insert(name.to_owned(), def);
        Ok(())
    }

    /// Staged symbols first, then the committed context.
    pub fn lookup(&self, name: &str) -> Option<&Definition> {
        self.pending
            .get(name)
            .or_else(|| self.context.lookup(name))
    }

    pub fn pending(&self) -> impl Iterator<Item = (&str, &Definition)> {
        self.pending.iter().map(|(name, def)| (name.as_str(), def))
    }

    /// Appends the staged symbols to the context, in the order they were declared.
    pub fn commit(self) {
        let Self { context, pending } = self;

        for (name, def) in pending {
            context.bind(&name, def);
        }
    }
}
