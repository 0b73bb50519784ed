use std::borrow::Cow;
use std::collections::HashMap;
use std::fmt;
use std::ops::Index;
use std::rc::Rc;

/// A key into a [`StrInterner`].
///
/// Keys are only meaningful for the interner that produced them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct StrKey(u32);

impl fmt::Display for StrKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "'s{}", self.0)
    }
}

/// Stores each distinct string exactly once and hands out small copyable keys.
///
/// Strings are shared between the lookup map and the value table through
/// `Rc<str>`, so interning an already known string never allocates.
/// Interned strings are never removed.
#[derive(Clone, Default)]
pub struct StrInterner {
    values: Vec<Rc<str>>,
    map: HashMap<Rc<str>, StrKey>,
}

impl fmt::Debug for StrInterner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.values.iter()).finish()
    }
}

impl PartialEq for StrInterner {
    fn eq(&self, other: &Self) -> bool {
        self.values == other.values
    }
}

impl Eq for StrInterner {}

impl StrInterner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            values: Vec::with_capacity(capacity),
            map: HashMap::with_capacity(capacity),
        }
    }

    /// Interns a string, returning its key.
    ///
    /// If the string is already interned, returns its existing key.
    pub fn intern<'a>(&mut self, value: impl Into<Cow<'a, str>>) -> StrKey {
        let value = value.into();

        if let Some(&key) = self.map.get(value.as_ref()) {
            return key;
        }

        let key = StrKey(self.values.len() as u32);
        let shared: Rc<str> = Rc::from(value.into_owned());

        self.values.push(Rc::clone(&shared));
        self.map.insert(shared, key);

        key
    }

    /// Looks up the key of an already interned string without interning it.
    pub fn lookup(&self, value: &str) -> Option<StrKey> {
        self.map.get(value).copied()
    }

}

impl Index<StrKey> for StrInterner {
    type Output = str;

    fn index(&self, key: StrKey) -> &Self::Output {
        &self.values[key.0 as usize]
    }
}
