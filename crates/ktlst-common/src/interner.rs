//! String Interner for identifier deduplication.
//!
//! Identifiers are interned per compilation unit and passed around as u32
//! indices (Atoms). Scope lookups during attribution compare atoms instead of
//! strings.

use rustc_hash::FxHashMap;
use serde::Serialize;
use std::sync::Arc;

/// An interned string identifier.
///
/// Atoms are cheap to copy (just a u32) and can be compared with == in O(1).
/// To get the actual string, use `Interner::resolve(atom)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Default, PartialOrd, Ord)]
pub struct Atom(pub u32);

impl Atom {
    /// A sentinel value representing no atom / empty string.
    pub const NONE: Atom = Atom(0);

    /// Check if this is the empty/none atom.
    #[inline]
    pub fn is_none(self) -> bool {
        self.0 == 0
    }

    /// Get the raw index value.
    #[inline]
    pub fn index(self) -> u32 {
        self.0
    }
}

const COMMON_STRINGS: &[&str] = &[
    // Keywords
    "package",
    "import",
    "class",
    "interface",
    "object",
    "companion",
    "fun",
    "val",
    "var",
    "this",
    "super",
    "null",
    "return",
    // Common identifiers
    "id",
    "name",
    "value",
    "kotlin",
    "java",
    "Int",
    "Long",
    "String",
    "Boolean",
    "Any",
    "Unit",
    "Companion",
    "toString",
    "equals",
    "hashCode",
];

/// String interner that deduplicates strings and returns Atom handles.
///
/// # Example
/// ```
/// use ktlst_common::interner::Interner;
/// let mut interner = Interner::new();
/// let a1 = interner.intern("hello");
/// let a2 = interner.intern("hello");
/// assert_eq!(a1, a2); // Same atom for same string
/// assert_eq!(interner.resolve(a1), "hello");
/// ```
#[derive(Clone, Debug)]
pub struct Interner {
    /// Map from string to atom index
    map: FxHashMap<Arc<str>, Atom>,
    /// Vector of all interned strings (index 0 is empty string)
    strings: Vec<Arc<str>>,
}

impl Default for Interner {
    fn default() -> Self {
        Self::new()
    }
}

impl Interner {
    /// Create a new interner with the empty string pre-interned at index 0.
    pub fn new() -> Self {
        let mut interner = Interner {
            map: FxHashMap::default(),
            strings: Vec::with_capacity(256),
        };
        // Index 0 is reserved for empty/none
        let empty: Arc<str> = Arc::from("");
        interner.strings.push(empty.clone());
        interner.map.insert(empty, Atom::NONE);
        interner.intern_common();
        interner
    }

    /// Pre-intern keywords and frequent identifiers so their atoms are stable.
    fn intern_common(&mut self) {
        for s in COMMON_STRINGS {
            self.intern(s);
        }
    }

    /// Intern a string, returning its Atom handle.
    /// If the string was already interned, returns the existing Atom.
    #[inline]
    pub fn intern(&mut self, s: &str) -> Atom {
        if let Some(&atom) = self.map.get(s) {
            return atom;
        }
        let atom = Atom(self.strings.len() as u32);
        let owned: Arc<str> = Arc::from(s);
        self.strings.push(owned.clone());
        self.map.insert(owned, atom);
        atom
    }

    /// Look up an atom without interning.
    #[inline]
    pub fn lookup(&self, s: &str) -> Option<Atom> {
        self.map.get(s).copied()
    }

    /// Resolve an atom back to its string.
    /// Returns an empty string for out-of-range atoms.
    #[inline]
    pub fn resolve(&self, atom: Atom) -> &str {
        self.strings
            .get(atom.0 as usize)
            .map(|s| s.as_ref())
            .unwrap_or("")
    }

    /// Number of interned strings, including the empty string.
    pub fn len(&self) -> usize {
        self.strings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strings.len() <= 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intern_dedup() {
        let mut interner = Interner::new();
        let a = interner.intern("ByteBuffer");
        let b = interner.intern("ByteBuffer");
        assert_eq!(a, b);
        assert_eq!(interner.resolve(a), "ByteBuffer");
    }

    #[test]
    fn test_none_atom_is_empty() {
        let interner = Interner::new();
        assert!(Atom::NONE.is_none());
        assert_eq!(interner.resolve(Atom::NONE), "");
        assert_eq!(interner.lookup(""), Some(Atom::NONE));
    }

    #[test]
    fn test_common_strings_preinterned() {
        let interner = Interner::new();
        assert!(interner.lookup("this").is_some());
        assert!(interner.lookup("Companion").is_some());
        assert!(interner.lookup("definitelyNotCommon").is_none());
    }
}
