//! Interned atoms.
//!
//! An atom is a symbol with O(1) equality: two atoms compare equal iff they
//! were interned from equal strings in the same table. Atom/exception
//! tables are per-instance, not global, so instances can run on separate
//! threads without contending on a shared lock. Callers own an
//! [`AtomTable`] (typically one per interpreter instance) and intern into
//! it explicitly, rather than reaching for a process-wide registry.

use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

/// An interned symbol. Cheap to copy and compare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Atom(u32);

impl Atom {
    pub fn id(self) -> u32 {
        self.0
    }
}

/// Per-instance string interner.
///
/// String-atom creation is O(1) after first insertion.
#[derive(Debug, Default)]
pub struct AtomTable {
    by_text: HashMap<Rc<str>, Atom>,
    by_id: Vec<Rc<str>>,
}

impl AtomTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Intern `text`, returning its atom. Re-interning an equal string
    /// returns the same atom.
    pub fn intern(&mut self, text: &str) -> Atom {
        if let Some(atom) = self.by_text.get(text) {
            return *atom;
        }
        let rc: Rc<str> = Rc::from(text);
        let atom = Atom(self.by_id.len() as u32);
        self.by_id.push(rc.clone());
        self.by_text.insert(rc, atom);
        atom
    }

    /// Look up an already-interned atom's text without interning.
    pub fn text(&self, atom: Atom) -> &str {
        &self.by_id[atom.0 as usize]
    }

    /// Look up an atom by text if it has already been interned, without
    /// interning it.
    pub fn lookup(&self, text: &str) -> Option<Atom> {
        self.by_text.get(text).copied()
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }
}

impl fmt::Display for Atom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#atom:{}", self.0)
    }
}
