//! Object container.
//!
//! Ordered mapping of string keys to variants. Insertion order is
//! preserved in a `Vec`; a side `HashMap` gives O(1) amortised lookup,
//! pairing a hash index with an ordered list rather than relying on a
//! single structure to do both jobs.

use crate::observer::{Listeners, MutationOp, PostObserver, PreObserver};
use crate::reverse_update::ParentEdges;
use crate::set::SetInner;
use purc_core::value::{Container, ContainerKind};
use purc_core::{PurcError, PurcErrorKind, Result, Variant, serialize};
use std::any::Any;
use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::{Rc, Weak};

pub(crate) struct ObjectInner {
    entries: RefCell<Vec<(Rc<str>, Variant)>>,
    index: RefCell<HashMap<Rc<str>, usize>>,
    listeners: Listeners,
    parents: ParentEdges,
}

impl fmt::Debug for ObjectInner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObjectInner")
            .field("len", &self.entries.borrow().len())
            .finish()
    }
}

/// A handle to an object variant's container. Cloning is O(1) (shared
/// `Rc`); every clone observes the same mutable storage.
#[derive(Debug, Clone)]
pub struct Object(pub(crate) Rc<ObjectInner>);

impl Object {
    pub fn new() -> Self {
        Object(Rc::new(ObjectInner {
            entries: RefCell::new(Vec::new()),
            index: RefCell::new(HashMap::new()),
            listeners: Listeners::new(),
            parents: ParentEdges::new(),
        }))
    }

    pub fn from_pairs(pairs: impl IntoIterator<Item = (impl Into<Rc<str>>, Variant)>) -> Self {
        let obj = Self::new();
        for (k, v) in pairs {
            // First-construction path: no observers exist yet and no
            // ancestors can exist yet, so the gate is bypassed.
            obj.insert_unchecked(k.into(), v);
        }
        obj
    }

    fn insert_unchecked(&self, key: Rc<str>, value: Variant) {
        let mut entries = self.0.entries.borrow_mut();
        let mut index = self.0.index.borrow_mut();
        if let Some(&pos) = index.get(&key) {
            entries[pos].1 = value;
        } else {
            index.insert(key.clone(), entries.len());
            entries.push((key, value));
        }
    }

    pub fn len(&self) -> usize {
        self.0.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get_by_ckey(&self, key: &str) -> Option<Variant> {
        let index = self.0.index.borrow();
        let pos = *index.get(key)?;
        Some(self.0.entries.borrow()[pos].1.clone())
    }

    pub fn keys(&self) -> Vec<Rc<str>> {
        self.0
            .entries
            .borrow()
            .iter()
            .map(|(k, _)| k.clone())
            .collect()
    }

    pub fn entries_snapshot(&self) -> Vec<(Rc<str>, Variant)> {
        self.0.entries.borrow().clone()
    }

    pub fn observe_pre(&self, f: PreObserver) {
        self.0.listeners.observe_pre(f);
    }

    pub fn observe_post(&self, f: PostObserver) {
        self.0.listeners.observe_post(f);
    }

    /// `object_set_by_ckey`: insert or replace `key`. Replacing an
    /// existing key preserves its list position.
    pub fn set_by_ckey(&self, key: &str, value: Variant) -> Result<()> {
        let existing = self.get_by_ckey(key);
        let op = if existing.is_some() {
            MutationOp::Change
        } else {
            MutationOp::Grow
        };
        let affected = match &existing {
            Some(old) => vec![old.clone(), value.clone()],
            None => vec![value.clone()],
        };

        if !self.0.listeners.fire_pre(op, &affected) {
            return Err(PurcError::new(
                PurcErrorKind::ObserverVetoed,
                "object_set_by_ckey vetoed by a pre-change observer",
            ));
        }

        // Build the prospective post-mutation field list without touching
        // `self` yet, so the reverse-check can be attempted and aborted
        // without leaving the object half-mutated.
        let mut candidate = self.0.entries.borrow().clone();
        match self.0.index.borrow().get(key) {
            Some(&pos) => candidate[pos].1 = value.clone(),
            None => candidate.push((Rc::from(key), value.clone())),
        }

        for parent in self.0.parents.live_parents() {
            parent.validate_replacement(&self.0, &candidate)?;
        }

        self.insert_unchecked(Rc::from(key), value);

        for parent in self.0.parents.live_parents() {
            parent.rekey_member(&self.0);
        }

        self.0.listeners.fire_post(op, &affected);
        Ok(())
    }

    /// `object_remove_by_ckey`.
    pub fn remove_by_ckey(&self, key: &str) -> Result<Variant> {
        let Some(old) = self.get_by_ckey(key) else {
            return Err(PurcError::new(
                PurcErrorKind::NotFound,
                format!("object has no key '{key}'"),
            ));
        };

        if !self
            .0
            .listeners
            .fire_pre(MutationOp::Shrink, std::slice::from_ref(&old))
        {
            return Err(PurcError::new(
                PurcErrorKind::ObserverVetoed,
                "object_remove_by_ckey vetoed by a pre-change observer",
            ));
        }

        let candidate: Vec<_> = self
            .0
            .entries
            .borrow()
            .iter()
            .filter(|(k, _)| k.as_ref() != key)
            .cloned()
            .collect();
        for parent in self.0.parents.live_parents() {
            parent.validate_replacement(&self.0, &candidate)?;
        }

        {
            let mut entries = self.0.entries.borrow_mut();
            let mut index = self.0.index.borrow_mut();
            let pos = *index.get(key).expect("checked present above");
            entries.remove(pos);
            index.remove(key);
            for v in index.values_mut() {
                if *v > pos {
                    *v -= 1;
                }
            }
        }

        for parent in self.0.parents.live_parents() {
            parent.rekey_member(&self.0);
        }

        self.0
            .listeners
            .fire_post(MutationOp::Shrink, std::slice::from_ref(&old));
        Ok(old)
    }

    pub(crate) fn link_parent(&self, parent: Weak<SetInner>) {
        self.0.parents.add(parent);
    }

    pub(crate) fn unlink_parent(&self, parent: &Weak<SetInner>) {
        self.0.parents.remove(parent);
    }

    pub(crate) fn inner_rc(&self) -> Rc<ObjectInner> {
        self.0.clone()
    }

    pub fn to_variant(&self) -> Variant {
        Variant::make_container(self.0.clone())
    }
}

impl Default for Object {
    fn default() -> Self {
        Self::new()
    }
}

impl ObjectInner {
    /// Read access to the field list, for `set.rs`'s uniqueness-key
    /// extraction. Kept internal to the crate: external callers go through
    /// `Object`.
    pub(crate) fn entries(&self) -> std::cell::Ref<'_, Vec<(Rc<str>, Variant)>> {
        self.entries.borrow()
    }
}

pub(crate) fn field_from_entries(entries: &[(Rc<str>, Variant)], name: &str) -> Variant {
    entries
        .iter()
        .find(|(k, _)| k.as_ref() == name)
        .map(|(_, v)| v.clone())
        .unwrap_or(Variant::Undefined)
}

impl Container for ObjectInner {
    fn kind(&self) -> ContainerKind {
        ContainerKind::Object
    }

    fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    fn iter_values(&self) -> Box<dyn Iterator<Item = Variant> + '_> {
        let snapshot: Vec<Variant> = self.entries.borrow().iter().map(|(_, v)| v.clone()).collect();
        Box::new(snapshot.into_iter())
    }

    fn deep_eq(&self, other: &dyn Container) -> bool {
        let Some(other) = other.as_any().downcast_ref::<ObjectInner>() else {
            return false;
        };
        let a = self.entries.borrow();
        let b = other.entries.borrow();
        if a.len() != b.len() {
            return false;
        }
        a.iter()
            .all(|(k, v)| b.iter().any(|(k2, v2)| k == k2 && v == v2))
    }

    fn write_json(&self, out: &mut String, flags: u32) {
        let pretty = flags & serialize::PRETTY != 0;
        let spaced = flags & serialize::SPACED != 0 || pretty;
        out.push('{');
        let entries = self.entries.borrow();
        for (i, (k, v)) in entries.iter().enumerate() {
            if i > 0 {
                out.push(',');
                if spaced {
                    out.push(' ');
                }
            }
            serialize::escape_json_string(k, out, flags);
            out.push(':');
            if spaced {
                out.push(' ');
            }
            serialize::write_json(v, out, flags);
        }
        out.push('}');
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn into_any_rc(self: Rc<Self>) -> Rc<dyn Any> {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_then_get_round_trips() {
        let obj = Object::new();
        obj.set_by_ckey("a", Variant::make_number(1.0)).unwrap();
        assert_eq!(obj.get_by_ckey("a"), Some(Variant::make_number(1.0)));
    }

    #[test]
    fn replacing_a_key_preserves_position() {
        let obj = Object::new();
        obj.set_by_ckey("a", Variant::make_number(1.0)).unwrap();
        obj.set_by_ckey("b", Variant::make_number(2.0)).unwrap();
        obj.set_by_ckey("a", Variant::make_number(9.0)).unwrap();
        let keys = obj.keys();
        assert_eq!(keys.iter().map(|k| k.as_ref()).collect::<Vec<_>>(), ["a", "b"]);
        assert_eq!(obj.get_by_ckey("a"), Some(Variant::make_number(9.0)));
    }

    #[test]
    fn remove_missing_key_is_not_found() {
        let obj = Object::new();
        let err = obj.remove_by_ckey("missing").unwrap_err();
        assert_eq!(err.kind, PurcErrorKind::NotFound);
    }

    #[test]
    fn veto_blocks_mutation_and_leaves_object_unchanged() {
        let obj = Object::new();
        obj.observe_pre(Rc::new(|_, _| false));
        let err = obj.set_by_ckey("a", Variant::make_number(1.0)).unwrap_err();
        assert_eq!(err.kind, PurcErrorKind::ObserverVetoed);
        assert_eq!(obj.len(), 0);
    }

    #[test]
    fn idempotent_set_same_value_twice() {
        let obj = Object::new();
        obj.set_by_ckey("k", Variant::make_number(1.0)).unwrap();
        obj.set_by_ckey("k", Variant::make_number(1.0)).unwrap();
        assert_eq!(obj.len(), 1);
        assert_eq!(obj.get_by_ckey("k"), Some(Variant::make_number(1.0)));
    }

    #[test]
    fn stringify_preserves_insertion_order() {
        let obj = Object::from_pairs([
            (Rc::<str>::from("b"), Variant::make_number(2.0)),
            (Rc::<str>::from("a"), Variant::make_number(1.0)),
        ]);
        assert_eq!(
            purc_core::stringify(&obj.to_variant(), 0),
            "{\"b\":2,\"a\":1}"
        );
    }
}
