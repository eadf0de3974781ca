//! Set container.
//!
//! A set of object-variants identified by a uniqueness-key tuple (or, when
//! the tuple is empty, by the whole object value). The index is Rust's
//! `BTreeMap`, the idiomatic ordered-map primitive, rebuilt wholesale after
//! each structural change rather than patched node-by-node on every
//! mutation — a much simpler and more obviously-correct trade for the
//! O(n log n) rebuild cost.

use crate::object::{Object, ObjectInner};
use crate::observer::{Listeners, MutationOp, PostObserver, PreObserver};
use purc_core::value::{Container, ContainerKind};
use purc_core::{PurcError, PurcErrorKind, Result, Variant, serialize, stringify};
use std::any::Any;
use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::rc::Rc;

/// Response to a duplicate on `Set::add`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrMethod {
    Ignore,
    Overwrite,
    Complain,
}

/// Response to a not-found on `Set::remove`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NrMethod {
    Ignore,
    Complain,
}

/// The uniqueness key computed for one member, used both as the `BTreeMap`
/// key and as the equality test: composite comparison is lexicographic
/// over the tuple. Representing each field as its canonical plain-text
/// form makes `Ord`/`Eq` fall out of `Vec<String>`'s derived impls while
/// still matching field-wise comparison, including the caseless fold.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub(crate) enum UniqueKey {
    Whole(String),
    Fields(Vec<String>),
}

fn fold_case(s: String, caseless: bool) -> String {
    if caseless { s.to_lowercase() } else { s }
}

fn compute_key(unique_keys: &[Rc<str>], caseless: bool, obj: &ObjectInner) -> UniqueKey {
    if unique_keys.is_empty() {
        let mut entries = obj.entries().clone();
        entries.sort_by(|a, b| a.0.as_ref().cmp(b.0.as_ref()));
        let mut out = String::from("{");
        for (i, (k, v)) in entries.iter().enumerate() {
            if i > 0 {
                out.push(',');
            }
            out.push_str(k);
            out.push(':');
            out.push_str(&stringify(v, serialize::PLAIN));
        }
        out.push('}');
        UniqueKey::Whole(fold_case(out, caseless))
    } else {
        let entries = obj.entries();
        let fields = unique_keys
            .iter()
            .map(|name| {
                let v = crate::object::field_from_entries(&entries, name);
                fold_case(stringify(&v, serialize::PLAIN), caseless)
            })
            .collect();
        UniqueKey::Fields(fields)
    }
}

pub(crate) struct SetInner {
    unique_keys: Vec<Rc<str>>,
    caseless: bool,
    members: RefCell<Vec<Rc<ObjectInner>>>,
    index: RefCell<BTreeMap<UniqueKey, usize>>,
    listeners: Listeners,
}

impl fmt::Debug for SetInner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SetInner")
            .field("len", &self.members.borrow().len())
            .field("unique_keys", &self.unique_keys)
            .finish()
    }
}

/// A handle to a set variant's container.
#[derive(Debug, Clone)]
pub struct Set(Rc<SetInner>);

impl Set {
    pub fn new(unique_keys: impl IntoIterator<Item = impl Into<Rc<str>>>, caseless: bool) -> Self {
        Set(Rc::new(SetInner {
            unique_keys: unique_keys.into_iter().map(Into::into).collect(),
            caseless,
            members: RefCell::new(Vec::new()),
            index: RefCell::new(BTreeMap::new()),
            listeners: Listeners::new(),
        }))
    }

    pub fn len(&self) -> usize {
        self.0.members.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn observe_pre(&self, f: PreObserver) {
        self.0.listeners.observe_pre(f);
    }

    pub fn observe_post(&self, f: PostObserver) {
        self.0.listeners.observe_post(f);
    }

    fn key_of(&self, obj: &ObjectInner) -> UniqueKey {
        compute_key(&self.0.unique_keys, self.0.caseless, obj)
    }

    fn rebuild_index(&self) {
        let mut index = self.0.index.borrow_mut();
        index.clear();
        for (i, member) in self.0.members.borrow().iter().enumerate() {
            index.insert(self.key_of(member), i);
        }
    }

    /// `set_add`: insert `obj`, resolving a duplicate per `cr_method`.
    pub fn add(&self, obj: &Object, cr_method: CrMethod) -> Result<()> {
        let inner = obj.inner_rc();
        let key = self.key_of(&inner);
        let existing = self.0.index.borrow().get(&key).copied();

        let (op, affected, replace_at) = match existing {
            None => (MutationOp::Grow, vec![obj.to_variant()], None),
            Some(pos) => match cr_method {
                CrMethod::Ignore => return Ok(()),
                CrMethod::Complain => {
                    return Err(PurcError::new(
                        PurcErrorKind::Duplicated,
                        "set_add: duplicate under the unique-key tuple",
                    ));
                }
                CrMethod::Overwrite => {
                    let old = Variant::make_container(self.0.members.borrow()[pos].clone());
                    (MutationOp::Change, vec![old, obj.to_variant()], Some(pos))
                }
            },
        };

        if !self.0.listeners.fire_pre(op, &affected) {
            return Err(PurcError::new(
                PurcErrorKind::ObserverVetoed,
                "set_add vetoed by a pre-change observer",
            ));
        }

        match replace_at {
            Some(pos) => {
                let old = self.0.members.borrow()[pos].clone();
                obj.link_parent(Rc::downgrade(&self.0));
                Object(old).unlink_parent_from(Rc::downgrade(&self.0));
                self.0.members.borrow_mut()[pos] = inner;
            }
            None => {
                obj.link_parent(Rc::downgrade(&self.0));
                self.0.members.borrow_mut().push(inner);
            }
        }
        self.rebuild_index();
        self.0.listeners.fire_post(op, &affected);
        Ok(())
    }

    /// `set_remove`.
    pub fn remove(&self, obj: &Object, nr_method: NrMethod) -> Result<()> {
        let inner = obj.inner_rc();
        let key = self.key_of(&inner);
        let Some(pos) = self.0.index.borrow().get(&key).copied() else {
            return match nr_method {
                NrMethod::Ignore => Ok(()),
                NrMethod::Complain => Err(PurcError::new(
                    PurcErrorKind::NotFound,
                    "set_remove: value is not a member",
                )),
            };
        };

        let removed = self.0.members.borrow()[pos].clone();
        let affected = vec![Variant::make_container(removed.clone())];
        if !self.0.listeners.fire_pre(MutationOp::Shrink, &affected) {
            return Err(PurcError::new(
                PurcErrorKind::ObserverVetoed,
                "set_remove vetoed by a pre-change observer",
            ));
        }

        self.0.members.borrow_mut().remove(pos);
        Object(removed).unlink_parent_from(Rc::downgrade(&self.0));
        self.rebuild_index();
        self.0.listeners.fire_post(MutationOp::Shrink, &affected);
        Ok(())
    }

    pub fn get_by_key_values(&self, values: &[Variant]) -> Option<Variant> {
        let folded: Vec<String> = values
            .iter()
            .map(|v| fold_case(stringify(v, serialize::PLAIN), self.0.caseless))
            .collect();
        let key = if self.0.unique_keys.is_empty() {
            return None;
        } else {
            UniqueKey::Fields(folded)
        };
        let pos = *self.0.index.borrow().get(&key)?;
        Some(Variant::make_container(self.0.members.borrow()[pos].clone()))
    }

    pub fn get_by_index(&self, i: usize) -> Option<Variant> {
        self.0
            .members
            .borrow()
            .get(i)
            .map(|m| Variant::make_container(m.clone()))
    }

    pub fn remove_by_index(&self, i: usize) -> Result<Variant> {
        let members = self.0.members.borrow();
        let Some(member) = members.get(i).cloned() else {
            return Err(PurcError::new(
                PurcErrorKind::OutOfBounds,
                format!("set index {i} out of bounds"),
            ));
        };
        drop(members);
        let obj = Object(member.clone());
        self.remove(&obj, NrMethod::Complain)?;
        Ok(Variant::make_container(member))
    }

    /// `set_remove_by_key_values`.
    pub fn remove_by_key_values(&self, values: &[Variant], nr_method: NrMethod) -> Result<Variant> {
        if self.0.unique_keys.is_empty() {
            return Err(PurcError::new(
                PurcErrorKind::NotSupported,
                "set_remove_by_key_values: set has no unique-key tuple",
            ));
        }
        let folded: Vec<String> = values
            .iter()
            .map(|v| fold_case(stringify(v, serialize::PLAIN), self.0.caseless))
            .collect();
        let key = UniqueKey::Fields(folded);
        let Some(pos) = self.0.index.borrow().get(&key).copied() else {
            return match nr_method {
                NrMethod::Ignore => Ok(Variant::make_undefined()),
                NrMethod::Complain => Err(PurcError::new(
                    PurcErrorKind::NotFound,
                    "set_remove_by_key_values: no member with a matching unique key",
                )),
            };
        };
        let member = self.0.members.borrow()[pos].clone();
        let obj = Object(member);
        self.remove(&obj, NrMethod::Complain)?;
        Ok(obj.to_variant())
    }

    /// `set_set_by_index`: replace the member at position `i`, re-validating
    /// that its unique key doesn't collide with any other member's.
    pub fn set_by_index(&self, i: usize, obj: &Object) -> Result<()> {
        let Some(old) = self.0.members.borrow().get(i).cloned() else {
            return Err(PurcError::new(
                PurcErrorKind::OutOfBounds,
                format!("set index {i} out of bounds"),
            ));
        };

        let new_inner = obj.inner_rc();
        let new_key = self.key_of(&new_inner);
        if let Some(&pos) = self.0.index.borrow().get(&new_key) {
            if pos != i {
                return Err(PurcError::new(
                    PurcErrorKind::Duplicated,
                    "set_by_index: replacement would duplicate another member's unique key",
                ));
            }
        }

        let affected = vec![Variant::make_container(old.clone()), obj.to_variant()];
        if !self.0.listeners.fire_pre(MutationOp::Change, &affected) {
            return Err(PurcError::new(
                PurcErrorKind::ObserverVetoed,
                "set_by_index vetoed by a pre-change observer",
            ));
        }

        obj.link_parent(Rc::downgrade(&self.0));
        Object(old).unlink_parent_from(Rc::downgrade(&self.0));
        self.0.members.borrow_mut()[i] = new_inner;
        self.rebuild_index();
        self.0.listeners.fire_post(MutationOp::Change, &affected);
        Ok(())
    }

    /// `set_unite`: add every member of `other`, resolving duplicates per `cr`.
    pub fn unite(&self, other: &Set, cr: CrMethod) -> Result<()> {
        let members: Vec<Rc<ObjectInner>> = other.0.members.borrow().clone();
        for member in members {
            self.add(&Object(member), cr)?;
        }
        Ok(())
    }

    /// `set_intersect`: keep only members whose unique key also occurs in `other`.
    pub fn intersect(&self, other: &Set) -> Result<()> {
        let other_index = other.0.index.borrow();
        let to_drop: Vec<Rc<ObjectInner>> = self
            .0
            .members
            .borrow()
            .iter()
            .filter(|m| !other_index.contains_key(&self.key_of(m)))
            .cloned()
            .collect();
        drop(other_index);
        for member in to_drop {
            self.remove(&Object(member), NrMethod::Ignore)?;
        }
        Ok(())
    }

    /// `set_subtract`: remove every member whose unique key also occurs in `other`.
    pub fn subtract(&self, other: &Set) -> Result<()> {
        let other_index = other.0.index.borrow();
        let to_drop: Vec<Rc<ObjectInner>> = self
            .0
            .members
            .borrow()
            .iter()
            .filter(|m| other_index.contains_key(&self.key_of(m)))
            .cloned()
            .collect();
        drop(other_index);
        for member in to_drop {
            self.remove(&Object(member), NrMethod::Ignore)?;
        }
        Ok(())
    }

    /// `set_xor`: symmetric difference — members unique to `self` plus members unique to `other`.
    pub fn xor(&self, other: &Set) -> Result<()> {
        let original_self_keys: BTreeSet<UniqueKey> = self.0.index.borrow().keys().cloned().collect();
        self.subtract(other)?;
        let additions: Vec<Rc<ObjectInner>> = other
            .0
            .members
            .borrow()
            .iter()
            .filter(|m| !original_self_keys.contains(&self.key_of(m)))
            .cloned()
            .collect();
        for member in additions {
            self.add(&Object(member), CrMethod::Ignore)?;
        }
        Ok(())
    }

    /// `set_overwrite`: replace every member of `self` whose unique key also
    /// occurs in `other` with `other`'s version; `nr_method` governs members
    /// of `other` with no matching key in `self`.
    pub fn overwrite(&self, other: &Set, nr_method: NrMethod) -> Result<()> {
        let other_members: Vec<Rc<ObjectInner>> = other.0.members.borrow().clone();
        for member in other_members {
            let key = self.key_of(&member);
            let pos = self.0.index.borrow().get(&key).copied();
            match pos {
                Some(pos) => self.set_by_index(pos, &Object(member))?,
                None => match nr_method {
                    NrMethod::Ignore => {}
                    NrMethod::Complain => {
                        return Err(PurcError::new(
                            PurcErrorKind::NotFound,
                            "set_overwrite: no member with a matching unique key",
                        ));
                    }
                },
            }
        }
        Ok(())
    }

    /// Members in insertion (array-list) order.
    pub fn iter_array_order(&self) -> Vec<Variant> {
        self.0.members.borrow().iter().map(|m| Variant::make_container(m.clone())).collect()
    }

    /// Members in unique-key (red-black tree) order.
    pub fn iter_key_order(&self) -> Vec<Variant> {
        let index = self.0.index.borrow();
        let members = self.0.members.borrow();
        index.values().map(|&pos| Variant::make_container(members[pos].clone())).collect()
    }

    pub fn to_variant(&self) -> Variant {
        Variant::make_container(self.0.clone())
    }

    /// Called from `object.rs` before committing a mutation to a member:
    /// would the candidate field list collide with another member's key?
    pub(crate) fn validate_replacement(
        &self,
        changing: &Rc<ObjectInner>,
        candidate: &[(Rc<str>, Variant)],
    ) -> Result<()> {
        let candidate_key = if self.0.unique_keys.is_empty() {
            let mut sorted = candidate.to_vec();
            sorted.sort_by(|a, b| a.0.as_ref().cmp(b.0.as_ref()));
            let mut out = String::from("{");
            for (i, (k, v)) in sorted.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                out.push_str(k);
                out.push(':');
                out.push_str(&stringify(v, serialize::PLAIN));
            }
            out.push('}');
            UniqueKey::Whole(fold_case(out, self.0.caseless))
        } else {
            let fields = self
                .0
                .unique_keys
                .iter()
                .map(|name| {
                    let v = crate::object::field_from_entries(candidate, name);
                    fold_case(stringify(&v, serialize::PLAIN), self.0.caseless)
                })
                .collect();
            UniqueKey::Fields(fields)
        };

        let index = self.0.index.borrow();
        if let Some(&pos) = index.get(&candidate_key) {
            let occupant_is_self = Rc::ptr_eq(&self.0.members.borrow()[pos], changing);
            if !occupant_is_self {
                return Err(PurcError::new(
                    PurcErrorKind::Duplicated,
                    "reverse-check failed: mutation would duplicate another set member's key",
                ));
            }
        }
        Ok(())
    }

    /// Called from `object.rs` after a member mutation has committed: move
    /// it to its new key in the index.
    pub(crate) fn rekey_member(&self, changed: &Rc<ObjectInner>) {
        self.rebuild_index();
        let _ = changed;
    }
}

impl Container for SetInner {
    fn kind(&self) -> ContainerKind {
        ContainerKind::Set
    }

    fn len(&self) -> usize {
        self.members.borrow().len()
    }

    fn iter_values(&self) -> Box<dyn Iterator<Item = Variant> + '_> {
        let snapshot: Vec<Variant> = self
            .members
            .borrow()
            .iter()
            .map(|m| Variant::make_container(m.clone()))
            .collect();
        Box::new(snapshot.into_iter())
    }

    fn unique_keys(&self) -> Option<&[Rc<str>]> {
        Some(self.unique_keys.as_slice())
    }

    fn deep_eq(&self, other: &dyn Container) -> bool {
        let Some(other) = other.as_any().downcast_ref::<SetInner>() else {
            return false;
        };
        let a = self.members.borrow();
        let b = other.members.borrow();
        a.len() == b.len()
            && a.iter().all(|m| {
                let key = compute_key(&self.unique_keys, self.caseless, m);
                b.iter()
                    .any(|m2| compute_key(&other.unique_keys, other.caseless, m2) == key)
            })
    }

    fn write_json(&self, out: &mut String, flags: u32) {
        let pretty = flags & serialize::PRETTY != 0;
        let spaced = flags & serialize::SPACED != 0 || pretty;
        out.push('[');
        for (i, member) in self.members.borrow().iter().enumerate() {
            if i > 0 {
                out.push(',');
                if spaced {
                    out.push(' ');
                }
            }
            member.write_json(out, flags);
        }
        out.push(']');
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn into_any_rc(self: Rc<Self>) -> Rc<dyn Any> {
        self
    }
}

impl Object {
    /// Internal helper so `set.rs` can drop a parent edge without exposing
    /// `Weak<SetInner>` construction outside the crate.
    pub(crate) fn unlink_parent_from(&self, parent: std::rc::Weak<SetInner>) {
        self.unlink_parent(&parent);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object::Object;

    fn make_member(id: f64, v: &str) -> Object {
        Object::from_pairs([
            (Rc::<str>::from("id"), Variant::make_number(id)),
            (Rc::<str>::from("v"), Variant::make_string(v)),
        ])
    }

    #[test]
    fn duplicate_add_with_complain_errors_and_keeps_size_one() {
        let set = Set::new(["id"], false);
        let a = make_member(1.0, "a");
        let b = make_member(1.0, "b");
        set.add(&a, CrMethod::Complain).unwrap();
        let err = set.add(&b, CrMethod::Complain).unwrap_err();
        assert_eq!(err.kind, PurcErrorKind::Duplicated);
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn duplicate_add_with_overwrite_replaces_value() {
        let set = Set::new(["id"], false);
        let a = make_member(1.0, "a");
        let b = make_member(1.0, "b");
        set.add(&a, CrMethod::Overwrite).unwrap();
        set.add(&b, CrMethod::Overwrite).unwrap();
        assert_eq!(set.len(), 1);
        let got = set.get_by_key_values(&[Variant::make_number(1.0)]).unwrap();
        assert_eq!(purc_core::stringify(&got, serialize::PLAIN), "{id:1,v:b}");
    }

    #[test]
    fn duplicate_add_with_ignore_keeps_original() {
        let set = Set::new(["id"], false);
        let a = make_member(1.0, "a");
        let b = make_member(1.0, "b");
        set.add(&a, CrMethod::Ignore).unwrap();
        set.add(&b, CrMethod::Ignore).unwrap();
        let got = set.get_by_key_values(&[Variant::make_number(1.0)]).unwrap();
        assert_eq!(purc_core::stringify(&got, serialize::PLAIN), "{id:1,v:a}");
    }

    #[test]
    fn add_twice_with_ignore_is_idempotent() {
        let set = Set::new(["id"], false);
        let a = make_member(1.0, "a");
        set.add(&a, CrMethod::Ignore).unwrap();
        set.add(&a, CrMethod::Ignore).unwrap();
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn remove_missing_with_complain_errors() {
        let set = Set::new(["id"], false);
        let a = make_member(1.0, "a");
        let err = set.remove(&a, NrMethod::Complain).unwrap_err();
        assert_eq!(err.kind, PurcErrorKind::NotFound);
    }

    #[test]
    fn remove_missing_with_ignore_succeeds() {
        let set = Set::new(["id"], false);
        let a = make_member(1.0, "a");
        set.remove(&a, NrMethod::Ignore).unwrap();
    }

    #[test]
    fn mutating_a_member_to_collide_with_a_sibling_is_rejected() {
        let set = Set::new(["id"], false);
        let a = make_member(1.0, "a");
        let b = make_member(2.0, "b");
        set.add(&a, CrMethod::Complain).unwrap();
        set.add(&b, CrMethod::Complain).unwrap();

        let err = b.set_by_ckey("id", Variant::make_number(1.0)).unwrap_err();
        assert_eq!(err.kind, PurcErrorKind::Duplicated);
        assert_eq!(b.get_by_ckey("id"), Some(Variant::make_number(2.0)));
    }

    #[test]
    fn mutating_a_member_to_a_fresh_key_rekeys_the_index() {
        let set = Set::new(["id"], false);
        let a = make_member(1.0, "a");
        set.add(&a, CrMethod::Complain).unwrap();
        a.set_by_ckey("id", Variant::make_number(9.0)).unwrap();
        assert!(set.get_by_key_values(&[Variant::make_number(1.0)]).is_none());
        assert!(set.get_by_key_values(&[Variant::make_number(9.0)]).is_some());
    }

    #[test]
    fn remove_by_key_values_drops_the_matching_member() {
        let set = Set::new(["id"], false);
        set.add(&make_member(1.0, "a"), CrMethod::Complain).unwrap();
        let removed = set.remove_by_key_values(&[Variant::make_number(1.0)], NrMethod::Complain).unwrap();
        assert_eq!(purc_core::stringify(&removed, serialize::PLAIN), "{id:1,v:a}");
        assert_eq!(set.len(), 0);
    }

    #[test]
    fn remove_by_key_values_missing_with_complain_errors() {
        let set = Set::new(["id"], false);
        let err = set
            .remove_by_key_values(&[Variant::make_number(1.0)], NrMethod::Complain)
            .unwrap_err();
        assert_eq!(err.kind, PurcErrorKind::NotFound);
    }

    #[test]
    fn set_by_index_replaces_in_place() {
        let set = Set::new(["id"], false);
        set.add(&make_member(1.0, "a"), CrMethod::Complain).unwrap();
        set.set_by_index(0, &make_member(1.0, "z")).unwrap();
        let got = set.get_by_index(0).unwrap();
        assert_eq!(purc_core::stringify(&got, serialize::PLAIN), "{id:1,v:z}");
    }

    #[test]
    fn set_by_index_rejects_collision_with_another_member() {
        let set = Set::new(["id"], false);
        set.add(&make_member(1.0, "a"), CrMethod::Complain).unwrap();
        set.add(&make_member(2.0, "b"), CrMethod::Complain).unwrap();
        let err = set.set_by_index(0, &make_member(2.0, "z")).unwrap_err();
        assert_eq!(err.kind, PurcErrorKind::Duplicated);
    }

    #[test]
    fn unite_adds_members_missing_from_self() {
        let a = Set::new(["id"], false);
        a.add(&make_member(1.0, "a"), CrMethod::Complain).unwrap();
        let b = Set::new(["id"], false);
        b.add(&make_member(1.0, "dup"), CrMethod::Complain).unwrap();
        b.add(&make_member(2.0, "b"), CrMethod::Complain).unwrap();

        a.unite(&b, CrMethod::Ignore).unwrap();
        assert_eq!(a.len(), 2);
        assert_eq!(
            purc_core::stringify(&a.get_by_key_values(&[Variant::make_number(1.0)]).unwrap(), serialize::PLAIN),
            "{id:1,v:a}"
        );
    }

    #[test]
    fn intersect_keeps_only_shared_keys() {
        let a = Set::new(["id"], false);
        a.add(&make_member(1.0, "a"), CrMethod::Complain).unwrap();
        a.add(&make_member(2.0, "b"), CrMethod::Complain).unwrap();
        let b = Set::new(["id"], false);
        b.add(&make_member(2.0, "b2"), CrMethod::Complain).unwrap();

        a.intersect(&b).unwrap();
        assert_eq!(a.len(), 1);
        assert!(a.get_by_key_values(&[Variant::make_number(2.0)]).is_some());
    }

    #[test]
    fn subtract_removes_shared_keys() {
        let a = Set::new(["id"], false);
        a.add(&make_member(1.0, "a"), CrMethod::Complain).unwrap();
        a.add(&make_member(2.0, "b"), CrMethod::Complain).unwrap();
        let b = Set::new(["id"], false);
        b.add(&make_member(2.0, "b2"), CrMethod::Complain).unwrap();

        a.subtract(&b).unwrap();
        assert_eq!(a.len(), 1);
        assert!(a.get_by_key_values(&[Variant::make_number(1.0)]).is_some());
    }

    #[test]
    fn xor_keeps_members_unique_to_either_side() {
        let a = Set::new(["id"], false);
        a.add(&make_member(1.0, "a"), CrMethod::Complain).unwrap();
        a.add(&make_member(2.0, "shared"), CrMethod::Complain).unwrap();
        let b = Set::new(["id"], false);
        b.add(&make_member(2.0, "shared2"), CrMethod::Complain).unwrap();
        b.add(&make_member(3.0, "b"), CrMethod::Complain).unwrap();

        a.xor(&b).unwrap();
        assert_eq!(a.len(), 2);
        assert!(a.get_by_key_values(&[Variant::make_number(1.0)]).is_some());
        assert!(a.get_by_key_values(&[Variant::make_number(2.0)]).is_none());
        assert!(a.get_by_key_values(&[Variant::make_number(3.0)]).is_some());
    }

    #[test]
    fn overwrite_replaces_shared_keys_and_ignores_the_rest() {
        let a = Set::new(["id"], false);
        a.add(&make_member(1.0, "a"), CrMethod::Complain).unwrap();
        let b = Set::new(["id"], false);
        b.add(&make_member(1.0, "a2"), CrMethod::Complain).unwrap();
        b.add(&make_member(2.0, "b"), CrMethod::Complain).unwrap();

        a.overwrite(&b, NrMethod::Ignore).unwrap();
        assert_eq!(a.len(), 1);
        assert_eq!(
            purc_core::stringify(&a.get_by_key_values(&[Variant::make_number(1.0)]).unwrap(), serialize::PLAIN),
            "{id:1,v:a2}"
        );
    }

    #[test]
    fn overwrite_with_complain_errors_on_an_unmatched_member() {
        let a = Set::new(["id"], false);
        let b = Set::new(["id"], false);
        b.add(&make_member(1.0, "a"), CrMethod::Complain).unwrap();
        let err = a.overwrite(&b, NrMethod::Complain).unwrap_err();
        assert_eq!(err.kind, PurcErrorKind::NotFound);
    }

    #[test]
    fn array_order_and_key_order_can_differ() {
        let set = Set::new(["id"], false);
        set.add(&make_member(2.0, "second"), CrMethod::Complain).unwrap();
        set.add(&make_member(1.0, "first"), CrMethod::Complain).unwrap();

        let array_order: Vec<String> = set
            .iter_array_order()
            .iter()
            .map(|v| purc_core::stringify(v, serialize::PLAIN))
            .collect();
        assert_eq!(array_order, vec!["{id:2,v:second}", "{id:1,v:first}"]);

        let key_order: Vec<String> = set
            .iter_key_order()
            .iter()
            .map(|v| purc_core::stringify(v, serialize::PLAIN))
            .collect();
        assert_eq!(key_order, vec!["{id:1,v:first}", "{id:2,v:second}"]);
    }
}
