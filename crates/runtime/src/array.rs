//! Array container.
//!
//! A contiguous, growable sequence. Arrays never participate in the
//! reverse-update chain (only objects can be set members), so the
//! mutation gate here is pre-fire/apply/post-fire with no reverse-check
//! step.

use crate::observer::{Listeners, MutationOp, PostObserver, PreObserver};
use purc_core::value::{Container, ContainerKind};
use purc_core::{CompareMethod, PurcError, PurcErrorKind, Result, Variant, coerce, serialize};
use std::any::Any;
use std::cell::RefCell;
use std::cmp::Ordering;
use std::fmt;
use std::rc::Rc;

struct ArrayInner {
    items: RefCell<Vec<Variant>>,
    listeners: Listeners,
}

impl fmt::Debug for ArrayInner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ArrayInner")
            .field("len", &self.items.borrow().len())
            .finish()
    }
}

/// A handle to an array variant's container.
#[derive(Debug, Clone)]
pub struct Array(Rc<ArrayInner>);

impl Array {
    pub fn new() -> Self {
        Array(Rc::new(ArrayInner {
            items: RefCell::new(Vec::new()),
            listeners: Listeners::new(),
        }))
    }

    pub fn from_values(values: impl IntoIterator<Item = Variant>) -> Self {
        let arr = Self::new();
        arr.0.items.borrow_mut().extend(values);
        arr
    }

    pub fn len(&self) -> usize {
        self.0.items.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get(&self, i: usize) -> Option<Variant> {
        self.0.items.borrow().get(i).cloned()
    }

    pub fn observe_pre(&self, f: PreObserver) {
        self.0.listeners.observe_pre(f);
    }

    pub fn observe_post(&self, f: PostObserver) {
        self.0.listeners.observe_post(f);
    }

    fn gated_mutate(&self, op: MutationOp, affected: &[Variant], mutate: impl FnOnce(&mut Vec<Variant>)) -> Result<()> {
        if !self.0.listeners.fire_pre(op, affected) {
            return Err(PurcError::new(
                PurcErrorKind::ObserverVetoed,
                "array mutation vetoed by a pre-change observer",
            ));
        }
        mutate(&mut self.0.items.borrow_mut());
        self.0.listeners.fire_post(op, affected);
        Ok(())
    }

    pub fn append(&self, value: Variant) -> Result<()> {
        let affected = [value.clone()];
        self.gated_mutate(MutationOp::Grow, &affected, |items| items.push(value))
    }

    pub fn prepend(&self, value: Variant) -> Result<()> {
        let affected = [value.clone()];
        self.gated_mutate(MutationOp::Grow, &affected, |items| items.insert(0, value))
    }

    pub fn insert_before(&self, i: usize, value: Variant) -> Result<()> {
        if i > self.len() {
            return Err(PurcError::new(
                PurcErrorKind::OutOfBounds,
                format!("insert_before: index {i} out of bounds"),
            ));
        }
        let affected = [value.clone()];
        self.gated_mutate(MutationOp::Grow, &affected, |items| items.insert(i, value))
    }

    pub fn insert_after(&self, i: usize, value: Variant) -> Result<()> {
        if i >= self.len() {
            return Err(PurcError::new(
                PurcErrorKind::OutOfBounds,
                format!("insert_after: index {i} out of bounds"),
            ));
        }
        let affected = [value.clone()];
        self.gated_mutate(MutationOp::Grow, &affected, |items| items.insert(i + 1, value))
    }

    pub fn remove(&self, i: usize) -> Result<Variant> {
        let Some(old) = self.get(i) else {
            return Err(PurcError::new(
                PurcErrorKind::OutOfBounds,
                format!("remove: index {i} out of bounds"),
            ));
        };
        let affected = [old.clone()];
        self.gated_mutate(MutationOp::Shrink, &affected, |items| {
            items.remove(i);
        })?;
        Ok(old)
    }

    pub fn set(&self, i: usize, value: Variant) -> Result<()> {
        let Some(old) = self.get(i) else {
            return Err(PurcError::new(
                PurcErrorKind::OutOfBounds,
                format!("set: index {i} out of bounds"),
            ));
        };
        let affected = [old, value.clone()];
        self.gated_mutate(MutationOp::Change, &affected, |items| items[i] = value)
    }

    /// Sort in place. `cmp` defaults to numeric comparison.
    pub fn sort(&self, cmp: Option<&dyn Fn(&Variant, &Variant) -> Ordering>) -> Result<()> {
        let affected: Vec<Variant> = self.0.items.borrow().clone();
        if !self.0.listeners.fire_pre(MutationOp::Change, &affected) {
            return Err(PurcError::new(
                PurcErrorKind::ObserverVetoed,
                "sort vetoed by a pre-change observer",
            ));
        }
        let default_cmp = |a: &Variant, b: &Variant| {
            coerce::compare(a, b, CompareMethod::Number)
        };
        let cmp = cmp.unwrap_or(&default_cmp);
        self.0.items.borrow_mut().sort_by(|a, b| cmp(a, b));
        let after: Vec<Variant> = self.0.items.borrow().clone();
        self.0.listeners.fire_post(MutationOp::Change, &after);
        Ok(())
    }

    pub fn to_variant(&self) -> Variant {
        Variant::make_container(self.0.clone())
    }
}

impl Default for Array {
    fn default() -> Self {
        Self::new()
    }
}

impl Container for ArrayInner {
    fn kind(&self) -> ContainerKind {
        ContainerKind::Array
    }

    fn len(&self) -> usize {
        self.items.borrow().len()
    }

    fn iter_values(&self) -> Box<dyn Iterator<Item = Variant> + '_> {
        Box::new(self.items.borrow().clone().into_iter())
    }

    fn deep_eq(&self, other: &dyn Container) -> bool {
        let Some(other) = other.as_any().downcast_ref::<ArrayInner>() else {
            return false;
        };
        *self.items.borrow() == *other.items.borrow()
    }

    fn write_json(&self, out: &mut String, flags: u32) {
        let pretty = flags & serialize::PRETTY != 0;
        let spaced = flags & serialize::SPACED != 0 || pretty;
        out.push('[');
        for (i, item) in self.items.borrow().iter().enumerate() {
            if i > 0 {
                out.push(',');
                if spaced {
                    out.push(' ');
                }
            }
            serialize::write_json(item, out, flags);
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn append_then_get_round_trips() {
        let arr = Array::new();
        arr.append(Variant::make_number(1.0)).unwrap();
        arr.append(Variant::make_number(2.0)).unwrap();
        assert_eq!(arr.len(), 2);
        assert_eq!(arr.get(1), Some(Variant::make_number(2.0)));
    }

    #[test]
    fn insert_before_and_after_shift_correctly() {
        let arr = Array::from_values([Variant::make_number(1.0), Variant::make_number(3.0)]);
        arr.insert_after(0, Variant::make_number(2.0)).unwrap();
        arr.insert_before(0, Variant::make_number(0.0)).unwrap();
        let values: Vec<f64> = (0..arr.len())
            .map(|i| match arr.get(i).unwrap() {
                Variant::Number(n) => n,
                _ => unreachable!(),
            })
            .collect();
        assert_eq!(values, [0.0, 1.0, 2.0, 3.0]);
    }

    #[test]
    fn remove_out_of_bounds_errors() {
        let arr = Array::new();
        let err = arr.remove(0).unwrap_err();
        assert_eq!(err.kind, PurcErrorKind::OutOfBounds);
    }

    #[test]
    fn default_sort_is_numeric() {
        let arr = Array::from_values([
            Variant::make_string("10"),
            Variant::make_string("2"),
            Variant::make_string("1"),
        ]);
        arr.sort(None).unwrap();
        let values: Vec<String> = (0..arr.len())
            .map(|i| match arr.get(i).unwrap() {
                Variant::String(s) => s.to_string(),
                _ => unreachable!(),
            })
            .collect();
        assert_eq!(values, ["1", "2", "10"]);
    }

    #[test]
    fn veto_blocks_append() {
        let arr = Array::new();
        arr.observe_pre(Rc::new(|_, _| false));
        let err = arr.append(Variant::make_number(1.0)).unwrap_err();
        assert_eq!(err.kind, PurcErrorKind::ObserverVetoed);
        assert_eq!(arr.len(), 0);
    }
}
