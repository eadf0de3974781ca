//! The reverse-update chain.
//!
//! When an object `O` is added to a set `S`, an edge `O -> S` is recorded
//! here so a later mutation of `O` can ask `S` to re-validate uniqueness
//! before the change commits, and re-index `O` under its new key after it
//! commits. The edge is a non-owning `Weak` reference: sets own their
//! members (`Rc<ObjectInner>`); members only borrow their parent sets back.

use crate::set::SetInner;
use std::cell::RefCell;
use std::rc::Weak;

pub type ParentEdge = Weak<SetInner>;

/// The set of parent sets a single object currently belongs to.
#[derive(Default)]
pub struct ParentEdges(RefCell<Vec<ParentEdge>>);

impl ParentEdges {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&self, parent: ParentEdge) {
        self.0.borrow_mut().push(parent);
    }

    pub fn remove(&self, target: &Weak<SetInner>) {
        self.0.borrow_mut().retain(|edge| {
            !edge
                .upgrade()
                .zip(target.upgrade())
                .is_some_and(|(a, b)| std::rc::Rc::ptr_eq(&a, &b))
        });
    }

    /// Living parent sets, pruning dead edges as a side effect.
    pub fn live_parents(&self) -> Vec<std::rc::Rc<SetInner>> {
        let mut edges = self.0.borrow_mut();
        edges.retain(|w| w.strong_count() > 0);
        edges.iter().filter_map(|w| w.upgrade()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.0.borrow().iter().all(|w| w.strong_count() == 0)
    }
}
