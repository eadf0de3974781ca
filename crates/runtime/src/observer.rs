//! Pre-fire/apply/post-fire mutation gate.
//!
//! Every container mutation runs: pre-fire observers (any veto aborts),
//! the set-membership reverse-check, the structural change itself,
//! ancestor re-keying, then post-fire observers. This module provides the
//! observer-list half of that protocol; the reverse-check/re-key half is
//! container-specific (see `object.rs`/`set.rs`) because only objects
//! participate in the reverse-update chain.

use purc_core::Variant;
use std::cell::RefCell;
use std::rc::Rc;

/// The operation tag passed to observers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationOp {
    Grow,
    Shrink,
    Change,
}

/// A pre-change observer. Returns `false` to veto the mutation.
pub type PreObserver = Rc<dyn Fn(MutationOp, &[Variant]) -> bool>;
/// A post-change observer.
pub type PostObserver = Rc<dyn Fn(MutationOp, &[Variant])>;

/// The observer list attached to every mutable container.
///
/// Dispatch snapshots the list before firing ("copy-on-fire") so an
/// observer may detach itself (or others) mid-dispatch without
/// invalidating the iteration in progress.
#[derive(Default)]
pub struct Listeners {
    pre: RefCell<Vec<PreObserver>>,
    post: RefCell<Vec<PostObserver>>,
}

impl Listeners {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn observe_pre(&self, f: PreObserver) {
        self.pre.borrow_mut().push(f);
    }

    pub fn observe_post(&self, f: PostObserver) {
        self.post.borrow_mut().push(f);
    }

    pub fn forget_all(&self) {
        self.pre.borrow_mut().clear();
        self.post.borrow_mut().clear();
    }

    /// Fire all pre-change observers; short-circuit on the first veto, but
    /// still only after copying the list so later detaches are safe.
    pub fn fire_pre(&self, op: MutationOp, affected: &[Variant]) -> bool {
        let snapshot = self.pre.borrow().clone();
        snapshot.iter().all(|obs| obs(op, affected))
    }

    pub fn fire_post(&self, op: MutationOp, affected: &[Variant]) {
        let snapshot = self.post.borrow().clone();
        for obs in snapshot.iter() {
            obs(op, affected);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn veto_short_circuits_and_blocks_success() {
        let listeners = Listeners::new();
        let calls = Rc::new(Cell::new(0));
        let calls2 = calls.clone();
        listeners.observe_pre(Rc::new(move |_, _| {
            calls2.set(calls2.get() + 1);
            false
        }));
        assert!(!listeners.fire_pre(MutationOp::Grow, &[]));
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn detaching_during_dispatch_does_not_panic() {
        let listeners = Rc::new(Listeners::new());
        let inner = listeners.clone();
        listeners.observe_pre(Rc::new(move |_, _| {
            inner.forget_all();
            true
        }));
        assert!(listeners.fire_pre(MutationOp::Grow, &[]));
    }

    #[test]
    fn post_observers_all_run() {
        let listeners = Listeners::new();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let seen2 = seen.clone();
        listeners.observe_post(Rc::new(move |op, _| seen2.borrow_mut().push(op)));
        listeners.fire_post(MutationOp::Shrink, &[]);
        assert_eq!(seen.borrow().as_slice(), &[MutationOp::Shrink]);
    }
}
