//! Tuple container: fixed arity, `get`/`set` only.

use crate::observer::{Listeners, MutationOp, PostObserver, PreObserver};
use purc_core::value::{Container, ContainerKind};
use purc_core::{PurcError, PurcErrorKind, Result, Variant, serialize};
use std::any::Any;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

struct TupleInner {
    items: RefCell<Vec<Variant>>,
    listeners: Listeners,
}

impl fmt::Debug for TupleInner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TupleInner")
            .field("arity", &self.items.borrow().len())
            .finish()
    }
}

/// A handle to a tuple variant's container. Arity is fixed at construction.
#[derive(Debug, Clone)]
pub struct Tuple(Rc<TupleInner>);

impl Tuple {
    pub fn new(values: impl IntoIterator<Item = Variant>) -> Self {
        Tuple(Rc::new(TupleInner {
            items: RefCell::new(values.into_iter().collect()),
            listeners: Listeners::new(),
        }))
    }

    pub fn arity(&self) -> usize {
        self.0.items.borrow().len()
    }

    pub fn len(&self) -> usize {
        self.arity()
    }

    pub fn is_empty(&self) -> bool {
        self.arity() == 0
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

    /// `set(i, v)`. Still fires the full mutation gate even though arity
    /// never changes.
    pub fn set(&self, i: usize, value: Variant) -> Result<()> {
        let Some(old) = self.get(i) else {
            return Err(PurcError::new(
                PurcErrorKind::OutOfBounds,
                format!("tuple set: index {i} out of bounds for arity {}", self.arity()),
            ));
        };
        let affected = [old, value.clone()];
        if !self.0.listeners.fire_pre(MutationOp::Change, &affected) {
            return Err(PurcError::new(
                PurcErrorKind::ObserverVetoed,
                "tuple set vetoed by a pre-change observer",
            ));
        }
        self.0.items.borrow_mut()[i] = value;
        self.0.listeners.fire_post(MutationOp::Change, &affected);
        Ok(())
    }

    pub fn to_variant(&self) -> Variant {
        Variant::make_container(self.0.clone())
    }
}

impl Container for TupleInner {
    fn kind(&self) -> ContainerKind {
        ContainerKind::Tuple
    }

    fn len(&self) -> usize {
        self.items.borrow().len()
    }

    fn iter_values(&self) -> Box<dyn Iterator<Item = Variant> + '_> {
        Box::new(self.items.borrow().clone().into_iter())
    }

    fn deep_eq(&self, other: &dyn Container) -> bool {
        let Some(other) = other.as_any().downcast_ref::<TupleInner>() else {
            return false;
        };
        *self.items.borrow() == *other.items.borrow()
    }

    fn write_json(&self, out: &mut String, flags: u32) {
        let pretty = flags & serialize::PRETTY != 0;
        let spaced = flags & serialize::SPACED != 0 || pretty;
        out.push_str("[!");
        for (i, item) in self.items.borrow().iter().enumerate() {
            if i > 0 {
                out.push(',');
                if spaced {
                    out.push(' ');
                }
            }
            serialize::write_json(item, out, flags);
        }
        out.push_str("!]");
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn into_any_rc(self: Rc<Self>) -> Rc<dyn Any> {
        self
    }
}
