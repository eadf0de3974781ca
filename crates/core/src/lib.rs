//! PurC core: atoms, error handling, the scalar Variant, coercion and
//! serialization.
//!
//! This crate has no notion of mutable containers; `purc-runtime` builds
//! object/array/set/tuple on top of the `Container` trait defined here.

pub mod atom;
pub mod coerce;
pub mod error;
pub mod serialize;
pub mod value;

pub use atom::{Atom, AtomTable};
pub use coerce::{CompareMethod, booleanize, compare, diff_eq, numberify};
pub use error::{PurcError, PurcErrorKind, Result, clear_error, last_error, set_error, take_error};
pub use serialize::stringify;
pub use value::{
    Container, ContainerKind, DynamicGetter, DynamicSetter, DynamicVariant, NativeEntity, Variant,
    ref_variant, unref_variant,
};
