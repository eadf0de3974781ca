//! Mutable containers (object/array/set/tuple), the reverse-update chain,
//! the observer mutation gate and dynamic-object bindings for PurC.
//!
//! Builds on the scalar `Variant`/`Container` types from `purc-core`.

pub mod array;
pub mod dvobj;
pub mod object;
pub mod observer;
pub mod reverse_update;
pub mod set;
pub mod tuple;

pub use array::Array;
pub use dvobj::{DynamicObject, DynamicObjectBuilder, SILENTLY};
pub use object::Object;
pub use observer::{Listeners, MutationOp, PostObserver, PreObserver};
pub use reverse_update::{ParentEdge, ParentEdges};
pub use set::{CrMethod, NrMethod, Set};
pub use tuple::Tuple;
