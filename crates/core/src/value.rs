//! The scalar half of the Variant system.
//!
//! `Variant` is a tagged, reference-counted, polymorphic value. Every
//! non-trivial payload here is `Rc`-backed so cloning a `Variant` is
//! always O(1) and shares storage with the original.
//!
//! The four mutable/fixed-arity container kinds (object, array, set,
//! tuple) are *not* defined in this crate: `purc-runtime` depends on
//! `purc-core`, so the container kind here is an opaque trait object
//! (`Rc<dyn Container>`) implemented downstream, keeping the scalar core
//! and the heavier operational modules in separate layers.

use crate::atom::Atom;
use std::any::Any;
use std::fmt;
use std::rc::Rc;

/// A getter or setter function published by a `DYNAMIC` variant.
pub type DynamicGetter = fn(args: &[Variant]) -> crate::error::Result<Variant>;
pub type DynamicSetter = fn(args: &[Variant]) -> crate::error::Result<Variant>;

/// `DYNAMIC` payload: a getter/setter pair.
#[derive(Clone, Copy, PartialEq)]
pub struct DynamicVariant {
    pub getter: Option<DynamicGetter>,
    pub setter: Option<DynamicSetter>,
}

impl fmt::Debug for DynamicVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DynamicVariant")
            .field("getter", &self.getter.map(|g| g as usize))
            .field("setter", &self.setter.map(|s| s as usize))
            .finish()
    }
}

/// Discriminant for the four mutable/fixed-arity container kinds, used by
/// code in `purc-core` (such as the serializer) that must branch on
/// container shape without knowing the concrete `purc-runtime` type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContainerKind {
    Object,
    Array,
    Set,
    Tuple,
}

impl ContainerKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ContainerKind::Object => "object",
            ContainerKind::Array => "array",
            ContainerKind::Set => "set",
            ContainerKind::Tuple => "tuple",
        }
    }
}

/// Bit flags controlling `Container::write_json` output.
pub mod serialize_flags {
    pub const PRETTY: u32 = 1 << 0;
    pub const SPACED: u32 = 1 << 1;
    pub const NOZERO: u32 = 1 << 2;
    pub const NOSLASH_ESCAPE: u32 = 1 << 3;
    pub const PLAIN: u32 = 1 << 4;
    pub const RUNTIME_STRING: u32 = 1 << 5;
}

/// Object/array/set/tuple, implemented one layer up in `purc-runtime`.
///
/// `purc-core` only needs enough of the container's shape to support
/// coercion (`numberify` uses `len`), comparison (`deep_eq`), and
/// serialization (`write_json`); everything else (mutation, the reverse
/// update chain, observers) lives in the concrete `purc-runtime` types.
pub trait Container: fmt::Debug {
    fn kind(&self) -> ContainerKind;
    fn len(&self) -> usize;
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
    /// Iterate members in the container's canonical order (insertion order
    /// for object/array, array-index order for set, construction order for
    /// tuple).
    fn iter_values(&self) -> Box<dyn Iterator<Item = Variant> + '_>;
    /// The uniqueness tuple field names, for sets only.
    fn unique_keys(&self) -> Option<&[Rc<str>]> {
        None
    }
    fn deep_eq(&self, other: &dyn Container) -> bool;
    /// Append this container's canonical text form to `out`.
    fn write_json(&self, out: &mut String, flags: u32);
    fn as_any(&self) -> &dyn Any;
    /// Recover the concrete `Rc<Concrete>` behind this trait object, so
    /// callers that need to hold an owned handle to (say) the underlying
    /// `purc-runtime` object type — rather than just borrow it — can
    /// `Rc::downcast` the result. `Box<Self>`/`Rc<Self>` receivers are
    /// object-safe, so this is dispatchable through `Rc<dyn Container>`.
    fn into_any_rc(self: Rc<Self>) -> Rc<dyn Any>;
}

/// The opaque entity behind a `NATIVE` variant.
///
/// Concrete dynamic-object bindings (doc/system/math/string/file/...) are
/// implemented in `purc-runtime::dvobj` on top of this trait. The
/// `on_release` destructor hook is realized directly by the implementing
/// type's `Drop` impl rather than a separate callback slot: Rust's
/// ownership model already guarantees exactly-once teardown.
pub trait NativeEntity: fmt::Debug {
    fn type_name(&self) -> &str;
    fn as_any(&self) -> &dyn Any;
}

/// A tagged, reference-counted, polymorphic value.
///
/// `Variant::clone()` is the `ref` operation; letting the last clone drop
/// is `unref`. A clone immediately followed by a drop is a no-op on
/// observable state, because `Rc`/container drop glue only runs teardown
/// when the strong count reaches zero, and cloning then dropping a
/// `Variant` is exactly the inverse pair of `Rc` operations.
#[derive(Debug, Clone)]
pub enum Variant {
    Null,
    Undefined,
    Boolean(bool),
    /// Interned exception symbol.
    Exception(Atom),
    Number(f64),
    LongInt(i64),
    ULongInt(u64),
    /// Extended-precision float. Represented as `f64` since Rust has no
    /// portable `long double`; the `FL` stringification suffix is what actually distinguishes this kind from `NUMBER`, not
    /// extra mantissa bits.
    LongDouble(f64),
    AtomString(Atom),
    String(Rc<str>),
    Bytes(Rc<[u8]>),
    Dynamic(DynamicVariant),
    Native(Rc<dyn NativeEntity>),
    Container(Rc<dyn Container>),
}

impl Variant {
    pub fn make_null() -> Self {
        Variant::Null
    }

    pub fn make_undefined() -> Self {
        Variant::Undefined
    }

    pub fn make_boolean(b: bool) -> Self {
        Variant::Boolean(b)
    }

    pub fn make_number(n: f64) -> Self {
        Variant::Number(n)
    }

    pub fn make_longint(n: i64) -> Self {
        Variant::LongInt(n)
    }

    pub fn make_ulongint(n: u64) -> Self {
        Variant::ULongInt(n)
    }

    pub fn make_longdouble(n: f64) -> Self {
        Variant::LongDouble(n)
    }

    pub fn make_string(s: impl AsRef<str>) -> Self {
        Variant::String(Rc::from(s.as_ref()))
    }

    pub fn make_bytes(bytes: impl AsRef<[u8]>) -> Self {
        Variant::Bytes(Rc::from(bytes.as_ref()))
    }

    pub fn make_atomstring(atom: Atom) -> Self {
        Variant::AtomString(atom)
    }

    pub fn make_exception(atom: Atom) -> Self {
        Variant::Exception(atom)
    }

    pub fn make_dynamic(getter: Option<DynamicGetter>, setter: Option<DynamicSetter>) -> Self {
        Variant::Dynamic(DynamicVariant { getter, setter })
    }

    pub fn make_native(entity: Rc<dyn NativeEntity>) -> Self {
        Variant::Native(entity)
    }

    pub fn make_container(container: Rc<dyn Container>) -> Self {
        Variant::Container(container)
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            Variant::Null => "null",
            Variant::Undefined => "undefined",
            Variant::Boolean(_) => "boolean",
            Variant::Exception(_) => "exception",
            Variant::Number(_) => "number",
            Variant::LongInt(_) => "longint",
            Variant::ULongInt(_) => "ulongint",
            Variant::LongDouble(_) => "longdouble",
            Variant::AtomString(_) => "atomstring",
            Variant::String(_) => "string",
            Variant::Bytes(_) => "bsequence",
            Variant::Dynamic(_) => "dynamic",
            Variant::Native(_) => "native",
            Variant::Container(c) => c.kind().as_str(),
        }
    }

    pub fn as_container(&self) -> Option<&Rc<dyn Container>> {
        match self {
            Variant::Container(c) => Some(c),
            _ => None,
        }
    }

    /// The `Rc`/container strong count backing this variant, or `None` for
    /// kinds with no heap allocation (there is nothing meaningful to count
    /// for `Int`-like scalars, which carry no indirection at all).
    pub fn strong_count(&self) -> Option<usize> {
        match self {
            Variant::String(s) => Some(Rc::strong_count(s)),
            Variant::Bytes(b) => Some(Rc::strong_count(b)),
            Variant::Native(n) => Some(Rc::strong_count(n)),
            Variant::Container(c) => Some(Rc::strong_count(c)),
            _ => None,
        }
    }
}

impl PartialEq for Variant {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Variant::Null, Variant::Null) => true,
            (Variant::Undefined, Variant::Undefined) => true,
            (Variant::Boolean(a), Variant::Boolean(b)) => a == b,
            (Variant::Exception(a), Variant::Exception(b)) => a == b,
            (Variant::Number(a), Variant::Number(b)) => a == b,
            (Variant::LongInt(a), Variant::LongInt(b)) => a == b,
            (Variant::ULongInt(a), Variant::ULongInt(b)) => a == b,
            (Variant::LongDouble(a), Variant::LongDouble(b)) => a == b,
            (Variant::AtomString(a), Variant::AtomString(b)) => a == b,
            (Variant::String(a), Variant::String(b)) => a == b,
            (Variant::Bytes(a), Variant::Bytes(b)) => a == b,
            (Variant::Dynamic(a), Variant::Dynamic(b)) => a == b,
            (Variant::Native(a), Variant::Native(b)) => Rc::ptr_eq(a, b),
            (Variant::Container(a), Variant::Container(b)) => {
                Rc::ptr_eq(a, b) || a.deep_eq(b.as_ref())
            }
            _ => false,
        }
    }
}

/// `ref(v)`: increment the reference count by producing another handle to
/// the same underlying storage. Named to mirror the C API this crate
/// replaces; see the type-level docs for why plain `Clone` already
/// satisfies the contract.
pub fn ref_variant(v: &Variant) -> Variant {
    v.clone()
}

/// `unref(v)`: decrement the reference count. A no-op function that exists
/// purely so call sites can write `unref_variant(v)` in place of a manual
/// ref/unref pair; the real work happens in `Drop` when `v` goes out of
/// scope.
pub fn unref_variant(v: Variant) {
    drop(v);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ref_then_unref_is_observable_noop() {
        let s = Variant::make_string("hello");
        let before = s.strong_count().unwrap();

        let r = ref_variant(&s);
        assert_eq!(s.strong_count().unwrap(), before + 1);

        unref_variant(r);
        assert_eq!(s.strong_count().unwrap(), before);
    }

    #[test]
    fn equal_scalars_are_interchangeable() {
        assert_eq!(Variant::make_number(1.5), Variant::make_number(1.5));
        assert_eq!(Variant::make_string("x"), Variant::make_string("x"));
        assert_ne!(Variant::make_string("x"), Variant::make_string("y"));
    }

    #[test]
    fn kind_name_reports_scalar_kinds() {
        assert_eq!(Variant::Null.kind_name(), "null");
        assert_eq!(Variant::make_longint(1).kind_name(), "longint");
        assert_eq!(Variant::make_ulongint(1).kind_name(), "ulongint");
        assert_eq!(Variant::make_longdouble(1.0).kind_name(), "longdouble");
    }
}
