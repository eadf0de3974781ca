//! Dynamic-object binding.
//!
//! A dynamic object publishes a per-entity table mapping property name to
//! getter/setter/eraser/cleaner closures, plus whole-entity
//! updater/cleaner/eraser hooks and `on_observe`/`on_forget` callbacks. The
//! `on_release` destructor hook is realized by Rust `Drop` (see
//! `NativeEntity`'s doc comment in `purc-core`) rather than a vtable slot a
//! caller must remember to invoke.
//!
//! This binding exposes exactly one constructor, [`DynamicObject::builder`],
//! which always takes ownership of whatever `on_release` needs to tear
//! down — an entity that should outlive the `DynamicObject` handle can
//! simply close over an `Rc` clone instead of the owned value.

use purc_core::value::NativeEntity;
use purc_core::{PurcError, PurcErrorKind, Result, Variant};
use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

/// Downgrades a recoverable failure to a neutral value instead of an error
///. Never suppresses `OUT_OF_MEMORY`.
pub const SILENTLY: u32 = 1 << 0;

type Getter = Rc<dyn Fn(&[Variant]) -> Result<Variant>>;
type Setter = Rc<dyn Fn(&[Variant]) -> Result<Variant>>;
type Eraser = Rc<dyn Fn(&[Variant]) -> Result<Variant>>;
type Cleaner = Rc<dyn Fn(&[Variant]) -> Result<Variant>>;

#[derive(Clone, Default)]
struct PropertyOps {
    getter: Option<Getter>,
    setter: Option<Setter>,
    eraser: Option<Eraser>,
    cleaner: Option<Cleaner>,
}

pub struct DynamicObjectBuilder {
    type_name: String,
    properties: HashMap<String, PropertyOps>,
    updater: Option<Rc<dyn Fn(&[Variant]) -> Result<Variant>>>,
    cleaner: Option<Rc<dyn Fn(&[Variant]) -> Result<Variant>>>,
    eraser: Option<Rc<dyn Fn(&[Variant]) -> Result<Variant>>>,
    on_observe: Option<Rc<dyn Fn(&str) -> bool>>,
    on_forget: Option<Rc<dyn Fn(&str) -> bool>>,
    on_release: Option<Box<dyn FnOnce()>>,
}

impl DynamicObjectBuilder {
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            properties: HashMap::new(),
            updater: None,
            cleaner: None,
            eraser: None,
            on_observe: None,
            on_forget: None,
            on_release: None,
        }
    }

    pub fn property_getter(mut self, name: impl Into<String>, f: impl Fn(&[Variant]) -> Result<Variant> + 'static) -> Self {
        self.properties.entry(name.into()).or_default().getter = Some(Rc::new(f));
        self
    }

    pub fn property_setter(mut self, name: impl Into<String>, f: impl Fn(&[Variant]) -> Result<Variant> + 'static) -> Self {
        self.properties.entry(name.into()).or_default().setter = Some(Rc::new(f));
        self
    }

    pub fn property_eraser(mut self, name: impl Into<String>, f: impl Fn(&[Variant]) -> Result<Variant> + 'static) -> Self {
        self.properties.entry(name.into()).or_default().eraser = Some(Rc::new(f));
        self
    }

    pub fn property_cleaner(mut self, name: impl Into<String>, f: impl Fn(&[Variant]) -> Result<Variant> + 'static) -> Self {
        self.properties.entry(name.into()).or_default().cleaner = Some(Rc::new(f));
        self
    }

    pub fn updater(mut self, f: impl Fn(&[Variant]) -> Result<Variant> + 'static) -> Self {
        self.updater = Some(Rc::new(f));
        self
    }

    pub fn cleaner(mut self, f: impl Fn(&[Variant]) -> Result<Variant> + 'static) -> Self {
        self.cleaner = Some(Rc::new(f));
        self
    }

    pub fn eraser(mut self, f: impl Fn(&[Variant]) -> Result<Variant> + 'static) -> Self {
        self.eraser = Some(Rc::new(f));
        self
    }

    pub fn on_observe(mut self, f: impl Fn(&str) -> bool + 'static) -> Self {
        self.on_observe = Some(Rc::new(f));
        self
    }

    pub fn on_forget(mut self, f: impl Fn(&str) -> bool + 'static) -> Self {
        self.on_forget = Some(Rc::new(f));
        self
    }

    pub fn on_release(mut self, f: impl FnOnce() + 'static) -> Self {
        self.on_release = Some(Box::new(f));
        self
    }

    pub fn build(self) -> DynamicObject {
        DynamicObject(Rc::new(DynamicObjectInner {
            type_name: self.type_name,
            properties: self.properties,
            updater: self.updater,
            cleaner: self.cleaner,
            eraser: self.eraser,
            on_observe: self.on_observe,
            on_forget: self.on_forget,
            on_release: RefCellOnRelease(std::cell::RefCell::new(self.on_release)),
        }))
    }
}

/// Wraps the one-shot `on_release` closure so `Drop` (which only gets
/// `&self` through the `NativeEntity` trait object chain, not `&mut self`)
/// can still take and run it exactly once.
struct RefCellOnRelease(std::cell::RefCell<Option<Box<dyn FnOnce()>>>);

struct DynamicObjectInner {
    type_name: String,
    properties: HashMap<String, PropertyOps>,
    updater: Option<Rc<dyn Fn(&[Variant]) -> Result<Variant>>>,
    cleaner: Option<Rc<dyn Fn(&[Variant]) -> Result<Variant>>>,
    eraser: Option<Rc<dyn Fn(&[Variant]) -> Result<Variant>>>,
    on_observe: Option<Rc<dyn Fn(&str) -> bool>>,
    on_forget: Option<Rc<dyn Fn(&str) -> bool>>,
    on_release: RefCellOnRelease,
}

impl fmt::Debug for DynamicObjectInner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DynamicObjectInner")
            .field("type_name", &self.type_name)
            .field("properties", &self.properties.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl Drop for DynamicObjectInner {
    fn drop(&mut self) {
        if let Some(f) = self.on_release.0.borrow_mut().take() {
            f();
        }
    }
}

fn neutral_default(flags: u32, err: PurcError) -> Result<Variant> {
    if flags & SILENTLY != 0 {
        Ok(Variant::make_boolean(false))
    } else {
        Err(err)
    }
}

/// A handle to a published dynamic-object entity.
#[derive(Debug, Clone)]
pub struct DynamicObject(Rc<DynamicObjectInner>);

impl DynamicObject {
    pub fn builder(type_name: impl Into<String>) -> DynamicObjectBuilder {
        DynamicObjectBuilder::new(type_name)
    }

    pub fn property_getter(&self, name: &str, argv: &[Variant], flags: u32) -> Result<Variant> {
        match self.0.properties.get(name).and_then(|p| p.getter.clone()) {
            Some(getter) => getter(argv),
            None => neutral_default(
                flags,
                PurcError::new(PurcErrorKind::NotSupported, format!("no getter for property '{name}'")),
            ),
        }
    }

    pub fn property_setter(&self, name: &str, argv: &[Variant], flags: u32) -> Result<Variant> {
        match self.0.properties.get(name).and_then(|p| p.setter.clone()) {
            Some(setter) => setter(argv),
            None => neutral_default(
                flags,
                PurcError::new(PurcErrorKind::NotSupported, format!("no setter for property '{name}'")),
            ),
        }
    }

    pub fn property_eraser(&self, name: &str, argv: &[Variant], flags: u32) -> Result<Variant> {
        match self.0.properties.get(name).and_then(|p| p.eraser.clone()) {
            Some(eraser) => eraser(argv),
            None => neutral_default(
                flags,
                PurcError::new(PurcErrorKind::NotSupported, format!("no eraser for property '{name}'")),
            ),
        }
    }

    pub fn property_cleaner(&self, name: &str, argv: &[Variant], flags: u32) -> Result<Variant> {
        match self.0.properties.get(name).and_then(|p| p.cleaner.clone()) {
            Some(cleaner) => cleaner(argv),
            None => neutral_default(
                flags,
                PurcError::new(PurcErrorKind::NotSupported, format!("no cleaner for property '{name}'")),
            ),
        }
    }

    pub fn updater(&self, argv: &[Variant], flags: u32) -> Result<Variant> {
        match &self.0.updater {
            Some(f) => f(argv),
            None => neutral_default(flags, PurcError::new(PurcErrorKind::NotSupported, "entity has no updater")),
        }
    }

    pub fn cleaner(&self, argv: &[Variant], flags: u32) -> Result<Variant> {
        match &self.0.cleaner {
            Some(f) => f(argv),
            None => neutral_default(flags, PurcError::new(PurcErrorKind::NotSupported, "entity has no cleaner")),
        }
    }

    pub fn eraser(&self, argv: &[Variant], flags: u32) -> Result<Variant> {
        match &self.0.eraser {
            Some(f) => f(argv),
            None => neutral_default(flags, PurcError::new(PurcErrorKind::NotSupported, "entity has no eraser")),
        }
    }

    /// Returns `true` to allow the observer to attach.
    pub fn on_observe(&self, event: &str) -> bool {
        self.0.on_observe.as_ref().is_none_or(|f| f(event))
    }

    pub fn on_forget(&self, event: &str) -> bool {
        self.0.on_forget.as_ref().is_none_or(|f| f(event))
    }

    pub fn to_variant(&self) -> Variant {
        Variant::make_native(self.0.clone())
    }
}

impl NativeEntity for DynamicObjectInner {
    fn type_name(&self) -> &str {
        &self.type_name
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn unknown_property_getter_is_not_supported() {
        let obj = DynamicObject::builder("system").build();
        let err = obj.property_getter("unknown", &[], 0).unwrap_err();
        assert_eq!(err.kind, PurcErrorKind::NotSupported);
    }

    #[test]
    fn silently_flag_downgrades_to_neutral_value() {
        let obj = DynamicObject::builder("system").build();
        let v = obj.property_getter("unknown", &[], SILENTLY).unwrap();
        assert_eq!(v, Variant::make_boolean(false));
    }

    #[test]
    fn registered_getter_is_invoked() {
        let obj = DynamicObject::builder("math")
            .property_getter("pi", |_| Ok(Variant::make_number(std::f64::consts::PI)))
            .build();
        let v = obj.property_getter("pi", &[], 0).unwrap();
        assert_eq!(v, Variant::make_number(std::f64::consts::PI));
    }

    #[test]
    fn builder_wires_the_whole_entity_cleaner_and_eraser_hooks() {
        let obj = DynamicObject::builder("system")
            .cleaner(|_| Ok(Variant::make_boolean(true)))
            .eraser(|_| Ok(Variant::make_boolean(true)))
            .build();
        assert_eq!(obj.cleaner(&[], 0).unwrap(), Variant::make_boolean(true));
        assert_eq!(obj.eraser(&[], 0).unwrap(), Variant::make_boolean(true));
    }

    #[test]
    fn entity_without_cleaner_or_eraser_reports_not_supported() {
        let obj = DynamicObject::builder("system").build();
        assert_eq!(obj.cleaner(&[], 0).unwrap_err().kind, PurcErrorKind::NotSupported);
        assert_eq!(obj.eraser(&[], 0).unwrap_err().kind, PurcErrorKind::NotSupported);
    }

    #[test]
    fn on_release_runs_exactly_once_when_last_handle_drops() {
        let released = Rc::new(Cell::new(0));
        let released2 = released.clone();
        let obj = DynamicObject::builder("file")
            .on_release(move || released2.set(released2.get() + 1))
            .build();
        let clone = obj.clone();
        drop(obj);
        assert_eq!(released.get(), 0);
        drop(clone);
        assert_eq!(released.get(), 1);
    }
}
