//! Registry mapping (target type, media type pattern) to serializers and
//! deserializers, with wildcard-aware lookup and specificity precedence.
//!
//! Bindings live in ordered maps keyed so that iteration visits the most
//! specific pattern first; a lookup returns the first binding whose pattern
//! matches the concrete content type. The registry is a cheaply clonable
//! handle and is safe only under the crate's single-threaded execution
//! model: registration is expected during setup, lookups on every
//! request/response cycle.

use std::any::{Any, TypeId};
use std::cell::{Cell, RefCell};
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::rc::{Rc, Weak};

use crate::error::{Direction, SerdesError};
use crate::media::MediaTypePattern;
use crate::{Deserializer, Serializer};

/// Map key: target type plus pattern, ordered by type and then by pattern
/// specificity so that literal patterns precede wildcard ones.
#[derive(Debug, Clone)]
struct BindingKey {
    type_name: &'static str,
    type_id: TypeId,
    pattern: MediaTypePattern,
}

impl BindingKey {
    fn new<T: 'static>(pattern: MediaTypePattern) -> Self {
        Self {
            type_name: std::any::type_name::<T>(),
            type_id: TypeId::of::<T>(),
            pattern,
        }
    }
}

impl PartialEq for BindingKey {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for BindingKey {}

impl PartialOrd for BindingKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for BindingKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.type_name
            .cmp(other.type_name)
            .then_with(|| self.type_id.cmp(&other.type_id))
            .then_with(|| self.pattern.specificity_cmp(&other.pattern))
    }
}

#[derive(Default)]
struct Inner {
    serializers: BTreeMap<BindingKey, Box<dyn Any>>,
    deserializers: BTreeMap<BindingKey, Box<dyn Any>>,
}

/// Registry of serializer and deserializer bindings per target type.
///
/// Re-registering a binding for an identical (type, pattern) pair silently
/// replaces the previous handler (last-write-wins). Registration handles
/// remove exactly the bindings their call created.
#[derive(Clone, Default)]
pub struct SerdesRegistry {
    inner: Rc<RefCell<Inner>>,
}

impl SerdesRegistry {
    /// An empty registry. Clients usually pre-register built-in serdes on
    /// top of this.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a serializer under every pattern it declares via
    /// [`Serializer::produces`]. Patterns are validated up front; on a
    /// malformed pattern nothing is registered.
    pub fn register_serializer<T, S>(&self, serializer: S) -> Result<Registration, SerdesError>
    where
        T: 'static,
        S: Serializer<Value = T> + 'static,
    {
        self.register_serializer_rc(Rc::new(serializer) as Rc<dyn Serializer<Value = T>>)
    }

    /// Register a deserializer under every pattern it declares via
    /// [`Deserializer::accepts`].
    pub fn register_deserializer<T, D>(&self, deserializer: D) -> Result<Registration, SerdesError>
    where
        T: 'static,
        D: Deserializer<Value = T> + 'static,
    {
        self.register_deserializer_rc(Rc::new(deserializer) as Rc<dyn Deserializer<Value = T>>)
    }

    /// Register one handler for both directions. The returned registration
    /// covers the serializer and deserializer bindings together.
    pub fn register_serdes<T, S>(&self, serdes: S) -> Result<Registration, SerdesError>
    where
        T: 'static,
        S: Serializer<Value = T> + Deserializer<Value = T> + 'static,
    {
        let shared = Rc::new(serdes);
        // Validate both pattern lists before touching the maps.
        let produced = parse_patterns(Serializer::produces(shared.as_ref()))?;
        let accepted = parse_patterns(Deserializer::accepts(shared.as_ref()))?;

        let mut inner = self.inner.borrow_mut();
        let serializer_keys = insert_bindings::<T>(
            &mut inner.serializers,
            produced,
            Rc::clone(&shared) as Rc<dyn Serializer<Value = T>>,
        );
        let deserializer_keys = insert_bindings::<T>(
            &mut inner.deserializers,
            accepted,
            shared as Rc<dyn Deserializer<Value = T>>,
        );
        drop(inner);

        Ok(self.registration(serializer_keys, deserializer_keys))
    }

    /// Register a shared serializer handle.
    pub fn register_serializer_rc<T: 'static>(
        &self,
        handler: Rc<dyn Serializer<Value = T>>,
    ) -> Result<Registration, SerdesError> {
        let patterns = parse_patterns(handler.produces())?;
        let keys = insert_bindings::<T>(&mut self.inner.borrow_mut().serializers, patterns, handler);
        Ok(self.registration(keys, Vec::new()))
    }

    /// Register a shared deserializer handle.
    pub fn register_deserializer_rc<T: 'static>(
        &self,
        handler: Rc<dyn Deserializer<Value = T>>,
    ) -> Result<Registration, SerdesError> {
        let patterns = parse_patterns(handler.accepts())?;
        let keys =
            insert_bindings::<T>(&mut self.inner.borrow_mut().deserializers, patterns, handler);
        Ok(self.registration(Vec::new(), keys))
    }

    /// The highest-precedence serializer for `T` whose pattern matches the
    /// concrete content type. Fails with
    /// [`SerdesError::NoSerdesRegistered`] when nothing matches.
    pub fn serializer_for<T: 'static>(
        &self,
        content_type: &str,
    ) -> Result<Rc<dyn Serializer<Value = T>>, SerdesError> {
        let concrete = MediaTypePattern::parse(content_type)?;
        let inner = self.inner.borrow();
        for (key, handler) in &inner.serializers {
            if key.type_id == TypeId::of::<T>() && key.pattern.matches(&concrete) {
                let handler = handler
                    .downcast_ref::<Rc<dyn Serializer<Value = T>>>()
                    .expect("binding key and handler type agree");
                return Ok(Rc::clone(handler));
            }
        }
        Err(SerdesError::NoSerdesRegistered {
            direction: Direction::Serializer,
            type_name: std::any::type_name::<T>(),
            content_type: content_type.to_string(),
        })
    }

    /// The highest-precedence deserializer for `T` whose pattern matches
    /// the concrete content type.
    pub fn deserializer_for<T: 'static>(
        &self,
        content_type: &str,
    ) -> Result<Rc<dyn Deserializer<Value = T>>, SerdesError> {
        let concrete = MediaTypePattern::parse(content_type)?;
        let inner = self.inner.borrow();
        for (key, handler) in &inner.deserializers {
            if key.type_id == TypeId::of::<T>() && key.pattern.matches(&concrete) {
                let handler = handler
                    .downcast_ref::<Rc<dyn Deserializer<Value = T>>>()
                    .expect("binding key and handler type agree");
                return Ok(Rc::clone(handler));
            }
        }
        Err(SerdesError::NoSerdesRegistered {
            direction: Direction::Deserializer,
            type_name: std::any::type_name::<T>(),
            content_type: content_type.to_string(),
        })
    }

    fn registration(
        &self,
        serializer_keys: Vec<BindingKey>,
        deserializer_keys: Vec<BindingKey>,
    ) -> Registration {
        Registration {
            inner: Rc::downgrade(&self.inner),
            serializer_keys,
            deserializer_keys,
            done: Cell::new(false),
        }
    }
}

fn parse_patterns(texts: &[&str]) -> Result<Vec<MediaTypePattern>, SerdesError> {
    texts.iter().map(|text| MediaTypePattern::parse(text)).collect()
}

fn insert_bindings<T: 'static>(
    map: &mut BTreeMap<BindingKey, Box<dyn Any>>,
    patterns: Vec<MediaTypePattern>,
    handler: impl Any + Clone,
) -> Vec<BindingKey> {
    let mut keys = Vec::with_capacity(patterns.len());
    for pattern in patterns {
        let key = BindingKey::new::<T>(pattern);
        map.insert(key.clone(), Box::new(handler.clone()));
        keys.push(key);
    }
    keys
}

/// Capability handle removing exactly the bindings created by one
/// registration call.
///
/// `unregister` is idempotent: the second and later calls are no-ops, as is
/// unregistering after the registry itself was dropped. Note that a stale
/// handle kept across a replacing re-registration of the same (type,
/// pattern) pair would remove the replacement, mirroring last-write-wins
/// registration.
#[derive(Debug)]
pub struct Registration {
    inner: Weak<RefCell<Inner>>,
    serializer_keys: Vec<BindingKey>,
    deserializer_keys: Vec<BindingKey>,
    done: Cell<bool>,
}

impl Registration {
    /// Remove the bindings this registration created.
    pub fn unregister(&self) {
        if self.done.replace(true) {
            return;
        }
        if let Some(inner) = self.inner.upgrade() {
            let mut inner = inner.borrow_mut();
            for key in &self.serializer_keys {
                inner.serializers.remove(key);
            }
            for key in &self.deserializer_keys {
                inner.deserializers.remove(key);
            }
        }
    }
}
