//! Container shapes and the per-client container registry used when
//! deserializing collection bodies.

use std::cell::RefCell;
use std::collections::{BTreeSet, VecDeque};
use std::collections::vec_deque;
use std::fmt;
use std::rc::{Rc, Weak};
use std::slice;

use crate::error::SerdesError;

/// Token identifying a concrete container shape for collection
/// deserialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ContainerKind {
    List,
    Deque,
    Set,
}

impl ContainerKind {
    const ALL: [ContainerKind; 3] = [ContainerKind::List, ContainerKind::Deque, ContainerKind::Set];
}

impl fmt::Display for ContainerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContainerKind::List => f.write_str("list"),
            ContainerKind::Deque => f.write_str("deque"),
            ContainerKind::Set => f.write_str("set"),
        }
    }
}

/// A deserialized collection, tagged by the container shape that was
/// requested.
///
/// The `Set` variant is an insertion-ordered array set: membership is
/// decided by `PartialEq` and duplicates are dropped on push. This keeps
/// element requirements down to `PartialEq` (floating-point and record
/// types stay usable) at the cost of linear membership checks.
#[derive(Debug, Clone, PartialEq)]
pub enum Container<T> {
    List(Vec<T>),
    Deque(VecDeque<T>),
    Set(Vec<T>),
}

impl<T> Container<T> {
    /// The shape tag this container was created with.
    pub fn kind(&self) -> ContainerKind {
        match self {
            Container::List(_) => ContainerKind::List,
            Container::Deque(_) => ContainerKind::Deque,
            Container::Set(_) => ContainerKind::Set,
        }
    }

    /// A list container over existing items.
    pub fn list(items: Vec<T>) -> Self {
        Container::List(items)
    }

    pub fn len(&self) -> usize {
        match self {
            Container::List(items) | Container::Set(items) => items.len(),
            Container::Deque(items) => items.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Append an item, preserving arrival order. For `Set`, items equal to
    /// an already-present one are dropped.
    pub fn push(&mut self, item: T)
    where
        T: PartialEq,
    {
        match self {
            Container::List(items) => items.push(item),
            Container::Deque(items) => items.push_back(item),
            Container::Set(items) => {
                if !items.contains(&item) {
                    items.push(item);
                }
            }
        }
    }

    pub fn iter(&self) -> ContainerIter<'_, T> {
        match self {
            Container::List(items) | Container::Set(items) => {
                ContainerIter(IterInner::Slice(items.iter()))
            }
            Container::Deque(items) => ContainerIter(IterInner::Deque(items.iter())),
        }
    }

    /// The items in order, discarding the shape tag.
    pub fn into_vec(self) -> Vec<T> {
        match self {
            Container::List(items) | Container::Set(items) => items,
            Container::Deque(items) => items.into_iter().collect(),
        }
    }
}

/// Iterator over a [`Container`]'s items in order.
pub struct ContainerIter<'a, T>(IterInner<'a, T>);

enum IterInner<'a, T> {
    Slice(slice::Iter<'a, T>),
    Deque(vec_deque::Iter<'a, T>),
}

impl<'a, T> Iterator for ContainerIter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<&'a T> {
        match &mut self.0 {
            IterInner::Slice(it) => it.next(),
            IterInner::Deque(it) => it.next(),
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        match &self.0 {
            IterInner::Slice(it) => it.size_hint(),
            IterInner::Deque(it) => it.size_hint(),
        }
    }
}

/// Per-client registry of the container shapes collection deserialization
/// may instantiate.
///
/// Owned by the client instance and passed by reference through the
/// deserialization context; there is no process-wide state, so independent
/// registries stay isolated. All shapes are enabled by default.
#[derive(Debug, Clone)]
pub struct ContainerRegistry {
    enabled: Rc<RefCell<BTreeSet<ContainerKind>>>,
}

impl Default for ContainerRegistry {
    fn default() -> Self {
        Self {
            enabled: Rc::new(RefCell::new(ContainerKind::ALL.into_iter().collect())),
        }
    }
}

impl ContainerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn supports(&self, kind: ContainerKind) -> bool {
        self.enabled.borrow().contains(&kind)
    }

    /// Enable a container shape, returning a handle that disables it again
    /// on [`FactoryRegistration::unregister`].
    pub fn enable(&self, kind: ContainerKind) -> FactoryRegistration {
        self.enabled.borrow_mut().insert(kind);
        FactoryRegistration {
            enabled: Rc::downgrade(&self.enabled),
            kind,
        }
    }

    /// Disable a container shape; subsequent requests for it fail with
    /// [`SerdesError::UnableToDeserialize`].
    pub fn disable(&self, kind: ContainerKind) {
        self.enabled.borrow_mut().remove(&kind);
    }

    /// A fresh empty container of the requested shape.
    pub fn new_container<T>(&self, kind: ContainerKind) -> Result<Container<T>, SerdesError> {
        if !self.supports(kind) {
            return Err(SerdesError::UnableToDeserialize(format!(
                "unsupported container type {kind}"
            )));
        }
        Ok(match kind {
            ContainerKind::List => Container::List(Vec::new()),
            ContainerKind::Deque => Container::Deque(VecDeque::new()),
            ContainerKind::Set => Container::Set(Vec::new()),
        })
    }
}

/// Capability handle undoing one [`ContainerRegistry::enable`] call.
#[derive(Debug)]
pub struct FactoryRegistration {
    enabled: Weak<RefCell<BTreeSet<ContainerKind>>>,
    kind: ContainerKind,
}

impl FactoryRegistration {
    /// Disable the shape this handle enabled. A no-op when called again or
    /// after the registry is gone.
    pub fn unregister(&self) {
        if let Some(enabled) = self.enabled.upgrade() {
            enabled.borrow_mut().remove(&self.kind);
        }
    }
}
