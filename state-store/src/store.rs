//! Type-erased property storage and state management
//!
//! This module provides the core storage primitives:
//! - `PropertyBag`: type-erased storage for a single entity's properties (internal)
//! - `StateStore<Id>`: collection of entities, each behind its own lock

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::{Mutex, RwLock};

use crate::property::Property;

// ============================================================================
// PropertyBag - type-erased property storage for a single entity
// ============================================================================

/// Type-erased storage for an entity's properties
///
/// Uses `TypeId` to store and retrieve strongly-typed values. Each slot
/// remembers the property's `KEY` for debug output.
pub(crate) struct PropertyBag {
    values: HashMap<TypeId, (&'static str, Box<dyn Any + Send + Sync>)>,
}

impl PropertyBag {
    /// Create a new empty property bag
    pub fn new() -> Self {
        Self {
            values: HashMap::new(),
        }
    }

    /// Get a property value by type
    pub fn get<P: Property>(&self) -> Option<P> {
        self.values
            .get(&TypeId::of::<P>())
            .and_then(|(_, boxed)| boxed.downcast_ref::<P>())
            .cloned()
    }

    /// Set a property value, returning whether the stored value changed
    pub fn set<P: Property>(&mut self, value: P) -> bool {
        let type_id = TypeId::of::<P>();
        let current = self
            .values
            .get(&type_id)
            .and_then(|(_, boxed)| boxed.downcast_ref::<P>());

        if current == Some(&value) {
            return false;
        }

        self.values.insert(type_id, (P::KEY, Box::new(value)));
        true
    }

    /// Keys of all properties currently stored, sorted
    fn keys(&self) -> Vec<&'static str> {
        let mut keys: Vec<_> = self.values.values().map(|(key, _)| *key).collect();
        keys.sort_unstable();
        keys
    }
}

impl Default for PropertyBag {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for PropertyBag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PropertyBag")
            .field("keys", &self.keys())
            .finish()
    }
}

// ============================================================================
// StateStore<Id> - keyed entity store
// ============================================================================

/// One entity's properties plus the last time they were written
struct Slot {
    bag: PropertyBag,
    touched: Instant,
}

impl Slot {
    fn new() -> Self {
        Self {
            bag: PropertyBag::new(),
            touched: Instant::now(),
        }
    }
}

/// Keyed state store with per-entity serialized mutation
///
/// Every entity lives behind its own mutex, so [`update`](Self::update)
/// runs its read-modify-write without interleaving with other writers of
/// the same entity, while different entities proceed in parallel. Clones
/// share the same underlying storage.
///
/// # Example
///
/// ```rust
/// use state_store::{StateStore, Property};
///
/// #[derive(Clone, PartialEq, Debug, Default)]
/// struct Hits(u32);
/// impl Property for Hits {
///     const KEY: &'static str = "hits";
/// }
///
/// let store = StateStore::<String>::new();
/// let id = "feed-1".to_string();
///
/// store.update(&id, |hits: Option<Hits>| Hits(hits.unwrap_or_default().0 + 1));
/// store.update(&id, |hits: Option<Hits>| Hits(hits.unwrap_or_default().0 + 1));
///
/// assert_eq!(store.get::<Hits>(&id), Some(Hits(2)));
/// ```
pub struct StateStore<Id>
where
    Id: Clone + Eq + Hash + Send + Sync + 'static,
{
    entities: Arc<RwLock<HashMap<Id, Arc<Mutex<Slot>>>>>,
}

impl<Id> StateStore<Id>
where
    Id: Clone + Eq + Hash + Send + Sync + 'static,
{
    /// Create a new empty state store
    pub fn new() -> Self {
        Self {
            entities: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Get the slot for an entity, creating it if missing
    fn slot(&self, entity_id: &Id) -> Arc<Mutex<Slot>> {
        if let Some(slot) = self.entities.read().get(entity_id) {
            return Arc::clone(slot);
        }

        let mut entities = self.entities.write();
        Arc::clone(
            entities
                .entry(entity_id.clone())
                .or_insert_with(|| Arc::new(Mutex::new(Slot::new()))),
        )
    }

    fn existing_slot(&self, entity_id: &Id) -> Option<Arc<Mutex<Slot>>> {
        self.entities.read().get(entity_id).map(Arc::clone)
    }

    /// Get a property value for an entity
    ///
    /// Returns `None` if the entity doesn't exist or the property isn't set.
    pub fn get<P: Property>(&self, entity_id: &Id) -> Option<P> {
        let slot = self.existing_slot(entity_id)?;
        let slot = slot.lock();
        slot.bag.get::<P>()
    }

    /// Set a property value, returning whether the stored value changed
    pub fn set<P: Property>(&self, entity_id: &Id, value: P) -> bool {
        let slot = self.slot(entity_id);
        let mut slot = slot.lock();
        slot.touched = Instant::now();
        slot.bag.set(value)
    }

    /// Read-modify-write a property while holding the entity's lock
    ///
    /// `f` receives the current value (if any) and returns the value to
    /// store. Concurrent updates to the same entity are applied one after
    /// another; none is lost.
    pub fn update<P, F>(&self, entity_id: &Id, f: F) -> P
    where
        P: Property,
        F: FnOnce(Option<P>) -> P,
    {
        let slot = self.slot(entity_id);
        let mut slot = slot.lock();
        let next = f(slot.bag.get::<P>());
        slot.bag.set(next.clone());
        slot.touched = Instant::now();
        next
    }

    pub fn entity_count(&self) -> usize {
        self.entities.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entity_count() == 0
    }

    /// Drop entities not written for at least `max_idle`
    ///
    /// Entities whose lock is currently held are kept. Returns the number
    /// of entities removed.
    pub fn prune_idle(&self, max_idle: Duration) -> usize {
        let mut entities = self.entities.write();
        let before = entities.len();
        entities.retain(|_, slot| match slot.try_lock() {
            Some(slot) => slot.touched.elapsed() < max_idle,
            None => true,
        });
        before - entities.len()
    }
}

impl<Id> Default for StateStore<Id>
where
    Id: Clone + Eq + Hash + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<Id> Clone for StateStore<Id>
where
    Id: Clone + Eq + Hash + Send + Sync + 'static,
{
    fn clone(&self) -> Self {
        Self {
            entities: Arc::clone(&self.entities),
        }
    }
}

impl<Id> std::fmt::Debug for StateStore<Id>
where
    Id: Clone + Eq + Hash + Send + Sync + 'static,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StateStore")
            .field("entity_count", &self.entity_count())
            .finish()
    }
}
