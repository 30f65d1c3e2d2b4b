//! Keyed State Store
//!
//! A small, type-safe store holding strongly-typed properties per entity.
//!
//! # Features
//!
//! - **Type-safe Storage**: store and retrieve properties by type
//! - **Serialized Updates**: read-modify-write under a per-entity lock
//! - **Generic Entity IDs**: any hashable type identifies an entity
//! - **Idle Pruning**: drop entities that have not been written recently
//!
//! # Quick Start
//!
//! ```rust
//! use state_store::{StateStore, Property};
//!
//! #[derive(Clone, PartialEq, Debug)]
//! struct LastSeen(i64);
//!
//! impl Property for LastSeen {
//!     const KEY: &'static str = "last_seen";
//! }
//!
//! let store = StateStore::<String>::new();
//! store.set(&"feed-1".to_string(), LastSeen(1_700_000_000));
//!
//! assert_eq!(
//!     store.get::<LastSeen>(&"feed-1".to_string()),
//!     Some(LastSeen(1_700_000_000))
//! );
//! ```
//!
//! # Architecture
//!
//! ```text
//! StateStore<Id>
//!     │
//!     └── entities: RwLock<HashMap<Id, Arc<Mutex<Slot>>>>
//!             │
//!             └── Slot { bag: PropertyBag, touched: Instant }
//!                     │
//!                     └── PropertyBag: HashMap<TypeId, (key, Box<dyn Any>)>
//! ```

pub mod property;
pub mod store;

pub use property::Property;
pub use store::StateStore;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::property::Property;
    pub use crate::store::StateStore;
}
