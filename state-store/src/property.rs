//! Property trait for typed values held per entity
//!
//! Anything stored in a [`StateStore`](crate::StateStore) implements
//! `Property`. The `KEY` names the property in debug output.
//!
//! # Example
//!
//! ```rust
//! use state_store::Property;
//!
//! #[derive(Clone, PartialEq, Debug, Default)]
//! pub struct MissCount(pub u32);
//!
//! impl Property for MissCount {
//!     const KEY: &'static str = "miss_count";
//! }
//! ```

/// Marker trait for values that can live in a store
///
/// `PartialEq` is used to report whether a `set` actually changed the
/// stored value. `Send + Sync + 'static` allow type-erased storage behind
/// the store's locks.
pub trait Property: Clone + Send + Sync + PartialEq + 'static {
    /// Human-readable identifier of this property type
    const KEY: &'static str;
}
