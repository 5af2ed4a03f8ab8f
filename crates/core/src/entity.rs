//! Entity trait: records the catalog looks up by typed id.

/// A catalog record with a stable identity.
pub trait Entity {
    /// Strongly-typed entity identifier.
    type Id: Copy + Eq + core::hash::Hash + core::fmt::Debug + core::fmt::Display;

    /// Human-readable entity kind, used in error messages (e.g. `"invoice"`).
    const KIND: &'static str;

    /// Returns the entity identifier.
    fn id(&self) -> &Self::Id;
}
