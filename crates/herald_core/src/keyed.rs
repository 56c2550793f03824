//! Serde adapter for keyed sub-collections.
//!
//! Discord delivers a guild's roles, channels, members and so on as JSON
//! arrays. The models store them as maps keyed by each entry's identifier, so
//! merges can union them by key.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::HashMap;
use std::hash::Hash;

/// An entity that knows the key it is stored under.
pub trait Keyed {
    /// Key type of the entity.
    type Key: Copy + Eq + Hash;

    /// Key this entity is stored under.
    fn key(&self) -> Self::Key;
}

/// Collect entities into a map keyed by [`Keyed::key`]. Later entries win.
pub fn collect<T, I>(entries: I) -> HashMap<T::Key, T>
where
    T: Keyed,
    I: IntoIterator<Item = T>,
{
    entries
        .into_iter()
        .map(|entry| (entry.key(), entry))
        .collect()
}

/// Serialize the map as an array of its values.
pub fn serialize<T, S>(map: &HashMap<T::Key, T>, serializer: S) -> Result<S::Ok, S::Error>
where
    T: Keyed + Serialize,
    S: Serializer,
{
    serializer.collect_seq(map.values())
}

/// Deserialize an array into a map keyed by each entry's identifier.
pub fn deserialize<'de, T, D>(deserializer: D) -> Result<HashMap<T::Key, T>, D::Error>
where
    T: Keyed + Deserialize<'de>,
    D: Deserializer<'de>,
{
    let entries = Vec::<T>::deserialize(deserializer)?;
    Ok(collect(entries))
}
