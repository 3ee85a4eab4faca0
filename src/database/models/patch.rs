//! Serde helpers for PATCH payloads, where a missing field and an explicit `null` mean
//! different things.

use serde::{Deserialize, Deserializer};

/// For nullable columns: absent → `None`, `null` → `Some(None)`, value → `Some(Some(v))`.
/// Pair with `#[serde(default)]`.
pub fn nullable<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// For NOT NULL columns: absent → `None`, value → `Some(v)`, and `null` is an error.
/// Pair with `#[serde(default)]`.
pub fn required<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    T::deserialize(deserializer).map(Some)
}
