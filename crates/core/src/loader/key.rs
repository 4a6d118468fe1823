//! Cache identity for scalar and structured keys.

use std::collections::BTreeMap;
use std::fmt;
use std::hash::Hash;

/// A value that can be used as a [`super::BatchCache`] key.
///
/// Two keys hit the same cache entry if and only if their
/// [`CacheKey::cache_id`] values are equal.
pub trait CacheKey {
    /// Hashable identity of the key.
    type Id: Hash + Eq + Send + Sync + 'static;

    /// Derive the identity of this key.
    fn cache_id(&self) -> Self::Id;
}

macro_rules! scalar_cache_key {
    ($($ty:ty),* $(,)?) => {
        $(
            impl CacheKey for $ty {
                type Id = $ty;

                fn cache_id(&self) -> Self::Id {
                    self.clone()
                }
            }
        )*
    };
}

scalar_cache_key!((), bool, i32, i64, u32, u64, usize, String);

/// A single field value of a [`StructuredKey`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum KeyValue {
    Null,
    Bool(bool),
    Int(i64),
    /// Unsigned value above `i64::MAX`; smaller ones are [`KeyValue::Int`].
    UInt(u64),
    Str(String),
}

impl fmt::Display for KeyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("null"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int(i) => write!(f, "{i}"),
            Self::UInt(u) => write!(f, "{u}"),
            Self::Str(s) => write!(f, "{s:?}"),
        }
    }
}

impl From<bool> for KeyValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for KeyValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<i32> for KeyValue {
    fn from(value: i32) -> Self {
        Self::Int(value.into())
    }
}

impl From<u64> for KeyValue {
    fn from(value: u64) -> Self {
        i64::try_from(value).map_or(Self::UInt(value), Self::Int)
    }
}

impl From<usize> for KeyValue {
    fn from(value: usize) -> Self {
        (value as u64).into()
    }
}

impl From<&str> for KeyValue {
    fn from(value: &str) -> Self {
        Self::Str(value.to_owned())
    }
}

impl From<String> for KeyValue {
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}

impl<T: Into<KeyValue>> From<Option<T>> for KeyValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

/// A multi-field lookup key.
///
/// Fields are kept sorted by name, so the canonical identity does not
/// depend on the order in which fields were added.
///
/// ```
/// use kennel_core::loader::{CacheKey, StructuredKey};
///
/// let a = StructuredKey::new().field("name", "husky").field("limit", 10);
/// let b = StructuredKey::new().field("limit", 10).field("name", "husky");
/// assert_eq!(a.cache_id(), b.cache_id());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct StructuredKey {
    fields: BTreeMap<String, KeyValue>,
}

impl StructuredKey {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a field.
    pub fn field(mut self, name: impl Into<String>, value: impl Into<KeyValue>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    /// Look up a field value.
    pub fn get(&self, name: &str) -> Option<&KeyValue> {
        self.fields.get(name)
    }

    /// Canonical identity string: `"name"=value` pairs sorted by name.
    pub fn canonical(&self) -> String {
        self.fields
            .iter()
            .map(|(name, value)| format!("{name:?}={value}"))
            .collect::<Vec<_>>()
            .join(",")
    }
}

impl CacheKey for StructuredKey {
    type Id = String;

    fn cache_id(&self) -> Self::Id {
        self.canonical()
    }
}
