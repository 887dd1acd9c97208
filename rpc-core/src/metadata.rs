//! Header and trailer metadata.
//!
//! Metadata is an ordered multi-map of ASCII-case-insensitive keys to string
//! values. The interceptor chain treats it as opaque and only hands it along;
//! interceptors and transports read and modify it.

use serde::{Deserialize, Serialize};

/// Metadata sent at the start of a call.
pub type Headers = Metadata;

/// Metadata sent when a call is closed.
pub type Trailers = Metadata;

/// Ordered key/value carrier for call headers and trailers.
///
/// Keys are normalized to ASCII lowercase on insertion. A key may carry more
/// than one value; insertion order is preserved.
///
/// # Examples
///
/// ```rust
/// use rpc_core::metadata::Metadata;
///
/// let mut headers = Metadata::new();
/// headers.insert("Authorization", "Bearer abc");
/// assert_eq!(headers.get("authorization"), Some("Bearer abc"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metadata {
    entries: Vec<(String, String)>,
}

impl Metadata {
    /// Create empty metadata.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace every value of `key` with `value`.
    pub fn insert(&mut self, key: impl AsRef<str>, value: impl Into<String>) {
        let key = normalize(key.as_ref());
        self.entries.retain(|(k, _)| *k != key);
        self.entries.push((key, value.into()));
    }

    /// Add `value` to `key`, keeping existing values.
    pub fn append(&mut self, key: impl AsRef<str>, value: impl Into<String>) {
        self.entries.push((normalize(key.as_ref()), value.into()));
    }

    /// Last value stored under `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        let key = normalize(key);
        self.entries
            .iter()
            .rev()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Every value stored under `key`, in insertion order.
    pub fn get_all<'a>(&'a self, key: &str) -> impl Iterator<Item = &'a str> + 'a {
        let key = normalize(key);
        self.entries
            .iter()
            .filter(move |(k, _)| *k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Whether `key` has at least one value.
    pub fn contains_key(&self, key: &str) -> bool {
        let key = normalize(key);
        self.entries.iter().any(|(k, _)| *k == key)
    }

    /// Remove every value of `key`, returning how many were removed.
    pub fn remove(&mut self, key: &str) -> usize {
        let key = normalize(key);
        let before = self.entries.len();
        self.entries.retain(|(k, _)| *k != key);
        before - self.entries.len()
    }

    /// Append every entry of `other`.
    pub fn merge(&mut self, other: Metadata) {
        self.entries.extend(other.entries);
    }

    /// Iterate over all entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Distinct keys in first-seen order.
    pub fn keys(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = Vec::new();
        for (k, _) in &self.entries {
            if !keys.contains(&k.as_str()) {
                keys.push(k);
            }
        }
        keys
    }

    /// Number of entries, counting repeated keys.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether there are no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for Metadata
where
    K: AsRef<str>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut metadata = Metadata::new();
        for (key, value) in iter {
            metadata.append(key, value);
        }
        metadata
    }
}

fn normalize(key: &str) -> String {
    key.to_ascii_lowercase()
}
