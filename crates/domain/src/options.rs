//! Render options shared between a handler and the checkers that inspect it.

use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;
use serde_json::{Map, Value};

/// Data a handler passes to a template render.
///
/// This is a handle: cloning it shares the underlying mapping rather than
/// copying it, so a checker sees exactly the mapping the handler supplied and
/// any mutation made through one handle is visible through every other.
#[derive(Clone, Default)]
pub struct RenderOptions {
    inner: Arc<RwLock<Map<String, Value>>>,
}

impl RenderOptions {
    /// Creates an empty options mapping.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates options from an existing JSON object.
    #[must_use]
    pub fn from_map(map: Map<String, Value>) -> Self {
        Self {
            inner: Arc::new(RwLock::new(map)),
        }
    }

    /// Adds a value (builder pattern).
    #[must_use]
    pub fn with(self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    /// Returns a copy of the value stored under `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<Value> {
        self.inner.read().get(key).cloned()
    }

    /// Returns the value under `key` if it is a string.
    #[must_use]
    pub fn get_str(&self, key: &str) -> Option<String> {
        self.inner
            .read()
            .get(key)
            .and_then(Value::as_str)
            .map(ToString::to_string)
    }

    /// Inserts a value, returning the one it replaced.
    pub fn insert(&self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.inner.write().insert(key.into(), value.into())
    }

    /// Removes a value.
    pub fn remove(&self, key: &str) -> Option<Value> {
        self.inner.write().remove(key)
    }

    /// Returns true if `key` is present.
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.inner.read().contains_key(key)
    }

    /// Returns the number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.read().len()
    }

    /// Returns true if there are no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.read().is_empty()
    }

    /// Copies the current contents into a JSON object.
    #[must_use]
    pub fn snapshot(&self) -> Value {
        Value::Object(self.inner.read().clone())
    }

    /// Returns true if both handles refer to the same mapping.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl fmt::Debug for RenderOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("RenderOptions")
            .field(&*self.inner.read())
            .finish()
    }
}

impl From<Map<String, Value>> for RenderOptions {
    fn from(map: Map<String, Value>) -> Self {
        Self::from_map(map)
    }
}

impl TryFrom<Value> for RenderOptions {
    type Error = Value;

    /// Accepts a JSON object; any other value is handed back unchanged.
    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Object(map) => Ok(Self::from_map(map)),
            other => Err(other),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_clone_shares_mapping() {
        let options = RenderOptions::new().with("foo", "bar");
        let seen_by_checker = options.clone();

        seen_by_checker.insert("checked", true);

        assert!(options.ptr_eq(&seen_by_checker));
        assert_eq!(options.get("checked"), Some(json!(true)));
    }

    #[test]
    fn test_separate_mappings_are_not_identical() {
        let a = RenderOptions::new().with("foo", "bar");
        let b = RenderOptions::new().with("foo", "bar");
        assert!(!a.ptr_eq(&b));
        assert_eq!(a.snapshot(), b.snapshot());
    }

    #[test]
    fn test_try_from_value() {
        let options = RenderOptions::try_from(json!({"foo": "bar"})).unwrap();
        assert_eq!(options.get_str("foo").as_deref(), Some("bar"));
        assert_eq!(options.len(), 1);

        let rejected = RenderOptions::try_from(json!([1, 2]));
        assert_eq!(rejected.unwrap_err(), json!([1, 2]));
    }

    #[test]
    fn test_remove() {
        let options = RenderOptions::new().with("foo", 1);
        assert_eq!(options.remove("foo"), Some(json!(1)));
        assert!(options.is_empty());
        assert!(!options.contains_key("foo"));
    }
}
