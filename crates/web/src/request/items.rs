use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// A value stored in an [`Items`] bag.
pub type Item = Arc<dyn Any + Send + Sync>;

/// Item key a host sets to ask the executor for another attempt. Only its
/// presence is checked.
pub const RETRY_REQUEST_ITEM: &str = "RetryRequest";

/// Item key under which the router stores matched path parameters.
pub const PATH_PARAMS_ITEM: &str = "PathParams";

/// A per-request bag of typed values keyed by name.
#[derive(Clone, Default)]
pub struct Items {
    inner: HashMap<String, Item>,
}

impl Items {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert<T: Any + Send + Sync>(&mut self, key: impl Into<String>, value: T) {
        self.inner.insert(key.into(), Arc::new(value));
    }

    pub fn insert_item(&mut self, key: impl Into<String>, item: Item) {
        self.inner.insert(key.into(), item);
    }

    /// Returns the value under `key` if it is a `T`.
    pub fn get<T: Any>(&self, key: &str) -> Option<&T> {
        self.inner.get(key).and_then(|item| item.downcast_ref::<T>())
    }

    pub fn get_item(&self, key: &str) -> Option<&Item> {
        self.inner.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.inner.contains_key(key)
    }

    pub fn remove(&mut self, key: &str) -> Option<Item> {
        self.inner.remove(key)
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.inner.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Item)> {
        self.inner.iter().map(|(key, item)| (key.as_str(), item))
    }

    /// Marks the request for another attempt, see [`RETRY_REQUEST_ITEM`].
    pub fn request_retry(&mut self) {
        self.insert(RETRY_REQUEST_ITEM, true);
    }

    pub fn retry_requested(&self) -> bool {
        self.contains_key(RETRY_REQUEST_ITEM)
    }
}

impl Extend<(String, Item)> for Items {
    fn extend<T: IntoIterator<Item = (String, Item)>>(&mut self, iter: T) {
        self.inner.extend(iter);
    }
}

impl fmt::Debug for Items {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.inner.keys()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn typed_lookup() {
        let mut items = Items::new();
        items.insert("user", String::from("alice"));

        assert_eq!(items.get::<String>("user").map(String::as_str), Some("alice"));
        assert_eq!(items.get::<u32>("user"), None);
        assert!(items.get::<String>("missing").is_none());
    }

    #[test]
    fn retry_flag_is_presence_only() {
        let mut items = Items::new();
        assert!(!items.retry_requested());

        items.insert(RETRY_REQUEST_ITEM, false);
        assert!(items.retry_requested());

        items.remove(RETRY_REQUEST_ITEM);
        items.request_retry();
        assert!(items.retry_requested());
    }

    #[test]
    fn extend_shares_values() {
        let mut source = Items::new();
        source.insert("n", 7_u8);

        let mut target = Items::new();
        target.extend(source.iter().map(|(k, v)| (k.to_string(), Arc::clone(v))));

        assert_eq!(target.get::<u8>("n"), Some(&7));
        assert!(Arc::ptr_eq(source.get_item("n").unwrap(), target.get_item("n").unwrap()));
    }
}
