//! Header types shared by wire requests and responses.
//!
//! A wire message carries its headers as a plain ordered list of [`HttpHeader`].
//! [`HeaderSet`] is the deduplicated view over such a list: keys are compared
//! ASCII case-insensitively and a set never holds two entries with equal keys.

use serde::{Deserialize, Serialize};

/// A single `key: value` header pair as it travels on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HttpHeader {
    pub key: String,
    pub value: String,
}

impl HttpHeader {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self { key: key.into(), value: value.into() }
    }

    /// Returns true if this header's key equals `key`, ignoring ASCII case.
    #[inline]
    pub fn is(&self, key: &str) -> bool {
        self.key.eq_ignore_ascii_case(key)
    }
}

/// Finds the first header in `headers` whose key matches `key` case-insensitively.
pub fn find_header<'a>(headers: &'a [HttpHeader], key: &str) -> Option<&'a HttpHeader> {
    headers.iter().find(|header| header.is(key))
}

/// An ordered collection of headers with case-insensitive, unique keys.
///
/// Insertion order is preserved; overwriting a key keeps the position of the
/// original entry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderSet {
    entries: Vec<HttpHeader>,
}

impl HeaderSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets `key` to `value`, replacing the value of an existing entry with the same key.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.position(&key) {
            Some(index) => self.entries[index].value = value,
            None => self.entries.push(HttpHeader { key, value }),
        }
    }

    /// Adds `value` under `key`; if the key already exists the values are joined with `,`.
    ///
    /// This is how repeated wire headers are folded into a single entry.
    pub fn append(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.position(&key) {
            Some(index) => {
                let existing = &mut self.entries[index].value;
                existing.push(',');
                existing.push_str(&value);
            }
            None => self.entries.push(HttpHeader { key, value }),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.position(key).map(|index| self.entries[index].value.as_str())
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.position(key).is_some()
    }

    /// Removes the entry for `key`, returning its value.
    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.position(key).map(|index| self.entries.remove(index).value)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &HttpHeader> {
        self.entries.iter()
    }

    /// Appends every entry of this set to `target`, skipping keys `target` already has.
    ///
    /// Headers present in `target` always win, whatever order merges happen in.
    pub fn merge(&self, target: &mut Vec<HttpHeader>) {
        for header in &self.entries {
            if find_header(target, &header.key).is_some() {
                continue;
            }
            target.push(header.clone());
        }
    }

    pub fn into_vec(self) -> Vec<HttpHeader> {
        self.entries
    }

    fn position(&self, key: &str) -> Option<usize> {
        self.entries.iter().position(|header| header.is(key))
    }
}

/// Folds a wire header list into a set, joining repeated keys.
impl From<&[HttpHeader]> for HeaderSet {
    fn from(headers: &[HttpHeader]) -> Self {
        let mut set = HeaderSet::new();
        for header in headers {
            set.append(header.key.as_str(), header.value.as_str());
        }
        set
    }
}

impl From<HeaderSet> for Vec<HttpHeader> {
    fn from(set: HeaderSet) -> Self {
        set.into_vec()
    }
}

impl<K, V> FromIterator<(K, V)> for HeaderSet
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut set = HeaderSet::new();
        for (key, value) in iter {
            set.set(key, value);
        }
        set
    }
}

impl<'a> IntoIterator for &'a HeaderSet {
    type Item = &'a HttpHeader;
    type IntoIter = std::slice::Iter<'a, HttpHeader>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_overwrites_ignoring_case() {
        let mut set = HeaderSet::new();
        set.set("Content-Type", "text/plain");
        set.set("x-trace", "1");
        set.set("content-type", "application/json");

        assert_eq!(set.len(), 2);
        assert_eq!(set.get("CONTENT-TYPE"), Some("application/json"));
        // position of the first insertion is kept
        assert_eq!(set.iter().next().unwrap().key, "Content-Type");
    }

    #[test]
    fn append_joins_repeated_keys() {
        let mut set = HeaderSet::new();
        set.append("Accept", "text/html");
        set.append("accept", "application/json");

        assert_eq!(set.len(), 1);
        assert_eq!(set.get("Accept"), Some("text/html,application/json"));
    }

    #[test]
    fn remove_and_contains() {
        let mut set: HeaderSet = [("A", "1"), ("B", "2")].into_iter().collect();
        assert!(set.contains_key("a"));
        assert_eq!(set.remove("A"), Some("1".to_string()));
        assert!(!set.contains_key("a"));
        assert_eq!(set.remove("missing"), None);
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn merge_keeps_existing_target_headers() {
        let defaults: HeaderSet = [("Accept", "application/json"), ("X-Client", "local")].into_iter().collect();
        let mut target = vec![HttpHeader::new("accept", "text/plain")];

        defaults.merge(&mut target);

        assert_eq!(target.len(), 2);
        assert_eq!(target[0], HttpHeader::new("accept", "text/plain"));
        assert_eq!(target[1], HttpHeader::new("X-Client", "local"));
    }

    #[test]
    fn merge_order_does_not_matter() {
        let first: HeaderSet = [("X-Tenant", "a")].into_iter().collect();
        let second: HeaderSet = [("x-tenant", "b"), ("X-Other", "c")].into_iter().collect();

        let mut target = vec![HttpHeader::new("X-TENANT", "explicit")];
        first.merge(&mut target);
        second.merge(&mut target);

        let mut reversed = vec![HttpHeader::new("X-TENANT", "explicit")];
        second.merge(&mut reversed);
        first.merge(&mut reversed);

        assert_eq!(find_header(&target, "x-tenant").unwrap().value, "explicit");
        assert_eq!(find_header(&reversed, "x-tenant").unwrap().value, "explicit");
        assert_eq!(target.len(), 2);
        assert_eq!(reversed.len(), 2);
    }

    #[test]
    fn from_wire_list_folds_duplicates() {
        let headers = vec![HttpHeader::new("Cookie", "a=1"), HttpHeader::new("cookie", "b=2")];
        let set = HeaderSet::from(headers.as_slice());
        assert_eq!(set.get("COOKIE"), Some("a=1,b=2"));
    }
}
