//! Fragment parameter codec.
//!
//! The report keeps its whole view state in the location fragment, shaped
//! like a query string:
//!
//! ```text
//! #?testId=8f2c&run=1&anchor=attachment-2&q=s:failed
//! ```
//!
//! [`parse`] strips the `#` marker and a leading `?`, then decodes
//! `application/x-www-form-urlencoded` pairs. [`serialize`] is the inverse.
//! Keys may repeat; insertion order and duplicates survive a round trip.
//!
//! Parsing is total: malformed escapes are decoded lossily and empty
//! segments are dropped, so any input yields some [`FragmentParams`].

use std::fmt;

use url::form_urlencoded;

/// Marker character that introduces the fragment.
pub const FRAGMENT_MARKER: char = '#';

/// Query marker that may follow [`FRAGMENT_MARKER`].
pub const QUERY_MARKER: char = '?';

/// Parameter key carrying the test identity.
pub const KEY_TEST_ID: &str = "testId";
/// Parameter key carrying the result (retry) index.
pub const KEY_RUN: &str = "run";
/// Parameter key carrying the anchor token.
pub const KEY_ANCHOR: &str = "anchor";
/// Parameter key carrying the search/filter query.
pub const KEY_QUERY: &str = "q";

/// Ordered key → value multimap decoded from a location fragment.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct FragmentParams {
    entries: Vec<(String, String)>,
}

impl FragmentParams {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// First value stored under `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Every value stored under `key`, in insertion order.
    #[must_use]
    pub fn get_all(&self, key: &str) -> Vec<&str> {
        self.entries
            .iter()
            .filter(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
            .collect()
    }

    #[must_use]
    pub fn has(&self, key: &str) -> bool {
        self.entries.iter().any(|(k, _)| k == key)
    }

    /// Add a pair at the end, keeping existing values for the key.
    pub fn append(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.entries.push((key.into(), value.into()));
    }

    /// Replace every value of `key` with a single `value`.
    ///
    /// The surviving pair takes the position of the first existing
    /// occurrence; a new key is appended.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.entries.iter().position(|(k, _)| *k == key) {
            Some(first) => {
                self.entries[first].1 = value;
                let mut idx = 0;
                self.entries.retain(|(k, _)| {
                    let keep = idx <= first || *k != key;
                    idx += 1;
                    keep
                });
            }
            None => self.entries.push((key, value)),
        }
    }

    /// Remove every pair stored under `key`.
    pub fn delete(&mut self, key: &str) {
        self.entries.retain(|(k, _)| k != key);
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    #[must_use]
    pub const fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Render as a navigable fragment: `#?` followed by the encoded pairs.
    #[must_use]
    pub fn to_fragment(&self) -> String {
        format!("{FRAGMENT_MARKER}{QUERY_MARKER}{}", serialize(self))
    }
}

impl fmt::Display for FragmentParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&serialize(self))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for FragmentParams {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// Decode a raw fragment (with or without its `#` marker).
#[must_use]
pub fn parse(fragment: &str) -> FragmentParams {
    parse_body(fragment.strip_prefix(FRAGMENT_MARKER).unwrap_or(fragment))
}

/// Decode a fragment body whose `#` marker was already removed.
///
/// Only a leading `?` is stripped; a further `#` belongs to the first key.
#[must_use]
pub fn parse_body(body: &str) -> FragmentParams {
    let body = body.strip_prefix(QUERY_MARKER).unwrap_or(body);
    form_urlencoded::parse(body.as_bytes())
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect()
}

/// Encode parameters as `key=value&...` without any marker prefix.
#[must_use]
pub fn serialize(params: &FragmentParams) -> String {
    let mut serializer = form_urlencoded::Serializer::new(String::new());
    for (key, value) in params.iter() {
        serializer.append_pair(key, value);
    }
    serializer.finish()
}
