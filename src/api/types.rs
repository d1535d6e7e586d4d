//! Data model shared by the accessor, the session and the code generator.
//!
//! Defines table metadata, the insertion-ordered query parameter map and
//! resolved area code lists.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Parameter holding the data vintage.
pub const DATE_KEY: &str = "date";

/// Parameter holding the comma-joined output column list.
pub const SELECT_KEY: &str = "select";

/// Parameter holding the serialized area code list.
pub const GEOGRAPHY_KEY: &str = "geography";

/// Parameter carrying the API credential during a live fetch.
pub const CREDENTIAL_KEY: &str = "uid";

/// Categories of a single field, keyed by category code.
pub type Categories = IndexMap<String, String>;

/// Metadata describing a census table.
///
/// Field and category order follow the provider response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableMetadata {
    /// Human-readable table title.
    pub description: String,

    /// Provider-internal table identifier (e.g. `NM_537_1`).
    pub nomis_table: String,

    /// Fields and their categories.
    pub fields: IndexMap<String, Categories>,
}

impl TableMetadata {
    /// Creates metadata with no fields.
    pub fn new(description: impl Into<String>, nomis_table: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            nomis_table: nomis_table.into(),
            fields: IndexMap::new(),
        }
    }

    /// Adds a field with the given `(code, label)` categories.
    pub fn with_field<I, C, L>(mut self, name: impl Into<String>, categories: I) -> Self
    where
        I: IntoIterator<Item = (C, L)>,
        C: Into<String>,
        L: Into<String>,
    {
        let categories = categories
            .into_iter()
            .map(|(code, label)| (code.into(), label.into()))
            .collect();
        self.fields.insert(name.into(), categories);
        self
    }
}

/// Query parameters sent to the provider.
///
/// Insertion order is significant: it is the order parameters appear in
/// generated snippets. Re-inserting an existing key keeps its position.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QueryParameters(IndexMap<String, String>);

// IndexMap equality ignores order; parameters compare entry by entry.
impl PartialEq for QueryParameters {
    fn eq(&self, other: &Self) -> bool {
        self.0.iter().eq(other.0.iter())
    }
}

impl Eq for QueryParameters {}

impl QueryParameters {
    /// Creates an empty parameter map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a parameter, keeping the original position if it already exists.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.insert(key.into(), value.into());
    }

    /// Returns the value for `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    /// Returns true if `key` is present.
    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Removes `key`, preserving the order of the remaining parameters.
    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.0.shift_remove(key)
    }

    /// Removes the API credential. Returns true if one was present.
    pub fn strip_credential(&mut self) -> bool {
        self.remove(CREDENTIAL_KEY).is_some()
    }

    /// Returns true if a geography selection is present.
    pub fn has_geography(&self) -> bool {
        self.contains_key(GEOGRAPHY_KEY)
    }

    /// Iterates parameters in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Returns parameter names in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Returns the number of parameters.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if there are no parameters.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for QueryParameters {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

impl fmt::Display for QueryParameters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (i, (key, value)) in self.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "'{key}': '{value}'")?;
        }
        f.write_str("}")
    }
}

/// Ordered list of provider area codes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AreaCodeList(Vec<String>);

impl AreaCodeList {
    /// Creates a list from the given codes.
    pub fn new(codes: Vec<String>) -> Self {
        Self(codes)
    }

    /// Returns the codes in order.
    pub fn codes(&self) -> &[String] {
        &self.0
    }

    /// Returns the number of codes.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if the list is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Serializes the list into the form the provider accepts for `geography`.
    ///
    /// Numeric codes are sorted and contiguous runs collapse to `first...last`.
    /// If any code is not numeric the codes are joined as given.
    pub fn to_query_value(&self) -> String {
        let numeric: Option<Vec<u64>> = self.0.iter().map(|c| c.trim().parse().ok()).collect();
        match numeric {
            Some(mut codes) => {
                codes.sort_unstable();
                codes.dedup();
                compress_ranges(&codes)
            }
            None => self.0.join(","),
        }
    }
}

impl<S: Into<String>> FromIterator<S> for AreaCodeList {
    fn from_iter<T: IntoIterator<Item = S>>(iter: T) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

fn compress_ranges(codes: &[u64]) -> String {
    let Some((&first, rest)) = codes.split_first() else {
        return String::new();
    };

    let mut parts = Vec::new();
    let (mut start, mut end) = (first, first);
    for &code in rest {
        if code == end + 1 {
            end = code;
        } else {
            parts.push(format_range(start, end));
            start = code;
            end = code;
        }
    }
    parts.push(format_range(start, end));
    parts.join(",")
}

fn format_range(start: u64, end: u64) -> String {
    if start == end {
        start.to_string()
    } else {
        format!("{start}...{end}")
    }
}
