//! Path parameters bound by a parameterized route match.

use std::collections::HashMap;

/// Named values captured from `:name` segments of the matched pattern.
///
/// Stored in the request's extensions under this type, so no other
/// request-scoped attribute can shadow it.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PathParams(HashMap<String, String>);

impl PathParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Looks up a parameter by name. A leading `:` is ignored, so `"id"` and
    /// `":id"` are the same key.
    pub fn get(&self, name: &str) -> Option<&str> {
        let name = name.strip_prefix(':').unwrap_or(name);
        self.0.get(name).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub(crate) fn insert(&mut self, name: &str, value: &str) {
        self.0.insert(name.to_owned(), value.to_owned());
    }
}
