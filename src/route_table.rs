//! Registered routes, split by pattern kind.
//!
//! A pattern's kind is decided by its shape once, at registration:
//!
//! | Kind | Shape | Example |
//! |---|---|---|
//! | exact | no trailing `*`, no `:` segment | `/api/health` |
//! | wildcard | ends with `*`, matches by prefix | `/assets/*` |
//! | parameterized | one or more `:name` segments | `/api/files/:id` |
//!
//! Exact routes sit in a hash map for O(1) lookup. Wildcard and parameterized
//! routes are kept in vectors sorted most-specific first, so the matcher can
//! walk them in order and stop at the first hit.

use std::cmp::Ordering;
use std::collections::HashMap;

use crate::error::RouteError;
use crate::handler::BoxedHandler;
use crate::method::Method;

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum PatternKind {
    Exact,
    Wildcard,
    Parameterized,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub(crate) enum Segment {
    Literal(String),
    Param(String),
}

/// A registered path template. Immutable once parsed.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RoutePattern {
    raw: String,
    kind: PatternKind,
    segments: Vec<Segment>,
}

impl RoutePattern {
    /// Classifies `raw` by shape. A trailing `*` wins over `:` segments, so
    /// `/files/:id/*` is a wildcard on the literal prefix `/files/:id/`.
    pub fn parse(raw: &str) -> Result<Self, RouteError> {
        let invalid = |reason| RouteError::InvalidPattern { pattern: raw.to_owned(), reason };

        if !raw.starts_with('/') {
            return Err(invalid("must start with `/`"));
        }

        if raw.ends_with('*') {
            return Ok(Self { raw: raw.to_owned(), kind: PatternKind::Wildcard, segments: Vec::new() });
        }

        let segments = split_segments(raw)
            .into_iter()
            .map(|s| match s.strip_prefix(':') {
                Some("") => Err(invalid("parameter segment needs a name")),
                Some(name) => Ok(Segment::Param(name.to_owned())),
                None => Ok(Segment::Literal(s.to_owned())),
            })
            .collect::<Result<Vec<_>, _>>()?;

        let kind = if segments.iter().any(|s| matches!(s, Segment::Param(_))) {
            PatternKind::Parameterized
        } else {
            PatternKind::Exact
        };

        Ok(Self { raw: raw.to_owned(), kind, segments })
    }

    pub fn as_str(&self) -> &str { &self.raw }
    pub fn kind(&self) -> PatternKind { self.kind }

    /// For a wildcard, the pattern with its trailing `*` removed.
    pub(crate) fn prefix(&self) -> &str {
        self.raw.strip_suffix('*').unwrap_or(&self.raw)
    }

    pub(crate) fn segments(&self) -> &[Segment] {
        &self.segments
    }

    fn literal_count(&self) -> usize {
        self.segments.iter().filter(|s| matches!(s, Segment::Literal(_))).count()
    }
}

/// Splits a path on `/`, dropping trailing empty segments: `/a/b/` and `/a/b`
/// both give `["", "a", "b"]`, and `/` gives nothing.
pub(crate) fn split_segments(path: &str) -> Vec<&str> {
    let mut parts: Vec<&str> = path.split('/').collect();
    while parts.last().is_some_and(|s| s.is_empty()) {
        parts.pop();
    }
    parts
}

/// Longest prefix first. Equal prefixes are the same pattern.
fn wildcard_order(a: &RoutePattern, b: &RoutePattern) -> Ordering {
    b.prefix().len().cmp(&a.prefix().len()).then_with(|| a.raw.cmp(&b.raw))
}

/// More literal segments first; then by segment count; then, at the first
/// position where one pattern has a literal and the other a parameter, the
/// literal wins; then by text.
fn param_order(a: &RoutePattern, b: &RoutePattern) -> Ordering {
    b.literal_count()
        .cmp(&a.literal_count())
        .then_with(|| a.segments.len().cmp(&b.segments.len()))
        .then_with(|| {
            a.segments
                .iter()
                .zip(&b.segments)
                .map(|pair| match pair {
                    (Segment::Literal(_), Segment::Param(_)) => Ordering::Less,
                    (Segment::Param(_), Segment::Literal(_)) => Ordering::Greater,
                    _ => Ordering::Equal,
                })
                .find(|o| o.is_ne())
                .unwrap_or(Ordering::Equal)
        })
        .then_with(|| a.raw.cmp(&b.raw))
}

/// The handlers registered for one pattern, keyed by method.
#[derive(Default)]
pub struct MethodHandlers {
    handlers: HashMap<Method, BoxedHandler>,
}

impl MethodHandlers {
    pub(crate) fn get(&self, method: Method) -> Option<&BoxedHandler> {
        self.handlers.get(&method)
    }

    pub fn allows(&self, method: Method) -> bool {
        self.handlers.contains_key(&method)
    }

    /// Registered methods in a stable order, for the `allow` header.
    pub fn methods(&self) -> Vec<Method> {
        let mut methods: Vec<Method> = self.handlers.keys().copied().collect();
        methods.sort();
        methods
    }

    fn insert(&mut self, method: Method, handler: BoxedHandler) {
        self.handlers.insert(method, handler);
    }
}

pub(crate) struct RouteEntry {
    pub(crate) pattern: RoutePattern,
    pub(crate) handlers: MethodHandlers,
}

#[derive(Default)]
pub(crate) struct RouteTable {
    exact: HashMap<String, RouteEntry>,
    wildcard: Vec<RouteEntry>,
    parameterized: Vec<RouteEntry>,
}

impl RouteTable {
    /// Adds `handler` under `pattern` + `method`. Registering a known pattern
    /// again extends its method map; the same method replaces the old handler.
    pub(crate) fn insert(&mut self, pattern: RoutePattern, method: Method, handler: BoxedHandler) {
        let entry = match pattern.kind {
            PatternKind::Exact => self
                .exact
                .entry(pattern.raw.clone())
                .or_insert_with(|| RouteEntry { pattern, handlers: MethodHandlers::default() }),
            PatternKind::Wildcard => sorted_slot(&mut self.wildcard, pattern, wildcard_order),
            PatternKind::Parameterized => sorted_slot(&mut self.parameterized, pattern, param_order),
        };
        entry.handlers.insert(method, handler);
    }

    /// Whether `raw` is registered under any kind.
    pub(crate) fn contains(&self, raw: &str) -> bool {
        self.exact.contains_key(raw)
            || self.wildcard.iter().chain(&self.parameterized).any(|e| e.pattern.raw == raw)
    }

    pub(crate) fn exact(&self, path: &str) -> Option<&RouteEntry> {
        self.exact.get(path)
    }

    /// Wildcard routes, longest prefix first.
    pub(crate) fn wildcards(&self) -> &[RouteEntry] {
        &self.wildcard
    }

    /// Parameterized routes, most specific first.
    pub(crate) fn parameterized(&self) -> &[RouteEntry] {
        &self.parameterized
    }

    pub(crate) fn len(&self) -> usize {
        self.exact.len() + self.wildcard.len() + self.parameterized.len()
    }
}

/// Finds the entry for `pattern` in an ordered vector, inserting a fresh one at
/// its sorted position if absent.
fn sorted_slot(
    entries: &mut Vec<RouteEntry>,
    pattern: RoutePattern,
    order: fn(&RoutePattern, &RoutePattern) -> Ordering,
) -> &mut RouteEntry {
    let idx = match entries.binary_search_by(|e| order(&e.pattern, &pattern)) {
        Ok(idx) => idx,
        Err(idx) => {
            entries.insert(idx, RouteEntry { pattern, handlers: MethodHandlers::default() });
            idx
        }
    };
    &mut entries[idx]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::boxed_handler;

    fn noop() -> BoxedHandler {
        boxed_handler(|_: &crate::Request, _: &mut crate::Response| Ok(()))
    }

    fn kind(raw: &str) -> PatternKind {
        RoutePattern::parse(raw).unwrap().kind()
    }

    #[test]
    fn classifies_by_shape() {
        assert_eq!(kind("/api/health"), PatternKind::Exact);
        assert_eq!(kind("/assets/*"), PatternKind::Wildcard);
        assert_eq!(kind("/api/files/:id"), PatternKind::Parameterized);
        assert_eq!(kind("/files/:id/*"), PatternKind::Wildcard);
        assert_eq!(kind("/time/12:30"), PatternKind::Exact);
    }

    #[test]
    fn rejects_malformed_patterns() {
        assert!(matches!(RoutePattern::parse("api"), Err(RouteError::InvalidPattern { .. })));
        assert!(matches!(RoutePattern::parse("/a/:/b"), Err(RouteError::InvalidPattern { .. })));
    }

    #[test]
    fn trailing_slashes_do_not_count_as_segments() {
        assert_eq!(split_segments("/a/b/"), vec!["", "a", "b"]);
        assert_eq!(split_segments("/a/b"), vec!["", "a", "b"]);
        assert!(split_segments("/").is_empty());
    }

    #[test]
    fn same_pattern_augments_method_map() {
        let mut table = RouteTable::default();
        let pattern = RoutePattern::parse("/api/files/:id").unwrap();
        table.insert(pattern.clone(), Method::Get, noop());
        table.insert(pattern.clone(), Method::Delete, noop());
        table.insert(pattern, Method::Get, noop());

        assert_eq!(table.len(), 1);
        let entry = &table.parameterized()[0];
        assert_eq!(entry.handlers.methods(), vec![Method::Delete, Method::Get]);
        assert!(table.contains("/api/files/:id"));
    }

    #[test]
    fn wildcards_are_ordered_longest_prefix_first() {
        let mut table = RouteTable::default();
        for raw in ["/*", "/assets/img/*", "/assets/*"] {
            table.insert(RoutePattern::parse(raw).unwrap(), Method::Get, noop());
        }
        let order: Vec<&str> = table.wildcards().iter().map(|e| e.pattern.as_str()).collect();
        assert_eq!(order, vec!["/assets/img/*", "/assets/*", "/*"]);
    }

    #[test]
    fn params_are_ordered_by_specificity() {
        let mut table = RouteTable::default();
        for raw in ["/:a/:b/:c", "/users/:id/posts", "/users/:id/:tab", "/:x/me/:y", "/users/me/:tab"] {
            table.insert(RoutePattern::parse(raw).unwrap(), Method::Get, noop());
        }
        let order: Vec<&str> = table.parameterized().iter().map(|e| e.pattern.as_str()).collect();
        assert_eq!(
            order,
            vec!["/users/me/:tab", "/users/:id/posts", "/users/:id/:tab", "/:x/me/:y", "/:a/:b/:c"]
        );
    }
}
