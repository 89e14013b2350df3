//! Path resolution.
//!
//! Precedence is fixed and the first hit wins:
//!
//! 1. **exact**: hash lookup of the whole path.
//! 2. **wildcard**: first registered prefix the path starts with. Longer
//!    prefixes are tried first, so `/assets/img/*` beats `/assets/*`.
//! 3. **parameterized**: first pattern with the same segment count whose
//!    literal segments all equal the path's. Patterns with more literal
//!    segments are tried first, and at equal counts a literal beats a
//!    parameter at the earliest differing position.
//!
//! Resolution looks at the path only. Whether the matched pattern has a
//! handler for the request method is the dispatcher's question; a pattern
//! that matched but lacks the method does not fall through to later kinds.

use crate::params::PathParams;
use crate::route_table::{MethodHandlers, PatternKind, RouteEntry, RoutePattern, RouteTable, Segment, split_segments};

/// A successful path resolution.
pub struct Resolved<'a> {
    pub pattern: &'a RoutePattern,
    pub handlers: &'a MethodHandlers,
    /// Empty unless `pattern` is parameterized.
    pub params: PathParams,
}

impl Resolved<'_> {
    pub fn kind(&self) -> PatternKind {
        self.pattern.kind()
    }
}

pub(crate) fn resolve<'a>(table: &'a RouteTable, path: &str) -> Option<Resolved<'a>> {
    if let Some(entry) = table.exact(path) {
        return Some(resolved(entry, PathParams::new()));
    }

    if let Some(entry) = table.wildcards().iter().find(|e| path.starts_with(e.pattern.prefix())) {
        return Some(resolved(entry, PathParams::new()));
    }

    let path_segments = split_segments(path);
    table
        .parameterized()
        .iter()
        .find_map(|e| bind_params(e.pattern.segments(), &path_segments).map(|p| resolved(e, p)))
}

fn resolved(entry: &RouteEntry, params: PathParams) -> Resolved<'_> {
    Resolved { pattern: &entry.pattern, handlers: &entry.handlers, params }
}

/// Matches a parameterized pattern against a split path and, on success,
/// returns the bound parameters. Matching and binding share the one
/// segment-count check, so a parameter is never bound from a path that the
/// pattern does not structurally fit.
fn bind_params(pattern: &[Segment], path: &[&str]) -> Option<PathParams> {
    if pattern.len() != path.len() {
        return None;
    }

    let mut params = PathParams::new();
    for (segment, value) in pattern.iter().zip(path) {
        match segment {
            Segment::Literal(lit) if lit != value => return None,
            Segment::Literal(_) => {}
            Segment::Param(name) => params.insert(name, value),
        }
    }
    Some(params)
}
