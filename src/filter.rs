//! Ordered middleware chain.
//!
//! Filters run in registration order, each only if its pattern covers the
//! request path. Patterns follow the route wildcard convention: a trailing `*`
//! matches by prefix (`/*` covers every request), anything else must equal the
//! path exactly.
//!
//! A filter can stop the chain two ways:
//!
//! - return `Err(_)`: nothing downstream runs and the error is mapped to a
//!   response;
//! - call [`Response::end`]: nothing downstream runs and the response is
//!   written as the filter left it.

use crate::error::Error;
use crate::handler::BoxedFilter;
use crate::request::Request;
use crate::response::Response;

#[derive(Clone, Debug, Eq, PartialEq)]
enum Scope {
    Prefix(String),
    Exact(String),
}

impl Scope {
    fn parse(pattern: &str) -> Self {
        match pattern.strip_suffix('*') {
            Some(prefix) => Self::Prefix(prefix.to_owned()),
            None => Self::Exact(pattern.to_owned()),
        }
    }

    fn covers(&self, path: &str) -> bool {
        match self {
            Self::Prefix(prefix) => path.starts_with(prefix.as_str()),
            Self::Exact(exact) => path == exact,
        }
    }
}

#[derive(Default)]
pub(crate) struct FilterChain {
    filters: Vec<(Scope, BoxedFilter)>,
}

impl FilterChain {
    pub(crate) fn push(&mut self, pattern: &str, filter: BoxedFilter) {
        self.filters.push((Scope::parse(pattern), filter));
    }

    pub(crate) fn len(&self) -> usize {
        self.filters.len()
    }

    pub(crate) fn run(&self, req: &mut Request, res: &mut Response) -> Result<(), Error> {
        for (scope, filter) in &self.filters {
            if !scope.covers(req.path()) {
                continue;
            }
            filter(req, res)?;
            if res.is_ended() {
                break;
            }
        }
        Ok(())
    }
}
