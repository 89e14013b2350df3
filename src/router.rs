//! The application router.
//!
//! One object owns everything dispatch needs: the route table, the filter
//! chain and the optional static-file mount. Build it during start-up, hand it
//! to [`Server::serve`](crate::Server::serve), and it is read-only from then on.

use std::path::PathBuf;
use std::sync::Arc;

use crate::error::{Error, RouteError};
use crate::filter::FilterChain;
use crate::handler::boxed_handler;
use crate::matcher::{self, Resolved};
use crate::method::Method;
use crate::reply::IntoReply;
use crate::request::Request;
use crate::response::Response;
use crate::route_table::{RoutePattern, RouteTable};
use crate::static_files::StaticFiles;

/// Routes, filters and the static mount for one server.
///
/// Registration methods take `&mut self` and return `Result<&mut Self, _>`,
/// so calls chain with `?`:
///
/// ```rust,no_run
/// # use stout::{Error, Request, Response, Router, RouteError};
/// # fn get_file(_: &Request, _: &mut Response) -> Result<String, Error> { Ok(String::new()) }
/// # fn delete_file(_: &Request, _: &mut Response) -> Result<(), Error> { Ok(()) }
/// # fn main() -> Result<(), RouteError> {
/// let mut app = Router::new();
/// app.get("/api/files/:id", get_file)?
///    .delete("/api/files/:id", delete_file)?
///    .static_files("/public/*", "./public")?;
/// # Ok(())
/// # }
/// ```
#[derive(Default)]
pub struct Router {
    pub(crate) routes: RouteTable,
    pub(crate) filters: FilterChain,
    pub(crate) static_files: Option<StaticFiles>,
}

impl Router {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `handler` for `method` on `pattern`.
    ///
    /// Fails if `pattern` is malformed or is the static-file mount. Patterns
    /// under the mount are allowed and answer ahead of its files. Registering
    /// the same pattern again adds methods to it; the same method replaces the
    /// earlier handler.
    pub fn route<F, R>(&mut self, method: Method, pattern: &str, handler: F) -> Result<&mut Self, RouteError>
    where
        F: Fn(&Request, &mut Response) -> Result<R, Error> + Send + Sync + 'static,
        R: IntoReply + 'static,
    {
        if self.static_files.as_ref().is_some_and(|s| s.mount() == pattern) {
            return Err(RouteError::ReservedPath(pattern.to_owned()));
        }
        let pattern = RoutePattern::parse(pattern)?;
        self.routes.insert(pattern, method, boxed_handler(handler));
        Ok(self)
    }

    pub fn get<F, R>(&mut self, pattern: &str, handler: F) -> Result<&mut Self, RouteError>
    where
        F: Fn(&Request, &mut Response) -> Result<R, Error> + Send + Sync + 'static,
        R: IntoReply + 'static,
    {
        self.route(Method::Get, pattern, handler)
    }

    pub fn post<F, R>(&mut self, pattern: &str, handler: F) -> Result<&mut Self, RouteError>
    where
        F: Fn(&Request, &mut Response) -> Result<R, Error> + Send + Sync + 'static,
        R: IntoReply + 'static,
    {
        self.route(Method::Post, pattern, handler)
    }

    pub fn put<F, R>(&mut self, pattern: &str, handler: F) -> Result<&mut Self, RouteError>
    where
        F: Fn(&Request, &mut Response) -> Result<R, Error> + Send + Sync + 'static,
        R: IntoReply + 'static,
    {
        self.route(Method::Put, pattern, handler)
    }

    pub fn patch<F, R>(&mut self, pattern: &str, handler: F) -> Result<&mut Self, RouteError>
    where
        F: Fn(&Request, &mut Response) -> Result<R, Error> + Send + Sync + 'static,
        R: IntoReply + 'static,
    {
        self.route(Method::Patch, pattern, handler)
    }

    pub fn delete<F, R>(&mut self, pattern: &str, handler: F) -> Result<&mut Self, RouteError>
    where
        F: Fn(&Request, &mut Response) -> Result<R, Error> + Send + Sync + 'static,
        R: IntoReply + 'static,
    {
        self.route(Method::Delete, pattern, handler)
    }

    /// Appends a filter for requests under `pattern` (`"/*"` for all).
    /// Filters run in the order they were added, before routing.
    pub fn filter<F>(&mut self, pattern: &str, filter: F) -> &mut Self
    where
        F: Fn(&mut Request, &mut Response) -> Result<(), Error> + Send + Sync + 'static,
    {
        self.filters.push(pattern, Arc::new(filter));
        self
    }

    /// Reserves `mount` for files under `root`. Only one mount is allowed, and
    /// it may not coincide with a registered route pattern.
    pub fn static_files(&mut self, mount: &str, root: impl Into<PathBuf>) -> Result<&mut Self, RouteError> {
        if let Some(existing) = &self.static_files {
            return Err(RouteError::StaticAlreadyReserved(existing.mount().to_owned()));
        }
        if self.routes.contains(mount) {
            return Err(RouteError::PathInUse(mount.to_owned()));
        }
        self.static_files = Some(StaticFiles::new(mount, root));
        Ok(self)
    }

    /// Resolves `path` against the route table, ignoring method and filters.
    pub fn resolve(&self, path: &str) -> Option<Resolved<'_>> {
        matcher::resolve(&self.routes, path)
    }

    pub fn route_count(&self) -> usize {
        self.routes.len()
    }

    pub fn filter_count(&self) -> usize {
        self.filters.len()
    }
}
