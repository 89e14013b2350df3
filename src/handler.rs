//! Handler and filter type erasure.
//!
//! # How handlers are stored
//!
//! The route table holds handlers of *different* closure types in a single
//! map, so each one is wrapped behind a common trait object:
//!
//! ```text
//! fn get_file(req: &Request, res: &mut Response) -> Result<Json<File>, Error>
//!        ↓ router.get("/api/files/:id", get_file)
//! Arc::new(FnHandler(get_file))             ← heap-allocated wrapper
//!        ↓ stored as BoxedHandler = Arc<dyn ErasedHandler>
//! handler.call(&req, &mut res)  at request time
//!        ↓
//! get_file(&req, &mut res)?.into_reply()    ← one vtable dispatch
//! ```
//!
//! Handlers are plain synchronous functions. The server runs each request on a
//! blocking worker, so a handler may block on I/O without stalling the
//! connection reactor.

use std::marker::PhantomData;
use std::sync::Arc;

use crate::error::Error;
use crate::reply::{IntoReply, Reply};
use crate::request::Request;
use crate::response::Response;

/// Internal dispatch interface for route handlers.
pub(crate) trait ErasedHandler {
    fn call(&self, req: &Request, res: &mut Response) -> Result<Reply, Error>;
}

/// Shared, type-erased route handler.
///
/// Anything `Fn(&Request, &mut Response) -> Result<impl IntoReply, Error>`
/// can be registered; the reply type is erased here.
pub(crate) type BoxedHandler = Arc<dyn ErasedHandler + Send + Sync + 'static>;

/// Bridges a typed handler into the trait-object world.
struct FnHandler<F, R> {
    inner: F,
    _reply: PhantomData<fn() -> R>,
}

impl<F, R> ErasedHandler for FnHandler<F, R>
where
    F: Fn(&Request, &mut Response) -> Result<R, Error>,
    R: IntoReply,
{
    fn call(&self, req: &Request, res: &mut Response) -> Result<Reply, Error> {
        (self.inner)(req, res)?.into_reply()
    }
}

pub(crate) fn boxed_handler<F, R>(handler: F) -> BoxedHandler
where
    F: Fn(&Request, &mut Response) -> Result<R, Error> + Send + Sync + 'static,
    R: IntoReply + 'static,
{
    Arc::new(FnHandler { inner: handler, _reply: PhantomData })
}

// ── Filters ───────────────────────────────────────────────────────────────────

/// Middleware run before route resolution.
///
/// Returning an error aborts the chain; calling [`Response::end`] stops it
/// without an error.
pub(crate) type BoxedFilter =
    Arc<dyn Fn(&mut Request, &mut Response) -> Result<(), Error> + Send + Sync + 'static>;
