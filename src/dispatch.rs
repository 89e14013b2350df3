//! Request dispatch: filters, static mount, route, handler, encode.
//!
//! ```text
//! Request ─▶ filter chain ─┬─ ended ───────────────────────────────▶ written as is
//!                          └─ resolve path ─┬─ none ─┬─ static mount covers path ─▶ file / 404
//!                                           │        └─────────────▶ 404 {"message"}
//!                                           ├─ method missing ─────▶ 405 {"message"}
//!                                           └─ handler ─▶ 200 + encoded reply
//!
//! Routes are resolved before the static mount, so a route registered under
//! the mount (`/public/index` next to `/public/*`) is reachable.
//!
//! any Err(_) along the way ─▶ mapper ─▶ 4xx/500 {"message", "tag"}
//! ```

use http::StatusCode;
use http::header::ALLOW;

use crate::error::Error;
use crate::mapper;
use crate::matcher::Resolved;
use crate::method::Method;
use crate::request::Request;
use crate::response::Response;
use crate::router::Router;

const NOT_FOUND: &str = "Not Found";
const METHOD_NOT_ALLOWED: &str = "Method Not Allowed";

impl Router {
    /// Produces the response for `req`. Never fails: every error becomes a
    /// response through the mapper.
    pub fn handle(&self, mut req: Request) -> Response {
        let mut res = Response::new();
        if let Err(err) = self.dispatch(&mut req, &mut res) {
            mapper::respond(req.method(), req.path(), &err, &mut res);
        }
        res
    }

    fn dispatch(&self, req: &mut Request, res: &mut Response) -> Result<(), Error> {
        self.filters.run(req, res)?;
        if res.is_ended() {
            return Ok(());
        }

        let Some(Resolved { handlers, params, .. }) = self.resolve(req.path()) else {
            if let Some(files) = self.static_files.as_ref().filter(|s| s.covers(req.path())) {
                return files.serve(req, res);
            }
            mapper::message(res, StatusCode::NOT_FOUND, NOT_FOUND);
            return Ok(());
        };

        let handler = Method::try_from(req.method())
            .ok()
            .and_then(|m| handlers.get(m));

        let Some(handler) = handler else {
            let allow = handlers.methods().iter().map(|m| m.as_str()).collect::<Vec<_>>().join(", ");
            res.set_header(ALLOW.as_str(), &allow);
            mapper::message(res, StatusCode::METHOD_NOT_ALLOWED, METHOD_NOT_ALLOWED);
            return Ok(());
        };

        req.set_params(params);
        let reply = handler.call(req, res)?;

        // A handler that ended the response (a redirect, say) keeps its status.
        if !res.is_ended() {
            res.set_status(StatusCode::OK);
        }
        res.set_body(reply.encode()?);
        Ok(())
    }
}
