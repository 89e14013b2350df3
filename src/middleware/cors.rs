//! Permissive CORS.

use http::StatusCode;

use crate::error::Error;
use crate::request::Request;
use crate::response::Response;

const ALLOW_ORIGIN: &str = "*";
const ALLOW_METHODS: &str = "GET, POST, PUT, DELETE, OPTIONS";
const ALLOW_HEADERS: &str = "Content-Type, Authorization";

/// Allows any origin, the common methods and the `Content-Type` and
/// `Authorization` headers on every response.
///
/// Preflight `OPTIONS` requests are answered here with `200` and an empty
/// body; later filters and the route handler never see them.
pub fn cors_all(req: &mut Request, res: &mut Response) -> Result<(), Error> {
    res.set_header("access-control-allow-origin", ALLOW_ORIGIN)
        .set_header("access-control-allow-methods", ALLOW_METHODS)
        .set_header("access-control-allow-headers", ALLOW_HEADERS);

    if req.method() == http::Method::OPTIONS {
        res.set_status(StatusCode::OK);
        res.end();
    }
    Ok(())
}
