//! Request logging.

use tracing::info;

use crate::error::Error;
use crate::request::Request;
use crate::response::Response;

/// Records method and path at `info` before anything downstream runs.
pub fn log_request(req: &mut Request, _res: &mut Response) -> Result<(), Error> {
    info!(method = %req.method(), path = req.path(), "request");
    Ok(())
}
