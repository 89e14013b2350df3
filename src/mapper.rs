//! Failure → response translation.
//!
//! The only place a status code and error body are chosen for a raised
//! [`Error`]. The table keys on the variant alone:
//!
//! | Variant | Status | `message` |
//! |---|---|---|
//! | `Forbidden` | 403 | `"Forbidden"` |
//! | `Unauthorized` | 401 | `"Unauthorized"` |
//! | `BadRequest` | 400 | the error's own message |
//! | `Internal` | 500 | `"Ops something went wrong!"` |
//!
//! Every mapped body carries a fresh UUID `tag`, also logged, so a client
//! report can be matched to its server-side line. A 500 logs the full error
//! chain at `error`; anything else logs a one-line summary at `warn`.

use std::error::Error as StdError;

use http::StatusCode;
use serde::{Deserialize, Serialize};
use tracing::{error, warn};
use uuid::Uuid;

use crate::error::Error;
use crate::response::{JSON, Response};

/// Client-facing message for any unclassified failure.
pub const GENERIC_MESSAGE: &str = "Ops something went wrong!";

/// Body of a mapped failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub message: String,
    pub tag: String,
}

/// Informational body (`404`, `405`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub message: String,
}

/// Picks status and body for `err`. Each call draws a new tag.
pub fn map_error(err: &Error) -> (StatusCode, ErrorBody) {
    let (status, message) = match err {
        Error::Forbidden(_)    => (StatusCode::FORBIDDEN, "Forbidden".to_owned()),
        Error::Unauthorized(_) => (StatusCode::UNAUTHORIZED, "Unauthorized".to_owned()),
        Error::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
        Error::Internal(_)     => (StatusCode::INTERNAL_SERVER_ERROR, GENERIC_MESSAGE.to_owned()),
    };
    (status, ErrorBody { message, tag: Uuid::new_v4().to_string() })
}

/// Maps `err`, logs it, and overwrites `res` with the result. Headers already
/// set by filters (CORS, for one) are kept.
pub(crate) fn respond(method: &http::Method, path: &str, err: &Error, res: &mut Response) {
    let (status, body) = map_error(err);

    if status == StatusCode::INTERNAL_SERVER_ERROR {
        error!(%method, path, tag = %body.tag, error = ?err, "{}", chain(err));
    } else {
        warn!(%method, path, tag = %body.tag, status = status.as_u16(), "{err}");
    }

    write_json(res, status, &body);
}

/// Writes a plain `{"message": …}` body with `status`.
pub(crate) fn message(res: &mut Response, status: StatusCode, text: &str) {
    write_json(res, status, &Message { message: text.to_owned() });
}

fn write_json<T: Serialize>(res: &mut Response, status: StatusCode, body: &T) {
    // A struct of two strings always serializes.
    let bytes = serde_json::to_vec(body).unwrap_or_default();
    res.set_status(status).set_content_type(JSON).set_body(bytes);
}

/// `outer: inner: root` rendering of an error and its sources.
fn chain(err: &Error) -> String {
    let mut out = err.to_string();
    let mut source = StdError::source(err);
    while let Some(cause) = source {
        out.push_str(": ");
        out.push_str(&cause.to_string());
        source = cause.source();
    }
    out
}
