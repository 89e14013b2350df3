//! Error types.
//!
//! Three families:
//!
//! - [`Error`]: a failure raised while serving one request. Filters and
//!   handlers return it; [`map_error`](crate::map_error) turns it into a response.
//! - [`RouteError`]: a registration mistake caught while building the
//!   [`Router`](crate::Router), before the server accepts anything.
//! - [`ServeError`]: infrastructure: binding, accepting, loading config.

use std::fmt;

use crate::config::ConfigError;

/// Boxed source error carried by [`Error::Internal`].
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// A failure raised by a filter, a handler or the dispatcher itself.
///
/// The mapper looks only at the variant, never at the message, to pick the
/// status code. Only `BadRequest` lets its message reach the client.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("forbidden: {0}")]
    Forbidden(String),

    #[error("unauthorized: {0}")]
    Unauthorized(String),

    #[error("{0}")]
    BadRequest(String),

    #[error("internal error")]
    Internal(#[source] BoxError),
}

impl Error {
    pub fn forbidden(reason: impl Into<String>) -> Self {
        Self::Forbidden(reason.into())
    }

    pub fn unauthorized(reason: impl Into<String>) -> Self {
        Self::Unauthorized(reason.into())
    }

    pub fn bad_request(reason: impl Into<String>) -> Self {
        Self::BadRequest(reason.into())
    }

    /// Wraps any error as an unclassified failure (500).
    pub fn internal(err: impl Into<BoxError>) -> Self {
        Self::Internal(err.into())
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Forbidden(_)    => ErrorKind::Forbidden,
            Self::Unauthorized(_) => ErrorKind::Unauthorized,
            Self::BadRequest(_)   => ErrorKind::BadRequest,
            Self::Internal(_)     => ErrorKind::Unclassified,
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Self::internal(e)
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Self::internal(e)
    }
}

/// Every way a request can end without a `200`.
///
/// `NotFound` and `MethodNotAllowed` are produced by route resolution only;
/// they never travel through [`Error`].
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum ErrorKind {
    Forbidden,
    Unauthorized,
    BadRequest,
    NotFound,
    MethodNotAllowed,
    Unclassified,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Forbidden        => "forbidden",
            Self::Unauthorized     => "unauthorized",
            Self::BadRequest       => "bad request",
            Self::NotFound         => "not found",
            Self::MethodNotAllowed => "method not allowed",
            Self::Unclassified     => "unclassified",
        })
    }
}

/// Rejected route, filter or static-file registration.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum RouteError {
    #[error("path `{0}` is already occupied for serving files")]
    ReservedPath(String),

    #[error("path `{0}` is already occupied by another route")]
    PathInUse(String),

    #[error("static files are already served from `{0}`")]
    StaticAlreadyReserved(String),

    #[error("invalid route pattern `{pattern}`: {reason}")]
    InvalidPattern { pattern: String, reason: &'static str },
}

/// Failure to start or run the server.
#[derive(Debug, thiserror::Error)]
pub enum ServeError {
    #[error("io: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid socket address `{0}`")]
    Address(String),

    #[error(transparent)]
    Config(#[from] ConfigError),
}
