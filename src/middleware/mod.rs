//! Built-in middleware.
//!
//! Each item here is an ordinary filter function with the same signature an
//! application filter has. Nothing in the chain engine knows about them.
//!
//! ```rust,no_run
//! use stout::{Router, middleware};
//!
//! let mut app = Router::new();
//! app.filter("/*", middleware::cors_all)
//!    .filter("/*", middleware::log_request);
//! ```
//!
//! Order matters: filters run in registration order, so put CORS first if
//! preflight requests should not be logged.

mod cors;
mod logging;

pub use cors::cors_all;
pub use logging::log_request;
