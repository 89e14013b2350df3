//! # stout
//!
//! A small HTTP toolkit for JSON services: register a synchronous handler per
//! method and path, put filters in front, and let one mapper turn every
//! failure into the same error shape.
//!
//! ## What a request goes through
//!
//! 1. **Filters**, in registration order, for every filter whose pattern
//!    covers the path. A filter may mutate request and response, end the
//!    response early, or fail.
//! 2. **Route resolution**: exact path, then longest wildcard prefix, then
//!    the most specific `:param` pattern. No match → `404`; match without the
//!    method → `405`.
//! 3. **The handler**, whose return value is encoded as the `200` JSON body.
//! 4. Any [`Error`] from steps 1–3 goes to the **mapper**: `403`, `401`,
//!    `400` or `500` with `{"message", "tag"}`.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use stout::{middleware, Error, Json, Request, Response, Router, Server};
//!
//! #[derive(serde::Serialize)]
//! struct FileInfo { id: String, name: String }
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut app = Router::new();
//!     app.filter("/*", middleware::cors_all)
//!        .filter("/*", middleware::log_request)
//!        .get("/api/files/:id", get_file)?
//!        .post("/api/files", create_file)?;
//!
//!     Server::bind("0.0.0.0:3000")?.serve(app).await?;
//!     Ok(())
//! }
//!
//! fn get_file(req: &Request, _res: &mut Response) -> Result<Json<FileInfo>, Error> {
//!     let id = req.param("id").unwrap_or_default().to_owned();
//!     Ok(Json(FileInfo { name: format!("{id}.txt"), id }))
//! }
//!
//! fn create_file(req: &Request, _res: &mut Response) -> Result<serde_json::Value, Error> {
//!     let body: serde_json::Value = req.parse_json()?;
//!     if body.get("name").is_none() {
//!         return Err(Error::bad_request("name is required"));
//!     }
//!     Ok(body)
//! }
//! ```

mod dispatch;
mod error;
mod filter;
mod handler;
mod mapper;
mod matcher;
mod method;
mod params;
mod reply;
mod request;
mod response;
mod route_table;
mod router;
mod server;
mod static_files;

#[cfg(test)]
mod testing;

pub mod auth;
pub mod config;
pub mod middleware;

pub use config::{Config, ConfigError};
pub use error::{BoxError, Error, ErrorKind, RouteError, ServeError};
pub use mapper::{ErrorBody, GENERIC_MESSAGE, Message, map_error};
pub use matcher::Resolved;
pub use method::{Method, UnknownMethod};
pub use params::PathParams;
pub use reply::{IntoReply, Json, Reply};
pub use request::Request;
pub use response::Response;
pub use route_table::{MethodHandlers, PatternKind, RoutePattern};
pub use router::Router;
pub use server::Server;

pub use http::StatusCode;
