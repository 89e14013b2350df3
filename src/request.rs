//! Incoming HTTP request type.

use bytes::Bytes;
use http::{Extensions, HeaderMap};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value, map::Entry};

use crate::error::Error;
use crate::params::PathParams;
use crate::route_table::split_segments;

const BODY_PARSE_ERROR: &str = "Could not parse request's body";
const QUERY_PARSE_ERROR: &str = "Could not parse request's query params";

/// An incoming HTTP request with its body fully read.
///
/// Filters receive it as `&mut Request` and may attach attributes through
/// [`extensions_mut`](Request::extensions_mut); handlers see it as `&Request`.
#[derive(Debug)]
pub struct Request {
    method: http::Method,
    path: String,
    query: Option<String>,
    headers: HeaderMap,
    body: Bytes,
    extensions: Extensions,
}

/// Marker wrapper so the authenticated principal never collides with a
/// same-typed attribute stored by application code.
#[derive(Clone)]
struct User<T>(T);

impl Request {
    /// Builds a request from an `http` request whose body has been collected.
    pub fn from_http(req: http::Request<Bytes>) -> Self {
        let (parts, body) = req.into_parts();
        Self {
            method: parts.method,
            path: parts.uri.path().to_owned(),
            query: parts.uri.query().map(str::to_owned),
            headers: parts.headers,
            body,
            extensions: parts.extensions,
        }
    }

    pub fn method(&self) -> &http::Method { &self.method }
    pub fn path(&self) -> &str { &self.path }
    pub fn query(&self) -> Option<&str> { self.query.as_deref() }
    pub fn headers(&self) -> &HeaderMap { &self.headers }
    pub fn headers_mut(&mut self) -> &mut HeaderMap { &mut self.headers }
    pub fn body(&self) -> &[u8] { &self.body }
    pub fn extensions(&self) -> &Extensions { &self.extensions }
    pub fn extensions_mut(&mut self) -> &mut Extensions { &mut self.extensions }

    /// Case-insensitive header lookup. Non-UTF-8 values read as absent.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Returns a named path parameter.
    ///
    /// For a route `/users/:id`, `req.param("id")` on `/users/42` returns
    /// `Some("42")`. `req.param(":id")` is accepted too.
    pub fn param(&self, name: &str) -> Option<&str> {
        self.extensions.get::<PathParams>()?.get(name)
    }

    /// All path parameters bound for this request (empty unless a
    /// parameterized route matched).
    pub fn params(&self) -> Option<&PathParams> {
        self.extensions.get::<PathParams>()
    }

    pub(crate) fn set_params(&mut self, params: PathParams) {
        self.extensions.insert(params);
    }

    /// Zero-based segment of the request path: on `/api/files/42`,
    /// index `2` is `"42"`. An empty segment in the middle (`/a//b`, index
    /// `1`) is `Some("")`; trailing empty segments do not count.
    pub fn path_segment(&self, index: usize) -> Option<&str> {
        split_segments(&self.path).get(index + 1).copied()
    }

    /// Deserializes the JSON body. Any failure is a `400`.
    pub fn parse_json<T: DeserializeOwned>(&self) -> Result<T, Error> {
        serde_json::from_slice(&self.body).map_err(|_| Error::bad_request(BODY_PARSE_ERROR))
    }

    /// Deserializes the query string.
    ///
    /// Pairs are folded into a JSON object of strings first; a key that
    /// repeats becomes an array. Any failure is a `400`.
    pub fn parse_query<T: DeserializeOwned>(&self) -> Result<T, Error> {
        let raw = self.query.as_deref().unwrap_or_default();
        let mut fields = Map::new();

        for (key, value) in url::form_urlencoded::parse(raw.as_bytes()) {
            let value = Value::String(value.into_owned());
            match fields.entry(key.into_owned()) {
                Entry::Vacant(slot) => {
                    slot.insert(value);
                }
                Entry::Occupied(mut slot) => match slot.get_mut() {
                    Value::Array(items) => items.push(value),
                    first => *first = Value::Array(vec![first.take(), value]),
                },
            }
        }

        serde_json::from_value(Value::Object(fields))
            .map_err(|_| Error::bad_request(QUERY_PARSE_ERROR))
    }

    /// Attaches the authenticated principal, typically from an auth filter.
    pub fn set_user<T: Clone + Send + Sync + 'static>(&mut self, user: T) {
        self.extensions.insert(User(user));
    }

    pub fn user<T: Clone + Send + Sync + 'static>(&self) -> Option<&T> {
        self.extensions.get::<User<T>>().map(|u| &u.0)
    }
}

impl From<http::Request<Bytes>> for Request {
    fn from(req: http::Request<Bytes>) -> Self {
        Self::from_http(req)
    }
}
