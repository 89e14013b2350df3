//! Outgoing HTTP response type.
//!
//! Filters and handlers share one mutable [`Response`] per request. Status and
//! headers set by a filter survive into the handler; the dispatcher writes the
//! serialized handler return value as the body.

use bytes::Bytes;
use http::header::{CONTENT_TYPE, HeaderName, HeaderValue, LOCATION};
use http::{HeaderMap, StatusCode};
use http_body_util::Full;

/// Media type every response starts with.
pub const JSON: &str = "application/json";

/// An outgoing HTTP response under construction.
#[derive(Debug)]
pub struct Response {
    status: StatusCode,
    headers: HeaderMap,
    body: Vec<u8>,
    ended: bool,
}

impl Response {
    /// `200 OK`, `content-type: application/json`, empty body.
    pub fn new() -> Self {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static(JSON));
        Self { status: StatusCode::OK, headers, body: Vec::new(), ended: false }
    }

    pub fn status(&self) -> StatusCode { self.status }
    pub fn headers(&self) -> &HeaderMap { &self.headers }
    pub fn body(&self) -> &[u8] { &self.body }

    pub fn set_status(&mut self, status: StatusCode) -> &mut Self {
        self.status = status;
        self
    }

    /// Sets a header, replacing any previous value. Invalid names or values
    /// are dropped with a warning rather than failing the request.
    pub fn set_header(&mut self, name: &str, value: &str) -> &mut Self {
        match (HeaderName::try_from(name), HeaderValue::try_from(value)) {
            (Ok(name), Ok(value)) => {
                self.headers.insert(name, value);
            }
            _ => tracing::warn!(header = name, "dropping invalid response header"),
        }
        self
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    pub fn set_content_type(&mut self, value: &str) -> &mut Self {
        self.set_header(CONTENT_TYPE.as_str(), value)
    }

    pub fn set_body(&mut self, body: impl Into<Vec<u8>>) -> &mut Self {
        self.body = body.into();
        self
    }

    /// Marks the response as final. The filter chain stops after the filter
    /// that ended it, and neither routing nor the handler runs.
    pub fn end(&mut self) {
        self.ended = true;
    }

    pub fn is_ended(&self) -> bool {
        self.ended
    }

    /// `302 Found` to `url`, ending the response.
    pub fn redirect(&mut self, url: &str) {
        self.set_status(StatusCode::FOUND);
        self.set_header(LOCATION.as_str(), url);
        self.body.clear();
        self.end();
    }

    pub(crate) fn into_http(self) -> http::Response<Full<Bytes>> {
        let mut res = http::Response::new(Full::new(Bytes::from(self.body)));
        *res.status_mut() = self.status;
        *res.headers_mut() = self.headers;
        res
    }
}

impl Default for Response {
    fn default() -> Self { Self::new() }
}
