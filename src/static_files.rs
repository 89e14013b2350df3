//! Serving files from one reserved path.
//!
//! The router allows a single static mount. Its path is reserved: no route
//! may be registered on it, and it cannot be placed on a path a route already
//! uses. A mount ending in `*` serves everything under its prefix; any other
//! mount serves only its own directory index.

use std::io::ErrorKind as IoErrorKind;
use std::path::{Component, Path, PathBuf};

use http::StatusCode;

use crate::error::Error;
use crate::mapper;
use crate::request::Request;
use crate::response::Response;

const INDEX: &str = "index.html";

pub(crate) struct StaticFiles {
    mount: String,
    root: PathBuf,
}

impl StaticFiles {
    pub(crate) fn new(mount: &str, root: impl Into<PathBuf>) -> Self {
        Self { mount: mount.to_owned(), root: root.into() }
    }

    pub(crate) fn mount(&self) -> &str {
        &self.mount
    }

    /// The part of `path` under the mount, or `None` if the mount does not
    /// cover it.
    fn relative<'p>(&self, path: &'p str) -> Option<&'p str> {
        match self.mount.strip_suffix('*') {
            Some(prefix) => path.strip_prefix(prefix),
            None if path == self.mount => Some(""),
            None => None,
        }
    }

    pub(crate) fn covers(&self, path: &str) -> bool {
        self.relative(path).is_some()
    }

    /// Writes the file for `req` into `res`. Missing files (and any path that
    /// tries to climb out of the root) answer `404`.
    pub(crate) fn serve(&self, req: &Request, res: &mut Response) -> Result<(), Error> {
        if req.method() != http::Method::GET && req.method() != http::Method::HEAD {
            res.set_header("allow", "GET, HEAD");
            mapper::message(res, StatusCode::METHOD_NOT_ALLOWED, "Method Not Allowed");
            return Ok(());
        }

        let Some(file) = self.relative(req.path()).and_then(|rel| self.locate(rel)) else {
            mapper::message(res, StatusCode::NOT_FOUND, "Not Found");
            return Ok(());
        };

        match std::fs::read(&file) {
            Ok(bytes) => {
                res.set_status(StatusCode::OK).set_content_type(content_type(&file));
                if req.method() == http::Method::GET {
                    res.set_body(bytes);
                }
                Ok(())
            }
            Err(e) if e.kind() == IoErrorKind::NotFound => {
                mapper::message(res, StatusCode::NOT_FOUND, "Not Found");
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }

    fn locate(&self, relative: &str) -> Option<PathBuf> {
        let relative = Path::new(relative.trim_start_matches('/'));
        if relative.components().any(|c| !matches!(c, Component::Normal(_))) {
            return None;
        }

        let path = self.root.join(relative);
        if path.is_dir() { Some(path.join(INDEX)) } else { Some(path) }
    }
}

fn content_type(path: &Path) -> &'static str {
    match path.extension().and_then(|e| e.to_str()) {
        Some("html" | "htm") => "text/html; charset=utf-8",
        Some("css")          => "text/css",
        Some("js" | "mjs")   => "text/javascript",
        Some("json")         => "application/json",
        Some("svg")          => "image/svg+xml",
        Some("png")          => "image/png",
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("gif")          => "image/gif",
        Some("ico")          => "image/x-icon",
        Some("txt")          => "text/plain; charset=utf-8",
        Some("pdf")          => "application/pdf",
        Some("wasm")         => "application/wasm",
        _                    => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use bytes::Bytes;

    use super::*;

    fn get(path: &str) -> Request {
        Request::from_http(http::Request::builder().uri(path).body(Bytes::new()).unwrap())
    }

    fn site() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("index.html"), "<h1>home</h1>").unwrap();
        std::fs::create_dir(dir.path().join("css")).unwrap();
        std::fs::write(dir.path().join("css/site.css"), "body{}").unwrap();
        dir
    }

    #[test]
    fn prefix_mount_serves_nested_files() {
        let dir = site();
        let files = StaticFiles::new("/public/*", dir.path());
        let mut res = Response::new();

        files.serve(&get("/public/css/site.css"), &mut res).unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(res.header("content-type"), Some("text/css"));
        assert_eq!(res.body(), b"body{}");
    }

    #[test]
    fn directory_falls_back_to_index() {
        let dir = site();
        let files = StaticFiles::new("/", dir.path());
        assert!(files.covers("/"));
        assert!(!files.covers("/other"));

        let mut res = Response::new();
        files.serve(&get("/"), &mut res).unwrap();
        assert_eq!(res.body(), b"<h1>home</h1>");
    }

    #[test]
    fn missing_or_escaping_paths_are_not_found() {
        let dir = site();
        let files = StaticFiles::new("/public/*", dir.path());

        for path in ["/public/nope.txt", "/public/../secret", "/public/css/../../etc/passwd"] {
            let mut res = Response::new();
            files.serve(&get(path), &mut res).unwrap();
            assert_eq!(res.status(), StatusCode::NOT_FOUND, "{path}");
        }
    }
}
