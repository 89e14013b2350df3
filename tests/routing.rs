use std::sync::{Arc, Mutex};

use bytes::Bytes;
use serde::Serialize;
use serde_json::{Value, json};
use stout::{Error, ErrorBody, Json, PatternKind, Request, Response, RouteError, Router, StatusCode, middleware};

fn send(app: &Router, method: &str, path: &str) -> Response {
    send_with(app, http::Request::builder().method(method).uri(path))
}

fn send_with(app: &Router, builder: http::request::Builder) -> Response {
    app.handle(Request::from_http(builder.body(Bytes::new()).unwrap()))
}

fn json_body(res: &Response) -> Value {
    serde_json::from_slice(res.body()).unwrap()
}

#[derive(Serialize)]
struct FileInfo {
    name: String,
}

#[test]
fn exact_route_serves_registered_methods_only() {
    let mut app = Router::new();
    app.get("/api/health", |_, _| Ok(json!({"status": "up"}))).unwrap();

    let res = send(&app, "GET", "/api/health");
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(json_body(&res), json!({"status": "up"}));

    for method in ["POST", "PUT", "DELETE", "PATCH"] {
        assert_eq!(send(&app, method, "/api/health").status(), StatusCode::METHOD_NOT_ALLOWED, "{method}");
    }
}

#[test]
fn unregistered_paths_are_404_with_message() {
    let mut app = Router::new();
    app.get("/a", |_, _| Ok("{}")).unwrap();

    for path in ["/", "/b", "/a/b", "/api/files/42"] {
        let res = send(&app, "GET", path);
        assert_eq!(res.status(), StatusCode::NOT_FOUND, "{path}");
        assert_eq!(res.body(), br#"{"message":"Not Found"}"#);
    }
}

#[test]
fn wildcard_routes_match_by_prefix() {
    let mut app = Router::new();
    app.get("/assets/*", |req: &Request, _| Ok(json!({"asset": req.path()})))
        .and_then(|a| a.get("/docs/*", |_, _| Ok(json!({"docs": true}))))
        .unwrap();

    let res = send(&app, "GET", "/assets/css/site.css");
    assert_eq!(json_body(&res), json!({"asset": "/assets/css/site.css"}));
    assert_eq!(json_body(&send(&app, "GET", "/docs/intro")), json!({"docs": true}));
    assert_eq!(app.resolve("/assets/x").unwrap().kind(), PatternKind::Wildcard);
}

#[test]
fn parameterized_route_binds_before_handler_runs() {
    let seen = Arc::new(Mutex::new(None));
    let record = Arc::clone(&seen);

    let mut app = Router::new();
    app.get("/api/files/:id", move |req: &Request, _| {
        *record.lock().unwrap() = req.param("id").map(str::to_owned);
        assert_eq!(req.param(":id"), req.param("id"));
        Ok(Json(FileInfo { name: "a.txt".into() }))
    })
    .unwrap();

    let res = send(&app, "GET", "/api/files/42");
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.header("content-type"), Some("application/json"));
    assert_eq!(json_body(&res), json!({"name": "a.txt"}));
    assert_eq!(seen.lock().unwrap().as_deref(), Some("42"));

    assert_eq!(send(&app, "GET", "/api/files/42/extra").status(), StatusCode::NOT_FOUND);
}

#[test]
fn params_are_per_request() {
    let mut app = Router::new();
    app.get("/users/:user/posts/:post", |req: &Request, _| {
        Ok(json!({"user": req.param("user"), "post": req.param("post")}))
    })
    .and_then(|a| a.get("/plain", |req: &Request, _| Ok(json!({"user": req.param("user")}))))
    .unwrap();

    assert_eq!(json_body(&send(&app, "GET", "/users/ann/posts/7")), json!({"user": "ann", "post": "7"}));
    assert_eq!(json_body(&send(&app, "GET", "/users/bob/posts/9")), json!({"user": "bob", "post": "9"}));
    assert_eq!(json_body(&send(&app, "GET", "/plain")), json!({"user": null}));
}

#[test]
fn static_reservation_conflicts_fail_at_registration() {
    let mut app = Router::new();
    app.static_files("/public/*", "./public").unwrap();
    assert_eq!(app.get("/public/*", |_, _| Ok(())).err(), Some(RouteError::ReservedPath("/public/*".into())));

    let mut app = Router::new();
    app.get("/public/*", |_, _| Ok(())).unwrap();
    assert_eq!(app.static_files("/public/*", "./public").err(), Some(RouteError::PathInUse("/public/*".into())));
}

#[test]
fn static_mount_serves_files_and_filters_still_run() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("hello.txt"), "hi there").unwrap();

    let mut app = Router::new();
    app.filter("/*", middleware::cors_all).static_files("/public/*", dir.path()).unwrap();

    let res = send(&app, "GET", "/public/hello.txt");
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.body(), b"hi there");
    assert_eq!(res.header("content-type"), Some("text/plain; charset=utf-8"));
    assert_eq!(res.header("access-control-allow-origin"), Some("*"));

    assert_eq!(send(&app, "GET", "/public/missing.txt").status(), StatusCode::NOT_FOUND);
}

#[test]
fn bad_request_filter_short_circuits() {
    let calls = Arc::new(Mutex::new(Vec::new()));
    let (in_filter, in_handler) = (Arc::clone(&calls), Arc::clone(&calls));

    let mut app = Router::new();
    app.filter("/api/*", |req: &mut Request, _: &mut Response| match req.header("x-api-key") {
        Some(_) => Ok(()),
        None => Err(Error::bad_request("x-api-key header is required")),
    })
    .filter("/*", move |_, _| {
        in_filter.lock().unwrap().push("later filter");
        Ok(())
    })
    .get("/api/files", move |_, _| {
        in_handler.lock().unwrap().push("handler");
        Ok(json!([]))
    })
    .unwrap();

    let res = send(&app, "GET", "/api/files");
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: ErrorBody = serde_json::from_slice(res.body()).unwrap();
    assert_eq!(body.message, "x-api-key header is required");
    assert!(uuid::Uuid::parse_str(&body.tag).is_ok());
    assert!(calls.lock().unwrap().is_empty());

    let res = send_with(&app, http::Request::builder().uri("/api/files").header("x-api-key", "k"));
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(*calls.lock().unwrap(), vec!["later filter", "handler"]);
}

#[test]
fn same_failure_gets_a_new_tag_each_time() {
    let mut app = Router::new();
    app.get("/locked", |_, _| Err::<(), _>(Error::forbidden("locked"))).unwrap();

    let first: ErrorBody = serde_json::from_slice(send(&app, "GET", "/locked").body()).unwrap();
    let second: ErrorBody = serde_json::from_slice(send(&app, "GET", "/locked").body()).unwrap();
    assert_eq!(first.message, "Forbidden");
    assert_eq!(first.message, second.message);
    assert_ne!(first.tag, second.tag);
}

#[test]
fn cors_preflight_never_reaches_handler_or_later_filters() {
    let mut app = Router::new();
    app.filter("/*", middleware::cors_all)
        .filter("/*", |_, _| Err(Error::unauthorized("no token")))
        .route(stout::Method::Options, "/api/files", |_, _| -> Result<(), Error> {
            panic!("handler must not run for preflight")
        })
        .unwrap();

    let res = send(&app, "OPTIONS", "/api/files");
    assert_eq!(res.status(), StatusCode::OK);
    assert!(res.body().is_empty());
    assert_eq!(res.header("access-control-allow-headers"), Some("Content-Type, Authorization"));

    let res = send(&app, "GET", "/api/files");
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(json_body(&res)["message"], "Unauthorized");
    assert_eq!(res.header("access-control-allow-origin"), Some("*"));
}

#[test]
fn jwt_failures_surface_as_401() {
    let secret = stout::auth::generate_secret();
    let mut app = Router::new();
    let key = secret.clone();
    app.filter("/api/*", move |req: &mut Request, _: &mut Response| {
        let claims = stout::auth::verify_token(&key, stout::auth::bearer_token(req)?)?;
        req.set_user(claims.sub);
        Ok(())
    })
    .get("/api/me", |req: &Request, _| Ok(json!({"user": req.user::<String>()})))
    .unwrap();

    let token = stout::auth::issue_token(&secret, 5, "user-42").unwrap();
    let ok = send_with(&app, http::Request::builder().uri("/api/me").header("authorization", format!("Bearer {token}")));
    assert_eq!(ok.status(), StatusCode::OK);
    assert_eq!(json_body(&ok), json!({"user": "user-42"}));

    let forged = stout::auth::issue_token("other-secret", 5, "user-42").unwrap();
    let bad = send_with(&app, http::Request::builder().uri("/api/me").header("authorization", format!("Bearer {forged}")));
    assert_eq!(bad.status(), StatusCode::UNAUTHORIZED);

    assert_eq!(send(&app, "GET", "/api/me").status(), StatusCode::UNAUTHORIZED);
}

#[test]
fn request_helpers_feed_bad_request() {
    #[derive(serde::Deserialize)]
    struct NewFile {
        name: String,
    }

    let mut app = Router::new();
    app.post("/api/files", |req: &Request, _| {
        let file: NewFile = req.parse_json()?;
        Ok(json!({"created": file.name}))
    })
    .unwrap();

    let ok = app.handle(Request::from_http(
        http::Request::builder().method("POST").uri("/api/files").body(Bytes::from_static(br#"{"name":"a.txt"}"#)).unwrap(),
    ));
    assert_eq!(json_body(&ok), json!({"created": "a.txt"}));

    let bad = app.handle(Request::from_http(
        http::Request::builder().method("POST").uri("/api/files").body(Bytes::from_static(b"name=a.txt")).unwrap(),
    ));
    assert_eq!(bad.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(&bad)["message"], "Could not parse request's body");
}
