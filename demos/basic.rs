//! File-metadata API with basic-auth login, bearer-token filters and a static mount.
//!
//! Run with:
//!   cargo run --example basic                 # defaults, port 8080
//!   cargo run --example basic -- stout.toml   # host/port/workers/log_filter + [app]
//!
//! Try:
//!   curl -u alice:secret -X POST http://localhost:8080/login
//!   curl -H "authorization: Bearer $TOKEN" http://localhost:8080/api/files/42
//!   curl -H "authorization: Bearer $TOKEN" "http://localhost:8080/api/files?limit=5"
//!   curl http://localhost:8080/public/index.html

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::json;
use stout::auth;
use stout::{Config, Error, Json, Request, Response, Router, Server, middleware};
use tracing_subscriber::EnvFilter;

#[derive(Serialize)]
struct FileInfo {
    id: String,
    name: String,
}

#[derive(Deserialize)]
struct ListQuery {
    limit: Option<String>,
}

#[derive(Deserialize)]
struct NewFile {
    name: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = match std::env::args().nth(1) {
        Some(path) => Config::from_file(path)?,
        None => Config::default(),
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_filter)))
        .init();

    let secret: Arc<str> = config
        .setting::<String>("jwt.secret")?
        .unwrap_or_else(auth::generate_secret)
        .into();
    let ttl = config.setting::<i64>("jwt.ttl_minutes")?.unwrap_or(30);
    let public_dir = config.setting::<String>("public_dir")?.unwrap_or_else(|| "./public".to_owned());

    let mut app = Router::new();

    let key = Arc::clone(&secret);
    app.filter("/*", middleware::cors_all)
        .filter("/*", middleware::log_request)
        .filter("/api/*", move |req: &mut Request, _: &mut Response| {
            let claims = auth::verify_token(&key, auth::bearer_token(req)?)?;
            req.set_user(claims.sub);
            Ok(())
        });

    let key = Arc::clone(&secret);
    app.post("/login", move |req: &Request, _| {
        let creds = auth::basic_credentials(req)?;
        if creds.password != "secret" {
            return Err(Error::forbidden("wrong password"));
        }
        Ok(json!({"token": auth::issue_token(&key, ttl, &creds.username)?}))
    })?
    .get("/api/files", list_files)?
    .post("/api/files", create_file)?
    .get("/api/files/:id", get_file)?
    .delete("/api/files/:id", |_, _| Ok(()))?
    .static_files("/public/*", public_dir)?;

    Server::from_config(&config)?.serve(app).await?;
    Ok(())
}

fn list_files(req: &Request, _res: &mut Response) -> Result<Vec<FileInfo>, Error> {
    let query: ListQuery = req.parse_query()?;
    let limit: usize = query.limit.and_then(|l| l.parse().ok()).unwrap_or(10);
    Ok((1..=limit).map(|n| FileInfo { id: n.to_string(), name: format!("file-{n}.txt") }).collect())
}

fn get_file(req: &Request, _res: &mut Response) -> Result<Json<FileInfo>, Error> {
    let id = req.param("id").unwrap_or_default().to_owned();
    Ok(Json(FileInfo { name: format!("{id}.txt"), id }))
}

fn create_file(req: &Request, res: &mut Response) -> Result<Json<FileInfo>, Error> {
    let file: NewFile = req.parse_json()?;
    if file.name.is_empty() {
        return Err(Error::bad_request("name is required"));
    }
    let owner = req.user::<String>().cloned().unwrap_or_default();
    res.set_header("x-owner", &owner);
    Ok(Json(FileInfo { id: "99".to_owned(), name: file.name }))
}
