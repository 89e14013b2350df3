use serde_json::json;
use stout::{Request, Router, Server};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::oneshot;

async fn roundtrip(addr: std::net::SocketAddr, raw: &str) -> String {
    let mut stream = TcpStream::connect(addr).await.unwrap();
    stream.write_all(raw.as_bytes()).await.unwrap();
    let mut out = String::new();
    stream.read_to_string(&mut out).await.unwrap();
    out
}

#[tokio::test]
async fn serves_over_a_real_socket_and_drains_on_shutdown() {
    let mut app = Router::new();
    app.get("/api/files/:id", |req: &Request, _| Ok(json!({"id": req.param("id"), "name": "a.txt"})))
        .unwrap();

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (stop, stopped) = oneshot::channel::<()>();

    let server = tokio::spawn(
        Server::from_listener(listener)
            .max_workers(2)
            .serve_with_shutdown(app, async move {
                let _ = stopped.await;
            }),
    );

    let ok = roundtrip(addr, "GET /api/files/42 HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n").await;
    assert!(ok.starts_with("HTTP/1.1 200 OK"), "{ok}");
    assert!(ok.contains("content-type: application/json"), "{ok}");
    assert!(ok.ends_with(r#"{"id":"42","name":"a.txt"}"#), "{ok}");

    let missing = roundtrip(addr, "GET /nope HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n").await;
    assert!(missing.starts_with("HTTP/1.1 404 Not Found"), "{missing}");
    assert!(missing.ends_with(r#"{"message":"Not Found"}"#), "{missing}");

    let wrong = roundtrip(addr, "POST /api/files/42 HTTP/1.1\r\nHost: localhost\r\nContent-Length: 0\r\nConnection: close\r\n\r\n").await;
    assert!(wrong.starts_with("HTTP/1.1 405 Method Not Allowed"), "{wrong}");
    assert!(wrong.contains("allow: GET"), "{wrong}");

    stop.send(()).unwrap();
    server.await.unwrap().unwrap();
}

#[test]
fn bad_bind_address_is_reported() {
    assert!(matches!(Server::bind("not-an-address"), Err(stout::ServeError::Address(_))));
}
