//! HTTP server and graceful shutdown.
//!
//! # Workers
//!
//! Filters and handlers are synchronous. Every request takes a permit from a
//! fixed-size semaphore, then runs its whole dispatch on tokio's blocking pool.
//! `max_workers` therefore bounds how many requests are inside application
//! code at once; connections beyond that wait for a permit without holding a
//! thread.
//!
//! # Graceful shutdown and Kubernetes
//!
//! When Kubernetes terminates a pod it sends **SIGTERM** and waits
//! `terminationGracePeriodSeconds` (default 30 s) before sending SIGKILL.
//!
//! The server reacts by:
//! 1. Immediately stopping `listener.accept()`, so no new connections are made.
//! 2. Letting every in-flight connection task run to completion.
//! 3. Returning from [`Server::serve`], which lets `main` exit cleanly.

use std::convert::Infallible;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use hyper::body::Incoming;
use hyper::service::service_fn;
use hyper_util::rt::{TokioExecutor, TokioIo};
use hyper_util::server::conn::auto::Builder as ConnBuilder;
use tokio::net::TcpListener;
use tokio::sync::Semaphore;
use tracing::{debug, error, info};

use crate::config::Config;
use crate::error::{Error, ServeError};
use crate::mapper;
use crate::request::Request;
use crate::response::Response;
use crate::router::Router;

const DEFAULT_MAX_WORKERS: usize = 64;

enum Listen {
    Addr(SocketAddr),
    Bound(TcpListener),
}

/// The HTTP server.
pub struct Server {
    listen: Listen,
    max_workers: usize,
}

impl Server {
    /// Configures the server to bind to `addr` when [`serve`](Server::serve)
    /// is called.
    ///
    /// ```rust,no_run
    /// # fn main() -> Result<(), stout::ServeError> {
    /// let server = stout::Server::bind("0.0.0.0:3000")?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn bind(addr: &str) -> Result<Self, ServeError> {
        let addr: SocketAddr = addr.parse().map_err(|_| ServeError::Address(addr.to_owned()))?;
        Ok(Self { listen: Listen::Addr(addr), max_workers: DEFAULT_MAX_WORKERS })
    }

    /// Address and worker bound from `config`.
    pub fn from_config(config: &Config) -> Result<Self, ServeError> {
        Ok(Self { listen: Listen::Addr(config.addr()?), max_workers: config.max_workers })
    }

    /// Serves on an already-bound listener (port `0` in tests, socket
    /// activation, …).
    pub fn from_listener(listener: TcpListener) -> Self {
        Self { listen: Listen::Bound(listener), max_workers: DEFAULT_MAX_WORKERS }
    }

    /// Caps concurrent requests inside application code. Values below 1 are
    /// raised to 1.
    pub fn max_workers(mut self, n: usize) -> Self {
        self.max_workers = n.max(1);
        self
    }

    /// Starts accepting connections and dispatching them through `router`.
    ///
    /// Returns only after a full graceful shutdown (SIGTERM or Ctrl-C,
    /// followed by all in-flight requests completing).
    pub async fn serve(self, router: Router) -> Result<(), ServeError> {
        self.serve_with_shutdown(router, shutdown_signal()).await
    }

    /// Like [`serve`](Server::serve), but stops accepting when `signal`
    /// resolves instead of waiting for a process signal.
    pub async fn serve_with_shutdown(
        self,
        router: Router,
        signal: impl Future<Output = ()>,
    ) -> Result<(), ServeError> {
        let listener = match self.listen {
            Listen::Addr(addr) => TcpListener::bind(addr).await?,
            Listen::Bound(listener) => listener,
        };

        // Shared across connection tasks; read-only from here on.
        let router = Arc::new(router);
        let workers = Arc::new(Semaphore::new(self.max_workers));

        info!(
            addr = %listener.local_addr()?,
            routes = router.route_count(),
            filters = router.filter_count(),
            max_workers = self.max_workers,
            "stout listening"
        );

        // JoinSet tracks every spawned connection task so we can wait for
        // them all to finish during graceful shutdown.
        let mut tasks = tokio::task::JoinSet::new();

        tokio::pin!(signal);

        loop {
            tokio::select! {
                // Check shutdown first so a SIGTERM stops accepting new
                // connections even if more are queued.
                biased;

                () = &mut signal => {
                    info!(in_flight = tasks.len(), "shutdown signal received, draining connections");
                    break;
                }

                res = listener.accept() => {
                    let (stream, remote_addr) = match res {
                        Ok(v) => v,
                        Err(e) => {
                            error!("accept error: {e}");
                            continue;
                        }
                    };

                    let router = Arc::clone(&router);
                    let workers = Arc::clone(&workers);
                    let io = TokioIo::new(stream);

                    tasks.spawn(async move {
                        // Called once per request on the connection.
                        let svc = service_fn(move |req| {
                            let router = Arc::clone(&router);
                            let workers = Arc::clone(&workers);
                            async move { dispatch(router, workers, req).await }
                        });

                        // HTTP/1.1 or HTTP/2, whichever the client speaks.
                        if let Err(e) = ConnBuilder::new(TokioExecutor::new())
                            .serve_connection(io, svc)
                            .await
                        {
                            debug!(peer = %remote_addr, "connection error: {e}");
                        }
                    });
                }

                // Reap finished connection tasks so the JoinSet does not grow
                // without bound on long-running servers.
                Some(_) = tasks.join_next(), if !tasks.is_empty() => {}
            }
        }

        while tasks.join_next().await.is_some() {}

        info!("stout stopped");
        Ok(())
    }
}

// ── Request dispatch ──────────────────────────────────────────────────────────

/// Reads the body, waits for a worker permit, and runs the router on the
/// blocking pool.
///
/// The error type is [`Infallible`]: body read failures, a closed pool and a
/// panicking handler all become a mapped 500 here, so hyper never sees an
/// error.
async fn dispatch(
    router: Arc<Router>,
    workers: Arc<Semaphore>,
    req: hyper::Request<Incoming>,
) -> Result<http::Response<Full<Bytes>>, Infallible> {
    let (parts, body) = req.into_parts();
    let method = parts.method.clone();
    let path = parts.uri.path().to_owned();

    let body = match body.collect().await {
        Ok(collected) => collected.to_bytes(),
        Err(e) => return Ok(failure(&method, &path, Error::internal(e))),
    };

    let permit = match workers.acquire_owned().await {
        Ok(permit) => permit,
        Err(e) => return Ok(failure(&method, &path, Error::internal(e))),
    };

    let req = Request::from_http(http::Request::from_parts(parts, body));
    let handled = tokio::task::spawn_blocking(move || {
        let _permit = permit;
        router.handle(req)
    })
    .await;

    Ok(match handled {
        Ok(res) => res.into_http(),
        Err(e) => failure(&method, &path, Error::internal(e)),
    })
}

fn failure(method: &http::Method, path: &str, err: Error) -> http::Response<Full<Bytes>> {
    let mut res = Response::new();
    mapper::respond(method, path, &err, &mut res);
    res.into_http()
}

// ── Shutdown signal ───────────────────────────────────────────────────────────

/// Resolves on the first shutdown signal the process receives.
///
/// On Unix this listens for both **SIGTERM** (sent by `kubectl` and the
/// Kubernetes control plane) and **SIGINT** (Ctrl-C, for local dev).
/// On Windows only Ctrl-C is available. If a handler cannot be installed,
/// that arm never fires.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("cannot listen for Ctrl-C: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let sigterm = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut term) => {
                term.recv().await;
            }
            Err(e) => {
                error!("cannot listen for SIGTERM: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let sigterm = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c   => {}
        () = sigterm  => {}
    }
}
