//! HTTP API over the collected data
//!
//! Serves:
//! - GET /                 - Service greeting
//! - GET /reports          - Reports, newest first (`platform`, `limit`)
//! - GET /reports/{id}     - One report with its findings
//! - GET /findings         - Findings (`severity`, `report_id`)
//! - POST /collect         - Wake the scheduler (`platform`)
//!
//! Requests are served by a fixed pool of OS threads sharing one listener,
//! independent of the tokio runtime that runs the collector.

mod handlers;

pub use handlers::{route, ApiResponse, ROOT_MESSAGE};

use crate::storage::SharedStorage;
use crate::AuditError;
use std::net::SocketAddr;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use tiny_http::{Header, Request, Response, Server};
use tokio::sync::Notify;

/// State shared by all API workers
#[derive(Clone)]
pub struct ApiState {
    pub storage: SharedStorage,

    /// Notified by `POST /collect`
    pub trigger: Arc<Notify>,

    /// Platforms that have a collector
    pub platforms: Vec<String>,
}

impl ApiState {
    pub fn new(storage: SharedStorage, trigger: Arc<Notify>, platforms: Vec<String>) -> Self {
        Self {
            storage,
            trigger,
            platforms,
        }
    }
}

/// A bound, not yet serving, API listener
pub struct ApiServer {
    server: Arc<Server>,
    state: ApiState,
}

impl ApiServer {
    /// Binds the listener; port 0 picks a free port
    pub fn bind(addr: &str, state: ApiState) -> Result<Self, AuditError> {
        let server = Server::http(addr)
            .map_err(|e| AuditError::Server(format!("Failed to bind {}: {}", addr, e)))?;

        Ok(Self {
            server: Arc::new(server),
            state,
        })
    }

    /// Address actually bound
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.server.server_addr().to_ip()
    }

    /// Starts `workers` threads serving requests
    pub fn spawn(self, workers: usize) -> Result<ApiHandle, AuditError> {
        let addr = self.local_addr();
        let mut handles = Vec::with_capacity(workers.max(1));

        for index in 0..workers.max(1) {
            let server = Arc::clone(&self.server);
            let state = self.state.clone();
            let handle = thread::Builder::new()
                .name(format!("api-worker-{}", index))
                .spawn(move || {
                    for request in server.incoming_requests() {
                        serve(&state, request);
                    }
                })?;
            handles.push(handle);
        }

        if let Some(addr) = addr {
            tracing::info!(
                "API listening on http://{} ({} workers)",
                addr,
                handles.len()
            );
        }

        Ok(ApiHandle {
            server: self.server,
            addr,
            workers: handles,
        })
    }
}

/// Running API server
pub struct ApiHandle {
    server: Arc<Server>,
    addr: Option<SocketAddr>,
    workers: Vec<JoinHandle<()>>,
}

impl ApiHandle {
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.addr
    }

    /// Stops accepting requests and waits for the workers to finish
    pub fn shutdown(self) {
        // Each unblock releases one waiting worker
        for _ in &self.workers {
            self.server.unblock();
        }
        for worker in self.workers {
            if worker.join().is_err() {
                tracing::warn!("API worker panicked during shutdown");
            }
        }
        tracing::info!("API stopped");
    }
}

fn serve(state: &ApiState, request: Request) {
    let method = request.method().to_string();
    let url = request.url().to_string();

    let response = route(state, &method, &url);
    tracing::debug!("{} {} -> {}", method, url, response.status);

    let body = serde_json::to_string(&response.body)
        .unwrap_or_else(|_| "{\"detail\":\"serialize\"}".to_string());
    let mut reply = Response::from_string(body).with_status_code(response.status);
    if let Ok(header) = Header::from_bytes(&b"Content-Type"[..], &b"application/json"[..]) {
        reply = reply.with_header(header);
    }

    if let Err(e) = request.respond(reply) {
        tracing::warn!("Failed to send response for {} {}: {}", method, url, e);
    }
}
