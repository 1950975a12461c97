//! Shared test harness: scripted mock backends
//!
//! One generic backend serves any POST path with a scripted sequence of
//! body chunks, so tests control exactly where network chunk boundaries
//! fall inside a record.

use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use axum::Router;
use axum::body::Body;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use bytes::Bytes;
use tokio_util::sync::CancellationToken;

/// One step of a scripted response body
#[derive(Clone)]
pub enum Step {
    /// Send these bytes as one network chunk
    Send(&'static str),
    /// Pause between chunks
    Delay(Duration),
    /// Hold the connection open until the server shuts down
    Stall,
}

struct BackendState {
    status: StatusCode,
    script: Vec<Step>,
    hits: AtomicU32,
    shutdown: CancellationToken,
}

/// Mock backend serving a scripted streaming response
pub struct ScriptedBackend {
    addr: SocketAddr,
    state: Arc<BackendState>,
}

impl ScriptedBackend {
    /// Start a backend that answers every POST with the scripted body
    pub async fn start(script: Vec<Step>) -> anyhow::Result<Self> {
        Self::start_with_status(StatusCode::OK, script).await
    }

    /// Start a backend that answers with the given status
    pub async fn start_with_status(status: StatusCode, script: Vec<Step>) -> anyhow::Result<Self> {
        let shutdown = CancellationToken::new();
        let state = Arc::new(BackendState {
            status,
            script,
            hits: AtomicU32::new(0),
            shutdown: shutdown.clone(),
        });

        let app = Router::new().fallback(handle).with_state(Arc::clone(&state));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let shutdown_clone = shutdown.clone();

        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async move {
                    shutdown_clone.cancelled().await;
                })
                .await
                .ok();
        });

        Ok(Self { addr, state })
    }

    /// Base URL for configuring the backend as a provider endpoint
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Number of requests received
    pub fn hits(&self) -> u32 {
        self.state.hits.load(Ordering::Relaxed)
    }
}

impl Drop for ScriptedBackend {
    fn drop(&mut self) {
        self.state.shutdown.cancel();
    }
}

async fn handle(State(state): State<Arc<BackendState>>) -> Response {
    state.hits.fetch_add(1, Ordering::Relaxed);

    if !state.status.is_success() {
        return (state.status, "mock upstream failure").into_response();
    }

    let script = state.script.clone();
    let shutdown = state.shutdown.clone();
    let body = async_stream::stream! {
        for step in script {
            match step {
                Step::Send(bytes) => yield Ok::<Bytes, std::io::Error>(Bytes::from_static(bytes.as_bytes())),
                Step::Delay(duration) => tokio::time::sleep(duration).await,
                Step::Stall => shutdown.cancelled().await,
            }
        }
    };

    Response::new(Body::from_stream(body))
}
