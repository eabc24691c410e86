//! Throw-away HTTP server for client tests
//!
//! An axum router whose fallback answers every request with the next canned
//! response and records what it received.

use axum::Router;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, Method, StatusCode, Uri, header};
use axum::response::IntoResponse;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone)]
pub(crate) struct CapturedRequest {
    pub method: String,
    pub target: String,
    pub headers: HeaderMap,
    pub body: String,
}

impl CapturedRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}

pub(crate) struct CannedResponse {
    pub status: u16,
    pub body: String,
}

impl CannedResponse {
    pub fn ok(body: impl Into<String>) -> Self {
        Self {
            status: 200,
            body: body.into(),
        }
    }

    pub fn status(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }
}

#[derive(Default)]
struct ServerState {
    responses: VecDeque<CannedResponse>,
    requests: Vec<CapturedRequest>,
}

type SharedState = Arc<Mutex<ServerState>>;

/// Handle on a running test server
#[derive(Clone)]
pub(crate) struct TestServer {
    state: SharedState,
}

impl TestServer {
    /// Requests received so far, in arrival order
    pub fn requests(&self) -> Vec<CapturedRequest> {
        self.state.lock().unwrap().requests.clone()
    }
}

/// Serves `responses` in order and returns the base URL plus a handle on
/// the captured requests
pub(crate) async fn serve(responses: Vec<CannedResponse>) -> (String, TestServer) {
    let state: SharedState = Arc::new(Mutex::new(ServerState {
        responses: responses.into(),
        requests: Vec::new(),
    }));

    let app = Router::new()
        .fallback(answer)
        .with_state(Arc::clone(&state));

    (spawn(app).await, TestServer { state })
}

/// Accepts requests and never answers them
pub(crate) async fn serve_silent() -> String {
    let app = Router::new().fallback(|| async {
        std::future::pending::<()>().await;
        StatusCode::OK
    });

    spawn(app).await
}

async fn spawn(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    format!("http://{}", addr)
}

async fn answer(
    State(state): State<SharedState>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> impl IntoResponse {
    let mut state = state.lock().unwrap();
    state.requests.push(CapturedRequest {
        method: method.to_string(),
        target: uri.to_string(),
        headers,
        body: String::from_utf8_lossy(&body).to_string(),
    });

    let (status, body) = match state.responses.pop_front() {
        Some(response) => (
            StatusCode::from_u16(response.status).unwrap(),
            response.body,
        ),
        None => (
            StatusCode::INTERNAL_SERVER_ERROR,
            "no canned response left".to_string(),
        ),
    };

    (status, [(header::CONTENT_TYPE, "application/json")], body)
}
