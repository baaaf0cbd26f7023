//! In-process HTTP stub for exercising the client, loader and gateway.
//!
//! Routes are matched in order on method and path. A route limited with
//! [`StubRoute::times`] stops matching once used up, so a later route for the
//! same path can take over. Unmatched requests get a 404.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::extract::State;
use axum::http::{header, HeaderMap, Method, StatusCode, Uri};
use axum::response::IntoResponse;
use axum::Router;
use reqwest::Url;
use tokio::sync::Mutex;

#[derive(Debug, Clone)]
pub struct StubRoute {
    method: Method,
    path: String,
    status: u16,
    body: String,
    delay: Duration,
    remaining: Option<usize>,
}

impl StubRoute {
    pub fn new(method: Method, path: &str, status: u16, body: &str) -> Self {
        Self {
            method,
            path: path.to_string(),
            status,
            body: body.to_string(),
            delay: Duration::ZERO,
            remaining: None,
        }
    }

    pub fn get(path: &str, status: u16, body: &str) -> Self {
        Self::new(Method::GET, path, status, body)
    }

    pub fn post(path: &str, status: u16, body: &str) -> Self {
        Self::new(Method::POST, path, status, body)
    }

    pub fn put(path: &str, status: u16, body: &str) -> Self {
        Self::new(Method::PUT, path, status, body)
    }

    pub fn delete(path: &str, status: u16) -> Self {
        Self::new(Method::DELETE, path, status, "")
    }

    /// Holds the response back for `delay`.
    pub fn delayed(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn times(mut self, n: usize) -> Self {
        self.remaining = Some(n);
        self
    }
}

#[derive(Debug, Clone)]
pub struct SeenRequest {
    pub method: String,
    pub path: String,
    pub content_type: Option<String>,
    pub body: String,
}

struct StubState {
    routes: Mutex<Vec<StubRoute>>,
    seen: Mutex<Vec<SeenRequest>>,
}

pub struct Stub {
    addr: SocketAddr,
    state: Arc<StubState>,
}

impl Stub {
    pub fn api_url(&self) -> Url {
        Url::parse(&format!("http://{}/api", self.addr)).unwrap()
    }

    pub async fn requests(&self) -> Vec<SeenRequest> {
        self.state.seen.lock().await.clone()
    }
}

async fn handle(
    State(state): State<Arc<StubState>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: String,
) -> impl IntoResponse {
    state.seen.lock().await.push(SeenRequest {
        method: method.to_string(),
        path: uri.path().to_string(),
        content_type: headers
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string),
        body,
    });

    let matched = {
        let mut routes = state.routes.lock().await;
        routes
            .iter_mut()
            .find(|r| r.method == method && r.path == uri.path() && r.remaining != Some(0))
            .map(|route| {
                if let Some(n) = route.remaining.as_mut() {
                    *n -= 1;
                }
                route.clone()
            })
    };

    match matched {
        Some(route) => {
            tokio::time::sleep(route.delay).await;
            (
                StatusCode::from_u16(route.status).unwrap(),
                [(header::CONTENT_TYPE, "application/json")],
                route.body,
            )
        }
        None => (
            StatusCode::NOT_FOUND,
            [(header::CONTENT_TYPE, "application/json")],
            "{\"error\":\"not found\"}".to_string(),
        ),
    }
}

pub async fn spawn_stub(routes: Vec<StubRoute>) -> Stub {
    let state = Arc::new(StubState {
        routes: Mutex::new(routes),
        seen: Mutex::new(Vec::new()),
    });
    let app = Router::new().fallback(handle).with_state(state.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    Stub { addr, state }
}
