//! In-process fake of the aggregator REST API.
//!
//! Every request is recorded. `auth/login` issues numbered tokens while
//! logins are allowed; other paths answer with whatever responder the test
//! registered, or `200 {}` by default. Requests without a bearer token get a
//! 401.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use axum::body::Bytes;
use axum::extract::{Query, State};
use axum::http::header::AUTHORIZATION;
use axum::http::{HeaderMap, Method, StatusCode, Uri};
use axum::Json;
use axum::Router;
use serde_json::{json, Value};
use shiprocket_client::ShiprocketConfig;

#[derive(Debug, Clone)]
pub struct Recorded {
    pub method: Method,
    pub path: String,
    pub authorization: Option<String>,
    pub query: HashMap<String, String>,
    pub body: Value,
}

type Responder = Arc<dyn Fn(&Recorded) -> (u16, Value) + Send + Sync>;

#[derive(Default)]
pub struct FakeState {
    login_allowed: AtomicBool,
    logins: AtomicUsize,
    requests: Mutex<Vec<Recorded>>,
    responders: Mutex<HashMap<String, Responder>>,
}

#[derive(Clone)]
pub struct FakeShiprocket {
    pub base_url: String,
    state: Arc<FakeState>,
}

impl FakeShiprocket {
    /// Bind to an ephemeral port and serve until the test runtime ends.
    pub async fn start() -> Self {
        let state = Arc::new(FakeState::default());
        state.login_allowed.store(true, Ordering::SeqCst);

        let app = Router::new().fallback(handle).with_state(state.clone());
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url: format!("http://{addr}"),
            state,
        }
    }

    pub fn config(&self) -> ShiprocketConfig {
        ShiprocketConfig::new("ops@example.com", "secret", "42").with_base_url(&self.base_url)
    }

    pub fn allow_login(&self, allowed: bool) {
        self.state.login_allowed.store(allowed, Ordering::SeqCst);
    }

    pub fn logins(&self) -> usize {
        self.state.logins.load(Ordering::SeqCst)
    }

    pub fn on<F>(&self, path: &str, responder: F)
    where
        F: Fn(&Recorded) -> (u16, Value) + Send + Sync + 'static,
    {
        self.state
            .responders
            .lock()
            .unwrap()
            .insert(path.to_string(), Arc::new(responder));
    }

    pub fn respond(&self, path: &str, status: u16, body: Value) {
        self.on(path, move |_| (status, body.clone()));
    }

    pub fn requests_to(&self, path: &str) -> Vec<Recorded> {
        self.state
            .requests
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.path == path)
            .cloned()
            .collect()
    }

    pub fn request_count(&self) -> usize {
        self.state.requests.lock().unwrap().len()
    }
}

async fn handle(
    State(state): State<Arc<FakeState>>,
    method: Method,
    uri: Uri,
    Query(query): Query<HashMap<String, String>>,
    headers: HeaderMap,
    body: Bytes,
) -> (StatusCode, Json<Value>) {
    let recorded = Recorded {
        method,
        path: uri.path().trim_start_matches('/').to_string(),
        authorization: headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string),
        query,
        body: serde_json::from_slice(&body).unwrap_or(Value::Null),
    };
    state.requests.lock().unwrap().push(recorded.clone());

    if recorded.path == "auth/login" {
        if !state.login_allowed.load(Ordering::SeqCst) {
            return (
                StatusCode::UNAUTHORIZED,
                Json(json!({"message": "Invalid email and password combination"})),
            );
        }
        let n = state.logins.fetch_add(1, Ordering::SeqCst) + 1;
        return (StatusCode::OK, Json(json!({"token": format!("token-{n}")})));
    }

    if recorded.authorization.is_none() {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({"message": "Token not provided"})),
        );
    }

    let responder = state.responders.lock().unwrap().get(&recorded.path).cloned();
    let (status, body) = match responder {
        Some(responder) => responder(&recorded),
        None => (200, json!({})),
    };
    (StatusCode::from_u16(status).unwrap(), Json(body))
}
