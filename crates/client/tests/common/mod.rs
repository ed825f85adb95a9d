//! In-process fake of the newsdesk admin API.
//!
//! Binds an axum router on `127.0.0.1:0` so the real reqwest client is
//! exercised end to end. Lock ownership is keyed by bearer token.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};

use newsdesk_client::{ApiConfig, NewsdeskApi};

#[derive(Default)]
pub struct FakeState {
    /// bearer token -> admin id
    pub tokens: HashMap<String, String>,
    /// article id -> owner admin id
    pub locks: HashMap<String, String>,
    /// article id -> stored wire record
    pub articles: HashMap<String, Value>,
    /// (article id, body) of every accepted update
    pub updates: Vec<(String, Value)>,
    /// email -> (password, role); role decides which login endpoint accepts it
    pub accounts: HashMap<String, (String, String)>,
}

pub type Shared = Arc<Mutex<FakeState>>;

pub struct FakeServer {
    pub base_url: String,
    pub state: Shared,
}

impl FakeServer {
    pub async fn start() -> Self {
        let state: Shared = Arc::new(Mutex::new(FakeState::default()));
        let app = router(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind fake server");
        let addr = listener.local_addr().expect("local addr");
        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("fake server");
        });

        Self {
            base_url: format!("http://{addr}"),
            state,
        }
    }

    /// Register a token for an admin and return a client using it.
    pub fn client_for(&self, admin_id: &str) -> NewsdeskApi {
        let token = format!("token-{admin_id}");
        self.state
            .lock()
            .unwrap()
            .tokens
            .insert(token.clone(), admin_id.to_string());
        self.anonymous().with_token(token)
    }

    pub fn anonymous(&self) -> NewsdeskApi {
        NewsdeskApi::new(&ApiConfig::new(self.base_url.clone())).expect("client")
    }

    pub fn insert_article(&self, id: &str, record: Value) {
        self.state
            .lock()
            .unwrap()
            .articles
            .insert(id.to_string(), record);
    }

    pub fn force_release(&self, article_id: &str) {
        self.state.lock().unwrap().locks.remove(article_id);
    }

    pub fn owner_of(&self, article_id: &str) -> Option<String> {
        self.state.lock().unwrap().locks.get(article_id).cloned()
    }
}

fn router(state: Shared) -> Router {
    Router::new()
        .route("/api/admin/login", post(admin_login))
        .route("/api/superadmin/login", post(superadmin_login))
        .route("/api/admin/article/{id}", get(get_article).put(put_article))
        .route("/api/admin/article/{id}/lock", post(lock))
        .route("/api/admin/article/{id}/unlock", post(unlock))
        .route("/api/admin/article/{id}/lock-status", get(lock_status))
        .with_state(state)
}

type Reply = (StatusCode, Json<Value>);

fn caller(state: &Shared, headers: &HeaderMap) -> Result<String, Reply> {
    let token = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .unwrap_or_default();
    state
        .lock()
        .unwrap()
        .tokens
        .get(token)
        .cloned()
        .ok_or((
            StatusCode::UNAUTHORIZED,
            Json(json!({"success": false, "message": "Invalid token"})),
        ))
}

async fn lock(State(state): State<Shared>, headers: HeaderMap, Path(id): Path<String>) -> Reply {
    let admin = match caller(&state, &headers) {
        Ok(admin) => admin,
        Err(reply) => return reply,
    };
    let mut guard = state.lock().unwrap();
    match guard.locks.get(&id).cloned() {
        Some(owner) if owner != admin => (
            StatusCode::CONFLICT,
            Json(json!({
                "success": false,
                "message": "Article is locked by another admin",
                "data": {"isLocked": true, "lockedBy": owner},
            })),
        ),
        _ => {
            guard.locks.insert(id, admin);
            (
                StatusCode::OK,
                Json(json!({"success": true, "message": "Article locked"})),
            )
        }
    }
}

async fn unlock(State(state): State<Shared>, headers: HeaderMap, Path(id): Path<String>) -> Reply {
    let admin = match caller(&state, &headers) {
        Ok(admin) => admin,
        Err(reply) => return reply,
    };
    let mut guard = state.lock().unwrap();
    if guard.locks.get(&id) == Some(&admin) {
        guard.locks.remove(&id);
        (
            StatusCode::OK,
            Json(json!({"success": true, "message": "Article unlocked"})),
        )
    } else {
        (
            StatusCode::BAD_REQUEST,
            Json(json!({"success": false, "message": "You do not own the lock"})),
        )
    }
}

async fn lock_status(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Reply {
    if let Err(reply) = caller(&state, &headers) {
        return reply;
    }
    let guard = state.lock().unwrap();
    let owner = guard.locks.get(&id);
    (
        StatusCode::OK,
        Json(json!({
            "success": true,
            "data": {"isLocked": owner.is_some(), "lockedBy": owner},
        })),
    )
}

async fn get_article(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Reply {
    if let Err(reply) = caller(&state, &headers) {
        return reply;
    }
    match state.lock().unwrap().articles.get(&id) {
        Some(record) => (
            StatusCode::OK,
            Json(json!({"success": true, "data": record})),
        ),
        None => (
            StatusCode::NOT_FOUND,
            Json(json!({"success": false, "message": "Article not found"})),
        ),
    }
}

async fn put_article(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> Reply {
    let admin = match caller(&state, &headers) {
        Ok(admin) => admin,
        Err(reply) => return reply,
    };
    let mut guard = state.lock().unwrap();
    if guard.locks.get(&id) != Some(&admin) {
        return (
            StatusCode::OK,
            Json(json!({"success": false, "message": "You do not own the lock"})),
        );
    }
    guard.updates.push((id.clone(), body.clone()));
    (
        StatusCode::OK,
        Json(json!({"success": true, "data": body})),
    )
}

async fn superadmin_login(State(state): State<Shared>, Json(body): Json<Value>) -> Reply {
    login_as(&state, &body, "superadmin")
}

async fn admin_login(State(state): State<Shared>, Json(body): Json<Value>) -> Reply {
    login_as(&state, &body, "admin")
}

fn login_as(state: &Shared, body: &Value, role: &str) -> Reply {
    let email = body["email"].as_str().unwrap_or_default().to_string();
    let password = body["password"].as_str().unwrap_or_default();
    let mut guard = state.lock().unwrap();
    match guard.accounts.get(&email).cloned() {
        Some((expected, account_role)) if expected == password && account_role == role => {
            let admin_id = format!("{role}-{email}");
            let token = format!("token-{admin_id}");
            guard.tokens.insert(token.clone(), admin_id.clone());
            (
                StatusCode::OK,
                Json(json!({
                    "success": true,
                    "token": token,
                    "admin": {"id": admin_id, "name": "Test", "email": email, "role": role},
                })),
            )
        }
        _ => (
            StatusCode::UNAUTHORIZED,
            Json(json!({"success": false, "message": "Invalid credentials"})),
        ),
    }
}
