#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post, put};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::{json, Value};

use taskdesk::api::HttpClient;
use taskdesk::config::AppConfig;
use taskdesk::session::SessionStore;

pub const PASSWORD: &str = "secret";

/// In-memory stand-in for the dashboard REST API.
#[derive(Debug, Default)]
pub struct MockState {
    pub tasks: Vec<Value>,
    pub users: Vec<Value>,
    pub page_size: usize,
    pub next_id: u64,
    /// Authorization headers seen on authenticated routes, in order.
    pub auth_headers: Vec<Option<String>>,
    pub logouts: usize,
    /// When set, every task mutation answers with this status.
    pub fail_task_mutations: Option<u16>,
}

pub type Shared = Arc<Mutex<MockState>>;

pub struct MockServer {
    pub base_url: String,
    pub state: Shared,
}

impl MockServer {
    pub async fn start() -> Result<Self> {
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let state: Shared = Arc::new(Mutex::new(MockState {
            page_size: 10,
            next_id: 1,
            ..MockState::default()
        }));

        let listener = tokio::net::TcpListener::bind(("127.0.0.1", port))
            .await
            .context("failed to bind mock server")?;
        let app = router(state.clone());
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Ok(Self {
            base_url: format!("http://127.0.0.1:{}/api", port),
            state,
        })
    }

    pub fn with_state<R>(&self, f: impl FnOnce(&mut MockState) -> R) -> R {
        let mut state = self.state.lock().unwrap();
        f(&mut state)
    }

    pub fn seed_tasks(&self, count: usize) {
        self.with_state(|state| {
            for n in 1..=count {
                let id = state.next_id;
                state.next_id += 1;
                let status = ["todo", "on progress", "done"][n % 3];
                state.tasks.push(json!({
                    "id": id,
                    "title": format!("Task {}", n),
                    "description": format!("Details for task {}", n),
                    "status": status,
                    "contributors": "[\"alice\",\"bob\"]",
                    "startDate": "2024-05-01T00:00:00.000Z",
                    "endDate": "2024-05-10T00:00:00.000Z",
                    "dueDate": "01/05/2024 - 10/05/2024"
                }));
            }
        });
    }

    pub fn seed_users(&self, count: usize) {
        self.with_state(|state| {
            for n in 1..=count {
                let id = state.next_id;
                state.next_id += 1;
                state.users.push(json!({
                    "id": id,
                    "email": format!("user{}@example.com", n),
                    "username": format!("user{}", n),
                    "roleId": 2
                }));
            }
        });
    }

    pub fn config(&self) -> AppConfig {
        let mut config = AppConfig::instant();
        config.api.base_url = self.base_url.clone();
        config.api.request_timeout_secs = Some(5);
        config
    }

    pub fn client(&self, store: &SessionStore) -> Result<Arc<HttpClient>> {
        Ok(Arc::new(HttpClient::new(&self.config().api, store.clone())?))
    }
}

fn router(state: Shared) -> Router {
    Router::new()
        .route("/api/auth/v1/login", post(login))
        .route("/api/auth/v1/logout", post(logout))
        .route("/api/task/", get(list_tasks))
        .route("/api/task", post(create_task))
        .route("/api/task/search", get(search_tasks))
        .route("/api/task/:id", put(update_task).delete(delete_task))
        .route("/api/user/", get(list_users))
        .route("/api/user/create", post(create_user))
        .route("/api/user/search", get(search_users))
        .route("/api/user/username", get(collaborators))
        .route("/api/user/:id", put(update_user).delete(delete_user))
        .route("/api/role", get(roles))
        .with_state(state)
}

#[derive(Deserialize)]
struct PageQuery {
    page: Option<usize>,
    keyword: Option<String>,
}

fn check_auth(state: &Shared, headers: &HeaderMap) -> Result<(), Response> {
    let header = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let authorized = header.as_deref().map_or(false, |h| h.starts_with("Bearer token-"));
    state.lock().unwrap().auth_headers.push(header);

    if authorized {
        Ok(())
    } else {
        Err((StatusCode::UNAUTHORIZED, Json(json!({ "message": "Unauthorized" }))).into_response())
    }
}

fn page_of(rows: Vec<Value>, page: usize, size: usize) -> Value {
    let total_pages = rows.len().div_ceil(size).max(1);
    let start = page.saturating_sub(1) * size;
    let data: Vec<Value> = rows.into_iter().skip(start).take(size).collect();
    json!({ "data": data, "totalPages": total_pages })
}

fn matches(row: &Value, fields: &[&str], keyword: &str) -> bool {
    let keyword = keyword.to_lowercase();
    fields.iter().any(|field| {
        row.get(field)
            .and_then(Value::as_str)
            .map_or(false, |v| v.to_lowercase().contains(&keyword))
    })
}

async fn login(Json(body): Json<Value>) -> Response {
    let email = body.get("email").and_then(Value::as_str).unwrap_or_default();
    let password = body.get("password").and_then(Value::as_str).unwrap_or_default();
    if password != PASSWORD {
        return (StatusCode::UNAUTHORIZED, Json(json!({ "message": "Invalid email or password" }))).into_response();
    }

    let local = email.split('@').next().unwrap_or_default();
    let role = if local.starts_with("pm") {
        json!({ "id": 1, "name": "pm" })
    } else if local.starts_with("norole") {
        Value::Null
    } else {
        json!({ "id": 2, "name": "member" })
    };

    Json(json!({
        "status": 200,
        "data": {
            "token": format!("token-{}", local),
            "user": { "email": email, "username": local, "role": role }
        }
    }))
    .into_response()
}

async fn logout(State(state): State<Shared>, headers: HeaderMap) -> Response {
    if let Err(rejection) = check_auth(&state, &headers) {
        return rejection;
    }
    state.lock().unwrap().logouts += 1;
    Json(json!({ "status": 200 })).into_response()
}

async fn list_tasks(State(state): State<Shared>, headers: HeaderMap, Query(q): Query<PageQuery>) -> Response {
    if let Err(rejection) = check_auth(&state, &headers) {
        return rejection;
    }
    let s = state.lock().unwrap();
    Json(page_of(s.tasks.clone(), q.page.unwrap_or(1), s.page_size)).into_response()
}

async fn search_tasks(State(state): State<Shared>, headers: HeaderMap, Query(q): Query<PageQuery>) -> Response {
    if let Err(rejection) = check_auth(&state, &headers) {
        return rejection;
    }
    let s = state.lock().unwrap();
    let keyword = q.keyword.unwrap_or_default();
    let rows = s
        .tasks
        .iter()
        .filter(|row| matches(row, &["title", "status"], &keyword))
        .cloned()
        .collect();
    Json(page_of(rows, q.page.unwrap_or(1), s.page_size)).into_response()
}

/// Stores contributors the way the real server does: as a JSON-encoded string.
fn stored_task(id: u64, mut body: Value) -> Value {
    let contributors = body.get("contributors").cloned().unwrap_or_else(|| json!([]));
    body["contributors"] = Value::String(contributors.to_string());
    body["id"] = json!(id);
    body
}

async fn create_task(State(state): State<Shared>, headers: HeaderMap, Json(body): Json<Value>) -> Response {
    if let Err(rejection) = check_auth(&state, &headers) {
        return rejection;
    }
    let mut s = state.lock().unwrap();
    if let Some(code) = s.fail_task_mutations {
        return status_only(code);
    }
    let id = s.next_id;
    s.next_id += 1;
    s.tasks.push(stored_task(id, body));
    (StatusCode::CREATED, Json(json!({ "status": 201 }))).into_response()
}

async fn update_task(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<u64>,
    Json(body): Json<Value>,
) -> Response {
    if let Err(rejection) = check_auth(&state, &headers) {
        return rejection;
    }
    let mut s = state.lock().unwrap();
    if let Some(code) = s.fail_task_mutations {
        return status_only(code);
    }
    match s.tasks.iter_mut().find(|row| row["id"] == json!(id)) {
        Some(row) => {
            *row = stored_task(id, body);
            Json(json!({ "status": 200 })).into_response()
        }
        None => status_only(404),
    }
}

async fn delete_task(State(state): State<Shared>, headers: HeaderMap, Path(id): Path<u64>) -> Response {
    if let Err(rejection) = check_auth(&state, &headers) {
        return rejection;
    }
    let mut s = state.lock().unwrap();
    if let Some(code) = s.fail_task_mutations {
        return status_only(code);
    }
    let before = s.tasks.len();
    s.tasks.retain(|row| row["id"] != json!(id));
    if s.tasks.len() == before {
        status_only(404)
    } else {
        Json(json!({ "status": 200 })).into_response()
    }
}

async fn list_users(State(state): State<Shared>, headers: HeaderMap, Query(q): Query<PageQuery>) -> Response {
    if let Err(rejection) = check_auth(&state, &headers) {
        return rejection;
    }
    let s = state.lock().unwrap();
    Json(page_of(s.users.clone(), q.page.unwrap_or(1), s.page_size)).into_response()
}

async fn search_users(State(state): State<Shared>, headers: HeaderMap, Query(q): Query<PageQuery>) -> Response {
    if let Err(rejection) = check_auth(&state, &headers) {
        return rejection;
    }
    let s = state.lock().unwrap();
    let keyword = q.keyword.unwrap_or_default();
    let rows = s
        .users
        .iter()
        .filter(|row| matches(row, &["email", "username"], &keyword))
        .cloned()
        .collect();
    Json(page_of(rows, q.page.unwrap_or(1), s.page_size)).into_response()
}

async fn create_user(State(state): State<Shared>, headers: HeaderMap, Json(mut body): Json<Value>) -> Response {
    if let Err(rejection) = check_auth(&state, &headers) {
        return rejection;
    }
    let mut s = state.lock().unwrap();
    let id = s.next_id;
    s.next_id += 1;
    body["id"] = json!(id);
    if let Some(object) = body.as_object_mut() {
        object.remove("password");
    }
    s.users.push(body);
    (StatusCode::CREATED, Json(json!({ "status": 201 }))).into_response()
}

async fn update_user(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<u64>,
    Json(mut body): Json<Value>,
) -> Response {
    if let Err(rejection) = check_auth(&state, &headers) {
        return rejection;
    }
    let mut s = state.lock().unwrap();
    match s.users.iter_mut().find(|row| row["id"] == json!(id)) {
        Some(row) => {
            body["id"] = json!(id);
            if let Some(object) = body.as_object_mut() {
                object.remove("password");
            }
            *row = body;
            Json(json!({ "status": 200 })).into_response()
        }
        None => status_only(404),
    }
}

async fn delete_user(State(state): State<Shared>, headers: HeaderMap, Path(id): Path<u64>) -> Response {
    if let Err(rejection) = check_auth(&state, &headers) {
        return rejection;
    }
    let mut s = state.lock().unwrap();
    let before = s.users.len();
    s.users.retain(|row| row["id"] != json!(id));
    if s.users.len() == before {
        status_only(404)
    } else {
        Json(json!({ "status": 200 })).into_response()
    }
}

async fn collaborators(State(state): State<Shared>, headers: HeaderMap) -> Response {
    if let Err(rejection) = check_auth(&state, &headers) {
        return rejection;
    }
    let s = state.lock().unwrap();
    let data: Vec<Value> = s
        .users
        .iter()
        .map(|row| json!({ "username": row["username"], "roleId": row["roleId"] }))
        .collect();
    Json(json!({ "status": 200, "data": data })).into_response()
}

async fn roles(State(state): State<Shared>, headers: HeaderMap) -> Response {
    if let Err(rejection) = check_auth(&state, &headers) {
        return rejection;
    }
    Json(json!({
        "status": 200,
        "data": [{ "id": 1, "name": "pm" }, { "id": 2, "name": "member" }]
    }))
    .into_response()
}

fn status_only(code: u16) -> Response {
    let status = StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, Json(json!({ "status": code }))).into_response()
}
