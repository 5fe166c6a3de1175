#![allow(dead_code)]

use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
    time::Duration,
};

use axum::{
    extract::{Path, State},
    http::{header::COOKIE, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use confessionrooms::{config::Config, router, AppState};
use serde_json::{json, Value};
use tokio::net::TcpListener;

pub struct StubConfession {
    pub id: i64,
    pub content: String,
    pub created_at: String,
    pub token: String,
}

pub struct StubRoom {
    pub name: String,
    pub description: String,
    pub confessions: Vec<StubConfession>,
}

/// In-memory stand-in for the confession-room backend.
#[derive(Default)]
pub struct Backend {
    pub rooms: HashMap<String, StubRoom>,
    /// Every call as (endpoint, request body).
    pub calls: Vec<(String, Value)>,
    pub cookies: Vec<Option<String>>,
    /// Served instead of the next response, once.
    pub fail_next: Option<(StatusCode, String)>,
    /// Served instead of the next response of the named endpoint, once.
    pub fail_on: Option<(String, StatusCode, String)>,
    pub next_code: Option<String>,
    next_id: i64,
}

impl Backend {
    pub fn add_room(&mut self, code: &str, name: &str, description: &str) {
        self.rooms.insert(
            code.to_owned(),
            StubRoom {
                name: name.to_owned(),
                description: description.to_owned(),
                confessions: Vec::new(),
            },
        );
    }

    pub fn add_confession(&mut self, code: &str, content: &str, token: &str) -> i64 {
        self.next_id += 1;
        let id = self.next_id;
        self.rooms
            .get_mut(code)
            .expect("room exists")
            .confessions
            .push(StubConfession {
                id,
                content: content.to_owned(),
                created_at: "2025-01-02 03:04:05".to_owned(),
                token: token.to_owned(),
            });
        id
    }

    pub fn calls_to(&self, endpoint: &str) -> Vec<&Value> {
        self.calls
            .iter()
            .filter(|(name, _)| name == endpoint)
            .map(|(_, body)| body)
            .collect()
    }

    fn handle(&mut self, endpoint: &str, body: &Value) -> Value {
        let field = |key: &str| body[key].as_str().unwrap_or_default().to_owned();

        match endpoint {
            "create-room" => {
                let name = field("name");
                if name.trim().is_empty() {
                    return Value::Null;
                }
                let code = self
                    .next_code
                    .take()
                    .unwrap_or_else(|| format!("room{}", self.rooms.len() + 1));
                self.add_room(&code, name.trim(), field("description").trim());
                json!(code)
            }
            "get-confession-room" => match self.rooms.get(&field("code")) {
                Some(room) => json!({
                    "name": room.name,
                    "description": room.description,
                    "confessions": room.confessions.iter().map(|c| json!({
                        "id": c.id,
                        "content": c.content,
                        "created_at": c.created_at,
                    })).collect::<Vec<_>>(),
                }),
                None => Value::Null,
            },
            "submit-confession" => {
                let code = field("code");
                let content = field("content");
                if content.trim().is_empty() || !self.rooms.contains_key(&code) {
                    return Value::Null;
                }
                let token = format!("tok_{}", self.next_id + 1);
                let id = self.add_confession(&code, content.trim(), &token);
                json!({ "id": id, "token": token })
            }
            "revoke-confession" => {
                let token = field("token");
                let mut removed = false;
                for room in self.rooms.values_mut() {
                    let before = room.confessions.len();
                    room.confessions.retain(|c| c.token != token);
                    removed |= room.confessions.len() != before;
                }
                json!(removed)
            }
            _ => Value::Null,
        }
    }
}

pub type SharedBackend = Arc<Mutex<Backend>>;

async fn endpoint(
    State(backend): State<SharedBackend>,
    Path(name): Path<String>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    let mut backend = backend.lock().unwrap();
    backend.calls.push((name.clone(), body.clone()));
    backend.cookies.push(
        headers
            .get(COOKIE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned),
    );

    if let Some((status, text)) = backend.fail_next.take() {
        return (status, text).into_response();
    }
    if backend.fail_on.as_ref().is_some_and(|(target, ..)| *target == name) {
        if let Some((_, status, text)) = backend.fail_on.take() {
            return (status, text).into_response();
        }
    }
    if !["create-room", "get-confession-room", "submit-confession", "revoke-confession"]
        .contains(&name.as_str())
    {
        return (StatusCode::NOT_FOUND, format!("no method {name}")).into_response();
    }

    Json(backend.handle(&name, &body)).into_response()
}

async fn serve(app: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

/// Starts the stub backend and returns it with its api prefix.
pub async fn spawn_backend() -> (SharedBackend, String) {
    let backend = SharedBackend::default();
    let app = Router::new()
        .route("/confessionrooms/api/{name}", post(endpoint))
        .with_state(backend.clone());
    let origin = serve(app).await;
    (backend, format!("{origin}/confessionrooms/api/"))
}

pub struct TestApp {
    pub backend: SharedBackend,
    /// Frontend origin plus base path, without a trailing slash.
    pub url: String,
    pub http: reqwest::Client,
}

impl TestApp {
    pub async fn get(&self, path: &str) -> reqwest::Response {
        self.http.get(format!("{}{path}", self.url)).send().await.unwrap()
    }

    pub async fn post_form(&self, path: &str, form: &[(&str, &str)]) -> reqwest::Response {
        self.http
            .post(format!("{}{path}", self.url))
            .form(form)
            .send()
            .await
            .unwrap()
    }

    pub fn calls_to(&self, endpoint: &str) -> usize {
        self.backend.lock().unwrap().calls_to(endpoint).len()
    }
}

pub async fn spawn_app() -> TestApp {
    spawn_app_with(Duration::from_secs(60)).await
}

pub async fn spawn_app_with(cache_stale: Duration) -> TestApp {
    let (backend, api_prefix) = spawn_backend().await;
    spawn_frontend(backend, api_prefix, cache_stale).await
}

/// A frontend talking to `api_prefix` instead of the stub. The returned
/// backend never sees a call.
pub async fn spawn_app_against(api_prefix: &str) -> TestApp {
    spawn_frontend(SharedBackend::default(), api_prefix.to_owned(), Duration::from_secs(60)).await
}

async fn spawn_frontend(backend: SharedBackend, api_prefix: String, cache_stale: Duration) -> TestApp {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let url = format!("http://{addr}/confessionrooms");

    let config = Config {
        bind_addr: addr,
        api_prefix,
        public_url: format!("{url}/"),
        cache_stale,
        ..Config::default()
    };
    let app = router(AppState::new(config).unwrap());
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    let http = reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .unwrap();

    TestApp { backend, url, http }
}
