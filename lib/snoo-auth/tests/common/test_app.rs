#![allow(dead_code, missing_docs, clippy::expect_used)]
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use anyhow::Context;
use axum::extract::{Form, State};
use axum::http::header::{AUTHORIZATION, USER_AGENT};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use base64::Engine;
use serde_json::json;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use snoo_auth::{Credentials, DEFAULT_IDENTITY_PATH, DEFAULT_TOKEN_PATH, TokenManager};

pub const USERNAME: &str = "spez";
pub const PASSWORD: &str = "hunter2-correct-horse-battery";
pub const CLIENT_ID: &str = "script-client-id";
pub const CLIENT_SECRET: &str = "script-client-secret";
pub const USER_AGENT_VALUE: &str = "linux:snoo-auth-tests:v0.1.0 (by /u/spez)";

/// Token handed out by the fake authorization server.
#[derive(Debug, Clone)]
pub struct Grant {
    pub access_token: String,
    pub scope: String,
    pub expires_in: i64,
}

impl Grant {
    pub fn new(access_token: &str, scope: &str, expires_in: i64) -> Self {
        Self {
            access_token: access_token.to_string(),
            scope: scope.to_string(),
            expires_in,
        }
    }
}

impl Default for Grant {
    fn default() -> Self {
        Self::new("abc", "identity,read", 3600)
    }
}

pub fn script_credentials() -> Credentials {
    Credentials::script(USERNAME, PASSWORD, CLIENT_ID, CLIENT_SECRET)
}

#[derive(Debug, Clone)]
struct ServerState {
    grants: Arc<Vec<Grant>>,
    token_requests: Arc<AtomicUsize>,
    identity_requests: Arc<AtomicUsize>,
    issued: Arc<AtomicUsize>,
    current_token: Arc<Mutex<Option<String>>>,
}

/// A fake reddit: token endpoint on the auth host, "me" on the API host.
///
/// Both hosts are served by the same local server, the listener is bound
/// before the server task is spawned so the first request never races it.
#[derive(Debug)]
pub struct TestApp {
    local_addr: SocketAddr,
    state: ServerState,
    handle: JoinHandle<()>,
}

impl TestApp {
    pub async fn start(grant: Grant) -> anyhow::Result<Self> {
        Self::start_with([grant]).await
    }

    /// Starts a server that hands out the grants in order, the last one repeating.
    pub async fn start_with(grants: impl IntoIterator<Item = Grant>) -> anyhow::Result<Self> {
        let grants = grants.into_iter().collect::<Vec<_>>();
        anyhow::ensure!(!grants.is_empty(), "at least one grant is required");

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .context("bind test listener")?;
        let local_addr = listener.local_addr().context("local address")?;

        let state = ServerState {
            grants: Arc::new(grants),
            token_requests: Arc::default(),
            identity_requests: Arc::default(),
            issued: Arc::default(),
            current_token: Arc::default(),
        };
        let router = Router::new()
            .route(DEFAULT_TOKEN_PATH, post(access_token))
            .route(DEFAULT_IDENTITY_PATH, get(me))
            .with_state(state.clone());

        info!(%local_addr, "launching fake reddit");
        let handle = tokio::spawn(async move {
            axum::serve(listener, router).await.expect("server running");
        });

        Ok(Self {
            local_addr,
            state,
            handle,
        })
    }

    pub fn base_url(&self) -> String {
        format!("http://{}", self.local_addr)
    }

    /// A manager pointing both hosts to this server.
    pub fn manager(&self) -> anyhow::Result<TokenManager> {
        let manager = TokenManager::builder()
            .with_user_agent(USER_AGENT_VALUE)
            .with_auth_base_url(self.base_url())?
            .with_api_base_url(self.base_url())?
            .build_default()?;
        Ok(manager)
    }

    pub fn token_requests(&self) -> usize {
        self.state.token_requests.load(Ordering::SeqCst)
    }

    pub fn identity_requests(&self) -> usize {
        self.state.identity_requests.load(Ordering::SeqCst)
    }
}

impl Drop for TestApp {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

fn header<'a>(headers: &'a HeaderMap, name: &axum::http::HeaderName) -> Option<&'a str> {
    headers.get(name).and_then(|value| value.to_str().ok())
}

async fn access_token(
    State(state): State<ServerState>,
    headers: HeaderMap,
    Form(form): Form<HashMap<String, String>>,
) -> Response {
    state.token_requests.fetch_add(1, Ordering::SeqCst);

    let credentials = format!("{CLIENT_ID}:{CLIENT_SECRET}");
    let expected = format!(
        "Basic {}",
        base64::engine::general_purpose::STANDARD.encode(credentials)
    );
    if header(&headers, &AUTHORIZATION) != Some(expected.as_str()) {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "message": "Unauthorized", "error": 401 })),
        )
            .into_response();
    }
    if header(&headers, &USER_AGENT) != Some(USER_AGENT_VALUE) {
        return (
            StatusCode::TOO_MANY_REQUESTS,
            Json(json!({ "message": "Too Many Requests", "error": 429 })),
        )
            .into_response();
    }

    let field = |name: &str| form.get(name).map(String::as_str);
    if field("grant_type") != Some("password") {
        return Json(json!({ "error": "unsupported_grant_type" })).into_response();
    }
    if field("username") != Some(USERNAME) || field("password") != Some(PASSWORD) {
        // reddit answers 200 with an error object for wrong user credentials
        return Json(json!({ "error": "invalid_grant" })).into_response();
    }

    let index = state.issued.fetch_add(1, Ordering::SeqCst);
    let Some(grant) = state.grants.get(index).or(state.grants.last()) else {
        return StatusCode::INTERNAL_SERVER_ERROR.into_response();
    };
    debug!(scope = %grant.scope, expires_in = grant.expires_in, "issuing token");
    *state.current_token.lock().expect("not poisoned") = Some(grant.access_token.clone());

    Json(json!({
        "access_token": grant.access_token,
        "token_type": "bearer",
        "expires_in": grant.expires_in,
        "scope": grant.scope,
    }))
    .into_response()
}

async fn me(State(state): State<ServerState>, headers: HeaderMap) -> Response {
    state.identity_requests.fetch_add(1, Ordering::SeqCst);

    let expected = state
        .current_token
        .lock()
        .expect("not poisoned")
        .as_ref()
        .map(|token| format!("bearer {token}"));
    match (header(&headers, &AUTHORIZATION), expected) {
        (Some(actual), Some(expected)) if actual == expected => Json(json!({
            "name": USERNAME,
            "id": "1w72",
            "link_karma": 42,
            "comment_karma": 1337,
            "is_gold": false,
        }))
        .into_response(),
        _ => (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "message": "Unauthorized", "error": 401 })),
        )
            .into_response(),
    }
}
