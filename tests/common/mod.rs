//! In-process HTTP stand-ins for the status API and the Telegram Bot API.

#![allow(dead_code)]

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::extract::{Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};

/// Bind `router` on an ephemeral loopback port and serve it in the background.
pub async fn spawn(router: Router) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    addr
}

/// A canned status API reply.
#[derive(Clone)]
pub enum Reply {
    Json(Value),
    Status(u16),
    Raw(&'static str),
}

#[derive(Clone, Debug)]
pub struct SeenRequest {
    pub authorization: Option<String>,
    pub from_date: Option<String>,
}

#[derive(Clone)]
pub struct StatusApi {
    replies: Arc<Mutex<Vec<Reply>>>,
    pub seen: Arc<Mutex<Vec<SeenRequest>>>,
}

impl StatusApi {
    /// Replies are served in order; the last one repeats.
    pub fn new(replies: Vec<Reply>) -> Self {
        Self {
            replies: Arc::new(Mutex::new(replies)),
            seen: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn requests(&self) -> Vec<SeenRequest> {
        self.seen.lock().unwrap().clone()
    }

    /// Serve at `http://<addr>/api/user_api/homework_statuses/`.
    pub async fn start(&self) -> String {
        let router = Router::new()
            .route("/api/user_api/homework_statuses/", get(status_handler))
            .with_state(self.clone());
        let addr = spawn(router).await;
        format!("http://{}/api/user_api/homework_statuses/", addr)
    }
}

async fn status_handler(
    State(api): State<StatusApi>,
    headers: HeaderMap,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    api.seen.lock().unwrap().push(SeenRequest {
        authorization: headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string),
        from_date: params.get("from_date").cloned(),
    });

    let reply = {
        let mut replies = api.replies.lock().unwrap();
        if replies.len() > 1 {
            replies.remove(0)
        } else {
            replies[0].clone()
        }
    };

    match reply {
        Reply::Json(body) => Json(body).into_response(),
        Reply::Status(code) => StatusCode::from_u16(code).unwrap().into_response(),
        Reply::Raw(text) => (StatusCode::OK, text).into_response(),
    }
}

#[derive(Clone)]
pub struct BotApi {
    pub messages: Arc<Mutex<Vec<Value>>>,
    accept: bool,
}

impl BotApi {
    pub fn accepting() -> Self {
        Self {
            messages: Arc::new(Mutex::new(Vec::new())),
            accept: true,
        }
    }

    pub fn rejecting() -> Self {
        Self {
            messages: Arc::new(Mutex::new(Vec::new())),
            accept: false,
        }
    }

    pub fn texts(&self) -> Vec<String> {
        self.messages
            .lock()
            .unwrap()
            .iter()
            .filter_map(|m| m["text"].as_str().map(str::to_string))
            .collect()
    }

    /// Serve `sendMessage` for bot token `TOKEN`; returns the API base URL.
    pub async fn start(&self) -> String {
        let router = Router::new()
            .route("/botTOKEN/sendMessage", post(send_message_handler))
            .with_state(self.clone());
        let addr = spawn(router).await;
        format!("http://{}", addr)
    }
}

async fn send_message_handler(State(api): State<BotApi>, Json(body): Json<Value>) -> Response {
    api.messages.lock().unwrap().push(body);
    if api.accept {
        Json(json!({"ok": true, "result": {"message_id": 1}})).into_response()
    } else {
        (
            StatusCode::BAD_REQUEST,
            Json(json!({"ok": false, "error_code": 400, "description": "Bad Request: chat not found"})),
        )
            .into_response()
    }
}
