//! Scripted transport for unit tests.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use serde_json::Value;

use crate::auth::{AuthSession, MemoryTokenStore, RouteHistory, TokenStore};
use crate::client::ApiClient;
use crate::error::ApiError;
use crate::http::{HttpRequest, HttpResponse, Transport};

pub const BASE_URL: &str = "http://api.test";

/// Replays queued responses in order and records every request it sees.
/// An empty queue answers with a transport error.
#[derive(Default)]
pub struct MockTransport {
    responses: Mutex<VecDeque<Result<HttpResponse, ApiError>>>,
    requests: Mutex<Vec<HttpRequest>>,
}

impl MockTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn push(&self, response: HttpResponse) {
        self.responses.lock().unwrap().push_back(Ok(response));
    }

    pub fn push_json(&self, status: u16, body: Value) {
        self.push(response(status, &body.to_string()));
    }

    pub fn push_err(&self, err: ApiError) {
        self.responses.lock().unwrap().push_back(Err(err));
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

impl Transport for MockTransport {
    fn execute(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        self.requests.lock().unwrap().push(request);
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(ApiError::Transport("no scripted response".to_string())))
    }
}

pub fn response(status: u16, body: &str) -> HttpResponse {
    HttpResponse {
        status,
        status_text: String::new(),
        headers: Vec::new(),
        body: body.to_string(),
    }
}

/// Client signed in with `test-token`, redirecting to `/login` on 401.
pub fn scripted_client(
    transport: Arc<MockTransport>,
) -> (ApiClient, Arc<RouteHistory>, Arc<MemoryTokenStore>) {
    let tokens = Arc::new(MemoryTokenStore::new());
    tokens.store("test-token");
    let history = Arc::new(RouteHistory::new());
    let session = Arc::new(AuthSession::new(tokens.clone(), history.clone(), "/login"));
    (ApiClient::new(BASE_URL, session, transport), history, tokens)
}

/// Wire-format appointment with the fields every test needs.
pub fn appointment_json(id: &str, status: &str) -> Value {
    serde_json::json!({
        "id": id,
        "title": format!("Session {id}"),
        "scheduledDate": "2024-05-01T10:00:00Z",
        "durationMinutes": 60,
        "status": status,
        "organizerUserId": "u1",
        "participantUserId": "u2"
    })
}

pub fn skill_json(id: &str, name: &str, is_offered: bool) -> Value {
    serde_json::json!({
        "id": id,
        "userId": "u1",
        "name": name,
        "isOffered": is_offered,
        "category": { "id": "c1", "name": "Programming" },
        "tags": ["backend"]
    })
}

pub fn match_json(id: &str, status: &str) -> Value {
    serde_json::json!({
        "id": id,
        "requesterUserId": "u2",
        "responderUserId": "u1",
        "skillId": "s1",
        "skillName": "Rust",
        "status": status,
        "preferredDays": ["Monday"],
        "preferredTimes": ["18:00-20:00"]
    })
}

/// Paged envelope around `items` (page 1 of `total_pages`).
pub fn paged(items: Vec<Value>, total_pages: u32) -> Value {
    let count = items.len();
    serde_json::json!({
        "success": true,
        "data": items,
        "pageNumber": 1,
        "pageSize": 10,
        "totalRecords": count,
        "totalPages": total_pages,
        "hasNextPage": total_pages > 1,
        "hasPreviousPage": false
    })
}

pub fn envelope(data: Value) -> Value {
    serde_json::json!({ "success": true, "data": data, "message": null })
}
