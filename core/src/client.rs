//! Authenticated request builder and response interpreter for the SkillSwap
//! REST API.
//!
//! # Design
//! `ApiClient` holds the base URL, the shared `AuthSession`, and the
//! `Transport`. Services call `build`/`build_json` to describe a request and
//! one of the `fetch_*` methods to run it. All status handling lives here:
//! 401 goes through the session (token cleared, single redirect), every other
//! non-2xx becomes an `ApiError` with a message pulled from the body.

use std::sync::Arc;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::auth::{AuthSession, FileTokenStore, MemoryTokenStore, Navigator, TokenStore};
use crate::config::ClientConfig;
use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse, QueryString, Transport};
use crate::transport::UreqTransport;
use crate::types::PagedResponse;

const JSON: &str = "application/json";

#[derive(Clone)]
pub struct ApiClient {
    base_url: String,
    session: Arc<AuthSession>,
    transport: Arc<dyn Transport>,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url)
            .field("session", &self.session)
            .finish_non_exhaustive()
    }
}

impl ApiClient {
    pub fn new(base_url: &str, session: Arc<AuthSession>, transport: Arc<dyn Transport>) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            session,
            transport,
        }
    }

    /// Wire a client from configuration: file-backed token store when
    /// `auth.token_file` is set, ureq transport with the configured timeout.
    pub fn from_config(config: &ClientConfig, navigator: Arc<dyn Navigator>) -> Self {
        let tokens: Arc<dyn TokenStore> = match &config.auth.token_file {
            Some(path) => Arc::new(FileTokenStore::new(path.clone())),
            None => Arc::new(MemoryTokenStore::new()),
        };
        let session = Arc::new(AuthSession::new(tokens, navigator, &config.auth.login_route));
        let transport = Arc::new(UreqTransport::new(Duration::from_secs(config.api.timeout_secs)));
        Self::new(&config.api.base_url, session, transport)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn session(&self) -> &Arc<AuthSession> {
        &self.session
    }

    fn headers(&self) -> Vec<(String, String)> {
        let mut headers = vec![("accept".to_string(), JSON.to_string())];
        if let Some(token) = self.session.token() {
            headers.push(("authorization".to_string(), format!("Bearer {token}")));
        }
        headers
    }

    /// A body-less request to `path` (which must start with `/`).
    pub fn build(&self, method: HttpMethod, path: &str, query: QueryString) -> HttpRequest {
        HttpRequest {
            method,
            path: format!("{}{}{}", self.base_url, path, query.render()),
            headers: self.headers(),
            body: None,
        }
    }

    pub fn build_json<B: Serialize + ?Sized>(
        &self,
        method: HttpMethod,
        path: &str,
        body: &B,
    ) -> Result<HttpRequest, ApiError> {
        let body = serde_json::to_string(body).map_err(|e| ApiError::Serialization(e.to_string()))?;
        let mut request = self.build(method, path, QueryString::new());
        request
            .headers
            .push(("content-type".to_string(), JSON.to_string()));
        request.body = Some(body);
        Ok(request)
    }

    /// Execute `request` and map failure statuses to errors.
    pub fn send(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        let method = request.method.as_str();
        let path = request.path.clone();
        tracing::debug!(method, %path, "sending request");

        let response = self.transport.execute(request).inspect_err(|error| {
            tracing::warn!(method, %path, %error, "transport failure");
        })?;

        if response.status == 401 {
            self.session.handle_unauthorized();
            return Err(ApiError::Unauthorized);
        }
        check_status(&response).inspect_err(|error| {
            tracing::debug!(method, %path, status = response.status, %error, "request failed");
        })?;
        Ok(response)
    }

    pub fn fetch_data<T: DeserializeOwned>(&self, request: HttpRequest) -> Result<T, ApiError> {
        parse_data(&self.send(request)?)
    }

    pub fn fetch_page<T: DeserializeOwned>(
        &self,
        request: HttpRequest,
    ) -> Result<PagedResponse<T>, ApiError> {
        parse_page(&self.send(request)?)
    }

    pub fn fetch_ack(&self, request: HttpRequest) -> Result<(), ApiError> {
        parse_ack(&self.send(request)?)
    }
}

/// Map non-success status codes to the appropriate `ApiError` variant.
pub fn check_status(response: &HttpResponse) -> Result<(), ApiError> {
    if response.is_success() {
        return Ok(());
    }
    let message = error_message(response);
    match response.status {
        401 => Err(ApiError::Unauthorized),
        404 => Err(ApiError::NotFound(message)),
        status => Err(ApiError::Http { status, message }),
    }
}

/// Best-effort human message for a failed response.
///
/// Tries the JSON body's `message`, `title`, `error`, then `errors` (an array
/// of strings or a field → messages map), then a plain-text body, then the
/// status text.
pub fn error_message(response: &HttpResponse) -> String {
    let body = response.body.trim();
    match serde_json::from_str::<Value>(body) {
        Ok(Value::Object(map)) => {
            if let Some(message) = message_from_object(&map) {
                return message;
            }
        }
        Ok(Value::String(text)) if !text.trim().is_empty() => return text.trim().to_string(),
        Ok(_) => {}
        Err(_) if !body.is_empty() && !body.starts_with('<') => return body.to_string(),
        Err(_) => {}
    }
    let status_text = response.status_text.trim();
    if !status_text.is_empty() {
        return status_text.to_string();
    }
    format!("Request failed with status code {}", response.status)
}

fn message_from_object(map: &Map<String, Value>) -> Option<String> {
    for key in ["message", "title", "error"] {
        if let Some(text) = map.get(key).and_then(Value::as_str) {
            if !text.trim().is_empty() {
                return Some(text.trim().to_string());
            }
        }
    }
    map.get("errors").and_then(flatten_errors)
}

fn flatten_errors(errors: &Value) -> Option<String> {
    fn strings(value: &Value) -> Vec<String> {
        match value {
            Value::String(s) => vec![s.clone()],
            Value::Array(items) => items.iter().flat_map(strings).collect(),
            _ => Vec::new(),
        }
    }
    let messages: Vec<String> = match errors {
        Value::Object(fields) => fields.values().flat_map(strings).collect(),
        other => strings(other),
    };
    (!messages.is_empty()).then(|| messages.join("; "))
}

fn rejection(map: &Map<String, Value>) -> Option<ApiError> {
    if map.get("success").and_then(Value::as_bool) != Some(false) {
        return None;
    }
    let message = message_from_object(map).unwrap_or_else(|| "Request was not successful".to_string());
    Some(ApiError::Rejected(message))
}

fn parse_json(response: &HttpResponse) -> Result<Value, ApiError> {
    if response.body.trim().is_empty() {
        return Err(ApiError::UnexpectedShape("empty response body".to_string()));
    }
    serde_json::from_str(&response.body).map_err(|e| ApiError::Deserialization(e.to_string()))
}

/// Unwrap `{ success, data, message }`, or accept a bare payload.
pub fn parse_data<T: DeserializeOwned>(response: &HttpResponse) -> Result<T, ApiError> {
    let value = parse_json(response)?;
    let payload = match value {
        Value::Object(mut map) => {
            if let Some(err) = rejection(&map) {
                return Err(err);
            }
            if map.contains_key("data") {
                match map.remove("data") {
                    Some(Value::Null) | None => {
                        return Err(ApiError::UnexpectedShape("envelope has no data".to_string()))
                    }
                    Some(data) => data,
                }
            } else {
                Value::Object(map)
            }
        }
        other => other,
    };
    serde_json::from_value(payload).map_err(|e| ApiError::Deserialization(e.to_string()))
}

/// Parse the paged envelope. `data` must be an array and the pagination
/// counters must be present.
pub fn parse_page<T: DeserializeOwned>(response: &HttpResponse) -> Result<PagedResponse<T>, ApiError> {
    let value = parse_json(response)?;
    if let Value::Object(map) = &value {
        if let Some(err) = rejection(map) {
            return Err(err);
        }
        if !map.get("data").is_some_and(Value::is_array) {
            return Err(ApiError::UnexpectedShape(
                "paged response without a data array".to_string(),
            ));
        }
    } else {
        return Err(ApiError::UnexpectedShape("paged response is not an object".to_string()));
    }
    serde_json::from_value(value).map_err(|e| ApiError::UnexpectedShape(e.to_string()))
}

/// Accept any 2xx whose envelope (if any) does not say `success: false`.
pub fn parse_ack(response: &HttpResponse) -> Result<(), ApiError> {
    if response.body.trim().is_empty() {
        return Ok(());
    }
    match serde_json::from_str::<Value>(&response.body) {
        Ok(Value::Object(map)) => rejection(&map).map_or(Ok(()), Err),
        _ => Ok(()),
    }
}
