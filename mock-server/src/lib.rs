//! In-memory stand-in for the SkillSwap backend.
//!
//! Speaks the same wire contract as the real API: camelCase JSON, the
//! `{ success, data, message }` envelope, paged list envelopes and bearer
//! authentication. State lives in one `RwLock` and is lost on restart.

mod appointments;
mod matches;
mod skills;

use std::{collections::HashMap, sync::Arc};

use axum::{
    extract::{Request, State},
    http::{header, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tokio::{net::TcpListener, sync::RwLock};

pub use appointments::{Appointment, AppointmentStatus};
pub use matches::{MatchRecord, MatchStatus};
pub use skills::{Category, ProficiencyLevel, Skill};

/// Token handed to the seeded organizer, `user-1`.
pub const ORGANIZER_TOKEN: &str = "organizer-token";
/// Token handed to the seeded participant, `user-2`.
pub const PARTICIPANT_TOKEN: &str = "participant-token";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Default)]
pub struct Db {
    pub users: HashMap<String, User>,
    pub tokens: HashMap<String, String>,
    pub appointments: Vec<Appointment>,
    pub skills: Vec<Skill>,
    pub favorites: HashMap<String, Vec<String>>,
    pub categories: Vec<Category>,
    pub proficiency_levels: Vec<ProficiencyLevel>,
    pub matches: Vec<MatchRecord>,
}

impl Db {
    /// Two users with known tokens plus a small catalog.
    pub fn seeded() -> Self {
        let mut db = Db::default();
        for (id, name, token) in [
            ("user-1", "Alice", ORGANIZER_TOKEN),
            ("user-2", "Bob", PARTICIPANT_TOKEN),
        ] {
            db.users.insert(
                id.to_string(),
                User {
                    id: id.to_string(),
                    name: name.to_string(),
                },
            );
            db.tokens.insert(token.to_string(), id.to_string());
        }
        db.categories = vec![
            Category::new("cat-programming", "Programming"),
            Category::new("cat-music", "Music"),
            Category::new("cat-languages", "Languages"),
        ];
        db.proficiency_levels = vec![
            ProficiencyLevel::new("lvl-beginner", "Beginner", 1),
            ProficiencyLevel::new("lvl-intermediate", "Intermediate", 2),
            ProficiencyLevel::new("lvl-expert", "Expert", 3),
        ];
        db
    }

    pub fn user_name(&self, id: &str) -> Option<String> {
        self.users.get(id).map(|u| u.name.clone())
    }
}

pub type AppState = Arc<RwLock<Db>>;

/// Id of the authenticated caller, set by the auth middleware.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub String);

/// `{ success: false, message }` with a status code.
#[derive(Debug)]
pub struct ApiFailure {
    pub status: StatusCode,
    pub message: String,
}

impl ApiFailure {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(StatusCode::FORBIDDEN, message)
    }

    pub fn not_found(what: &str) -> Self {
        Self::new(StatusCode::NOT_FOUND, format!("{what} not found"))
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(StatusCode::CONFLICT, message)
    }
}

impl IntoResponse for ApiFailure {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(json!({ "success": false, "data": null, "message": self.message })),
        )
            .into_response()
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Envelope<T> {
    pub success: bool,
    pub data: T,
    pub message: Option<String>,
}

pub fn ok<T: Serialize>(data: T) -> Json<Envelope<T>> {
    Json(Envelope {
        success: true,
        data,
        message: None,
    })
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Paged<T> {
    pub success: bool,
    pub data: Vec<T>,
    pub page_number: u32,
    pub page_size: u32,
    pub total_records: u64,
    pub total_pages: u32,
    pub has_next_page: bool,
    pub has_previous_page: bool,
    pub message: Option<String>,
}

pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// Slice `items` to the requested 1-based page.
pub fn paginate<T>(items: Vec<T>, page_number: Option<u32>, page_size: Option<u32>) -> Paged<T> {
    let page_number = page_number.unwrap_or(1).max(1);
    let page_size = page_size.unwrap_or(DEFAULT_PAGE_SIZE).max(1);
    let total_records = items.len() as u64;
    let total_pages = total_records.div_ceil(u64::from(page_size)) as u32;
    let skip = ((page_number - 1) * page_size) as usize;
    let data: Vec<T> = items.into_iter().skip(skip).take(page_size as usize).collect();
    Paged {
        success: true,
        data,
        page_number,
        page_size,
        total_records,
        total_pages,
        has_next_page: page_number < total_pages,
        has_previous_page: page_number > 1,
        message: None,
    }
}

pub fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

pub fn now() -> DateTime<Utc> {
    Utc::now()
}

async fn require_bearer(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiFailure> {
    let token = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim);
    let user = match token {
        Some(token) => state.read().await.tokens.get(token).cloned(),
        None => None,
    };
    let Some(user) = user else {
        tracing::debug!(path = %request.uri().path(), "rejecting unauthenticated request");
        return Err(ApiFailure::new(StatusCode::UNAUTHORIZED, "Unauthorized"));
    };
    request.extensions_mut().insert(CurrentUser(user));
    Ok(next.run(request).await)
}

pub fn app() -> Router {
    app_with_state(Arc::new(RwLock::new(Db::seeded())))
}

/// Routes are served under `/api`, matching the client's default base URL.
pub fn app_with_state(state: AppState) -> Router {
    let api = Router::new()
        .route(
            "/appointments",
            get(appointments::list).post(appointments::create),
        )
        .route("/appointments/{id}", get(appointments::get_one))
        .route("/appointments/{id}/respond", post(appointments::respond))
        .route("/appointments/{id}/cancel", post(appointments::cancel))
        .route("/appointments/{id}/reschedule", post(appointments::reschedule))
        .route("/appointments/{id}/meeting-link", post(appointments::meeting_link))
        .route("/skills", get(skills::list).post(skills::create))
        .route("/skills/me", get(skills::list_mine))
        .route("/skills/favorites", get(skills::favorites))
        .route(
            "/skills/favorites/{id}",
            post(skills::add_favorite).delete(skills::remove_favorite),
        )
        .route(
            "/skills/{id}",
            get(skills::get_one).put(skills::update).delete(skills::delete),
        )
        .route("/categories", get(skills::categories).post(skills::create_category))
        .route(
            "/categories/{id}",
            put(skills::update_category).delete(skills::delete_category),
        )
        .route(
            "/proficiency-levels",
            get(skills::levels).post(skills::create_level),
        )
        .route(
            "/proficiency-levels/{id}",
            put(skills::update_level).delete(skills::delete_level),
        )
        .route("/matches", get(matches::list))
        .route("/matches/requests", post(matches::create))
        .route("/matches/requests/incoming", get(matches::incoming))
        .route("/matches/requests/outgoing", get(matches::outgoing))
        .route("/matches/requests/{id}/accept", post(matches::accept))
        .route("/matches/requests/{id}/reject", post(matches::reject))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_bearer))
        .with_state(state);
    Router::new().nest("/api", api)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}
