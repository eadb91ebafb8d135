use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{new_id, now, ok, paginate, ApiFailure, AppState, CurrentUser, Envelope, Paged};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchStatus {
    Pending,
    Accepted,
    Rejected,
    Cancelled,
    Completed,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchRecord {
    pub id: String,
    pub requester_user_id: String,
    pub responder_user_id: String,
    pub requester_name: Option<String>,
    pub responder_name: Option<String>,
    pub skill_id: String,
    pub skill_name: Option<String>,
    pub is_skill_exchange: bool,
    pub exchange_skill_id: Option<String>,
    pub status: MatchStatus,
    pub message: Option<String>,
    pub preferred_days: Vec<String>,
    pub preferred_times: Vec<String>,
    pub created_at: DateTime<Utc>,
}

impl MatchRecord {
    fn involves(&self, user: &str) -> bool {
        self.requester_user_id == user || self.responder_user_id == user
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListParams {
    page_number: Option<u32>,
    page_size: Option<u32>,
    status: Option<MatchStatus>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateMatch {
    target_user_id: String,
    skill_id: String,
    message: Option<String>,
    #[serde(default)]
    is_skill_exchange: bool,
    exchange_skill_id: Option<String>,
    #[serde(default)]
    preferred_days: Vec<String>,
    #[serde(default)]
    preferred_times: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct ResponseBody {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    reason: Option<String>,
}

/// Accepted and later matches; pending requests live under `/matches/requests`.
pub async fn list(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Query(params): Query<ListParams>,
) -> Json<Paged<MatchRecord>> {
    let db = state.read().await;
    let items: Vec<MatchRecord> = db
        .matches
        .iter()
        .filter(|m| m.involves(&user))
        .filter(|m| match params.status {
            Some(status) => m.status == status,
            None => m.status != MatchStatus::Pending,
        })
        .cloned()
        .collect();
    Json(paginate(items, params.page_number, params.page_size))
}

pub async fn incoming(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
) -> Json<Envelope<Vec<MatchRecord>>> {
    let db = state.read().await;
    ok(db
        .matches
        .iter()
        .filter(|m| m.responder_user_id == user && m.status == MatchStatus::Pending)
        .cloned()
        .collect())
}

pub async fn outgoing(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
) -> Json<Envelope<Vec<MatchRecord>>> {
    let db = state.read().await;
    ok(db
        .matches
        .iter()
        .filter(|m| m.requester_user_id == user)
        .cloned()
        .collect())
}

pub async fn create(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Json(input): Json<CreateMatch>,
) -> Result<(StatusCode, Json<Envelope<MatchRecord>>), ApiFailure> {
    if input.target_user_id == user {
        return Err(ApiFailure::bad_request("Cannot send a match request to yourself"));
    }
    if input.is_skill_exchange && input.exchange_skill_id.is_none() {
        return Err(ApiFailure::bad_request("Exchange skill ID is required"));
    }
    let mut db = state.write().await;
    if !db.users.contains_key(&input.target_user_id) {
        return Err(ApiFailure::not_found("User"));
    }
    let skill_name = db
        .skills
        .iter()
        .find(|s| s.id == input.skill_id)
        .map(|s| s.name.clone());
    let duplicate = db.matches.iter().any(|m| {
        m.requester_user_id == user
            && m.responder_user_id == input.target_user_id
            && m.skill_id == input.skill_id
            && m.status == MatchStatus::Pending
    });
    if duplicate {
        return Err(ApiFailure::conflict("A pending request already exists"));
    }
    let record = MatchRecord {
        id: new_id(),
        requester_name: db.user_name(&user),
        responder_name: db.user_name(&input.target_user_id),
        requester_user_id: user,
        responder_user_id: input.target_user_id,
        skill_id: input.skill_id,
        skill_name,
        is_skill_exchange: input.is_skill_exchange,
        exchange_skill_id: input.exchange_skill_id,
        status: MatchStatus::Pending,
        message: input.message,
        preferred_days: input.preferred_days,
        preferred_times: input.preferred_times,
        created_at: now(),
    };
    db.matches.push(record.clone());
    Ok((StatusCode::CREATED, ok(record)))
}

async fn settle(
    state: AppState,
    user: String,
    id: String,
    status: MatchStatus,
    note: Option<String>,
) -> Result<Json<Envelope<MatchRecord>>, ApiFailure> {
    let mut db = state.write().await;
    let record = db
        .matches
        .iter_mut()
        .find(|m| m.id == id && m.involves(&user))
        .ok_or_else(|| ApiFailure::not_found("Match request"))?;
    if record.responder_user_id != user {
        return Err(ApiFailure::forbidden("Only the recipient can respond"));
    }
    if record.status != MatchStatus::Pending {
        return Err(ApiFailure::conflict("Match request is not pending"));
    }
    record.status = status;
    if let Some(note) = note.filter(|n| !n.trim().is_empty()) {
        record.message = Some(note);
    }
    Ok(ok(record.clone()))
}

pub async fn accept(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(id): Path<String>,
    Json(body): Json<ResponseBody>,
) -> Result<Json<Envelope<MatchRecord>>, ApiFailure> {
    settle(state, user, id, MatchStatus::Accepted, body.message).await
}

pub async fn reject(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(id): Path<String>,
    Json(body): Json<ResponseBody>,
) -> Result<Json<Envelope<MatchRecord>>, ApiFailure> {
    settle(state, user, id, MatchStatus::Rejected, body.reason).await
}
