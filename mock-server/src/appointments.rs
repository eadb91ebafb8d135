use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::{new_id, now, ok, paginate, ApiFailure, AppState, CurrentUser, Envelope, Paged};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AppointmentStatus {
    Pending,
    Confirmed,
    Rescheduled,
    InProgress,
    Completed,
    Cancelled,
    NoShow,
}

impl AppointmentStatus {
    fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled | Self::NoShow)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Appointment {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub scheduled_date: DateTime<Utc>,
    pub duration_minutes: u32,
    pub end_time: DateTime<Utc>,
    pub status: AppointmentStatus,
    pub organizer_user_id: String,
    pub participant_user_id: String,
    pub organizer_name: Option<String>,
    pub participant_name: Option<String>,
    pub skill_id: Option<String>,
    pub match_id: Option<String>,
    pub meeting_type: String,
    pub meeting_link: Option<String>,
    pub location: Option<String>,
    pub cancellation_reason: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Appointment {
    fn involves(&self, user: &str) -> bool {
        self.organizer_user_id == user || self.participant_user_id == user
    }

    fn set_schedule(&mut self, start: DateTime<Utc>, minutes: u32) {
        self.scheduled_date = start;
        self.duration_minutes = minutes;
        self.end_time = start + Duration::minutes(i64::from(minutes));
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListParams {
    page_number: Option<u32>,
    page_size: Option<u32>,
    status: Option<AppointmentStatus>,
    from_date: Option<DateTime<Utc>>,
    to_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAppointment {
    title: String,
    description: Option<String>,
    scheduled_date: DateTime<Utc>,
    duration_minutes: u32,
    participant_user_id: String,
    skill_id: Option<String>,
    match_id: Option<String>,
    meeting_type: Option<String>,
    location: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RespondBody {
    status: AppointmentStatus,
}

#[derive(Debug, Deserialize)]
pub struct CancelBody {
    #[serde(default)]
    reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RescheduleBody {
    new_scheduled_date: DateTime<Utc>,
    new_duration_minutes: Option<u32>,
}

pub async fn list(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Query(params): Query<ListParams>,
) -> Json<Paged<Appointment>> {
    let db = state.read().await;
    let mut items: Vec<Appointment> = db
        .appointments
        .iter()
        .filter(|a| a.involves(&user))
        .filter(|a| params.status.is_none_or(|s| a.status == s))
        .filter(|a| params.from_date.is_none_or(|from| a.scheduled_date >= from))
        .filter(|a| params.to_date.is_none_or(|to| a.scheduled_date <= to))
        .cloned()
        .collect();
    items.sort_by_key(|a| a.scheduled_date);
    Json(paginate(items, params.page_number, params.page_size))
}

pub async fn get_one(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> Result<Json<Envelope<Appointment>>, ApiFailure> {
    let db = state.read().await;
    db.appointments
        .iter()
        .find(|a| a.id == id && a.involves(&user))
        .cloned()
        .map(ok)
        .ok_or_else(|| ApiFailure::not_found("Appointment"))
}

pub async fn create(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Json(input): Json<CreateAppointment>,
) -> Result<(StatusCode, Json<Envelope<Appointment>>), ApiFailure> {
    if input.title.trim().is_empty() {
        return Err(ApiFailure::bad_request("Title is required"));
    }
    if input.duration_minutes == 0 {
        return Err(ApiFailure::bad_request("Duration must be greater than zero"));
    }
    let mut db = state.write().await;
    if input.participant_user_id == user {
        return Err(ApiFailure::bad_request("Cannot book an appointment with yourself"));
    }
    if !db.users.contains_key(&input.participant_user_id) {
        return Err(ApiFailure::not_found("Participant"));
    }
    let mut appointment = Appointment {
        id: new_id(),
        title: input.title.trim().to_string(),
        description: input.description,
        scheduled_date: input.scheduled_date,
        duration_minutes: input.duration_minutes,
        end_time: input.scheduled_date,
        status: AppointmentStatus::Pending,
        organizer_name: db.user_name(&user),
        participant_name: db.user_name(&input.participant_user_id),
        organizer_user_id: user,
        participant_user_id: input.participant_user_id,
        skill_id: input.skill_id,
        match_id: input.match_id,
        meeting_type: input.meeting_type.unwrap_or_else(|| "VideoCall".to_string()),
        meeting_link: None,
        location: input.location,
        cancellation_reason: None,
        created_at: now(),
    };
    appointment.set_schedule(input.scheduled_date, input.duration_minutes);
    tracing::info!(id = %appointment.id, "appointment created");
    db.appointments.push(appointment.clone());
    Ok((StatusCode::CREATED, ok(appointment)))
}

/// Look up an appointment the caller takes part in.
fn find_mut<'a>(
    items: &'a mut [Appointment],
    id: &str,
    user: &str,
) -> Result<&'a mut Appointment, ApiFailure> {
    items
        .iter_mut()
        .find(|a| a.id == id && a.involves(user))
        .ok_or_else(|| ApiFailure::not_found("Appointment"))
}

pub async fn respond(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(id): Path<String>,
    Json(body): Json<RespondBody>,
) -> Result<Json<Envelope<bool>>, ApiFailure> {
    if !matches!(body.status, AppointmentStatus::Confirmed | AppointmentStatus::Cancelled) {
        return Err(ApiFailure::bad_request("Status must be Confirmed or Cancelled"));
    }
    let mut db = state.write().await;
    let appointment = find_mut(&mut db.appointments, &id, &user)?;
    if appointment.participant_user_id != user {
        return Err(ApiFailure::forbidden("Only the participant can respond"));
    }
    if appointment.status != AppointmentStatus::Pending {
        return Err(ApiFailure::conflict("Appointment is not pending"));
    }
    appointment.status = body.status;
    Ok(ok(true))
}

pub async fn cancel(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(id): Path<String>,
    Json(body): Json<CancelBody>,
) -> Result<Json<Envelope<Appointment>>, ApiFailure> {
    let mut db = state.write().await;
    let appointment = find_mut(&mut db.appointments, &id, &user)?;
    if appointment.status.is_terminal() {
        return Err(ApiFailure::conflict("Appointment can no longer be cancelled"));
    }
    appointment.status = AppointmentStatus::Cancelled;
    appointment.cancellation_reason = body.reason.filter(|r| !r.trim().is_empty());
    Ok(ok(appointment.clone()))
}

pub async fn reschedule(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(id): Path<String>,
    Json(body): Json<RescheduleBody>,
) -> Result<Json<Envelope<Appointment>>, ApiFailure> {
    if body.new_duration_minutes == Some(0) {
        return Err(ApiFailure::bad_request("Duration must be greater than zero"));
    }
    let mut db = state.write().await;
    let appointment = find_mut(&mut db.appointments, &id, &user)?;
    if appointment.status.is_terminal() {
        return Err(ApiFailure::conflict("Appointment can no longer be rescheduled"));
    }
    let minutes = body.new_duration_minutes.unwrap_or(appointment.duration_minutes);
    appointment.set_schedule(body.new_scheduled_date, minutes);
    appointment.status = AppointmentStatus::Rescheduled;
    Ok(ok(appointment.clone()))
}

pub async fn meeting_link(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> Result<Json<Envelope<String>>, ApiFailure> {
    let mut db = state.write().await;
    let appointment = find_mut(&mut db.appointments, &id, &user)?;
    if appointment.status.is_terminal() {
        return Err(ApiFailure::conflict("Appointment is closed"));
    }
    let link = format!("https://meet.skillswap.test/{}", appointment.id);
    appointment.meeting_link = Some(link.clone());
    Ok(ok(link))
}
