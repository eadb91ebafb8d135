use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

use super::wire_time;
use crate::error::{require_id, ApiError};

/// Used when a payload carries neither a duration nor an end time.
pub const DEFAULT_DURATION_MINUTES: u32 = 60;

/// Appointment lifecycle.
///
/// ```text
/// Pending → Confirmed → InProgress → Completed
///         ↘ Cancelled  ↘ Rescheduled → Confirmed
///                      ↘ NoShow
/// ```
///
/// Older payloads say `Accepted` and `Canceled`; both fold into the canonical
/// variants here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum AppointmentStatus {
    #[default]
    Pending,
    #[serde(alias = "Accepted")]
    Confirmed,
    Rescheduled,
    InProgress,
    Completed,
    #[serde(alias = "Canceled")]
    Cancelled,
    NoShow,
}

impl AppointmentStatus {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Confirmed => "Confirmed",
            Self::Rescheduled => "Rescheduled",
            Self::InProgress => "InProgress",
            Self::Completed => "Completed",
            Self::Cancelled => "Cancelled",
            Self::NoShow => "NoShow",
        }
    }

    /// No further transitions are possible.
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled | Self::NoShow)
    }
}

impl std::fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum MeetingType {
    #[default]
    #[serde(alias = "Online", alias = "Video")]
    VideoCall,
    InPerson,
    Phone,
    #[serde(other)]
    Other,
}

/// Appointment as the backend sends it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppointmentDto {
    #[serde(alias = "appointmentId")]
    pub id: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(alias = "startTime", deserialize_with = "wire_time::deserialize")]
    pub scheduled_date: DateTime<Utc>,
    #[serde(default, alias = "duration")]
    pub duration_minutes: Option<u32>,
    #[serde(default, deserialize_with = "wire_time::deserialize_option")]
    pub end_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub status: AppointmentStatus,
    #[serde(alias = "teacherId")]
    pub organizer_user_id: String,
    #[serde(alias = "studentId")]
    pub participant_user_id: String,
    #[serde(default)]
    pub organizer_name: Option<String>,
    #[serde(default)]
    pub participant_name: Option<String>,
    #[serde(default)]
    pub skill_id: Option<String>,
    #[serde(default)]
    pub skill_name: Option<String>,
    #[serde(default)]
    pub match_id: Option<String>,
    #[serde(default)]
    pub meeting_type: Option<MeetingType>,
    #[serde(default)]
    pub meeting_link: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub cancellation_reason: Option<String>,
    #[serde(default, deserialize_with = "wire_time::deserialize_option")]
    pub created_at: Option<DateTime<Utc>>,
}

/// Appointment as slices store it. `end_time` always equals
/// `scheduled_at + duration_minutes`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Appointment {
    pub id: String,
    pub title: String,
    pub description: String,
    pub scheduled_at: DateTime<Utc>,
    pub duration_minutes: u32,
    pub end_time: DateTime<Utc>,
    pub status: AppointmentStatus,
    pub organizer_user_id: String,
    pub participant_user_id: String,
    pub organizer_name: Option<String>,
    pub participant_name: Option<String>,
    pub skill_id: Option<String>,
    pub skill_name: Option<String>,
    pub match_id: Option<String>,
    pub meeting_type: MeetingType,
    pub meeting_link: Option<String>,
    pub location: Option<String>,
    pub cancellation_reason: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}

impl Appointment {
    /// Starts after `now` and can still happen.
    pub fn is_upcoming(&self, now: DateTime<Utc>) -> bool {
        self.scheduled_at > now && !self.status.is_terminal()
    }

    /// Over, either by the clock or by status.
    pub fn is_past(&self, now: DateTime<Utc>) -> bool {
        self.end_time <= now || matches!(self.status, AppointmentStatus::Completed | AppointmentStatus::NoShow)
    }

    pub fn involves(&self, user_id: &str) -> bool {
        self.organizer_user_id == user_id || self.participant_user_id == user_id
    }
}

/// End of a session starting at `start` and lasting `duration_minutes`.
pub fn end_time(start: DateTime<Utc>, duration_minutes: u32) -> DateTime<Utc> {
    start + TimeDelta::minutes(i64::from(duration_minutes))
}

fn resolve_duration(dto: &AppointmentDto) -> u32 {
    if let Some(minutes) = dto.duration_minutes.filter(|m| *m > 0) {
        return minutes;
    }
    dto.end_time
        .map(|end| (end - dto.scheduled_date).num_minutes())
        .filter(|m| *m > 0)
        .and_then(|m| u32::try_from(m).ok())
        .unwrap_or(DEFAULT_DURATION_MINUTES)
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// The one DTO → domain mapping for appointments.
pub fn map_appointment(dto: AppointmentDto) -> Appointment {
    let duration_minutes = resolve_duration(&dto);
    let skill_name = non_blank(dto.skill_name);
    let title = non_blank(dto.title)
        .or_else(|| skill_name.as_ref().map(|s| format!("{s} session")))
        .unwrap_or_else(|| "Appointment".to_string());

    Appointment {
        id: dto.id,
        title,
        description: dto.description.unwrap_or_default(),
        scheduled_at: dto.scheduled_date,
        duration_minutes,
        end_time: end_time(dto.scheduled_date, duration_minutes),
        status: dto.status,
        organizer_user_id: dto.organizer_user_id,
        participant_user_id: dto.participant_user_id,
        organizer_name: non_blank(dto.organizer_name),
        participant_name: non_blank(dto.participant_name),
        skill_id: non_blank(dto.skill_id),
        skill_name,
        match_id: non_blank(dto.match_id),
        meeting_type: dto.meeting_type.unwrap_or_default(),
        meeting_link: non_blank(dto.meeting_link),
        location: non_blank(dto.location),
        cancellation_reason: non_blank(dto.cancellation_reason),
        created_at: dto.created_at,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAppointmentRequest {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub scheduled_date: DateTime<Utc>,
    pub duration_minutes: u32,
    pub participant_user_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skill_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub match_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meeting_type: Option<MeetingType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

impl CreateAppointmentRequest {
    pub fn validate(&self) -> Result<(), ApiError> {
        if self.title.trim().is_empty() {
            return Err(ApiError::Validation("Title is required".to_string()));
        }
        require_id("Participant ID", &self.participant_user_id)?;
        if self.duration_minutes == 0 {
            return Err(ApiError::Validation(
                "Duration must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RescheduleRequest {
    pub new_scheduled_date: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub new_duration_minutes: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl RescheduleRequest {
    pub fn validate(&self) -> Result<(), ApiError> {
        if self.new_duration_minutes == Some(0) {
            return Err(ApiError::Validation(
                "Duration must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}
