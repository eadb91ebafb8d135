//! Wire DTOs, domain models, and the mapping between them.
//!
//! # Design
//! Each entity has exactly one DTO type (what the backend sends, with the
//! aliases older payloads use) and one domain type (what slices store). The
//! only way from one to the other is the entity's `map_*` function, so
//! derived fields such as an appointment's end time are computed in a single
//! place.

pub mod appointment;
pub mod matching;
pub mod skill;

use serde::{Deserialize, Serialize};

pub use appointment::{
    end_time, map_appointment, Appointment, AppointmentDto, AppointmentStatus,
    CreateAppointmentRequest, MeetingType, RescheduleRequest, DEFAULT_DURATION_MINUTES,
};
pub use matching::{map_match, CreateMatchRequest, Match, MatchDto, MatchStatus};
pub use skill::{
    map_skill, CategoryDto, CategoryInput, ProficiencyLevel, ProficiencyLevelDto,
    ProficiencyLevelInput, Skill, SkillCategory, SkillDirection, SkillDto, SkillInput,
};

fn default_true() -> bool {
    true
}

/// Paged list envelope. Pagination counters are required; a payload missing
/// them is rejected as an unexpected shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PagedResponse<T> {
    #[serde(default = "default_true")]
    pub success: bool,
    pub data: Vec<T>,
    pub page_number: u32,
    pub page_size: u32,
    pub total_records: u64,
    pub total_pages: u32,
    pub has_next_page: bool,
    pub has_previous_page: bool,
    #[serde(default)]
    pub message: Option<String>,
}

/// Timestamp parsing shared by every DTO.
///
/// The backend emits RFC 3339, but some endpoints drop the offset; those
/// values are taken as UTC.
pub(crate) mod wire_time {
    use chrono::{DateTime, NaiveDateTime, Utc};
    use serde::{de, Deserialize, Deserializer};

    const NAIVE_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

    pub fn parse(raw: &str) -> Option<DateTime<Utc>> {
        let raw = raw.trim();
        if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
            return Some(dt.with_timezone(&Utc));
        }
        NAIVE_FORMATS
            .iter()
            .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
            .map(|naive| naive.and_utc())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        parse(&raw).ok_or_else(|| de::Error::custom(format!("invalid timestamp '{raw}'")))
    }

    pub fn deserialize_option<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Option::<String>::deserialize(deserializer)? {
            None => Ok(None),
            Some(raw) if raw.trim().is_empty() => Ok(None),
            Some(raw) => parse(&raw)
                .map(Some)
                .ok_or_else(|| de::Error::custom(format!("invalid timestamp '{raw}'"))),
        }
    }

}
