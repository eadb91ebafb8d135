use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::wire_time;
use crate::error::{require_id, ApiError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum MatchStatus {
    #[default]
    Pending,
    Accepted,
    Rejected,
    #[serde(alias = "Canceled")]
    Cancelled,
    Completed,
}

impl MatchStatus {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Accepted => "Accepted",
            Self::Rejected => "Rejected",
            Self::Cancelled => "Cancelled",
            Self::Completed => "Completed",
        }
    }
}

impl std::fmt::Display for MatchStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchDto {
    #[serde(alias = "matchId", alias = "requestId")]
    pub id: String,
    pub requester_user_id: String,
    #[serde(alias = "targetUserId")]
    pub responder_user_id: String,
    #[serde(default)]
    pub requester_name: Option<String>,
    #[serde(default, alias = "targetUserName")]
    pub responder_name: Option<String>,
    pub skill_id: String,
    #[serde(default)]
    pub skill_name: Option<String>,
    #[serde(default)]
    pub is_skill_exchange: bool,
    #[serde(default)]
    pub exchange_skill_id: Option<String>,
    #[serde(default)]
    pub status: MatchStatus,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub preferred_days: Option<Vec<String>>,
    #[serde(default)]
    pub preferred_times: Option<Vec<String>>,
    #[serde(default, deserialize_with = "wire_time::deserialize_option")]
    pub created_at: Option<DateTime<Utc>>,
}

/// A proposed pairing between two users around a skill, with the windows the
/// requester would like to meet in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Match {
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
    pub created_at: Option<DateTime<Utc>>,
}

impl Match {
    /// The other side of the pairing from `user_id`'s point of view.
    pub fn counterpart(&self, user_id: &str) -> Option<&str> {
        if self.requester_user_id == user_id {
            Some(&self.responder_user_id)
        } else if self.responder_user_id == user_id {
            Some(&self.requester_user_id)
        } else {
            None
        }
    }
}

/// The one DTO → domain mapping for matches.
pub fn map_match(dto: MatchDto) -> Match {
    let exchange_skill_id = dto
        .exchange_skill_id
        .filter(|id| dto.is_skill_exchange && !id.trim().is_empty());
    Match {
        id: dto.id,
        requester_user_id: dto.requester_user_id,
        responder_user_id: dto.responder_user_id,
        requester_name: dto.requester_name,
        responder_name: dto.responder_name,
        skill_id: dto.skill_id,
        skill_name: dto.skill_name,
        is_skill_exchange: dto.is_skill_exchange,
        exchange_skill_id,
        status: dto.status,
        message: dto.message.filter(|m| !m.trim().is_empty()),
        preferred_days: dto.preferred_days.unwrap_or_default(),
        preferred_times: dto.preferred_times.unwrap_or_default(),
        created_at: dto.created_at,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateMatchRequest {
    pub target_user_id: String,
    pub skill_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub is_skill_exchange: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exchange_skill_id: Option<String>,
    #[serde(default)]
    pub preferred_days: Vec<String>,
    #[serde(default)]
    pub preferred_times: Vec<String>,
}

impl CreateMatchRequest {
    pub fn validate(&self) -> Result<(), ApiError> {
        require_id("Target user ID", &self.target_user_id)?;
        require_id("Skill ID", &self.skill_id)?;
        if self.is_skill_exchange {
            let exchange = self.exchange_skill_id.as_deref().unwrap_or_default();
            require_id("Exchange skill ID", exchange)?;
        }
        Ok(())
    }
}
