use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::wire_time;
use crate::error::{require_id, ApiError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SkillDirection {
    /// The owner teaches it.
    Offering,
    /// The owner wants to learn it.
    Seeking,
}

impl SkillDirection {
    pub const fn from_is_offered(is_offered: bool) -> Self {
        if is_offered {
            Self::Offering
        } else {
            Self::Seeking
        }
    }

    pub const fn is_offered(self) -> bool {
        matches!(self, Self::Offering)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryDto {
    #[serde(alias = "categoryId")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProficiencyLevelDto {
    #[serde(alias = "levelId")]
    pub id: String,
    pub level: String,
    #[serde(default)]
    pub rank: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkillCategory {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
}

impl From<CategoryDto> for SkillCategory {
    fn from(dto: CategoryDto) -> Self {
        Self {
            id: dto.id,
            name: dto.name,
            description: dto.description.filter(|d| !d.trim().is_empty()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProficiencyLevel {
    pub id: String,
    pub level: String,
    pub rank: u8,
}

impl From<ProficiencyLevelDto> for ProficiencyLevel {
    fn from(dto: ProficiencyLevelDto) -> Self {
        Self {
            id: dto.id,
            level: dto.level,
            rank: dto.rank,
        }
    }
}

/// Skill as the backend sends it. Category arrives either nested or as flat
/// `categoryId`/`categoryName`; tags either as an array or as a JSON-encoded
/// string in `tagsJson`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkillDto {
    #[serde(alias = "skillId")]
    pub id: String,
    pub user_id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default = "default_offered")]
    pub is_offered: bool,
    #[serde(default)]
    pub category: Option<CategoryDto>,
    #[serde(default)]
    pub category_id: Option<String>,
    #[serde(default)]
    pub category_name: Option<String>,
    #[serde(default)]
    pub proficiency_level: Option<ProficiencyLevelDto>,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
    #[serde(default)]
    pub tags_json: Option<String>,
    #[serde(default)]
    pub is_favorite: bool,
    #[serde(default, deserialize_with = "wire_time::deserialize_option")]
    pub created_at: Option<DateTime<Utc>>,
}

fn default_offered() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Skill {
    pub id: String,
    pub user_id: String,
    pub name: String,
    pub description: String,
    pub category: SkillCategory,
    pub proficiency_level: Option<ProficiencyLevel>,
    pub tags: Vec<String>,
    pub direction: SkillDirection,
    pub is_favorite: bool,
    pub created_at: Option<DateTime<Utc>>,
}

fn normalize_tags(tags: Option<Vec<String>>, tags_json: Option<String>) -> Vec<String> {
    let raw = tags.unwrap_or_else(|| {
        tags_json
            .and_then(|json| serde_json::from_str::<Vec<String>>(&json).ok())
            .unwrap_or_default()
    });
    let mut out: Vec<String> = Vec::with_capacity(raw.len());
    for tag in raw {
        let tag = tag.trim();
        if !tag.is_empty() && !out.iter().any(|t| t.eq_ignore_ascii_case(tag)) {
            out.push(tag.to_string());
        }
    }
    out
}

/// The one DTO → domain mapping for skills.
pub fn map_skill(dto: SkillDto) -> Skill {
    let category = match dto.category {
        Some(nested) => SkillCategory::from(nested),
        None => SkillCategory {
            id: dto.category_id.unwrap_or_default(),
            name: dto
                .category_name
                .filter(|n| !n.trim().is_empty())
                .unwrap_or_else(|| "Uncategorized".to_string()),
            description: None,
        },
    };

    Skill {
        id: dto.id,
        user_id: dto.user_id,
        name: dto.name.trim().to_string(),
        description: dto.description.unwrap_or_default(),
        category,
        proficiency_level: dto.proficiency_level.map(ProficiencyLevel::from),
        tags: normalize_tags(dto.tags, dto.tags_json),
        direction: SkillDirection::from_is_offered(dto.is_offered),
        is_favorite: dto.is_favorite,
        created_at: dto.created_at,
    }
}

/// Body for creating or updating a skill.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkillInput {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub category_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub proficiency_level_id: Option<String>,
    pub is_offered: bool,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl SkillInput {
    pub fn validate(&self) -> Result<(), ApiError> {
        if self.name.trim().is_empty() {
            return Err(ApiError::Validation("Skill name is required".to_string()));
        }
        require_id("Category ID", &self.category_id)?;
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryInput {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProficiencyLevelInput {
    pub level: String,
    pub rank: u8,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn nested_category_and_level() {
        let skill = map_skill(
            serde_json::from_str(
                r#"{"skillId":"s1","userId":"u1","name":" Rust ","isOffered":false,
                    "category":{"categoryId":"c1","name":"Programming"},
                    "proficiencyLevel":{"levelId":"p2","level":"Intermediate","rank":2},
                    "tags":["systems","Systems"," ","async"]}"#,
            )
            .unwrap(),
        );
        assert_eq!(skill.id, "s1");
        assert_eq!(skill.name, "Rust");
        assert_eq!(skill.direction, SkillDirection::Seeking);
        assert_eq!(skill.category.id, "c1");
        assert_eq!(skill.proficiency_level.unwrap().rank, 2);
        assert_eq!(skill.tags, vec!["systems".to_string(), "async".to_string()]);
    }

    #[test]
    fn flat_category_and_json_tags() {
        let skill = map_skill(
            serde_json::from_str(
                r#"{"id":"s2","userId":"u1","name":"Guitar","categoryId":"c9",
                    "categoryName":"Music","tagsJson":"[\"chords\",\"folk\"]"}"#,
            )
            .unwrap(),
        );
        assert_eq!(skill.category.name, "Music");
        assert_eq!(skill.tags, vec!["chords".to_string(), "folk".to_string()]);
        assert_eq!(skill.direction, SkillDirection::Offering);
        assert!(skill.proficiency_level.is_none());
    }

    #[test]
    fn malformed_tags_json_yields_no_tags() {
        let skill = map_skill(
            serde_json::from_str(r#"{"id":"s3","userId":"u1","name":"Chess","tagsJson":"not json"}"#)
                .unwrap(),
        );
        assert!(skill.tags.is_empty());
        assert_eq!(skill.category.name, "Uncategorized");
    }

    #[test]
    fn input_validation() {
        let mut input = SkillInput {
            name: "Rust".to_string(),
            description: None,
            category_id: "c1".to_string(),
            proficiency_level_id: None,
            is_offered: true,
            tags: Vec::new(),
        };
        assert!(input.validate().is_ok());
        input.category_id.clear();
        assert_eq!(
            input.validate().unwrap_err(),
            ApiError::Validation("Category ID is required".to_string())
        );
        input.name = "  ".to_string();
        assert!(input.validate().is_err());
    }
}
