use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{new_id, now, ok, paginate, ApiFailure, AppState, CurrentUser, Db, Envelope, Paged};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
}

impl Category {
    pub fn new(id: &str, name: &str) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            description: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProficiencyLevel {
    pub id: String,
    pub level: String,
    pub rank: u8,
}

impl ProficiencyLevel {
    pub fn new(id: &str, level: &str, rank: u8) -> Self {
        Self {
            id: id.to_string(),
            level: level.to_string(),
            rank,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Skill {
    pub id: String,
    pub user_id: String,
    pub name: String,
    pub description: Option<String>,
    pub is_offered: bool,
    pub category: Category,
    pub proficiency_level: Option<ProficiencyLevel>,
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListParams {
    page_number: Option<u32>,
    page_size: Option<u32>,
    search_term: Option<String>,
    category_id: Option<String>,
    is_offered: Option<bool>,
    proficiency_level_id: Option<String>,
}

impl ListParams {
    fn matches(&self, skill: &Skill) -> bool {
        if self.is_offered.is_some_and(|o| o != skill.is_offered) {
            return false;
        }
        if self.category_id.as_ref().is_some_and(|c| *c != skill.category.id) {
            return false;
        }
        if let Some(level) = &self.proficiency_level_id {
            if skill.proficiency_level.as_ref().is_none_or(|l| l.id != *level) {
                return false;
            }
        }
        match self.search_term.as_deref().map(str::trim) {
            Some(term) if !term.is_empty() => {
                let term = term.to_lowercase();
                skill.name.to_lowercase().contains(&term)
                    || skill
                        .description
                        .as_deref()
                        .is_some_and(|d| d.to_lowercase().contains(&term))
            }
            _ => true,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkillInput {
    name: String,
    description: Option<String>,
    category_id: String,
    proficiency_level_id: Option<String>,
    #[serde(default = "offered")]
    is_offered: bool,
    #[serde(default)]
    tags: Vec<String>,
}

fn offered() -> bool {
    true
}

#[derive(Debug, Deserialize)]
pub struct CategoryInput {
    name: String,
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LevelInput {
    level: String,
    rank: u8,
}

fn resolve(
    db: &Db,
    input: &SkillInput,
) -> Result<(Category, Option<ProficiencyLevel>), ApiFailure> {
    if input.name.trim().is_empty() {
        return Err(ApiFailure::bad_request("Skill name is required"));
    }
    let category = db
        .categories
        .iter()
        .find(|c| c.id == input.category_id)
        .cloned()
        .ok_or_else(|| ApiFailure::bad_request("Unknown category"))?;
    let level = match &input.proficiency_level_id {
        Some(id) => Some(
            db.proficiency_levels
                .iter()
                .find(|l| l.id == *id)
                .cloned()
                .ok_or_else(|| ApiFailure::bad_request("Unknown proficiency level"))?,
        ),
        None => None,
    };
    Ok((category, level))
}

pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Json<Paged<Skill>> {
    let db = state.read().await;
    let items: Vec<Skill> = db.skills.iter().filter(|s| params.matches(s)).cloned().collect();
    Json(paginate(items, params.page_number, params.page_size))
}

pub async fn list_mine(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Query(params): Query<ListParams>,
) -> Json<Paged<Skill>> {
    let db = state.read().await;
    let items: Vec<Skill> = db
        .skills
        .iter()
        .filter(|s| s.user_id == user && params.matches(s))
        .cloned()
        .collect();
    Json(paginate(items, params.page_number, params.page_size))
}

pub async fn get_one(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Envelope<Skill>>, ApiFailure> {
    let db = state.read().await;
    db.skills
        .iter()
        .find(|s| s.id == id)
        .cloned()
        .map(ok)
        .ok_or_else(|| ApiFailure::not_found("Skill"))
}

pub async fn create(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Json(input): Json<SkillInput>,
) -> Result<(StatusCode, Json<Envelope<Skill>>), ApiFailure> {
    let mut db = state.write().await;
    let (category, proficiency_level) = resolve(&db, &input)?;
    let skill = Skill {
        id: new_id(),
        user_id: user,
        name: input.name.trim().to_string(),
        description: input.description,
        is_offered: input.is_offered,
        category,
        proficiency_level,
        tags: input.tags,
        created_at: now(),
    };
    db.skills.push(skill.clone());
    Ok((StatusCode::CREATED, ok(skill)))
}

pub async fn update(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(id): Path<String>,
    Json(input): Json<SkillInput>,
) -> Result<Json<Envelope<Skill>>, ApiFailure> {
    let mut db = state.write().await;
    let (category, proficiency_level) = resolve(&db, &input)?;
    let skill = db
        .skills
        .iter_mut()
        .find(|s| s.id == id)
        .ok_or_else(|| ApiFailure::not_found("Skill"))?;
    if skill.user_id != user {
        return Err(ApiFailure::forbidden("You can only modify your own skills"));
    }
    skill.name = input.name.trim().to_string();
    skill.description = input.description;
    skill.is_offered = input.is_offered;
    skill.category = category;
    skill.proficiency_level = proficiency_level;
    skill.tags = input.tags;
    Ok(ok(skill.clone()))
}

pub async fn delete(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> Result<Json<Envelope<bool>>, ApiFailure> {
    let mut db = state.write().await;
    let index = db
        .skills
        .iter()
        .position(|s| s.id == id)
        .ok_or_else(|| ApiFailure::not_found("Skill"))?;
    if db.skills[index].user_id != user {
        return Err(ApiFailure::forbidden("You can only delete your own skills"));
    }
    db.skills.remove(index);
    for favorites in db.favorites.values_mut() {
        favorites.retain(|f| *f != id);
    }
    Ok(ok(true))
}

pub async fn favorites(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
) -> Json<Envelope<Vec<String>>> {
    let db = state.read().await;
    ok(db.favorites.get(&user).cloned().unwrap_or_default())
}

pub async fn add_favorite(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> Result<Json<Envelope<bool>>, ApiFailure> {
    let mut db = state.write().await;
    if !db.skills.iter().any(|s| s.id == id) {
        return Err(ApiFailure::not_found("Skill"));
    }
    let favorites = db.favorites.entry(user).or_default();
    if !favorites.contains(&id) {
        favorites.push(id);
    }
    Ok(ok(true))
}

pub async fn remove_favorite(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> Json<Envelope<bool>> {
    let mut db = state.write().await;
    if let Some(favorites) = db.favorites.get_mut(&user) {
        favorites.retain(|f| *f != id);
    }
    ok(true)
}

pub async fn categories(State(state): State<AppState>) -> Json<Envelope<Vec<Category>>> {
    ok(state.read().await.categories.clone())
}

pub async fn create_category(
    State(state): State<AppState>,
    Json(input): Json<CategoryInput>,
) -> Result<(StatusCode, Json<Envelope<Category>>), ApiFailure> {
    let name = input.name.trim();
    if name.is_empty() {
        return Err(ApiFailure::bad_request("Category name is required"));
    }
    let mut db = state.write().await;
    if db.categories.iter().any(|c| c.name.eq_ignore_ascii_case(name)) {
        return Err(ApiFailure::conflict("Category already exists"));
    }
    let category = Category {
        id: new_id(),
        name: name.to_string(),
        description: input.description,
    };
    db.categories.push(category.clone());
    Ok((StatusCode::CREATED, ok(category)))
}

pub async fn update_category(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(input): Json<CategoryInput>,
) -> Result<Json<Envelope<Category>>, ApiFailure> {
    let name = input.name.trim();
    if name.is_empty() {
        return Err(ApiFailure::bad_request("Category name is required"));
    }
    let mut db = state.write().await;
    let category = db
        .categories
        .iter_mut()
        .find(|c| c.id == id)
        .ok_or_else(|| ApiFailure::not_found("Category"))?;
    category.name = name.to_string();
    category.description = input.description;
    Ok(ok(category.clone()))
}

pub async fn delete_category(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Envelope<bool>>, ApiFailure> {
    let mut db = state.write().await;
    if db.skills.iter().any(|s| s.category.id == id) {
        return Err(ApiFailure::conflict("Category is in use"));
    }
    let before = db.categories.len();
    db.categories.retain(|c| c.id != id);
    if db.categories.len() == before {
        return Err(ApiFailure::not_found("Category"));
    }
    Ok(ok(true))
}

pub async fn levels(State(state): State<AppState>) -> Json<Envelope<Vec<ProficiencyLevel>>> {
    ok(state.read().await.proficiency_levels.clone())
}

pub async fn create_level(
    State(state): State<AppState>,
    Json(input): Json<LevelInput>,
) -> Result<(StatusCode, Json<Envelope<ProficiencyLevel>>), ApiFailure> {
    if input.level.trim().is_empty() {
        return Err(ApiFailure::bad_request("Level name is required"));
    }
    let level = ProficiencyLevel {
        id: new_id(),
        level: input.level.trim().to_string(),
        rank: input.rank,
    };
    state.write().await.proficiency_levels.push(level.clone());
    Ok((StatusCode::CREATED, ok(level)))
}

pub async fn update_level(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(input): Json<LevelInput>,
) -> Result<Json<Envelope<ProficiencyLevel>>, ApiFailure> {
    let mut db = state.write().await;
    let level = db
        .proficiency_levels
        .iter_mut()
        .find(|l| l.id == id)
        .ok_or_else(|| ApiFailure::not_found("Proficiency level"))?;
    level.level = input.level.trim().to_string();
    level.rank = input.rank;
    Ok(ok(level.clone()))
}

pub async fn delete_level(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Envelope<bool>>, ApiFailure> {
    let mut db = state.write().await;
    let before = db.proficiency_levels.len();
    db.proficiency_levels.retain(|l| l.id != id);
    if db.proficiency_levels.len() == before {
        return Err(ApiFailure::not_found("Proficiency level"));
    }
    Ok(ok(true))
}
