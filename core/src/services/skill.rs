use super::segment;
use crate::client::ApiClient;
use crate::error::{require_id, require_rating, ApiError};
use crate::http::{HttpMethod, HttpRequest, QueryString};
use crate::pagination::DEFAULT_PAGE_SIZE;
use crate::types::{
    CategoryDto, CategoryInput, PagedResponse, ProficiencyLevelDto, ProficiencyLevelInput,
    SkillDirection, SkillDto, SkillInput,
};

/// Filters for `GET /skills` and `GET /skills/me`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkillQuery {
    pub page_number: u32,
    pub page_size: u32,
    pub search_term: Option<String>,
    pub category_id: Option<String>,
    pub direction: Option<SkillDirection>,
    pub proficiency_level_id: Option<String>,
}

impl Default for SkillQuery {
    fn default() -> Self {
        Self {
            page_number: 1,
            page_size: DEFAULT_PAGE_SIZE,
            search_term: None,
            category_id: None,
            direction: None,
            proficiency_level_id: None,
        }
    }
}

impl SkillQuery {
    fn to_query(&self) -> QueryString {
        QueryString::new()
            .push("pageNumber", self.page_number.max(1))
            .push("pageSize", self.page_size.max(1))
            .push_opt("searchTerm", self.search_term.as_deref().map(str::trim))
            .push_opt("categoryId", self.category_id.as_deref())
            .push_opt("isOffered", self.direction.map(SkillDirection::is_offered))
            .push_opt("proficiencyLevelId", self.proficiency_level_id.as_deref())
    }
}

#[derive(Debug, Clone)]
pub struct SkillService {
    client: ApiClient,
}

impl SkillService {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub fn build_list(&self, query: &SkillQuery) -> HttpRequest {
        self.client.build(HttpMethod::Get, "/skills", query.to_query())
    }

    pub fn list(&self, query: &SkillQuery) -> Result<PagedResponse<SkillDto>, ApiError> {
        self.client.fetch_page(self.build_list(query))
    }

    pub fn build_list_mine(&self, query: &SkillQuery) -> HttpRequest {
        self.client.build(HttpMethod::Get, "/skills/me", query.to_query())
    }

    pub fn list_mine(&self, query: &SkillQuery) -> Result<PagedResponse<SkillDto>, ApiError> {
        self.client.fetch_page(self.build_list_mine(query))
    }

    pub fn build_get(&self, id: &str) -> Result<HttpRequest, ApiError> {
        let id = require_id("Skill ID", id)?;
        Ok(self.client.build(
            HttpMethod::Get,
            &format!("/skills/{}", segment(id)),
            QueryString::new(),
        ))
    }

    pub fn get(&self, id: &str) -> Result<SkillDto, ApiError> {
        self.client.fetch_data(self.build_get(id)?)
    }

    pub fn build_create(&self, input: &SkillInput) -> Result<HttpRequest, ApiError> {
        input.validate()?;
        self.client.build_json(HttpMethod::Post, "/skills", input)
    }

    pub fn create(&self, input: &SkillInput) -> Result<SkillDto, ApiError> {
        self.client.fetch_data(self.build_create(input)?)
    }

    pub fn build_update(&self, id: &str, input: &SkillInput) -> Result<HttpRequest, ApiError> {
        let id = require_id("Skill ID", id)?;
        input.validate()?;
        self.client
            .build_json(HttpMethod::Put, &format!("/skills/{}", segment(id)), input)
    }

    pub fn update(&self, id: &str, input: &SkillInput) -> Result<SkillDto, ApiError> {
        self.client.fetch_data(self.build_update(id, input)?)
    }

    pub fn build_delete(&self, id: &str) -> Result<HttpRequest, ApiError> {
        let id = require_id("Skill ID", id)?;
        Ok(self.client.build(
            HttpMethod::Delete,
            &format!("/skills/{}", segment(id)),
            QueryString::new(),
        ))
    }

    pub fn delete(&self, id: &str) -> Result<(), ApiError> {
        self.client.fetch_ack(self.build_delete(id)?)
    }

    pub fn build_favorites(&self) -> HttpRequest {
        self.client
            .build(HttpMethod::Get, "/skills/favorites", QueryString::new())
    }

    /// Ids of the current user's favorite skills.
    pub fn favorites(&self) -> Result<Vec<String>, ApiError> {
        self.client.fetch_data(self.build_favorites())
    }

    pub fn build_set_favorite(&self, id: &str, favorite: bool) -> Result<HttpRequest, ApiError> {
        let id = require_id("Skill ID", id)?;
        let method = if favorite { HttpMethod::Post } else { HttpMethod::Delete };
        Ok(self.client.build(
            method,
            &format!("/skills/favorites/{}", segment(id)),
            QueryString::new(),
        ))
    }

    pub fn set_favorite(&self, id: &str, favorite: bool) -> Result<(), ApiError> {
        self.client.fetch_ack(self.build_set_favorite(id, favorite)?)
    }

    pub fn rate_skill(&self, id: &str, rating: u8) -> Result<(), ApiError> {
        require_id("Skill ID", id)?;
        require_rating(rating)?;
        Err(ApiError::NotImplemented("Rating skills"))
    }

    // --- categories ---

    pub fn build_categories(&self) -> HttpRequest {
        self.client.build(HttpMethod::Get, "/categories", QueryString::new())
    }

    pub fn categories(&self) -> Result<Vec<CategoryDto>, ApiError> {
        self.client.fetch_data(self.build_categories())
    }

    pub fn build_create_category(&self, input: &CategoryInput) -> Result<HttpRequest, ApiError> {
        if input.name.trim().is_empty() {
            return Err(ApiError::Validation("Category name is required".to_string()));
        }
        self.client.build_json(HttpMethod::Post, "/categories", input)
    }

    pub fn create_category(&self, input: &CategoryInput) -> Result<CategoryDto, ApiError> {
        self.client.fetch_data(self.build_create_category(input)?)
    }

    pub fn build_update_category(&self, id: &str, input: &CategoryInput) -> Result<HttpRequest, ApiError> {
        let id = require_id("Category ID", id)?;
        if input.name.trim().is_empty() {
            return Err(ApiError::Validation("Category name is required".to_string()));
        }
        self.client
            .build_json(HttpMethod::Put, &format!("/categories/{}", segment(id)), input)
    }

    pub fn update_category(&self, id: &str, input: &CategoryInput) -> Result<CategoryDto, ApiError> {
        self.client.fetch_data(self.build_update_category(id, input)?)
    }

    pub fn build_delete_category(&self, id: &str) -> Result<HttpRequest, ApiError> {
        let id = require_id("Category ID", id)?;
        Ok(self.client.build(
            HttpMethod::Delete,
            &format!("/categories/{}", segment(id)),
            QueryString::new(),
        ))
    }

    pub fn delete_category(&self, id: &str) -> Result<(), ApiError> {
        self.client.fetch_ack(self.build_delete_category(id)?)
    }

    // --- proficiency levels ---

    pub fn build_proficiency_levels(&self) -> HttpRequest {
        self.client
            .build(HttpMethod::Get, "/proficiency-levels", QueryString::new())
    }

    pub fn proficiency_levels(&self) -> Result<Vec<ProficiencyLevelDto>, ApiError> {
        self.client.fetch_data(self.build_proficiency_levels())
    }

    fn check_level(input: &ProficiencyLevelInput) -> Result<(), ApiError> {
        if input.level.trim().is_empty() {
            return Err(ApiError::Validation("Level name is required".to_string()));
        }
        Ok(())
    }

    pub fn build_create_proficiency_level(&self, input: &ProficiencyLevelInput) -> Result<HttpRequest, ApiError> {
        Self::check_level(input)?;
        self.client
            .build_json(HttpMethod::Post, "/proficiency-levels", input)
    }

    pub fn create_proficiency_level(&self, input: &ProficiencyLevelInput) -> Result<ProficiencyLevelDto, ApiError> {
        self.client
            .fetch_data(self.build_create_proficiency_level(input)?)
    }

    pub fn build_update_proficiency_level(
        &self,
        id: &str,
        input: &ProficiencyLevelInput,
    ) -> Result<HttpRequest, ApiError> {
        let id = require_id("Proficiency level ID", id)?;
        Self::check_level(input)?;
        self.client.build_json(
            HttpMethod::Put,
            &format!("/proficiency-levels/{}", segment(id)),
            input,
        )
    }

    pub fn update_proficiency_level(
        &self,
        id: &str,
        input: &ProficiencyLevelInput,
    ) -> Result<ProficiencyLevelDto, ApiError> {
        self.client
            .fetch_data(self.build_update_proficiency_level(id, input)?)
    }

    pub fn build_delete_proficiency_level(&self, id: &str) -> Result<HttpRequest, ApiError> {
        let id = require_id("Proficiency level ID", id)?;
        Ok(self.client.build(
            HttpMethod::Delete,
            &format!("/proficiency-levels/{}", segment(id)),
            QueryString::new(),
        ))
    }

    pub fn delete_proficiency_level(&self, id: &str) -> Result<(), ApiError> {
        self.client
            .fetch_ack(self.build_delete_proficiency_level(id)?)
    }
}
