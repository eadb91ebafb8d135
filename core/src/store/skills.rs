use std::collections::{BTreeSet, HashMap};

use super::{contains_ci, remove_by_id, replace_existing, upsert, Operation, PendingChange, RequestId};
use crate::error::ErrorPayload;
use crate::pagination::{Page, Pagination};
use crate::types::{ProficiencyLevel, Skill, SkillCategory, SkillDirection};

#[derive(Debug, Clone, PartialEq)]
pub enum SkillAction {
    ListPending { request_id: RequestId },
    ListFulfilled { request_id: RequestId, page: Page<Skill> },
    ListRejected { request_id: RequestId, error: ErrorPayload },

    MinePending,
    MineFulfilled(Page<Skill>),
    MineRejected(ErrorPayload),

    DetailPending,
    DetailFulfilled(Skill),
    DetailRejected(ErrorPayload),

    MutationPending,
    Created(Skill),
    Updated(Skill),
    Deleted { id: String },
    MutationRejected(ErrorPayload),

    CatalogPending,
    CategoriesFulfilled(Vec<SkillCategory>),
    CategoryUpserted(SkillCategory),
    CategoryRemoved { id: String },
    LevelsFulfilled(Vec<ProficiencyLevel>),
    LevelUpserted(ProficiencyLevel),
    LevelRemoved { id: String },
    CatalogRejected(ErrorPayload),

    FavoritesPending,
    FavoritesFulfilled(Vec<String>),
    FavoritesRejected(ErrorPayload),
    /// Optimistic favorite toggle.
    FavoritePending { id: String, favorite: bool },
    FavoriteFulfilled { id: String },
    FavoriteRejected { id: String, error: ErrorPayload },

    ClearErrors,
}

#[derive(Debug, Clone, Default)]
pub struct SkillState {
    pub items: Vec<Skill>,
    pub mine: Vec<Skill>,
    pub current: Option<Skill>,
    pub categories: Vec<SkillCategory>,
    pub proficiency_levels: Vec<ProficiencyLevel>,
    pub favorites: BTreeSet<String>,
    pub pagination: Pagination,
    pub mine_pagination: Pagination,
    pub list: Operation,
    pub mine_list: Operation,
    pub detail: Operation,
    pub mutation: Operation,
    pub catalog: Operation,
    pub favorite: Operation,
    pending_favorites: HashMap<String, PendingChange<bool>>,
    latest_list_request: Option<RequestId>,
}

impl SkillState {
    pub fn reduce(&mut self, action: SkillAction) {
        use SkillAction as A;
        match action {
            A::ListPending { request_id } => {
                self.latest_list_request = Some(request_id);
                self.list.start();
            }
            A::ListFulfilled { request_id, page } => {
                if self.latest_list_request != Some(request_id) {
                    tracing::debug!(?request_id, "dropping stale skill list");
                    return;
                }
                self.items = page.items;
                self.pagination = page.pagination;
                self.sync_favorite_flags();
                self.list.succeed();
            }
            A::ListRejected { request_id, error } => {
                if self.latest_list_request == Some(request_id) {
                    self.list.fail(error);
                }
            }

            A::MinePending => self.mine_list.start(),
            A::MineFulfilled(page) => {
                self.mine = page.items;
                self.mine_pagination = page.pagination;
                self.sync_favorite_flags();
                self.mine_list.succeed();
            }
            A::MineRejected(error) => self.mine_list.fail(error),

            A::DetailPending => self.detail.start(),
            A::DetailFulfilled(mut skill) => {
                skill.is_favorite = self.favorites.contains(&skill.id) || skill.is_favorite;
                replace_existing(&mut self.items, &skill);
                self.current = Some(skill);
                self.detail.succeed();
            }
            A::DetailRejected(error) => self.detail.fail(error),

            A::MutationPending => self.mutation.start(),
            A::Created(skill) => {
                upsert(&mut self.mine, skill.clone());
                self.mine_pagination.total_records += 1;
                self.items.insert(0, skill);
                self.mutation.succeed();
            }
            A::Updated(skill) => {
                replace_existing(&mut self.items, &skill);
                replace_existing(&mut self.mine, &skill);
                if self.current.as_ref().is_some_and(|c| c.id == skill.id) {
                    self.current = Some(skill);
                }
                self.mutation.succeed();
            }
            A::Deleted { id } => {
                if remove_by_id(&mut self.items, &id).is_some() {
                    self.pagination.total_records = self.pagination.total_records.saturating_sub(1);
                }
                if remove_by_id(&mut self.mine, &id).is_some() {
                    self.mine_pagination.total_records =
                        self.mine_pagination.total_records.saturating_sub(1);
                }
                self.favorites.remove(&id);
                if self.current.as_ref().is_some_and(|c| c.id == id) {
                    self.current = None;
                }
                self.mutation.succeed();
            }
            A::MutationRejected(error) => self.mutation.fail(error),

            A::CatalogPending => self.catalog.start(),
            A::CategoriesFulfilled(categories) => {
                self.categories = categories;
                self.catalog.succeed();
            }
            A::CategoryUpserted(category) => {
                match self.categories.iter_mut().find(|c| c.id == category.id) {
                    Some(slot) => *slot = category,
                    None => self.categories.push(category),
                }
                self.catalog.succeed();
            }
            A::CategoryRemoved { id } => {
                self.categories.retain(|c| c.id != id);
                self.catalog.succeed();
            }
            A::LevelsFulfilled(mut levels) => {
                levels.sort_by_key(|l| l.rank);
                self.proficiency_levels = levels;
                self.catalog.succeed();
            }
            A::LevelUpserted(level) => {
                match self.proficiency_levels.iter_mut().find(|l| l.id == level.id) {
                    Some(slot) => *slot = level,
                    None => self.proficiency_levels.push(level),
                }
                self.proficiency_levels.sort_by_key(|l| l.rank);
                self.catalog.succeed();
            }
            A::LevelRemoved { id } => {
                self.proficiency_levels.retain(|l| l.id != id);
                self.catalog.succeed();
            }
            A::CatalogRejected(error) => self.catalog.fail(error),

            A::FavoritesPending => self.favorite.start(),
            A::FavoritesFulfilled(ids) => {
                self.favorites = ids.into_iter().collect();
                // toggles still in flight win over the fetched set
                let pending: Vec<(String, bool)> = self
                    .pending_favorites
                    .iter()
                    .map(|(id, change)| (id.clone(), change.requested))
                    .collect();
                for (id, favorite) in pending {
                    if favorite {
                        self.favorites.insert(id);
                    } else {
                        self.favorites.remove(&id);
                    }
                }
                self.sync_favorite_flags();
                self.favorite.succeed();
            }
            A::FavoritesRejected(error) => self.favorite.fail(error),
            A::FavoritePending { id, favorite } => {
                self.favorite.start();
                let previous = self.is_favorite(&id);
                self.pending_favorites
                    .entry(id.clone())
                    .and_modify(|p| p.requested = favorite)
                    .or_insert(PendingChange { previous, requested: favorite });
                self.set_favorite(&id, favorite);
            }
            A::FavoriteFulfilled { id } => {
                self.pending_favorites.remove(&id);
                self.favorite.succeed();
            }
            A::FavoriteRejected { id, error } => {
                if let Some(change) = self.pending_favorites.remove(&id) {
                    self.set_favorite(&id, change.previous);
                }
                self.favorite.fail(error);
            }

            A::ClearErrors => {
                for op in [
                    &mut self.list,
                    &mut self.mine_list,
                    &mut self.detail,
                    &mut self.mutation,
                    &mut self.catalog,
                    &mut self.favorite,
                ] {
                    op.error = None;
                }
            }
        }
    }

    fn set_favorite(&mut self, id: &str, favorite: bool) {
        if favorite {
            self.favorites.insert(id.to_string());
        } else {
            self.favorites.remove(id);
        }
        for skill in self
            .items
            .iter_mut()
            .chain(self.mine.iter_mut())
            .chain(self.current.iter_mut())
        {
            if skill.id == id {
                skill.is_favorite = favorite;
            }
        }
    }

    /// The favorites set is authoritative for every held skill.
    fn sync_favorite_flags(&mut self) {
        let favorites = &self.favorites;
        for skill in self
            .items
            .iter_mut()
            .chain(self.mine.iter_mut())
            .chain(self.current.iter_mut())
        {
            skill.is_favorite = favorites.contains(&skill.id);
        }
    }

    // --- selectors ---

    pub fn is_favorite(&self, id: &str) -> bool {
        self.favorites.contains(id)
    }

    pub fn by_id(&self, id: &str) -> Option<&Skill> {
        self.items
            .iter()
            .chain(self.mine.iter())
            .find(|s| s.id == id)
    }

    pub fn favorite_skills(&self) -> Vec<&Skill> {
        self.items.iter().filter(|s| self.is_favorite(&s.id)).collect()
    }

    pub fn select(&self, filter: &SkillFilter) -> Vec<Skill> {
        self.items
            .iter()
            .filter(|s| filter.matches(s))
            .cloned()
            .collect()
    }
}

/// Client-side filter over one fetched page of skills.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SkillFilter {
    pub search: Option<String>,
    pub category_id: Option<String>,
    pub direction: Option<SkillDirection>,
}

impl SkillFilter {
    pub fn matches(&self, skill: &Skill) -> bool {
        if self.direction.is_some_and(|d| d != skill.direction) {
            return false;
        }
        if let Some(category) = self.category_id.as_deref().filter(|c| !c.is_empty()) {
            if skill.category.id != category {
                return false;
            }
        }
        match self.search.as_deref().map(str::trim) {
            Some(term) if !term.is_empty() => {
                let term = term.to_lowercase();
                contains_ci(&skill.name, &term)
                    || contains_ci(&skill.description, &term)
                    || contains_ci(&skill.category.name, &term)
                    || skill.tags.iter().any(|t| contains_ci(t, &term))
            }
            _ => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use pretty_assertions::assert_eq;

    fn skill(id: &str, name: &str, direction: SkillDirection, category: &str) -> Skill {
        Skill {
            id: id.to_string(),
            user_id: "u1".to_string(),
            name: name.to_string(),
            description: String::new(),
            category: SkillCategory {
                id: category.to_string(),
                name: category.to_uppercase(),
                description: None,
            },
            proficiency_level: None,
            tags: vec!["weekend".to_string()],
            direction,
            is_favorite: false,
            created_at: None,
        }
    }

    fn loaded(items: Vec<Skill>) -> SkillState {
        let mut state = SkillState::default();
        state.reduce(SkillAction::ListPending { request_id: RequestId(1) });
        state.reduce(SkillAction::ListFulfilled {
            request_id: RequestId(1),
            page: Page { items, pagination: Pagination::default() },
        });
        state
    }

    #[test]
    fn favorite_toggle_reverts_on_rejection() {
        let mut state = loaded(vec![skill("s1", "Rust", SkillDirection::Offering, "c1")]);
        state.reduce(SkillAction::FavoritePending { id: "s1".to_string(), favorite: true });
        assert!(state.is_favorite("s1"));
        assert!(state.items[0].is_favorite);

        state.reduce(SkillAction::FavoriteRejected {
            id: "s1".to_string(),
            error: ErrorPayload {
                kind: ErrorKind::Network,
                message: "offline".to_string(),
                status: None,
            },
        });
        assert!(!state.is_favorite("s1"));
        assert!(!state.items[0].is_favorite);
        assert_eq!(state.favorite.error.as_ref().unwrap().message, "offline");
    }

    #[test]
    fn favorites_set_drives_flags_on_fresh_pages() {
        let mut state = SkillState::default();
        state.reduce(SkillAction::FavoritesFulfilled(vec!["s2".to_string()]));
        state.reduce(SkillAction::ListPending { request_id: RequestId(3) });
        state.reduce(SkillAction::ListFulfilled {
            request_id: RequestId(3),
            page: Page {
                items: vec![
                    skill("s1", "Rust", SkillDirection::Offering, "c1"),
                    skill("s2", "Go", SkillDirection::Offering, "c1"),
                ],
                pagination: Pagination::default(),
            },
        });
        assert_eq!(
            state.favorite_skills().iter().map(|s| s.id.as_str()).collect::<Vec<_>>(),
            vec!["s2"]
        );
        assert!(!state.items[0].is_favorite);
    }

    #[test]
    fn create_update_delete() {
        let mut state = loaded(vec![skill("s1", "Rust", SkillDirection::Offering, "c1")]);
        state.reduce(SkillAction::Created(skill("s2", "Piano", SkillDirection::Seeking, "c2")));
        assert_eq!(state.items[0].id, "s2");
        assert_eq!(state.mine.len(), 1);

        let mut renamed = skill("s2", "Grand piano", SkillDirection::Seeking, "c2");
        renamed.description = "classical".to_string();
        state.reduce(SkillAction::Updated(renamed.clone()));
        assert_eq!(state.by_id("s2"), Some(&renamed));

        state.reduce(SkillAction::Deleted { id: "s2".to_string() });
        assert!(state.by_id("s2").is_none());
        assert!(state.mine.is_empty());
    }

    #[test]
    fn levels_sorted_by_rank() {
        let mut state = SkillState::default();
        let level = |id: &str, rank| ProficiencyLevel {
            id: id.to_string(),
            level: id.to_uppercase(),
            rank,
        };
        state.reduce(SkillAction::LevelsFulfilled(vec![level("expert", 3), level("beginner", 1)]));
        state.reduce(SkillAction::LevelUpserted(level("intermediate", 2)));
        let ids: Vec<&str> = state.proficiency_levels.iter().map(|l| l.id.as_str()).collect();
        assert_eq!(ids, vec!["beginner", "intermediate", "expert"]);
    }

    #[test]
    fn filter_by_direction_category_and_search() {
        let state = loaded(vec![
            skill("s1", "Rust", SkillDirection::Offering, "code"),
            skill("s2", "Piano", SkillDirection::Seeking, "music"),
            skill("s3", "Go", SkillDirection::Offering, "code"),
        ]);
        let offered_code = SkillFilter {
            direction: Some(SkillDirection::Offering),
            category_id: Some("code".to_string()),
            ..SkillFilter::default()
        };
        assert_eq!(state.select(&offered_code).len(), 2);

        let by_category_name = SkillFilter {
            search: Some("MUSIC".to_string()),
            ..SkillFilter::default()
        };
        let hits = state.select(&by_category_name);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, "s2");

        let by_tag = SkillFilter {
            search: Some("weekend".to_string()),
            ..SkillFilter::default()
        };
        assert_eq!(state.select(&by_tag).len(), 3);
    }
}
