use super::{map_page, rejected};
use crate::error::ErrorPayload;
use crate::pagination::Page;
use crate::services::{SkillQuery, SkillService};
use crate::store::{SkillAction as A, Store};
use crate::types::{
    map_skill, CategoryInput, ProficiencyLevel, ProficiencyLevelInput, Skill, SkillCategory,
    SkillInput,
};

pub fn fetch_skills(
    store: &mut Store,
    service: &SkillService,
    query: &SkillQuery,
) -> Result<Page<Skill>, ErrorPayload> {
    let request_id = store.next_request_id();
    store.dispatch(A::ListPending { request_id });
    match service.list(query) {
        Ok(page) => {
            let page = map_page(page, map_skill);
            store.dispatch(A::ListFulfilled { request_id, page: page.clone() });
            Ok(page)
        }
        Err(err) => {
            let error = rejected("fetch_skills", &err);
            store.dispatch(A::ListRejected { request_id, error: error.clone() });
            Err(error)
        }
    }
}

pub fn fetch_my_skills(
    store: &mut Store,
    service: &SkillService,
    query: &SkillQuery,
) -> Result<Page<Skill>, ErrorPayload> {
    store.dispatch(A::MinePending);
    match service.list_mine(query) {
        Ok(page) => {
            let page = map_page(page, map_skill);
            store.dispatch(A::MineFulfilled(page.clone()));
            Ok(page)
        }
        Err(err) => {
            let error = rejected("fetch_my_skills", &err);
            store.dispatch(A::MineRejected(error.clone()));
            Err(error)
        }
    }
}

pub fn fetch_skill(store: &mut Store, service: &SkillService, id: &str) -> Result<Skill, ErrorPayload> {
    store.dispatch(A::DetailPending);
    match service.get(id).map(map_skill) {
        Ok(skill) => {
            store.dispatch(A::DetailFulfilled(skill.clone()));
            Ok(skill)
        }
        Err(err) => {
            let error = rejected("fetch_skill", &err);
            store.dispatch(A::DetailRejected(error.clone()));
            Err(error)
        }
    }
}

pub fn create_skill(
    store: &mut Store,
    service: &SkillService,
    input: &SkillInput,
) -> Result<Skill, ErrorPayload> {
    store.dispatch(A::MutationPending);
    match service.create(input).map(map_skill) {
        Ok(skill) => {
            store.dispatch(A::Created(skill.clone()));
            Ok(skill)
        }
        Err(err) => {
            let error = rejected("create_skill", &err);
            store.dispatch(A::MutationRejected(error.clone()));
            Err(error)
        }
    }
}

pub fn update_skill(
    store: &mut Store,
    service: &SkillService,
    id: &str,
    input: &SkillInput,
) -> Result<Skill, ErrorPayload> {
    store.dispatch(A::MutationPending);
    match service.update(id, input).map(map_skill) {
        Ok(skill) => {
            store.dispatch(A::Updated(skill.clone()));
            Ok(skill)
        }
        Err(err) => {
            let error = rejected("update_skill", &err);
            store.dispatch(A::MutationRejected(error.clone()));
            Err(error)
        }
    }
}

pub fn delete_skill(store: &mut Store, service: &SkillService, id: &str) -> Result<(), ErrorPayload> {
    store.dispatch(A::MutationPending);
    match service.delete(id) {
        Ok(()) => {
            store.dispatch(A::Deleted { id: id.to_string() });
            Ok(())
        }
        Err(err) => {
            let error = rejected("delete_skill", &err);
            store.dispatch(A::MutationRejected(error.clone()));
            Err(error)
        }
    }
}

pub fn fetch_favorites(store: &mut Store, service: &SkillService) -> Result<Vec<String>, ErrorPayload> {
    store.dispatch(A::FavoritesPending);
    match service.favorites() {
        Ok(ids) => {
            store.dispatch(A::FavoritesFulfilled(ids.clone()));
            Ok(ids)
        }
        Err(err) => {
            let error = rejected("fetch_favorites", &err);
            store.dispatch(A::FavoritesRejected(error.clone()));
            Err(error)
        }
    }
}

/// Flip the favorite flag optimistically; the previous value comes back if
/// the server refuses.
pub fn toggle_favorite(store: &mut Store, service: &SkillService, id: &str) -> Result<bool, ErrorPayload> {
    let favorite = !store.skills.is_favorite(id);
    store.dispatch(A::FavoritePending { id: id.to_string(), favorite });
    match service.set_favorite(id, favorite) {
        Ok(()) => {
            store.dispatch(A::FavoriteFulfilled { id: id.to_string() });
            Ok(favorite)
        }
        Err(err) => {
            let error = rejected("toggle_favorite", &err);
            store.dispatch(A::FavoriteRejected { id: id.to_string(), error: error.clone() });
            Err(error)
        }
    }
}

pub fn rate_skill(
    store: &mut Store,
    service: &SkillService,
    id: &str,
    rating: u8,
) -> Result<(), ErrorPayload> {
    match service.rate_skill(id, rating) {
        Ok(()) => Ok(()),
        Err(err) => {
            let error = rejected("rate_skill", &err);
            store.dispatch(A::MutationRejected(error.clone()));
            Err(error)
        }
    }
}

pub fn fetch_categories(
    store: &mut Store,
    service: &SkillService,
) -> Result<Vec<SkillCategory>, ErrorPayload> {
    store.dispatch(A::CatalogPending);
    match service.categories() {
        Ok(dtos) => {
            let categories: Vec<SkillCategory> = dtos.into_iter().map(SkillCategory::from).collect();
            store.dispatch(A::CategoriesFulfilled(categories.clone()));
            Ok(categories)
        }
        Err(err) => {
            let error = rejected("fetch_categories", &err);
            store.dispatch(A::CatalogRejected(error.clone()));
            Err(error)
        }
    }
}

pub fn create_category(
    store: &mut Store,
    service: &SkillService,
    input: &CategoryInput,
) -> Result<SkillCategory, ErrorPayload> {
    store.dispatch(A::CatalogPending);
    match service.create_category(input).map(SkillCategory::from) {
        Ok(category) => {
            store.dispatch(A::CategoryUpserted(category.clone()));
            Ok(category)
        }
        Err(err) => {
            let error = rejected("create_category", &err);
            store.dispatch(A::CatalogRejected(error.clone()));
            Err(error)
        }
    }
}

pub fn update_category(
    store: &mut Store,
    service: &SkillService,
    id: &str,
    input: &CategoryInput,
) -> Result<SkillCategory, ErrorPayload> {
    store.dispatch(A::CatalogPending);
    match service.update_category(id, input).map(SkillCategory::from) {
        Ok(category) => {
            store.dispatch(A::CategoryUpserted(category.clone()));
            Ok(category)
        }
        Err(err) => {
            let error = rejected("update_category", &err);
            store.dispatch(A::CatalogRejected(error.clone()));
            Err(error)
        }
    }
}

pub fn delete_category(store: &mut Store, service: &SkillService, id: &str) -> Result<(), ErrorPayload> {
    store.dispatch(A::CatalogPending);
    match service.delete_category(id) {
        Ok(()) => {
            store.dispatch(A::CategoryRemoved { id: id.to_string() });
            Ok(())
        }
        Err(err) => {
            let error = rejected("delete_category", &err);
            store.dispatch(A::CatalogRejected(error.clone()));
            Err(error)
        }
    }
}

pub fn fetch_proficiency_levels(
    store: &mut Store,
    service: &SkillService,
) -> Result<Vec<ProficiencyLevel>, ErrorPayload> {
    store.dispatch(A::CatalogPending);
    match service.proficiency_levels() {
        Ok(dtos) => {
            let levels: Vec<ProficiencyLevel> = dtos.into_iter().map(ProficiencyLevel::from).collect();
            store.dispatch(A::LevelsFulfilled(levels.clone()));
            Ok(levels)
        }
        Err(err) => {
            let error = rejected("fetch_proficiency_levels", &err);
            store.dispatch(A::CatalogRejected(error.clone()));
            Err(error)
        }
    }
}

pub fn create_proficiency_level(
    store: &mut Store,
    service: &SkillService,
    input: &ProficiencyLevelInput,
) -> Result<ProficiencyLevel, ErrorPayload> {
    store.dispatch(A::CatalogPending);
    match service.create_proficiency_level(input).map(ProficiencyLevel::from) {
        Ok(level) => {
            store.dispatch(A::LevelUpserted(level.clone()));
            Ok(level)
        }
        Err(err) => {
            let error = rejected("create_proficiency_level", &err);
            store.dispatch(A::CatalogRejected(error.clone()));
            Err(error)
        }
    }
}

pub fn update_proficiency_level(
    store: &mut Store,
    service: &SkillService,
    id: &str,
    input: &ProficiencyLevelInput,
) -> Result<ProficiencyLevel, ErrorPayload> {
    store.dispatch(A::CatalogPending);
    match service.update_proficiency_level(id, input).map(ProficiencyLevel::from) {
        Ok(level) => {
            store.dispatch(A::LevelUpserted(level.clone()));
            Ok(level)
        }
        Err(err) => {
            let error = rejected("update_proficiency_level", &err);
            store.dispatch(A::CatalogRejected(error.clone()));
            Err(error)
        }
    }
}

pub fn delete_proficiency_level(
    store: &mut Store,
    service: &SkillService,
    id: &str,
) -> Result<(), ErrorPayload> {
    store.dispatch(A::CatalogPending);
    match service.delete_proficiency_level(id) {
        Ok(()) => {
            store.dispatch(A::LevelRemoved { id: id.to_string() });
            Ok(())
        }
        Err(err) => {
            let error = rejected("delete_proficiency_level", &err);
            store.dispatch(A::CatalogRejected(error.clone()));
            Err(error)
        }
    }
}
