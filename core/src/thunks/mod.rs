//! Side-effecting action creators.
//!
//! A thunk dispatches a `*Pending` action, performs at most two sequential
//! service calls, maps DTOs through the entity's single mapping function, and
//! dispatches `*Fulfilled` or `*Rejected`. The returned `Result` mirrors what
//! was dispatched so callers can react without re-reading the store.

pub mod appointments;
pub mod matches;
pub mod skills;

pub use appointments::{
    accept_appointment, cancel_appointment, complete_appointment, create_appointment,
    decline_appointment, fetch_appointment, fetch_appointments, generate_meeting_link,
    rate_appointment, report_no_show, reschedule_appointment, respond_to_appointment,
};
pub use matches::{
    accept_match_request, fetch_match_requests, fetch_matches, reject_match_request,
    send_match_request,
};
pub use skills::{
    create_category, create_proficiency_level, create_skill, delete_category,
    delete_proficiency_level, delete_skill, fetch_categories, fetch_favorites, fetch_my_skills,
    fetch_proficiency_levels, fetch_skill, fetch_skills, rate_skill, toggle_favorite,
    update_category, update_proficiency_level, update_skill,
};

use crate::client::ApiClient;
use crate::error::{ApiError, ErrorPayload};
use crate::pagination::{Page, Pagination};
use crate::store::{Action, Store};
use crate::types::PagedResponse;

/// Log a failed call and turn it into the payload stored on the slice.
pub(crate) fn rejected(op: &'static str, err: &ApiError) -> ErrorPayload {
    let payload = ErrorPayload::from(err);
    tracing::warn!(op, kind = ?payload.kind, message = %payload.message, "thunk rejected");
    payload
}

pub(crate) fn map_page<D, T>(page: PagedResponse<D>, map: impl Fn(D) -> T) -> Page<T> {
    let pagination = Pagination::from(&page);
    Page {
        items: page.data.into_iter().map(map).collect(),
        pagination,
    }
}

/// Forget the token and every slice.
pub fn sign_out(store: &mut Store, client: &ApiClient) {
    client.session().sign_out();
    store.dispatch(Action::Reset);
}
