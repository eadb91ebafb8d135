//! Application state: one slice per resource, driven by plain actions.
//!
//! # Design
//! Slices are mutated only through their `reduce` method. Thunks are the sole
//! producers of actions that carry server data; hosts read state directly and
//! derive views through the selectors each slice exposes.

pub mod appointments;
pub mod matches;
pub mod skills;

use serde::{Deserialize, Serialize};

use crate::error::ErrorPayload;
use crate::types::{Appointment, Match, Skill};

pub use appointments::{AppointmentAction, AppointmentFilter, AppointmentState, AppointmentTab};
pub use matches::{MatchAction, MatchState};
pub use skills::{SkillAction, SkillFilter, SkillState};

/// Loading/error flags for one kind of request on a slice.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Operation {
    pub loading: bool,
    pub error: Option<ErrorPayload>,
}

impl Operation {
    pub(crate) fn start(&mut self) {
        self.loading = true;
        self.error = None;
    }

    pub(crate) fn succeed(&mut self) {
        self.loading = false;
        self.error = None;
    }

    pub(crate) fn fail(&mut self, error: ErrorPayload) {
        self.loading = false;
        self.error = Some(error);
    }
}

/// Shadow of an optimistic change: what to restore if the server refuses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingChange<T> {
    pub previous: T,
    pub requested: T,
}

/// Tags a list fetch so only the newest one may land.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RequestId(u64);

pub(crate) trait Entity {
    fn id(&self) -> &str;
}

impl Entity for Appointment {
    fn id(&self) -> &str {
        &self.id
    }
}

impl Entity for Skill {
    fn id(&self) -> &str {
        &self.id
    }
}

impl Entity for Match {
    fn id(&self) -> &str {
        &self.id
    }
}

/// Replace the item with the same id, or append. Returns true on replace.
pub(crate) fn upsert<T: Entity>(items: &mut Vec<T>, item: T) -> bool {
    match items.iter_mut().find(|existing| existing.id() == item.id()) {
        Some(slot) => {
            *slot = item;
            true
        }
        None => {
            items.push(item);
            false
        }
    }
}

/// Replace the item with the same id; leave the list alone otherwise.
pub(crate) fn replace_existing<T: Entity>(items: &mut [T], item: &T)
where
    T: Clone,
{
    if let Some(slot) = items.iter_mut().find(|existing| existing.id() == item.id()) {
        *slot = item.clone();
    }
}

pub(crate) fn remove_by_id<T: Entity>(items: &mut Vec<T>, id: &str) -> Option<T> {
    let index = items.iter().position(|item| item.id() == id)?;
    Some(items.remove(index))
}

pub(crate) fn contains_ci(haystack: &str, needle_lower: &str) -> bool {
    haystack.to_lowercase().contains(needle_lower)
}

#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    Appointments(AppointmentAction),
    Skills(SkillAction),
    Matches(MatchAction),
    /// Drop everything, e.g. after sign-out.
    Reset,
}

impl From<AppointmentAction> for Action {
    fn from(action: AppointmentAction) -> Self {
        Action::Appointments(action)
    }
}

impl From<SkillAction> for Action {
    fn from(action: SkillAction) -> Self {
        Action::Skills(action)
    }
}

impl From<MatchAction> for Action {
    fn from(action: MatchAction) -> Self {
        Action::Matches(action)
    }
}

#[derive(Debug, Clone, Default)]
pub struct Store {
    pub appointments: AppointmentState,
    pub skills: SkillState,
    pub matches: MatchState,
    last_request: u64,
}

impl Store {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn dispatch(&mut self, action: impl Into<Action>) {
        let action = action.into();
        tracing::trace!(?action, "dispatch");
        match action {
            Action::Appointments(a) => self.appointments.reduce(a),
            Action::Skills(a) => self.skills.reduce(a),
            Action::Matches(a) => self.matches.reduce(a),
            Action::Reset => {
                let last_request = self.last_request;
                *self = Self {
                    last_request,
                    ..Self::default()
                };
            }
        }
    }

    pub fn next_request_id(&mut self) -> RequestId {
        self.last_request += 1;
        RequestId(self.last_request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn operation_transitions() {
        let mut op = Operation::default();
        op.start();
        assert!(op.loading);
        op.fail(ErrorPayload {
            kind: ErrorKind::Network,
            message: "offline".to_string(),
            status: None,
        });
        assert!(!op.loading);
        assert_eq!(op.error.as_ref().unwrap().message, "offline");
        op.start();
        assert!(op.error.is_none());
        op.succeed();
        assert_eq!(op, Operation::default());
    }

    #[test]
    fn request_ids_increase_across_reset() {
        let mut store = Store::new();
        let a = store.next_request_id();
        store.dispatch(Action::Reset);
        let b = store.next_request_id();
        assert!(b > a);
    }
}
