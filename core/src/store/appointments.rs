use std::collections::HashMap;

use chrono::{DateTime, Utc};

use super::{contains_ci, remove_by_id, replace_existing, Operation, PendingChange, RequestId};
use crate::error::ErrorPayload;
use crate::pagination::{Page, PageControls, Pagination};
use crate::types::{Appointment, AppointmentStatus};

#[derive(Debug, Clone, PartialEq)]
pub enum AppointmentAction {
    ListPending { request_id: RequestId },
    ListFulfilled { request_id: RequestId, page: Page<Appointment> },
    ListRejected { request_id: RequestId, error: ErrorPayload },

    DetailPending,
    DetailFulfilled(Appointment),
    DetailRejected(ErrorPayload),

    CreatePending,
    CreateFulfilled(Appointment),
    CreateRejected(ErrorPayload),

    /// Optimistically move `id` to `status` until the server answers.
    StatusChangePending { id: String, status: AppointmentStatus },
    StatusChangeFulfilled(Appointment),
    StatusChangeRejected { id: String, error: ErrorPayload },
    /// The server took the change but no canonical copy came back.
    StatusChangeSettled { id: String },

    ReschedulePending,
    RescheduleFulfilled(Appointment),
    RescheduleRejected(ErrorPayload),

    MeetingLinkPending,
    MeetingLinkFulfilled { id: String, link: String },
    MeetingLinkRejected(ErrorPayload),

    FeedbackPending,
    FeedbackFulfilled,
    FeedbackRejected(ErrorPayload),

    ClearErrors,
}

#[derive(Debug, Clone, Default)]
pub struct AppointmentState {
    pub items: Vec<Appointment>,
    pub current: Option<Appointment>,
    pub pagination: Pagination,
    pub list: Operation,
    pub detail: Operation,
    pub create: Operation,
    pub status_change: Operation,
    pub reschedule: Operation,
    pub meeting_link: Operation,
    pub feedback: Operation,
    pending: HashMap<String, PendingChange<AppointmentStatus>>,
    latest_list_request: Option<RequestId>,
}

impl AppointmentState {
    pub fn reduce(&mut self, action: AppointmentAction) {
        use AppointmentAction as A;
        match action {
            A::ListPending { request_id } => {
                self.latest_list_request = Some(request_id);
                self.list.start();
            }
            A::ListFulfilled { request_id, page } => {
                if self.latest_list_request != Some(request_id) {
                    tracing::debug!(?request_id, "dropping stale appointment list");
                    return;
                }
                self.items = page.items;
                self.pagination = page.pagination;
                self.reapply_pending();
                self.list.succeed();
            }
            A::ListRejected { request_id, error } => {
                if self.latest_list_request != Some(request_id) {
                    return;
                }
                self.list.fail(error);
            }

            A::DetailPending => self.detail.start(),
            A::DetailFulfilled(appointment) => {
                replace_existing(&mut self.items, &appointment);
                self.current = Some(appointment);
                self.detail.succeed();
            }
            A::DetailRejected(error) => self.detail.fail(error),

            A::CreatePending => self.create.start(),
            A::CreateFulfilled(appointment) => {
                remove_by_id(&mut self.items, &appointment.id);
                self.items.insert(0, appointment);
                self.pagination.total_records += 1;
                self.create.succeed();
            }
            A::CreateRejected(error) => self.create.fail(error),

            A::StatusChangePending { id, status } => {
                self.status_change.start();
                let Some(previous) = self.status_of(&id) else {
                    return;
                };
                // a second change on the same id keeps the original previous
                self.pending
                    .entry(id.clone())
                    .and_modify(|p| p.requested = status)
                    .or_insert(PendingChange { previous, requested: status });
                self.set_status(&id, status);
            }
            A::StatusChangeFulfilled(appointment) => {
                self.pending.remove(&appointment.id);
                self.apply(&appointment);
                self.status_change.succeed();
            }
            A::StatusChangeSettled { id } => {
                self.pending.remove(&id);
                self.status_change.succeed();
            }
            A::StatusChangeRejected { id, error } => {
                if let Some(change) = self.pending.remove(&id) {
                    tracing::debug!(%id, previous = %change.previous, "reverting optimistic status");
                    self.set_status(&id, change.previous);
                }
                self.status_change.fail(error);
            }

            A::ReschedulePending => self.reschedule.start(),
            A::RescheduleFulfilled(appointment) => {
                self.apply(&appointment);
                self.reschedule.succeed();
            }
            A::RescheduleRejected(error) => self.reschedule.fail(error),

            A::MeetingLinkPending => self.meeting_link.start(),
            A::MeetingLinkFulfilled { id, link } => {
                for a in self.items.iter_mut().chain(self.current.iter_mut()) {
                    if a.id == id {
                        a.meeting_link = Some(link.clone());
                    }
                }
                self.meeting_link.succeed();
            }
            A::MeetingLinkRejected(error) => self.meeting_link.fail(error),

            A::FeedbackPending => self.feedback.start(),
            A::FeedbackFulfilled => self.feedback.succeed(),
            A::FeedbackRejected(error) => self.feedback.fail(error),

            A::ClearErrors => {
                for op in [
                    &mut self.list,
                    &mut self.detail,
                    &mut self.create,
                    &mut self.status_change,
                    &mut self.reschedule,
                    &mut self.meeting_link,
                    &mut self.feedback,
                ] {
                    op.error = None;
                }
            }
        }
    }

    fn status_of(&self, id: &str) -> Option<AppointmentStatus> {
        self.items
            .iter()
            .chain(self.current.iter())
            .find(|a| a.id == id)
            .map(|a| a.status)
    }

    fn set_status(&mut self, id: &str, status: AppointmentStatus) {
        for a in self.items.iter_mut().chain(self.current.iter_mut()) {
            if a.id == id {
                a.status = status;
            }
        }
    }

    /// Canonical server copy replaces the list entry and the detail view.
    fn apply(&mut self, appointment: &Appointment) {
        replace_existing(&mut self.items, appointment);
        if self.current.as_ref().is_some_and(|c| c.id == appointment.id) {
            self.current = Some(appointment.clone());
        }
    }

    /// A freshly fetched page must not hide changes still in flight.
    fn reapply_pending(&mut self) {
        let pending: Vec<(String, AppointmentStatus)> = self
            .pending
            .iter()
            .map(|(id, change)| (id.clone(), change.requested))
            .collect();
        for (id, requested) in pending {
            if let Some(a) = self.items.iter_mut().find(|a| a.id == id) {
                if let Some(change) = self.pending.get_mut(&id) {
                    change.previous = a.status;
                }
                a.status = requested;
            }
        }
    }

    // --- selectors ---

    /// Looks in the current page first, then the detail view.
    pub fn by_id(&self, id: &str) -> Option<&Appointment> {
        self.items.iter().chain(self.current.iter()).find(|a| a.id == id)
    }

    pub fn has_pending_change(&self, id: &str) -> bool {
        self.pending.contains_key(id)
    }

    pub fn controls(&self) -> PageControls {
        self.pagination.controls()
    }

    pub fn is_loading(&self) -> bool {
        [
            &self.list,
            &self.detail,
            &self.create,
            &self.status_change,
            &self.reschedule,
            &self.meeting_link,
            &self.feedback,
        ]
        .iter()
        .any(|op| op.loading)
    }

    /// Apply `filter` to the page currently held.
    pub fn select(&self, filter: &AppointmentFilter, now: DateTime<Utc>) -> Vec<Appointment> {
        select_appointments(&self.items, filter, now)
    }
}

/// Views of the appointment list offered as tabs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum AppointmentTab {
    #[default]
    All,
    Upcoming,
    Pending,
    Past,
    Cancelled,
}

impl AppointmentTab {
    pub fn includes(self, appointment: &Appointment, now: DateTime<Utc>) -> bool {
        match self {
            Self::All => true,
            Self::Upcoming => appointment.is_upcoming(now),
            Self::Pending => appointment.status == AppointmentStatus::Pending,
            Self::Past => {
                appointment.is_past(now) && appointment.status != AppointmentStatus::Cancelled
            }
            Self::Cancelled => appointment.status == AppointmentStatus::Cancelled,
        }
    }
}

/// Client-side filter over one fetched page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AppointmentFilter {
    pub search: Option<String>,
    pub status: Option<AppointmentStatus>,
    pub tab: AppointmentTab,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
}

impl AppointmentFilter {
    pub fn tab(tab: AppointmentTab) -> Self {
        Self {
            tab,
            ..Self::default()
        }
    }

    pub fn matches(&self, a: &Appointment, now: DateTime<Utc>) -> bool {
        if !self.tab.includes(a, now) {
            return false;
        }
        if self.status.is_some_and(|s| s != a.status) {
            return false;
        }
        if self.from.is_some_and(|from| a.scheduled_at < from) {
            return false;
        }
        if self.to.is_some_and(|to| a.scheduled_at > to) {
            return false;
        }
        match self.search.as_deref().map(str::trim) {
            Some(term) if !term.is_empty() => {
                let term = term.to_lowercase();
                [
                    Some(a.title.as_str()),
                    Some(a.description.as_str()),
                    a.skill_name.as_deref(),
                    a.organizer_name.as_deref(),
                    a.participant_name.as_deref(),
                ]
                .into_iter()
                .flatten()
                .any(|field| contains_ci(field, &term))
            }
            _ => true,
        }
    }
}

pub fn select_appointments(
    items: &[Appointment],
    filter: &AppointmentFilter,
    now: DateTime<Utc>,
) -> Vec<Appointment> {
    items
        .iter()
        .filter(|a| filter.matches(a, now))
        .cloned()
        .collect()
}
