use super::{map_page, rejected};
use crate::error::ErrorPayload;
use crate::pagination::Page;
use crate::services::{AppointmentQuery, AppointmentService};
use crate::store::{AppointmentAction as A, Store};
use crate::types::{
    map_appointment, Appointment, AppointmentStatus, CreateAppointmentRequest, RescheduleRequest,
};

pub fn fetch_appointments(
    store: &mut Store,
    service: &AppointmentService,
    query: &AppointmentQuery,
) -> Result<Page<Appointment>, ErrorPayload> {
    let request_id = store.next_request_id();
    store.dispatch(A::ListPending { request_id });
    match service.list(query) {
        Ok(page) => {
            let page = map_page(page, map_appointment);
            store.dispatch(A::ListFulfilled { request_id, page: page.clone() });
            Ok(page)
        }
        Err(err) => {
            let error = rejected("fetch_appointments", &err);
            store.dispatch(A::ListRejected { request_id, error: error.clone() });
            Err(error)
        }
    }
}

pub fn fetch_appointment(
    store: &mut Store,
    service: &AppointmentService,
    id: &str,
) -> Result<Appointment, ErrorPayload> {
    store.dispatch(A::DetailPending);
    match service.get(id).map(map_appointment) {
        Ok(appointment) => {
            store.dispatch(A::DetailFulfilled(appointment.clone()));
            Ok(appointment)
        }
        Err(err) => {
            let error = rejected("fetch_appointment", &err);
            store.dispatch(A::DetailRejected(error.clone()));
            Err(error)
        }
    }
}

pub fn create_appointment(
    store: &mut Store,
    service: &AppointmentService,
    request: &CreateAppointmentRequest,
) -> Result<Appointment, ErrorPayload> {
    store.dispatch(A::CreatePending);
    match service.create(request).map(map_appointment) {
        Ok(appointment) => {
            store.dispatch(A::CreateFulfilled(appointment.clone()));
            Ok(appointment)
        }
        Err(err) => {
            let error = rejected("create_appointment", &err);
            store.dispatch(A::CreateRejected(error.clone()));
            Err(error)
        }
    }
}

/// Respond to an invitation, then refetch for the canonical record.
///
/// The requested status is shown immediately and reverted if the response
/// call fails. Once the server has accepted the response it is never rolled
/// back: a failed refetch settles on the local copy, or yields `Ok(None)`
/// when no copy of the appointment is held.
pub fn respond_to_appointment(
    store: &mut Store,
    service: &AppointmentService,
    id: &str,
    status: AppointmentStatus,
) -> Result<Option<Appointment>, ErrorPayload> {
    store.dispatch(A::StatusChangePending { id: id.to_string(), status });

    if let Err(err) = service.respond(id, status) {
        let error = rejected("respond_to_appointment", &err);
        store.dispatch(A::StatusChangeRejected { id: id.to_string(), error: error.clone() });
        return Err(error);
    }

    match service.get(id).map(map_appointment) {
        Ok(appointment) => {
            store.dispatch(A::StatusChangeFulfilled(appointment.clone()));
            Ok(Some(appointment))
        }
        Err(err) => {
            tracing::warn!(%id, error = %err, "refetch after respond failed; keeping local copy");
            let local = store.appointments.by_id(id).cloned();
            match &local {
                Some(local) => store.dispatch(A::StatusChangeFulfilled(local.clone())),
                None => store.dispatch(A::StatusChangeSettled { id: id.to_string() }),
            }
            Ok(local)
        }
    }
}

pub fn accept_appointment(
    store: &mut Store,
    service: &AppointmentService,
    id: &str,
) -> Result<Option<Appointment>, ErrorPayload> {
    respond_to_appointment(store, service, id, AppointmentStatus::Confirmed)
}

pub fn decline_appointment(
    store: &mut Store,
    service: &AppointmentService,
    id: &str,
) -> Result<Option<Appointment>, ErrorPayload> {
    respond_to_appointment(store, service, id, AppointmentStatus::Cancelled)
}

pub fn cancel_appointment(
    store: &mut Store,
    service: &AppointmentService,
    id: &str,
    reason: Option<&str>,
) -> Result<Appointment, ErrorPayload> {
    store.dispatch(A::StatusChangePending {
        id: id.to_string(),
        status: AppointmentStatus::Cancelled,
    });
    match service.cancel(id, reason).map(map_appointment) {
        Ok(appointment) => {
            store.dispatch(A::StatusChangeFulfilled(appointment.clone()));
            Ok(appointment)
        }
        Err(err) => {
            let error = rejected("cancel_appointment", &err);
            store.dispatch(A::StatusChangeRejected { id: id.to_string(), error: error.clone() });
            Err(error)
        }
    }
}

/// Always rejects until the backend exposes completion; the optimistic
/// `Completed` is rolled back.
pub fn complete_appointment(
    store: &mut Store,
    service: &AppointmentService,
    id: &str,
) -> Result<Appointment, ErrorPayload> {
    store.dispatch(A::StatusChangePending {
        id: id.to_string(),
        status: AppointmentStatus::Completed,
    });
    match service.complete(id).map(map_appointment) {
        Ok(appointment) => {
            store.dispatch(A::StatusChangeFulfilled(appointment.clone()));
            Ok(appointment)
        }
        Err(err) => {
            let error = rejected("complete_appointment", &err);
            store.dispatch(A::StatusChangeRejected { id: id.to_string(), error: error.clone() });
            Err(error)
        }
    }
}

pub fn reschedule_appointment(
    store: &mut Store,
    service: &AppointmentService,
    id: &str,
    request: &RescheduleRequest,
) -> Result<Appointment, ErrorPayload> {
    store.dispatch(A::ReschedulePending);
    match service.reschedule(id, request).map(map_appointment) {
        Ok(appointment) => {
            store.dispatch(A::RescheduleFulfilled(appointment.clone()));
            Ok(appointment)
        }
        Err(err) => {
            let error = rejected("reschedule_appointment", &err);
            store.dispatch(A::RescheduleRejected(error.clone()));
            Err(error)
        }
    }
}

pub fn generate_meeting_link(
    store: &mut Store,
    service: &AppointmentService,
    id: &str,
) -> Result<String, ErrorPayload> {
    store.dispatch(A::MeetingLinkPending);
    match service.generate_meeting_link(id) {
        Ok(link) => {
            store.dispatch(A::MeetingLinkFulfilled { id: id.to_string(), link: link.clone() });
            Ok(link)
        }
        Err(err) => {
            let error = rejected("generate_meeting_link", &err);
            store.dispatch(A::MeetingLinkRejected(error.clone()));
            Err(error)
        }
    }
}

pub fn rate_appointment(
    store: &mut Store,
    service: &AppointmentService,
    id: &str,
    rating: u8,
    feedback: Option<&str>,
) -> Result<(), ErrorPayload> {
    store.dispatch(A::FeedbackPending);
    match service.rate(id, rating, feedback) {
        Ok(()) => {
            store.dispatch(A::FeedbackFulfilled);
            Ok(())
        }
        Err(err) => {
            let error = rejected("rate_appointment", &err);
            store.dispatch(A::FeedbackRejected(error.clone()));
            Err(error)
        }
    }
}

pub fn report_no_show(
    store: &mut Store,
    service: &AppointmentService,
    id: &str,
) -> Result<(), ErrorPayload> {
    store.dispatch(A::FeedbackPending);
    match service.report_no_show(id) {
        Ok(()) => {
            store.dispatch(A::FeedbackFulfilled);
            Ok(())
        }
        Err(err) => {
            let error = rejected("report_no_show", &err);
            store.dispatch(A::FeedbackRejected(error.clone()));
            Err(error)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::http::HttpMethod;
    use crate::testing::{appointment_json, envelope, paged, scripted_client, MockTransport};
    use crate::types::end_time;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use std::sync::Arc;

    fn setup() -> (Store, AppointmentService, Arc<MockTransport>) {
        let transport = MockTransport::new();
        let service = AppointmentService::new(scripted_client(transport.clone()).0);
        (Store::new(), service, transport)
    }

    fn with_pending_list(transport: &MockTransport, store: &mut Store, service: &AppointmentService) {
        transport.push_json(200, paged(vec![appointment_json("a1", "Pending")], 1));
        fetch_appointments(store, service, &AppointmentQuery::default()).unwrap();
    }

    #[test]
    fn fetch_maps_and_stores_page() {
        let (mut store, service, transport) = setup();
        transport.push_json(
            200,
            paged(vec![appointment_json("a1", "Pending"), appointment_json("a2", "Accepted")], 2),
        );
        let page = fetch_appointments(&mut store, &service, &AppointmentQuery::default()).unwrap();
        assert_eq!(page.items.len(), 2);
        assert_eq!(store.appointments.items[1].status, AppointmentStatus::Confirmed);
        for a in &store.appointments.items {
            assert_eq!(a.end_time, end_time(a.scheduled_at, a.duration_minutes));
        }
        assert_eq!(store.appointments.controls().next, Some(2));
        assert!(!store.appointments.list.loading);
    }

    #[test]
    fn fetch_failure_sets_list_error() {
        let (mut store, service, transport) = setup();
        transport.push_json(500, json!({"message": "Database unavailable"}));
        let err = fetch_appointments(&mut store, &service, &AppointmentQuery::default()).unwrap_err();
        assert_eq!(err.message, "Database unavailable");
        assert_eq!(store.appointments.list.error, Some(err));
    }

    #[test]
    fn accept_matches_respond_confirmed() {
        let run = |accept: bool| {
            let (mut store, service, transport) = setup();
            with_pending_list(&transport, &mut store, &service);
            transport.push_json(200, envelope(json!(true)));
            transport.push_json(200, envelope(appointment_json("a1", "Confirmed")));
            let result = if accept {
                accept_appointment(&mut store, &service, "a1")
            } else {
                respond_to_appointment(&mut store, &service, "a1", AppointmentStatus::Confirmed)
            };
            (result, store.appointments.items.clone(), transport.requests())
        };
        let (accepted, accepted_items, accepted_requests) = run(true);
        let (responded, responded_items, responded_requests) = run(false);

        assert_eq!(accepted, responded);
        assert_eq!(accepted_items, responded_items);
        assert_eq!(accepted_requests, responded_requests);
        assert_eq!(accepted_items[0].status, AppointmentStatus::Confirmed);
        // list, respond, refetch
        assert_eq!(accepted_requests.len(), 3);
        assert_eq!(accepted_requests[1].method, HttpMethod::Post);
        assert_eq!(accepted_requests[2].method, HttpMethod::Get);
    }

    #[test]
    fn failed_respond_reverts_status() {
        let (mut store, service, transport) = setup();
        with_pending_list(&transport, &mut store, &service);
        transport.push_json(409, json!({"success": false, "message": "Appointment is not pending"}));

        let err = accept_appointment(&mut store, &service, "a1").unwrap_err();
        assert_eq!(err.message, "Appointment is not pending");
        assert_eq!(err.status, Some(409));
        assert_eq!(store.appointments.items[0].status, AppointmentStatus::Pending);
        assert_eq!(store.appointments.status_change.error, Some(err));
        // no refetch after a failed respond
        assert_eq!(transport.calls(), 2);
    }

    #[test]
    fn refetch_failure_keeps_optimistic_copy() {
        let (mut store, service, transport) = setup();
        with_pending_list(&transport, &mut store, &service);
        transport.push_json(200, envelope(json!(true)));
        transport.push_err(crate::error::ApiError::Transport("timeout".to_string()));

        let settled = accept_appointment(&mut store, &service, "a1").unwrap().unwrap();
        assert_eq!(settled.status, AppointmentStatus::Confirmed);
        assert!(!store.appointments.has_pending_change("a1"));
    }

    #[test]
    fn refetch_failure_keeps_detail_view_copy() {
        let (mut store, service, transport) = setup();
        transport.push_json(200, envelope(appointment_json("a1", "Pending")));
        fetch_appointment(&mut store, &service, "a1").unwrap();
        assert!(store.appointments.items.is_empty());
        transport.push_json(200, envelope(json!(true)));
        transport.push_err(crate::error::ApiError::Transport("timeout".to_string()));

        let settled = accept_appointment(&mut store, &service, "a1").unwrap().unwrap();
        assert_eq!(settled.status, AppointmentStatus::Confirmed);
        assert_eq!(
            store.appointments.current.as_ref().map(|a| a.status),
            Some(AppointmentStatus::Confirmed)
        );
        assert!(!store.appointments.has_pending_change("a1"));
        assert!(store.appointments.status_change.error.is_none());
        assert!(!store.appointments.status_change.loading);
    }

    #[test]
    fn refetch_failure_without_local_copy_still_succeeds() {
        let (mut store, service, transport) = setup();
        transport.push_json(200, envelope(json!(true)));
        transport.push_err(crate::error::ApiError::Transport("timeout".to_string()));

        assert_eq!(decline_appointment(&mut store, &service, "a9"), Ok(None));
        assert!(store.appointments.status_change.error.is_none());
        assert!(!store.appointments.status_change.loading);
    }

    #[test]
    fn cancel_uses_server_copy() {
        let (mut store, service, transport) = setup();
        with_pending_list(&transport, &mut store, &service);
        let mut cancelled = appointment_json("a1", "Canceled");
        cancelled["cancellationReason"] = json!("Conflict");
        transport.push_json(200, envelope(cancelled));

        let a = cancel_appointment(&mut store, &service, "a1", Some("Conflict")).unwrap();
        assert_eq!(a.status, AppointmentStatus::Cancelled);
        assert_eq!(store.appointments.items[0].cancellation_reason.as_deref(), Some("Conflict"));
    }

    #[test]
    fn stubs_reject_without_network_and_roll_back() {
        let (mut store, service, transport) = setup();
        with_pending_list(&transport, &mut store, &service);
        let before = transport.calls();

        let err = complete_appointment(&mut store, &service, "a1").unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotImplemented);
        assert_eq!(store.appointments.items[0].status, AppointmentStatus::Pending);

        let err = rate_appointment(&mut store, &service, "a1", 5, Some("great")).unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotImplemented);
        assert_eq!(store.appointments.feedback.error, Some(err));

        let err = rate_appointment(&mut store, &service, "a1", 7, None).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);
        assert_eq!(err.message, "Rating must be between 1 and 5");

        assert!(report_no_show(&mut store, &service, "a1").is_err());
        assert_eq!(transport.calls(), before);
    }

    #[test]
    fn validation_failure_surfaces_on_slice() {
        let (mut store, service, transport) = setup();
        let err = fetch_appointment(&mut store, &service, "   ").unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);
        assert_eq!(store.appointments.detail.error.as_ref().unwrap().message, "Appointment ID is required");
        assert_eq!(transport.calls(), 0);
    }

    #[test]
    fn meeting_link_and_reschedule_update_item() {
        let (mut store, service, transport) = setup();
        with_pending_list(&transport, &mut store, &service);
        transport.push_json(200, envelope(json!("https://meet.example/a1")));
        generate_meeting_link(&mut store, &service, "a1").unwrap();
        assert_eq!(
            store.appointments.items[0].meeting_link.as_deref(),
            Some("https://meet.example/a1")
        );

        let mut moved = appointment_json("a1", "Rescheduled");
        moved["scheduledDate"] = json!("2024-05-03T15:00:00Z");
        moved["durationMinutes"] = json!(30);
        transport.push_json(200, envelope(moved));
        let request = RescheduleRequest {
            new_scheduled_date: "2024-05-03T15:00:00Z".parse().unwrap(),
            new_duration_minutes: Some(30),
            reason: None,
        };
        let a = reschedule_appointment(&mut store, &service, "a1", &request).unwrap();
        assert_eq!(a.end_time, "2024-05-03T15:30:00Z".parse::<chrono::DateTime<chrono::Utc>>().unwrap());
        assert_eq!(store.appointments.items[0].status, AppointmentStatus::Rescheduled);
    }

    #[test]
    fn unauthorized_surfaces_and_redirects() {
        let transport = MockTransport::new();
        let (client, history, _) = scripted_client(transport.clone());
        let service = AppointmentService::new(client);
        let mut store = Store::new();
        transport.push_json(401, json!({}));
        let err = fetch_appointments(&mut store, &service, &AppointmentQuery::default()).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Unauthorized);
        assert_eq!(history.routes(), vec!["/login".to_string()]);
    }
}
