use super::{map_page, rejected};
use crate::error::{ApiError, ErrorPayload};
use crate::pagination::Page;
use crate::services::{MatchQuery, MatchService};
use crate::store::{MatchAction as A, Store};
use crate::types::{map_match, CreateMatchRequest, Match};

pub fn fetch_matches(
    store: &mut Store,
    service: &MatchService,
    query: &MatchQuery,
) -> Result<Page<Match>, ErrorPayload> {
    let request_id = store.next_request_id();
    store.dispatch(A::ListPending { request_id });
    match service.list(query) {
        Ok(page) => {
            let page = map_page(page, map_match);
            store.dispatch(A::ListFulfilled { request_id, page: page.clone() });
            Ok(page)
        }
        Err(err) => {
            let error = rejected("fetch_matches", &err);
            store.dispatch(A::ListRejected { request_id, error: error.clone() });
            Err(error)
        }
    }
}

/// Incoming then outgoing requests; either failing rejects the pair.
pub fn fetch_match_requests(
    store: &mut Store,
    service: &MatchService,
) -> Result<(Vec<Match>, Vec<Match>), ErrorPayload> {
    store.dispatch(A::RequestsPending);
    let both = || -> Result<(Vec<Match>, Vec<Match>), ApiError> {
        let incoming = service.incoming()?.into_iter().map(map_match).collect();
        let outgoing = service.outgoing()?.into_iter().map(map_match).collect();
        Ok((incoming, outgoing))
    };
    match both() {
        Ok((incoming, outgoing)) => {
            store.dispatch(A::RequestsFulfilled {
                incoming: incoming.clone(),
                outgoing: outgoing.clone(),
            });
            Ok((incoming, outgoing))
        }
        Err(err) => {
            let error = rejected("fetch_match_requests", &err);
            store.dispatch(A::RequestsRejected(error.clone()));
            Err(error)
        }
    }
}

pub fn send_match_request(
    store: &mut Store,
    service: &MatchService,
    request: &CreateMatchRequest,
) -> Result<Match, ErrorPayload> {
    store.dispatch(A::SendPending);
    match service.create(request).map(map_match) {
        Ok(m) => {
            store.dispatch(A::SendFulfilled(m.clone()));
            Ok(m)
        }
        Err(err) => {
            let error = rejected("send_match_request", &err);
            store.dispatch(A::SendRejected(error.clone()));
            Err(error)
        }
    }
}

pub fn accept_match_request(
    store: &mut Store,
    service: &MatchService,
    id: &str,
    message: Option<&str>,
) -> Result<Match, ErrorPayload> {
    store.dispatch(A::RespondPending { id: id.to_string() });
    match service.accept(id, message).map(map_match) {
        Ok(m) => {
            store.dispatch(A::RespondFulfilled(m.clone()));
            Ok(m)
        }
        Err(err) => {
            let error = rejected("accept_match_request", &err);
            store.dispatch(A::RespondRejected { id: id.to_string(), error: error.clone() });
            Err(error)
        }
    }
}

pub fn reject_match_request(
    store: &mut Store,
    service: &MatchService,
    id: &str,
    reason: Option<&str>,
) -> Result<Match, ErrorPayload> {
    store.dispatch(A::RespondPending { id: id.to_string() });
    match service.reject(id, reason).map(map_match) {
        Ok(m) => {
            store.dispatch(A::RespondFulfilled(m.clone()));
            Ok(m)
        }
        Err(err) => {
            let error = rejected("reject_match_request", &err);
            store.dispatch(A::RespondRejected { id: id.to_string(), error: error.clone() });
            Err(error)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::testing::{envelope, match_json, paged, scripted_client, MockTransport};
    use crate::types::MatchStatus;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use std::sync::Arc;

    fn setup() -> (Store, MatchService, Arc<MockTransport>) {
        let transport = MockTransport::new();
        let service = MatchService::new(scripted_client(transport.clone()).0);
        (Store::new(), service, transport)
    }

    #[test]
    fn requests_loaded_in_two_calls() {
        let (mut store, service, transport) = setup();
        transport.push_json(200, envelope(json!([match_json("m1", "Pending")])));
        transport.push_json(200, envelope(json!([match_json("m2", "Pending"), match_json("m3", "Rejected")])));

        let (incoming, outgoing) = fetch_match_requests(&mut store, &service).unwrap();
        assert_eq!(incoming.len(), 1);
        assert_eq!(outgoing.len(), 2);
        assert_eq!(store.matches.pending_incoming().count(), 1);
        let paths: Vec<String> = transport.requests().into_iter().map(|r| r.path).collect();
        assert!(paths[0].ends_with("/matches/requests/incoming"));
        assert!(paths[1].ends_with("/matches/requests/outgoing"));
    }

    #[test]
    fn second_request_failure_rejects_both() {
        let (mut store, service, transport) = setup();
        transport.push_json(200, envelope(json!([match_json("m1", "Pending")])));
        transport.push_json(503, json!({"title": "Service Unavailable"}));

        let err = fetch_match_requests(&mut store, &service).unwrap_err();
        assert_eq!(err.message, "Service Unavailable");
        assert!(store.matches.incoming.is_empty());
        assert_eq!(store.matches.requests.error, Some(err));
    }

    #[test]
    fn accept_moves_request_into_matches() {
        let (mut store, service, transport) = setup();
        transport.push_json(200, envelope(json!([match_json("m1", "Pending")])));
        transport.push_json(200, envelope(json!([])));
        fetch_match_requests(&mut store, &service).unwrap();

        transport.push_json(200, envelope(match_json("m1", "Accepted")));
        let m = accept_match_request(&mut store, &service, "m1", Some("See you")).unwrap();
        assert_eq!(m.status, MatchStatus::Accepted);
        assert!(store.matches.incoming.is_empty());
        assert_eq!(store.matches.items.len(), 1);
        assert_eq!(
            transport.requests().last().unwrap().body.as_deref(),
            Some(r#"{"message":"See you"}"#)
        );
    }

    #[test]
    fn reject_failure_keeps_request() {
        let (mut store, service, transport) = setup();
        transport.push_json(200, envelope(json!([match_json("m1", "Pending")])));
        transport.push_json(200, envelope(json!([])));
        fetch_match_requests(&mut store, &service).unwrap();

        transport.push_json(404, json!({"message": "Match request not found"}));
        let err = reject_match_request(&mut store, &service, "m1", None).unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotFound);
        assert_eq!(store.matches.incoming.len(), 1);
        assert!(store.matches.responding_to.is_none());
    }

    #[test]
    fn list_and_send() {
        let (mut store, service, transport) = setup();
        transport.push_json(200, paged(vec![match_json("m1", "Accepted")], 1));
        fetch_matches(&mut store, &service, &MatchQuery::default()).unwrap();
        assert_eq!(store.matches.items.len(), 1);

        let request = CreateMatchRequest {
            target_user_id: "u1".to_string(),
            skill_id: "s1".to_string(),
            message: None,
            is_skill_exchange: false,
            exchange_skill_id: None,
            preferred_days: vec!["Monday".to_string()],
            preferred_times: Vec::new(),
        };
        transport.push_json(200, envelope(match_json("m5", "Pending")));
        send_match_request(&mut store, &service, &request).unwrap();
        assert_eq!(store.matches.outgoing[0].id, "m5");
    }
}
