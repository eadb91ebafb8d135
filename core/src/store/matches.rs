use super::{remove_by_id, upsert, Operation, RequestId};
use crate::error::ErrorPayload;
use crate::pagination::{Page, Pagination};
use crate::types::{Match, MatchStatus};

#[derive(Debug, Clone, PartialEq)]
pub enum MatchAction {
    ListPending { request_id: RequestId },
    ListFulfilled { request_id: RequestId, page: Page<Match> },
    ListRejected { request_id: RequestId, error: ErrorPayload },

    RequestsPending,
    RequestsFulfilled { incoming: Vec<Match>, outgoing: Vec<Match> },
    RequestsRejected(ErrorPayload),

    SendPending,
    SendFulfilled(Match),
    SendRejected(ErrorPayload),

    RespondPending { id: String },
    /// The server's copy after accept or reject.
    RespondFulfilled(Match),
    RespondRejected { id: String, error: ErrorPayload },
}

#[derive(Debug, Clone, Default)]
pub struct MatchState {
    pub items: Vec<Match>,
    pub incoming: Vec<Match>,
    pub outgoing: Vec<Match>,
    pub pagination: Pagination,
    pub list: Operation,
    pub requests: Operation,
    pub send: Operation,
    pub respond: Operation,
    /// Request currently being accepted or rejected.
    pub responding_to: Option<String>,
    latest_list_request: Option<RequestId>,
}

impl MatchState {
    pub fn reduce(&mut self, action: MatchAction) {
        use MatchAction as A;
        match action {
            A::ListPending { request_id } => {
                self.latest_list_request = Some(request_id);
                self.list.start();
            }
            A::ListFulfilled { request_id, page } => {
                if self.latest_list_request != Some(request_id) {
                    return;
                }
                self.items = page.items;
                self.pagination = page.pagination;
                self.list.succeed();
            }
            A::ListRejected { request_id, error } => {
                if self.latest_list_request == Some(request_id) {
                    self.list.fail(error);
                }
            }

            A::RequestsPending => self.requests.start(),
            A::RequestsFulfilled { incoming, outgoing } => {
                self.incoming = incoming;
                self.outgoing = outgoing;
                self.requests.succeed();
            }
            A::RequestsRejected(error) => self.requests.fail(error),

            A::SendPending => self.send.start(),
            A::SendFulfilled(m) => {
                upsert(&mut self.outgoing, m);
                self.send.succeed();
            }
            A::SendRejected(error) => self.send.fail(error),

            A::RespondPending { id } => {
                self.responding_to = Some(id);
                self.respond.start();
            }
            A::RespondFulfilled(m) => {
                remove_by_id(&mut self.incoming, &m.id);
                if m.status == MatchStatus::Accepted {
                    if !upsert(&mut self.items, m) {
                        self.pagination.total_records += 1;
                    }
                } else {
                    remove_by_id(&mut self.items, &m.id);
                }
                self.responding_to = None;
                self.respond.succeed();
            }
            A::RespondRejected { id, error } => {
                tracing::debug!(%id, "match response rejected");
                self.responding_to = None;
                self.respond.fail(error);
            }
        }
    }

    pub fn pending_incoming(&self) -> impl Iterator<Item = &Match> {
        self.incoming
            .iter()
            .filter(|m| m.status == MatchStatus::Pending)
    }

    pub fn by_id(&self, id: &str) -> Option<&Match> {
        self.items
            .iter()
            .chain(self.incoming.iter())
            .chain(self.outgoing.iter())
            .find(|m| m.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn m(id: &str, status: MatchStatus) -> Match {
        Match {
            id: id.to_string(),
            requester_user_id: "u2".to_string(),
            responder_user_id: "u1".to_string(),
            requester_name: None,
            responder_name: None,
            skill_id: "s1".to_string(),
            skill_name: None,
            is_skill_exchange: false,
            exchange_skill_id: None,
            status,
            message: None,
            preferred_days: Vec::new(),
            preferred_times: Vec::new(),
            created_at: None,
        }
    }

    #[test]
    fn accepting_moves_request_into_matches() {
        let mut state = MatchState::default();
        state.reduce(MatchAction::RequestsFulfilled {
            incoming: vec![m("m1", MatchStatus::Pending), m("m2", MatchStatus::Pending)],
            outgoing: Vec::new(),
        });
        state.reduce(MatchAction::RespondPending { id: "m1".to_string() });
        assert_eq!(state.responding_to.as_deref(), Some("m1"));

        state.reduce(MatchAction::RespondFulfilled(m("m1", MatchStatus::Accepted)));
        assert_eq!(state.incoming.len(), 1);
        assert_eq!(state.items.len(), 1);
        assert_eq!(state.pagination.total_records, 1);
        assert!(state.responding_to.is_none());
    }

    #[test]
    fn rejecting_drops_request() {
        let mut state = MatchState::default();
        state.reduce(MatchAction::RequestsFulfilled {
            incoming: vec![m("m1", MatchStatus::Pending)],
            outgoing: Vec::new(),
        });
        state.reduce(MatchAction::RespondFulfilled(m("m1", MatchStatus::Rejected)));
        assert!(state.incoming.is_empty());
        assert!(state.items.is_empty());
        assert_eq!(state.pending_incoming().count(), 0);
    }

    #[test]
    fn stale_match_page_ignored() {
        let mut state = MatchState::default();
        state.reduce(MatchAction::ListPending { request_id: RequestId(1) });
        state.reduce(MatchAction::ListPending { request_id: RequestId(2) });
        state.reduce(MatchAction::ListFulfilled {
            request_id: RequestId(1),
            page: Page {
                items: vec![m("old", MatchStatus::Accepted)],
                pagination: Pagination::default(),
            },
        });
        assert!(state.items.is_empty());
        assert!(state.list.loading);
    }
}
