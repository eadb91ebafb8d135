use serde::Serialize;

use super::segment;
use crate::client::ApiClient;
use crate::error::{require_id, ApiError};
use crate::http::{HttpMethod, HttpRequest, QueryString};
use crate::pagination::DEFAULT_PAGE_SIZE;
use crate::types::{CreateMatchRequest, MatchDto, MatchStatus, PagedResponse};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchQuery {
    pub page_number: u32,
    pub page_size: u32,
    pub status: Option<MatchStatus>,
}

impl Default for MatchQuery {
    fn default() -> Self {
        Self {
            page_number: 1,
            page_size: DEFAULT_PAGE_SIZE,
            status: None,
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AcceptBody<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<&'a str>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RejectBody<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    reason: Option<&'a str>,
}

fn non_blank(text: Option<&str>) -> Option<&str> {
    text.map(str::trim).filter(|t| !t.is_empty())
}

#[derive(Debug, Clone)]
pub struct MatchService {
    client: ApiClient,
}

impl MatchService {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub fn build_list(&self, query: &MatchQuery) -> HttpRequest {
        let qs = QueryString::new()
            .push("pageNumber", query.page_number.max(1))
            .push("pageSize", query.page_size.max(1))
            .push_opt("status", query.status.map(MatchStatus::as_str));
        self.client.build(HttpMethod::Get, "/matches", qs)
    }

    pub fn list(&self, query: &MatchQuery) -> Result<PagedResponse<MatchDto>, ApiError> {
        self.client.fetch_page(self.build_list(query))
    }

    pub fn build_incoming(&self) -> HttpRequest {
        self.client
            .build(HttpMethod::Get, "/matches/requests/incoming", QueryString::new())
    }

    pub fn incoming(&self) -> Result<Vec<MatchDto>, ApiError> {
        self.client.fetch_data(self.build_incoming())
    }

    pub fn build_outgoing(&self) -> HttpRequest {
        self.client
            .build(HttpMethod::Get, "/matches/requests/outgoing", QueryString::new())
    }

    pub fn outgoing(&self) -> Result<Vec<MatchDto>, ApiError> {
        self.client.fetch_data(self.build_outgoing())
    }

    pub fn build_create(&self, request: &CreateMatchRequest) -> Result<HttpRequest, ApiError> {
        request.validate()?;
        self.client
            .build_json(HttpMethod::Post, "/matches/requests", request)
    }

    pub fn create(&self, request: &CreateMatchRequest) -> Result<MatchDto, ApiError> {
        self.client.fetch_data(self.build_create(request)?)
    }

    pub fn build_accept(&self, id: &str, message: Option<&str>) -> Result<HttpRequest, ApiError> {
        let id = require_id("Match request ID", id)?;
        self.client.build_json(
            HttpMethod::Post,
            &format!("/matches/requests/{}/accept", segment(id)),
            &AcceptBody { message: non_blank(message) },
        )
    }

    pub fn accept(&self, id: &str, message: Option<&str>) -> Result<MatchDto, ApiError> {
        self.client.fetch_data(self.build_accept(id, message)?)
    }

    pub fn build_reject(&self, id: &str, reason: Option<&str>) -> Result<HttpRequest, ApiError> {
        let id = require_id("Match request ID", id)?;
        self.client.build_json(
            HttpMethod::Post,
            &format!("/matches/requests/{}/reject", segment(id)),
            &RejectBody { reason: non_blank(reason) },
        )
    }

    pub fn reject(&self, id: &str, reason: Option<&str>) -> Result<MatchDto, ApiError> {
        self.client.fetch_data(self.build_reject(id, reason)?)
    }
}
