use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;

use super::segment;
use crate::client::ApiClient;
use crate::error::{require_id, require_rating, ApiError};
use crate::http::{HttpMethod, HttpRequest, QueryString};
use crate::pagination::DEFAULT_PAGE_SIZE;
use crate::types::{
    AppointmentDto, AppointmentStatus, CreateAppointmentRequest, PagedResponse, RescheduleRequest,
};

/// Filters for `GET /appointments`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppointmentQuery {
    pub page_number: u32,
    pub page_size: u32,
    pub status: Option<AppointmentStatus>,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
}

impl Default for AppointmentQuery {
    fn default() -> Self {
        Self {
            page_number: 1,
            page_size: DEFAULT_PAGE_SIZE,
            status: None,
            from: None,
            to: None,
        }
    }
}

impl AppointmentQuery {
    pub fn page(page_number: u32, page_size: u32) -> Self {
        Self {
            page_number,
            page_size,
            ..Self::default()
        }
    }

    fn to_query(&self) -> Result<QueryString, ApiError> {
        if let (Some(from), Some(to)) = (self.from, self.to) {
            if from > to {
                return Err(ApiError::Validation(
                    "Start date must be before end date".to_string(),
                ));
            }
        }
        let stamp = |t: DateTime<Utc>| t.to_rfc3339_opts(SecondsFormat::Secs, true);
        Ok(QueryString::new()
            .push("pageNumber", self.page_number.max(1))
            .push("pageSize", self.page_size.max(1))
            .push_opt("status", self.status.map(AppointmentStatus::as_str))
            .push_opt("fromDate", self.from.map(stamp))
            .push_opt("toDate", self.to.map(stamp)))
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RespondBody {
    status: AppointmentStatus,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CancelBody<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    reason: Option<&'a str>,
}

#[derive(Debug, Clone)]
pub struct AppointmentService {
    client: ApiClient,
}

impl AppointmentService {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub fn build_list(&self, query: &AppointmentQuery) -> Result<HttpRequest, ApiError> {
        Ok(self.client.build(HttpMethod::Get, "/appointments", query.to_query()?))
    }

    pub fn list(&self, query: &AppointmentQuery) -> Result<PagedResponse<AppointmentDto>, ApiError> {
        self.client.fetch_page(self.build_list(query)?)
    }

    pub fn build_get(&self, id: &str) -> Result<HttpRequest, ApiError> {
        let id = require_id("Appointment ID", id)?;
        Ok(self.client.build(
            HttpMethod::Get,
            &format!("/appointments/{}", segment(id)),
            QueryString::new(),
        ))
    }

    pub fn get(&self, id: &str) -> Result<AppointmentDto, ApiError> {
        self.client.fetch_data(self.build_get(id)?)
    }

    pub fn build_create(&self, request: &CreateAppointmentRequest) -> Result<HttpRequest, ApiError> {
        request.validate()?;
        self.client.build_json(HttpMethod::Post, "/appointments", request)
    }

    pub fn create(&self, request: &CreateAppointmentRequest) -> Result<AppointmentDto, ApiError> {
        self.client.fetch_data(self.build_create(request)?)
    }

    /// Respond to a pending invitation: `Confirmed` accepts, `Cancelled`
    /// declines.
    pub fn build_respond(&self, id: &str, status: AppointmentStatus) -> Result<HttpRequest, ApiError> {
        let id = require_id("Appointment ID", id)?;
        if !matches!(status, AppointmentStatus::Confirmed | AppointmentStatus::Cancelled) {
            return Err(ApiError::Validation(format!(
                "Cannot respond to an appointment with status {status}"
            )));
        }
        self.client.build_json(
            HttpMethod::Post,
            &format!("/appointments/{}/respond", segment(id)),
            &RespondBody { status },
        )
    }

    pub fn respond(&self, id: &str, status: AppointmentStatus) -> Result<(), ApiError> {
        self.client.fetch_ack(self.build_respond(id, status)?)
    }

    pub fn build_accept(&self, id: &str) -> Result<HttpRequest, ApiError> {
        self.build_respond(id, AppointmentStatus::Confirmed)
    }

    pub fn accept(&self, id: &str) -> Result<(), ApiError> {
        self.respond(id, AppointmentStatus::Confirmed)
    }

    pub fn build_cancel(&self, id: &str, reason: Option<&str>) -> Result<HttpRequest, ApiError> {
        let id = require_id("Appointment ID", id)?;
        let reason = reason.map(str::trim).filter(|r| !r.is_empty());
        self.client.build_json(
            HttpMethod::Post,
            &format!("/appointments/{}/cancel", segment(id)),
            &CancelBody { reason },
        )
    }

    pub fn cancel(&self, id: &str, reason: Option<&str>) -> Result<AppointmentDto, ApiError> {
        self.client.fetch_data(self.build_cancel(id, reason)?)
    }

    pub fn build_reschedule(&self, id: &str, request: &RescheduleRequest) -> Result<HttpRequest, ApiError> {
        let id = require_id("Appointment ID", id)?;
        request.validate()?;
        self.client.build_json(
            HttpMethod::Post,
            &format!("/appointments/{}/reschedule", segment(id)),
            request,
        )
    }

    pub fn reschedule(&self, id: &str, request: &RescheduleRequest) -> Result<AppointmentDto, ApiError> {
        self.client.fetch_data(self.build_reschedule(id, request)?)
    }

    pub fn build_meeting_link(&self, id: &str) -> Result<HttpRequest, ApiError> {
        let id = require_id("Appointment ID", id)?;
        Ok(self.client.build(
            HttpMethod::Post,
            &format!("/appointments/{}/meeting-link", segment(id)),
            QueryString::new(),
        ))
    }

    pub fn generate_meeting_link(&self, id: &str) -> Result<String, ApiError> {
        self.client.fetch_data(self.build_meeting_link(id)?)
    }

    pub fn complete(&self, id: &str) -> Result<AppointmentDto, ApiError> {
        require_id("Appointment ID", id)?;
        Err(ApiError::NotImplemented("Completing appointments"))
    }

    pub fn rate(&self, id: &str, rating: u8, _feedback: Option<&str>) -> Result<(), ApiError> {
        require_id("Appointment ID", id)?;
        require_rating(rating)?;
        Err(ApiError::NotImplemented("Rating appointments"))
    }

    pub fn report_no_show(&self, id: &str) -> Result<(), ApiError> {
        require_id("Appointment ID", id)?;
        Err(ApiError::NotImplemented("Reporting no-shows"))
    }
}
