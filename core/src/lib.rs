//! Synchronous client core for the skill-exchange marketplace API.
//!
//! # Overview
//! Services build `HttpRequest` values and parse `HttpResponse` values; the
//! round-trip itself goes through a `Transport`, so every layer above it can
//! be driven by scripted responses in tests. Thunks wrap service calls and
//! feed the results into a `Store` of per-resource slices that hosts read
//! and filter through selectors.
//!
//! # Design
//! - `ApiClient` holds the base URL, the auth session and the transport. It
//!   attaches the bearer token, normalizes envelopes and turns failures into
//!   `ApiError` with a readable message.
//! - A 401 clears the stored token and redirects to the sign-in route once.
//! - Each entity has one DTO and one mapping into its domain type.
//! - Status changes and favorite toggles are optimistic and revert on
//!   rejection. List fetches are latest-request-wins.
//! - DTOs are defined independently from the mock-server crate; integration
//!   tests catch schema drift.

pub mod auth;
pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod pagination;
pub mod services;
pub mod store;
pub mod thunks;
pub mod transport;
pub mod types;

#[cfg(test)]
mod testing;

pub use auth::{AuthSession, FileTokenStore, MemoryTokenStore, Navigator, RouteHistory, TokenStore};
pub use client::ApiClient;
pub use config::{ClientConfig, ConfigError};
pub use error::{ApiError, ErrorKind, ErrorPayload};
pub use http::{HttpMethod, HttpRequest, HttpResponse, QueryString, Transport};
pub use pagination::{Page, PageControls, Pagination};
pub use services::{
    AppointmentQuery, AppointmentService, Backend, MatchQuery, MatchService, SkillQuery,
    SkillService,
};
pub use store::{Action, Operation, Store};
pub use transport::UreqTransport;
