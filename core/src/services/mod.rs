//! Endpoint wrappers, one service per backend resource.
//!
//! Every operation comes as a pair: `build_*` validates its parameters and
//! returns the `HttpRequest` without sending it, and the plain method sends
//! it through the shared `ApiClient` and unwraps the envelope. Validation
//! errors therefore surface before any request exists.

pub mod appointment;
pub mod matching;
pub mod skill;

pub use appointment::{AppointmentQuery, AppointmentService};
pub use matching::{MatchQuery, MatchService};
pub use skill::{SkillQuery, SkillService};

use std::sync::Arc;

use crate::auth::Navigator;
use crate::client::ApiClient;
use crate::config::ClientConfig;
use crate::pagination::DEFAULT_PAGE_SIZE;

/// Percent-encode an id for use as a path segment.
pub(crate) fn segment(id: &str) -> String {
    urlencoding::encode(id).into_owned()
}

/// Every service over one client, plus the page size list queries start from.
#[derive(Debug, Clone)]
pub struct Backend {
    pub appointments: AppointmentService,
    pub skills: SkillService,
    pub matches: MatchService,
    pub page_size: u32,
}

impl Backend {
    pub fn new(client: ApiClient) -> Self {
        Self {
            appointments: AppointmentService::new(client.clone()),
            skills: SkillService::new(client.clone()),
            matches: MatchService::new(client),
            page_size: DEFAULT_PAGE_SIZE,
        }
    }

    /// Client wired by [`ApiClient::from_config`], lists sized by `paging.page_size`.
    pub fn from_config(config: &ClientConfig, navigator: Arc<dyn Navigator>) -> Self {
        Self {
            page_size: config.paging.page_size,
            ..Self::new(ApiClient::from_config(config, navigator))
        }
    }

    pub fn appointment_query(&self) -> AppointmentQuery {
        AppointmentQuery::page(1, self.page_size)
    }

    pub fn skill_query(&self) -> SkillQuery {
        SkillQuery {
            page_size: self.page_size,
            ..SkillQuery::default()
        }
    }

    pub fn match_query(&self) -> MatchQuery {
        MatchQuery {
            page_size: self.page_size,
            ..MatchQuery::default()
        }
    }
}
