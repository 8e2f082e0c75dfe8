//! Wire types of the run API

use crate::scraper::ScraperKind;
use crate::server::cache::RunRecord;
use crate::state::RunStatus;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Body of `POST /run/`
///
/// `scrapers` may be omitted or `null`; both mean "no preference".
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct PostRunRequest {
    #[serde(default)]
    pub scrapers: Option<Vec<ScraperKind>>,
}

impl PostRunRequest {
    /// Returns the requested kinds, empty when none were given
    pub fn kinds(&self) -> &[ScraperKind] {
        self.scrapers.as_deref().unwrap_or(&[])
    }
}

/// Body answered to `POST /run/`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostRunResponse {
    #[serde(rename = "runID")]
    pub run_id: Uuid,
}

/// Body answered to `GET /run/{id}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GetRunResponse {
    pub id: Uuid,
    pub status: RunStatus,
    #[serde(rename = "lastUpdated")]
    pub last_updated: DateTime<Utc>,
}

impl From<RunRecord> for GetRunResponse {
    fn from(record: RunRecord) -> Self {
        Self {
            id: record.id,
            status: record.status,
            last_updated: record.last_updated,
        }
    }
}
