/// Run status definitions for tracking run progress
///
/// This module defines all states a scrape run can be in.
use serde::{Deserialize, Serialize};
use std::fmt;

/// Represents the current status of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RunStatus {
    /// Run was accepted and its scrapers are still working
    #[serde(rename = "in progress")]
    InProgress,

    /// Every scraper finished without a surfaced error
    #[serde(rename = "success")]
    Success,

    /// At least one scraper surfaced an error, or the run was cancelled
    #[serde(rename = "failed")]
    Failed,
}

impl RunStatus {
    /// Returns true if this is a terminal status (the run will not change again)
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::InProgress)
    }

    /// Returns true if moving from `self` to `next` is a legal lifecycle step
    ///
    /// Re-asserting the current status is always legal; terminal statuses
    /// never move.
    pub fn can_transition_to(&self, next: RunStatus) -> bool {
        *self == next || matches!(self, Self::InProgress)
    }

    /// Returns the wire string for this status
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InProgress => "in progress",
            Self::Success => "success",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
