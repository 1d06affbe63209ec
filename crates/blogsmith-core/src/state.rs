//! Campaign lifecycle transitions.
//!
//! Every status change funnels through [`CampaignStatus::apply`] so the legal
//! edges live in exactly one place. Persistence re-checks the expected status
//! in its `UPDATE ... WHERE` clauses; this module is the source of truth for
//! which edges exist at all.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::campaign::CampaignStatus;
use crate::CoreError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CampaignEvent {
    /// Draft to active. The campaign becomes due-eligible.
    Activate,
    /// Active to paused. Scheduling state is kept, runs are suspended.
    Pause,
    /// Paused back to active.
    Resume,
    /// Active or paused to stopped. Terminal.
    Stop,
    /// Active to completed, applied by the engine when the end date passes or
    /// the run cap is reached. Terminal.
    Complete,
}

impl std::fmt::Display for CampaignEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CampaignEvent::Activate => write!(f, "activate"),
            CampaignEvent::Pause => write!(f, "pause"),
            CampaignEvent::Resume => write!(f, "resume"),
            CampaignEvent::Stop => write!(f, "stop"),
            CampaignEvent::Complete => write!(f, "complete"),
        }
    }
}

impl std::str::FromStr for CampaignEvent {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "activate" => Ok(CampaignEvent::Activate),
            "pause" => Ok(CampaignEvent::Pause),
            "resume" => Ok(CampaignEvent::Resume),
            "stop" => Ok(CampaignEvent::Stop),
            "complete" => Ok(CampaignEvent::Complete),
            other => Err(CoreError::InvalidEvent(other.to_string())),
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TransitionError {
    #[error("campaign is {status} which is terminal; {event} is not allowed")]
    Terminal {
        status: CampaignStatus,
        event: CampaignEvent,
    },
    #[error("cannot {event} a {from} campaign")]
    Invalid {
        from: CampaignStatus,
        event: CampaignEvent,
    },
}

impl CampaignStatus {
    /// Apply a lifecycle event, returning the next status.
    ///
    /// # Errors
    ///
    /// `TransitionError::Terminal` when the campaign is stopped or completed,
    /// `TransitionError::Invalid` for any other undefined edge.
    pub fn apply(self, event: CampaignEvent) -> Result<CampaignStatus, TransitionError> {
        if self.is_terminal() {
            return Err(TransitionError::Terminal {
                status: self,
                event,
            });
        }

        match (self, event) {
            (CampaignStatus::Draft, CampaignEvent::Activate) => Ok(CampaignStatus::Active),
            (CampaignStatus::Active, CampaignEvent::Pause) => Ok(CampaignStatus::Paused),
            (CampaignStatus::Paused, CampaignEvent::Resume) => Ok(CampaignStatus::Active),
            (CampaignStatus::Active | CampaignStatus::Paused, CampaignEvent::Stop) => {
                Ok(CampaignStatus::Stopped)
            }
            (CampaignStatus::Active, CampaignEvent::Complete) => Ok(CampaignStatus::Completed),
            (from, event) => Err(TransitionError::Invalid { from, event }),
        }
    }
}
