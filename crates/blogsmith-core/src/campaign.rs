//! Campaign domain types shared across the workspace.
//!
//! A campaign is a recurring content-generation job owned by a store. The
//! enums here mirror the values persisted as TEXT columns; rows convert at
//! the edges via [`std::str::FromStr`].

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::schedule::MAX_MONTHLY_DAY;
use crate::CoreError;

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CampaignStatus {
    Draft,
    Active,
    Paused,
    Stopped,
    Completed,
}

impl CampaignStatus {
    /// `stopped` and `completed` accept no further events.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, CampaignStatus::Stopped | CampaignStatus::Completed)
    }
}

impl std::fmt::Display for CampaignStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CampaignStatus::Draft => write!(f, "draft"),
            CampaignStatus::Active => write!(f, "active"),
            CampaignStatus::Paused => write!(f, "paused"),
            CampaignStatus::Stopped => write!(f, "stopped"),
            CampaignStatus::Completed => write!(f, "completed"),
        }
    }
}

impl std::str::FromStr for CampaignStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "draft" => Ok(CampaignStatus::Draft),
            "active" => Ok(CampaignStatus::Active),
            "paused" => Ok(CampaignStatus::Paused),
            "stopped" => Ok(CampaignStatus::Stopped),
            "completed" => Ok(CampaignStatus::Completed),
            other => Err(CoreError::InvalidStatus(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    Daily,
    Weekly,
    Biweekly,
    Monthly,
}

impl std::fmt::Display for Frequency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Frequency::Daily => write!(f, "daily"),
            Frequency::Weekly => write!(f, "weekly"),
            Frequency::Biweekly => write!(f, "biweekly"),
            Frequency::Monthly => write!(f, "monthly"),
        }
    }
}

impl std::str::FromStr for Frequency {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "daily" => Ok(Frequency::Daily),
            "weekly" => Ok(Frequency::Weekly),
            "biweekly" => Ok(Frequency::Biweekly),
            "monthly" => Ok(Frequency::Monthly),
            other => Err(CoreError::InvalidFrequency(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArticleStatus {
    Draft,
    NeedsReview,
    Published,
}

impl std::fmt::Display for ArticleStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ArticleStatus::Draft => write!(f, "draft"),
            ArticleStatus::NeedsReview => write!(f, "needs_review"),
            ArticleStatus::Published => write!(f, "published"),
        }
    }
}

impl std::str::FromStr for ArticleStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "draft" => Ok(ArticleStatus::Draft),
            "needs_review" => Ok(ArticleStatus::NeedsReview),
            "published" => Ok(ArticleStatus::Published),
            other => Err(CoreError::InvalidArticleStatus(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionStatus {
    Success,
    Failed,
    Partial,
}

impl std::fmt::Display for ExecutionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExecutionStatus::Success => write!(f, "success"),
            ExecutionStatus::Failed => write!(f, "failed"),
            ExecutionStatus::Partial => write!(f, "partial"),
        }
    }
}

impl std::str::FromStr for ExecutionStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "success" => Ok(ExecutionStatus::Success),
            "failed" => Ok(ExecutionStatus::Failed),
            "partial" => Ok(ExecutionStatus::Partial),
            other => Err(CoreError::InvalidExecutionStatus(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TriggerSource {
    Scheduled,
    Manual,
}

impl std::fmt::Display for TriggerSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TriggerSource::Scheduled => write!(f, "scheduled"),
            TriggerSource::Manual => write!(f, "manual"),
        }
    }
}

impl std::str::FromStr for TriggerSource {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "scheduled" => Ok(TriggerSource::Scheduled),
            "manual" => Ok(TriggerSource::Manual),
            other => Err(CoreError::InvalidTriggerSource(other.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// Settings and validation
// ---------------------------------------------------------------------------

/// The operator-editable configuration of a campaign, as accepted at create
/// and update time. Persistence identity, counters, and scheduling state live
/// on the row, not here.
///
/// Each feature toggle is an independent switch the operator sets per
/// campaign; they do not collapse into an enum.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[allow(clippy::struct_excessive_bools)]
pub struct CampaignSettings {
    pub name: String,
    pub description: Option<String>,
    pub frequency: Frequency,
    /// Minute-precision local time of day for runs.
    pub schedule_time: NaiveTime,
    /// Weekday 0-6 (Sunday = 0) for weekly/biweekly, day-of-month 1-28 for
    /// monthly. Ignored for daily.
    pub schedule_day: Option<u8>,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    /// Stop after this many generated articles, if set.
    pub max_runs: Option<i32>,
    /// Subject niche, e.g. `"sustainable gardening"`. Feeds product relevance
    /// scoring and the writing prompt.
    pub topic: String,
    pub keywords: Vec<String>,
    pub word_count_min: i32,
    pub word_count_max: i32,
    pub writing_style: String,
    pub tone: String,
    pub content_structure: Option<String>,
    pub language: String,
    pub internal_linking: bool,
    pub max_internal_links: i32,
    pub image_integration: bool,
    pub product_links: bool,
    pub seo_optimization: bool,
    pub auto_publish: bool,
}

#[derive(Debug, Error)]
pub enum CampaignConfigError {
    #[error("campaign name must be non-empty")]
    EmptyName,
    #[error("schedule day is required for {frequency} campaigns")]
    MissingScheduleDay { frequency: Frequency },
    #[error("schedule day {day} is out of range for {frequency} campaigns; expected {expected}")]
    ScheduleDayOutOfRange {
        frequency: Frequency,
        day: u8,
        expected: &'static str,
    },
    #[error("minimum word count must be positive")]
    NonPositiveWordCount,
    #[error("word count range is inverted: min {min} > max {max}")]
    InvertedWordCountRange { min: i32, max: i32 },
    #[error("at least one keyword is required")]
    NoKeywords,
    #[error("end date {end} is before start date {start}")]
    EndBeforeStart { start: NaiveDate, end: NaiveDate },
    #[error("max runs must be at least 1")]
    InvalidMaxRuns,
    #[error("max internal links must be at least 1 when internal linking is enabled")]
    InvalidLinkBudget,
}

impl CampaignSettings {
    /// Validate the settings. Rejected settings never reach scheduling.
    ///
    /// # Errors
    ///
    /// Returns the first `CampaignConfigError` encountered.
    pub fn validate(&self) -> Result<(), CampaignConfigError> {
        if self.name.trim().is_empty() {
            return Err(CampaignConfigError::EmptyName);
        }

        match self.frequency {
            Frequency::Daily => {}
            Frequency::Weekly | Frequency::Biweekly => match self.schedule_day {
                None => {
                    return Err(CampaignConfigError::MissingScheduleDay {
                        frequency: self.frequency,
                    })
                }
                Some(day) if day > 6 => {
                    return Err(CampaignConfigError::ScheduleDayOutOfRange {
                        frequency: self.frequency,
                        day,
                        expected: "a weekday 0-6 (Sunday = 0)",
                    })
                }
                Some(_) => {}
            },
            Frequency::Monthly => match self.schedule_day {
                None => {
                    return Err(CampaignConfigError::MissingScheduleDay {
                        frequency: self.frequency,
                    })
                }
                // Days 29-31 do not exist in every month and are rejected
                // rather than silently clamped.
                Some(day) if day < 1 || day > MAX_MONTHLY_DAY => {
                    return Err(CampaignConfigError::ScheduleDayOutOfRange {
                        frequency: self.frequency,
                        day,
                        expected: "a day of month 1-28",
                    })
                }
                Some(_) => {}
            },
        }

        if self.word_count_min <= 0 {
            return Err(CampaignConfigError::NonPositiveWordCount);
        }
        if self.word_count_max < self.word_count_min {
            return Err(CampaignConfigError::InvertedWordCountRange {
                min: self.word_count_min,
                max: self.word_count_max,
            });
        }

        if normalize_keywords(&self.keywords).is_empty() {
            return Err(CampaignConfigError::NoKeywords);
        }

        if let Some(end) = self.end_date {
            if end < self.start_date {
                return Err(CampaignConfigError::EndBeforeStart {
                    start: self.start_date,
                    end,
                });
            }
        }

        if let Some(max_runs) = self.max_runs {
            if max_runs < 1 {
                return Err(CampaignConfigError::InvalidMaxRuns);
            }
        }

        if self.internal_linking && self.max_internal_links < 1 {
            return Err(CampaignConfigError::InvalidLinkBudget);
        }

        Ok(())
    }
}

/// Trim keywords, drop empties, and de-duplicate case-insensitively while
/// preserving input order and the casing of the first occurrence.
#[must_use]
pub fn normalize_keywords(keywords: &[String]) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    let mut out = Vec::new();
    for keyword in keywords {
        let trimmed = keyword.trim();
        if trimmed.is_empty() {
            continue;
        }
        if seen.insert(trimmed.to_lowercase()) {
            out.push(trimmed.to_string());
        }
    }
    out
}

#[cfg(test)]
#[path = "campaign_test.rs"]
mod tests;
