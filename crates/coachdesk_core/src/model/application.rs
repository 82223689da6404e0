use super::calendar_date;
use super::people::SeekerRef;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use time::{Date, OffsetDateTime};

use crate::error::AppError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobApplication {
    pub id: String,
    pub job: JobPosting,
    #[serde(default)]
    pub seeker: Option<SeekerRef>,
    #[serde(with = "calendar_date")]
    pub applied_date: Date,
    #[serde(with = "time::serde::rfc3339")]
    pub last_updated: OffsetDateTime,
    #[serde(default)]
    pub notes: String,
    pub status: ApplicationStatus,
    #[serde(default)]
    pub hired: Option<HireDetails>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobPosting {
    pub title: String,
    pub company: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

/// Pipeline position of an application, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ApplicationStatus {
    Applied,
    PhoneScreen,
    FirstInterview,
    FinalInterview,
    Offered,
    Hired,
    Rejected,
}

impl ApplicationStatus {
    pub const ALL: [ApplicationStatus; 7] = [
        Self::Applied,
        Self::PhoneScreen,
        Self::FirstInterview,
        Self::FinalInterview,
        Self::Offered,
        Self::Hired,
        Self::Rejected,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Applied => "applied",
            Self::PhoneScreen => "phone-screen",
            Self::FirstInterview => "first-interview",
            Self::FinalInterview => "final-interview",
            Self::Offered => "offered",
            Self::Hired => "hired",
            Self::Rejected => "rejected",
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Hired | Self::Rejected)
    }

    /// Accepts the kebab-case key; case and `_`/space separators are ignored.
    pub fn parse(raw: &str) -> Option<Self> {
        let key: String = raw
            .trim()
            .chars()
            .map(|ch| match ch {
                '_' | ' ' => '-',
                other => other.to_ascii_lowercase(),
            })
            .collect();
        Self::ALL.into_iter().find(|status| status.as_str() == key)
    }
}

impl fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ApplicationStatus {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| AppError::validation(format!("unknown status '{}'", s.trim())))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HireDetails {
    #[serde(with = "calendar_date")]
    pub start_date: Date,
    pub job_title: String,
    #[serde(default)]
    pub hourly_wage: Option<f64>,
    pub hours_per_week: u32,
    #[serde(default)]
    pub success_story: Option<String>,
}

/// Payload a caller supplies when moving an application to `hired`.
///
/// Every field is optional so that a partial form can be rejected with a
/// precise `incomplete_data` error instead of a deserialization failure.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct HireRequest {
    pub start_date: Option<Date>,
    pub job_title: Option<String>,
    pub hourly_wage: Option<f64>,
    pub hours_per_week: Option<u32>,
}
