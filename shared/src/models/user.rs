//! User and company account models

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

/// Account role. A superuser is the company account that owns warehouses.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    #[default]
    User,
    Superuser,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::User => "user",
            UserRole::Superuser => "superuser",
        }
    }

    pub fn is_superuser(&self) -> bool {
        matches!(self, UserRole::Superuser)
    }
}

impl TryFrom<String> for UserRole {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.as_str() {
            "user" => Ok(UserRole::User),
            "superuser" => Ok(UserRole::Superuser),
            other => Err(format!("unknown role: {}", other)),
        }
    }
}

/// Subscription window of a company account
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subscription {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

impl Subscription {
    /// Window starting `today` and lasting `days` days
    pub fn starting(today: NaiveDate, days: i64) -> Self {
        Self {
            start_date: today,
            end_date: today + Duration::days(days.max(0)),
        }
    }

    /// A subscription is still usable on its last day
    pub fn is_expired(&self, today: NaiveDate) -> bool {
        today > self.end_date
    }
}

/// Subscription dates stored for a role.
///
/// Superusers always carry both dates, missing ones default to `today`.
/// Regular users never carry them.
pub fn subscription_dates(
    role: UserRole,
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
    today: NaiveDate,
) -> (Option<NaiveDate>, Option<NaiveDate>) {
    match role {
        UserRole::Superuser => (Some(start.unwrap_or(today)), Some(end.unwrap_or(today))),
        UserRole::User => (None, None),
    }
}
