/// Account database model
use crate::error::{ApiError, ApiResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Placeholder avatar assigned when no picture is supplied at creation
pub const DEFAULT_PICTURE: &str =
    "https://res.cloudinary.com/doxykd1yk/image/upload/v1751733473/download_ywnnsj.png";

/// Credits granted to every new account
pub const SIGNUP_CREDITS: i64 = 5;

/// Subscription plan tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Plan {
    Free,
    Pro,
    Enterprise,
}

impl Plan {
    pub fn as_str(&self) -> &'static str {
        match self {
            Plan::Free => "Free",
            Plan::Pro => "Pro",
            Plan::Enterprise => "Enterprise",
        }
    }
}

impl fmt::Display for Plan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Plan {
    type Err = ApiError;

    fn from_str(s: &str) -> ApiResult<Self> {
        match s {
            "Free" => Ok(Plan::Free),
            "Pro" => Ok(Plan::Pro),
            "Enterprise" => Ok(Plan::Enterprise),
            other => Err(ApiError::Validation(format!("Unknown plan: {}", other))),
        }
    }
}

/// Account record in the database
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    pub id: String,
    pub email: String,
    /// bcrypt hash; never exposed through the HTTP surface
    pub password_hash: String,
    pub name: String,
    pub picture: String,
    pub device_token: Option<String>,
    pub plan: Plan,
    pub credits: i64,
    pub subscription_id: Option<String>,
    pub plan_expires_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plan_round_trips_through_str() {
        for plan in [Plan::Free, Plan::Pro, Plan::Enterprise] {
            assert_eq!(plan.as_str().parse::<Plan>().unwrap(), plan);
        }
    }

    #[test]
    fn unknown_plan_rejected() {
        assert!("Professional".parse::<Plan>().is_err());
        assert!("free".parse::<Plan>().is_err());
    }
}
