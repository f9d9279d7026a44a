/// Account management system
///
/// Handles account creation, credential and federated login, profile
/// mutation, and account deletion.

pub(crate) mod manager;
pub mod password;

pub use manager::AccountManager;

use crate::db::account::{Account, Plan};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Outcome of a federated identity exchange
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthOutcome {
    /// A new account was created for this identity
    Created,
    /// An account with this email already existed and was returned unchanged
    Existing,
}

/// Signup request
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SignupRequest {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 6))]
    pub password: String,
    #[validate(length(min = 1))]
    pub name: String,
    pub picture: Option<String>,
}

/// Credential login request
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1))]
    pub password: String,
}

/// Federated identity exchange request
///
/// The client decodes the identity provider's credential and forwards the
/// asserted fields; `subject` is the provider's stable subject identifier.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct FederatedAuthRequest {
    #[validate(length(min = 1))]
    pub name: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1))]
    pub subject: String,
    pub picture: Option<String>,
}

/// Partial profile update request; only provided fields are written
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct UpdateProfileRequest {
    #[validate(length(min = 1))]
    pub name: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
    pub picture: Option<String>,
}

impl UpdateProfileRequest {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.email.is_none() && self.picture.is_none()
    }
}

/// Device token update request
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateDeviceTokenRequest {
    #[validate(length(min = 1))]
    pub user_id: String,
    pub device_token: Option<String>,
}

/// Password reset request
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ResetPasswordRequest {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 6))]
    pub new_password: String,
}

/// Image reset request
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ResetImageRequest {
    #[validate(length(min = 1))]
    pub user_id: String,
    #[validate(length(min = 1))]
    pub picture: String,
}

/// Account snapshot returned over the wire; excludes the password hash
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountView {
    pub id: String,
    pub email: String,
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

impl From<Account> for AccountView {
    fn from(account: Account) -> Self {
        Self {
            id: account.id,
            email: account.email,
            name: account.name,
            picture: account.picture,
            device_token: account.device_token,
            plan: account.plan,
            credits: account.credits,
            subscription_id: account.subscription_id,
            plan_expires_at: account.plan_expires_at,
            created_at: account.created_at,
            updated_at: account.updated_at,
        }
    }
}

/// Standard account response envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountResponse {
    pub message: String,
    pub account: AccountView,
}
