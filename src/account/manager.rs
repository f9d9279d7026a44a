/// Account manager implementation using runtime queries
///
/// Uses sqlx runtime query building instead of compile-time macros to avoid
/// needing DATABASE_URL during compilation.

use crate::{
    account::{password, AuthOutcome, FederatedAuthRequest, SignupRequest},
    db::account::{Account, DEFAULT_PICTURE, SIGNUP_CREDITS},
    error::{ApiError, ApiResult},
};
use chrono::{DateTime, Utc};
use sqlx::{sqlite::SqliteRow, Row, SqlitePool};
use uuid::Uuid;

/// Account manager service
pub struct AccountManager {
    db: SqlitePool,
}

impl AccountManager {
    /// Create a new account manager
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    /// Create a new account with credential signup
    ///
    /// Fails with `Conflict` when the email is already registered.
    pub async fn signup(&self, req: SignupRequest) -> ApiResult<Account> {
        self.validate_email(&req.email)?;
        self.validate_password(&req.password)?;

        if self.email_exists(&req.email).await? {
            return Err(ApiError::Conflict("Email already registered".to_string()));
        }

        let password_hash = password::hash(&req.password).await?;
        let picture = req
            .picture
            .filter(|p| !p.is_empty())
            .unwrap_or_else(|| DEFAULT_PICTURE.to_string());

        let account = self
            .insert_account(&req.email, &password_hash, &req.name, &picture)
            .await?;

        tracing::info!(account_id = %account.id, "Account created");

        Ok(account)
    }

    /// Authenticate with email and password
    ///
    /// Fails with `NotFound` when no account has this email and with
    /// `InvalidCredentials` when the hash comparison fails. No state is
    /// mutated on either failure.
    pub async fn login(&self, email: &str, password_plain: &str) -> ApiResult<Account> {
        let account = self.get_account_by_email(email).await?;

        let valid = password::verify(password_plain, &account.password_hash).await?;
        if !valid {
            return Err(ApiError::InvalidCredentials(
                "Password does not match".to_string(),
            ));
        }

        Ok(account)
    }

    /// Exchange a federated identity assertion for a local account
    ///
    /// A hit on the email returns the existing account unchanged; the
    /// asserted name and picture are NOT refreshed on repeat logins. A miss
    /// creates an account using the federated subject identifier as the
    /// password surrogate.
    pub async fn federated_exchange(
        &self,
        req: FederatedAuthRequest,
    ) -> ApiResult<(Account, AuthOutcome)> {
        self.validate_email(&req.email)?;

        match self.get_account_by_email(&req.email).await {
            Ok(existing) => Ok((existing, AuthOutcome::Existing)),
            Err(ApiError::NotFound(_)) => {
                let password_hash = password::hash(&req.subject).await?;
                let picture = req
                    .picture
                    .filter(|p| !p.is_empty())
                    .unwrap_or_else(|| DEFAULT_PICTURE.to_string());

                let account = self
                    .insert_account(&req.email, &password_hash, &req.name, &picture)
                    .await?;

                tracing::info!(account_id = %account.id, "Account created via federated exchange");

                Ok((account, AuthOutcome::Created))
            }
            Err(e) => Err(e),
        }
    }

    /// Get account by id
    pub async fn get_account(&self, id: &str) -> ApiResult<Account> {
        let row = sqlx::query("SELECT * FROM account WHERE id = ?1")
            .bind(id)
            .fetch_optional(&self.db)
            .await
            .map_err(ApiError::Database)?
            .ok_or_else(|| ApiError::NotFound("Account not found".to_string()))?;

        account_from_row(&row)
    }

    /// Get account by email
    pub async fn get_account_by_email(&self, email: &str) -> ApiResult<Account> {
        let row = sqlx::query("SELECT * FROM account WHERE email = ?1")
            .bind(email)
            .fetch_optional(&self.db)
            .await
            .map_err(ApiError::Database)?
            .ok_or_else(|| ApiError::NotFound("Account not found".to_string()))?;

        account_from_row(&row)
    }

    /// Apply a partial profile update
    ///
    /// Only provided fields are written. Each field is its own UPDATE
    /// statement; a crash between statements leaves the earlier writes in
    /// place. Concurrent updates to the same account are last-write-wins.
    pub async fn update_profile(
        &self,
        id: &str,
        name: Option<&str>,
        email: Option<&str>,
        picture: Option<&str>,
    ) -> ApiResult<Account> {
        // Resolve the id up front so an unknown account is NotFound rather
        // than a silent no-op.
        self.get_account(id).await?;

        let now = Utc::now();

        if let Some(name) = name {
            sqlx::query("UPDATE account SET name = ?1, updated_at = ?2 WHERE id = ?3")
                .bind(name)
                .bind(now)
                .bind(id)
                .execute(&self.db)
                .await
                .map_err(ApiError::Database)?;
        }

        if let Some(email) = email {
            self.validate_email(email)?;
            sqlx::query("UPDATE account SET email = ?1, updated_at = ?2 WHERE id = ?3")
                .bind(email)
                .bind(now)
                .bind(id)
                .execute(&self.db)
                .await
                .map_err(ApiError::Database)?;
        }

        if let Some(picture) = picture {
            sqlx::query("UPDATE account SET picture = ?1, updated_at = ?2 WHERE id = ?3")
                .bind(picture)
                .bind(now)
                .bind(id)
                .execute(&self.db)
                .await
                .map_err(ApiError::Database)?;
        }

        tracing::info!(account_id = %id, "Profile updated");

        self.get_account(id).await
    }

    /// Overwrite the stored picture URI
    pub async fn set_picture(&self, id: &str, picture: &str) -> ApiResult<Account> {
        let result = sqlx::query("UPDATE account SET picture = ?1, updated_at = ?2 WHERE id = ?3")
            .bind(picture)
            .bind(Utc::now())
            .bind(id)
            .execute(&self.db)
            .await
            .map_err(ApiError::Database)?;

        if result.rows_affected() == 0 {
            return Err(ApiError::NotFound("Account not found".to_string()));
        }

        self.get_account(id).await
    }

    /// Overwrite the device push token wholesale
    pub async fn update_device_token(
        &self,
        id: &str,
        token: Option<&str>,
    ) -> ApiResult<Account> {
        let result =
            sqlx::query("UPDATE account SET device_token = ?1, updated_at = ?2 WHERE id = ?3")
                .bind(token)
                .bind(Utc::now())
                .bind(id)
                .execute(&self.db)
                .await
                .map_err(ApiError::Database)?;

        if result.rows_affected() == 0 {
            return Err(ApiError::NotFound("Account not found".to_string()));
        }

        self.get_account(id).await
    }

    /// Set a new password for the account with this email
    pub async fn reset_password(&self, email: &str, new_password: &str) -> ApiResult<()> {
        self.validate_password(new_password)?;

        let account = self.get_account_by_email(email).await?;
        let password_hash = password::hash(new_password).await?;

        sqlx::query("UPDATE account SET password_hash = ?1, updated_at = ?2 WHERE id = ?3")
            .bind(&password_hash)
            .bind(Utc::now())
            .bind(&account.id)
            .execute(&self.db)
            .await
            .map_err(ApiError::Database)?;

        tracing::info!(account_id = %account.id, "Password reset");

        Ok(())
    }

    /// Hard-delete an account. Irreversible; no grace period.
    pub async fn delete_account(&self, id: &str) -> ApiResult<()> {
        let result = sqlx::query("DELETE FROM account WHERE id = ?1")
            .bind(id)
            .execute(&self.db)
            .await
            .map_err(ApiError::Database)?;

        if result.rows_affected() == 0 {
            return Err(ApiError::NotFound("Account not found".to_string()));
        }

        tracing::info!(account_id = %id, "Account deleted");

        Ok(())
    }

    /// Check if email exists
    async fn email_exists(&self, email: &str) -> ApiResult<bool> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM account WHERE email = ?1")
            .bind(email)
            .fetch_one(&self.db)
            .await
            .map_err(ApiError::Database)?;

        Ok(count > 0)
    }

    /// Insert a fresh account with default plan and credits
    async fn insert_account(
        &self,
        email: &str,
        password_hash: &str,
        name: &str,
        picture: &str,
    ) -> ApiResult<Account> {
        let id = Uuid::new_v4().to_string();
        let now = Utc::now();

        sqlx::query(
            "INSERT INTO account (id, email, password_hash, name, picture, device_token, plan, credits, subscription_id, plan_expires_at, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, NULL, 'Free', ?6, NULL, NULL, ?7, ?7)",
        )
        .bind(&id)
        .bind(email)
        .bind(password_hash)
        .bind(name)
        .bind(picture)
        .bind(SIGNUP_CREDITS)
        .bind(now)
        .execute(&self.db)
        .await
        .map_err(ApiError::Database)?;

        self.get_account(&id).await
    }

    /// Validate email format
    fn validate_email(&self, email: &str) -> ApiResult<()> {
        if !email.contains('@') {
            return Err(ApiError::Validation("Invalid email format".to_string()));
        }

        Ok(())
    }

    /// Validate password length
    fn validate_password(&self, password_plain: &str) -> ApiResult<()> {
        if password_plain.len() < 6 {
            return Err(ApiError::Validation(
                "Password must be at least 6 characters".to_string(),
            ));
        }

        Ok(())
    }
}

/// Map a database row to an Account
pub(crate) fn account_from_row(row: &SqliteRow) -> ApiResult<Account> {
    let plan: String = row.try_get("plan")?;
    let plan_expires_at: Option<DateTime<Utc>> = row.try_get("plan_expires_at")?;

    Ok(Account {
        id: row.try_get("id")?,
        email: row.try_get("email")?,
        password_hash: row.try_get("password_hash")?,
        name: row.try_get("name")?,
        picture: row.try_get("picture")?,
        device_token: row.try_get("device_token")?,
        plan: plan.parse()?,
        credits: row.try_get("credits")?,
        subscription_id: row.try_get("subscription_id")?,
        plan_expires_at,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::db::account::Plan;
    use sqlx::sqlite::SqlitePoolOptions;

    pub(crate) async fn create_test_pool() -> SqlitePool {
        // Single connection so every query sees the same in-memory database
        let db = SqlitePoolOptions::new()
            .max_connections(1)
            .connect(":memory:")
            .await
            .unwrap();

        sqlx::query(
            r#"
            CREATE TABLE account (
                id TEXT PRIMARY KEY,
                email TEXT NOT NULL UNIQUE,
                password_hash TEXT NOT NULL,
                name TEXT NOT NULL,
                picture TEXT NOT NULL,
                device_token TEXT,
                plan TEXT NOT NULL DEFAULT 'Free',
                credits INTEGER NOT NULL DEFAULT 5,
                subscription_id TEXT,
                plan_expires_at DATETIME,
                created_at DATETIME NOT NULL,
                updated_at DATETIME NOT NULL
            )
            "#,
        )
        .execute(&db)
        .await
        .unwrap();

        db
    }

    async fn create_test_manager() -> AccountManager {
        AccountManager::new(create_test_pool().await)
    }

    fn signup_request(email: &str) -> SignupRequest {
        SignupRequest {
            email: email.to_string(),
            password: "pw123456".to_string(),
            name: "A".to_string(),
            picture: None,
        }
    }

    #[tokio::test]
    async fn signup_creates_account_with_defaults() {
        let manager = create_test_manager().await;

        let account = manager.signup(signup_request("a@f.com")).await.unwrap();

        assert_eq!(account.email, "a@f.com");
        assert_eq!(account.plan, Plan::Free);
        assert_eq!(account.credits, 5);
        assert_eq!(account.picture, DEFAULT_PICTURE);
        assert!(account.device_token.is_none());
        assert!(account.subscription_id.is_none());
        assert!(account.plan_expires_at.is_none());
        assert_ne!(account.password_hash, "pw123456");
    }

    #[tokio::test]
    async fn duplicate_signup_is_conflict() {
        let manager = create_test_manager().await;

        manager.signup(signup_request("a@f.com")).await.unwrap();
        let result = manager.signup(signup_request("a@f.com")).await;

        match result {
            Err(ApiError::Conflict(_)) => {}
            other => panic!("Expected Conflict, got {:?}", other.map(|a| a.id)),
        }

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM account")
            .fetch_one(&manager.db)
            .await
            .unwrap();
        assert_eq!(count, 1);
    }

    #[tokio::test]
    async fn signup_rejects_short_password() {
        let manager = create_test_manager().await;

        let mut req = signup_request("a@f.com");
        req.password = "pw".to_string();

        assert!(matches!(
            manager.signup(req).await,
            Err(ApiError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn login_round_trips_signup() {
        let manager = create_test_manager().await;

        let created = manager.signup(signup_request("a@f.com")).await.unwrap();
        let logged_in = manager.login("a@f.com", "pw123456").await.unwrap();

        assert_eq!(logged_in.id, created.id);
    }

    #[tokio::test]
    async fn login_wrong_password_is_invalid_credentials() {
        let manager = create_test_manager().await;

        let created = manager.signup(signup_request("a@f.com")).await.unwrap();
        let result = manager.login("a@f.com", "wrong-pass").await;

        assert!(matches!(result, Err(ApiError::InvalidCredentials(_))));

        // No mutation on failure
        let account = manager.get_account(&created.id).await.unwrap();
        assert_eq!(account.updated_at, created.updated_at);
    }

    #[tokio::test]
    async fn login_unknown_email_is_not_found() {
        let manager = create_test_manager().await;

        assert!(matches!(
            manager.login("missing@f.com", "pw123456").await,
            Err(ApiError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn federated_exchange_is_idempotent() {
        let manager = create_test_manager().await;

        let req = FederatedAuthRequest {
            name: "A".to_string(),
            email: "a@f.com".to_string(),
            subject: "google-sub-1234".to_string(),
            picture: Some("https://img.example/p.png".to_string()),
        };

        let (first, outcome1) = manager.federated_exchange(req.clone()).await.unwrap();
        assert_eq!(outcome1, AuthOutcome::Created);
        assert_eq!(first.picture, "https://img.example/p.png");

        // Repeat with different asserted name/picture: existing account
        // returned unchanged.
        let mut repeat = req.clone();
        repeat.name = "Renamed".to_string();
        repeat.picture = Some("https://img.example/other.png".to_string());

        let (second, outcome2) = manager.federated_exchange(repeat).await.unwrap();
        assert_eq!(outcome2, AuthOutcome::Existing);
        assert_eq!(second.id, first.id);
        assert_eq!(second.name, "A");
        assert_eq!(second.picture, "https://img.example/p.png");

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM account")
            .fetch_one(&manager.db)
            .await
            .unwrap();
        assert_eq!(count, 1);
    }

    #[tokio::test]
    async fn federated_subject_works_as_password_surrogate() {
        let manager = create_test_manager().await;

        let req = FederatedAuthRequest {
            name: "A".to_string(),
            email: "a@f.com".to_string(),
            subject: "google-sub-1234".to_string(),
            picture: None,
        };
        manager.federated_exchange(req).await.unwrap();

        assert!(manager.login("a@f.com", "google-sub-1234").await.is_ok());
    }

    #[tokio::test]
    async fn update_profile_is_partial() {
        let manager = create_test_manager().await;

        let created = manager.signup(signup_request("a@f.com")).await.unwrap();
        let updated = manager
            .update_profile(&created.id, Some("X"), None, None)
            .await
            .unwrap();

        assert_eq!(updated.name, "X");
        assert_eq!(updated.email, created.email);
        assert_eq!(updated.picture, created.picture);
    }

    #[tokio::test]
    async fn update_profile_unknown_id_is_not_found() {
        let manager = create_test_manager().await;

        assert!(matches!(
            manager
                .update_profile("missing-id", Some("X"), None, None)
                .await,
            Err(ApiError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn update_profile_never_touches_entitlements() {
        let manager = create_test_manager().await;

        let created = manager.signup(signup_request("a@f.com")).await.unwrap();
        let updated = manager
            .update_profile(
                &created.id,
                Some("X"),
                Some("new@f.com"),
                Some("https://img.example/new.png"),
            )
            .await
            .unwrap();

        assert_eq!(updated.plan, created.plan);
        assert_eq!(updated.credits, created.credits);
        assert_eq!(updated.subscription_id, created.subscription_id);
    }

    #[tokio::test]
    async fn device_token_is_overwritten_wholesale() {
        let manager = create_test_manager().await;

        let created = manager.signup(signup_request("a@f.com")).await.unwrap();

        let with_token = manager
            .update_device_token(&created.id, Some("fcm-token-1"))
            .await
            .unwrap();
        assert_eq!(with_token.device_token.as_deref(), Some("fcm-token-1"));

        let replaced = manager
            .update_device_token(&created.id, Some("fcm-token-2"))
            .await
            .unwrap();
        assert_eq!(replaced.device_token.as_deref(), Some("fcm-token-2"));

        let cleared = manager
            .update_device_token(&created.id, None)
            .await
            .unwrap();
        assert!(cleared.device_token.is_none());
    }

    #[tokio::test]
    async fn reset_password_swaps_credentials() {
        let manager = create_test_manager().await;

        manager.signup(signup_request("a@f.com")).await.unwrap();
        manager
            .reset_password("a@f.com", "new-password")
            .await
            .unwrap();

        assert!(manager.login("a@f.com", "new-password").await.is_ok());
        assert!(matches!(
            manager.login("a@f.com", "pw123456").await,
            Err(ApiError::InvalidCredentials(_))
        ));
    }

    #[tokio::test]
    async fn reset_password_unknown_email_is_not_found() {
        let manager = create_test_manager().await;

        assert!(matches!(
            manager.reset_password("missing@f.com", "new-password").await,
            Err(ApiError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn delete_account_is_hard_delete() {
        let manager = create_test_manager().await;

        let created = manager.signup(signup_request("a@f.com")).await.unwrap();
        manager.delete_account(&created.id).await.unwrap();

        assert!(matches!(
            manager.get_account(&created.id).await,
            Err(ApiError::NotFound(_))
        ));
        assert!(matches!(
            manager.delete_account(&created.id).await,
            Err(ApiError::NotFound(_))
        ));
    }
}
