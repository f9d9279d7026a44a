/// Entitlement ledger
///
/// Owns the plan/credit fields of the account store. The only in-repo
/// mutation is the payment-confirmation grant; credit consumption lives in
/// an external service.

use crate::{
    account::manager::account_from_row,
    db::account::{Account, Plan},
    error::{ApiError, ApiResult},
};
use chrono::{Months, Utc};
use sqlx::SqlitePool;

/// Credits granted on every confirmed payment
pub const PAYMENT_CREDIT_GRANT: i64 = 50;

/// Entitlement ledger service
pub struct EntitlementLedger {
    db: SqlitePool,
}

impl EntitlementLedger {
    /// Create a new entitlement ledger
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    /// Record a confirmed payment against an account
    ///
    /// Sets the plan and subscription reference, moves the expiry one
    /// calendar month out from now, and adds the fixed credit grant, all in
    /// one statement. Callers must have verified the payment signature
    /// before invoking this; the ledger performs no verification of its own.
    pub async fn record_payment(
        &self,
        account_id: &str,
        plan: Plan,
        payment_reference: &str,
    ) -> ApiResult<Account> {
        let now = Utc::now();
        let plan_expires_at = now
            .checked_add_months(Months::new(1))
            .ok_or_else(|| ApiError::Internal("Plan expiry out of range".to_string()))?;

        let result = sqlx::query(
            "UPDATE account
             SET plan = ?1,
                 subscription_id = ?2,
                 plan_expires_at = ?3,
                 credits = credits + ?4,
                 updated_at = ?5
             WHERE id = ?6",
        )
        .bind(plan.as_str())
        .bind(payment_reference)
        .bind(plan_expires_at)
        .bind(PAYMENT_CREDIT_GRANT)
        .bind(now)
        .bind(account_id)
        .execute(&self.db)
        .await
        .map_err(ApiError::Database)?;

        if result.rows_affected() == 0 {
            return Err(ApiError::NotFound("Account not found".to_string()));
        }

        tracing::info!(
            account_id = %account_id,
            plan = %plan,
            payment_reference = %payment_reference,
            "Payment recorded"
        );

        let row = sqlx::query("SELECT * FROM account WHERE id = ?1")
            .bind(account_id)
            .fetch_one(&self.db)
            .await
            .map_err(ApiError::Database)?;

        account_from_row(&row)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::account::{manager::tests::create_test_pool, AccountManager, SignupRequest};

    async fn setup() -> (AccountManager, EntitlementLedger, Account) {
        let pool = create_test_pool().await;
        let manager = AccountManager::new(pool.clone());
        let ledger = EntitlementLedger::new(pool);

        let account = manager
            .signup(SignupRequest {
                email: "a@f.com".to_string(),
                password: "pw123456".to_string(),
                name: "A".to_string(),
                picture: None,
            })
            .await
            .unwrap();

        (manager, ledger, account)
    }

    #[tokio::test]
    async fn payment_upgrades_plan_and_grants_credits() {
        let (_, ledger, account) = setup().await;
        let before = Utc::now();

        let updated = ledger
            .record_payment(&account.id, Plan::Pro, "pay_123")
            .await
            .unwrap();

        assert_eq!(updated.plan, Plan::Pro);
        assert_eq!(updated.credits, account.credits + PAYMENT_CREDIT_GRANT);
        assert_eq!(updated.subscription_id.as_deref(), Some("pay_123"));

        let expires = updated.plan_expires_at.expect("expiry must be set");
        let expected = before.checked_add_months(Months::new(1)).unwrap();
        let drift = (expires - expected).num_seconds().abs();
        assert!(drift < 5, "expiry drifted {}s from one month out", drift);
    }

    #[tokio::test]
    async fn grant_is_fixed_regardless_of_prior_balance() {
        let (_, ledger, account) = setup().await;

        let first = ledger
            .record_payment(&account.id, Plan::Pro, "pay_1")
            .await
            .unwrap();
        let second = ledger
            .record_payment(&account.id, Plan::Enterprise, "pay_2")
            .await
            .unwrap();

        assert_eq!(first.credits, 5 + PAYMENT_CREDIT_GRANT);
        assert_eq!(second.credits, 5 + 2 * PAYMENT_CREDIT_GRANT);
        assert_eq!(second.plan, Plan::Enterprise);
        assert_eq!(second.subscription_id.as_deref(), Some("pay_2"));
    }

    #[tokio::test]
    async fn unknown_account_is_not_found() {
        let (_, ledger, _) = setup().await;

        assert!(matches!(
            ledger.record_payment("missing-id", Plan::Pro, "pay_123").await,
            Err(ApiError::NotFound(_))
        ));
    }
}
