/// Payment gateway client
///
/// Order creation and retrieval are thin REST calls to the hosted gateway;
/// signature verification is local HMAC-SHA256 over the gateway's
/// `orderId|paymentId` pair.

use crate::{
    config::PaymentConfig,
    error::{ApiError, ApiResult},
};
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use serde_json::json;
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Order-creation input
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderInput {
    /// Amount in major currency units; converted to minor units on the wire
    pub amount: u64,
    pub currency: String,
    pub receipt: String,
    pub user_id: String,
    pub plan_name: String,
}

/// Metadata carried through the gateway and recovered at validation time
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderNotes {
    pub user_id: String,
    pub plan_name: String,
}

/// Gateway order as returned by the REST API
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub id: String,
    pub amount: u64,
    pub currency: String,
    #[serde(default)]
    pub receipt: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    pub notes: OrderNotes,
}

/// Payment gateway client service
pub struct PaymentGateway {
    config: Option<PaymentConfig>,
    client: reqwest::Client,
}

impl PaymentGateway {
    /// Create a new gateway client
    pub fn new(config: Option<PaymentConfig>) -> ApiResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(15))
            .build()
            .map_err(|e| ApiError::Internal(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { config, client })
    }

    /// Check if the gateway is configured
    pub fn is_configured(&self) -> bool {
        self.config.is_some()
    }

    fn config(&self) -> ApiResult<&PaymentConfig> {
        self.config
            .as_ref()
            .ok_or_else(|| ApiError::upstream("Payment gateway not configured"))
    }

    /// Create an order with the gateway
    ///
    /// The account id and plan name ride along in the order notes so the
    /// validation step can recover them from the gateway's copy rather than
    /// trusting the client.
    pub async fn create_order(&self, input: CreateOrderInput) -> ApiResult<Order> {
        let config = self.config()?;

        let body = json!({
            "amount": input.amount * 100,
            "currency": input.currency,
            "receipt": input.receipt,
            "notes": {
                "user_id": input.user_id,
                "plan_name": input.plan_name,
            },
        });

        let response = self
            .client
            .post(format!("{}/orders", config.api_url))
            .basic_auth(&config.key_id, Some(&config.key_secret))
            .json(&body)
            .send()
            .await
            .map_err(|e| ApiError::upstream(format!("Order creation failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(ApiError::upstream(format!(
                "Order creation failed with status {}",
                response.status()
            )));
        }

        let order = response
            .json::<Order>()
            .await
            .map_err(|e| ApiError::upstream(format!("Malformed order response: {}", e)))?;

        tracing::info!(order_id = %order.id, "Order created");

        Ok(order)
    }

    /// Fetch an existing order by id
    pub async fn fetch_order(&self, order_id: &str) -> ApiResult<Order> {
        let config = self.config()?;

        let response = self
            .client
            .get(format!("{}/orders/{}", config.api_url, order_id))
            .basic_auth(&config.key_id, Some(&config.key_secret))
            .send()
            .await
            .map_err(|e| ApiError::upstream(format!("Order fetch failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(ApiError::upstream(format!(
                "Order fetch failed with status {}",
                response.status()
            )));
        }

        response
            .json::<Order>()
            .await
            .map_err(|e| ApiError::upstream(format!("Malformed order response: {}", e)))
    }

    /// Verify a gateway payment signature
    ///
    /// The gateway signs `"{order_id}|{payment_id}"` with the shared secret;
    /// the hex digest must match byte-for-byte. A mismatch is fatal to the
    /// enclosing ledger mutation.
    pub fn verify_signature(
        &self,
        order_id: &str,
        payment_id: &str,
        signature: &str,
    ) -> ApiResult<()> {
        let config = self.config()?;

        let mut mac = HmacSha256::new_from_slice(config.key_secret.as_bytes())
            .map_err(|e| ApiError::Internal(format!("HMAC key setup failed: {}", e)))?;
        mac.update(format!("{}|{}", order_id, payment_id).as_bytes());
        let digest = hex::encode(mac.finalize().into_bytes());

        if digest != signature {
            return Err(ApiError::InvalidSignature(
                "Transaction is not legitimate".to_string(),
            ));
        }

        Ok(())
    }
}
