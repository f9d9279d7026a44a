/// Payment order and confirmation endpoints
use crate::{
    account::AccountView,
    api::extract::{validate, Json},
    context::AppContext,
    db::account::Plan,
    error::{ApiError, ApiResult},
    payments::{CreateOrderInput, Order},
};
use axum::{extract::State, routing::post, Router};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Order confirmation request carrying the gateway's signature
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ValidateOrderRequest {
    #[validate(length(min = 1))]
    pub order_id: String,
    #[validate(length(min = 1))]
    pub payment_id: String,
    #[validate(length(min = 1))]
    pub signature: String,
}

/// Successful payment confirmation response
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentConfirmation {
    pub message: String,
    pub account: AccountView,
    pub order_id: String,
    pub payment_id: String,
}

/// Build billing routes
pub fn routes() -> Router<AppContext> {
    Router::new()
        .route("/order", post(create_order))
        .route("/order/validate", post(validate_order))
}

/// Create a payment order with the gateway
async fn create_order(
    State(ctx): State<AppContext>,
    Json(req): Json<CreateOrderInput>,
) -> ApiResult<axum::Json<Order>> {
    if req.amount == 0 {
        return Err(ApiError::Validation(
            "Order amount must be positive".to_string(),
        ));
    }
    req.plan_name.parse::<Plan>()?;

    let order = ctx.payments.create_order(req).await?;

    Ok(axum::Json(order))
}

/// Confirm a payment and apply the entitlement grant
///
/// The signature is verified before anything else; a mismatch leaves the
/// ledger untouched. The account id and plan come from the gateway's copy
/// of the order, not from the caller.
async fn validate_order(
    State(ctx): State<AppContext>,
    Json(req): Json<ValidateOrderRequest>,
) -> ApiResult<axum::Json<PaymentConfirmation>> {
    validate(&req)?;

    ctx.payments
        .verify_signature(&req.order_id, &req.payment_id, &req.signature)?;

    let order = ctx.payments.fetch_order(&req.order_id).await?;
    let plan: Plan = order.notes.plan_name.parse()?;

    let account = ctx
        .entitlements
        .record_payment(&order.notes.user_id, plan, &req.payment_id)
        .await?;

    Ok(axum::Json(PaymentConfirmation {
        message: "Payment successful! Your plan has been upgraded.".to_string(),
        account: AccountView::from(account),
        order_id: req.order_id,
        payment_id: req.payment_id,
    }))
}
