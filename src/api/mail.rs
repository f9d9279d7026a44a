/// Outbound notification mail endpoint
use crate::{
    api::extract::{validate, Json},
    context::AppContext,
    error::ApiResult,
};
use axum::{extract::State, routing::post, Router};
use serde::{Deserialize, Serialize};
use serde_json::json;
use validator::Validate;

/// Notification email request
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SendEmailRequest {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1))]
    pub subject: String,
    #[validate(length(min = 1))]
    pub message: String,
}

/// Build mail routes
pub fn routes() -> Router<AppContext> {
    Router::new().route("/email", post(send_email))
}

/// Send a notification email
async fn send_email(
    State(ctx): State<AppContext>,
    Json(req): Json<SendEmailRequest>,
) -> ApiResult<axum::Json<serde_json::Value>> {
    validate(&req)?;

    ctx.mailer
        .send_notification(&req.email, &req.subject, &req.message)
        .await?;

    Ok(axum::Json(json!({
        "message": "Email sent successfully"
    })))
}
