/// Image-host passthrough endpoints
use crate::{
    account::{AccountResponse, AccountView, ResetImageRequest},
    api::extract::{validate, Json},
    context::AppContext,
    error::ApiResult,
};
use axum::{extract::State, routing::post, Router};
use serde::{Deserialize, Serialize};
use serde_json::json;
use validator::Validate;

/// Inline image upload request
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct UploadRequest {
    #[validate(length(min = 1))]
    pub image: String,
}

/// Build media routes
pub fn routes() -> Router<AppContext> {
    Router::new()
        .route("/upload", post(upload_image))
        .route("/reset-image", post(reset_image))
}

/// Upload an inline image and return its hosted URI
async fn upload_image(
    State(ctx): State<AppContext>,
    Json(req): Json<UploadRequest>,
) -> ApiResult<axum::Json<serde_json::Value>> {
    validate(&req)?;

    let url = ctx.media.upload(&req.image).await?;

    Ok(axum::Json(json!({ "url": url })))
}

/// Reset the stored picture to a caller-supplied URI
async fn reset_image(
    State(ctx): State<AppContext>,
    Json(req): Json<ResetImageRequest>,
) -> ApiResult<axum::Json<AccountResponse>> {
    validate(&req)?;

    let account = ctx.accounts.set_picture(&req.user_id, &req.picture).await?;

    Ok(axum::Json(AccountResponse {
        message: "Image reset successfully".to_string(),
        account: AccountView::from(account),
    }))
}
