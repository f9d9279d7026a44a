/// Account lifecycle endpoints
use crate::{
    account::{
        AccountResponse, AccountView, AuthOutcome, FederatedAuthRequest, LoginRequest,
        ResetPasswordRequest, SignupRequest, UpdateDeviceTokenRequest, UpdateProfileRequest,
    },
    api::extract::{validate, Json},
    context::AppContext,
    error::{ApiError, ApiResult},
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post, put},
    Router,
};
use serde_json::json;

/// Build account routes
pub fn routes() -> Router<AppContext> {
    Router::new()
        .route("/signup", post(signup))
        .route("/login", post(login))
        .route("/googleauth", post(google_auth))
        .route("/update/:user_id", put(update_profile))
        .route("/update-fcm", post(update_device_token))
        .route("/reset-password", post(reset_password))
        .route("/:user_id", get(get_account).delete(delete_account))
}

/// Signup endpoint
async fn signup(
    State(ctx): State<AppContext>,
    Json(req): Json<SignupRequest>,
) -> ApiResult<(StatusCode, axum::Json<AccountResponse>)> {
    validate(&req)?;

    let account = ctx.accounts.signup(req).await?;

    Ok((
        StatusCode::CREATED,
        axum::Json(AccountResponse {
            message: "User created successfully".to_string(),
            account: AccountView::from(account),
        }),
    ))
}

/// Credential login endpoint
async fn login(
    State(ctx): State<AppContext>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<axum::Json<AccountResponse>> {
    validate(&req)?;

    // Login misses surface as 400, never 404
    let account = match ctx.accounts.login(&req.email, &req.password).await {
        Err(ApiError::NotFound(_)) => {
            return Err(ApiError::Validation("User does not exist".to_string()))
        }
        other => other?,
    };

    Ok(axum::Json(AccountResponse {
        message: "Login successful".to_string(),
        account: AccountView::from(account),
    }))
}

/// Federated login/create endpoint
async fn google_auth(
    State(ctx): State<AppContext>,
    Json(req): Json<FederatedAuthRequest>,
) -> ApiResult<(StatusCode, axum::Json<AccountResponse>)> {
    validate(&req)?;

    let (account, outcome) = ctx.accounts.federated_exchange(req).await?;

    let (status, message) = match outcome {
        AuthOutcome::Created => (StatusCode::CREATED, "User created successfully"),
        AuthOutcome::Existing => (StatusCode::OK, "User already exists"),
    };

    Ok((
        status,
        axum::Json(AccountResponse {
            message: message.to_string(),
            account: AccountView::from(account),
        }),
    ))
}

/// Fetch account endpoint
async fn get_account(
    State(ctx): State<AppContext>,
    Path(user_id): Path<String>,
) -> ApiResult<axum::Json<AccountView>> {
    let account = ctx.accounts.get_account(&user_id).await?;

    Ok(axum::Json(AccountView::from(account)))
}

/// Partial profile update endpoint
///
/// Inline image payloads are uploaded to the image host first; only the
/// hosted URI reaches the account store.
async fn update_profile(
    State(ctx): State<AppContext>,
    Path(user_id): Path<String>,
    Json(req): Json<UpdateProfileRequest>,
) -> ApiResult<axum::Json<AccountResponse>> {
    validate(&req)?;

    if req.is_empty() {
        return Err(ApiError::Validation(
            "No fields provided to update".to_string(),
        ));
    }

    let picture = match req.picture {
        Some(ref inline) if inline.starts_with("data:") => Some(ctx.media.upload(inline).await?),
        other => other,
    };

    let account = ctx
        .accounts
        .update_profile(
            &user_id,
            req.name.as_deref(),
            req.email.as_deref(),
            picture.as_deref(),
        )
        .await?;

    Ok(axum::Json(AccountResponse {
        message: "User profile updated successfully".to_string(),
        account: AccountView::from(account),
    }))
}

/// Device token update endpoint
async fn update_device_token(
    State(ctx): State<AppContext>,
    Json(req): Json<UpdateDeviceTokenRequest>,
) -> ApiResult<axum::Json<AccountResponse>> {
    validate(&req)?;

    let account = ctx
        .accounts
        .update_device_token(&req.user_id, req.device_token.as_deref())
        .await?;

    Ok(axum::Json(AccountResponse {
        message: "Device token updated successfully".to_string(),
        account: AccountView::from(account),
    }))
}

/// Password reset endpoint
async fn reset_password(
    State(ctx): State<AppContext>,
    Json(req): Json<ResetPasswordRequest>,
) -> ApiResult<axum::Json<serde_json::Value>> {
    validate(&req)?;

    ctx.accounts
        .reset_password(&req.email, &req.new_password)
        .await?;

    Ok(axum::Json(json!({
        "message": "Password reset successfully"
    })))
}

/// Account deletion endpoint. Hard delete; the client is expected to drop
/// any local session state for this account.
async fn delete_account(
    State(ctx): State<AppContext>,
    Path(user_id): Path<String>,
) -> ApiResult<axum::Json<serde_json::Value>> {
    ctx.accounts.delete_account(&user_id).await?;

    Ok(axum::Json(json!({
        "message": "Account deleted successfully"
    })))
}
