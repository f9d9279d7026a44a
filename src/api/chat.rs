/// Chat relay endpoint
use crate::{
    api::extract::{validate, Json},
    chat::{ChatRequest, ChatResponse},
    context::AppContext,
    error::ApiResult,
};
use axum::{extract::State, routing::post, Router};

/// Build chat routes
pub fn routes() -> Router<AppContext> {
    Router::new().route("/chat", post(chat))
}

/// Forward one conversation turn to the hosted model
async fn chat(
    State(ctx): State<AppContext>,
    Json(req): Json<ChatRequest>,
) -> ApiResult<axum::Json<ChatResponse>> {
    validate(&req)?;

    let history = req.history.unwrap_or_default();
    let reply = ctx.chat.send(&req.message, &history).await?;

    Ok(axum::Json(ChatResponse { reply }))
}
