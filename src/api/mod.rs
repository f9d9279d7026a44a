/// API routes and handlers
pub mod accounts;
pub mod billing;
pub mod chat;
pub mod extract;
pub mod mail;
pub mod media;

use crate::context::AppContext;
use axum::Router;

/// Build API routes
pub fn routes() -> Router<AppContext> {
    Router::new()
        .merge(accounts::routes())
        .merge(media::routes())
        .merge(billing::routes())
        .merge(mail::routes())
        .merge(chat::routes())
}
