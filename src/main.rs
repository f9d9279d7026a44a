/// Krishi Sahayak - crop advisory backend
///
/// Account lifecycle, credit/plan ledger, payment confirmation, and thin
/// relays to the hosted image, mail, and generative-model services.

mod account;
mod api;
mod chat;
mod config;
mod context;
mod db;
mod entitlements;
mod error;
mod mailer;
mod media;
mod payments;
mod server;

use config::ServerConfig;
use context::AppContext;
use error::ApiResult;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> ApiResult<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "krishi_server=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Print banner
    print_banner();

    // Load configuration
    let config = ServerConfig::from_env()?;

    // Create application context
    let ctx = AppContext::new(config).await?;

    // Start server
    server::serve(ctx).await?;

    Ok(())
}

fn print_banner() {
    println!(
        r#"
    __ __      _      __    _
   / //_/_____(_)____/ /_  (_)
  / ,<  / ___/ / ___/ __ \/ /
 / /| |/ /  / (__  ) / / / /
/_/ |_/_/  /_/____/_/ /_/_/

        Krishi Sahayak backend v{}
        "#,
        env!("CARGO_PKG_VERSION")
    );
}
