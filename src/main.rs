/// Residence Hub - student accommodation management server
///
/// Students apply for accommodation and submit complaints, maintenance
/// requests, sleepover requests and guest registrations; administrators
/// review them and post announcements.
mod account;
mod announcements;
mod api;
mod auth;
mod config;
mod context;
mod db;
mod error;
mod jobs;
mod mailer;
mod notifications;
mod requests;
mod server;

use config::ServerConfig;
use context::AppContext;
use error::HubResult;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> HubResult<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "reshub=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    print_banner();

    // Load configuration
    let config = ServerConfig::from_env()?;

    // Create application context
    let ctx = AppContext::new(config).await?;
    let ctx = Arc::new(ctx);

    // Start background jobs
    let scheduler = Arc::new(jobs::JobScheduler::new(Arc::clone(&ctx)));
    scheduler.start();

    // Start server
    server::serve((*ctx).clone()).await?;

    Ok(())
}

fn print_banner() {
    println!(
        r#"
    ____  ___________ __  ____  ______
   / __ \/ ____/ ___// / / / / / / __ )
  / /_/ / __/  \__ \/ /_/ / / / / __  |
 / _, _/ /___ ___/ / __  / /_/ / /_/ /
/_/ |_/_____//____/_/ /_/\____/_____/

        Residence Hub v{}
        "#,
        env!("CARGO_PKG_VERSION")
    );
}
