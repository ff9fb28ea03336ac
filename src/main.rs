mod app;
mod auth;
mod config;
mod db;
mod error;
mod products;
mod state;
#[cfg(test)]
mod testing;
mod users;

use crate::config::AppConfig;
use crate::state::AppState;

fn init_tracing() {
    let env_filter = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| "ecom_api=debug,axum=info,tower_http=info".to_string());
    let json_logs = std::env::var("LOG_FORMAT")
        .map(|v| v == "json")
        .unwrap_or(false);

    if json_logs {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(env_filter).init();
    }
}

async fn run() -> anyhow::Result<()> {
    let config = AppConfig::from_env()?;
    let addr = config.listen_addr()?;

    let app_state = AppState::init(config).await?;
    let app = app::build_app(app_state);

    app::serve(app, addr).await
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    init_tracing();

    // No partial start: any bootstrap failure ends the process.
    if let Err(e) = run().await {
        tracing::error!(error = ?e, "fatal startup error");
        std::process::exit(1);
    }
}
