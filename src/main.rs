mod app;
mod auth;
mod category;
mod common;
mod config;
mod dish;
mod employee;
mod error;
mod setmeal;
mod state;
mod user;
mod wechat;

use anyhow::Context;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let env_filter = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| "sky_takeout=debug,axum=info,tower_http=info".to_string());
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

    let state = state::AppState::init().await?;

    sqlx::migrate!("./migrations")
        .run(&state.db)
        .await
        .context("run migrations")?;

    if let Some(password) = state.config.admin_bootstrap_password.as_deref() {
        employee::services::ensure_admin(&state.db, password).await?;
    }

    app::serve(app::build_app(state)).await
}
