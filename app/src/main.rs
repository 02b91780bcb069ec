// storefront_app/src/main.rs

use actix_web::{web as actix_data, App, HttpServer};
use anyhow::Context;
use storefront::{accounts, db, seed};
use storefront_app::config::AppConfig;
use storefront_app::state::AppState;
use tracing::Level;
use tracing_subscriber::fmt::format::FmtSpan; // For span events in tracing

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
  let subscriber = tracing_subscriber::fmt()
    .with_max_level(Level::INFO) // Default level
    .with_env_filter(tracing_subscriber::EnvFilter::from_default_env()) // Allow RUST_LOG override
    .with_span_events(FmtSpan::CLOSE); // Log when spans close, showing duration
  // LOG_FORMAT=json switches to one JSON object per line.
  if std::env::var("LOG_FORMAT").map(|v| v.eq_ignore_ascii_case("json")).unwrap_or(false) {
    subscriber.json().init();
  } else {
    subscriber.init();
  }

  tracing::info!("Starting storefront server...");

  let app_config = AppConfig::from_env().context("loading configuration")?;

  let db_pool = db::connect(&app_config.database_url, app_config.database_max_connections)
    .await
    .with_context(|| format!("connecting to {}", app_config.database_url))?;
  tracing::info!("Successfully connected to the database.");
  db::migrate(&db_pool).await.context("running migrations")?;
  let pruned = accounts::prune_expired_sessions(&db_pool).await?;
  tracing::info!(pruned, "Expired sessions pruned.");

  if app_config.seed_db {
    seed::seed_demo_catalog(&db_pool).await?;
  }
  if let Some(admin) = &app_config.admin_bootstrap {
    seed::bootstrap_admin(&db_pool, &admin.username, &admin.email, &admin.password).await?;
  }

  let server_address = app_config.bind_address();
  let app_state = AppState::new(db_pool, app_config);

  tracing::info!("Attempting to bind server to {}...", server_address);
  HttpServer::new(move || {
    let routes_state = app_state.clone();
    App::new()
      .app_data(actix_data::Data::new(app_state.clone())) // Share AppState with handlers
      .wrap(tracing_actix_web::TracingLogger::default()) // Actix middleware for tracing requests
      .configure(move |cfg| storefront_app::configure_services(cfg, &routes_state))
  })
  .bind(&server_address)
  .with_context(|| format!("binding {}", server_address))?
  .run()
  .await?;
  Ok(())
}
