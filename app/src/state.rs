// storefront_app/src/state.rs
use crate::config::AppConfig;
use crate::errors::AppError;
use crate::pipelines;
use sqlx::SqlitePool;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
  pub db_pool: SqlitePool,
  pub orka_instance: Arc<orka::Orka<AppError>>,
  pub config: Arc<AppConfig>, // Share loaded config
}

impl AppState {
  /// Builds the shared state and registers every pipeline with a fresh Orka
  /// registry.
  pub fn new(db_pool: SqlitePool, config: AppConfig) -> Self {
    let orka_instance = Arc::new(orka::Orka::<AppError>::new());
    pipelines::register_all_pipelines(&orka_instance);
    Self {
      db_pool,
      orka_instance,
      config: Arc::new(config),
    }
  }
}
