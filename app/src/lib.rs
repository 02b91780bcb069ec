// storefront_app/src/lib.rs

//! HTTP front end for the storefront: configuration, error mapping, session
//! and flash extractors, Orka pipelines and the route table.

pub mod config;
pub mod errors;
pub mod pipelines;
pub mod state;
pub mod web;

#[cfg(feature = "vulnerable-demos")]
pub mod vulnerable;

use actix_web::web::ServiceConfig;

use crate::state::AppState;

/// Registers every route the running configuration allows.
pub fn configure_services(cfg: &mut ServiceConfig, app_state: &AppState) {
  web::configure_app_routes(cfg);

  #[cfg(feature = "vulnerable-demos")]
  if app_state.config.enable_vulnerable_demos {
    vulnerable::configure(cfg, app_state.db_pool.clone());
  }

  #[cfg(not(feature = "vulnerable-demos"))]
  if app_state.config.enable_vulnerable_demos {
    tracing::warn!("ENABLE_VULNERABLE_DEMOS is set but this build lacks the `vulnerable-demos` feature; ignoring.");
  }
}
