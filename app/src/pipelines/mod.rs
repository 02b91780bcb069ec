// storefront_app/src/pipelines/mod.rs

//! Orka pipelines for the storefront's multi-step workflows.

use crate::errors::AppError;
use orka::Orka;
use std::sync::Arc;

pub mod checkout_pipeline;
pub mod contexts;

/// Registers every pipeline with `orka_instance`. Called once while the
/// application state is built.
pub fn register_all_pipelines(orka_instance: &Arc<Orka<AppError>>) {
  tracing::info!("Registering Orka pipelines...");
  checkout_pipeline::register_checkout_pipeline(orka_instance);
  tracing::info!("All application pipelines registered with Orka.");
}
