// storefront_app/src/errors.rs

use actix_web::http::{header, StatusCode};
use actix_web::{HttpResponse, ResponseError};
use orka::OrkaError;
use serde_json::json;
use storefront::StoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
  #[error(transparent)]
  Store(#[from] StoreError),

  #[error("Configuration Error: {0}")]
  Config(String),

  // Carries the path to come back to after logging in.
  #[error("Login required to access {next}")]
  LoginRequired { next: String },

  #[error("Orka Workflow Error: {source}")]
  Workflow {
    #[from] // Allows conversion from orka::OrkaError
    source: OrkaError,
  },

  #[error("Internal Server Error: {0}")]
  Internal(String), // For miscellaneous errors
}

impl From<sqlx::Error> for AppError {
  fn from(err: sqlx::Error) -> Self {
    AppError::Store(StoreError::Database(err))
  }
}

impl From<actix_web::error::HttpError> for AppError {
  fn from(err: actix_web::error::HttpError) -> Self {
    AppError::Internal(err.to_string())
  }
}

/// `/login/?next=<path>` with `next` percent-encoded.
pub fn login_url(next: &str) -> String {
  let encoded: String = url::form_urlencoded::byte_serialize(next.as_bytes()).collect();
  format!("/login/?next={}", encoded)
}

impl ResponseError for AppError {
  fn status_code(&self) -> StatusCode {
    match self {
      AppError::Store(store_err) => match store_err {
        StoreError::NotFound { .. } => StatusCode::NOT_FOUND,
        StoreError::Validation(_) | StoreError::InvalidForm(_) | StoreError::InvalidTransition { .. } => {
          StatusCode::BAD_REQUEST
        }
        StoreError::PermissionDenied(_) => StatusCode::FORBIDDEN,
        // Handlers turn these into flash redirects; this is the answer for callers that do not.
        StoreError::AlreadyReviewed { .. } | StoreError::EmptyCart => StatusCode::CONFLICT,
        StoreError::Database(_) | StoreError::Migration(_) | StoreError::PasswordHash(_) => {
          StatusCode::INTERNAL_SERVER_ERROR
        }
      },
      AppError::LoginRequired { .. } => StatusCode::FOUND,
      AppError::Config(_) | AppError::Workflow { .. } | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
  }

  fn error_response(&self) -> HttpResponse {
    let status = self.status_code();
    if status.is_server_error() {
      tracing::error!(application_error = %self, "Responding with error");
    } else {
      tracing::debug!(application_error = %self, "Responding with client error");
    }

    match self {
      AppError::LoginRequired { next } => HttpResponse::Found()
        .insert_header((header::LOCATION, login_url(next)))
        .finish(),
      AppError::Store(StoreError::InvalidForm(errors)) => {
        HttpResponse::build(status).json(json!({"error": "Invalid form", "fields": errors}))
      }
      AppError::Store(StoreError::Database(_)) | AppError::Store(StoreError::Migration(_)) => {
        HttpResponse::build(status).json(json!({"error": "Database operation failed"}))
      }
      AppError::Workflow { source } => {
        tracing::error!(orka_error_source = ?source, "Workflow error details");
        HttpResponse::build(status).json(json!({"error": "Workflow processing error"}))
      }
      AppError::Store(StoreError::PasswordHash(_)) | AppError::Config(_) | AppError::Internal(_) => {
        HttpResponse::build(status).json(json!({"error": "An internal error occurred"}))
      }
      AppError::Store(other) => HttpResponse::build(status).json(json!({"error": other.to_string()})),
    }
  }
}

// Define a Result type alias for the application
pub type Result<T, E = AppError> = std::result::Result<T, E>;
