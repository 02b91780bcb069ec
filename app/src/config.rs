// storefront_app/src/config.rs

use crate::errors::{AppError, Result};
use dotenvy::dotenv;
use std::env;

/// Credentials for the superuser created at startup when it does not exist yet.
#[derive(Debug, Clone)]
pub struct AdminBootstrap {
  pub username: String,
  pub email: String,
  pub password: String,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
  pub server_host: String,
  pub server_port: u16,
  pub database_url: String,
  pub database_max_connections: u32,

  // Insert demo categories/products into an empty catalog on startup.
  pub seed_db: bool,
  pub admin_bootstrap: Option<AdminBootstrap>,

  // Mark the session cookie `Secure`; enable behind HTTPS.
  pub session_cookie_secure: bool,

  // Only honoured when built with the `vulnerable-demos` feature.
  pub enable_vulnerable_demos: bool,
}

fn parse_bool(var_name: &str, raw: &str) -> Result<bool> {
  match raw.trim().to_ascii_lowercase().as_str() {
    "1" | "true" | "yes" | "on" => Ok(true),
    "0" | "false" | "no" | "off" | "" => Ok(false),
    other => Err(AppError::Config(format!("Invalid {} value: '{}'", var_name, other))),
  }
}

impl AppConfig {
  pub fn from_env() -> Result<Self> {
    dotenv().ok(); // Load .env file if present

    let get_env = |var_name: &str| env::var(var_name).ok().filter(|v| !v.trim().is_empty());
    let get_bool = |var_name: &str| match get_env(var_name) {
      Some(raw) => parse_bool(var_name, &raw),
      None => Ok(false),
    };

    let server_host = get_env("SERVER_HOST").unwrap_or_else(|| "127.0.0.1".to_string());
    let server_port = get_env("SERVER_PORT")
      .unwrap_or_else(|| "8080".to_string())
      .parse::<u16>()
      .map_err(|e| AppError::Config(format!("Invalid SERVER_PORT: {}", e)))?;
    let database_url = get_env("DATABASE_URL").unwrap_or_else(|| "sqlite://storefront.db".to_string());
    let database_max_connections = get_env("DATABASE_MAX_CONNECTIONS")
      .unwrap_or_else(|| "5".to_string())
      .parse::<u32>()
      .map_err(|e| AppError::Config(format!("Invalid DATABASE_MAX_CONNECTIONS: {}", e)))?;

    let admin_bootstrap = match (get_env("ADMIN_USERNAME"), get_env("ADMIN_PASSWORD")) {
      (Some(username), Some(password)) => Some(AdminBootstrap {
        email: get_env("ADMIN_EMAIL").unwrap_or_else(|| format!("{}@localhost", username)),
        username,
        password,
      }),
      (Some(_), None) | (None, Some(_)) => {
        return Err(AppError::Config(
          "ADMIN_USERNAME and ADMIN_PASSWORD must be set together".to_string(),
        ))
      }
      (None, None) => None,
    };

    let config = Self {
      server_host,
      server_port,
      database_url,
      database_max_connections,
      seed_db: get_bool("SEED_DB")?,
      admin_bootstrap,
      session_cookie_secure: get_bool("SESSION_COOKIE_SECURE")?,
      enable_vulnerable_demos: get_bool("ENABLE_VULNERABLE_DEMOS")?,
    };
    tracing::info!("Application configuration loaded successfully.");
    Ok(config)
  }

  /// Defaults for running against an existing pool, as tests do.
  pub fn local(database_url: &str) -> Self {
    Self {
      server_host: "127.0.0.1".to_string(),
      server_port: 8080,
      database_url: database_url.to_string(),
      database_max_connections: 1,
      seed_db: false,
      admin_bootstrap: None,
      session_cookie_secure: false,
      enable_vulnerable_demos: false,
    }
  }

  pub fn bind_address(&self) -> String {
    format!("{}:{}", self.server_host, self.server_port)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn bool_values() {
    assert!(parse_bool("X", "TRUE").unwrap());
    assert!(parse_bool("X", "1").unwrap());
    assert!(!parse_bool("X", "off").unwrap());
    assert!(matches!(parse_bool("X", "maybe"), Err(AppError::Config(_))));
  }
}
