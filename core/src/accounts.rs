// storefront/src/accounts.rs

//! Registration, credential checks, permissions and server-side sessions.

use crate::error::{Result, StoreError};
use crate::forms::{self, FormErrors, NON_FIELD_ERRORS};
use crate::models::{Permission, User};
use argon2::{
  password_hash::{
    rand_core::OsRng, // For generating random salts
    PasswordHash,
    PasswordHasher,
    PasswordVerifier,
    SaltString,
  },
  Argon2,
};
use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;
use sqlx::SqlitePool;
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

pub const USERNAME_MAX_CHARS: usize = 150;
/// The login form only accepts short usernames.
pub const LOGIN_USERNAME_MAX_CHARS: usize = 10;
pub const PASSWORD_MIN_CHARS: usize = 8;
pub const SESSION_TTL_DAYS: i64 = 14;

const USER_COLUMNS: &str = "id, username, email, password_hash, is_superuser, date_joined";

/// Hashes a plain-text password using Argon2 with a fresh random salt.
#[instrument(name = "accounts::hash_password", skip(password), err(Display))]
pub fn hash_password(password: &str) -> Result<String> {
  if password.is_empty() {
    return Err(StoreError::validation("Password cannot be empty."));
  }

  let salt = SaltString::generate(&mut OsRng);
  Argon2::default()
    .hash_password(password.as_bytes(), &salt)
    .map(|hash| hash.to_string())
    .map_err(|argon_err| {
      error!(error = %argon_err, "Argon2 password hashing failed.");
      StoreError::PasswordHash(argon_err.to_string())
    })
}

/// Verifies a plain-text password against a stored Argon2 hash.
///
/// Returns `Ok(false)` on a mismatch and an error only when the stored hash
/// itself cannot be parsed or the verifier fails internally.
#[instrument(name = "accounts::verify_password", skip_all, err(Display))]
pub fn verify_password(stored_hash: &str, provided_password: &str) -> Result<bool> {
  if provided_password.is_empty() {
    return Ok(false);
  }
  let parsed_hash = PasswordHash::new(stored_hash).map_err(|parse_err| {
    error!(error = %parse_err, "Failed to parse stored password hash string.");
    StoreError::PasswordHash(parse_err.to_string())
  })?;

  match Argon2::default().verify_password(provided_password.as_bytes(), &parsed_hash) {
    Ok(()) => Ok(true),
    Err(argon2::password_hash::Error::Password) => {
      debug!("Password verification failed: passwords do not match.");
      Ok(false)
    }
    Err(other) => Err(StoreError::PasswordHash(other.to_string())),
  }
}

// --- Forms ---

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SignupForm {
  #[serde(default)]
  pub username: String,
  #[serde(default)]
  pub email: String,
  #[serde(default)]
  pub password1: String,
  #[serde(default)]
  pub password2: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoginForm {
  #[serde(default)]
  pub username: String,
  #[serde(default)]
  pub password: String,
}

struct CleanSignup {
  username: String,
  email: String,
  password: String,
}

fn valid_username_char(c: char) -> bool {
  c.is_alphanumeric() || matches!(c, '@' | '.' | '+' | '-' | '_')
}

fn looks_like_email(email: &str) -> bool {
  let Some((local, domain)) = email.split_once('@') else {
    return false;
  };
  !local.is_empty()
    && !domain.contains('@')
    && domain.contains('.')
    && !domain.starts_with('.')
    && !domain.ends_with('.')
    && !email.chars().any(char::is_whitespace)
}

impl SignupForm {
  fn clean(&self) -> Result<CleanSignup, FormErrors> {
    let mut errors = FormErrors::new();

    let username = forms::required(&mut errors, "username", &self.username);
    forms::max_chars(&mut errors, "username", &username, USERNAME_MAX_CHARS);
    if !username.is_empty() && !username.chars().all(valid_username_char) {
      errors.add(
        "username",
        "Enter a valid username. This value may contain only letters, numbers, and @/./+/-/_ characters.",
      );
    }

    let email = forms::required(&mut errors, "email", &self.email);
    if !email.is_empty() && !looks_like_email(&email) {
      errors.add("email", "Enter a valid email address.");
    }

    if self.password1.is_empty() {
      errors.add("password1", "This field is required.");
    }
    if self.password2.is_empty() {
      errors.add("password2", "This field is required.");
    }
    if !self.password1.is_empty() && !self.password2.is_empty() {
      if self.password1 != self.password2 {
        errors.add("password2", "The two password fields didn't match.");
      } else {
        let password = &self.password1;
        if password.chars().count() < PASSWORD_MIN_CHARS {
          errors.add(
            "password2",
            format!(
              "This password is too short. It must contain at least {} characters.",
              PASSWORD_MIN_CHARS
            ),
          );
        }
        if password.chars().all(|c| c.is_ascii_digit()) {
          errors.add("password2", "This password is entirely numeric.");
        }
        if !username.is_empty() && password.eq_ignore_ascii_case(&username) {
          errors.add("password2", "The password is too similar to the username.");
        }
      }
    }

    errors.finish(CleanSignup {
      username,
      email,
      password: self.password1.clone(),
    })
  }
}

impl LoginForm {
  /// Returns the trimmed username and the raw password.
  pub fn clean(&self) -> Result<(String, String), FormErrors> {
    let mut errors = FormErrors::new();
    let username = forms::required(&mut errors, "username", &self.username);
    forms::max_chars(&mut errors, "username", &username, LOGIN_USERNAME_MAX_CHARS);
    if self.password.is_empty() {
      errors.add("password", "This field is required.");
    }
    errors.finish((username, self.password.clone()))
  }
}

// --- Users ---

/// Validates the signup form and creates the user.
#[instrument(name = "accounts::register", skip(pool, form), fields(username = %form.username))]
pub async fn register(pool: &SqlitePool, form: &SignupForm) -> Result<User> {
  let clean = form.clean()?;

  let mut errors = FormErrors::new();
  if find_by_username(pool, &clean.username).await?.is_some() {
    errors.add("username", "A user with that username already exists.");
  }
  let email_taken: Option<i64> = sqlx::query_scalar("SELECT id FROM users WHERE email = ?")
    .bind(&clean.email)
    .fetch_optional(pool)
    .await?;
  if email_taken.is_some() {
    errors.add("email", "This email address is already registered.");
  }
  if !errors.is_empty() {
    warn!("Signup rejected: {}", errors);
    return Err(errors.into());
  }

  let user = insert_user(pool, &clean.username, &clean.email, &clean.password, false).await?;
  info!(user_id = user.id, "User registered.");
  Ok(user)
}

async fn insert_user(pool: &SqlitePool, username: &str, email: &str, password: &str, is_superuser: bool) -> Result<User> {
  let password_hash = hash_password(password)?;
  let inserted = sqlx::query_as::<_, User>(&format!(
    "INSERT INTO users (username, email, password_hash, is_superuser, date_joined) VALUES (?, ?, ?, ?, ?) RETURNING {}",
    USER_COLUMNS
  ))
  .bind(username)
  .bind(email)
  .bind(password_hash)
  .bind(is_superuser)
  .bind(Utc::now())
  .fetch_one(pool)
  .await;

  match inserted {
    Ok(user) => Ok(user),
    Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
      let mut errors = FormErrors::new();
      errors.add(NON_FIELD_ERRORS, "A user with that username or email already exists.");
      Err(errors.into())
    }
    Err(e) => Err(e.into()),
  }
}

/// Creates a superuser without form validation. Used for bootstrapping.
#[instrument(name = "accounts::create_superuser", skip(pool, password))]
pub async fn create_superuser(pool: &SqlitePool, username: &str, email: &str, password: &str) -> Result<User> {
  insert_user(pool, username, email, password, true).await
}

pub async fn find_by_username(pool: &SqlitePool, username: &str) -> Result<Option<User>> {
  let user = sqlx::query_as::<_, User>(&format!("SELECT {} FROM users WHERE username = ?", USER_COLUMNS))
    .bind(username)
    .fetch_optional(pool)
    .await?;
  Ok(user)
}

pub async fn get_user(pool: &SqlitePool, user_id: i64) -> Result<User> {
  sqlx::query_as::<_, User>(&format!("SELECT {} FROM users WHERE id = ?", USER_COLUMNS))
    .bind(user_id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| StoreError::not_found("User", user_id))
}

/// Returns the user when `username` exists and `password` matches.
#[instrument(name = "accounts::authenticate", skip(pool, password))]
pub async fn authenticate(pool: &SqlitePool, username: &str, password: &str) -> Result<Option<User>> {
  let Some(user) = find_by_username(pool, username).await? else {
    debug!("Authentication failed: unknown username.");
    return Ok(None);
  };
  if verify_password(&user.password_hash, password)? {
    Ok(Some(user))
  } else {
    Ok(None)
  }
}

// --- Permissions ---

pub async fn has_perm(pool: &SqlitePool, user: &User, permission: Permission) -> Result<bool> {
  if user.is_superuser {
    return Ok(true);
  }
  let found: Option<i64> = sqlx::query_scalar("SELECT 1 FROM user_permissions WHERE user_id = ? AND codename = ?")
    .bind(user.id)
    .bind(permission.codename())
    .fetch_optional(pool)
    .await?;
  Ok(found.is_some())
}

/// Fails with `PermissionDenied` unless the user holds `permission`.
pub async fn require_perm(pool: &SqlitePool, user: &User, permission: Permission) -> Result<()> {
  if has_perm(pool, user, permission).await? {
    Ok(())
  } else {
    warn!(user_id = user.id, %permission, "Permission check failed.");
    Err(StoreError::PermissionDenied(permission.codename().to_string()))
  }
}

pub async fn grant_permission(pool: &SqlitePool, user_id: i64, permission: Permission) -> Result<()> {
  sqlx::query("INSERT OR IGNORE INTO user_permissions (user_id, codename) VALUES (?, ?)")
    .bind(user_id)
    .bind(permission.codename())
    .execute(pool)
    .await?;
  info!(user_id, %permission, "Permission granted.");
  Ok(())
}

// --- Sessions ---

/// Opens a session for `user_id` and returns its opaque token. Expired
/// sessions of every user are dropped on the way.
#[instrument(name = "accounts::create_session", skip(pool))]
pub async fn create_session(pool: &SqlitePool, user_id: i64) -> Result<String> {
  prune_expired_sessions(pool).await?;
  let token = Uuid::new_v4().simple().to_string();
  let now = Utc::now();
  sqlx::query("INSERT INTO sessions (token, user_id, created_at, expires_at) VALUES (?, ?, ?, ?)")
    .bind(&token)
    .bind(user_id)
    .bind(now)
    .bind(now + Duration::days(SESSION_TTL_DAYS))
    .execute(pool)
    .await?;
  debug!("Session created.");
  Ok(token)
}

/// Resolves a session token to its user. Expired sessions are removed.
pub async fn user_for_session(pool: &SqlitePool, token: &str) -> Result<Option<User>> {
  let row: Option<(i64, DateTime<Utc>)> = sqlx::query_as("SELECT user_id, expires_at FROM sessions WHERE token = ?")
    .bind(token)
    .fetch_optional(pool)
    .await?;

  match row {
    None => Ok(None),
    Some((_, expires_at)) if expires_at <= Utc::now() => {
      debug!("Session expired.");
      delete_session(pool, token).await?;
      Ok(None)
    }
    Some((user_id, _)) => {
      let user = sqlx::query_as::<_, User>(&format!("SELECT {} FROM users WHERE id = ?", USER_COLUMNS))
        .bind(user_id)
        .fetch_optional(pool)
        .await?;
      Ok(user)
    }
  }
}

/// Deletes every expired session and returns how many went.
pub async fn prune_expired_sessions(pool: &SqlitePool) -> Result<u64> {
  let pruned = sqlx::query("DELETE FROM sessions WHERE expires_at <= ?")
    .bind(Utc::now())
    .execute(pool)
    .await?
    .rows_affected();
  if pruned > 0 {
    debug!(pruned, "Expired sessions pruned.");
  }
  Ok(pruned)
}

pub async fn delete_session(pool: &SqlitePool, token: &str) -> Result<()> {
  sqlx::query("DELETE FROM sessions WHERE token = ?")
    .bind(token)
    .execute(pool)
    .await?;
  Ok(())
}

/// Returns a redirect target only if it is a local path.
pub fn safe_next_path(next: Option<&str>) -> Option<&str> {
  next.filter(|path| path.starts_with('/') && !path.starts_with("//") && !path.contains('\\'))
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn hash_then_verify() {
    let hash = hash_password("correct horse").unwrap();
    assert!(verify_password(&hash, "correct horse").unwrap());
    assert!(!verify_password(&hash, "wrong horse").unwrap());
    assert!(!verify_password(&hash, "").unwrap());
  }

  #[test]
  fn garbage_hash_is_an_error() {
    assert!(matches!(
      verify_password("not-a-phc-string", "pw"),
      Err(StoreError::PasswordHash(_))
    ));
  }

  #[test]
  fn signup_form_rules() {
    let form = SignupForm {
      username: "bad name!".into(),
      email: "nobody".into(),
      password1: "12345678".into(),
      password2: "12345678".into(),
    };
    let errors = form.clean().err().unwrap();
    assert!(errors.has("username"));
    assert!(errors.has("email"));
    assert_eq!(errors.get("password2"), ["This password is entirely numeric."]);

    let mismatch = SignupForm {
      username: "sara".into(),
      email: "sara@example.com".into(),
      password1: "longenough1".into(),
      password2: "longenough2".into(),
    };
    assert_eq!(
      mismatch.clean().err().unwrap().get("password2"),
      ["The two password fields didn't match."]
    );
  }

  #[test]
  fn login_form_limits_username_length() {
    let form = LoginForm {
      username: "averylongusername".into(),
      password: "x".into(),
    };
    assert!(form.clean().err().unwrap().has("username"));
  }

  #[test]
  fn next_path_must_be_local() {
    assert_eq!(safe_next_path(Some("/cart/")), Some("/cart/"));
    assert_eq!(safe_next_path(Some("//evil.example")), None);
    assert_eq!(safe_next_path(Some("https://evil.example")), None);
    assert_eq!(safe_next_path(None), None);
  }
}
