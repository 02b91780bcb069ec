// storefront_app/src/web/session.rs

//! Cookie-backed sessions. The cookie only carries an opaque token; the user
//! is looked up in the `sessions` table on every request that asks for one.

use actix_web::cookie::{time::Duration as CookieDuration, Cookie, SameSite};
use actix_web::{dev::Payload, web, FromRequest, HttpRequest};
use futures_util::future::LocalBoxFuture;
use storefront::{accounts, User};
use tracing::{debug, warn};

use crate::errors::AppError;
use crate::state::AppState;

pub const SESSION_COOKIE: &str = "sessionid";

/// The logged-in user, if any. Never fails for anonymous requests.
#[derive(Debug)]
pub struct CurrentUser(pub Option<User>);

impl CurrentUser {
  pub fn user(&self) -> Option<&User> {
    self.0.as_ref()
  }
}

/// A logged-in user. Anonymous requests are redirected to the login page
/// with the requested path as `next`.
#[derive(Debug)]
pub struct AuthenticatedUser(pub User);

pub fn session_token(req: &HttpRequest) -> Option<String> {
  req
    .cookie(SESSION_COOKIE)
    .map(|c| c.value().to_string())
    .filter(|v| !v.is_empty())
}

impl FromRequest for CurrentUser {
  type Error = AppError;
  type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

  fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
    let token = session_token(req);
    let app_state = req.app_data::<web::Data<AppState>>().cloned();

    Box::pin(async move {
      let Some(token) = token else {
        return Ok(CurrentUser(None));
      };
      let app_state = app_state.ok_or_else(|| {
        warn!("CurrentUser extractor: AppState is not registered.");
        AppError::Internal("Application state unavailable".to_string())
      })?;
      let user = accounts::user_for_session(&app_state.db_pool, &token).await?;
      if user.is_none() {
        debug!("Session cookie did not match a live session.");
      }
      Ok(CurrentUser(user))
    })
  }
}

impl FromRequest for AuthenticatedUser {
  type Error = AppError;
  type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

  fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
    let next = req
      .uri()
      .path_and_query()
      .map(|pq| pq.as_str().to_string())
      .unwrap_or_else(|| req.path().to_string());
    let current = CurrentUser::from_request(req, payload);

    Box::pin(async move {
      match current.await? {
        CurrentUser(Some(user)) => Ok(AuthenticatedUser(user)),
        CurrentUser(None) => Err(AppError::LoginRequired { next }),
      }
    })
  }
}

pub fn session_cookie(token: String, secure: bool) -> Cookie<'static> {
  Cookie::build(SESSION_COOKIE, token)
    .path("/")
    .http_only(true)
    .same_site(SameSite::Lax)
    .secure(secure)
    .max_age(CookieDuration::days(accounts::SESSION_TTL_DAYS))
    .finish()
}

pub fn session_removal_cookie() -> Cookie<'static> {
  let mut cookie = Cookie::build(SESSION_COOKIE, "").path("/").finish();
  cookie.make_removal();
  cookie
}
