// storefront_app/src/web/handlers/auth_handlers.rs

use actix_web::{web, HttpRequest, HttpResponse};
use serde::Deserialize;
use serde_json::json;
use storefront::accounts::{self, LoginForm, SignupForm};
use storefront::{orders, FormErrors, StoreError, User};
use tracing::{info, instrument, warn};

use crate::errors::AppError;
use crate::state::AppState;
use crate::web::flash::Flash;
use crate::web::paths;
use crate::web::session::{self, AuthenticatedUser, CurrentUser};

/// Opens a session for `user` and attaches its cookie to `response`.
async fn log_in(app_state: &AppState, user: &User, mut response: HttpResponse) -> Result<HttpResponse, AppError> {
  let token = accounts::create_session(&app_state.db_pool, user.id).await?;
  response.add_cookie(&session::session_cookie(token, app_state.config.session_cookie_secure))?;
  info!(user_id = user.id, "User logged in.");
  Ok(response)
}

#[instrument(name = "handler::signup_page", skip_all)]
pub async fn signup_page_handler(current: CurrentUser, flash: Flash) -> HttpResponse {
  if current.user().is_some() {
    return flash.redirect(paths::HOME);
  }
  flash.render(None, json!({ "form": {}, "errors": FormErrors::new() }))
}

#[derive(Debug, serde::Serialize)]
struct SignupEcho<'a> {
  username: &'a str,
  email: &'a str,
}

#[instrument(name = "handler::signup", skip_all, fields(username = %form.username))]
pub async fn signup_handler(
  app_state: web::Data<AppState>,
  form: web::Form<SignupForm>,
  current: CurrentUser,
  mut flash: Flash,
) -> Result<HttpResponse, AppError> {
  if current.user().is_some() {
    return Ok(flash.redirect(paths::HOME));
  }
  match accounts::register(&app_state.db_pool, &form).await {
    Ok(user) => {
      flash.success("Your account was created successfully!");
      log_in(&app_state, &user, flash.redirect(paths::HOME)).await
    }
    Err(StoreError::InvalidForm(errors)) => {
      flash.error("Please correct the errors below.");
      // Passwords are never echoed back.
      let echo = SignupEcho {
        username: &form.username,
        email: &form.email,
      };
      Ok(flash.render(None, json!({ "form": echo, "errors": errors })))
    }
    Err(other) => Err(other.into()),
  }
}

#[derive(Deserialize, Debug)]
pub struct NextQuery {
  pub next: Option<String>,
}

#[instrument(name = "handler::login_page", skip_all)]
pub async fn login_page_handler(
  query: web::Query<NextQuery>,
  current: CurrentUser,
  flash: Flash,
) -> HttpResponse {
  if current.user().is_some() {
    return flash.redirect(paths::HOME);
  }
  flash.render(
    None,
    json!({
      "form": {},
      "errors": FormErrors::new(),
      "next": accounts::safe_next_path(query.next.as_deref()),
    }),
  )
}

#[instrument(name = "handler::login", skip_all, fields(username = %form.username))]
pub async fn login_handler(
  app_state: web::Data<AppState>,
  query: web::Query<NextQuery>,
  form: web::Form<LoginForm>,
  current: CurrentUser,
  mut flash: Flash,
) -> Result<HttpResponse, AppError> {
  if current.user().is_some() {
    return Ok(flash.redirect(paths::HOME));
  }
  let next = accounts::safe_next_path(query.next.as_deref());

  let (username, password) = match form.clean() {
    Ok(credentials) => credentials,
    Err(errors) => {
      return Ok(flash.render(
        None,
        json!({ "form": { "username": form.username }, "errors": errors, "next": next }),
      ));
    }
  };

  match accounts::authenticate(&app_state.db_pool, &username, &password).await? {
    Some(user) => {
      flash.success(format!("Welcome {}!", user.username));
      let target = next.unwrap_or(paths::HOME);
      log_in(&app_state, &user, flash.redirect(target)).await
    }
    None => {
      warn!("Login failed.");
      flash.error("Invalid username or password.");
      Ok(flash.render(
        None,
        json!({ "form": { "username": username }, "errors": FormErrors::new(), "next": next }),
      ))
    }
  }
}

#[instrument(name = "handler::logout", skip_all)]
pub async fn logout_handler(
  app_state: web::Data<AppState>,
  req: HttpRequest,
  mut flash: Flash,
) -> Result<HttpResponse, AppError> {
  if let Some(token) = session::session_token(&req) {
    accounts::delete_session(&app_state.db_pool, &token).await?;
  }
  flash.info("You have been logged out.");
  let mut response = flash.redirect(paths::LOGIN);
  response.add_cookie(&session::session_removal_cookie())?;
  Ok(response)
}

#[instrument(name = "handler::profile", skip_all, fields(user_id = auth_user.0.id))]
pub async fn profile_handler(
  app_state: web::Data<AppState>,
  auth_user: AuthenticatedUser,
  flash: Flash,
) -> Result<HttpResponse, AppError> {
  let user = auth_user.0;
  let order_count = orders::count_for_user(&app_state.db_pool, user.id).await?;
  Ok(flash.render(
    Some(&user),
    json!({
      "profile": {
        "username": user.username,
        "email": user.email,
        "date_joined": user.date_joined,
      },
      "order_count": order_count,
    }),
  ))
}
