// storefront_app/src/web/flash.rs

//! One-shot user messages carried across a redirect in a cookie, and the JSON
//! page envelope that delivers them.

use actix_web::cookie::{Cookie, SameSite};
use actix_web::http::{header, StatusCode};
use actix_web::{dev::Payload, FromRequest, HttpRequest, HttpResponse, HttpResponseBuilder};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use futures_util::future::{ready, Ready};
use serde::{Deserialize, Serialize};
use storefront::User;
use tracing::debug;

use crate::errors::AppError;

pub const FLASH_COOKIE: &str = "messages";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
  Info,
  Success,
  Warning,
  Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
  pub level: Level,
  pub text: String,
}

/// Messages read from the request plus any queued by the handler. Whichever
/// response the handler builds from it decides their fate: a redirect carries
/// them forward, a rendered page consumes them.
#[derive(Debug, Default)]
pub struct Flash {
  messages: Vec<Message>,
  had_cookie: bool,
}

fn decode(raw: &str) -> Option<Vec<Message>> {
  let bytes = URL_SAFE_NO_PAD.decode(raw).ok()?;
  serde_json::from_slice(&bytes).ok()
}

fn encode(messages: &[Message]) -> Option<String> {
  serde_json::to_vec(messages).ok().map(|bytes| URL_SAFE_NO_PAD.encode(bytes))
}

impl FromRequest for Flash {
  type Error = AppError;
  type Future = Ready<Result<Self, Self::Error>>;

  fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
    let flash = match req.cookie(FLASH_COOKIE) {
      Some(cookie) => {
        let messages = decode(cookie.value()).unwrap_or_else(|| {
          debug!("Discarding unreadable flash cookie.");
          Vec::new()
        });
        Flash {
          messages,
          had_cookie: true,
        }
      }
      None => Flash::default(),
    };
    ready(Ok(flash))
  }
}

#[derive(Serialize)]
struct Page<'a, T: Serialize> {
  messages: &'a [Message],
  user: Option<&'a User>,
  #[serde(flatten)]
  view: T,
}

impl Flash {
  pub fn push(&mut self, level: Level, text: impl Into<String>) {
    self.messages.push(Message {
      level,
      text: text.into(),
    });
  }

  pub fn info(&mut self, text: impl Into<String>) {
    self.push(Level::Info, text);
  }

  pub fn success(&mut self, text: impl Into<String>) {
    self.push(Level::Success, text);
  }

  pub fn warning(&mut self, text: impl Into<String>) {
    self.push(Level::Warning, text);
  }

  pub fn error(&mut self, text: impl Into<String>) {
    self.push(Level::Error, text);
  }

  pub fn messages(&self) -> &[Message] {
    &self.messages
  }

  fn clear_cookie(builder: &mut HttpResponseBuilder) {
    let mut cookie = Cookie::build(FLASH_COOKIE, "").path("/").finish();
    cookie.make_removal();
    builder.cookie(cookie);
  }

  /// A `302 Found` to `location` that carries every pending message.
  pub fn redirect(self, location: &str) -> HttpResponse {
    let mut builder = HttpResponse::Found();
    builder.insert_header((header::LOCATION, location));
    match encode(&self.messages) {
      Some(value) if !self.messages.is_empty() => {
        builder.cookie(
          Cookie::build(FLASH_COOKIE, value)
            .path("/")
            .http_only(true)
            .same_site(SameSite::Lax)
            .finish(),
        );
      }
      _ if self.had_cookie => Self::clear_cookie(&mut builder),
      _ => {}
    }
    builder.finish()
  }

  /// Renders `view` as a `200 OK` page with the pending messages and the
  /// current user. The messages are consumed.
  pub fn render<T: Serialize>(self, user: Option<&User>, view: T) -> HttpResponse {
    self.render_status(StatusCode::OK, user, view)
  }

  pub fn render_status<T: Serialize>(self, status: StatusCode, user: Option<&User>, view: T) -> HttpResponse {
    let mut builder = HttpResponse::build(status);
    if self.had_cookie {
      Self::clear_cookie(&mut builder);
    }
    builder.json(Page {
      messages: &self.messages,
      user,
      view,
    })
  }
}
