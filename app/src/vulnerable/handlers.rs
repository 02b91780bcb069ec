// storefront_app/src/vulnerable/handlers.rs

use actix_web::{web, HttpResponse};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::Deserialize;
use serde_json::{Map, Value};
use sqlx::{sqlite::SqliteRow, Column, Row};
use std::backtrace::Backtrace;
use std::time::Duration;

use super::{html, DemoDb};

const DEMOS: &[(&str, &str)] = &[
  ("/vulnerable/order/1/", "A01: Broken Access Control (IDOR) - change the id"),
  ("/vulnerable/crypto/", "A02: Cryptographic Failures - sensitive data in plain text"),
  ("/vulnerable/sqli/?product_name=Phone", "A03: Injection - SQL injection (try a quote)"),
  ("/vulnerable/design/", "A04: Insecure Design - business logic bypass"),
  ("/vulnerable/misconfig/", "A05: Security Misconfiguration - backtrace in the response"),
  ("/vulnerable/outdated/", "A06: Vulnerable and Outdated Components"),
  ("/vulnerable/login/", "A07: Identification and Authentication Failures - weak login"),
  ("/vulnerable/deserialize/", "A08: Software and Data Integrity Failures - trusted client data"),
  ("/vulnerable/logging/", "A09: Security Logging and Monitoring Failures - silent action"),
  ("/vulnerable/ssrf/", "A10: Server-Side Request Forgery - fetch any URL"),
];

pub async fn index() -> HttpResponse {
  let mut body = String::from("<h1>OWASP Top 10 Vulnerability Demos</h1><ul>");
  for (href, label) in DEMOS {
    body.push_str(&format!("<li><a href='{}'>{}</a></li>", href, label));
  }
  body.push_str("</ul>");
  html(body)
}

// A01: no check that the order belongs to whoever is asking.
pub async fn insecure_order(db: web::Data<DemoDb>, path: web::Path<i64>) -> HttpResponse {
  let order_id = path.into_inner();
  let row: Result<Option<(i64, String, i64)>, sqlx::Error> = sqlx::query_as(
    "SELECT o.id, u.username, o.total_price_cents FROM orders o JOIN users u ON u.id = o.user_id WHERE o.id = ?",
  )
  .bind(order_id)
  .fetch_optional(&db.0)
  .await;

  match row {
    Ok(Some((id, username, total_cents))) => html(format!(
      "<h3>Order Details (VULNERABLE)</h3><p>Order ID: {}</p><p>User: {}</p><p>Total: {}.{:02}</p>",
      id,
      username,
      total_cents / 100,
      total_cents % 100
    )),
    Ok(None) => HttpResponse::NotFound().body("Order not found"),
    Err(e) => html(format!("Database Error: {}", e)),
  }
}

// A02: card data written to the log and echoed back.
pub async fn sensitive_data() -> HttpResponse {
  let card_number = "1234-5678-9012-3456";
  let cvv = "123";
  tracing::warn!("CRITICAL: Processing payment for card {}, CVV: {}", card_number, cvv);
  html(format!(
    "<h3>Cryptographic Failures Demo</h3><p>Payment processed for card: {} (CVV: {})</p>\
     <p>Note: this data is displayed in plain text and logged!</p>",
    card_number, cvv
  ))
}

#[derive(Deserialize)]
pub struct SqliQuery {
  product_name: Option<String>,
}

fn row_to_json(row: &SqliteRow) -> Value {
  let mut object = Map::new();
  for (index, column) in row.columns().iter().enumerate() {
    let value = if let Ok(v) = row.try_get::<Option<i64>, _>(index) {
      v.map(Value::from).unwrap_or(Value::Null)
    } else if let Ok(v) = row.try_get::<Option<f64>, _>(index) {
      v.map(Value::from).unwrap_or(Value::Null)
    } else if let Ok(v) = row.try_get::<Option<String>, _>(index) {
      v.map(Value::from).unwrap_or(Value::Null)
    } else {
      Value::from("<binary>")
    };
    object.insert(column.name().to_string(), value);
  }
  Value::Object(object)
}

// A03: the parameter is pasted straight into the SQL text.
pub async fn sql_injection(db: web::Data<DemoDb>, query: web::Query<SqliQuery>) -> HttpResponse {
  let product_name = query.product_name.clone().unwrap_or_default();
  let mut results = Vec::new();
  if !product_name.is_empty() {
    let sql = format!("SELECT * FROM products WHERE name = '{}'", product_name);
    match sqlx::query(&sql).fetch_all(&db.0).await {
      Ok(rows) => results.extend(rows.iter().map(row_to_json)),
      Err(e) => return html(format!("Database Error: {}", e)),
    }
  }
  html(format!(
    "<h3>SQL Injection Demo</h3><p>Querying for: {}</p><p>Results: {}</p>",
    product_name,
    Value::Array(results)
  ))
}

// A04: the order "completes" without any payment step.
pub async fn insecure_design_form() -> HttpResponse {
  html("<h3>Insecure Design Demo</h3><form method='post'><button>Finalize Order (Skip Payment)</button></form>")
}

pub async fn insecure_design_submit() -> HttpResponse {
  html("<h3>Order Placed!</h3><p>We processed your order without verifying payment status.</p>")
}

// A05: internals leak through the error page.
pub async fn misconfiguration() -> HttpResponse {
  let backtrace = Backtrace::force_capture();
  let env_names: Vec<String> = std::env::vars().map(|(name, _)| name).collect();
  HttpResponse::InternalServerError()
    .content_type("text/html; charset=utf-8")
    .body(format!(
      "<h3>Unhandled error</h3><p>This is a demo exception to show a backtrace and the environment \
       (Security Misconfiguration).</p><pre>{}</pre><p>Environment: {}</p>",
      backtrace,
      env_names.join(", ")
    ))
}

// A06
pub async fn outdated_components() -> HttpResponse {
  let vulnerable_lib = "old-lib-v1.0.0 (CVE-2023-XXXX)";
  html(format!(
    "<h3>Component Analysis</h3><p>Detected Library: {}</p><p>Status: <b>CRITICAL VULNERABILITY</b></p>",
    vulnerable_lib
  ))
}

// A07: unlimited guesses, no lockout, no delay.
pub async fn weak_login_form() -> HttpResponse {
  html(
    "<h3>Weak Login Demo</h3><form method='post'>\
     <input type='text' name='username' placeholder='Username'>\
     <input type='password' name='password' placeholder='Password'>\
     <button type='submit'>Login</button></form>",
  )
}

#[derive(Deserialize)]
pub struct WeakLoginForm {
  #[serde(default)]
  username: String,
  #[serde(default)]
  password: String,
}

pub async fn weak_login(db: web::Data<DemoDb>, form: web::Form<WeakLoginForm>) -> HttpResponse {
  let stored: Result<Option<String>, sqlx::Error> =
    sqlx::query_scalar("SELECT password_hash FROM users WHERE username = ?")
      .bind(&form.username)
      .fetch_optional(&db.0)
      .await;
  let ok = match stored {
    Ok(Some(hash)) => storefront::accounts::verify_password(&hash, &form.password).unwrap_or(false),
    Ok(None) => false,
    Err(e) => return html(format!("Database Error: {}", e)),
  };
  html(if ok { "Login successful" } else { "Login failed" })
}

// A08: a client-supplied snapshot is decoded and its flags are believed.
#[derive(Debug, Deserialize)]
pub struct SessionSnapshot {
  username: String,
  #[serde(default)]
  is_admin: bool,
}

#[derive(Deserialize)]
pub struct DeserializeForm {
  data: Option<String>,
}

pub async fn deserialize_form() -> HttpResponse {
  html(
    "<h3>Insecure Deserialization Demo</h3>\
     <p>POST a base64 encoded JSON session snapshot, e.g. {\"username\": \"guest\", \"is_admin\": true}, \
     in the 'data' field.</p>",
  )
}

pub async fn unsafe_deserialization(form: web::Form<DeserializeForm>) -> HttpResponse {
  let Some(data) = form.data.as_deref().filter(|d| !d.is_empty()) else {
    return deserialize_form().await;
  };
  let decoded = match STANDARD.decode(data.trim()) {
    Ok(bytes) => bytes,
    Err(e) => return html(format!("Error: {}", e)),
  };
  match serde_json::from_slice::<SessionSnapshot>(&decoded) {
    Ok(snapshot) => {
      let access = if snapshot.is_admin {
        format!("Welcome administrator {}. Full access granted.", snapshot.username)
      } else {
        format!("Welcome {}.", snapshot.username)
      };
      html(format!("Deserialized object: {:?}<p>{}</p>", snapshot, access))
    }
    Err(e) => html(format!("Error: {}", e)),
  }
}

// A09: the destructive action leaves no trace in the log.
pub async fn silent_action_form() -> HttpResponse {
  html("<h3>Logging Failure Demo</h3><form method='post'><button>Delete System Logs (Silent)</button></form>")
}

pub async fn silent_action() -> HttpResponse {
  html("Action 'Delete Logs' executed. No audit log created.")
}

// A10: any scheme, any host, including the loopback interface.
#[derive(Deserialize)]
pub struct SsrfQuery {
  url: Option<String>,
}

pub async fn fetch_external_content(query: web::Query<SsrfQuery>) -> HttpResponse {
  let Some(url) = query.url.as_deref().filter(|u| !u.is_empty()) else {
    return html("<h3>SSRF Demo</h3><p>Provide a 'url' GET parameter to fetch content.</p>");
  };
  let client = match reqwest::Client::builder().timeout(Duration::from_secs(5)).build() {
    Ok(client) => client,
    Err(e) => return html(format!("Error: {}", e)),
  };
  let body = match client.get(url).send().await {
    Ok(response) => response.text().await,
    Err(e) => return html(format!("Error: {}", e)),
  };
  match body {
    Ok(text) => {
      let preview: String = text.chars().take(500).collect();
      html(format!("<h3>SSRF Demo</h3><pre>{}</pre>", preview))
    }
    Err(e) => html(format!("Error: {}", e)),
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[actix_web::test]
  async fn trusted_snapshot_grants_admin() {
    let data = STANDARD.encode(br#"{"username":"guest","is_admin":true}"#);
    let resp = unsafe_deserialization(web::Form(DeserializeForm { data: Some(data) })).await;
    let body = actix_web::body::to_bytes(resp.into_body()).await.unwrap();
    let text = String::from_utf8(body.to_vec()).unwrap();
    assert!(text.contains("Full access granted"));
  }
}
