// storefront/src/forms.rs

//! Field-level validation errors, keyed by form field name.

use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

/// Key used for errors that are not tied to a single field.
pub const NON_FIELD_ERRORS: &str = "__all__";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FormErrors(BTreeMap<String, Vec<String>>);

impl FormErrors {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn add(&mut self, field: &str, message: impl Into<String>) {
    self.0.entry(field.to_string()).or_default().push(message.into());
  }

  pub fn is_empty(&self) -> bool {
    self.0.is_empty()
  }

  pub fn has(&self, field: &str) -> bool {
    self.0.contains_key(field)
  }

  pub fn get(&self, field: &str) -> &[String] {
    self.0.get(field).map(Vec::as_slice).unwrap_or(&[])
  }

  /// `Ok(value)` when no error was recorded.
  pub fn finish<T>(self, value: T) -> Result<T, FormErrors> {
    if self.is_empty() {
      Ok(value)
    } else {
      Err(self)
    }
  }
}

impl fmt::Display for FormErrors {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let mut first = true;
    for (field, messages) in &self.0 {
      for message in messages {
        if !first {
          f.write_str("; ")?;
        }
        write!(f, "{}: {}", field, message)?;
        first = false;
      }
    }
    Ok(())
  }
}

/// Trims `value` and records a "required" error when nothing is left.
pub(crate) fn required(errors: &mut FormErrors, field: &str, value: &str) -> String {
  let trimmed = value.trim();
  if trimmed.is_empty() {
    errors.add(field, "This field is required.");
  }
  trimmed.to_string()
}

pub(crate) fn max_chars(errors: &mut FormErrors, field: &str, value: &str, max: usize) {
  let len = value.chars().count();
  if len > max {
    errors.add(
      field,
      format!("Ensure this value has at most {} characters (it has {}).", max, len),
    );
  }
}
