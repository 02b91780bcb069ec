// storefront/src/money.rs

//! Fixed-point prices.
//!
//! Prices are stored as integer cents and rendered with exactly two decimal
//! places, matching a `DECIMAL(10, 2)` column.

use crate::error::{Result, StoreError};
use serde::{Serialize, Serializer};
use std::fmt;

/// Total number of digits a price may carry, including the two decimals.
pub const MAX_DIGITS: usize = 10;
pub const DECIMAL_PLACES: usize = 2;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, sqlx::Type)]
#[sqlx(transparent)]
pub struct Money(i64);

impl Money {
  pub const ZERO: Money = Money(0);

  pub const fn from_cents(cents: i64) -> Self {
    Money(cents)
  }

  /// Whole currency units, e.g. `Money::from_units(10)` is `10.00`.
  pub const fn from_units(units: i64) -> Self {
    Money(units * 100)
  }

  pub const fn cents(self) -> i64 {
    self.0
  }

  /// Parses a non-negative decimal such as `"12"`, `"12.5"` or `"12.50"`.
  pub fn parse(input: &str) -> Result<Self> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
      return Err(StoreError::validation("Price is required."));
    }
    if trimmed.starts_with('-') {
      return Err(StoreError::validation("Price cannot be negative."));
    }

    let (whole, fraction) = match trimmed.split_once('.') {
      Some((whole, fraction)) => (whole, fraction),
      None => (trimmed, ""),
    };
    let all_digits = |s: &str| s.chars().all(|c| c.is_ascii_digit());
    if (whole.is_empty() && fraction.is_empty()) || !all_digits(whole) || !all_digits(fraction) {
      return Err(StoreError::validation(format!("'{}' is not a valid price.", trimmed)));
    }
    if fraction.len() > DECIMAL_PLACES {
      return Err(StoreError::validation(format!(
        "Price may have at most {} decimal places.",
        DECIMAL_PLACES
      )));
    }

    let whole = whole.trim_start_matches('0');
    if whole.len() > MAX_DIGITS - DECIMAL_PLACES {
      return Err(StoreError::validation(format!(
        "Price may have at most {} digits before the decimal point.",
        MAX_DIGITS - DECIMAL_PLACES
      )));
    }

    let units: i64 = if whole.is_empty() {
      0
    } else {
      whole
        .parse()
        .map_err(|_| StoreError::validation(format!("'{}' is not a valid price.", trimmed)))?
    };
    let cents: i64 = match fraction.len() {
      0 => 0,
      1 => fraction.parse::<i64>().unwrap_or(0) * 10,
      _ => fraction.parse::<i64>().unwrap_or(0),
    };
    Ok(Money(units * 100 + cents))
  }
}

impl fmt::Display for Money {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let sign = if self.0 < 0 { "-" } else { "" };
    let abs = self.0.unsigned_abs();
    write!(f, "{}{}.{:02}", sign, abs / 100, abs % 100)
  }
}

impl Serialize for Money {
  fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
    serializer.collect_str(self)
  }
}

impl Money {
  /// `self * quantity`, failing instead of wrapping when the result does not fit.
  pub fn checked_mul(self, quantity: i64) -> Result<Money> {
    self
      .0
      .checked_mul(quantity)
      .map(Money)
      .ok_or_else(|| StoreError::validation("Amount is too large."))
  }

  pub fn checked_add(self, rhs: Money) -> Result<Money> {
    self
      .0
      .checked_add(rhs.0)
      .map(Money)
      .ok_or_else(|| StoreError::validation("Amount is too large."))
  }

  /// Sums `amounts`, failing on overflow.
  pub fn checked_sum<I: IntoIterator<Item = Money>>(amounts: I) -> Result<Money> {
    amounts
      .into_iter()
      .try_fold(Money::ZERO, |total, amount| total.checked_add(amount))
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn parses_common_price_shapes() {
    assert_eq!(Money::parse("10").unwrap(), Money::from_cents(1000));
    assert_eq!(Money::parse("10.5").unwrap(), Money::from_cents(1050));
    assert_eq!(Money::parse(" 0.99 ").unwrap(), Money::from_cents(99));
    assert_eq!(Money::parse(".5").unwrap(), Money::from_cents(50));
    assert_eq!(Money::parse("12345678.00").unwrap(), Money::from_cents(1_234_567_800));
  }

  #[test]
  fn rejects_malformed_prices() {
    for bad in ["", "abc", "1.2.3", "-4", "1.234", "123456789", "1e5", "."] {
      assert!(
        matches!(Money::parse(bad), Err(StoreError::Validation(_))),
        "expected '{}' to be rejected",
        bad
      );
    }
  }

  #[test]
  fn displays_two_decimals() {
    assert_eq!(Money::from_cents(2500).to_string(), "25.00");
    assert_eq!(Money::from_cents(7).to_string(), "0.07");
    assert_eq!(Money::from_cents(-150).to_string(), "-1.50");
  }

  #[test]
  fn line_totals_sum() {
    let lines = [
      Money::from_units(10).checked_mul(2).unwrap(),
      Money::from_units(5).checked_mul(1).unwrap(),
    ];
    assert_eq!(Money::checked_sum(lines).unwrap(), Money::from_units(25));
  }

  #[test]
  fn overflow_is_a_validation_error() {
    let max_price = Money::parse("99999999.99").unwrap();
    assert!(matches!(
      max_price.checked_mul(i64::from(i32::MAX)),
      Err(StoreError::Validation(_))
    ));
    assert!(matches!(
      Money::checked_sum([Money::from_cents(i64::MAX), Money::from_cents(1)]),
      Err(StoreError::Validation(_))
    ));
  }
}
