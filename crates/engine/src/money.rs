use std::{fmt, str::FromStr};

use crate::EngineError;

/// Signed money amount represented as an integer number of **minor units**
/// (paise, cents, ...).
///
/// Every pouch, deposit, expense and salary value in the engine is an `i64`
/// of minor units; this type exists for the places where amounts are parsed
/// from loose input or summed, so overflow is reported instead of wrapping.
///
/// # Examples
///
/// ```rust
/// use engine::Money;
///
/// let amount: Money = "1500".parse().unwrap();
/// assert_eq!(amount.minor(), 1500);
/// assert_eq!(amount.to_string(), "15.00");
/// assert!("15.5".parse::<Money>().is_err());
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct Money(i64);

impl Money {
    pub const ZERO: Money = Money(0);

    /// Creates a new amount from minor units.
    #[must_use]
    pub const fn new(minor: i64) -> Self {
        Self(minor)
    }

    /// Returns the raw value in minor units.
    #[must_use]
    pub const fn minor(self) -> i64 {
        self.0
    }

    /// Checked addition, `InvalidInput` on overflow.
    pub fn checked_add(self, rhs: Money) -> Result<Money, EngineError> {
        self.0.checked_add(rhs.0).map(Money).ok_or_else(overflow)
    }

    /// Checked subtraction, `InvalidInput` on overflow.
    pub fn checked_sub(self, rhs: Money) -> Result<Money, EngineError> {
        self.0.checked_sub(rhs.0).map(Money).ok_or_else(overflow)
    }

    /// Sums an iterator of amounts without wrapping.
    pub fn checked_sum<I>(amounts: I) -> Result<Money, EngineError>
    where
        I: IntoIterator<Item = i64>,
    {
        amounts
            .into_iter()
            .try_fold(Money::ZERO, |acc, amount| acc.checked_add(Money(amount)))
    }
}

fn overflow() -> EngineError {
    EngineError::InvalidInput("amount overflow".to_string())
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        write!(f, "{sign}{}.{:02}", abs / 100, abs % 100)
    }
}

impl From<i64> for Money {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl From<Money> for i64 {
    fn from(value: Money) -> Self {
        value.0
    }
}

impl FromStr for Money {
    type Err = EngineError;

    /// Parses an integer amount of minor units.
    ///
    /// Accepts an optional leading `+`/`-` and surrounding whitespace. Anything
    /// else (decimal separators, letters, empty input) is rejected, since
    /// amounts never travel as fractional major units.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(EngineError::InvalidInput("empty amount".to_string()));
        }

        let (negative, digits) = match trimmed.as_bytes()[0] {
            b'-' => (true, &trimmed[1..]),
            b'+' => (false, &trimmed[1..]),
            _ => (false, trimmed),
        };
        if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
            return Err(EngineError::InvalidInput(format!(
                "amount is not numeric: {trimmed}"
            )));
        }

        let value: i64 = digits
            .parse()
            .map_err(|_| EngineError::InvalidInput("amount too large".to_string()))?;
        Ok(Money(if negative { -value } else { value }))
    }
}
