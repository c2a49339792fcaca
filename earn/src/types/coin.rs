//! # Coins
//!
//! A [`Coin`] is an amount of a single denomination in its smallest unit.
//! There are no decimals anywhere in the engine: `amount` is an integer
//! count of indivisible units and every division floors.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::config::{MAX_DENOM_LENGTH, MIN_DENOM_LENGTH};

/// Errors produced when validating coins and denoms.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoinError {
    /// The denom is shorter or longer than the allowed range.
    #[error("invalid denom length {len} for '{denom}' (allowed {min}..={max})")]
    InvalidDenomLength {
        denom: String,
        len: usize,
        min: usize,
        max: usize,
    },

    /// The denom contains a character outside the allowed set.
    #[error("invalid denom '{denom}': unexpected character '{ch}'")]
    InvalidDenomChar { denom: String, ch: char },

    /// The denom does not start with an ASCII letter.
    #[error("invalid denom '{0}': must start with a letter")]
    InvalidDenomStart(String),
}

/// Validates a denomination string.
///
/// A denom is 3 to 128 characters, starts with an ASCII letter, and
/// otherwise contains only ASCII alphanumerics or `/ : . _ -`.
pub fn validate_denom(denom: &str) -> Result<(), CoinError> {
    let len = denom.chars().count();
    if !(MIN_DENOM_LENGTH..=MAX_DENOM_LENGTH).contains(&len) {
        return Err(CoinError::InvalidDenomLength {
            denom: denom.to_string(),
            len,
            min: MIN_DENOM_LENGTH,
            max: MAX_DENOM_LENGTH,
        });
    }

    let mut chars = denom.chars();
    if !chars.next().is_some_and(|c| c.is_ascii_alphabetic()) {
        return Err(CoinError::InvalidDenomStart(denom.to_string()));
    }

    if let Some(ch) = chars.find(|c| !(c.is_ascii_alphanumeric() || "/:._-".contains(*c))) {
        return Err(CoinError::InvalidDenomChar {
            denom: denom.to_string(),
            ch,
        });
    }

    Ok(())
}

/// An amount of one denomination, in smallest units.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Coin {
    pub denom: String,
    pub amount: u128,
}

impl Coin {
    pub fn new(denom: impl Into<String>, amount: u128) -> Self {
        Self {
            denom: denom.into(),
            amount,
        }
    }

    /// A zero amount of `denom`.
    pub fn zero(denom: impl Into<String>) -> Self {
        Self::new(denom, 0)
    }

    pub fn is_zero(&self) -> bool {
        self.amount == 0
    }

    /// Validates the denom. Amounts are unsigned, so any value is valid.
    pub fn validate(&self) -> Result<(), CoinError> {
        validate_denom(&self.denom)
    }
}

impl fmt::Display for Coin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.amount, self.denom)
    }
}
