//! Reward amounts and fixed-point scaling

use std::fmt;
use std::str::FromStr;

use alloy::primitives::U256;
use serde::{Deserialize, Serialize};

use crate::{CoreError, Result};

/// Decimal places of the escrow token; 1.0 == 10^18 base units
pub const REWARD_DECIMALS: u8 = 18;

/// A non-negative decimal reward amount, kept in its string form.
///
/// Scaling works on the decimal digits rather than on floating point, so an
/// amount with at most [`REWARD_DECIMALS`] fractional digits converts to
/// base units exactly.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RewardAmount(String);

impl RewardAmount {
    /// Parse a plain decimal such as `"10"` or `"2.5"`
    pub fn parse(s: &str) -> Result<Self> {
        let invalid = |reason: &str| CoreError::InvalidAmount {
            amount: s.to_string(),
            reason: reason.to_string(),
        };

        let (whole, frac) = match s.split_once('.') {
            Some((whole, frac)) => (whole, Some(frac)),
            None => (s, None),
        };

        if whole.is_empty() {
            return Err(invalid("missing integer part"));
        }
        if !whole.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid("malformed decimal"));
        }
        if let Some(frac) = frac {
            if frac.is_empty() {
                return Err(invalid("missing fractional digits"));
            }
            if !frac.bytes().all(|b| b.is_ascii_digit()) {
                return Err(invalid("malformed decimal"));
            }
        }

        Ok(Self(s.to_string()))
    }

    /// Convert a float through its shortest round-trip decimal rendering
    pub fn from_f64(value: f64) -> Result<Self> {
        if !value.is_finite() {
            return Err(CoreError::InvalidAmount {
                amount: value.to_string(),
                reason: "not a finite number".to_string(),
            });
        }
        if value.is_sign_negative() && value != 0.0 {
            return Err(CoreError::InvalidAmount {
                amount: value.to_string(),
                reason: "negative".to_string(),
            });
        }
        // f64's Display never uses exponent notation
        Self::parse(&value.abs().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Scale to integer base units: `amount * 10^decimals`
    pub fn to_base_units(&self, decimals: u8) -> Result<U256> {
        let (whole, frac) = self.0.split_once('.').unwrap_or((self.0.as_str(), ""));
        // Zeros past the last representable digit carry no value
        let frac = match frac.get(decimals as usize..) {
            Some(excess) if excess.bytes().all(|b| b == b'0') => &frac[..decimals as usize],
            _ => frac,
        };

        if frac.len() > decimals as usize {
            return Err(CoreError::InvalidAmount {
                amount: self.0.clone(),
                reason: format!("more than {} fractional digits", decimals),
            });
        }

        let overflow = || CoreError::AmountOverflow(self.0.clone());

        let mut digits = String::with_capacity(whole.len() + decimals as usize);
        digits.push_str(whole);
        digits.push_str(frac);
        for _ in frac.len()..decimals as usize {
            digits.push('0');
        }

        U256::from_str_radix(&digits, 10).map_err(|_| overflow())
    }

    /// Base units at [`REWARD_DECIMALS`]
    pub fn base_units(&self) -> Result<U256> {
        self.to_base_units(REWARD_DECIMALS)
    }
}

impl FromStr for RewardAmount {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl TryFrom<f64> for RewardAmount {
    type Error = CoreError;

    fn try_from(value: f64) -> Result<Self> {
        Self::from_f64(value)
    }
}

impl TryFrom<String> for RewardAmount {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(&value)
    }
}

impl From<RewardAmount> for String {
    fn from(amount: RewardAmount) -> Self {
        amount.0
    }
}

impl From<u64> for RewardAmount {
    fn from(value: u64) -> Self {
        Self(value.to_string())
    }
}

impl fmt::Display for RewardAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Render base units back as a decimal, without trailing fractional zeros.
pub fn format_base_units(value: U256, decimals: u8) -> String {
    let scale = U256::from(10u64).pow(U256::from(decimals));
    let whole = value / scale;
    let frac = value % scale;

    if frac.is_zero() {
        return whole.to_string();
    }

    let frac = format!("{:0>width$}", frac.to_string(), width = decimals as usize);
    format!("{}.{}", whole, frac.trim_end_matches('0'))
}
