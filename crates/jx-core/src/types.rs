//! Core value types with validation.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Validation errors for core types and user-supplied values.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("invalid date: {value}")]
    InvalidDate { value: String },

    #[error("invalid time: {value}")]
    InvalidTime { value: String },

    #[error("invalid datetime: {value}")]
    InvalidDatetime { value: String },

    #[error("invalid duration: {value}")]
    InvalidDuration { value: String },

    #[error("invalid exposure time: {value}")]
    InvalidExposure { value: String },

    /// A field name outside the known record attributes.
    #[error("unknown field: {value}")]
    UnknownField { value: String },

    #[error("exposure time takes one or two values, got {count}")]
    ExposureBoundCount { count: usize },

    #[error("exposure time bounds must be greater than zero")]
    ZeroExposure,

    /// Lower bound not strictly below the upper bound.
    #[error("exposure time range {lo}..{hi} is empty")]
    ReversedExposureBounds { lo: Exposure, hi: Exposure },
}

/// An exposure duration in seconds, kept as an exact reduced fraction.
///
/// Cameras report exposure times as rationals (`1/250`), so comparisons are
/// done by cross-multiplication instead of through floats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Exposure {
    num: u32,
    den: u32,
}

const fn gcd(mut a: u32, mut b: u32) -> u32 {
    while b != 0 {
        let t = a % b;
        a = b;
        b = t;
    }
    a
}

/// Most fractional digits accepted in a decimal exposure (`0.000000001`).
const MAX_DECIMALS: usize = 9;

impl Exposure {
    /// Creates a reduced exposure of `num / den` seconds.
    pub fn new(num: u32, den: u32) -> Result<Self, ValidationError> {
        if den == 0 {
            return Err(ValidationError::InvalidExposure {
                value: format!("{num}/{den}"),
            });
        }
        let divisor = gcd(num, den);
        Ok(Self {
            num: num / divisor,
            den: den / divisor,
        })
    }

    /// A whole number of seconds.
    pub const fn seconds(secs: u32) -> Self {
        Self { num: secs, den: 1 }
    }

    pub const fn numerator(self) -> u32 {
        self.num
    }

    pub const fn denominator(self) -> u32 {
        self.den
    }

    pub const fn is_zero(self) -> bool {
        self.num == 0
    }

    fn parse_decimal(int: &str, frac: &str) -> Option<Self> {
        if frac.len() > MAX_DECIMALS || !frac.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        if int.is_empty() && frac.is_empty() {
            return None;
        }
        let int: u64 = if int.is_empty() { 0 } else { int.parse().ok()? };
        let frac_value: u64 = if frac.is_empty() { 0 } else { frac.parse().ok()? };
        let den = 10_u64.pow(u32::try_from(frac.len()).ok()?);
        let num = int.checked_mul(den)?.checked_add(frac_value)?;
        let divisor = gcd_u64(num, den);
        let num = u32::try_from(num / divisor).ok()?;
        let den = u32::try_from(den / divisor).ok()?;
        Self::new(num, den).ok()
    }
}

fn gcd_u64(mut a: u64, mut b: u64) -> u64 {
    while b != 0 {
        let t = a % b;
        a = b;
        b = t;
    }
    a
}

impl Ord for Exposure {
    fn cmp(&self, other: &Self) -> Ordering {
        let lhs = u64::from(self.num) * u64::from(other.den);
        let rhs = u64::from(other.num) * u64::from(self.den);
        lhs.cmp(&rhs)
    }
}

impl PartialOrd for Exposure {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Exposure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.den == 1 {
            write!(f, "{}", self.num)
        } else {
            write!(f, "{}/{}", self.num, self.den)
        }
    }
}

impl FromStr for Exposure {
    type Err = ValidationError;

    /// Accepts `1/250`, `0.004` and `2`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ValidationError::InvalidExposure {
            value: s.to_string(),
        };
        let trimmed = s.trim();

        if let Some((num, den)) = trimmed.split_once('/') {
            let num: u32 = num.trim().parse().map_err(|_| invalid())?;
            let den: u32 = den.trim().parse().map_err(|_| invalid())?;
            return Self::new(num, den).map_err(|_| invalid());
        }

        if let Some((int, frac)) = trimmed.split_once('.') {
            return Self::parse_decimal(int, frac).ok_or_else(invalid);
        }

        trimmed.parse::<u32>().map(Self::seconds).map_err(|_| invalid())
    }
}

impl Serialize for Exposure {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Exposure {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Requested exposure times: one exact value or a half-open range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExposureRange {
    Exact(Exposure),
    /// `lo <= value < hi`.
    Between { lo: Exposure, hi: Exposure },
}

impl ExposureRange {
    /// Builds a range from one or two user-supplied bounds.
    pub fn from_bounds(bounds: &[Exposure]) -> Result<Self, ValidationError> {
        match *bounds {
            [value] if value.is_zero() => Err(ValidationError::ZeroExposure),
            [value] => Ok(Self::Exact(value)),
            [lo, hi] => Self::between(lo, hi),
            _ => Err(ValidationError::ExposureBoundCount {
                count: bounds.len(),
            }),
        }
    }

    pub fn between(lo: Exposure, hi: Exposure) -> Result<Self, ValidationError> {
        if lo.is_zero() || hi.is_zero() {
            return Err(ValidationError::ZeroExposure);
        }
        if lo >= hi {
            return Err(ValidationError::ReversedExposureBounds { lo, hi });
        }
        Ok(Self::Between { lo, hi })
    }

    pub fn contains(&self, value: Exposure) -> bool {
        match *self {
            Self::Exact(exact) => value == exact,
            Self::Between { lo, hi } => lo <= value && value < hi,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn exp(s: &str) -> Exposure {
        s.parse().unwrap()
    }

    #[test]
    fn exposure_is_reduced() {
        let e = Exposure::new(2, 500).unwrap();
        assert_eq!(e.numerator(), 1);
        assert_eq!(e.denominator(), 250);
        assert_eq!(e, exp("1/250"));
    }

    #[test]
    fn exposure_rejects_zero_denominator() {
        assert!(Exposure::new(1, 0).is_err());
        assert!("1/0".parse::<Exposure>().is_err());
    }

    #[test]
    fn exposure_parses_decimals_and_integers() {
        assert_eq!(exp("0.004"), exp("1/250"));
        assert_eq!(exp(".5"), exp("1/2"));
        assert_eq!(exp("2"), Exposure::seconds(2));
        assert_eq!(exp(" 1 / 60 "), exp("1/60"));
        assert!("".parse::<Exposure>().is_err());
        assert!(".".parse::<Exposure>().is_err());
        assert!("fast".parse::<Exposure>().is_err());
        assert!("-1/60".parse::<Exposure>().is_err());
    }

    #[test]
    fn exposure_orders_by_value() {
        assert!(exp("1/500") < exp("1/250"));
        assert!(exp("1/2") < exp("1"));
        assert!(exp("30") > exp("1/8000"));
        assert_eq!(exp("2/4").cmp(&exp("1/2")), Ordering::Equal);
    }

    #[test]
    fn exposure_display_is_reduced() {
        assert_eq!(exp("10/2500").to_string(), "1/250");
        assert_eq!(exp("4/2").to_string(), "2");
    }

    #[test]
    fn exposure_serde_as_string() {
        let json = serde_json::to_string(&exp("1/250")).unwrap();
        assert_eq!(json, "\"1/250\"");
        let parsed: Exposure = serde_json::from_str("\"0.5\"").unwrap();
        assert_eq!(parsed, exp("1/2"));
    }

    #[test]
    fn range_is_half_open() {
        let range = ExposureRange::from_bounds(&[exp("1/500"), exp("1/250")]).unwrap();
        assert!(range.contains(exp("1/500")));
        assert!(range.contains(exp("1/400")));
        assert!(!range.contains(exp("1/250")));
        assert!(!range.contains(exp("1/1000")));
    }

    #[test]
    fn single_bound_is_equality() {
        let range = ExposureRange::from_bounds(&[exp("1/60")]).unwrap();
        assert!(range.contains(exp("2/120")));
        assert!(!range.contains(exp("1/61")));
    }

    #[test]
    fn range_validation() {
        assert_eq!(
            ExposureRange::from_bounds(&[]),
            Err(ValidationError::ExposureBoundCount { count: 0 })
        );
        assert_eq!(
            ExposureRange::from_bounds(&[exp("0")]),
            Err(ValidationError::ZeroExposure)
        );
        assert!(matches!(
            ExposureRange::from_bounds(&[exp("1/250"), exp("1/500")]),
            Err(ValidationError::ReversedExposureBounds { .. })
        ));
        assert!(ExposureRange::between(exp("1/250"), exp("1/250")).is_err());
    }
}
