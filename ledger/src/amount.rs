//! # Amount: fixed-point money
//!
//! Balances are an unsigned count of minor units with a fixed scale of
//! [`AMOUNT_DECIMALS`] decimal places. `Amount::from_minor(150)` is `1.50`.
//! No floating point anywhere near a balance: conservation across a
//! transfer has to hold to the last unit on every replica.
//!
//! ## Text form
//!
//! Transfer amounts arrive as strings. The accepted grammar is deliberately
//! narrow: ASCII digits, optionally followed by `.` and more digits. No
//! sign, no exponent, no whitespace. Fractional digits past the scale are
//! accepted only when they are zeros (`"1.500"` is `1.50`).
//!
//! ## Wire form
//!
//! Serialized as the canonical decimal string (`"500.00"`). Deserialization
//! additionally accepts JSON numbers so that records written by the legacy
//! float-based implementation stay readable, provided they are exactly
//! representable at this scale.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Number of decimal places carried by every amount.
pub const AMOUNT_DECIMALS: u32 = 2;

/// Minor units per whole unit (`10^AMOUNT_DECIMALS`).
pub const MINOR_UNITS_PER_UNIT: u64 = 100;

/// Relative distance from a whole minor unit within which a legacy float
/// balance is treated as that unit.
pub const LEGACY_FLOAT_TOLERANCE: f64 = 1e-9;

/// Reasons an amount string is rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AmountError {
    #[error("amount must be a non-empty string")]
    Empty,

    #[error("amount must not be negative: {0}")]
    Negative(String),

    #[error("amount must be a decimal number: {0}")]
    NotNumeric(String),

    #[error("amount has more than {AMOUNT_DECIMALS} decimal places: {0}")]
    TooPrecise(String),

    #[error("amount is too large: {0}")]
    Overflow(String),
}

/// A non-negative monetary quantity in minor units.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Amount(u64);

impl Amount {
    pub const ZERO: Amount = Amount(0);

    /// Build an amount from a raw minor-unit count.
    pub const fn from_minor(minor: u64) -> Self {
        Self(minor)
    }

    /// Build an amount from whole units. `None` on overflow.
    pub fn from_units(units: u64) -> Option<Self> {
        units.checked_mul(MINOR_UNITS_PER_UNIT).map(Self)
    }

    /// The raw minor-unit count.
    pub const fn minor_units(self) -> u64 {
        self.0
    }

    pub fn is_zero(self) -> bool {
        self.0 == 0
    }

    pub fn checked_add(self, other: Amount) -> Option<Amount> {
        self.0.checked_add(other.0).map(Amount)
    }

    pub fn checked_sub(self, other: Amount) -> Option<Amount> {
        self.0.checked_sub(other.0).map(Amount)
    }

    /// Parse the text form described in the module docs.
    /// Convert a balance written by the float-based record format.
    ///
    /// Float sums drift (`0.1 + 0.2` is stored as `0.30000000000000004`),
    /// so the value snaps to the nearest minor unit when it lies within
    /// [`LEGACY_FLOAT_TOLERANCE`] of it, relative to its magnitude. Values
    /// that are negative, non-finite, or clearly between minor units are
    /// rejected.
    pub fn from_legacy_float(value: f64) -> Result<Self, AmountError> {
        if !value.is_finite() {
            return Err(AmountError::NotNumeric(value.to_string()));
        }
        if value < 0.0 {
            return Err(AmountError::Negative(value.to_string()));
        }

        let scaled = value * MINOR_UNITS_PER_UNIT as f64;
        let rounded = scaled.round();
        if (scaled - rounded).abs() > scaled.max(1.0) * LEGACY_FLOAT_TOLERANCE {
            return Err(AmountError::TooPrecise(value.to_string()));
        }
        // 2^64 is the first value past u64::MAX that f64 represents exactly.
        if rounded >= 18_446_744_073_709_551_616.0 {
            return Err(AmountError::Overflow(value.to_string()));
        }
        Ok(Self(rounded as u64))
    }

    pub fn parse(text: &str) -> Result<Self, AmountError> {
        if text.is_empty() {
            return Err(AmountError::Empty);
        }

        if let Some(rest) = text.strip_prefix('-') {
            if is_decimal(rest) {
                return Err(AmountError::Negative(text.to_string()));
            }
            return Err(AmountError::NotNumeric(text.to_string()));
        }

        if !is_decimal(text) {
            return Err(AmountError::NotNumeric(text.to_string()));
        }

        let (whole, frac) = match text.split_once('.') {
            Some((w, f)) => (w, f.trim_end_matches('0')),
            None => (text, ""),
        };

        if frac.len() > AMOUNT_DECIMALS as usize {
            return Err(AmountError::TooPrecise(text.to_string()));
        }

        let overflow = || AmountError::Overflow(text.to_string());

        let whole: u64 = whole.parse().map_err(|_| overflow())?;
        let frac_minor: u64 = if frac.is_empty() {
            0
        } else {
            let padded = format!("{:0<width$}", frac, width = AMOUNT_DECIMALS as usize);
            padded.parse().map_err(|_| overflow())?
        };

        whole
            .checked_mul(MINOR_UNITS_PER_UNIT)
            .and_then(|m| m.checked_add(frac_minor))
            .map(Self)
            .ok_or_else(overflow)
    }
}

/// `digits` or `digits.digits`, ASCII only.
fn is_decimal(s: &str) -> bool {
    let (whole, frac) = match s.split_once('.') {
        Some((w, f)) => (w, Some(f)),
        None => (s, None),
    };
    let all_digits = |part: &str| !part.is_empty() && part.bytes().all(|b| b.is_ascii_digit());
    all_digits(whole) && frac.map_or(true, all_digits)
}

impl FromStr for Amount {
    type Err = AmountError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let whole = self.0 / MINOR_UNITS_PER_UNIT;
        let frac = self.0 % MINOR_UNITS_PER_UNIT;
        write!(
            f,
            "{}.{:0>width$}",
            whole,
            frac,
            width = AMOUNT_DECIMALS as usize
        )
    }
}

impl Serialize for Amount {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum AmountRepr {
    Text(String),
    Whole(u64),
    Float(f64),
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        use serde::de::Error;

        match AmountRepr::deserialize(deserializer)? {
            AmountRepr::Text(text) => Amount::parse(&text).map_err(D::Error::custom),
            AmountRepr::Whole(units) => Amount::from_units(units)
                .ok_or_else(|| D::Error::custom(AmountError::Overflow(units.to_string()))),
            AmountRepr::Float(value) => Amount::from_legacy_float(value).map_err(D::Error::custom),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn parse_whole_number() {
        assert_eq!(Amount::parse("500").unwrap(), Amount::from_minor(50_000));
    }

    #[test]
    fn parse_fraction() {
        assert_eq!(Amount::parse("12.5").unwrap(), Amount::from_minor(1_250));
        assert_eq!(Amount::parse("0.01").unwrap(), Amount::from_minor(1));
        assert_eq!(Amount::parse("1.500").unwrap(), Amount::from_minor(150));
    }

    #[test]
    fn parse_zero() {
        assert!(Amount::parse("0").unwrap().is_zero());
        assert!(Amount::parse("0.00").unwrap().is_zero());
    }

    #[test]
    fn parse_rejects_empty() {
        assert_eq!(Amount::parse(""), Err(AmountError::Empty));
    }

    #[test]
    fn parse_rejects_negative() {
        assert!(matches!(Amount::parse("-5"), Err(AmountError::Negative(_))));
        assert!(matches!(Amount::parse("-0"), Err(AmountError::Negative(_))));
    }

    #[test]
    fn parse_rejects_garbage() {
        for bad in ["abc", "1e3", "+5", " 5", "5 ", "1.", ".5", "1.2.3", "--1", "NaN"] {
            assert!(
                matches!(Amount::parse(bad), Err(AmountError::NotNumeric(_))),
                "{bad:?} should be rejected as non-numeric"
            );
        }
    }

    #[test]
    fn parse_rejects_sub_minor_precision() {
        assert!(matches!(Amount::parse("0.001"), Err(AmountError::TooPrecise(_))));
    }

    #[test]
    fn parse_rejects_overflow() {
        assert!(matches!(
            Amount::parse("184467440737095516160"),
            Err(AmountError::Overflow(_))
        ));
        assert!(matches!(
            Amount::parse("184467440737095517"),
            Err(AmountError::Overflow(_))
        ));
    }

    #[test]
    fn display_is_canonical() {
        assert_eq!(Amount::from_minor(50_000).to_string(), "500.00");
        assert_eq!(Amount::from_minor(1_205).to_string(), "12.05");
        assert_eq!(Amount::ZERO.to_string(), "0.00");
    }

    #[test]
    fn checked_arithmetic() {
        let a = Amount::from_minor(10);
        let b = Amount::from_minor(3);
        assert_eq!(a.checked_sub(b), Some(Amount::from_minor(7)));
        assert_eq!(b.checked_sub(a), None);
        assert_eq!(Amount::from_minor(u64::MAX).checked_add(b), None);
    }

    #[test]
    fn serializes_as_string() {
        let json = serde_json::to_string(&Amount::from_minor(9_950_000)).unwrap();
        assert_eq!(json, "\"99500.00\"");
    }

    #[test]
    fn deserializes_legacy_numbers() {
        let whole: Amount = serde_json::from_str("100000").unwrap();
        assert_eq!(whole, Amount::from_units(100_000).unwrap());

        let float: Amount = serde_json::from_str("99500.5").unwrap();
        assert_eq!(float, Amount::from_minor(9_950_050));
    }

    #[test]
    fn deserialize_rejects_negative_and_imprecise_numbers() {
        assert!(serde_json::from_str::<Amount>("-1").is_err());
        assert!(serde_json::from_str::<Amount>("-1.5").is_err());
        assert!(serde_json::from_str::<Amount>("12.345").is_err());
        assert!(serde_json::from_str::<Amount>("1e30").is_err());
    }

    #[test]
    fn drifted_float_snaps_to_minor_unit() {
        let drifted: Amount = serde_json::from_str("0.30000000000000004").unwrap();
        assert_eq!(drifted, Amount::from_minor(30));

        assert_eq!(
            Amount::from_legacy_float(0.1 + 0.2).unwrap(),
            Amount::from_minor(30)
        );
        assert_eq!(
            Amount::from_legacy_float(99_499.99 + 0.01).unwrap(),
            Amount::from_units(99_500).unwrap()
        );
        assert_eq!(
            Amount::from_legacy_float(0.999_999_999_999_9).unwrap(),
            Amount::from_units(1).unwrap()
        );
    }

    #[test]
    fn legacy_float_errors() {
        assert!(matches!(
            Amount::from_legacy_float(f64::NAN),
            Err(AmountError::NotNumeric(_))
        ));
        assert!(matches!(
            Amount::from_legacy_float(-0.01),
            Err(AmountError::Negative(_))
        ));
        assert!(matches!(
            Amount::from_legacy_float(0.005),
            Err(AmountError::TooPrecise(_))
        ));
    }

    proptest! {
        #[test]
        fn display_then_parse_is_identity(minor in any::<u64>()) {
            let amount = Amount::from_minor(minor);
            prop_assert_eq!(Amount::parse(&amount.to_string()).unwrap(), amount);
        }

        #[test]
        fn whole_units_parse_exactly(units in 0u64..=u64::MAX / MINOR_UNITS_PER_UNIT) {
            let parsed = Amount::parse(&units.to_string()).unwrap();
            prop_assert_eq!(parsed.minor_units(), units * MINOR_UNITS_PER_UNIT);
        }

        #[test]
        fn legacy_floats_of_whole_cents_are_exact(cents in 0u64..1_000_000_000_000) {
            let value = cents as f64 / MINOR_UNITS_PER_UNIT as f64;
            prop_assert_eq!(Amount::from_legacy_float(value).unwrap(), Amount::from_minor(cents));
        }
    }
}
