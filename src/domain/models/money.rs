//! Fixed-point money conversions.
//!
//! Monetary values are `rust_decimal::Decimal` in the domain and integer
//! minor units (scale 2) in storage, so the store can apply balance deltas
//! as SQL-level atomic increments. Amounts are rejected at the boundary if
//! they carry more precision than the storage scale can hold exactly.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

use crate::domain::errors::{EngineError, EngineResult};

/// Storage scale: two fractional digits.
pub const MINOR_SCALE: u32 = 2;

/// Convert a decimal amount to integer minor units.
pub fn to_minor(amount: Decimal) -> EngineResult<i64> {
    if amount.round_dp(MINOR_SCALE) != amount {
        return Err(EngineError::Validation(format!(
            "amount {amount} has more than {MINOR_SCALE} decimal places"
        )));
    }
    (amount * Decimal::from(100))
        .to_i64()
        .ok_or_else(|| EngineError::Validation(format!("amount {amount} out of range")))
}

/// Convert integer minor units back to a decimal amount.
pub fn from_minor(minor: i64) -> Decimal {
    Decimal::new(minor, MINOR_SCALE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_exact_amounts() {
        let amount = Decimal::new(1234, 2); // 12.34
        assert_eq!(from_minor(to_minor(amount).unwrap()), amount);
        assert_eq!(to_minor(Decimal::from(1000)).unwrap(), 100_000);
        assert_eq!(to_minor(Decimal::ZERO).unwrap(), 0);
    }

    #[test]
    fn negative_deltas_convert() {
        assert_eq!(to_minor(Decimal::new(-5000, 2)).unwrap(), -5000);
        assert_eq!(from_minor(-5000), Decimal::new(-5000, 2));
    }

    #[test]
    fn rejects_sub_cent_precision() {
        let err = to_minor(Decimal::new(12345, 3)).unwrap_err(); // 12.345
        assert!(matches!(err, EngineError::Validation(_)));
    }
}
