//! Platform fee schedule.
//!
//! The marketplace adds a fixed-rate surcharge to every cart subtotal. The
//! rate is expressed in basis points so fee math stays in integers: with the
//! default 1000 bps (10%), `fee(8400) == 840` exactly. Rounding is half-up
//! on the basis-point product, matching `round(subtotal × rate)`.

use cnx_types::Cents;

/// Default platform fee: 1000 basis points = 10%.
pub const DEFAULT_FEE_BPS: u32 = 1_000;

const BPS_SCALE: i128 = 10_000;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Fee computation failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeeError {
    /// Fees are only defined over non-negative subtotals.
    NegativeSubtotal { subtotal: Cents },
    /// The computed fee does not fit in an `i64` cent count.
    FeeOverflow { subtotal: Cents },
}

impl std::fmt::Display for FeeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FeeError::NegativeSubtotal { subtotal } => {
                write!(f, "fee invariant: subtotal must be >= 0, got {subtotal}")
            }
            FeeError::FeeOverflow { subtotal } => {
                write!(f, "fee overflow computing fee of {subtotal}")
            }
        }
    }
}

impl std::error::Error for FeeError {}

// ---------------------------------------------------------------------------
// FeeSchedule
// ---------------------------------------------------------------------------

/// Fixed-rate fee schedule in basis points.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeeSchedule {
    rate_bps: u32,
}

impl FeeSchedule {
    /// Construct a schedule from a basis-point rate.
    ///
    /// Rates above 10000 bps (100%) are clamped — a fee larger than the
    /// subtotal is never meaningful for this marketplace.
    pub fn from_bps(rate_bps: u32) -> Self {
        Self {
            rate_bps: rate_bps.min(10_000),
        }
    }

    pub fn rate_bps(&self) -> u32 {
        self.rate_bps
    }

    /// Compute the platform fee for a subtotal: `round(subtotal × rate)`,
    /// half-up, in integer cents.
    ///
    /// # Errors
    /// Rejects negative subtotals and results that do not fit in `i64`.
    pub fn fee_for(&self, subtotal: Cents) -> Result<Cents, FeeError> {
        if subtotal.is_negative() {
            return Err(FeeError::NegativeSubtotal { subtotal });
        }
        // i128 product cannot overflow: |i64| * 10_000 fits comfortably.
        let product = i128::from(subtotal.raw()) * i128::from(self.rate_bps);
        let fee = (product + BPS_SCALE / 2) / BPS_SCALE;
        i64::try_from(fee)
            .map(Cents::new)
            .map_err(|_| FeeError::FeeOverflow { subtotal })
    }
}

impl Default for FeeSchedule {
    fn default() -> Self {
        Self::from_bps(DEFAULT_FEE_BPS)
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ten_percent_of_8400_is_840_exactly() {
        let fees = FeeSchedule::default();
        assert_eq!(fees.fee_for(Cents::new(8_400)), Ok(Cents::new(840)));
    }

    #[test]
    fn fee_of_zero_is_zero() {
        let fees = FeeSchedule::default();
        assert_eq!(fees.fee_for(Cents::ZERO), Ok(Cents::ZERO));
    }

    #[test]
    fn rounding_is_half_up() {
        // 10% of 5 cents = 0.5 → rounds to 1.
        let fees = FeeSchedule::default();
        assert_eq!(fees.fee_for(Cents::new(5)), Ok(Cents::new(1)));
        // 10% of 4 cents = 0.4 → rounds to 0.
        assert_eq!(fees.fee_for(Cents::new(4)), Ok(Cents::ZERO));
    }

    #[test]
    fn custom_rate_applies() {
        let fees = FeeSchedule::from_bps(250); // 2.5%
        assert_eq!(fees.fee_for(Cents::new(10_000)), Ok(Cents::new(250)));
    }

    #[test]
    fn rate_clamps_at_100_percent() {
        let fees = FeeSchedule::from_bps(25_000);
        assert_eq!(fees.rate_bps(), 10_000);
        assert_eq!(fees.fee_for(Cents::new(500)), Ok(Cents::new(500)));
    }

    #[test]
    fn negative_subtotal_rejected() {
        let fees = FeeSchedule::default();
        assert_eq!(
            fees.fee_for(Cents::new(-1)),
            Err(FeeError::NegativeSubtotal {
                subtotal: Cents::new(-1)
            })
        );
    }

    #[test]
    fn max_subtotal_does_not_overflow_internally() {
        // 100% of i64::MAX still fits; 10% certainly does.
        let fees = FeeSchedule::default();
        assert!(fees.fee_for(Cents::MAX).is_ok());
    }
}
