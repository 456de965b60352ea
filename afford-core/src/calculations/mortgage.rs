//! Fixed-rate amortized mortgage payments and their inverse.
//!
//! With monthly rate `r = annual% / 100 / 12` and `n = years × 12` payments:
//!
//! | Direction | r = 0 | r > 0 |
//! |-----------|-------|-------|
//! | payment from principal | `P / n` | `P × r(1+r)^n / ((1+r)^n − 1)` |
//! | principal from payment | `M × n` | `M × (1 − (1+r)^−n) / r` |
//!
//! # Example
//!
//! ```
//! use rust_decimal_macros::dec;
//! use afford_core::calculations::MortgagePaymentModel;
//! use afford_core::calculations::common::round_half_up;
//!
//! let model = MortgagePaymentModel::new(dec!(6.5), 30);
//!
//! assert_eq!(round_half_up(model.monthly_payment(dec!(360000))), dec!(2275.44));
//! ```

use rust_decimal::{Decimal, MathematicalOps};
use tracing::warn;

/// Payment math for one rate and term.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MortgagePaymentModel {
    monthly_rate: Decimal,
    payments: u32,
}

impl MortgagePaymentModel {
    /// `annual_rate_percent` is in percent (6.5 for 6.5%); `term_years` must
    /// be positive.
    pub fn new(
        annual_rate_percent: Decimal,
        term_years: u32,
    ) -> Self {
        debug_assert!(term_years > 0, "loan term must be positive");
        Self {
            monthly_rate: annual_rate_percent / Decimal::ONE_HUNDRED / Decimal::from(12),
            payments: term_years * 12,
        }
    }

    pub fn monthly_rate(&self) -> Decimal {
        self.monthly_rate
    }

    pub fn payments(&self) -> u32 {
        self.payments
    }

    /// Monthly principal-and-interest payment on `principal`.
    pub fn monthly_payment(
        &self,
        principal: Decimal,
    ) -> Decimal {
        let n = Decimal::from(self.payments);
        if n.is_zero() {
            return Decimal::ZERO;
        }
        if self.monthly_rate.is_zero() {
            return principal / n;
        }

        let r = self.monthly_rate;
        match self.growth() {
            Some(growth) => principal * r * growth / (growth - Decimal::ONE),
            // (1+r)^n too large to represent: the annuity factor is at its
            // interest-only limit.
            None => principal * r,
        }
    }

    /// Largest principal whose monthly payment is `target_payment`.
    ///
    /// The algebraic inverse of [`monthly_payment`](Self::monthly_payment).
    pub fn max_principal(
        &self,
        target_payment: Decimal,
    ) -> Decimal {
        let n = Decimal::from(self.payments);
        if self.monthly_rate.is_zero() {
            return target_payment * n;
        }

        let r = self.monthly_rate;
        let discount = match self.growth() {
            Some(growth) => Decimal::ONE / growth,
            None => Decimal::ZERO,
        };
        target_payment * (Decimal::ONE - discount) / r
    }

    /// Interest paid over the life of a loan of `principal`.
    pub fn total_interest(
        &self,
        principal: Decimal,
    ) -> Decimal {
        self.monthly_payment(principal) * Decimal::from(self.payments) - principal
    }

    /// `(1 + r)^n`, or `None` on overflow.
    fn growth(&self) -> Option<Decimal> {
        let growth = (Decimal::ONE + self.monthly_rate).checked_powu(u64::from(self.payments));
        if growth.is_none() {
            warn!(
                monthly_rate = %self.monthly_rate,
                payments = self.payments,
                "amortization growth factor overflowed"
            );
        }
        growth
    }
}
