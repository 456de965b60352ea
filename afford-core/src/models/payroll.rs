use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised when payroll constants are outside their valid range.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PayrollConfigError {
    #[error("social security rate must be between 0 and 1, got {0}")]
    InvalidSocialSecurityRate(Decimal),

    #[error("medicare rate must be between 0 and 1, got {0}")]
    InvalidMedicareRate(Decimal),

    #[error("additional medicare rate must be between 0 and 1, got {0}")]
    InvalidSurchargeRate(Decimal),

    #[error("social security wage cap must be positive, got {0}")]
    InvalidWageCap(Decimal),

    #[error("additional medicare threshold must be non-negative, got {0}")]
    InvalidSurchargeThreshold(Decimal),
}

/// Employee-side payroll (FICA) constants for one tax year.
///
/// These are data, not logic: swap the struct to move to another year.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PayrollTaxConfig {
    /// Social security rate applied up to the wage cap.
    pub social_security_rate: Decimal,

    /// Maximum earnings subject to social security tax.
    pub social_security_wage_cap: Decimal,

    /// Medicare rate applied to all earnings.
    pub medicare_rate: Decimal,

    /// Earnings above which the additional medicare surcharge applies.
    pub surcharge_threshold: Decimal,

    /// Additional medicare rate, charged on the excess over the threshold only.
    pub surcharge_rate: Decimal,
}

impl PayrollTaxConfig {
    /// 2024 employee rates.
    pub fn tax_year_2024() -> Self {
        Self {
            social_security_rate: dec!(0.062),
            social_security_wage_cap: dec!(168600),
            medicare_rate: dec!(0.0145),
            surcharge_threshold: dec!(200000),
            surcharge_rate: dec!(0.009),
        }
    }

    /// Validates the configuration values.
    ///
    /// # Errors
    ///
    /// Returns [`PayrollConfigError`] if any rate falls outside `[0, 1]`, the
    /// wage cap is not positive, or the surcharge threshold is negative.
    ///
    /// # Example
    ///
    /// ```
    /// use rust_decimal_macros::dec;
    /// use afford_core::{PayrollConfigError, PayrollTaxConfig};
    ///
    /// let mut config = PayrollTaxConfig::tax_year_2024();
    /// config.social_security_wage_cap = dec!(0);
    ///
    /// assert_eq!(
    ///     config.validate(),
    ///     Err(PayrollConfigError::InvalidWageCap(dec!(0)))
    /// );
    /// ```
    pub fn validate(&self) -> Result<(), PayrollConfigError> {
        if !is_unit_rate(self.social_security_rate) {
            return Err(PayrollConfigError::InvalidSocialSecurityRate(
                self.social_security_rate,
            ));
        }
        if !is_unit_rate(self.medicare_rate) {
            return Err(PayrollConfigError::InvalidMedicareRate(self.medicare_rate));
        }
        if !is_unit_rate(self.surcharge_rate) {
            return Err(PayrollConfigError::InvalidSurchargeRate(self.surcharge_rate));
        }
        if self.social_security_wage_cap <= Decimal::ZERO {
            return Err(PayrollConfigError::InvalidWageCap(
                self.social_security_wage_cap,
            ));
        }
        if self.surcharge_threshold < Decimal::ZERO {
            return Err(PayrollConfigError::InvalidSurchargeThreshold(
                self.surcharge_threshold,
            ));
        }
        Ok(())
    }
}

impl Default for PayrollTaxConfig {
    fn default() -> Self {
        Self::tax_year_2024()
    }
}

fn is_unit_rate(rate: Decimal) -> bool {
    rate >= Decimal::ZERO && rate <= Decimal::ONE
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn validate_accepts_2024_constants() {
        assert_eq!(PayrollTaxConfig::tax_year_2024().validate(), Ok(()));
    }

    #[test]
    fn validate_rejects_negative_social_security_rate() {
        let config = PayrollTaxConfig {
            social_security_rate: dec!(-0.01),
            ..PayrollTaxConfig::tax_year_2024()
        };

        assert_eq!(
            config.validate(),
            Err(PayrollConfigError::InvalidSocialSecurityRate(dec!(-0.01)))
        );
    }

    #[test]
    fn validate_rejects_medicare_rate_above_one() {
        let config = PayrollTaxConfig {
            medicare_rate: dec!(1.5),
            ..PayrollTaxConfig::tax_year_2024()
        };

        assert_eq!(
            config.validate(),
            Err(PayrollConfigError::InvalidMedicareRate(dec!(1.5)))
        );
    }

    #[test]
    fn validate_rejects_negative_surcharge_threshold() {
        let config = PayrollTaxConfig {
            surcharge_threshold: dec!(-1),
            ..PayrollTaxConfig::tax_year_2024()
        };

        assert_eq!(
            config.validate(),
            Err(PayrollConfigError::InvalidSurchargeThreshold(dec!(-1)))
        );
    }
}
