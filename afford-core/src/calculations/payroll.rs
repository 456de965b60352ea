//! Employee payroll (FICA) tax.
//!
//! | Component | Base | Rate (2024) |
//! |-----------|------|-------------|
//! | Social security | earnings up to the wage cap ($168,600) | 6.2% |
//! | Medicare | all earnings | 1.45% |
//! | Additional medicare | earnings above $200,000 only | 0.9% |
//!
//! # Example
//!
//! ```
//! use rust_decimal_macros::dec;
//! use afford_core::PayrollTaxConfig;
//! use afford_core::calculations::PayrollTaxCalculator;
//!
//! let calculator = PayrollTaxCalculator::new(PayrollTaxConfig::tax_year_2024());
//! let payroll = calculator.calculate(dec!(120000));
//!
//! assert_eq!(payroll.social_security, dec!(7440.000));
//! assert_eq!(payroll.medicare, dec!(1740.0000));
//! assert_eq!(payroll.total, dec!(9180));
//! ```

use rust_decimal::Decimal;

use crate::{PayrollTax, PayrollTaxConfig};

/// Computes capped social security and uncapped medicare with the
/// high-earner surcharge.
#[derive(Debug, Clone)]
pub struct PayrollTaxCalculator {
    config: PayrollTaxConfig,
}

impl PayrollTaxCalculator {
    pub fn new(config: PayrollTaxConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PayrollTaxConfig {
        &self.config
    }

    /// Payroll tax on `annual_income`, unrounded.
    pub fn calculate(
        &self,
        annual_income: Decimal,
    ) -> PayrollTax {
        let income = annual_income.max(Decimal::ZERO);
        let social_security = self.social_security(income);
        let medicare = self.medicare(income);

        PayrollTax {
            social_security,
            medicare,
            total: social_security + medicare,
        }
    }

    fn social_security(
        &self,
        income: Decimal,
    ) -> Decimal {
        income.min(self.config.social_security_wage_cap) * self.config.social_security_rate
    }

    /// Base medicare plus the surcharge on the excess over the threshold.
    fn medicare(
        &self,
        income: Decimal,
    ) -> Decimal {
        let base = income * self.config.medicare_rate;
        if income > self.config.surcharge_threshold {
            base + (income - self.config.surcharge_threshold) * self.config.surcharge_rate
        } else {
            base
        }
    }
}

impl Default for PayrollTaxCalculator {
    fn default() -> Self {
        Self::new(PayrollTaxConfig::default())
    }
}
