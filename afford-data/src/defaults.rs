use afford_core::data::RateTables;
use afford_core::{AffordabilityPolicy, LoanTerm, PayrollTaxConfig};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::loader::RateDataError;

/// Default annual interest rate, in percent, for each offered term.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InterestRateDefaults {
    pub ten_year: Decimal,
    pub fifteen_year: Decimal,
    pub thirty_year: Decimal,
}

impl InterestRateDefaults {
    pub fn rate_for(
        &self,
        term: LoanTerm,
    ) -> Decimal {
        match term {
            LoanTerm::TenYear => self.ten_year,
            LoanTerm::FifteenYear => self.fifteen_year,
            LoanTerm::ThirtyYear => self.thirty_year,
        }
    }
}

impl Default for InterestRateDefaults {
    fn default() -> Self {
        Self {
            ten_year: dec!(5.84),
            fifteen_year: dec!(5.96),
            thirty_year: dec!(6.5),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PropertyTaxDefaults {
    /// Annual rate, as a fraction, used when no county rate applies.
    pub default_rate: Decimal,
}

impl Default for PropertyTaxDefaults {
    fn default() -> Self {
        Self {
            default_rate: dec!(0.028),
        }
    }
}

/// Tax-year constants and solver policy read from `defaults.toml`.
///
/// Every table and key is optional; anything left out keeps its 2024 value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Defaults {
    pub payroll: PayrollTaxConfig,
    pub interest_rates: InterestRateDefaults,
    pub property_tax: PropertyTaxDefaults,
    pub policy: AffordabilityPolicy,
}

impl Defaults {
    /// Parse and validate a defaults file.
    ///
    /// # Errors
    /// * [`RateDataError::Toml`] if the text is not valid TOML or has values
    ///   of the wrong type.
    /// * [`RateDataError::InvalidPayroll`] if the payroll constants are out
    ///   of range.
    /// * [`RateDataError::InvalidRate`] if the default property-tax rate is
    ///   outside [0, 1].
    pub fn from_toml(text: &str) -> Result<Self, RateDataError> {
        let defaults: Defaults = toml::from_str(text)?;
        defaults.payroll.validate()?;

        let rate = defaults.property_tax.default_rate;
        if rate < Decimal::ZERO || rate > Decimal::ONE {
            return Err(RateDataError::InvalidRate { rate, row: 0 });
        }

        Ok(defaults)
    }

    /// Copies the payroll constants, interest rates, and default
    /// property-tax rate into `tables`.
    pub fn apply_to(
        &self,
        tables: &mut RateTables,
    ) {
        tables.set_payroll_config(self.payroll.clone());
        for term in LoanTerm::ALL {
            tables.set_default_interest_rate(term, self.interest_rates.rate_for(term));
        }
        tables.set_default_property_tax_rate(self.property_tax.default_rate);
        debug!(
            default_property_tax_rate = %self.property_tax.default_rate,
            "applied defaults"
        );
    }
}
