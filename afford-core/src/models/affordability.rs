use std::collections::BTreeMap;
use std::fmt;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::{DownPaymentSummary, TaxBurden};

/// Traffic-light classification of a housing payment against gross income.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AffordabilityTier {
    Green,
    Yellow,
    Red,
}

impl AffordabilityTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Green => "green",
            Self::Yellow => "yellow",
            Self::Red => "red",
        }
    }

    /// One-line verdict for display.
    pub fn verdict(&self) -> &'static str {
        match self {
            Self::Green => "well within budget",
            Self::Yellow => "a little outside budget; manageable with tighter spending",
            Self::Red => "outside budget",
        }
    }
}

impl fmt::Display for AffordabilityTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which solve produced a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SolveMode {
    MaximizeHomePrice,
    EvaluateHomePrice,
}

/// Thresholds and assumptions the solver applies.
///
/// Ratios are fractions (0.28), not percents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AffordabilityPolicy {
    pub front_end_ratio: Decimal,
    pub back_end_ratio: Decimal,
    /// Upper bound of the yellow tier when there are no other debts.
    pub front_end_yellow_ratio: Decimal,
    /// Upper bound of the yellow tier when there are other debts.
    pub back_end_yellow_ratio: Decimal,
    /// Home value used to size add-ons before the real price is known.
    pub placeholder_home_value: Decimal,
    pub fha_mip_rate: Decimal,
    pub fha_down_payment_percent: Decimal,
    /// Gross income estimate per dollar of take-home pay.
    pub take_home_gross_up: Decimal,
    pub default_annual_insurance: Decimal,
    /// Extra estimate-then-correct passes after the first. Zero keeps the
    /// plain two-pass estimate.
    pub refinement_passes: u32,
}

impl Default for AffordabilityPolicy {
    fn default() -> Self {
        Self {
            front_end_ratio: dec!(0.28),
            back_end_ratio: dec!(0.36),
            front_end_yellow_ratio: dec!(0.32),
            back_end_yellow_ratio: dec!(0.42),
            placeholder_home_value: dec!(300000),
            fha_mip_rate: dec!(0.0085),
            fha_down_payment_percent: dec!(3.5),
            take_home_gross_up: dec!(1.3),
            default_annual_insurance: dec!(1200),
            refinement_passes: 0,
        }
    }
}

/// Payment figures for one loan term at that term's default rate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TermOption {
    pub term_years: u32,
    pub interest_rate_percent: Decimal,
    /// Principal and interest only.
    pub payment: Decimal,
    /// Principal, interest, and add-ons.
    pub total_payment: Decimal,
    pub total_interest: Decimal,
    pub percent_of_gross_income: Decimal,
    pub percent_of_net_income: Decimal,
    pub tier: AffordabilityTier,
}

/// Everything one solve produces. Replaced wholesale by the next solve.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AffordabilityResult {
    pub mode: SolveMode,
    pub annual_income: Decimal,
    pub monthly_gross_income: Decimal,
    pub monthly_net_income: Decimal,
    pub home_price: Decimal,
    pub loan_amount: Decimal,
    pub down_payment: DownPaymentSummary,
    pub interest_rate_percent: Decimal,
    pub term_years: u32,
    pub monthly_principal_and_interest: Decimal,
    pub monthly_property_tax: Decimal,
    pub monthly_insurance: Decimal,
    pub monthly_mortgage_insurance: Decimal,
    pub total_monthly_payment: Decimal,
    /// Annual property-tax rate applied, as a fraction; 0 when excluded.
    pub property_tax_rate: Decimal,
    pub percent_of_gross_income: Decimal,
    pub percent_of_net_income: Decimal,
    /// Housing plus other debts over gross income, in percent.
    pub back_end_percent: Decimal,
    pub tier: AffordabilityTier,
    pub is_affordable: bool,
    pub tax_burden: TaxBurden,
    pub per_term: BTreeMap<u32, TermOption>,
}
