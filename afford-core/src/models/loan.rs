use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::UsState;
use crate::calculations::common::ratio;

/// Loan lengths offered for comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum LoanTerm {
    TenYear,
    FifteenYear,
    ThirtyYear,
}

impl LoanTerm {
    pub const ALL: [LoanTerm; 3] = [Self::TenYear, Self::FifteenYear, Self::ThirtyYear];

    pub fn years(&self) -> u32 {
        match self {
            Self::TenYear => 10,
            Self::FifteenYear => 15,
            Self::ThirtyYear => 30,
        }
    }

    pub fn from_years(years: u32) -> Option<Self> {
        match years {
            10 => Some(Self::TenYear),
            15 => Some(Self::FifteenYear),
            30 => Some(Self::ThirtyYear),
            _ => None,
        }
    }
}

/// How the down payment was specified.
///
/// The representation the user did not choose is always derived from the
/// home price in force, see [`DownPayment::resolve`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DownPayment {
    /// Percent of the home price, in `[0, 100]`.
    Percent(Decimal),
    /// Fixed dollar amount.
    Amount(Decimal),
}

/// Both representations of a down payment for a specific home price.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DownPaymentSummary {
    pub amount: Decimal,
    pub percent: Decimal,
}

impl DownPayment {
    /// Reconciles the down payment against `home_price`.
    ///
    /// A zero home price yields a 0% share rather than a division error.
    pub fn resolve(
        &self,
        home_price: Decimal,
    ) -> DownPaymentSummary {
        match self {
            Self::Percent(percent) => DownPaymentSummary {
                amount: home_price * percent / Decimal::ONE_HUNDRED,
                percent: *percent,
            },
            Self::Amount(amount) => DownPaymentSummary {
                amount: *amount,
                percent: ratio(*amount, home_price) * Decimal::ONE_HUNDRED,
            },
        }
    }
}

/// Financing terms for the purchase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoanTerms {
    pub down_payment: DownPayment,
    /// Annual rate in percent; `None` uses the default rate for `term`.
    pub interest_rate_percent: Option<Decimal>,
    pub term: LoanTerm,
}

/// Property-tax inputs. The rate is resolved from the county table when the
/// county is known, else `custom_rate_percent`, else the table default.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyTaxSelection {
    pub county: Option<(UsState, String)>,
    pub custom_rate_percent: Option<Decimal>,
}

/// Debts and housing add-ons that sit alongside the loan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinancialExtras {
    /// Non-housing monthly debt payments (car, cards, student loans).
    pub monthly_debts: Decimal,
    /// `None` excludes property tax from the housing payment.
    pub property_tax: Option<PropertyTaxSelection>,
    /// Annual premium; `None` excludes insurance.
    pub home_insurance_annual: Option<Decimal>,
    /// FHA loans force the minimum percent down and add mortgage insurance.
    pub fha_loan: bool,
}

impl Default for FinancialExtras {
    fn default() -> Self {
        Self {
            monthly_debts: Decimal::ZERO,
            property_tax: Some(PropertyTaxSelection::default()),
            home_insurance_annual: None,
            fha_loan: false,
        }
    }
}

impl FinancialExtras {
    pub fn has_debts(&self) -> bool {
        self.monthly_debts > Decimal::ZERO
    }
}
