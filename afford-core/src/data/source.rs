use rust_decimal::Decimal;

use crate::{LoanTerm, LocalTaxTable, PayrollTaxConfig, TaxBracket, UsState};

/// Read-only rate data the calculators consume.
///
/// Implementations are loaded once and never mutated afterwards, so a single
/// instance can be shared across threads and solves without locking.
pub trait RateSource: Send + Sync {
    /// Federal marginal schedule. Must satisfy
    /// [`validate_brackets`](crate::calculations::validate_brackets).
    fn federal_brackets(&self) -> &[TaxBracket];

    fn payroll_config(&self) -> &PayrollTaxConfig;

    /// Flat state income-tax rate as a fraction; 0 for states without one.
    fn state_rate(
        &self,
        state: UsState,
    ) -> Decimal;

    /// Local-tax declaration for `state`, or `None` when the state levies no
    /// local income tax.
    fn local_tax_table(
        &self,
        state: UsState,
    ) -> Option<&LocalTaxTable>;

    /// Annual property-tax rate for a county, as a fraction.
    fn property_tax_rate(
        &self,
        state: UsState,
        county: &str,
    ) -> Option<Decimal>;

    /// Counties with a property-tax rate, in table order.
    fn property_tax_counties(
        &self,
        state: UsState,
    ) -> Vec<&str>;

    /// Rate used when no county is selected and no custom rate is given.
    fn default_property_tax_rate(&self) -> Decimal;

    /// Default annual interest rate, in percent, for `term`.
    fn default_interest_rate(
        &self,
        term: LoanTerm,
    ) -> Decimal;
}
