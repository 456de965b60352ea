mod affordability;
mod income;
mod jurisdiction;
mod loan;
mod payroll;
mod tax_bracket;
mod tax_burden;
mod us_state;

pub use affordability::{
    AffordabilityPolicy, AffordabilityResult, AffordabilityTier, SolveMode, TermOption,
};
pub use income::{IncomeInput, IncomeSpec, PayFrequency};
pub use jurisdiction::{Jurisdiction, JurisdictionKind, LocalTaxRule, LocalTaxTable, Subdivision};
pub use loan::{
    DownPayment, DownPaymentSummary, FinancialExtras, LoanTerm, LoanTerms, PropertyTaxSelection,
};
pub use payroll::{PayrollConfigError, PayrollTaxConfig};
pub use tax_bracket::TaxBracket;
pub use tax_burden::{PayrollTax, TaxBurden};
pub use us_state::UsState;
