use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Employee payroll tax split into its two programs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayrollTax {
    pub social_security: Decimal,
    pub medicare: Decimal,
    pub total: Decimal,
}

/// Annual tax owed on gross income, by level of government.
///
/// Derived on every solve and never persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxBurden {
    pub federal: Decimal,
    pub payroll: PayrollTax,
    pub state: Decimal,
    pub local: Decimal,
    pub total: Decimal,
    /// `total / gross annual income`, or 0 when income is 0.
    pub effective_rate: Decimal,
}
