//! Tax and affordability calculators.
//!
//! Leaf calculators first: brackets and payroll, then the jurisdiction
//! resolver, the tax-burden aggregator, the mortgage model, and the
//! affordability solver on top.

pub mod common;

mod affordability;
mod bracket;
mod burden;
mod jurisdiction;
mod mortgage;
mod payroll;

pub use affordability::{AffordabilityError, AffordabilityRequest, AffordabilitySolver};
pub use bracket::{BracketError, BracketTaxCalculator, validate_brackets};
pub use burden::TaxBurdenAggregator;
pub use jurisdiction::{
    IowaSchoolDistrictSurtax, JurisdictionTaxResolver, LocalTaxStrategy, MichiganCityTax,
    NewYorkLocalTax, OregonRegionalTax, StrategyRegistry,
};
pub use mortgage::MortgagePaymentModel;
pub use payroll::PayrollTaxCalculator;
