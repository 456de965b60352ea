//! Total annual tax burden on gross income.
//!
//! ```text
//! federal = bracket tax on income
//! payroll = social security + medicare
//! state   = income × flat state rate (0 for unknown states)
//! local   = resolver(income, state, subdivision)
//! total   = federal + payroll + state + local
//! ```
//!
//! Each component is rounded half-up to cents once, here; `total` is the sum
//! of the rounded parts so the breakdown always adds up.

use rust_decimal::Decimal;
use tracing::debug;

use super::common::{ratio, round_half_up, round_rate};
use super::{
    BracketTaxCalculator, JurisdictionTaxResolver, PayrollTaxCalculator, StrategyRegistry,
};
use crate::data::RateSource;
use crate::{Jurisdiction, PayrollTax, TaxBurden};

/// Composes the federal, payroll, state, and local calculators.
#[derive(Clone, Copy)]
pub struct TaxBurdenAggregator<'a> {
    source: &'a dyn RateSource,
    resolver: JurisdictionTaxResolver<'a>,
}

impl<'a> TaxBurdenAggregator<'a> {
    pub fn new(
        source: &'a dyn RateSource,
        strategies: &'a StrategyRegistry,
    ) -> Self {
        Self {
            source,
            resolver: JurisdictionTaxResolver::new(source, strategies),
        }
    }

    pub fn resolver(&self) -> &JurisdictionTaxResolver<'a> {
        &self.resolver
    }

    /// Tax burden on `annual_income` for `jurisdiction`.
    pub fn total_burden(
        &self,
        annual_income: Decimal,
        jurisdiction: &Jurisdiction,
    ) -> TaxBurden {
        let income = annual_income.max(Decimal::ZERO);

        let federal = BracketTaxCalculator::new(self.source.federal_brackets()).tax(income);
        let payroll =
            PayrollTaxCalculator::new(self.source.payroll_config().clone()).calculate(income);
        let state = income * self.source.state_rate(jurisdiction.state);
        let local = self.resolver.local_tax(
            income,
            jurisdiction.state,
            jurisdiction.subdivision_key(),
        );

        let payroll = PayrollTax {
            social_security: round_half_up(payroll.social_security),
            medicare: round_half_up(payroll.medicare),
            total: round_half_up(payroll.social_security) + round_half_up(payroll.medicare),
        };
        let federal = round_half_up(federal);
        let state = round_half_up(state);
        let local = round_half_up(local);
        let total = federal + payroll.total + state + local;

        debug!(
            %income,
            state_name = %jurisdiction.state,
            %federal,
            payroll = %payroll.total,
            %state,
            %local,
            %total,
            "tax burden"
        );

        TaxBurden {
            federal,
            payroll,
            state,
            local,
            total,
            effective_rate: round_rate(ratio(total, income)),
        }
    }
}
