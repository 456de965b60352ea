use std::collections::{BTreeMap, HashMap};

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tracing::warn;

use super::RateSource;
use crate::{
    JurisdictionKind, LoanTerm, LocalTaxRule, LocalTaxTable, PayrollTaxConfig, TaxBracket,
    UsState,
};

/// In-memory [`RateSource`].
///
/// Built once by a loader (or by hand in tests) and then only read.
#[derive(Debug, Clone, PartialEq)]
pub struct RateTables {
    federal_brackets: Vec<TaxBracket>,
    payroll: PayrollTaxConfig,
    state_rates: HashMap<UsState, Decimal>,
    local_tables: HashMap<UsState, LocalTaxTable>,
    property_tax_rates: HashMap<UsState, Vec<(String, Decimal)>>,
    default_property_tax_rate: Decimal,
    interest_rates: BTreeMap<LoanTerm, Decimal>,
}

impl RateTables {
    /// Tables with the given federal schedule and payroll constants, no state
    /// or local data, a 2.8% default property-tax rate, and the 2024 default
    /// interest rates.
    pub fn new(
        federal_brackets: Vec<TaxBracket>,
        payroll: PayrollTaxConfig,
    ) -> Self {
        let interest_rates = BTreeMap::from([
            (LoanTerm::TenYear, dec!(5.84)),
            (LoanTerm::FifteenYear, dec!(5.96)),
            (LoanTerm::ThirtyYear, dec!(6.5)),
        ]);

        Self {
            federal_brackets,
            payroll,
            state_rates: HashMap::new(),
            local_tables: HashMap::new(),
            property_tax_rates: HashMap::new(),
            default_property_tax_rate: dec!(0.028),
            interest_rates,
        }
    }

    /// 2024 single-filer federal schedule and payroll constants.
    pub fn tax_year_2024() -> Self {
        let brackets = vec![
            TaxBracket::new(dec!(0), Some(dec!(11600)), dec!(0.10)),
            TaxBracket::new(dec!(11600), Some(dec!(47150)), dec!(0.12)),
            TaxBracket::new(dec!(47150), Some(dec!(100525)), dec!(0.22)),
            TaxBracket::new(dec!(100525), Some(dec!(191950)), dec!(0.24)),
            TaxBracket::new(dec!(191950), Some(dec!(243725)), dec!(0.32)),
            TaxBracket::new(dec!(243725), Some(dec!(609350)), dec!(0.35)),
            TaxBracket::new(dec!(609350), None, dec!(0.37)),
        ];
        Self::new(brackets, PayrollTaxConfig::tax_year_2024())
    }

    pub fn set_payroll_config(
        &mut self,
        payroll: PayrollTaxConfig,
    ) {
        self.payroll = payroll;
    }

    pub fn set_state_rate(
        &mut self,
        state: UsState,
        rate: Decimal,
    ) {
        self.state_rates.insert(state, rate);
    }

    /// Declares that `state` levies local tax through `kind` subdivisions.
    ///
    /// Existing subdivisions are kept; only the kind is updated.
    pub fn declare_local_tax(
        &mut self,
        state: UsState,
        kind: JurisdictionKind,
    ) {
        self.local_tables
            .entry(state)
            .and_modify(|table| table.kind = kind)
            .or_insert_with(|| LocalTaxTable::new(kind));
    }

    /// Adds a subdivision rule. The state must already be declared with
    /// [`declare_local_tax`](Self::declare_local_tax); otherwise the rule is
    /// dropped and `false` is returned.
    pub fn insert_local_rule(
        &mut self,
        state: UsState,
        subdivision: impl Into<String>,
        rule: LocalTaxRule,
    ) -> bool {
        let subdivision = subdivision.into();
        match self.local_tables.get_mut(&state) {
            Some(table) => {
                table.insert(subdivision, rule);
                true
            }
            None => {
                warn!(
                    %state,
                    subdivision = %subdivision,
                    "local rule for a state without declared local tax ignored"
                );
                false
            }
        }
    }

    /// Sets a county's property-tax rate, replacing any previous rate for
    /// the same county.
    pub fn insert_property_tax_rate(
        &mut self,
        state: UsState,
        county: impl Into<String>,
        rate: Decimal,
    ) {
        let county = county.into();
        let counties = self.property_tax_rates.entry(state).or_default();
        match counties.iter_mut().find(|(name, _)| *name == county) {
            Some(existing) => existing.1 = rate,
            None => counties.push((county, rate)),
        }
    }

    pub fn set_default_property_tax_rate(
        &mut self,
        rate: Decimal,
    ) {
        self.default_property_tax_rate = rate;
    }

    pub fn set_default_interest_rate(
        &mut self,
        term: LoanTerm,
        rate_percent: Decimal,
    ) {
        self.interest_rates.insert(term, rate_percent);
    }

    /// States with a declared local tax, sorted.
    pub fn local_tax_states(&self) -> Vec<UsState> {
        let mut states: Vec<_> = self.local_tables.keys().copied().collect();
        states.sort_unstable();
        states
    }
}

impl Default for RateTables {
    fn default() -> Self {
        Self::tax_year_2024()
    }
}

impl RateSource for RateTables {
    fn federal_brackets(&self) -> &[TaxBracket] {
        &self.federal_brackets
    }

    fn payroll_config(&self) -> &PayrollTaxConfig {
        &self.payroll
    }

    fn state_rate(
        &self,
        state: UsState,
    ) -> Decimal {
        self.state_rates
            .get(&state)
            .copied()
            .unwrap_or(Decimal::ZERO)
    }

    fn local_tax_table(
        &self,
        state: UsState,
    ) -> Option<&LocalTaxTable> {
        self.local_tables.get(&state)
    }

    fn property_tax_rate(
        &self,
        state: UsState,
        county: &str,
    ) -> Option<Decimal> {
        self.property_tax_rates
            .get(&state)?
            .iter()
            .find(|(name, _)| name == county)
            .map(|(_, rate)| *rate)
    }

    fn property_tax_counties(
        &self,
        state: UsState,
    ) -> Vec<&str> {
        self.property_tax_rates
            .get(&state)
            .map(|counties| counties.iter().map(|(name, _)| name.as_str()).collect())
            .unwrap_or_default()
    }

    fn default_property_tax_rate(&self) -> Decimal {
        self.default_property_tax_rate
    }

    fn default_interest_rate(
        &self,
        term: LoanTerm,
    ) -> Decimal {
        match self.interest_rates.get(&term) {
            Some(rate) => *rate,
            None => {
                warn!(years = term.years(), "no default interest rate for term");
                Decimal::ZERO
            }
        }
    }
}
