//! Local (sub-state) income tax.
//!
//! Each state that levies local tax declares a [`LocalTaxTable`]: what kind
//! of subdivision collects it and one [`LocalTaxRule`] per subdivision. The
//! resolver dispatches on the rule shape:
//!
//! | Rule | Local tax |
//! |------|-----------|
//! | `FlatRate(r)` | `income × r` |
//! | `RangeRate { min, max }` | `income × (min + max) / 2` |
//! | `FixedAmount(v)` | `v` |
//! | `TableBased` | the state's registered [`LocalTaxStrategy`] |
//!
//! Missing data is never an error. A state without a table, a blank or
//! unknown subdivision, or a table-based rule with no registered strategy
//! all contribute zero and are logged as data gaps.

mod strategies;

use std::collections::HashMap;

use rust_decimal::Decimal;
use tracing::{debug, warn};

pub use strategies::{
    IowaSchoolDistrictSurtax, MichiganCityTax, NewYorkLocalTax, OregonRegionalTax,
};

use crate::data::RateSource;
use crate::{JurisdictionKind, LocalTaxRule, UsState};

/// State-specific local-tax formula for subdivisions whose rule is
/// [`LocalTaxRule::TableBased`].
pub trait LocalTaxStrategy: Send + Sync {
    /// The state this strategy computes for.
    fn state(&self) -> UsState;

    /// Local tax on `annual_income` for `subdivision`; 0 for subdivisions
    /// the strategy does not recognise.
    fn local_tax(
        &self,
        annual_income: Decimal,
        subdivision: &str,
    ) -> Decimal;
}

/// Registry of [`LocalTaxStrategy`] instances, keyed by state.
///
/// Adding a state with a formula-driven local tax means registering one more
/// strategy; the resolver's dispatch does not change.
pub struct StrategyRegistry {
    strategies: HashMap<UsState, Box<dyn LocalTaxStrategy>>,
}

impl StrategyRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            strategies: HashMap::new(),
        }
    }

    /// Registry holding the New York, Michigan, Oregon, and Iowa strategies.
    ///
    /// New York and Iowa stack on the flat state rate, which is read from
    /// `source` here.
    pub fn with_builtin_strategies(source: &dyn RateSource) -> Self {
        let mut registry = Self::new();
        registry.register(Box::new(NewYorkLocalTax::new(
            source.state_rate(UsState::NewYork),
        )));
        registry.register(Box::new(MichiganCityTax::default()));
        registry.register(Box::new(OregonRegionalTax::default()));
        registry.register(Box::new(IowaSchoolDistrictSurtax::tax_year_2024(
            source.state_rate(UsState::Iowa),
        )));
        registry
    }

    /// Register a strategy, replacing any existing one for the same state.
    pub fn register(
        &mut self,
        strategy: Box<dyn LocalTaxStrategy>,
    ) {
        self.strategies.insert(strategy.state(), strategy);
    }

    pub fn get(
        &self,
        state: UsState,
    ) -> Option<&dyn LocalTaxStrategy> {
        self.strategies.get(&state).map(|s| s.as_ref())
    }

    /// States with a registered strategy, sorted.
    pub fn registered_states(&self) -> Vec<UsState> {
        let mut states: Vec<_> = self.strategies.keys().copied().collect();
        states.sort_unstable();
        states
    }
}

impl Default for StrategyRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Resolves the local tax owed for a state and optional subdivision.
#[derive(Clone, Copy)]
pub struct JurisdictionTaxResolver<'a> {
    source: &'a dyn RateSource,
    strategies: &'a StrategyRegistry,
}

impl<'a> JurisdictionTaxResolver<'a> {
    pub fn new(
        source: &'a dyn RateSource,
        strategies: &'a StrategyRegistry,
    ) -> Self {
        Self { source, strategies }
    }

    /// Local tax on `annual_income`, unrounded and never negative.
    pub fn local_tax(
        &self,
        annual_income: Decimal,
        state: UsState,
        subdivision: Option<&str>,
    ) -> Decimal {
        let Some(table) = self.source.local_tax_table(state) else {
            return Decimal::ZERO;
        };
        let Some(subdivision) = subdivision.map(str::trim).filter(|s| !s.is_empty()) else {
            debug!(%state, "no subdivision selected; local tax is zero");
            return Decimal::ZERO;
        };
        let Some(rule) = table.rule_for(subdivision) else {
            warn!(%state, subdivision, "unmapped subdivision; local tax treated as zero");
            return Decimal::ZERO;
        };

        let income = annual_income.max(Decimal::ZERO);
        let tax = match rule {
            LocalTaxRule::FlatRate(rate) => income * rate,
            LocalTaxRule::RangeRate { min, max } => income * (min + max) / Decimal::TWO,
            LocalTaxRule::FixedAmount(amount) => *amount,
            LocalTaxRule::TableBased => match self.strategies.get(state) {
                Some(strategy) => strategy.local_tax(income, subdivision),
                None => {
                    warn!(%state, subdivision, "table-based rule without a registered strategy");
                    Decimal::ZERO
                }
            },
        };

        debug!(%state, subdivision, ?rule, %tax, "local tax");
        tax.max(Decimal::ZERO)
    }

    /// Subdivision names for `state` in table order; empty when the state
    /// levies no local tax.
    pub fn jurisdictions_for(
        &self,
        state: UsState,
    ) -> Vec<&'a str> {
        self.source
            .local_tax_table(state)
            .map(|table| table.names())
            .unwrap_or_default()
    }

    /// What `state`'s subdivisions are, for labelling a selector.
    pub fn jurisdiction_kind(
        &self,
        state: UsState,
    ) -> Option<JurisdictionKind> {
        self.source.local_tax_table(state).map(|table| table.kind)
    }
}
