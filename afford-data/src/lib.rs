//! Rate data for the affordability calculator.
//!
//! A dataset is five files:
//!
//! | file | contents |
//! |------|----------|
//! | `federal_brackets.csv` | `min_income, max_income, rate` |
//! | `state_rates.csv` | `state, rate, local_tax_kind` |
//! | `local_tax_rules.csv` | `state, subdivision, rule, rate, min_rate, max_rate, amount` |
//! | `property_tax_rates.csv` | `state, county, rate` |
//! | `defaults.toml` | payroll constants, interest rates, default property-tax rate, solver policy |
//!
//! The 2024 dataset is compiled in; [`RateDataset::from_dir`] loads a
//! replacement from disk.
//!
//! ```
//! use afford_core::{RateSource, UsState};
//! use afford_data::RateDataset;
//! use rust_decimal_macros::dec;
//!
//! let dataset = RateDataset::bundled().unwrap();
//! assert_eq!(dataset.tables.state_rate(UsState::Texas), dec!(0));
//! ```

mod defaults;
mod loader;

use std::fs;
use std::path::Path;

use afford_core::calculations::StrategyRegistry;
use afford_core::data::RateTables;
use afford_core::{AffordabilityPolicy, AffordabilitySolver};
use tracing::info;

pub use defaults::{Defaults, InterestRateDefaults, PropertyTaxDefaults};
pub use loader::{
    FederalBracketRecord, LocalRuleRecord, PropertyTaxRecord, RateDataError, RateTableLoader,
    StateRateRecord,
};

pub const FEDERAL_BRACKETS_FILE: &str = "federal_brackets.csv";
pub const STATE_RATES_FILE: &str = "state_rates.csv";
pub const LOCAL_TAX_RULES_FILE: &str = "local_tax_rules.csv";
pub const PROPERTY_TAX_RATES_FILE: &str = "property_tax_rates.csv";
pub const DEFAULTS_FILE: &str = "defaults.toml";

/// Raw text of the five dataset files.
#[derive(Debug, Clone, Copy)]
pub struct DataSources<'a> {
    pub federal_brackets: &'a str,
    pub state_rates: &'a str,
    pub local_tax_rules: &'a str,
    pub property_tax_rates: &'a str,
    pub defaults: &'a str,
}

impl DataSources<'static> {
    /// The compiled-in 2024 dataset.
    pub fn bundled() -> Self {
        Self {
            federal_brackets: include_str!("../data/federal_brackets.csv"),
            state_rates: include_str!("../data/state_rates.csv"),
            local_tax_rules: include_str!("../data/local_tax_rules.csv"),
            property_tax_rates: include_str!("../data/property_tax_rates.csv"),
            defaults: include_str!("../data/defaults.toml"),
        }
    }
}

/// Loaded rate tables plus the solver policy from the defaults file.
#[derive(Debug, Clone, PartialEq)]
pub struct RateDataset {
    pub tables: RateTables,
    pub policy: AffordabilityPolicy,
}

impl RateDataset {
    /// Load the compiled-in 2024 dataset.
    pub fn bundled() -> Result<Self, RateDataError> {
        Self::from_sources(&DataSources::bundled())
    }

    /// Load a dataset from a directory holding the five files.
    ///
    /// # Errors
    /// * [`RateDataError::Io`] if any file cannot be read.
    /// * Any error from [`from_sources`](Self::from_sources).
    pub fn from_dir(dir: &Path) -> Result<Self, RateDataError> {
        let federal_brackets = read_file(dir, FEDERAL_BRACKETS_FILE)?;
        let state_rates = read_file(dir, STATE_RATES_FILE)?;
        let local_tax_rules = read_file(dir, LOCAL_TAX_RULES_FILE)?;
        let property_tax_rates = read_file(dir, PROPERTY_TAX_RATES_FILE)?;
        let defaults = read_file(dir, DEFAULTS_FILE)?;

        Self::from_sources(&DataSources {
            federal_brackets: &federal_brackets,
            state_rates: &state_rates,
            local_tax_rules: &local_tax_rules,
            property_tax_rates: &property_tax_rates,
            defaults: &defaults,
        })
    }

    /// Parse and load every table. State rates load before local rules so
    /// each rule's state is already declared.
    pub fn from_sources(sources: &DataSources<'_>) -> Result<Self, RateDataError> {
        let brackets: Vec<FederalBracketRecord> =
            RateTableLoader::parse(sources.federal_brackets.as_bytes())?;
        let defaults = Defaults::from_toml(sources.defaults)?;

        let mut tables = RateTables::new(
            RateTableLoader::federal_brackets(&brackets)?,
            defaults.payroll.clone(),
        );

        let states: Vec<StateRateRecord> =
            RateTableLoader::parse(sources.state_rates.as_bytes())?;
        let state_count = RateTableLoader::load_state_rates(&mut tables, &states)?;

        let rules: Vec<LocalRuleRecord> =
            RateTableLoader::parse(sources.local_tax_rules.as_bytes())?;
        let rule_count = RateTableLoader::load_local_rules(&mut tables, &rules)?;

        let counties: Vec<PropertyTaxRecord> =
            RateTableLoader::parse(sources.property_tax_rates.as_bytes())?;
        let county_count = RateTableLoader::load_property_tax_rates(&mut tables, &counties)?;

        let mut dataset = Self {
            tables,
            policy: AffordabilityPolicy::default(),
        };
        dataset.apply_defaults(&defaults);

        info!(
            brackets = brackets.len(),
            states = state_count,
            local_rules = rule_count,
            counties = county_count,
            "rate data loaded"
        );
        Ok(dataset)
    }

    /// Replace the tax-year constants and policy with `defaults`, keeping
    /// the tables.
    pub fn apply_defaults(
        &mut self,
        defaults: &Defaults,
    ) {
        defaults.apply_to(&mut self.tables);
        self.policy = defaults.policy.clone();
    }

    /// Built-in local-tax strategies, priced against these tables.
    pub fn strategies(&self) -> StrategyRegistry {
        StrategyRegistry::with_builtin_strategies(&self.tables)
    }

    /// A solver over these tables with the loaded policy.
    pub fn solver<'a>(
        &'a self,
        strategies: &'a StrategyRegistry,
    ) -> AffordabilitySolver<'a> {
        AffordabilitySolver::new(&self.tables, strategies).with_policy(self.policy.clone())
    }
}

fn read_file(
    dir: &Path,
    name: &str,
) -> Result<String, RateDataError> {
    let path = dir.join(name);
    fs::read_to_string(&path).map_err(|source| RateDataError::Io { path, source })
}
