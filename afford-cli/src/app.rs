use std::path::Path;

use afford_core::{AffordabilityError, AffordabilityResult, AffordabilitySolver, UsState};
use afford_data::{Defaults, RateDataset};
use anyhow::{Context, Result};
use tracing::{debug, warn};

use crate::form::Household;
use crate::report::summary_line;
use crate::scenario_loader::{Scenario, ScenarioLoadError};

/// Loads the bundled dataset, or the one in `data_dir`, then applies a
/// separate defaults file when given.
pub fn load_dataset(
    data_dir: Option<&Path>,
    defaults: Option<&Path>,
) -> Result<RateDataset> {
    let mut dataset = match data_dir {
        Some(dir) => RateDataset::from_dir(dir)
            .with_context(|| format!("Failed to load rate data from: {}", dir.display()))?,
        None => RateDataset::bundled().context("Failed to load bundled rate data")?,
    };

    if let Some(path) = defaults {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read: {}", path.display()))?;
        let defaults = Defaults::from_toml(&text)
            .with_context(|| format!("Failed to parse defaults: {}", path.display()))?;
        dataset.apply_defaults(&defaults);
        debug!(path = %path.display(), "applied defaults file");
    }

    Ok(dataset)
}

/// Evaluates the household's home price when it has one, otherwise solves
/// for the maximum.
pub fn solve(
    solver: &AffordabilitySolver<'_>,
    household: &Household,
) -> Result<AffordabilityResult, AffordabilityError> {
    match household.home_price {
        Some(price) => Ok(solver.evaluate_home_price(price, &household.request)),
        None => solver.compute_max_affordability(&household.request),
    }
}

/// Report lines and counts from one batch run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub lines: Vec<String>,
    pub solved: usize,
    pub failed: usize,
}

/// Solves every loaded scenario. Rows that failed to load or to solve get
/// an error line; the rest of the batch still runs.
pub fn run_batch(
    solver: &AffordabilitySolver<'_>,
    scenarios: &[Result<Scenario, ScenarioLoadError>],
) -> BatchSummary {
    let mut summary = BatchSummary::default();

    for scenario in scenarios {
        let line = match scenario {
            Ok(scenario) => match solve(solver, &scenario.household) {
                Ok(result) => {
                    summary.solved += 1;
                    summary_line(&scenario.label, &result)
                }
                Err(err) => {
                    summary.failed += 1;
                    format!("row {} ({}): {err}", scenario.row, scenario.label)
                }
            },
            Err(err) => {
                summary.failed += 1;
                warn!(error = %err, "batch row skipped");
                err.to_string()
            }
        };
        summary.lines.push(line);
    }

    summary
}

/// Local-tax subdivisions of `state`, one per line, under a heading that
/// names their kind.
pub fn jurisdiction_listing(
    solver: &AffordabilitySolver<'_>,
    state: UsState,
) -> String {
    let Some(kind) = solver.jurisdiction_kind(state) else {
        return format!("{state} has no local income tax");
    };

    let mut out = format!("{state} local tax by {}:", kind.label());
    for name in solver.jurisdictions_for(state) {
        out.push_str("\n  ");
        out.push_str(name);
    }
    out
}

/// Counties of `state` with a property-tax rate, one per line.
pub fn county_listing(
    solver: &AffordabilitySolver<'_>,
    state: UsState,
) -> String {
    let counties = solver.counties_for(state);
    if counties.is_empty() {
        return format!("{state} has no county rates; the default property-tax rate applies");
    }

    let mut out = format!("{state} property-tax counties:");
    for county in counties {
        out.push_str("\n  ");
        out.push_str(county);
    }
    out
}
