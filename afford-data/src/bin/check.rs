use std::path::PathBuf;

use afford_core::{LoanTerm, RateSource};
use afford_data::{Defaults, RateDataset};
use anyhow::{Context, Result};
use clap::Parser;

/// Load a rate dataset and print what it contains.
///
/// The data directory must hold:
/// - federal_brackets.csv: min_income, max_income (empty for the top band), rate
/// - state_rates.csv: state, rate, local_tax_kind (empty when none)
/// - local_tax_rules.csv: state, subdivision, rule, rate, min_rate, max_rate, amount
/// - property_tax_rates.csv: state, county, rate
/// - defaults.toml: payroll, interest_rates, property_tax, policy
#[derive(Parser, Debug)]
#[command(name = "afford-data-check")]
#[command(version, about, long_about = None)]
struct Args {
    /// Directory with the dataset files (the bundled 2024 data when omitted)
    #[arg(short, long)]
    data_dir: Option<PathBuf>,

    /// TOML file overriding the dataset's defaults.toml
    #[arg(long)]
    defaults: Option<PathBuf>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let mut dataset = match &args.data_dir {
        Some(dir) => {
            println!("Loading rate data from: {}", dir.display());
            RateDataset::from_dir(dir)
                .with_context(|| format!("Failed to load rate data from: {}", dir.display()))?
        }
        None => {
            println!("Loading bundled rate data");
            RateDataset::bundled().context("Failed to load bundled rate data")?
        }
    };

    if let Some(path) = &args.defaults {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read: {}", path.display()))?;
        let defaults = Defaults::from_toml(&text)
            .with_context(|| format!("Failed to parse defaults: {}", path.display()))?;
        dataset.apply_defaults(&defaults);
    }

    let tables = &dataset.tables;
    let strategies = dataset.strategies();

    println!("Federal brackets: {}", tables.federal_brackets().len());
    for term in LoanTerm::ALL {
        println!(
            "Default rate, {}-year: {}%",
            term.years(),
            tables.default_interest_rate(term)
        );
    }
    println!(
        "Default property-tax rate: {}",
        tables.default_property_tax_rate()
    );

    println!("States with local tax:");
    for state in tables.local_tax_states() {
        let Some(table) = tables.local_tax_table(state) else {
            continue;
        };
        let strategy = if strategies.get(state).is_some() {
            ", strategy registered"
        } else {
            ""
        };
        println!(
            "  {} ({}): {} subdivisions{}",
            state,
            table.kind.label(),
            table.names().len(),
            strategy
        );
    }

    Ok(())
}
