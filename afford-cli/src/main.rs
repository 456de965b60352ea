use std::path::PathBuf;

use afford_cli::app;
use afford_cli::form::HouseholdForm;
use afford_cli::logging::init_logging;
use afford_cli::report::ReportFormat;
use afford_cli::scenario_loader;
use afford_core::UsState;
use anyhow::{Context, anyhow, bail};
use clap::{Args, Parser, Subcommand};
use tracing::debug;

// ─── CLI definition ──────────────────────────────────────────────────────────

/// Home affordability calculator.
///
/// Estimates a household's tax burden from income and location, then finds
/// the most house it can carry or checks a given price against standard
/// debt-to-income ratios.
#[derive(Debug, Parser)]
#[command(name = "afford", version, about)]
struct Cli {
    /// Directory with replacement rate data (federal_brackets.csv,
    /// state_rates.csv, local_tax_rules.csv, property_tax_rates.csv,
    /// defaults.toml).
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// TOML file overriding the tax-year constants and solver policy.
    #[arg(long, global = true)]
    defaults: Option<PathBuf>,

    /// More log output (-v info, -vv debug). RUST_LOG takes precedence.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Also append log output to this file.
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Find the most expensive home the household can afford.
    Afford {
        #[command(flatten)]
        household: HouseholdArgs,

        #[arg(long, value_enum, default_value_t = ReportFormat::Text)]
        format: ReportFormat,
    },

    /// Check a specific home price against the household's income.
    Evaluate {
        /// Home price to evaluate.
        #[arg(long)]
        price: String,

        #[command(flatten)]
        household: HouseholdArgs,

        #[arg(long, value_enum, default_value_t = ReportFormat::Text)]
        format: ReportFormat,
    },

    /// Run every household in a CSV file, one summary line each.
    Batch {
        /// Scenario CSV file.
        #[arg(short, long)]
        file: PathBuf,
    },

    /// List a state's local-tax subdivisions.
    Jurisdictions {
        /// State name or postal code.
        state: String,
    },

    /// List a state's counties with a property-tax rate.
    Counties {
        /// State name or postal code.
        state: String,
    },
}

#[derive(Debug, Args)]
struct HouseholdArgs {
    /// Gross pay per --frequency.
    #[arg(long, default_value = "")]
    income: String,

    /// hourly, weekly, biweekly, monthly, or annual.
    #[arg(long, default_value = "annual")]
    frequency: String,

    /// Monthly take-home pay, instead of --income.
    #[arg(long, default_value = "")]
    take_home: String,

    /// State name or postal code.
    #[arg(long)]
    state: String,

    /// Local-tax county, city, or school district.
    #[arg(long, default_value = "")]
    subdivision: String,

    /// Down payment as a percent of the price (default 20).
    #[arg(long, default_value = "")]
    down_percent: String,

    /// Down payment as a dollar amount.
    #[arg(long, default_value = "")]
    down_amount: String,

    /// Loan term: 10, 15, or 30.
    #[arg(long, default_value = "30")]
    term: String,

    /// Annual interest rate in percent (default: the term's market rate).
    #[arg(long, default_value = "")]
    rate: String,

    /// Other monthly debt payments.
    #[arg(long, default_value = "")]
    debts: String,

    /// FHA loan: 3.5% down and mortgage insurance.
    #[arg(long)]
    fha: bool,

    /// County for the property-tax rate.
    #[arg(long, default_value = "")]
    county: String,

    /// Custom annual property-tax rate in percent.
    #[arg(long, default_value = "")]
    property_tax_rate: String,

    /// Leave property tax out of the payment.
    #[arg(long)]
    no_property_tax: bool,

    /// Leave home insurance out of the payment.
    #[arg(long)]
    no_insurance: bool,

    /// Annual home insurance premium (default: the policy premium).
    #[arg(long, default_value = "")]
    insurance_premium: String,
}

impl HouseholdArgs {
    fn into_form(
        self,
        home_price: String,
    ) -> HouseholdForm {
        HouseholdForm {
            income: self.income,
            frequency: self.frequency,
            take_home: self.take_home,
            state: self.state,
            subdivision: self.subdivision,
            home_price,
            down_payment_percent: self.down_percent,
            down_payment_amount: self.down_amount,
            term_years: self.term,
            interest_rate: self.rate,
            monthly_debts: self.debts,
            fha: self.fha,
            county: self.county,
            property_tax_rate: self.property_tax_rate,
            exclude_property_tax: self.no_property_tax,
            insurance: self.insurance_premium,
            exclude_insurance: self.no_insurance,
        }
    }
}

fn parse_state(name: &str) -> anyhow::Result<UsState> {
    UsState::parse(name).ok_or_else(|| anyhow!("unknown state '{name}'"))
}

// ─── entry point ─────────────────────────────────────────────────────────────

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.log_file.as_deref())?;

    let dataset = app::load_dataset(cli.data_dir.as_deref(), cli.defaults.as_deref())?;
    let strategies = dataset.strategies();
    let solver = dataset.solver(&strategies);
    debug!(command = ?cli.command, "running");

    match cli.command {
        Command::Afford { household, format } => {
            let household = household
                .into_form(String::new())
                .validate(solver.policy())
                .context("Invalid input")?;
            let result = app::solve(&solver, &household)?;
            print!("{}", format.render(&result)?);
        }
        Command::Evaluate {
            price,
            household,
            format,
        } => {
            let household = household
                .into_form(price)
                .validate(solver.policy())
                .context("Invalid input")?;
            if household.home_price.is_none() {
                bail!("Invalid input: --price is required");
            }
            let result = app::solve(&solver, &household)?;
            print!("{}", format.render(&result)?);
        }
        Command::Batch { file } => {
            let scenarios = scenario_loader::load_from_file(&file, solver.policy())
                .with_context(|| format!("Failed to load scenarios: {}", file.display()))?;
            let summary = app::run_batch(&solver, &scenarios);
            for line in &summary.lines {
                println!("{line}");
            }
            println!("{} solved, {} failed", summary.solved, summary.failed);
        }
        Command::Jurisdictions { state } => {
            println!("{}", app::jurisdiction_listing(&solver, parse_state(&state)?));
        }
        Command::Counties { state } => {
            println!("{}", app::county_listing(&solver, parse_state(&state)?));
        }
    }

    Ok(())
}
