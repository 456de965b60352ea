//! CSV loader for batch household scenarios.
//!
//! ## CSV Format
//!
//! Column order does **not** matter (headers are matched by name) and every
//! column may be left out. Cells are validated with the same rules as the
//! command-line flags (see [`crate::form`]).
//!
//! | Column | Notes |
//! |--------|-------|
//! | `label` | Shown in the report; defaults to `row N` |
//! | `income` | Gross pay per `frequency` |
//! | `frequency` | `hourly`, `weekly`, `biweekly`, `monthly`, `annual` |
//! | `take_home` | Monthly take-home pay, instead of `income` |
//! | `state` | Full name or postal code |
//! | `subdivision` | Local-tax county, city, or district |
//! | `home_price` | Present: evaluate this price. Empty: solve the maximum |
//! | `down_payment_percent` | |
//! | `down_payment_amount` | |
//! | `term_years` | `10`, `15`, or `30` |
//! | `interest_rate` | Annual percent; empty uses the term's default |
//! | `monthly_debts` | |
//! | `fha` | `true`/`false`, `yes`/`no`, `1`/`0`; empty is `false` |
//!
//! ### Example
//!
//! ```csv
//! label,income,frequency,state,subdivision,home_price,down_payment_amount
//! Austin couple,120000,annual,Texas,,400000,40000
//! Queens renter,4200,biweekly,New York,New York City,,
//! ```

use std::path::{Path, PathBuf};

use afford_core::AffordabilityPolicy;
use serde::Deserialize;
use thiserror::Error;

use crate::form::{Household, HouseholdForm, ValidationErrors};

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct CsvRow {
    label: String,
    income: String,
    frequency: String,
    take_home: String,
    state: String,
    subdivision: String,
    home_price: String,
    down_payment_percent: String,
    down_payment_amount: String,
    term_years: String,
    interest_rate: String,
    monthly_debts: String,
    fha: String,
}

/// Errors that can occur while loading scenarios.
#[derive(Debug, Error)]
pub enum ScenarioLoadError {
    /// The row could not be read (bad structure, wrong column count, etc.).
    #[error("CSV parse error: {0}")]
    Parse(#[from] csv::Error),

    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The `fha` cell is not a recognised flag. `row` is 1-based.
    #[error("row {row}: invalid fha flag '{value}'")]
    InvalidFlag { value: String, row: usize },

    /// The row's household failed validation.
    #[error("row {row} ({label}): {errors}")]
    Invalid {
        row: usize,
        label: String,
        errors: ValidationErrors,
    },
}

/// One validated scenario.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scenario {
    /// 1-based row number.
    pub row: usize,
    pub label: String,
    pub household: Household,
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "" | "false" | "no" | "n" | "0" => Some(false),
        "true" | "yes" | "y" | "1" => Some(true),
        _ => None,
    }
}

fn convert_row(
    row: CsvRow,
    row_number: usize,
    policy: &AffordabilityPolicy,
) -> Result<Scenario, ScenarioLoadError> {
    let label = match row.label.trim() {
        "" => format!("row {row_number}"),
        label => label.to_string(),
    };
    let fha = parse_flag(&row.fha).ok_or_else(|| ScenarioLoadError::InvalidFlag {
        value: row.fha.clone(),
        row: row_number,
    })?;

    let form = HouseholdForm {
        income: row.income,
        frequency: row.frequency,
        take_home: row.take_home,
        state: row.state,
        subdivision: row.subdivision,
        home_price: row.home_price,
        down_payment_percent: row.down_payment_percent,
        down_payment_amount: row.down_payment_amount,
        term_years: row.term_years,
        interest_rate: row.interest_rate,
        monthly_debts: row.monthly_debts,
        fha,
        ..HouseholdForm::default()
    };

    match form.validate(policy) {
        Ok(household) => Ok(Scenario {
            row: row_number,
            label,
            household,
        }),
        Err(errors) => Err(ScenarioLoadError::Invalid {
            row: row_number,
            label,
            errors,
        }),
    }
}

/// Parse CSV text into one result per data row, in file order.
///
/// A bad row yields an `Err` in its slot; the remaining rows still load.
pub fn load_from_str(
    input: &str,
    policy: &AffordabilityPolicy,
) -> Vec<Result<Scenario, ScenarioLoadError>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .flexible(false)
        .from_reader(input.as_bytes());

    reader
        .deserialize::<CsvRow>()
        .enumerate()
        .map(|(idx, result)| {
            let row_number = idx + 1;
            convert_row(result?, row_number, policy)
        })
        .collect()
}

/// Read a file from disk and delegate to [`load_from_str`].
///
/// # Errors
///
/// Returns [`ScenarioLoadError::Io`] when the file cannot be read.
pub fn load_from_file(
    path: &Path,
    policy: &AffordabilityPolicy,
) -> Result<Vec<Result<Scenario, ScenarioLoadError>>, ScenarioLoadError> {
    let contents = std::fs::read_to_string(path).map_err(|source| ScenarioLoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(load_from_str(&contents, policy))
}
