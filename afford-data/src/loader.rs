use std::io::Read;
use std::path::PathBuf;

use afford_core::calculations::{BracketError, validate_brackets};
use afford_core::data::RateTables;
use afford_core::{JurisdictionKind, LocalTaxRule, PayrollConfigError, TaxBracket, UsState};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::debug;

/// Errors that can occur when loading rate data.
///
/// Row numbers are 1-based and count data rows only (the header is row 0).
#[derive(Debug, Error)]
pub enum RateDataError {
    #[error("CSV parse error: {0}")]
    CsvParse(String),

    #[error("defaults file: {0}")]
    Toml(String),

    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("unknown state '{name}' on row {row}")]
    UnknownState { name: String, row: usize },

    #[error("unknown local tax kind '{kind}' on row {row}")]
    UnknownJurisdictionKind { kind: String, row: usize },

    #[error("unknown local tax rule '{rule}' on row {row} (expected flat, range, fixed, or table)")]
    UnknownRule { rule: String, row: usize },

    #[error("{rule} rule on row {row} is missing '{field}'")]
    MissingRuleValue {
        rule: String,
        field: &'static str,
        row: usize,
    },

    #[error("range on row {row} has min {min} above max {max}")]
    InvalidRange {
        min: Decimal,
        max: Decimal,
        row: usize,
    },

    #[error("rate {rate} on row {row} is outside [0, 1]")]
    InvalidRate { rate: Decimal, row: usize },

    #[error("local rule on row {row} for {state}, which declares no local tax")]
    UndeclaredLocalTax { state: UsState, row: usize },

    #[error("invalid federal brackets: {0}")]
    InvalidBrackets(#[from] BracketError),

    #[error("invalid payroll constants: {0}")]
    InvalidPayroll(#[from] PayrollConfigError),
}

impl From<csv::Error> for RateDataError {
    fn from(err: csv::Error) -> Self {
        RateDataError::CsvParse(err.to_string())
    }
}

impl From<toml::de::Error> for RateDataError {
    fn from(err: toml::de::Error) -> Self {
        RateDataError::Toml(err.to_string())
    }
}

fn deserialize_optional_decimal<'de, D>(deserializer: D) -> Result<Option<Decimal>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s: Option<String> = Option::deserialize(deserializer)?;
    match s {
        Some(s) if s.trim().is_empty() => Ok(None),
        Some(s) => s
            .trim()
            .parse::<Decimal>()
            .map(Some)
            .map_err(serde::de::Error::custom),
        None => Ok(None),
    }
}

/// One band of the federal schedule. An empty `max_income` marks the
/// open-ended top band.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct FederalBracketRecord {
    pub min_income: Decimal,
    #[serde(deserialize_with = "deserialize_optional_decimal")]
    pub max_income: Option<Decimal>,
    pub rate: Decimal,
}

/// A state's flat rate and, when it levies local tax, the kind of
/// subdivision that collects it (`county`, `city`, `school_district`,
/// `both`, or `region`).
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct StateRateRecord {
    pub state: String,
    pub rate: Decimal,
    #[serde(default)]
    pub local_tax_kind: Option<String>,
}

/// One subdivision's local rule. Which value columns are required depends
/// on `rule`:
///
/// | rule | columns |
/// |------|---------|
/// | `flat` | `rate` |
/// | `range` | `min_rate`, `max_rate` |
/// | `fixed` | `amount` |
/// | `table` | none |
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct LocalRuleRecord {
    pub state: String,
    pub subdivision: String,
    pub rule: String,
    #[serde(default, deserialize_with = "deserialize_optional_decimal")]
    pub rate: Option<Decimal>,
    #[serde(default, deserialize_with = "deserialize_optional_decimal")]
    pub min_rate: Option<Decimal>,
    #[serde(default, deserialize_with = "deserialize_optional_decimal")]
    pub max_rate: Option<Decimal>,
    #[serde(default, deserialize_with = "deserialize_optional_decimal")]
    pub amount: Option<Decimal>,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct PropertyTaxRecord {
    pub state: String,
    pub county: String,
    pub rate: Decimal,
}

/// Loader for the rate tables.
///
/// Each table is parsed into records first, then loaded into a
/// [`RateTables`], which is where names are resolved and values checked.
pub struct RateTableLoader;

impl RateTableLoader {
    /// Parse records of any table from a CSV reader.
    ///
    /// Headers are matched by name and surrounding whitespace is ignored.
    pub fn parse<T: DeserializeOwned, R: Read>(reader: R) -> Result<Vec<T>, RateDataError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .flexible(false)
            .from_reader(reader);
        let mut records = Vec::new();

        for result in csv_reader.deserialize() {
            let record: T = result?;
            records.push(record);
        }

        Ok(records)
    }

    /// Convert bracket records into a validated schedule.
    pub fn federal_brackets(
        records: &[FederalBracketRecord]
    ) -> Result<Vec<TaxBracket>, RateDataError> {
        let brackets: Vec<_> = records
            .iter()
            .map(|r| TaxBracket::new(r.min_income, r.max_income, r.rate))
            .collect();
        validate_brackets(&brackets)?;
        Ok(brackets)
    }

    /// Load flat state rates and local-tax declarations.
    ///
    /// Returns the number of states loaded.
    pub fn load_state_rates(
        tables: &mut RateTables,
        records: &[StateRateRecord],
    ) -> Result<usize, RateDataError> {
        for (idx, record) in records.iter().enumerate() {
            let row = idx + 1;
            let state = parse_state(&record.state, row)?;
            check_unit_rate(record.rate, row)?;
            tables.set_state_rate(state, record.rate);

            let kind = record
                .local_tax_kind
                .as_deref()
                .map(str::trim)
                .filter(|k| !k.is_empty());
            if let Some(kind) = kind {
                let kind = JurisdictionKind::parse(kind).ok_or_else(|| {
                    RateDataError::UnknownJurisdictionKind {
                        kind: kind.to_string(),
                        row,
                    }
                })?;
                tables.declare_local_tax(state, kind);
            }
        }

        debug!(count = records.len(), "loaded state rates");
        Ok(records.len())
    }

    /// Load subdivision rules. The state must already be declared by
    /// [`load_state_rates`](Self::load_state_rates).
    ///
    /// Returns the number of rules loaded.
    pub fn load_local_rules(
        tables: &mut RateTables,
        records: &[LocalRuleRecord],
    ) -> Result<usize, RateDataError> {
        for (idx, record) in records.iter().enumerate() {
            let row = idx + 1;
            let state = parse_state(&record.state, row)?;
            let rule = convert_rule(record, row)?;
            if !tables.insert_local_rule(state, record.subdivision.clone(), rule) {
                return Err(RateDataError::UndeclaredLocalTax { state, row });
            }
        }

        debug!(count = records.len(), "loaded local tax rules");
        Ok(records.len())
    }

    /// Load county property-tax rates.
    ///
    /// Returns the number of counties loaded.
    pub fn load_property_tax_rates(
        tables: &mut RateTables,
        records: &[PropertyTaxRecord],
    ) -> Result<usize, RateDataError> {
        for (idx, record) in records.iter().enumerate() {
            let row = idx + 1;
            let state = parse_state(&record.state, row)?;
            check_unit_rate(record.rate, row)?;
            tables.insert_property_tax_rate(state, record.county.clone(), record.rate);
        }

        debug!(count = records.len(), "loaded property tax rates");
        Ok(records.len())
    }
}

fn parse_state(
    name: &str,
    row: usize,
) -> Result<UsState, RateDataError> {
    UsState::parse(name).ok_or_else(|| RateDataError::UnknownState {
        name: name.to_string(),
        row,
    })
}

fn check_unit_rate(
    rate: Decimal,
    row: usize,
) -> Result<(), RateDataError> {
    if rate < Decimal::ZERO || rate > Decimal::ONE {
        return Err(RateDataError::InvalidRate { rate, row });
    }
    Ok(())
}

fn convert_rule(
    record: &LocalRuleRecord,
    row: usize,
) -> Result<LocalTaxRule, RateDataError> {
    let require = |value: Option<Decimal>, field: &'static str| {
        value.ok_or_else(|| RateDataError::MissingRuleValue {
            rule: record.rule.clone(),
            field,
            row,
        })
    };

    match record.rule.trim().to_ascii_lowercase().as_str() {
        "flat" => {
            let rate = require(record.rate, "rate")?;
            check_unit_rate(rate, row)?;
            Ok(LocalTaxRule::FlatRate(rate))
        }
        "range" => {
            let min = require(record.min_rate, "min_rate")?;
            let max = require(record.max_rate, "max_rate")?;
            check_unit_rate(min, row)?;
            check_unit_rate(max, row)?;
            if min > max {
                return Err(RateDataError::InvalidRange { min, max, row });
            }
            Ok(LocalTaxRule::RangeRate { min, max })
        }
        "fixed" => Ok(LocalTaxRule::FixedAmount(require(record.amount, "amount")?)),
        "table" => Ok(LocalTaxRule::TableBased),
        _ => Err(RateDataError::UnknownRule {
            rule: record.rule.clone(),
            row,
        }),
    }
}
