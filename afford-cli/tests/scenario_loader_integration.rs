//! Integration tests that run the batch loader and solver against an
//! on-disk fixture file.

use std::path::PathBuf;

use afford_cli::app::run_batch;
use afford_cli::form::ValidationError;
use afford_cli::scenario_loader::{self, ScenarioLoadError};
use afford_core::{DownPayment, IncomeInput, Jurisdiction, LoanTerm, UsState};
use afford_data::RateDataset;
use pretty_assertions::assert_eq;
use rust_decimal_macros::dec;

fn fixture_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join("scenarios.csv")
}

#[test]
fn test_load_fixture_file_keeps_every_row() {
    let dataset = RateDataset::bundled().unwrap();

    let scenarios = scenario_loader::load_from_file(&fixture_path(), &dataset.policy)
        .expect("fixture file should be readable");

    assert_eq!(scenarios.len(), 4);
    assert_eq!(scenarios.iter().filter(|s| s.is_ok()).count(), 3);
}

#[test]
fn test_load_fixture_reads_quoted_amounts_and_codes() {
    let dataset = RateDataset::bundled().unwrap();
    let scenarios = scenario_loader::load_from_file(&fixture_path(), &dataset.policy).unwrap();

    let columbus = scenarios[1].as_ref().unwrap();
    let request = &columbus.household.request;

    assert_eq!(columbus.label, "Columbus teacher");
    assert_eq!(
        request.jurisdiction,
        Jurisdiction::with_subdivision(UsState::Ohio, "Columbus")
    );
    assert_eq!(request.loan.down_payment, DownPayment::Percent(dec!(10)));
    assert_eq!(request.extras.monthly_debts, dec!(250));
    assert!(matches!(
        request.income,
        IncomeInput::Gross(ref spec) if spec.amount == dec!(62000)
    ));

    let detroit = scenarios[2].as_ref().unwrap();
    assert_eq!(detroit.household.request.loan.term, LoanTerm::FifteenYear);
    assert!(detroit.household.request.extras.fha_loan);
}

#[test]
fn test_load_fixture_reports_bad_row() {
    let dataset = RateDataset::bundled().unwrap();
    let scenarios = scenario_loader::load_from_file(&fixture_path(), &dataset.policy).unwrap();

    match &scenarios[3] {
        Err(ScenarioLoadError::Invalid { row, errors, .. }) => {
            assert_eq!(*row, 4);
            assert_eq!(
                errors.0,
                vec![ValidationError::UnsupportedTerm("20".to_string())]
            );
        }
        other => panic!("expected a validation error, got {other:?}"),
    }
}

#[test]
fn test_run_fixture_batch() {
    let dataset = RateDataset::bundled().unwrap();
    let strategies = dataset.strategies();
    let solver = dataset.solver(&strategies);
    let scenarios = scenario_loader::load_from_file(&fixture_path(), &dataset.policy).unwrap();

    let summary = run_batch(&solver, &scenarios);

    assert_eq!(summary.solved, 3);
    assert_eq!(summary.failed, 1);
    assert_eq!(
        summary.lines[0],
        "Austin couple: price $400,000.00, $3,208.77/month (32.09% of gross), red"
    );
    assert!(summary.lines[1].starts_with("Columbus teacher: max $"));
    assert!(summary.lines[2].starts_with("Detroit nurse: max $"));
    assert!(summary.lines[3].starts_with("row 4 (Bad term): unsupported loan term '20'"));
}

#[test]
fn test_load_missing_file_is_io_error() {
    let dataset = RateDataset::bundled().unwrap();
    let missing = fixture_path().with_file_name("no_such_file.csv");

    let result = scenario_loader::load_from_file(&missing, &dataset.policy);

    assert!(matches!(result, Err(ScenarioLoadError::Io { .. })));
}
