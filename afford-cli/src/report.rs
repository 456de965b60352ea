//! Rendering of solve results as text or TOML.

use std::collections::BTreeMap;
use std::fmt;

use afford_core::{
    AffordabilityResult, AffordabilityTier, DownPaymentSummary, SolveMode, TaxBurden, TermOption,
};
use rust_decimal::Decimal;
use serde::Serialize;
use thiserror::Error;

use crate::utils::format_money;

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("TOML serialization failed: {0}")]
    Toml(#[from] toml::ser::Error),
}

/// Output format for a single result.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum ReportFormat {
    #[default]
    Text,
    Toml,
}

impl ReportFormat {
    pub fn render(
        &self,
        result: &AffordabilityResult,
    ) -> Result<String, ReportError> {
        match self {
            Self::Text => Ok(TextReport(result).to_string()),
            Self::Toml => render_toml(result),
        }
    }
}

/// Human-readable breakdown of one result.
pub struct TextReport<'a>(pub &'a AffordabilityResult);

impl fmt::Display for TextReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let r = self.0;
        let heading = match r.mode {
            SolveMode::MaximizeHomePrice => "Maximum home price",
            SolveMode::EvaluateHomePrice => "Home price",
        };

        writeln!(f, "{heading}: {}", format_money(r.home_price))?;
        writeln!(
            f,
            "Down payment: {} ({}%)",
            format_money(r.down_payment.amount),
            r.down_payment.percent
        )?;
        writeln!(f, "Loan amount: {}", format_money(r.loan_amount))?;
        writeln!(
            f,
            "Loan: {} years at {}%",
            r.term_years, r.interest_rate_percent
        )?;

        writeln!(f)?;
        writeln!(f, "Monthly payment")?;
        line(f, "Principal & interest", r.monthly_principal_and_interest)?;
        line(f, "Property tax", r.monthly_property_tax)?;
        line(f, "Insurance", r.monthly_insurance)?;
        line(f, "Mortgage insurance", r.monthly_mortgage_insurance)?;
        line(f, "Total", r.total_monthly_payment)?;

        writeln!(f)?;
        writeln!(f, "Income")?;
        line(f, "Annual gross", r.annual_income)?;
        line(f, "Monthly gross", r.monthly_gross_income)?;
        line(f, "Monthly net", r.monthly_net_income)?;

        writeln!(f)?;
        writeln!(f, "Annual taxes")?;
        let tax = &r.tax_burden;
        line(f, "Federal", tax.federal)?;
        line(f, "Social security", tax.payroll.social_security)?;
        line(f, "Medicare", tax.payroll.medicare)?;
        line(f, "State", tax.state)?;
        line(f, "Local", tax.local)?;
        line(f, "Total", tax.total)?;
        writeln!(
            f,
            "  {:<22}{:>16}",
            "Effective rate",
            format!("{}%", (tax.effective_rate * Decimal::ONE_HUNDRED).normalize())
        )?;

        writeln!(f)?;
        writeln!(
            f,
            "Housing is {}% of gross and {}% of net income; {}% with other debts",
            r.percent_of_gross_income, r.percent_of_net_income, r.back_end_percent
        )?;
        writeln!(f, "Verdict: {} ({})", tier_label(r.tier), r.tier.verdict())?;
        writeln!(
            f,
            "Within standard ratios: {}",
            if r.is_affordable { "yes" } else { "no" }
        )?;

        writeln!(f)?;
        writeln!(
            f,
            "{:>5}  {:>6}  {:>12}  {:>12}  {:>14}  {:>7}  {}",
            "Term", "Rate", "P&I", "Total", "Interest", "% gross", "Tier"
        )?;
        for option in r.per_term.values() {
            writeln!(
                f,
                "{:>5}  {:>6}  {:>12}  {:>12}  {:>14}  {:>7}  {}",
                format!("{}y", option.term_years),
                format!("{}%", option.interest_rate_percent),
                format_money(option.payment),
                format_money(option.total_payment),
                format_money(option.total_interest),
                option.percent_of_gross_income,
                option.tier
            )?;
        }
        Ok(())
    }
}

fn line(
    f: &mut fmt::Formatter<'_>,
    label: &str,
    amount: Decimal,
) -> fmt::Result {
    writeln!(f, "  {label:<22}{:>16}", format_money(amount))
}

fn tier_label(tier: AffordabilityTier) -> &'static str {
    match tier {
        AffordabilityTier::Green => "Green",
        AffordabilityTier::Yellow => "Yellow",
        AffordabilityTier::Red => "Red",
    }
}

/// One line per batch row.
pub fn summary_line(
    label: &str,
    result: &AffordabilityResult,
) -> String {
    format!(
        "{label}: {} {}, {}/month ({}% of gross), {}",
        match result.mode {
            SolveMode::MaximizeHomePrice => "max",
            SolveMode::EvaluateHomePrice => "price",
        },
        format_money(result.home_price),
        format_money(result.total_monthly_payment),
        result.percent_of_gross_income,
        result.tier
    )
}

/// TOML document for one result. Per-term options are keyed `10_year`,
/// `15_year`, `30_year`.
#[derive(Serialize)]
struct TomlReport<'a> {
    mode: SolveMode,
    annual_income: Decimal,
    monthly_gross_income: Decimal,
    monthly_net_income: Decimal,
    home_price: Decimal,
    loan_amount: Decimal,
    interest_rate_percent: Decimal,
    term_years: u32,
    monthly_principal_and_interest: Decimal,
    monthly_property_tax: Decimal,
    monthly_insurance: Decimal,
    monthly_mortgage_insurance: Decimal,
    total_monthly_payment: Decimal,
    property_tax_rate: Decimal,
    percent_of_gross_income: Decimal,
    percent_of_net_income: Decimal,
    back_end_percent: Decimal,
    tier: AffordabilityTier,
    is_affordable: bool,
    down_payment: &'a DownPaymentSummary,
    tax_burden: &'a TaxBurden,
    per_term: BTreeMap<String, &'a TermOption>,
}

pub fn render_toml(result: &AffordabilityResult) -> Result<String, ReportError> {
    let report = TomlReport {
        mode: result.mode,
        annual_income: result.annual_income,
        monthly_gross_income: result.monthly_gross_income,
        monthly_net_income: result.monthly_net_income,
        home_price: result.home_price,
        loan_amount: result.loan_amount,
        interest_rate_percent: result.interest_rate_percent,
        term_years: result.term_years,
        monthly_principal_and_interest: result.monthly_principal_and_interest,
        monthly_property_tax: result.monthly_property_tax,
        monthly_insurance: result.monthly_insurance,
        monthly_mortgage_insurance: result.monthly_mortgage_insurance,
        total_monthly_payment: result.total_monthly_payment,
        property_tax_rate: result.property_tax_rate,
        percent_of_gross_income: result.percent_of_gross_income,
        percent_of_net_income: result.percent_of_net_income,
        back_end_percent: result.back_end_percent,
        tier: result.tier,
        is_affordable: result.is_affordable,
        down_payment: &result.down_payment,
        tax_burden: &result.tax_burden,
        per_term: result
            .per_term
            .iter()
            .map(|(years, option)| (format!("{years}_year"), option))
            .collect(),
    };
    Ok(toml::to_string(&report)?)
}
