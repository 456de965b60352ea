//! Household input as typed, and its validation.
//!
//! Every field is checked and every problem is reported together, so the
//! solver only ever sees well-formed numbers.
//!
//! | Field | Empty means |
//! |-------|-------------|
//! | `income` | required unless `take_home` is set |
//! | `frequency` | `annual` |
//! | `take_home` | gross income mode |
//! | `home_price` | maximize mode |
//! | `down_payment_percent` / `down_payment_amount` | 20% down |
//! | `term_years` | 30 |
//! | `interest_rate` | the term's default rate |
//! | `monthly_debts` | 0 |
//! | `county` / `property_tax_rate` | the default property-tax rate |
//! | `insurance` | the policy's default premium, unless `exclude_insurance` |
//!
//! Income, take-home pay and a given home price must be above zero. Every
//! amount is capped at [`MAX_AMOUNT`].

use std::fmt;

use afford_core::{
    AffordabilityPolicy, AffordabilityRequest, DownPayment, FinancialExtras, IncomeInput,
    IncomeSpec, Jurisdiction, LoanTerm, LoanTerms, PayFrequency, PropertyTaxSelection, UsState,
};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use thiserror::Error;

use crate::utils::parse_optional_decimal;

const DEFAULT_DOWN_PAYMENT_PERCENT: Decimal = dec!(20);

/// Largest dollar amount any field accepts.
pub const MAX_AMOUNT: Decimal = dec!(1000000000000);

/// One rejected field.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{field} is required")]
    Required { field: &'static str },

    #[error("{field}: '{input}' is not a number")]
    NotANumber { field: &'static str, input: String },

    #[error("{field} must not be negative, got {value}")]
    Negative { field: &'static str, value: Decimal },

    #[error("{field} must be greater than 0, got {value}")]
    NotPositive { field: &'static str, value: Decimal },

    #[error("{field} must be at most {max}, got {value}")]
    TooLarge {
        field: &'static str,
        value: Decimal,
        max: Decimal,
    },

    #[error("{field} must be between 0 and 100, got {value}")]
    PercentOutOfRange { field: &'static str, value: Decimal },

    #[error("unknown state '{0}'")]
    UnknownState(String),

    #[error("unknown pay frequency '{0}' (expected hourly, weekly, biweekly, monthly, or annual)")]
    UnknownFrequency(String),

    #[error("unsupported loan term '{0}' (expected 10, 15, or 30)")]
    UnsupportedTerm(String),

    #[error("give either {first} or {second}, not both")]
    Conflicting {
        first: &'static str,
        second: &'static str,
    },
}

/// Every problem found in one form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationErrors(pub Vec<ValidationError>);

impl std::error::Error for ValidationErrors {}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, error) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{error}")?;
        }
        Ok(())
    }
}

/// Household inputs as strings, the way a user types them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HouseholdForm {
    pub income: String,
    pub frequency: String,
    /// Monthly take-home pay; when set, gross income is estimated from it.
    pub take_home: String,
    pub state: String,
    pub subdivision: String,
    pub home_price: String,
    pub down_payment_percent: String,
    pub down_payment_amount: String,
    pub term_years: String,
    pub interest_rate: String,
    pub monthly_debts: String,
    pub fha: bool,
    pub county: String,
    /// Custom annual property-tax rate, in percent.
    pub property_tax_rate: String,
    pub exclude_property_tax: bool,
    /// Annual premium.
    pub insurance: String,
    pub exclude_insurance: bool,
}

/// A validated household: the solver request and, in evaluate mode, the
/// home price to evaluate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Household {
    pub request: AffordabilityRequest,
    pub home_price: Option<Decimal>,
}

impl HouseholdForm {
    /// Checks every field and builds the solver request.
    ///
    /// `policy` supplies the insurance premium used when no amount is
    /// given.
    pub fn validate(
        &self,
        policy: &AffordabilityPolicy,
    ) -> Result<Household, ValidationErrors> {
        let mut check = Checker::default();

        let income = self.income_input(&mut check);
        let state = match self.state.trim() {
            "" => {
                check.fail(ValidationError::Required { field: "state" });
                None
            }
            name => UsState::parse(name).or_else(|| {
                check.fail(ValidationError::UnknownState(name.to_string()));
                None
            }),
        };
        let home_price = check.positive("home price", &self.home_price);
        let down_payment = self.down_payment(&mut check);
        let term = match self.term_years.trim() {
            "" => Some(LoanTerm::ThirtyYear),
            years => years.parse().ok().and_then(LoanTerm::from_years).or_else(|| {
                check.fail(ValidationError::UnsupportedTerm(years.to_string()));
                None
            }),
        };
        let interest_rate = check.percent("interest rate", &self.interest_rate);
        let monthly_debts = check.amount("monthly debts", &self.monthly_debts);
        let custom_rate = check.percent("property tax rate", &self.property_tax_rate);
        let insurance = check.amount("insurance", &self.insurance);

        let (Some(income), Some(state), Some(down_payment), Some(term)) =
            (income, state, down_payment, term)
        else {
            return Err(ValidationErrors(check.errors));
        };
        if !check.errors.is_empty() {
            return Err(ValidationErrors(check.errors));
        }

        let jurisdiction = match self.subdivision.trim() {
            "" => Jurisdiction::state(state),
            subdivision => Jurisdiction::with_subdivision(state, subdivision),
        };
        let property_tax = (!self.exclude_property_tax).then(|| PropertyTaxSelection {
            county: match self.county.trim() {
                "" => None,
                county => Some((state, county.to_string())),
            },
            custom_rate_percent: custom_rate,
        });
        let home_insurance_annual = (!self.exclude_insurance)
            .then(|| insurance.unwrap_or(policy.default_annual_insurance));

        Ok(Household {
            request: AffordabilityRequest {
                income,
                jurisdiction,
                loan: LoanTerms {
                    down_payment,
                    interest_rate_percent: interest_rate,
                    term,
                },
                extras: FinancialExtras {
                    monthly_debts: monthly_debts.unwrap_or(Decimal::ZERO),
                    property_tax,
                    home_insurance_annual,
                    fha_loan: self.fha,
                },
            },
            home_price,
        })
    }

    fn income_input(
        &self,
        check: &mut Checker,
    ) -> Option<IncomeInput> {
        let has_income = !self.income.trim().is_empty();
        let has_take_home = !self.take_home.trim().is_empty();

        if has_income && has_take_home {
            check.fail(ValidationError::Conflicting {
                first: "income",
                second: "take-home pay",
            });
            return None;
        }
        if has_take_home {
            let monthly = check.positive("take-home pay", &self.take_home)?;
            return Some(IncomeInput::TakeHome { monthly });
        }
        if !has_income {
            check.fail(ValidationError::Required { field: "income" });
            return None;
        }

        let frequency = match self.frequency.trim() {
            "" => Some(PayFrequency::Annual),
            name => PayFrequency::parse(name).or_else(|| {
                check.fail(ValidationError::UnknownFrequency(name.to_string()));
                None
            }),
        };
        let amount = check.positive("income", &self.income);
        Some(IncomeInput::Gross(IncomeSpec::new(amount?, frequency?)))
    }

    fn down_payment(
        &self,
        check: &mut Checker,
    ) -> Option<DownPayment> {
        let percent = check.percent("down payment percent", &self.down_payment_percent);
        let amount = check.amount("down payment amount", &self.down_payment_amount);

        match (percent, amount) {
            (Some(_), Some(_)) => {
                check.fail(ValidationError::Conflicting {
                    first: "down payment percent",
                    second: "down payment amount",
                });
                None
            }
            (Some(percent), None) => Some(DownPayment::Percent(percent)),
            (None, Some(amount)) => Some(DownPayment::Amount(amount)),
            (None, None) => {
                let failed = !self.down_payment_percent.trim().is_empty()
                    || !self.down_payment_amount.trim().is_empty();
                (!failed).then_some(DownPayment::Percent(DEFAULT_DOWN_PAYMENT_PERCENT))
            }
        }
    }
}

#[derive(Default)]
struct Checker {
    errors: Vec<ValidationError>,
}

impl Checker {
    fn fail(
        &mut self,
        error: ValidationError,
    ) {
        self.errors.push(error);
    }

    fn number(
        &mut self,
        field: &'static str,
        input: &str,
    ) -> Option<Decimal> {
        match parse_optional_decimal(input) {
            Ok(value) => value,
            Err(err) => {
                self.fail(ValidationError::NotANumber {
                    field,
                    input: err.input,
                });
                None
            }
        }
    }

    /// A non-negative amount up to [`MAX_AMOUNT`], or `None` when empty or
    /// rejected.
    fn amount(
        &mut self,
        field: &'static str,
        input: &str,
    ) -> Option<Decimal> {
        let value = self.number(field, input)?;
        if value < Decimal::ZERO {
            self.fail(ValidationError::Negative { field, value });
            return None;
        }
        if value > MAX_AMOUNT {
            self.fail(ValidationError::TooLarge {
                field,
                value,
                max: MAX_AMOUNT,
            });
            return None;
        }
        Some(value)
    }

    /// Like [`amount`](Self::amount), but zero is rejected too.
    fn positive(
        &mut self,
        field: &'static str,
        input: &str,
    ) -> Option<Decimal> {
        let value = self.amount(field, input)?;
        if value.is_zero() {
            self.fail(ValidationError::NotPositive { field, value });
            return None;
        }
        Some(value)
    }

    /// A percent in [0, 100], or `None` when empty or rejected.
    fn percent(
        &mut self,
        field: &'static str,
        input: &str,
    ) -> Option<Decimal> {
        let value = self.number(field, input)?;
        if value < Decimal::ZERO || value > Decimal::ONE_HUNDRED {
            self.fail(ValidationError::PercentOutOfRange { field, value });
            return None;
        }
        Some(value)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn form() -> HouseholdForm {
        HouseholdForm {
            income: "120,000".to_string(),
            state: "Texas".to_string(),
            ..HouseholdForm::default()
        }
    }

    fn errors(form: &HouseholdForm) -> Vec<ValidationError> {
        form.validate(&AffordabilityPolicy::default())
            .expect_err("form should be rejected")
            .0
    }

    // =========================================================================
    // Defaults
    // =========================================================================

    #[test]
    fn validate_minimal_form_fills_defaults() {
        let household = form().validate(&AffordabilityPolicy::default()).unwrap();
        let request = household.request;

        assert_eq!(
            request.income,
            IncomeInput::Gross(IncomeSpec::annual(dec!(120000)))
        );
        assert_eq!(request.jurisdiction, Jurisdiction::state(UsState::Texas));
        assert_eq!(request.loan.down_payment, DownPayment::Percent(dec!(20)));
        assert_eq!(request.loan.term, LoanTerm::ThirtyYear);
        assert_eq!(request.loan.interest_rate_percent, None);
        assert_eq!(
            request.extras,
            FinancialExtras {
                home_insurance_annual: Some(dec!(1200)),
                ..FinancialExtras::default()
            }
        );
        assert_eq!(household.home_price, None);
    }

    #[test]
    fn validate_reads_every_field() {
        let form = HouseholdForm {
            income: "45".to_string(),
            frequency: "hourly".to_string(),
            state: "NY".to_string(),
            subdivision: "Yonkers".to_string(),
            home_price: "$400,000".to_string(),
            down_payment_amount: "40000".to_string(),
            term_years: "15".to_string(),
            interest_rate: "5.75".to_string(),
            monthly_debts: "450".to_string(),
            fha: true,
            county: "Westchester".to_string(),
            insurance: "1800".to_string(),
            ..HouseholdForm::default()
        };

        let household = form.validate(&AffordabilityPolicy::default()).unwrap();
        let request = household.request;

        assert_eq!(
            request.income,
            IncomeInput::Gross(IncomeSpec::new(dec!(45), PayFrequency::Hourly))
        );
        assert_eq!(
            request.jurisdiction,
            Jurisdiction::with_subdivision(UsState::NewYork, "Yonkers")
        );
        assert_eq!(household.home_price, Some(dec!(400000)));
        assert_eq!(request.loan.down_payment, DownPayment::Amount(dec!(40000)));
        assert_eq!(request.loan.term, LoanTerm::FifteenYear);
        assert_eq!(request.loan.interest_rate_percent, Some(dec!(5.75)));
        assert_eq!(request.extras.monthly_debts, dec!(450));
        assert!(request.extras.fha_loan);
        assert_eq!(
            request.extras.property_tax,
            Some(PropertyTaxSelection {
                county: Some((UsState::NewYork, "Westchester".to_string())),
                custom_rate_percent: None,
            })
        );
        assert_eq!(request.extras.home_insurance_annual, Some(dec!(1800)));
    }

    #[test]
    fn validate_take_home_mode() {
        let form = HouseholdForm {
            income: String::new(),
            take_home: "5,000".to_string(),
            ..form()
        };

        let request = form.validate(&AffordabilityPolicy::default()).unwrap().request;

        assert_eq!(request.income, IncomeInput::TakeHome { monthly: dec!(5000) });
    }

    #[test]
    fn validate_insurance_defaults_to_policy_premium() {
        let form = form();
        let policy = AffordabilityPolicy {
            default_annual_insurance: dec!(1500),
            ..AffordabilityPolicy::default()
        };

        let request = form.validate(&policy).unwrap().request;

        assert_eq!(request.extras.home_insurance_annual, Some(dec!(1500)));
    }

    #[test]
    fn validate_excluded_insurance() {
        let form = HouseholdForm {
            exclude_insurance: true,
            insurance: "1800".to_string(),
            ..form()
        };

        let request = form.validate(&AffordabilityPolicy::default()).unwrap().request;

        assert_eq!(request.extras.home_insurance_annual, None);
    }

    #[test]
    fn validate_excluded_property_tax() {
        let form = HouseholdForm {
            exclude_property_tax: true,
            ..form()
        };

        let request = form.validate(&AffordabilityPolicy::default()).unwrap().request;

        assert_eq!(request.extras.property_tax, None);
    }

    // =========================================================================
    // Rejections
    // =========================================================================

    #[test]
    fn validate_collects_every_error() {
        let form = HouseholdForm {
            income: "lots".to_string(),
            state: "Atlantis".to_string(),
            down_payment_percent: "120".to_string(),
            term_years: "20".to_string(),
            monthly_debts: "-5".to_string(),
            ..HouseholdForm::default()
        };

        assert_eq!(
            errors(&form),
            vec![
                ValidationError::NotANumber {
                    field: "income",
                    input: "lots".to_string(),
                },
                ValidationError::UnknownState("Atlantis".to_string()),
                ValidationError::PercentOutOfRange {
                    field: "down payment percent",
                    value: dec!(120),
                },
                ValidationError::UnsupportedTerm("20".to_string()),
                ValidationError::Negative {
                    field: "monthly debts",
                    value: dec!(-5),
                },
            ]
        );
    }

    #[test]
    fn validate_requires_income_and_state() {
        assert_eq!(
            errors(&HouseholdForm::default()),
            vec![
                ValidationError::Required { field: "income" },
                ValidationError::Required { field: "state" },
            ]
        );
    }

    #[test]
    fn validate_rejects_both_down_payment_forms() {
        let form = HouseholdForm {
            down_payment_percent: "10".to_string(),
            down_payment_amount: "40000".to_string(),
            ..form()
        };

        assert_eq!(
            errors(&form),
            vec![ValidationError::Conflicting {
                first: "down payment percent",
                second: "down payment amount",
            }]
        );
    }

    #[test]
    fn validate_rejects_income_and_take_home_together() {
        let form = HouseholdForm {
            take_home: "5000".to_string(),
            ..form()
        };

        assert_eq!(
            errors(&form),
            vec![ValidationError::Conflicting {
                first: "income",
                second: "take-home pay",
            }]
        );
    }

    #[test]
    fn validate_rejects_zero_income() {
        let form = HouseholdForm {
            income: "0".to_string(),
            home_price: "400000".to_string(),
            ..form()
        };

        assert_eq!(
            errors(&form),
            vec![ValidationError::NotPositive {
                field: "income",
                value: Decimal::ZERO,
            }]
        );
    }

    #[test]
    fn validate_rejects_zero_take_home() {
        let form = HouseholdForm {
            income: String::new(),
            take_home: "0".to_string(),
            ..form()
        };

        assert_eq!(
            errors(&form),
            vec![ValidationError::NotPositive {
                field: "take-home pay",
                value: Decimal::ZERO,
            }]
        );
    }

    #[test]
    fn validate_rejects_zero_home_price() {
        let form = HouseholdForm {
            home_price: "0".to_string(),
            ..form()
        };

        assert_eq!(
            errors(&form),
            vec![ValidationError::NotPositive {
                field: "home price",
                value: Decimal::ZERO,
            }]
        );
    }

    #[test]
    fn validate_rejects_amounts_near_decimal_max() {
        let form = HouseholdForm {
            income: "79228162514264337593543950".to_string(),
            frequency: "hourly".to_string(),
            home_price: "79228162514264337593543950335".to_string(),
            ..form()
        };

        assert_eq!(
            errors(&form),
            vec![
                ValidationError::TooLarge {
                    field: "income",
                    value: dec!(79228162514264337593543950),
                    max: MAX_AMOUNT,
                },
                ValidationError::TooLarge {
                    field: "home price",
                    value: Decimal::MAX,
                    max: MAX_AMOUNT,
                },
            ]
        );
    }

    #[test]
    fn validate_accepts_amount_at_cap() {
        let form = HouseholdForm {
            home_price: "1,000,000,000,000".to_string(),
            ..form()
        };

        let household = form.validate(&AffordabilityPolicy::default()).unwrap();

        assert_eq!(household.home_price, Some(MAX_AMOUNT));
    }

    #[test]
    fn validate_rejects_unknown_frequency() {
        let form = HouseholdForm {
            frequency: "daily".to_string(),
            ..form()
        };

        assert_eq!(
            errors(&form),
            vec![ValidationError::UnknownFrequency("daily".to_string())]
        );
    }

    #[test]
    fn validation_errors_display_joins_messages() {
        let errors = ValidationErrors(vec![
            ValidationError::Required { field: "income" },
            ValidationError::UnknownState("Atlantis".to_string()),
        ]);

        assert_eq!(
            errors.to_string(),
            "income is required; unknown state 'Atlantis'"
        );
    }
}
