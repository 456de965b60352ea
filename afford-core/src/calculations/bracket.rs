//! Marginal-bracket tax computation.
//!
//! A schedule is an ordered list of [`TaxBracket`]s, ascending by
//! `min_income`, starting at zero, contiguous (`brackets[i].max_income ==
//! brackets[i + 1].min_income`), and open-ended at the top. Tax accrues on
//! the slice of income that falls inside each band at that band's rate.
//!
//! # Example
//!
//! ```
//! use rust_decimal_macros::dec;
//! use afford_core::TaxBracket;
//! use afford_core::calculations::BracketTaxCalculator;
//!
//! let brackets = vec![
//!     TaxBracket::new(dec!(0), Some(dec!(11600)), dec!(0.10)),
//!     TaxBracket::new(dec!(11600), Some(dec!(47150)), dec!(0.12)),
//!     TaxBracket::new(dec!(47150), None, dec!(0.22)),
//! ];
//!
//! let calculator = BracketTaxCalculator::new(&brackets);
//!
//! // 1160 + 0.12 × 35550 + 0.22 × 2850
//! assert_eq!(calculator.tax(dec!(50000)), dec!(6053.00));
//! ```

use rust_decimal::Decimal;
use thiserror::Error;

use crate::TaxBracket;

/// Ways a bracket schedule can be malformed.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BracketError {
    #[error("no tax brackets provided")]
    Empty,

    #[error("first bracket must start at 0, starts at {0}")]
    DoesNotStartAtZero(Decimal),

    #[error("bracket {index} starts at {found}, expected {expected}")]
    NotContiguous {
        index: usize,
        expected: Decimal,
        found: Decimal,
    },

    #[error("bracket {0} has no upper bound but is not the last bracket")]
    OpenEndedBeforeLast(usize),

    #[error("last bracket must be open-ended, ends at {0}")]
    NotExhaustive(Decimal),

    #[error("bracket {index} has rate {rate} outside [0, 1]")]
    InvalidRate { index: usize, rate: Decimal },
}

/// Checks that a schedule is non-empty, starts at zero, is contiguous, and
/// ends with an open-ended band.
///
/// [`BracketTaxCalculator`] treats these as preconditions; loaders call this
/// once when the schedule is read.
pub fn validate_brackets(brackets: &[TaxBracket]) -> Result<(), BracketError> {
    let first = brackets.first().ok_or(BracketError::Empty)?;
    if !first.min_income.is_zero() {
        return Err(BracketError::DoesNotStartAtZero(first.min_income));
    }

    for (index, bracket) in brackets.iter().enumerate() {
        if bracket.tax_rate < Decimal::ZERO || bracket.tax_rate > Decimal::ONE {
            return Err(BracketError::InvalidRate {
                index,
                rate: bracket.tax_rate,
            });
        }

        let Some(next) = brackets.get(index + 1) else {
            break;
        };
        let Some(max_income) = bracket.max_income else {
            return Err(BracketError::OpenEndedBeforeLast(index));
        };
        if next.min_income != max_income {
            return Err(BracketError::NotContiguous {
                index: index + 1,
                expected: max_income,
                found: next.min_income,
            });
        }
    }

    match brackets.last().and_then(|b| b.max_income) {
        Some(max_income) => Err(BracketError::NotExhaustive(max_income)),
        None => Ok(()),
    }
}

/// Applies a marginal-bracket schedule to an income.
#[derive(Debug, Clone)]
pub struct BracketTaxCalculator<'a> {
    brackets: &'a [TaxBracket],
}

impl<'a> BracketTaxCalculator<'a> {
    /// Creates a calculator over a schedule that satisfies
    /// [`validate_brackets`].
    pub fn new(brackets: &'a [TaxBracket]) -> Self {
        debug_assert_eq!(validate_brackets(brackets), Ok(()));
        Self { brackets }
    }

    /// Tax owed on `income`, unrounded.
    ///
    /// Continuous and non-decreasing in income; zero or negative income owes
    /// nothing.
    pub fn tax(
        &self,
        income: Decimal,
    ) -> Decimal {
        let mut tax = Decimal::ZERO;

        for bracket in self.brackets {
            if income > bracket.min_income {
                let upper = match bracket.max_income {
                    Some(max_income) => income.min(max_income),
                    None => income,
                };
                tax += (upper - bracket.min_income) * bracket.tax_rate;
            }

            match bracket.max_income {
                Some(max_income) if income > max_income => continue,
                _ => break,
            }
        }

        tax
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    fn federal_2024_single() -> Vec<TaxBracket> {
        vec![
            TaxBracket::new(dec!(0), Some(dec!(11600)), dec!(0.10)),
            TaxBracket::new(dec!(11600), Some(dec!(47150)), dec!(0.12)),
            TaxBracket::new(dec!(47150), Some(dec!(100525)), dec!(0.22)),
            TaxBracket::new(dec!(100525), Some(dec!(191950)), dec!(0.24)),
            TaxBracket::new(dec!(191950), Some(dec!(243725)), dec!(0.32)),
            TaxBracket::new(dec!(243725), Some(dec!(609350)), dec!(0.35)),
            TaxBracket::new(dec!(609350), None, dec!(0.37)),
        ]
    }

    // =========================================================================
    // tax tests
    // =========================================================================

    #[test]
    fn tax_zero_income_owes_nothing() {
        let brackets = federal_2024_single();
        let calculator = BracketTaxCalculator::new(&brackets);

        assert_eq!(calculator.tax(Decimal::ZERO), Decimal::ZERO);
    }

    #[test]
    fn tax_first_bracket() {
        let brackets = federal_2024_single();
        let calculator = BracketTaxCalculator::new(&brackets);

        assert_eq!(calculator.tax(dec!(10000)), dec!(1000));
    }

    #[test]
    fn tax_at_boundary_equals_sum_of_full_lower_brackets() {
        let brackets = federal_2024_single();
        let calculator = BracketTaxCalculator::new(&brackets);

        // 1160 + 0.12 × 35550
        assert_eq!(calculator.tax(dec!(47150)), dec!(5426));
    }

    #[test]
    fn tax_just_above_boundary_adds_next_rate() {
        let brackets = federal_2024_single();
        let calculator = BracketTaxCalculator::new(&brackets);

        assert_eq!(calculator.tax(dec!(47151)), dec!(5426.22));
    }

    #[test]
    fn tax_120k_matches_hand_computation() {
        let brackets = federal_2024_single();
        let calculator = BracketTaxCalculator::new(&brackets);

        // 10%×11600 + 12%×(47150-11600) + 22%×(100525-47150) + 24%×(120000-100525)
        let expected = dec!(1160) + dec!(4266) + dec!(11742.50) + dec!(4674);
        assert_eq!(calculator.tax(dec!(120000)), expected);
        assert_eq!(expected, dec!(21842.50));
    }

    #[test]
    fn tax_top_bracket_is_open_ended() {
        let brackets = federal_2024_single();
        let calculator = BracketTaxCalculator::new(&brackets);

        // Sum of full lower bands up to 609350 = 183647.25
        assert_eq!(calculator.tax(dec!(609350)), dec!(183647.25));
        assert_eq!(calculator.tax(dec!(709350)), dec!(220647.25));
    }

    #[test]
    fn tax_is_non_decreasing_across_boundaries() {
        let brackets = federal_2024_single();
        let calculator = BracketTaxCalculator::new(&brackets);

        let mut previous = Decimal::ZERO;
        let mut income = Decimal::ZERO;
        while income <= dec!(700000) {
            let tax = calculator.tax(income);
            assert!(tax >= previous, "tax decreased at income {income}");
            previous = tax;
            income += dec!(2500);
        }
    }

    #[test]
    fn tax_is_continuous_at_each_boundary() {
        let brackets = federal_2024_single();
        let calculator = BracketTaxCalculator::new(&brackets);

        for bracket in &brackets {
            let Some(boundary) = bracket.max_income else {
                continue;
            };
            let below = calculator.tax(boundary - dec!(0.01));
            let at = calculator.tax(boundary);
            assert!(at - below <= dec!(0.01), "jump at {boundary}");
        }
    }

    // =========================================================================
    // validate_brackets tests
    // =========================================================================

    #[test]
    fn validate_accepts_federal_schedule() {
        assert_eq!(validate_brackets(&federal_2024_single()), Ok(()));
    }

    #[test]
    fn validate_rejects_empty_schedule() {
        assert_eq!(validate_brackets(&[]), Err(BracketError::Empty));
    }

    #[test]
    fn validate_rejects_nonzero_start() {
        let brackets = vec![TaxBracket::new(dec!(100), None, dec!(0.10))];

        assert_eq!(
            validate_brackets(&brackets),
            Err(BracketError::DoesNotStartAtZero(dec!(100)))
        );
    }

    #[test]
    fn validate_rejects_gap_between_brackets() {
        let brackets = vec![
            TaxBracket::new(dec!(0), Some(dec!(10000)), dec!(0.10)),
            TaxBracket::new(dec!(12000), None, dec!(0.12)),
        ];

        assert_eq!(
            validate_brackets(&brackets),
            Err(BracketError::NotContiguous {
                index: 1,
                expected: dec!(10000),
                found: dec!(12000),
            })
        );
    }

    #[test]
    fn validate_rejects_closed_top_bracket() {
        let brackets = vec![TaxBracket::new(dec!(0), Some(dec!(10000)), dec!(0.10))];

        assert_eq!(
            validate_brackets(&brackets),
            Err(BracketError::NotExhaustive(dec!(10000)))
        );
    }

    #[test]
    fn validate_rejects_open_ended_middle_bracket() {
        let brackets = vec![
            TaxBracket::new(dec!(0), None, dec!(0.10)),
            TaxBracket::new(dec!(10000), None, dec!(0.12)),
        ];

        assert_eq!(
            validate_brackets(&brackets),
            Err(BracketError::OpenEndedBeforeLast(0))
        );
    }

    #[test]
    fn validate_rejects_rate_above_one() {
        let brackets = vec![TaxBracket::new(dec!(0), None, dec!(1.5))];

        assert_eq!(
            validate_brackets(&brackets),
            Err(BracketError::InvalidRate {
                index: 0,
                rate: dec!(1.5),
            })
        );
    }
}
