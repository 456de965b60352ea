//! Home affordability: the maximum price a household can carry, or how a
//! given price sits against its income.
//!
//! Both modes share income normalization and the tax burden. The housing
//! payment is measured against two standard debt-to-income limits:
//!
//! | Ratio | Numerator | Limit |
//! |-------|-----------|-------|
//! | front-end | housing payment | 28% of gross |
//! | back-end | housing payment + other debts | 36% of gross |
//!
//! # Maximize mode
//!
//! Property tax, insurance, and mortgage insurance depend on the home price
//! being solved for. The solver sizes them first on a placeholder value,
//! inverts the amortization formula on what remains of the payment cap, then
//! recomputes the add-ons on the resulting price. This is a fixed-point
//! approximation; [`AffordabilityPolicy::refinement_passes`] repeats the
//! correction step to move closer to the fixed point.
//!
//! # Example
//!
//! ```
//! use rust_decimal_macros::dec;
//! use afford_core::calculations::{AffordabilityRequest, AffordabilitySolver, StrategyRegistry};
//! use afford_core::data::RateTables;
//! use afford_core::{
//!     AffordabilityTier, DownPayment, FinancialExtras, IncomeInput, IncomeSpec, Jurisdiction,
//!     LoanTerm, LoanTerms, UsState,
//! };
//!
//! let tables = RateTables::tax_year_2024();
//! let strategies = StrategyRegistry::with_builtin_strategies(&tables);
//! let solver = AffordabilitySolver::new(&tables, &strategies);
//!
//! let request = AffordabilityRequest {
//!     income: IncomeInput::Gross(IncomeSpec::annual(dec!(120000))),
//!     jurisdiction: Jurisdiction::state(UsState::Texas),
//!     loan: LoanTerms {
//!         down_payment: DownPayment::Amount(dec!(40000)),
//!         interest_rate_percent: Some(dec!(6.5)),
//!         term: LoanTerm::ThirtyYear,
//!     },
//!     extras: FinancialExtras::default(),
//! };
//!
//! let result = solver.evaluate_home_price(dec!(400000), &request);
//!
//! assert_eq!(result.loan_amount, dec!(360000));
//! assert_eq!(result.monthly_principal_and_interest, dec!(2275.44));
//! assert_eq!(result.tier, AffordabilityTier::Red);
//! ```

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use thiserror::Error;
use tracing::{debug, info, warn};

use super::common::{max, percent_of, ratio, round_half_up};
use super::{MortgagePaymentModel, StrategyRegistry, TaxBurdenAggregator};
use crate::data::RateSource;
use crate::{
    AffordabilityPolicy, AffordabilityResult, AffordabilityTier, DownPayment, DownPaymentSummary,
    FinancialExtras, IncomeInput, Jurisdiction, JurisdictionKind, LoanTerm, LoanTerms, SolveMode,
    TaxBurden, TermOption, UsState,
};

/// The solver's only failure.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AffordabilityError {
    #[error(
        "income leaves no room for a mortgage: the maximum housing payment of \
         ${max_housing_payment}/month does not cover estimated property tax, \
         insurance, and mortgage insurance of ${estimated_add_ons}/month"
    )]
    InsufficientIncome {
        max_housing_payment: Decimal,
        estimated_add_ons: Decimal,
    },
}

/// One household's inputs, as an immutable snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AffordabilityRequest {
    pub income: IncomeInput,
    pub jurisdiction: Jurisdiction,
    pub loan: LoanTerms,
    pub extras: FinancialExtras,
}

/// Gross and net income for one solve.
#[derive(Debug, Clone)]
struct IncomeSnapshot {
    annual: Decimal,
    monthly_gross: Decimal,
    monthly_net: Decimal,
    tax_burden: TaxBurden,
}

impl IncomeSnapshot {
    /// True when there is a payment but no gross income to measure it
    /// against; the percent guards would otherwise report 0%.
    fn is_unfunded(
        &self,
        payment: Decimal,
    ) -> bool {
        self.monthly_gross <= Decimal::ZERO && payment > Decimal::ZERO
    }
}

/// Monthly housing costs on top of principal and interest.
#[derive(Debug, Clone, Copy, Default)]
struct AddOns {
    property_tax: Decimal,
    insurance: Decimal,
    mortgage_insurance: Decimal,
}

impl AddOns {
    fn total(&self) -> Decimal {
        self.property_tax + self.insurance + self.mortgage_insurance
    }
}

/// Solves and evaluates home prices against a [`RateSource`].
pub struct AffordabilitySolver<'a> {
    source: &'a dyn RateSource,
    burden: TaxBurdenAggregator<'a>,
    policy: AffordabilityPolicy,
}

impl<'a> AffordabilitySolver<'a> {
    pub fn new(
        source: &'a dyn RateSource,
        strategies: &'a StrategyRegistry,
    ) -> Self {
        Self {
            source,
            burden: TaxBurdenAggregator::new(source, strategies),
            policy: AffordabilityPolicy::default(),
        }
    }

    pub fn with_policy(
        mut self,
        policy: AffordabilityPolicy,
    ) -> Self {
        self.policy = policy;
        self
    }

    pub fn policy(&self) -> &AffordabilityPolicy {
        &self.policy
    }

    /// Largest home price whose housing payment fits within the front-end
    /// cap (and the back-end cap when there are other debts).
    ///
    /// # Errors
    /// * [`AffordabilityError::InsufficientIncome`] when the payment cap does
    ///   not cover the estimated add-ons.
    pub fn compute_max_affordability(
        &self,
        request: &AffordabilityRequest,
    ) -> Result<AffordabilityResult, AffordabilityError> {
        let income = self.normalize_income(&request.income, &request.jurisdiction);
        let extras = &request.extras;
        let down_payment = self.effective_down_payment(&request.loan, extras);
        let property_tax_rate = self.property_tax_rate(extras);
        let interest_rate = self.interest_rate(&request.loan);
        let model = MortgagePaymentModel::new(interest_rate, request.loan.term.years());

        let max_housing_payment = self.max_housing_payment(income.monthly_gross, extras);
        let estimated_add_ons = self
            .add_ons(self.policy.placeholder_home_value, property_tax_rate, extras)
            .total();
        let max_principal_and_interest = max_housing_payment - estimated_add_ons;

        debug!(
            monthly_gross = %income.monthly_gross,
            %max_housing_payment,
            %estimated_add_ons,
            %max_principal_and_interest,
            "payment capacity"
        );

        if max_principal_and_interest <= Decimal::ZERO {
            return Err(AffordabilityError::InsufficientIncome {
                max_housing_payment: round_half_up(max_housing_payment),
                estimated_add_ons: round_half_up(estimated_add_ons),
            });
        }

        let mut home_price =
            self.price_for_payment(max_principal_and_interest, &model, &down_payment);
        for pass in 0..self.policy.refinement_passes {
            let add_ons = self.add_ons(home_price, property_tax_rate, extras).total();
            let capacity = max(max_housing_payment - add_ons, Decimal::ZERO);
            home_price = self.price_for_payment(capacity, &model, &down_payment);
            debug!(pass, %home_price, "refined home price");
        }

        let result = self.build_result(
            SolveMode::MaximizeHomePrice,
            home_price,
            &income,
            request,
            &down_payment,
            property_tax_rate,
            interest_rate,
        );
        info!(
            home_price = %result.home_price,
            tier = %result.tier,
            "maximum affordable home price solved"
        );
        Ok(result)
    }

    /// Payment breakdown and ratios for a known `home_price`.
    pub fn evaluate_home_price(
        &self,
        home_price: Decimal,
        request: &AffordabilityRequest,
    ) -> AffordabilityResult {
        let income = self.normalize_income(&request.income, &request.jurisdiction);
        let down_payment = self.effective_down_payment(&request.loan, &request.extras);
        let property_tax_rate = self.property_tax_rate(&request.extras);
        let interest_rate = self.interest_rate(&request.loan);

        let result = self.build_result(
            SolveMode::EvaluateHomePrice,
            max(home_price, Decimal::ZERO),
            &income,
            request,
            &down_payment,
            property_tax_rate,
            interest_rate,
        );
        info!(
            home_price = %result.home_price,
            tier = %result.tier,
            is_affordable = result.is_affordable,
            "home price evaluated"
        );
        result
    }

    /// Local-tax subdivisions of `state`, for a selection list.
    pub fn jurisdictions_for(
        &self,
        state: UsState,
    ) -> Vec<&'a str> {
        self.burden.resolver().jurisdictions_for(state)
    }

    pub fn jurisdiction_kind(
        &self,
        state: UsState,
    ) -> Option<JurisdictionKind> {
        self.burden.resolver().jurisdiction_kind(state)
    }

    /// Counties of `state` with a property-tax rate.
    pub fn counties_for(
        &self,
        state: UsState,
    ) -> Vec<&'a str> {
        self.source.property_tax_counties(state)
    }

    /// Tier for a housing payment that is `percent_of_gross` percent of gross
    /// monthly income. Each tier's upper bound is inclusive.
    pub fn classify_tier(
        &self,
        percent_of_gross: Decimal,
        has_debts: bool,
    ) -> AffordabilityTier {
        let (green, yellow) = if has_debts {
            (self.policy.back_end_ratio, self.policy.back_end_yellow_ratio)
        } else {
            (self.policy.front_end_ratio, self.policy.front_end_yellow_ratio)
        };

        if percent_of_gross <= green * Decimal::ONE_HUNDRED {
            AffordabilityTier::Green
        } else if percent_of_gross <= yellow * Decimal::ONE_HUNDRED {
            AffordabilityTier::Yellow
        } else {
            AffordabilityTier::Red
        }
    }

    fn normalize_income(
        &self,
        income: &IncomeInput,
        jurisdiction: &Jurisdiction,
    ) -> IncomeSnapshot {
        let twelve = Decimal::from(12);
        match income {
            IncomeInput::Gross(spec) => {
                let annual = max(spec.annualize(), Decimal::ZERO);
                let tax_burden = self.burden.total_burden(annual, jurisdiction);
                IncomeSnapshot {
                    annual,
                    monthly_gross: annual / twelve,
                    // Fixed local taxes can exceed a very small income.
                    monthly_net: max((annual - tax_burden.total) / twelve, Decimal::ZERO),
                    tax_burden,
                }
            }
            IncomeInput::TakeHome { monthly } => {
                let monthly_net = max(*monthly, Decimal::ZERO);
                let monthly_gross = monthly_net * self.policy.take_home_gross_up;
                IncomeSnapshot {
                    annual: monthly_gross * twelve,
                    monthly_gross,
                    monthly_net,
                    tax_burden: TaxBurden::default(),
                }
            }
        }
    }

    /// `min(front-end cap, back-end cap − debts)`; the back-end cap only
    /// binds when there are other debts.
    fn max_housing_payment(
        &self,
        monthly_gross: Decimal,
        extras: &FinancialExtras,
    ) -> Decimal {
        let front_end = monthly_gross * self.policy.front_end_ratio;
        if !extras.has_debts() {
            return front_end;
        }
        let back_end = monthly_gross * self.policy.back_end_ratio - extras.monthly_debts;
        front_end.min(back_end)
    }

    /// FHA loans force the minimum percent down in percent mode.
    fn effective_down_payment(
        &self,
        loan: &LoanTerms,
        extras: &FinancialExtras,
    ) -> DownPayment {
        match &loan.down_payment {
            DownPayment::Percent(_) if extras.fha_loan => {
                DownPayment::Percent(self.policy.fha_down_payment_percent)
            }
            other => other.clone(),
        }
    }

    fn interest_rate(
        &self,
        loan: &LoanTerms,
    ) -> Decimal {
        loan.interest_rate_percent
            .unwrap_or_else(|| self.source.default_interest_rate(loan.term))
    }

    /// Annual property-tax rate as a fraction: the selected county's rate,
    /// else the custom rate, else the table default. Zero when excluded.
    fn property_tax_rate(
        &self,
        extras: &FinancialExtras,
    ) -> Decimal {
        let Some(selection) = &extras.property_tax else {
            return Decimal::ZERO;
        };

        if let Some((state, county)) = &selection.county {
            match self.source.property_tax_rate(*state, county) {
                Some(rate) => return rate,
                None => {
                    warn!(%state, county = %county, "unknown property-tax county; falling back")
                }
            }
        }

        match selection.custom_rate_percent {
            Some(percent) => percent / Decimal::ONE_HUNDRED,
            None => self.source.default_property_tax_rate(),
        }
    }

    fn add_ons(
        &self,
        home_price: Decimal,
        property_tax_rate: Decimal,
        extras: &FinancialExtras,
    ) -> AddOns {
        let twelve = Decimal::from(12);
        AddOns {
            property_tax: home_price * property_tax_rate / twelve,
            insurance: extras.home_insurance_annual.unwrap_or(Decimal::ZERO) / twelve,
            mortgage_insurance: if extras.fha_loan {
                home_price * self.policy.fha_mip_rate / twelve
            } else {
                Decimal::ZERO
            },
        }
    }

    /// Home price whose loan is paid off by `payment` per month.
    ///
    /// In percent mode the loan is itself a share of the price, so the price
    /// is `principal / (1 − pct/100)`; 100% down has no finite answer and
    /// yields 0.
    fn price_for_payment(
        &self,
        payment: Decimal,
        model: &MortgagePaymentModel,
        down_payment: &DownPayment,
    ) -> Decimal {
        let principal = model.max_principal(payment);
        match down_payment {
            DownPayment::Percent(percent) => {
                let financed = Decimal::ONE - percent / Decimal::ONE_HUNDRED;
                if financed <= Decimal::ZERO {
                    warn!(%percent, "down payment covers the whole price; home price is zero");
                    return Decimal::ZERO;
                }
                ratio(principal, financed)
            }
            DownPayment::Amount(amount) => principal + amount,
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn build_result(
        &self,
        mode: SolveMode,
        home_price: Decimal,
        income: &IncomeSnapshot,
        request: &AffordabilityRequest,
        down_payment: &DownPayment,
        property_tax_rate: Decimal,
        interest_rate: Decimal,
    ) -> AffordabilityResult {
        let extras = &request.extras;
        let has_debts = extras.has_debts();
        let term_years = request.loan.term.years();

        let summary = down_payment.resolve(home_price);
        let loan_amount = max(home_price - summary.amount, Decimal::ZERO);
        let model = MortgagePaymentModel::new(interest_rate, term_years);
        let principal_and_interest = model.monthly_payment(loan_amount);
        let add_ons = self.add_ons(home_price, property_tax_rate, extras);
        let total_payment = principal_and_interest + add_ons.total();

        let percent_of_gross = percent_of(total_payment, income.monthly_gross);
        let percent_of_net = percent_of(total_payment, income.monthly_net);
        let back_end_percent =
            percent_of(total_payment + extras.monthly_debts, income.monthly_gross);
        let unfunded = income.is_unfunded(total_payment);
        let is_affordable = !unfunded
            && if has_debts {
                back_end_percent <= self.policy.back_end_ratio * Decimal::ONE_HUNDRED
            } else {
                percent_of_gross <= self.policy.front_end_ratio * Decimal::ONE_HUNDRED
            };

        let per_term = LoanTerm::ALL
            .into_iter()
            .map(|term| {
                let option = self.term_option(term, loan_amount, add_ons, income, has_debts);
                (term.years(), option)
            })
            .collect::<BTreeMap<_, _>>();

        AffordabilityResult {
            mode,
            annual_income: round_half_up(income.annual),
            monthly_gross_income: round_half_up(income.monthly_gross),
            monthly_net_income: round_half_up(income.monthly_net),
            home_price: round_half_up(home_price),
            loan_amount: round_half_up(loan_amount),
            down_payment: DownPaymentSummary {
                amount: round_half_up(summary.amount),
                percent: round_half_up(summary.percent),
            },
            interest_rate_percent: interest_rate,
            term_years,
            monthly_principal_and_interest: round_half_up(principal_and_interest),
            monthly_property_tax: round_half_up(add_ons.property_tax),
            monthly_insurance: round_half_up(add_ons.insurance),
            monthly_mortgage_insurance: round_half_up(add_ons.mortgage_insurance),
            total_monthly_payment: round_half_up(total_payment),
            property_tax_rate,
            percent_of_gross_income: round_half_up(percent_of_gross),
            percent_of_net_income: round_half_up(percent_of_net),
            back_end_percent: round_half_up(back_end_percent),
            tier: self.payment_tier(percent_of_gross, has_debts, unfunded),
            is_affordable,
            tax_burden: income.tax_burden.clone(),
            per_term,
        }
    }

    /// Same price and loan amount at `term`'s default rate.
    fn term_option(
        &self,
        term: LoanTerm,
        loan_amount: Decimal,
        add_ons: AddOns,
        income: &IncomeSnapshot,
        has_debts: bool,
    ) -> TermOption {
        let rate = self.source.default_interest_rate(term);
        let model = MortgagePaymentModel::new(rate, term.years());
        let payment = model.monthly_payment(loan_amount);
        let total_payment = payment + add_ons.total();
        let percent_of_gross = percent_of(total_payment, income.monthly_gross);

        TermOption {
            term_years: term.years(),
            interest_rate_percent: rate,
            payment: round_half_up(payment),
            total_payment: round_half_up(total_payment),
            total_interest: round_half_up(model.total_interest(loan_amount)),
            percent_of_gross_income: round_half_up(percent_of_gross),
            percent_of_net_income: round_half_up(percent_of(total_payment, income.monthly_net)),
            tier: self.payment_tier(
                percent_of_gross,
                has_debts,
                income.is_unfunded(total_payment),
            ),
        }
    }

    /// A payment with no gross income behind it is always red.
    fn payment_tier(
        &self,
        percent_of_gross: Decimal,
        has_debts: bool,
        unfunded: bool,
    ) -> AffordabilityTier {
        if unfunded {
            return AffordabilityTier::Red;
        }
        self.classify_tier(percent_of_gross, has_debts)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;
    use crate::data::RateTables;
    use crate::{IncomeSpec, JurisdictionKind, LocalTaxRule, PropertyTaxSelection};

    fn tables() -> RateTables {
        let mut tables = RateTables::tax_year_2024();
        tables.set_state_rate(UsState::California, dec!(0.095));
        tables.insert_property_tax_rate(UsState::California, "Los Angeles", dec!(0.0072));
        tables
    }

    fn request(
        annual_income: Decimal,
        down_payment: DownPayment,
    ) -> AffordabilityRequest {
        AffordabilityRequest {
            income: IncomeInput::Gross(IncomeSpec::annual(annual_income)),
            jurisdiction: Jurisdiction::state(UsState::Texas),
            loan: LoanTerms {
                down_payment,
                interest_rate_percent: Some(dec!(6.5)),
                term: LoanTerm::ThirtyYear,
            },
            extras: FinancialExtras::default(),
        }
    }

    fn assert_within_cent(
        actual: Decimal,
        expected: Decimal,
    ) {
        assert!(
            (actual - expected).abs() <= dec!(0.01),
            "expected {expected}, got {actual}"
        );
    }

    // =========================================================================
    // classify_tier tests
    // =========================================================================

    #[test]
    fn classify_tier_without_debts_is_closed_on_upper_bounds() {
        let tables = tables();
        let strategies = StrategyRegistry::new();
        let solver = AffordabilitySolver::new(&tables, &strategies);

        assert_eq!(solver.classify_tier(dec!(28.0), false), AffordabilityTier::Green);
        assert_eq!(solver.classify_tier(dec!(28.0001), false), AffordabilityTier::Yellow);
        assert_eq!(solver.classify_tier(dec!(32), false), AffordabilityTier::Yellow);
        assert_eq!(solver.classify_tier(dec!(32.01), false), AffordabilityTier::Red);
    }

    #[test]
    fn classify_tier_with_debts_uses_back_end_thresholds() {
        let tables = tables();
        let strategies = StrategyRegistry::new();
        let solver = AffordabilitySolver::new(&tables, &strategies);

        assert_eq!(solver.classify_tier(dec!(36), true), AffordabilityTier::Green);
        assert_eq!(solver.classify_tier(dec!(42), true), AffordabilityTier::Yellow);
        assert_eq!(solver.classify_tier(dec!(42.5), true), AffordabilityTier::Red);
    }

    // =========================================================================
    // compute_max_affordability tests
    // =========================================================================

    #[test]
    fn compute_max_affordability_percent_mode_reconciles_down_payment() {
        let tables = tables();
        let strategies = StrategyRegistry::new();
        let solver = AffordabilitySolver::new(&tables, &strategies);

        // 96000 / 12 = 8000 monthly gross; front-end cap 2240
        let result = solver
            .compute_max_affordability(&request(dec!(96000), DownPayment::Percent(dec!(20))))
            .expect("income covers add-ons");

        assert_eq!(result.monthly_gross_income, dec!(8000));
        assert_within_cent(result.down_payment.amount, result.home_price * dec!(0.20));
        assert_within_cent(result.loan_amount, result.home_price * dec!(0.80));
        assert_eq!(result.down_payment.percent, dec!(20));

        // Principal and interest use all of 2240 − 700 placeholder tax.
        assert_within_cent(result.monthly_principal_and_interest, dec!(1540));
        assert_eq!(result.mode, SolveMode::MaximizeHomePrice);
    }

    #[test]
    fn compute_max_affordability_amount_mode_adds_fixed_down_payment() {
        let tables = tables();
        let strategies = StrategyRegistry::new();
        let solver = AffordabilitySolver::new(&tables, &strategies);

        let result = solver
            .compute_max_affordability(&request(dec!(96000), DownPayment::Amount(dec!(50000))))
            .expect("income covers add-ons");

        let model = MortgagePaymentModel::new(dec!(6.5), 30);
        let expected_price = round_half_up(model.max_principal(dec!(1540)) + dec!(50000));

        assert_eq!(result.home_price, expected_price);
        assert_eq!(result.down_payment.amount, dec!(50000));
        assert_within_cent(result.loan_amount, result.home_price - dec!(50000));
    }

    #[test]
    fn compute_max_affordability_recomputes_add_ons_on_final_price() {
        let tables = tables();
        let strategies = StrategyRegistry::new();
        let solver = AffordabilitySolver::new(&tables, &strategies);

        let result = solver
            .compute_max_affordability(&request(dec!(96000), DownPayment::Percent(dec!(20))))
            .expect("income covers add-ons");

        assert_within_cent(
            result.monthly_property_tax,
            result.home_price * dec!(0.028) / dec!(12),
        );
        assert_eq!(result.property_tax_rate, dec!(0.028));
    }

    #[test]
    fn compute_max_affordability_back_end_cap_binds_with_debts() {
        let tables = tables();
        let strategies = StrategyRegistry::new();
        let solver = AffordabilitySolver::new(&tables, &strategies);

        let mut with_debts = request(dec!(96000), DownPayment::Percent(dec!(20)));
        with_debts.extras.monthly_debts = dec!(1000);
        let result = solver
            .compute_max_affordability(&with_debts)
            .expect("income covers add-ons");

        // min(2240, 2880 − 1000) − 700
        assert_within_cent(result.monthly_principal_and_interest, dec!(1180));
    }

    #[test]
    fn compute_max_affordability_insufficient_income() {
        let tables = tables();
        let strategies = StrategyRegistry::new();
        let solver = AffordabilitySolver::new(&tables, &strategies);

        let result =
            solver.compute_max_affordability(&request(dec!(24000), DownPayment::Percent(dec!(20))));

        // 2000 × 0.28 = 560 < 700 placeholder property tax
        assert_eq!(
            result,
            Err(AffordabilityError::InsufficientIncome {
                max_housing_payment: dec!(560),
                estimated_add_ons: dec!(700),
            })
        );
    }

    #[test]
    fn compute_max_affordability_zero_income_is_insufficient() {
        let tables = tables();
        let strategies = StrategyRegistry::new();
        let solver = AffordabilitySolver::new(&tables, &strategies);

        let result = solver
            .compute_max_affordability(&request(Decimal::ZERO, DownPayment::Percent(dec!(20))));

        assert!(matches!(result, Err(AffordabilityError::InsufficientIncome { .. })));
    }

    #[test]
    fn compute_max_affordability_full_down_payment_yields_zero_price() {
        let tables = tables();
        let strategies = StrategyRegistry::new();
        let solver = AffordabilitySolver::new(&tables, &strategies);

        let result = solver
            .compute_max_affordability(&request(dec!(96000), DownPayment::Percent(dec!(100))))
            .expect("income covers add-ons");

        assert_eq!(result.home_price, Decimal::ZERO);
        assert_eq!(result.loan_amount, Decimal::ZERO);
    }

    #[test]
    fn compute_max_affordability_fha_forces_minimum_down_and_adds_mip() {
        let tables = tables();
        let strategies = StrategyRegistry::new();
        let solver = AffordabilitySolver::new(&tables, &strategies);

        let mut fha = request(dec!(96000), DownPayment::Percent(dec!(20)));
        fha.extras.fha_loan = true;
        let result = solver.compute_max_affordability(&fha).expect("income covers add-ons");

        assert_eq!(result.down_payment.percent, dec!(3.5));
        assert_within_cent(
            result.monthly_mortgage_insurance,
            result.home_price * dec!(0.0085) / dec!(12),
        );
    }

    #[test]
    fn compute_max_affordability_refinement_moves_toward_fixed_point() {
        let tables = tables();
        let strategies = StrategyRegistry::new();
        let plain = AffordabilitySolver::new(&tables, &strategies);
        let refined = AffordabilitySolver::new(&tables, &strategies).with_policy(AffordabilityPolicy {
            refinement_passes: 25,
            ..AffordabilityPolicy::default()
        });

        let request = request(dec!(150000), DownPayment::Percent(dec!(20)));
        let plain = plain.compute_max_affordability(&request).expect("income covers add-ons");
        let refined = refined.compute_max_affordability(&request).expect("income covers add-ons");

        // 150000 / 12 × 0.28 = 3500; the refined payment sits on the cap.
        assert!(plain.total_monthly_payment > dec!(3500));
        assert_within_cent(refined.total_monthly_payment, dec!(3500));
    }

    #[test]
    fn compute_max_affordability_uses_default_rate_when_omitted() {
        let tables = tables();
        let strategies = StrategyRegistry::new();
        let solver = AffordabilitySolver::new(&tables, &strategies);

        let mut request = request(dec!(96000), DownPayment::Percent(dec!(20)));
        request.loan.interest_rate_percent = None;
        request.loan.term = LoanTerm::FifteenYear;
        let result = solver.compute_max_affordability(&request).expect("income covers add-ons");

        assert_eq!(result.interest_rate_percent, dec!(5.96));
        assert_eq!(result.term_years, 15);
    }

    // =========================================================================
    // evaluate_home_price tests
    // =========================================================================

    #[test]
    fn evaluate_home_price_fixed_down_payment() {
        let tables = tables();
        let strategies = StrategyRegistry::new();
        let solver = AffordabilitySolver::new(&tables, &strategies);

        let result = solver.evaluate_home_price(
            dec!(400000),
            &request(dec!(120000), DownPayment::Amount(dec!(40000))),
        );

        assert_eq!(result.loan_amount, dec!(360000));
        assert_eq!(result.down_payment.percent, dec!(10));
        assert_eq!(result.monthly_principal_and_interest, dec!(2275.44));
        assert_eq!(result.monthly_property_tax, dec!(933.33));
        assert_eq!(result.mode, SolveMode::EvaluateHomePrice);
    }

    #[test]
    fn evaluate_home_price_without_income_is_red() {
        let tables = tables();
        let strategies = StrategyRegistry::new();
        let solver = AffordabilitySolver::new(&tables, &strategies);

        let result = solver.evaluate_home_price(
            dec!(400000),
            &request(Decimal::ZERO, DownPayment::Amount(dec!(40000))),
        );

        assert_eq!(result.percent_of_gross_income, Decimal::ZERO);
        assert!(result.total_monthly_payment > Decimal::ZERO);
        assert!(!result.is_affordable);
        assert_eq!(result.tier, AffordabilityTier::Red);
        assert!(
            result
                .per_term
                .values()
                .all(|option| option.tier == AffordabilityTier::Red)
        );
    }

    #[test]
    fn evaluate_home_price_net_income_never_negative() {
        let mut tables = tables();
        tables.declare_local_tax(UsState::Colorado, JurisdictionKind::City);
        tables.insert_local_rule(
            UsState::Colorado,
            "Denver",
            LocalTaxRule::FixedAmount(dec!(69)),
        );
        let strategies = StrategyRegistry::new();
        let solver = AffordabilitySolver::new(&tables, &strategies);

        let mut request = request(dec!(50), DownPayment::Percent(dec!(20)));
        request.jurisdiction = Jurisdiction::with_subdivision(UsState::Colorado, "Denver");
        let result = solver.evaluate_home_price(dec!(100000), &request);

        // 69 local tax alone exceeds the 50 income
        assert!(result.tax_burden.total > dec!(50));
        assert_eq!(result.monthly_net_income, Decimal::ZERO);
        assert!(result.percent_of_net_income >= Decimal::ZERO);
        assert!(
            result
                .per_term
                .values()
                .all(|option| option.percent_of_net_income >= Decimal::ZERO)
        );
    }

    #[test]
    fn evaluate_home_price_front_end_rule_without_debts() {
        let tables = tables();
        let strategies = StrategyRegistry::new();
        let solver = AffordabilitySolver::new(&tables, &strategies);

        let mut request = request(dec!(120000), DownPayment::Amount(dec!(40000)));
        request.extras.property_tax = None;
        let result = solver.evaluate_home_price(dec!(400000), &request);

        // 2275.44 / 10000 = 22.75% ≤ 28%
        assert_eq!(result.percent_of_gross_income, dec!(22.75));
        assert!(result.is_affordable);
        assert_eq!(result.tier, AffordabilityTier::Green);
    }

    #[test]
    fn evaluate_home_price_back_end_rule_with_debts() {
        let tables = tables();
        let strategies = StrategyRegistry::new();
        let solver = AffordabilitySolver::new(&tables, &strategies);

        let mut request = request(dec!(120000), DownPayment::Amount(dec!(40000)));
        request.extras.property_tax = None;
        request.extras.monthly_debts = dec!(1500);
        let result = solver.evaluate_home_price(dec!(400000), &request);

        // (2275.44 + 1500) / 10000 = 37.75% > 36%
        assert_eq!(result.back_end_percent, dec!(37.75));
        assert!(!result.is_affordable);
        assert_eq!(result.tier, AffordabilityTier::Green);
    }

    #[test]
    fn evaluate_home_price_percent_mode_derives_amount() {
        let tables = tables();
        let strategies = StrategyRegistry::new();
        let solver = AffordabilitySolver::new(&tables, &strategies);

        let result = solver.evaluate_home_price(
            dec!(500000),
            &request(dec!(120000), DownPayment::Percent(dec!(20))),
        );

        assert_eq!(result.down_payment.amount, dec!(100000));
        assert_eq!(result.loan_amount, dec!(400000));
    }

    #[test]
    fn evaluate_home_price_zero_price_has_zero_ratios() {
        let tables = tables();
        let strategies = StrategyRegistry::new();
        let solver = AffordabilitySolver::new(&tables, &strategies);

        let result = solver.evaluate_home_price(
            Decimal::ZERO,
            &request(dec!(120000), DownPayment::Amount(dec!(40000))),
        );

        assert_eq!(result.loan_amount, Decimal::ZERO);
        assert_eq!(result.down_payment.percent, Decimal::ZERO);
        assert_eq!(result.total_monthly_payment, Decimal::ZERO);
    }

    #[test]
    fn evaluate_home_price_per_term_holds_loan_fixed() {
        let tables = tables();
        let strategies = StrategyRegistry::new();
        let solver = AffordabilitySolver::new(&tables, &strategies);

        let result = solver.evaluate_home_price(
            dec!(400000),
            &request(dec!(120000), DownPayment::Amount(dec!(40000))),
        );

        assert_eq!(result.per_term.keys().copied().collect::<Vec<_>>(), vec![10, 15, 30]);
        let thirty = &result.per_term[&30];
        assert_eq!(thirty.interest_rate_percent, dec!(6.5));
        assert_eq!(thirty.payment, dec!(2275.44));
        let ten = &result.per_term[&10];
        assert_eq!(ten.interest_rate_percent, dec!(5.84));
        assert!(ten.payment > thirty.payment);
        assert!(ten.total_interest < thirty.total_interest);
    }

    // =========================================================================
    // income and add-on tests
    // =========================================================================

    #[test]
    fn take_home_income_grosses_up_without_tax() {
        let tables = tables();
        let strategies = StrategyRegistry::new();
        let solver = AffordabilitySolver::new(&tables, &strategies);

        let mut request = request(Decimal::ZERO, DownPayment::Percent(dec!(20)));
        request.income = IncomeInput::TakeHome { monthly: dec!(5000) };
        let result = solver.evaluate_home_price(dec!(300000), &request);

        assert_eq!(result.monthly_gross_income, dec!(6500));
        assert_eq!(result.annual_income, dec!(78000));
        assert_eq!(result.monthly_net_income, dec!(5000));
        assert_eq!(result.tax_burden, TaxBurden::default());
    }

    #[test]
    fn gross_income_net_subtracts_tax_burden() {
        let tables = tables();
        let strategies = StrategyRegistry::new();
        let solver = AffordabilitySolver::new(&tables, &strategies);

        let result = solver.evaluate_home_price(
            dec!(300000),
            &request(dec!(120000), DownPayment::Percent(dec!(20))),
        );

        // (120000 − 31022.50) / 12
        assert_eq!(result.monthly_net_income, dec!(7414.79));
        assert_eq!(result.tax_burden.total, dec!(31022.50));
    }

    #[test]
    fn property_tax_rate_prefers_county_then_custom_then_default() {
        let tables = tables();
        let strategies = StrategyRegistry::new();
        let solver = AffordabilitySolver::new(&tables, &strategies);

        let county = FinancialExtras {
            property_tax: Some(PropertyTaxSelection {
                county: Some((UsState::California, "Los Angeles".to_string())),
                custom_rate_percent: Some(dec!(1.5)),
            }),
            ..FinancialExtras::default()
        };
        let unknown_county = FinancialExtras {
            property_tax: Some(PropertyTaxSelection {
                county: Some((UsState::California, "Atlantis".to_string())),
                custom_rate_percent: Some(dec!(1.5)),
            }),
            ..FinancialExtras::default()
        };
        let excluded = FinancialExtras {
            property_tax: None,
            ..FinancialExtras::default()
        };

        assert_eq!(solver.property_tax_rate(&county), dec!(0.0072));
        assert_eq!(solver.property_tax_rate(&unknown_county), dec!(0.015));
        assert_eq!(solver.property_tax_rate(&FinancialExtras::default()), dec!(0.028));
        assert_eq!(solver.property_tax_rate(&excluded), Decimal::ZERO);
    }

    #[test]
    fn insurance_is_spread_monthly() {
        let tables = tables();
        let strategies = StrategyRegistry::new();
        let solver = AffordabilitySolver::new(&tables, &strategies);

        let mut request = request(dec!(120000), DownPayment::Percent(dec!(20)));
        request.extras.home_insurance_annual = Some(dec!(1200));
        let result = solver.evaluate_home_price(dec!(300000), &request);

        assert_eq!(result.monthly_insurance, dec!(100));
    }

    #[test]
    fn counties_for_lists_property_tax_counties() {
        let tables = tables();
        let strategies = StrategyRegistry::new();
        let solver = AffordabilitySolver::new(&tables, &strategies);

        assert_eq!(solver.counties_for(UsState::California), vec!["Los Angeles"]);
        assert!(solver.counties_for(UsState::Texas).is_empty());
    }
}
