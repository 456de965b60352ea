use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

/// How often the quoted income amount is paid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PayFrequency {
    /// Assumes a 40-hour week, 52 weeks a year.
    Hourly,
    Weekly,
    Biweekly,
    Monthly,
    Annual,
}

impl PayFrequency {
    pub fn periods_per_year(&self) -> Decimal {
        match self {
            Self::Hourly => dec!(2080),
            Self::Weekly => dec!(52),
            Self::Biweekly => dec!(26),
            Self::Monthly => dec!(12),
            Self::Annual => Decimal::ONE,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Hourly => "hourly",
            Self::Weekly => "weekly",
            Self::Biweekly => "biweekly",
            Self::Monthly => "monthly",
            Self::Annual => "annual",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "hourly" => Some(Self::Hourly),
            "weekly" => Some(Self::Weekly),
            "biweekly" => Some(Self::Biweekly),
            "monthly" => Some(Self::Monthly),
            "annual" | "yearly" => Some(Self::Annual),
            _ => None,
        }
    }
}

/// A gross pay amount and the period it is quoted for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncomeSpec {
    pub amount: Decimal,
    pub frequency: PayFrequency,
}

impl IncomeSpec {
    pub fn new(
        amount: Decimal,
        frequency: PayFrequency,
    ) -> Self {
        Self { amount, frequency }
    }

    pub fn annual(amount: Decimal) -> Self {
        Self::new(amount, PayFrequency::Annual)
    }

    /// Gross income per year.
    pub fn annualize(&self) -> Decimal {
        self.amount * self.frequency.periods_per_year()
    }
}

/// Where the household's income figure comes from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum IncomeInput {
    /// Gross pay; taxes are computed from the jurisdiction.
    Gross(IncomeSpec),

    /// Known monthly take-home pay; gross is estimated from it and no tax
    /// burden is computed.
    TakeHome { monthly: Decimal },
}
