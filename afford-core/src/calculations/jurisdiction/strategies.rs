use std::collections::HashMap;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tracing::debug;

use super::LocalTaxStrategy;
use crate::calculations::BracketTaxCalculator;
use crate::{TaxBracket, UsState};

// =============================================================================
// New York
// =============================================================================

/// New York City resident tax and the Yonkers resident surcharge.
///
/// The city tax is a progressive schedule on income. Yonkers stacks on top of
/// the state tax: 16.75% of `income × state_rate`.
#[derive(Debug, Clone)]
pub struct NewYorkLocalTax {
    city_brackets: Vec<TaxBracket>,
    state_rate: Decimal,
    yonkers_surcharge: Decimal,
}

impl NewYorkLocalTax {
    pub const NEW_YORK_CITY: &'static str = "New York City";
    pub const YONKERS: &'static str = "Yonkers";

    pub fn new(state_rate: Decimal) -> Self {
        Self {
            city_brackets: vec![
                TaxBracket::new(dec!(0), Some(dec!(12000)), dec!(0.03078)),
                TaxBracket::new(dec!(12000), Some(dec!(25000)), dec!(0.03762)),
                TaxBracket::new(dec!(25000), Some(dec!(50000)), dec!(0.03819)),
                TaxBracket::new(dec!(50000), None, dec!(0.03876)),
            ],
            state_rate,
            yonkers_surcharge: dec!(0.1675),
        }
    }
}

impl LocalTaxStrategy for NewYorkLocalTax {
    fn state(&self) -> UsState {
        UsState::NewYork
    }

    fn local_tax(
        &self,
        annual_income: Decimal,
        subdivision: &str,
    ) -> Decimal {
        match subdivision {
            Self::NEW_YORK_CITY => {
                BracketTaxCalculator::new(&self.city_brackets).tax(annual_income)
            }
            Self::YONKERS => annual_income * self.state_rate * self.yonkers_surcharge,
            _ => Decimal::ZERO,
        }
    }
}

// =============================================================================
// Michigan
// =============================================================================

/// Michigan city income tax.
///
/// Cities levy the uniform 1% resident rate unless listed as an exception.
/// The per-resident exemption comes off income before the rate applies.
#[derive(Debug, Clone)]
pub struct MichiganCityTax {
    uniform_rate: Decimal,
    exemption: Decimal,
    exceptions: HashMap<String, Decimal>,
}

impl MichiganCityTax {
    pub fn new(
        uniform_rate: Decimal,
        exemption: Decimal,
    ) -> Self {
        Self {
            uniform_rate,
            exemption,
            exceptions: HashMap::new(),
        }
    }

    /// Sets a city-specific resident rate.
    pub fn with_exception(
        mut self,
        city: impl Into<String>,
        rate: Decimal,
    ) -> Self {
        self.exceptions.insert(city.into(), rate);
        self
    }

    pub fn rate_for(
        &self,
        city: &str,
    ) -> Decimal {
        self.exceptions
            .get(city)
            .copied()
            .unwrap_or(self.uniform_rate)
    }
}

impl Default for MichiganCityTax {
    fn default() -> Self {
        Self::new(dec!(0.01), dec!(600))
            .with_exception("Detroit", dec!(0.024))
            .with_exception("Grand Rapids", dec!(0.015))
            .with_exception("Highland Park", dec!(0.02))
            .with_exception("Saginaw", dec!(0.015))
    }
}

impl LocalTaxStrategy for MichiganCityTax {
    fn state(&self) -> UsState {
        UsState::Michigan
    }

    fn local_tax(
        &self,
        annual_income: Decimal,
        subdivision: &str,
    ) -> Decimal {
        let taxable = (annual_income - self.exemption).max(Decimal::ZERO);
        taxable * self.rate_for(subdivision)
    }
}

// =============================================================================
// Oregon
// =============================================================================

/// Portland-area regional income taxes.
///
/// | Tax | Applies in | Rate |
/// |-----|------------|------|
/// | Metro Supportive Housing Services | Multnomah, Washington, Clackamas | 1% above $125,000 |
/// | Preschool for All | Multnomah | 1.5% above $125,000, another 1.5% above $250,000 |
#[derive(Debug, Clone)]
pub struct OregonRegionalTax {
    metro_counties: Vec<String>,
    metro_threshold: Decimal,
    metro_rate: Decimal,
    preschool_county: String,
    preschool_brackets: Vec<TaxBracket>,
}

impl Default for OregonRegionalTax {
    fn default() -> Self {
        Self {
            metro_counties: vec![
                "Multnomah County".to_string(),
                "Washington County".to_string(),
                "Clackamas County".to_string(),
            ],
            metro_threshold: dec!(125000),
            metro_rate: dec!(0.01),
            preschool_county: "Multnomah County".to_string(),
            preschool_brackets: vec![
                TaxBracket::new(dec!(0), Some(dec!(125000)), dec!(0)),
                TaxBracket::new(dec!(125000), Some(dec!(250000)), dec!(0.015)),
                TaxBracket::new(dec!(250000), None, dec!(0.03)),
            ],
        }
    }
}

impl LocalTaxStrategy for OregonRegionalTax {
    fn state(&self) -> UsState {
        UsState::Oregon
    }

    fn local_tax(
        &self,
        annual_income: Decimal,
        subdivision: &str,
    ) -> Decimal {
        if !self.metro_counties.iter().any(|c| c == subdivision) {
            return Decimal::ZERO;
        }

        let metro = (annual_income - self.metro_threshold).max(Decimal::ZERO) * self.metro_rate;
        let preschool = if subdivision == self.preschool_county {
            BracketTaxCalculator::new(&self.preschool_brackets).tax(annual_income)
        } else {
            Decimal::ZERO
        };

        debug!(subdivision, %metro, %preschool, "oregon regional tax");
        metro + preschool
    }
}

// =============================================================================
// Iowa
// =============================================================================

/// Iowa school-district surtax: a per-district percentage of the state tax.
#[derive(Debug, Clone)]
pub struct IowaSchoolDistrictSurtax {
    state_rate: Decimal,
    districts: HashMap<String, Decimal>,
}

impl IowaSchoolDistrictSurtax {
    pub fn new(state_rate: Decimal) -> Self {
        Self {
            state_rate,
            districts: HashMap::new(),
        }
    }

    /// Sets a district's surtax, in percent of the state tax.
    pub fn with_district(
        mut self,
        district: impl Into<String>,
        surtax_percent: Decimal,
    ) -> Self {
        self.districts.insert(district.into(), surtax_percent);
        self
    }

    /// Districts shipped with the 2024 dataset.
    pub fn tax_year_2024(state_rate: Decimal) -> Self {
        Self::new(state_rate)
            .with_district("Cedar Rapids", dec!(2))
            .with_district("Davenport", dec!(7))
            .with_district("Des Moines", dec!(0))
            .with_district("Dubuque", dec!(4))
            .with_district("Iowa City", dec!(3))
            .with_district("Sioux City", dec!(5))
            .with_district("Waterloo", dec!(6))
    }
}

impl LocalTaxStrategy for IowaSchoolDistrictSurtax {
    fn state(&self) -> UsState {
        UsState::Iowa
    }

    fn local_tax(
        &self,
        annual_income: Decimal,
        subdivision: &str,
    ) -> Decimal {
        match self.districts.get(subdivision) {
            Some(percent) => annual_income * self.state_rate * percent / Decimal::ONE_HUNDRED,
            None => Decimal::ZERO,
        }
    }
}
