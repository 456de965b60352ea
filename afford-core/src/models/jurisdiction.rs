use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::UsState;

/// A state plus an optional local taxing subdivision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Jurisdiction {
    pub state: UsState,
    pub subdivision: Option<String>,
}

impl Jurisdiction {
    pub fn state(state: UsState) -> Self {
        Self {
            state,
            subdivision: None,
        }
    }

    pub fn with_subdivision(
        state: UsState,
        subdivision: impl Into<String>,
    ) -> Self {
        Self {
            state,
            subdivision: Some(subdivision.into()),
        }
    }

    /// The subdivision key, treating blank strings as absent.
    pub fn subdivision_key(&self) -> Option<&str> {
        self.subdivision
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }
}

/// What kind of subdivision a state's local taxes are levied by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum JurisdictionKind {
    County,
    City,
    SchoolDistrict,
    CityOrCounty,
    Region,
}

impl JurisdictionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::County => "county",
            Self::City => "city",
            Self::SchoolDistrict => "school_district",
            Self::CityOrCounty => "both",
            Self::Region => "region",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim() {
            "county" => Some(Self::County),
            "city" => Some(Self::City),
            "school_district" => Some(Self::SchoolDistrict),
            "both" => Some(Self::CityOrCounty),
            "region" => Some(Self::Region),
            _ => None,
        }
    }

    /// Label for a selection control.
    pub fn label(&self) -> &'static str {
        match self {
            Self::County => "County",
            Self::City => "City/Municipality",
            Self::SchoolDistrict => "School District",
            Self::CityOrCounty => "City/County",
            Self::Region => "Region",
        }
    }
}

impl fmt::Display for JurisdictionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Shape of the local tax levied by one subdivision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum LocalTaxRule {
    /// `income × rate`.
    FlatRate(Decimal),

    /// An authorized range; the midpoint is charged. This is an approximation
    /// of the subdivision's real schedule, not a bracket computation.
    RangeRate { min: Decimal, max: Decimal },

    /// A flat per-resident charge that does not scale with income.
    FixedAmount(Decimal),

    /// Computed by the state's registered
    /// [`LocalTaxStrategy`](crate::calculations::LocalTaxStrategy).
    TableBased,
}

/// A named subdivision and its rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subdivision {
    pub name: String,
    pub rule: LocalTaxRule,
}

/// The local-tax declaration for one state.
///
/// Subdivisions keep the order they were loaded in, which is the order a
/// selection list presents them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalTaxTable {
    pub kind: JurisdictionKind,
    pub subdivisions: Vec<Subdivision>,
}

impl LocalTaxTable {
    pub fn new(kind: JurisdictionKind) -> Self {
        Self {
            kind,
            subdivisions: Vec::new(),
        }
    }

    /// Adds a subdivision, replacing any existing entry with the same name.
    pub fn insert(
        &mut self,
        name: impl Into<String>,
        rule: LocalTaxRule,
    ) {
        let name = name.into();
        match self.subdivisions.iter_mut().find(|s| s.name == name) {
            Some(existing) => existing.rule = rule,
            None => self.subdivisions.push(Subdivision { name, rule }),
        }
    }

    pub fn rule_for(
        &self,
        subdivision: &str,
    ) -> Option<&LocalTaxRule> {
        self.subdivisions
            .iter()
            .find(|s| s.name == subdivision)
            .map(|s| &s.rule)
    }

    pub fn names(&self) -> Vec<&str> {
        self.subdivisions.iter().map(|s| s.name.as_str()).collect()
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    #[test]
    fn subdivision_key_treats_blank_as_absent() {
        let jurisdiction = Jurisdiction::with_subdivision(UsState::Ohio, "   ");

        assert_eq!(jurisdiction.subdivision_key(), None);
    }

    #[test]
    fn subdivision_key_trims_whitespace() {
        let jurisdiction = Jurisdiction::with_subdivision(UsState::Ohio, " Columbus ");

        assert_eq!(jurisdiction.subdivision_key(), Some("Columbus"));
    }

    #[test]
    fn jurisdiction_kind_parse_round_trips() {
        for kind in [
            JurisdictionKind::County,
            JurisdictionKind::City,
            JurisdictionKind::SchoolDistrict,
            JurisdictionKind::CityOrCounty,
            JurisdictionKind::Region,
        ] {
            assert_eq!(JurisdictionKind::parse(kind.as_str()), Some(kind));
        }
    }

    #[test]
    fn insert_preserves_order_and_replaces_duplicates() {
        let mut table = LocalTaxTable::new(JurisdictionKind::City);
        table.insert("Columbus", LocalTaxRule::FlatRate(dec!(0.025)));
        table.insert("Akron", LocalTaxRule::FlatRate(dec!(0.025)));
        table.insert("Columbus", LocalTaxRule::FlatRate(dec!(0.03)));

        assert_eq!(table.names(), vec!["Columbus", "Akron"]);
        assert_eq!(
            table.rule_for("Columbus"),
            Some(&LocalTaxRule::FlatRate(dec!(0.03)))
        );
    }

    #[test]
    fn rule_for_returns_none_for_unknown_subdivision() {
        let table = LocalTaxTable::new(JurisdictionKind::County);

        assert_eq!(table.rule_for("Nowhere"), None);
    }
}
