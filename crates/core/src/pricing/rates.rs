use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::staff::{LocationClass, StaffLevel};

/// Hourly cost rate by (location, staff level).
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateTable {
    rates: BTreeMap<LocationClass, BTreeMap<StaffLevel, Decimal>>,
}

const STANDARD_RATES: [(StaffLevel, i64, i64); 10] = [
    (StaffLevel::Admin, 45, 15),
    (StaffLevel::Intern, 35, 10),
    (StaffLevel::StaffL1, 85, 30),
    (StaffLevel::StaffL2, 110, 45),
    (StaffLevel::SeniorL1L2, 150, 60),
    (StaffLevel::SeniorL3Supervisor, 185, 85),
    (StaffLevel::Manager, 230, 120),
    (StaffLevel::SeniorManager, 275, 150),
    (StaffLevel::Director, 325, 200),
    (StaffLevel::Partner, 450, 275),
];

impl RateTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reference onshore/offshore rate card.
    pub fn standard() -> Self {
        let mut table = Self::new();
        for (level, onshore, offshore) in STANDARD_RATES {
            table.set_rate(LocationClass::Onshore, level, Decimal::from(onshore));
            table.set_rate(LocationClass::Offshore, level, Decimal::from(offshore));
        }
        table
    }

    /// A missing entry is rate 0.
    pub fn rate(&self, location: LocationClass, level: StaffLevel) -> Decimal {
        self.rates
            .get(&location)
            .and_then(|levels| levels.get(&level))
            .copied()
            .unwrap_or(Decimal::ZERO)
    }

    pub fn set_rate(&mut self, location: LocationClass, level: StaffLevel, rate: Decimal) {
        self.rates.entry(location).or_default().insert(level, rate);
    }

    pub fn with_rate(mut self, location: LocationClass, level: StaffLevel, rate: Decimal) -> Self {
        self.set_rate(location, level, rate);
        self
    }

    pub fn missing_entries(&self) -> Vec<(LocationClass, StaffLevel)> {
        LocationClass::ALL
            .into_iter()
            .flat_map(|location| StaffLevel::ALL.into_iter().map(move |level| (location, level)))
            .filter(|(location, level)| {
                self.rates.get(location).map_or(true, |levels| !levels.contains_key(level))
            })
            .collect()
    }

    pub fn negative_entries(&self) -> Vec<(LocationClass, StaffLevel, Decimal)> {
        self.rates
            .iter()
            .flat_map(|(location, levels)| {
                levels.iter().map(move |(level, rate)| (*location, *level, *rate))
            })
            .filter(|(_, _, rate)| *rate < Decimal::ZERO)
            .collect()
    }

    pub fn is_complete(&self) -> bool {
        self.missing_entries().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::RateTable;
    use crate::domain::staff::{LocationClass, StaffLevel};

    #[test]
    fn standard_table_covers_every_level_and_location() {
        let table = RateTable::standard();

        assert!(table.is_complete());
        assert_eq!(table.rate(LocationClass::Onshore, StaffLevel::StaffL1), Decimal::from(85));
        assert_eq!(table.rate(LocationClass::Offshore, StaffLevel::Partner), Decimal::from(275));
    }

    #[test]
    fn lookup_miss_defaults_to_zero() {
        let table = RateTable::new().with_rate(
            LocationClass::Onshore,
            StaffLevel::Manager,
            Decimal::from(200),
        );

        assert_eq!(table.rate(LocationClass::Offshore, StaffLevel::Manager), Decimal::ZERO);
        assert_eq!(table.rate(LocationClass::Onshore, StaffLevel::Admin), Decimal::ZERO);
        assert_eq!(table.missing_entries().len(), 19);
        assert!(!table.is_complete());
    }

    #[test]
    fn negative_rates_are_reported() {
        let table = RateTable::standard().with_rate(
            LocationClass::Offshore,
            StaffLevel::Intern,
            Decimal::from(-10),
        );

        assert_eq!(
            table.negative_entries(),
            vec![(LocationClass::Offshore, StaffLevel::Intern, Decimal::from(-10))]
        );
    }
}
