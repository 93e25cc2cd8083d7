use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::service::ServiceId;
use crate::domain::staff::{LocationClass, StaffLevel};
use crate::domain::tier::TierId;

/// Composite identity of one priced row.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AllocationKey {
    pub service_id: ServiceId,
    pub tier_id: TierId,
}

impl AllocationKey {
    pub fn new(service_id: ServiceId, tier_id: TierId) -> Self {
        Self { service_id, tier_id }
    }
}

/// Hours by location and staff level for one (service, tier) pair, plus the
/// admin/tech fee applied to base labor cost.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Allocation {
    pub hours: BTreeMap<LocationClass, BTreeMap<StaffLevel, Decimal>>,
    pub admin_fee_pct: Decimal,
}

impl Allocation {
    /// Zero hours for every location and level; the admin fee starts at the project default.
    pub fn new(default_admin_fee_pct: Decimal) -> Self {
        let hours = LocationClass::ALL
            .into_iter()
            .map(|location| {
                let levels =
                    StaffLevel::ALL.into_iter().map(|level| (level, Decimal::ZERO)).collect();
                (location, levels)
            })
            .collect();

        Self { hours, admin_fee_pct: default_admin_fee_pct }
    }

    /// Absent entries read as zero hours.
    pub fn hours(&self, location: LocationClass, level: StaffLevel) -> Decimal {
        self.hours
            .get(&location)
            .and_then(|levels| levels.get(&level))
            .copied()
            .unwrap_or(Decimal::ZERO)
    }

    pub fn set_hours(&mut self, location: LocationClass, level: StaffLevel, hours: Decimal) {
        self.hours.entry(location).or_default().insert(level, hours);
    }

    pub fn with_hours(
        mut self,
        location: LocationClass,
        level: StaffLevel,
        hours: Decimal,
    ) -> Self {
        self.set_hours(location, level, hours);
        self
    }

    pub fn entries(&self) -> impl Iterator<Item = (LocationClass, StaffLevel, Decimal)> + '_ {
        self.hours.iter().flat_map(|(location, levels)| {
            levels.iter().map(move |(level, hours)| (*location, *level, *hours))
        })
    }

    pub fn total_hours(&self) -> Decimal {
        self.entries().fold(Decimal::ZERO, |total, (_, _, hours)| total.saturating_add(hours))
    }
}

impl Default for Allocation {
    fn default() -> Self {
        Self::new(Decimal::ZERO)
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::Allocation;
    use crate::domain::staff::{LocationClass, StaffLevel};

    #[test]
    fn new_allocation_has_zero_hours_everywhere_and_project_admin_fee() {
        let allocation = Allocation::new(Decimal::new(5, 0));

        assert_eq!(allocation.admin_fee_pct, Decimal::new(5, 0));
        assert_eq!(allocation.total_hours(), Decimal::ZERO);
        assert_eq!(allocation.entries().count(), LocationClass::ALL.len() * StaffLevel::ALL.len());
    }

    #[test]
    fn missing_entries_read_as_zero() {
        let mut allocation = Allocation::new(Decimal::ZERO);
        allocation.hours.clear();

        assert_eq!(allocation.hours(LocationClass::Offshore, StaffLevel::Partner), Decimal::ZERO);
    }

    #[test]
    fn set_hours_replaces_previous_value() {
        let mut allocation = Allocation::default()
            .with_hours(LocationClass::Onshore, StaffLevel::Manager, Decimal::new(8, 0));
        allocation.set_hours(LocationClass::Onshore, StaffLevel::Manager, Decimal::new(125, 1));

        let manager_hours = allocation.hours(LocationClass::Onshore, StaffLevel::Manager);
        assert_eq!(manager_hours, Decimal::new(125, 1));
        assert_eq!(allocation.total_hours(), Decimal::new(125, 1));
    }

    #[test]
    fn allocations_created_from_same_default_are_independent() {
        let mut first = Allocation::new(Decimal::new(5, 0));
        let second = first.clone();
        first.admin_fee_pct = Decimal::new(10, 0);

        assert_eq!(second.admin_fee_pct, Decimal::new(5, 0));
    }

    #[test]
    fn capitalized_location_keys_deserialize_into_hours() {
        let raw = r#"{
            "hours": { "Offshore": { "Partner": "3" }, "Onshore": { "Manager": 2 } },
            "admin_fee_pct": "5"
        }"#;
        let allocation: Allocation = serde_json::from_str(raw).expect("allocation");

        let partner = allocation.hours(LocationClass::Offshore, StaffLevel::Partner);
        assert_eq!(partner, Decimal::new(3, 0));
        let manager = allocation.hours(LocationClass::Onshore, StaffLevel::Manager);
        assert_eq!(manager, Decimal::new(2, 0));
        assert_eq!(allocation.total_hours(), Decimal::new(5, 0));
    }
}
