use std::collections::BTreeMap;

use rust_decimal::Decimal;
use tracing::trace;

use crate::domain::allocation::{Allocation, AllocationKey};
use crate::domain::project::ProjectProfile;
use crate::domain::selection::{Frequency, Selection};
use crate::domain::service::ServiceId;
use crate::domain::staff::{LocationClass, StaffLevel};
use crate::domain::tier::TierId;
use crate::errors::DomainError;
use crate::pricing::aggregate::{aggregate, AggregationInput, ProposalSummary};
use crate::pricing::engine::{
    compute_pricing_for, compute_pricing_with_trace, PricingResult, TracedPricing,
};
use crate::pricing::PricingCatalogs;

/// Editable scoping state for one proposal: every (service, tier) pair has an
/// allocation from the start, and selection decides what gets priced.
#[derive(Clone, Debug)]
pub struct ScopingWorksheet {
    profile: ProjectProfile,
    catalogs: PricingCatalogs,
    selections: BTreeMap<AllocationKey, Selection>,
    allocations: BTreeMap<AllocationKey, Allocation>,
}

impl ScopingWorksheet {
    pub fn new(profile: ProjectProfile, catalogs: PricingCatalogs) -> Self {
        let mut selections = BTreeMap::new();
        let mut allocations = BTreeMap::new();

        for service in catalogs.services.iter() {
            for tier in catalogs.tiers.iter() {
                let key = AllocationKey::new(service.id.clone(), tier.id.clone());
                selections.insert(key.clone(), Selection::default());
                allocations.insert(key, Allocation::new(profile.admin_fee_pct));
            }
        }

        Self { profile, catalogs, selections, allocations }
    }

    pub fn profile(&self) -> &ProjectProfile {
        &self.profile
    }

    pub fn catalogs(&self) -> &PricingCatalogs {
        &self.catalogs
    }

    pub fn selections(&self) -> &BTreeMap<AllocationKey, Selection> {
        &self.selections
    }

    pub fn allocations(&self) -> &BTreeMap<AllocationKey, Allocation> {
        &self.allocations
    }

    pub fn allocation(
        &self,
        service: &ServiceId,
        tier: &TierId,
    ) -> Result<&Allocation, DomainError> {
        let key = self.key(service, tier)?;
        self.allocations.get(&key).ok_or_else(|| missing_pair(&key))
    }

    pub fn select(
        &mut self,
        service: &ServiceId,
        tier: &TierId,
        frequency: Frequency,
    ) -> Result<(), DomainError> {
        let key = self.key(service, tier)?;
        trace!(event_name = "worksheet.select", service_id = %service, tier_id = %tier);
        self.selections.insert(key, Selection::selected(frequency));
        Ok(())
    }

    /// Keeps the allocation so re-selecting restores the entered hours.
    pub fn deselect(&mut self, service: &ServiceId, tier: &TierId) -> Result<(), DomainError> {
        let key = self.key(service, tier)?;
        trace!(event_name = "worksheet.deselect", service_id = %service, tier_id = %tier);
        self.selections.entry(key).or_default().selected = false;
        Ok(())
    }

    pub fn set_frequency(
        &mut self,
        service: &ServiceId,
        tier: &TierId,
        frequency: Frequency,
    ) -> Result<(), DomainError> {
        let key = self.key(service, tier)?;
        self.selections.entry(key).or_default().frequency = frequency;
        Ok(())
    }

    /// Negative hours are clamped to zero at this boundary.
    pub fn set_hours(
        &mut self,
        service: &ServiceId,
        tier: &TierId,
        location: LocationClass,
        level: StaffLevel,
        hours: Decimal,
    ) -> Result<(), DomainError> {
        let key = self.key(service, tier)?;
        let admin_fee_pct = self.profile.admin_fee_pct;
        self.allocations
            .entry(key)
            .or_insert_with(|| Allocation::new(admin_fee_pct))
            .set_hours(location, level, coerce_non_negative(hours));
        Ok(())
    }

    pub fn set_admin_fee_pct(
        &mut self,
        service: &ServiceId,
        tier: &TierId,
        admin_fee_pct: Decimal,
    ) -> Result<(), DomainError> {
        let key = self.key(service, tier)?;
        let default_pct = self.profile.admin_fee_pct;
        let allocation =
            self.allocations.entry(key).or_insert_with(|| Allocation::new(default_pct));
        allocation.admin_fee_pct = coerce_non_negative(admin_fee_pct);
        Ok(())
    }

    /// Single-row preview, whether or not the pair is selected.
    pub fn price_pair(
        &self,
        service: &ServiceId,
        tier: &TierId,
    ) -> Result<PricingResult, DomainError> {
        let allocation = self.allocation(service, tier)?;
        Ok(compute_pricing_for(allocation, &self.catalogs.rates, &self.catalogs.tiers, tier))
    }

    pub fn trace_pair(
        &self,
        service: &ServiceId,
        tier: &TierId,
    ) -> Result<TracedPricing, DomainError> {
        let allocation = self.allocation(service, tier)?;
        Ok(compute_pricing_with_trace(allocation, &self.catalogs.rates, &self.catalogs.tiers, tier))
    }

    pub fn summary(&self) -> ProposalSummary {
        aggregate(AggregationInput {
            services: &self.catalogs.services,
            tiers: &self.catalogs.tiers,
            rates: &self.catalogs.rates,
            thresholds: &self.catalogs.thresholds,
            selections: &self.selections,
            allocations: &self.allocations,
        })
    }

    pub fn selected_count(&self) -> usize {
        self.selections.values().filter(|selection| selection.selected).count()
    }

    fn key(&self, service: &ServiceId, tier: &TierId) -> Result<AllocationKey, DomainError> {
        if self.catalogs.services.find(service).is_none() {
            return Err(DomainError::UnknownService(service.clone()));
        }
        if self.catalogs.tiers.find(tier).is_none() {
            return Err(DomainError::UnknownTier(tier.clone()));
        }
        Ok(AllocationKey::new(service.clone(), tier.clone()))
    }
}

pub fn coerce_non_negative(value: Decimal) -> Decimal {
    value.max(Decimal::ZERO)
}

fn missing_pair(key: &AllocationKey) -> DomainError {
    DomainError::InvariantViolation(format!(
        "no allocation for service `{}` at tier `{}`",
        key.service_id, key.tier_id
    ))
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::ScopingWorksheet;
    use crate::domain::approval::ApprovalTier;
    use crate::domain::project::ProjectProfile;
    use crate::domain::selection::Frequency;
    use crate::domain::service::ServiceId;
    use crate::domain::staff::{LocationClass, StaffLevel};
    use crate::domain::tier::TierId;
    use crate::errors::DomainError;
    use crate::pricing::PricingCatalogs;

    fn worksheet() -> ScopingWorksheet {
        ScopingWorksheet::new(ProjectProfile::default(), PricingCatalogs::standard())
    }

    fn fed() -> ServiceId {
        ServiceId::new("fed-1040")
    }

    fn essential() -> TierId {
        TierId::new("essential")
    }

    #[test]
    fn every_pair_starts_with_project_admin_fee_and_no_selection() {
        let profile = ProjectProfile { admin_fee_pct: Decimal::new(8, 0), ..Default::default() };
        let worksheet = ScopingWorksheet::new(profile, PricingCatalogs::standard());

        assert_eq!(worksheet.allocations().len(), 27);
        assert!(worksheet
            .allocations()
            .values()
            .all(|allocation| allocation.admin_fee_pct == Decimal::new(8, 0)));
        assert_eq!(worksheet.selected_count(), 0);
        assert!(worksheet.summary().rows.is_empty());
    }

    #[test]
    fn edits_flow_into_summary_after_selection() {
        let mut worksheet = worksheet();
        worksheet
            .set_hours(
                &fed(),
                &essential(),
                LocationClass::Onshore,
                StaffLevel::StaffL1,
                Decimal::new(10, 0),
            )
            .expect("known pair");
        assert!(worksheet.summary().rows.is_empty());

        worksheet.select(&fed(), &essential(), Frequency::new("Annually")).expect("known pair");
        let summary = worksheet.summary();

        assert_eq!(summary.rows.len(), 1);
        assert_eq!(summary.total_cost, Decimal::new(8925, 1));
        assert_eq!(summary.approval, ApprovalTier::DirectorApproval);
    }

    #[test]
    fn deselect_keeps_hours_for_reselection() {
        let mut worksheet = worksheet();
        let tier = TierId::new("ultimate");
        worksheet
            .set_hours(
                &fed(),
                &tier,
                LocationClass::Offshore,
                StaffLevel::Manager,
                Decimal::new(4, 0),
            )
            .expect("known pair");
        worksheet.select(&fed(), &tier, Frequency::default()).expect("select");
        worksheet.deselect(&fed(), &tier).expect("deselect");
        assert_eq!(worksheet.summary().total_price, Decimal::ZERO);

        worksheet.select(&fed(), &tier, Frequency::default()).expect("reselect");
        assert_eq!(worksheet.summary().total_cost, Decimal::new(504, 0));
    }

    #[test]
    fn negative_inputs_are_coerced_to_zero_at_the_boundary() {
        let mut worksheet = worksheet();
        worksheet
            .set_hours(
                &fed(),
                &essential(),
                LocationClass::Onshore,
                StaffLevel::Partner,
                Decimal::new(-3, 0),
            )
            .expect("known pair");
        worksheet
            .set_admin_fee_pct(&fed(), &essential(), Decimal::new(-10, 0))
            .expect("known pair");

        let allocation = worksheet.allocation(&fed(), &essential()).expect("allocation");
        assert_eq!(allocation.hours(LocationClass::Onshore, StaffLevel::Partner), Decimal::ZERO);
        assert_eq!(allocation.admin_fee_pct, Decimal::ZERO);
    }

    #[test]
    fn admin_fee_override_is_scoped_to_one_pair() {
        let mut worksheet = worksheet();
        let enhanced = TierId::new("enhanced");
        worksheet.set_admin_fee_pct(&fed(), &enhanced, Decimal::new(12, 0)).expect("known pair");

        let overridden = worksheet.allocation(&fed(), &enhanced).expect("allocation");
        let untouched = worksheet.allocation(&fed(), &essential()).expect("allocation");
        assert_eq!(overridden.admin_fee_pct, Decimal::new(12, 0));
        assert_eq!(untouched.admin_fee_pct, Decimal::new(5, 0));
    }

    #[test]
    fn unknown_ids_are_rejected() {
        let mut worksheet = worksheet();

        let service_error = worksheet
            .select(&ServiceId::new("payroll"), &essential(), Frequency::default())
            .expect_err("unknown service");
        assert_eq!(service_error, DomainError::UnknownService(ServiceId::new("payroll")));

        let tier_error = worksheet.price_pair(&fed(), &TierId::new("platinum")).expect_err("tier");
        assert_eq!(tier_error, DomainError::UnknownTier(TierId::new("platinum")));
    }

    #[test]
    fn price_pair_previews_unselected_rows() {
        let mut worksheet = worksheet();
        worksheet
            .set_hours(
                &fed(),
                &essential(),
                LocationClass::Onshore,
                StaffLevel::Admin,
                Decimal::new(2, 0),
            )
            .expect("known pair");

        let preview = worksheet.price_pair(&fed(), &essential()).expect("preview");
        assert_eq!(preview.cost, Decimal::new(945, 1));
        assert_eq!(worksheet.selected_count(), 0);

        let traced = worksheet.trace_pair(&fed(), &essential()).expect("trace");
        assert_eq!(traced.result, preview);
        assert_eq!(traced.trace.steps.len(), 6);
    }
}
