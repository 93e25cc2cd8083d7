use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::service::{Service, ServiceId};
use crate::domain::tier::{Tier, TierId};

/// Markup used only when a tier catalog is empty.
pub const FALLBACK_MARKUP_FACTOR: Decimal = Decimal::from_parts(125, 0, 0, false, 2);

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierCatalog {
    tiers: Vec<Tier>,
}

impl TierCatalog {
    pub fn new(tiers: Vec<Tier>) -> Self {
        Self { tiers }
    }

    pub fn standard() -> Self {
        Self::new(vec![
            Tier::new("essential", "Essential", Decimal::new(125, 2)),
            Tier::new("enhanced", "Enhanced", Decimal::new(135, 2)),
            Tier::new("ultimate", "Ultimate", Decimal::new(150, 2)),
        ])
    }

    pub fn find(&self, tier_id: &TierId) -> Option<&Tier> {
        self.tiers.iter().find(|tier| &tier.id == tier_id)
    }

    /// Unknown ids resolve to the first catalog entry. `None` only for an empty catalog.
    pub fn resolve(&self, tier_id: &TierId) -> Option<&Tier> {
        self.find(tier_id).or_else(|| self.tiers.first())
    }

    pub fn markup_for(&self, tier_id: &TierId) -> Decimal {
        self.resolve(tier_id).map_or(FALLBACK_MARKUP_FACTOR, |tier| tier.markup_factor)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Tier> {
        self.tiers.iter()
    }

    pub fn len(&self) -> usize {
        self.tiers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiers.is_empty()
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceCatalog {
    services: Vec<Service>,
}

impl ServiceCatalog {
    pub fn new(services: Vec<Service>) -> Self {
        Self { services }
    }

    pub fn standard() -> Self {
        Self::new(vec![
            Service::new("fed-1040", "Federal Tax Return"),
            Service::new("state-tax", "State Tax Returns"),
            Service::new("extensions", "Income Tax Extensions"),
            Service::new("quarterlies", "Quarterly Estimated Tax Calcs"),
            Service::new("k1", "Estimated K-1s for Investors"),
            Service::new("r&d", "R&D Credit Calculation"),
            Service::new("provision", "Tax Provision & Memo"),
            Service::new("salt", "SALT Updates"),
            Service::new("consult", "General Consulting"),
        ])
    }

    pub fn find(&self, service_id: &ServiceId) -> Option<&Service> {
        self.services.iter().find(|service| &service.id == service_id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Service> {
        self.services.iter()
    }

    pub fn len(&self) -> usize {
        self.services.len()
    }

    pub fn is_empty(&self) -> bool {
        self.services.is_empty()
    }
}
