pub mod aggregate;
pub mod approval;
pub mod catalog;
pub mod engine;
pub mod rates;

use serde::{Deserialize, Serialize};

use self::{
    approval::ApprovalThresholds,
    catalog::{ServiceCatalog, TierCatalog},
    rates::RateTable,
};

/// Reference data the engine reads: swap any part without touching pricing code.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricingCatalogs {
    pub services: ServiceCatalog,
    pub tiers: TierCatalog,
    pub rates: RateTable,
    pub thresholds: ApprovalThresholds,
}

impl PricingCatalogs {
    pub fn standard() -> Self {
        Self {
            services: ServiceCatalog::standard(),
            tiers: TierCatalog::standard(),
            rates: RateTable::standard(),
            thresholds: ApprovalThresholds::default(),
        }
    }
}

impl Default for PricingCatalogs {
    fn default() -> Self {
        Self::standard()
    }
}
