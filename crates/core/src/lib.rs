pub mod config;
pub mod domain;
pub mod errors;
pub mod pricing;
pub mod snapshot;
pub mod worksheet;

pub use config::{AppConfig, ConfigError, ConfigOverrides, LoadOptions, LogFormat};
pub use domain::allocation::{Allocation, AllocationKey};
pub use domain::approval::ApprovalTier;
pub use domain::project::ProjectProfile;
pub use domain::selection::{Frequency, Selection};
pub use domain::service::{Service, ServiceId};
pub use domain::staff::{LocationClass, StaffLevel};
pub use domain::tier::{Tier, TierId};
pub use errors::{ApplicationError, DomainError};
pub use pricing::aggregate::{aggregate, AggregationInput, ProposalRow, ProposalSummary};
pub use pricing::approval::{classify, ApprovalThresholds};
pub use pricing::catalog::{ServiceCatalog, TierCatalog};
pub use pricing::engine::{
    compute_pricing, compute_pricing_for, compute_pricing_with_trace, DeterministicPricingEngine,
    PricingEngine, PricingResult, PricingTrace,
};
pub use pricing::rates::RateTable;
pub use pricing::PricingCatalogs;
pub use snapshot::{ExportError, ProposalSnapshot};
pub use worksheet::ScopingWorksheet;
