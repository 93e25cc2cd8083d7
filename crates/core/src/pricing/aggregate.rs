use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::allocation::{Allocation, AllocationKey};
use crate::domain::approval::ApprovalTier;
use crate::domain::selection::{Frequency, Selection};
use crate::domain::service::ServiceId;
use crate::domain::tier::TierId;
use crate::pricing::approval::ApprovalThresholds;
use crate::pricing::catalog::{ServiceCatalog, TierCatalog};
use crate::pricing::engine::{
    margin_ratio, saturating_sum, DeterministicPricingEngine, PricingEngine, PricingResult,
};
use crate::pricing::rates::RateTable;

#[derive(Clone, Copy, Debug)]
pub struct AggregationInput<'a> {
    pub services: &'a ServiceCatalog,
    pub tiers: &'a TierCatalog,
    pub rates: &'a RateTable,
    pub thresholds: &'a ApprovalThresholds,
    pub selections: &'a BTreeMap<AllocationKey, Selection>,
    pub allocations: &'a BTreeMap<AllocationKey, Allocation>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProposalRow {
    pub service_id: ServiceId,
    pub service_name: String,
    pub tier_id: TierId,
    pub tier_label: String,
    pub frequency: Frequency,
    pub pricing: PricingResult,
    pub approval: ApprovalTier,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProposalSummary {
    pub rows: Vec<ProposalRow>,
    pub total_cost: Decimal,
    pub total_price: Decimal,
    /// Margin of the summed totals, so larger rows weigh more.
    pub grand_margin: Decimal,
    pub approval: ApprovalTier,
}

impl ProposalSummary {
    pub fn from_rows(rows: Vec<ProposalRow>, thresholds: &ApprovalThresholds) -> Self {
        let total_cost = saturating_sum(rows.iter().map(|row| row.pricing.cost));
        let total_price = saturating_sum(rows.iter().map(|row| row.pricing.price));
        let grand_margin = margin_ratio(total_cost, total_price);

        Self {
            rows,
            total_cost,
            total_price,
            grand_margin,
            approval: thresholds.classify(grand_margin),
        }
    }

    pub fn rows_requiring_approval(&self) -> impl Iterator<Item = &ProposalRow> {
        self.rows.iter().filter(|row| row.approval.requires_approval())
    }
}

pub fn aggregate(input: AggregationInput<'_>) -> ProposalSummary {
    aggregate_with(&DeterministicPricingEngine, input)
}

/// Prices every selected pair in service-catalog then tier-catalog order.
pub fn aggregate_with<E: PricingEngine>(
    engine: &E,
    input: AggregationInput<'_>,
) -> ProposalSummary {
    log_unreachable_selections(&input);

    let empty = Allocation::default();
    let mut rows = Vec::new();

    for service in input.services.iter() {
        for tier in input.tiers.iter() {
            let key = AllocationKey::new(service.id.clone(), tier.id.clone());
            let Some(selection) = input.selections.get(&key).filter(|selection| selection.selected)
            else {
                continue;
            };

            let allocation = input.allocations.get(&key).unwrap_or(&empty);
            let pricing = engine.price(allocation, input.rates, input.tiers, &tier.id);

            rows.push(ProposalRow {
                service_id: service.id.clone(),
                service_name: service.name.clone(),
                tier_id: tier.id.clone(),
                tier_label: tier.label.clone(),
                frequency: selection.frequency.clone(),
                pricing,
                approval: input.thresholds.classify(pricing.margin),
            });
        }
    }

    ProposalSummary::from_rows(rows, input.thresholds)
}

fn log_unreachable_selections(input: &AggregationInput<'_>) {
    for (key, selection) in input.selections {
        if !selection.selected {
            continue;
        }
        let known_service = input.services.find(&key.service_id).is_some();
        let known_tier = input.tiers.find(&key.tier_id).is_some();
        if !known_service || !known_tier {
            debug!(
                event_name = "pricing.aggregate.selection_ignored",
                service_id = %key.service_id,
                tier_id = %key.tier_id,
                known_service,
                known_tier,
                "selected pair is not in the active catalogs"
            );
        }
    }
}
