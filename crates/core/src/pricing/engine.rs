use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::allocation::Allocation;
use crate::domain::tier::{Tier, TierId};
use crate::pricing::catalog::TierCatalog;
use crate::pricing::rates::RateTable;

const HUNDRED: Decimal = Decimal::ONE_HUNDRED;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricingResult {
    pub cost: Decimal,
    pub price: Decimal,
    pub margin: Decimal,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricingTraceStep {
    pub stage: String,
    pub detail: String,
    pub amount: Decimal,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricingTrace {
    pub requested_tier: TierId,
    /// Tier whose markup was applied; differs from `requested_tier` on a catalog miss.
    pub applied_tier: Option<TierId>,
    pub steps: Vec<PricingTraceStep>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TracedPricing {
    pub result: PricingResult,
    pub trace: PricingTrace,
}

pub trait PricingEngine: Send + Sync {
    fn price(
        &self,
        allocation: &Allocation,
        rates: &RateTable,
        tiers: &TierCatalog,
        tier_id: &TierId,
    ) -> PricingResult;
}

#[derive(Clone, Copy, Debug, Default)]
pub struct DeterministicPricingEngine;

impl PricingEngine for DeterministicPricingEngine {
    fn price(
        &self,
        allocation: &Allocation,
        rates: &RateTable,
        tiers: &TierCatalog,
        tier_id: &TierId,
    ) -> PricingResult {
        compute_pricing_for(allocation, rates, tiers, tier_id)
    }
}

/// Labor cost before the admin fee: sum of hours times rate over every entry.
pub fn base_cost(allocation: &Allocation, rates: &RateTable) -> Decimal {
    saturating_sum(
        allocation
            .entries()
            .map(|(location, level, hours)| hours.saturating_mul(rates.rate(location, level))),
    )
}

/// Sums without overflowing; totals past the `Decimal` range pin to `Decimal::MAX`/`MIN`.
pub fn saturating_sum(amounts: impl IntoIterator<Item = Decimal>) -> Decimal {
    amounts.into_iter().fold(Decimal::ZERO, Decimal::saturating_add)
}

/// `(price - cost) / price`, or zero when price is not positive.
pub fn margin_ratio(cost: Decimal, price: Decimal) -> Decimal {
    if price <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    price.saturating_sub(cost).checked_div(price).unwrap_or(Decimal::ZERO)
}

pub fn compute_pricing(allocation: &Allocation, rates: &RateTable, tier: &Tier) -> PricingResult {
    price_with_markup(allocation, rates, tier.markup_factor)
}

/// Resolves the markup through the catalog, falling back to its first tier on a miss.
pub fn compute_pricing_for(
    allocation: &Allocation,
    rates: &RateTable,
    tiers: &TierCatalog,
    tier_id: &TierId,
) -> PricingResult {
    price_with_markup(allocation, rates, tiers.markup_for(tier_id))
}

fn price_with_markup(allocation: &Allocation, rates: &RateTable, markup: Decimal) -> PricingResult {
    let base = base_cost(allocation, rates);
    let cost = base.saturating_add(admin_cost(base, allocation.admin_fee_pct));
    let price = cost.saturating_mul(markup);

    PricingResult { cost, price, margin: margin_ratio(cost, price) }
}

fn admin_cost(base: Decimal, admin_fee_pct: Decimal) -> Decimal {
    base.saturating_mul(admin_fee_pct) / HUNDRED
}

pub fn compute_pricing_with_trace(
    allocation: &Allocation,
    rates: &RateTable,
    tiers: &TierCatalog,
    tier_id: &TierId,
) -> TracedPricing {
    let base = base_cost(allocation, rates);
    let admin = admin_cost(base, allocation.admin_fee_pct);
    let markup = tiers.markup_for(tier_id);
    let result = price_with_markup(allocation, rates, markup);

    TracedPricing {
        result,
        trace: PricingTrace {
            requested_tier: tier_id.clone(),
            applied_tier: tiers.resolve(tier_id).map(|tier| tier.id.clone()),
            steps: vec![
                step("base_cost", "sum(hours * rate) over location and staff level", base),
                step(
                    "admin_fee",
                    &format!("base_cost * {}%", allocation.admin_fee_pct.normalize()),
                    admin,
                ),
                step("total_cost", "base_cost + admin_fee", result.cost),
                step("markup", "tier markup factor", markup),
                step("price", "total_cost * markup", result.price),
                step("margin", "(price - total_cost) / price", result.margin),
            ],
        },
    }
}

fn step(stage: &str, detail: &str, amount: Decimal) -> PricingTraceStep {
    PricingTraceStep { stage: stage.to_string(), detail: detail.to_string(), amount }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::{
        compute_pricing, compute_pricing_for, compute_pricing_with_trace, margin_ratio,
        DeterministicPricingEngine, PricingEngine, PricingResult,
    };
    use crate::domain::allocation::Allocation;
    use crate::domain::approval::ApprovalTier;
    use crate::domain::staff::{LocationClass, StaffLevel};
    use crate::domain::tier::{Tier, TierId};
    use crate::pricing::approval::classify;
    use crate::pricing::catalog::TierCatalog;
    use crate::pricing::rates::RateTable;

    fn staff_l1_allocation() -> Allocation {
        Allocation::new(Decimal::new(5, 0)).with_hours(
            LocationClass::Onshore,
            StaffLevel::StaffL1,
            Decimal::new(10, 0),
        )
    }

    fn flat_rates() -> RateTable {
        RateTable::new().with_rate(
            LocationClass::Onshore,
            StaffLevel::StaffL1,
            Decimal::new(100, 0),
        )
    }

    #[test]
    fn zero_hours_price_to_zero_for_every_tier() {
        let allocation = Allocation::new(Decimal::new(5, 0));
        let rates = RateTable::standard();

        for tier in TierCatalog::standard().iter() {
            assert_eq!(compute_pricing(&allocation, &rates, tier), PricingResult::default());
        }
    }

    #[test]
    fn staff_l1_scenario_lands_on_director_boundary() {
        let tiers = TierCatalog::standard();
        let traced = compute_pricing_with_trace(
            &staff_l1_allocation(),
            &flat_rates(),
            &tiers,
            &TierId::new("essential"),
        );

        let amounts: Vec<Decimal> = traced.trace.steps.iter().map(|step| step.amount).collect();
        assert_eq!(amounts[0], Decimal::new(1000, 0));
        assert_eq!(amounts[1], Decimal::new(50, 0));
        assert_eq!(traced.result.cost, Decimal::new(1050, 0));
        assert_eq!(traced.result.price, Decimal::new(13125, 1));
        assert_eq!(traced.result.margin, Decimal::new(2, 1));
        assert_eq!(classify(traced.result.margin), ApprovalTier::DirectorApproval);
    }

    #[test]
    fn price_is_cost_times_markup() {
        let allocation = Allocation::new(Decimal::new(75, 1))
            .with_hours(LocationClass::Onshore, StaffLevel::Manager, Decimal::new(125, 1))
            .with_hours(LocationClass::Offshore, StaffLevel::StaffL2, Decimal::new(40, 0));
        let rates = RateTable::standard();

        for tier in TierCatalog::standard().iter() {
            let result = compute_pricing(&allocation, &rates, tier);
            assert_eq!(result.price, result.cost * tier.markup_factor);
        }
    }

    #[test]
    fn margin_does_not_decrease_as_markup_rises() {
        let allocation = staff_l1_allocation();
        let rates = flat_rates();
        let markups = [100, 110, 125, 135, 150, 200, 300];

        let margins: Vec<Decimal> = markups
            .iter()
            .map(|markup| {
                let tier = Tier::new("t", "T", Decimal::new(*markup, 2));
                compute_pricing(&allocation, &rates, &tier).margin
            })
            .collect();

        assert!(margins.windows(2).all(|pair| pair[0] <= pair[1]));
        assert_eq!(margins[0], Decimal::ZERO);
    }

    #[test]
    fn unknown_tier_prices_like_first_catalog_tier() {
        let tiers = TierCatalog::standard();
        let allocation = staff_l1_allocation();
        let rates = RateTable::standard();

        let unknown = compute_pricing_for(&allocation, &rates, &tiers, &TierId::new("platinum"));
        let first = compute_pricing_for(&allocation, &rates, &tiers, &TierId::new("essential"));
        assert_eq!(unknown, first);

        let traced =
            compute_pricing_with_trace(&allocation, &rates, &tiers, &TierId::new("platinum"));
        assert_eq!(traced.trace.applied_tier, Some(TierId::new("essential")));
    }

    #[test]
    fn rate_table_miss_contributes_nothing() {
        let allocation = staff_l1_allocation().with_hours(
            LocationClass::Offshore,
            StaffLevel::Partner,
            Decimal::new(30, 0),
        );

        let with_miss = compute_pricing_for(
            &allocation,
            &flat_rates(),
            &TierCatalog::standard(),
            &TierId::new("essential"),
        );
        assert_eq!(with_miss.cost, Decimal::new(1050, 0));
    }

    #[test]
    fn negative_hours_flow_through_and_clamp_margin_to_zero() {
        let allocation = Allocation::new(Decimal::ZERO).with_hours(
            LocationClass::Onshore,
            StaffLevel::StaffL1,
            Decimal::new(-2, 0),
        );
        let result = compute_pricing_for(
            &allocation,
            &flat_rates(),
            &TierCatalog::standard(),
            &TierId::new("enhanced"),
        );

        assert_eq!(result.cost, Decimal::new(-200, 0));
        assert_eq!(result.price, Decimal::new(-270, 0));
        assert_eq!(result.margin, Decimal::ZERO);
    }

    #[test]
    fn hours_past_decimal_range_saturate_instead_of_overflowing() {
        let hours = "1000000000000000000000000000".parse::<Decimal>().expect("hours");
        let allocation = Allocation::new(Decimal::new(5, 0)).with_hours(
            LocationClass::Onshore,
            StaffLevel::Partner,
            hours,
        );

        let result = compute_pricing_for(
            &allocation,
            &RateTable::standard(),
            &TierCatalog::standard(),
            &TierId::new("essential"),
        );

        assert_eq!(result.cost, Decimal::MAX);
        assert_eq!(result.price, Decimal::MAX);
        assert_eq!(result.margin, Decimal::ZERO);
        assert_eq!(classify(result.margin), ApprovalTier::ExecutiveApproval);

        let traced = compute_pricing_with_trace(
            &allocation,
            &RateTable::standard(),
            &TierCatalog::standard(),
            &TierId::new("essential"),
        );
        assert_eq!(traced.result, result);
    }

    #[test]
    fn margin_ratio_handles_zero_price() {
        assert_eq!(margin_ratio(Decimal::new(10, 0), Decimal::ZERO), Decimal::ZERO);
        assert_eq!(margin_ratio(Decimal::new(150, 0), Decimal::new(100, 0)), Decimal::new(-5, 1));
    }

    #[test]
    fn deterministic_engine_delegates_to_catalog_lookup() {
        let engine = DeterministicPricingEngine;
        let tiers = TierCatalog::standard();
        let result = engine.price(
            &staff_l1_allocation(),
            &flat_rates(),
            &tiers,
            &TierId::new("ultimate"),
        );

        assert_eq!(result.price, Decimal::new(1575, 0));
        assert!(result.margin > Decimal::new(333, 3) && result.margin < Decimal::new(334, 3));
    }
}
