use rust_decimal::Decimal;
use scopewise_core::domain::service::Service;
use scopewise_core::domain::staff::{LocationClass, StaffLevel};
use scopewise_core::domain::tier::Tier;
use scopewise_core::pricing::approval::ApprovalThresholds;
use scopewise_core::pricing::PricingCatalogs;
use serde::Serialize;

use crate::commands::{load_config, render_json, CommandResult};

const COMMAND: &str = "catalog";

#[derive(Debug, Serialize)]
struct CatalogReport<'a> {
    services: Vec<&'a Service>,
    tiers: Vec<&'a Tier>,
    rates: Vec<RateRow>,
    thresholds: &'a ApprovalThresholds,
}

#[derive(Debug, Serialize)]
struct RateRow {
    staff_level: StaffLevel,
    onshore: Decimal,
    offshore: Decimal,
}

pub fn run(json_output: bool) -> CommandResult {
    let catalogs = match load_config() {
        Ok(config) => config.catalogs(),
        Err(error) => return CommandResult::from_error(COMMAND, &error),
    };

    let report = CatalogReport {
        services: catalogs.services.iter().collect(),
        tiers: catalogs.tiers.iter().collect(),
        rates: rate_rows(&catalogs),
        thresholds: &catalogs.thresholds,
    };

    if json_output {
        return render_json(COMMAND, &report);
    }

    CommandResult::report(render_human(&report))
}

fn rate_rows(catalogs: &PricingCatalogs) -> Vec<RateRow> {
    StaffLevel::ALL
        .into_iter()
        .map(|level| RateRow {
            staff_level: level,
            onshore: catalogs.rates.rate(LocationClass::Onshore, level),
            offshore: catalogs.rates.rate(LocationClass::Offshore, level),
        })
        .collect()
}

fn render_human(report: &CatalogReport<'_>) -> String {
    let mut lines = vec!["services:".to_string()];
    for service in &report.services {
        lines.push(format!("- {}: {}", service.id, service.name));
    }

    lines.push("tiers:".to_string());
    for tier in &report.tiers {
        lines.push(format!("- {}: {} (markup x{})", tier.id, tier.label, tier.markup_factor));
    }

    lines.push("hourly rates (onshore / offshore):".to_string());
    for row in &report.rates {
        lines.push(format!(
            "- {:<15} {:>8.2} / {:>8.2}",
            row.staff_level.label(),
            row.onshore,
            row.offshore
        ));
    }

    lines.push(format!(
        "approval: auto-approve at margin >= {}, director approval at >= {}",
        report.thresholds.auto_approve_floor, report.thresholds.director_floor
    ));

    lines.join("\n")
}
