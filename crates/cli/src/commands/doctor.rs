use rust_decimal::Decimal;
use scopewise_core::config::{AppConfig, LoadOptions};
use serde::Serialize;

use crate::commands::CommandResult;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
enum CheckStatus {
    Pass,
    Fail,
    Skipped,
}

#[derive(Debug, Serialize)]
struct DoctorCheck {
    name: &'static str,
    status: CheckStatus,
    details: String,
}

#[derive(Debug, Serialize)]
struct DoctorReport {
    overall_status: CheckStatus,
    summary: String,
    checks: Vec<DoctorCheck>,
}

const DEPENDENT_CHECKS: [&str; 3] =
    ["rate_table_completeness", "tier_catalog", "approval_thresholds"];

pub fn run(json_output: bool) -> CommandResult {
    let report = build_report();
    let exit_code = if report.overall_status == CheckStatus::Pass { 0 } else { 1 };

    if json_output {
        let output = serde_json::to_string_pretty(&report).unwrap_or_else(|error| {
            format!(
                "{{\"overall_status\":\"fail\",\"summary\":\"doctor serialization failed\",\"error\":\"{}\"}}",
                escape_json(&error.to_string())
            )
        });
        return CommandResult { exit_code, output };
    }

    CommandResult { exit_code, output: render_human(&report) }
}

fn build_report() -> DoctorReport {
    let mut checks = Vec::new();

    match AppConfig::load(LoadOptions::default()) {
        Ok(config) => {
            checks.push(DoctorCheck {
                name: "config_validation",
                status: CheckStatus::Pass,
                details: "configuration loaded and validated".to_string(),
            });
            checks.push(check_rate_table(&config));
            checks.push(check_tier_catalog(&config));
            checks.push(check_approval_thresholds(&config));
        }
        Err(error) => {
            checks.push(DoctorCheck {
                name: "config_validation",
                status: CheckStatus::Fail,
                details: error.to_string(),
            });
            for name in DEPENDENT_CHECKS {
                checks.push(DoctorCheck {
                    name,
                    status: CheckStatus::Skipped,
                    details: "skipped because configuration did not load".to_string(),
                });
            }
        }
    }

    let all_pass = checks.iter().all(|check| check.status == CheckStatus::Pass);
    let overall_status = if all_pass { CheckStatus::Pass } else { CheckStatus::Fail };
    let summary = if all_pass {
        "doctor: all readiness checks passed".to_string()
    } else {
        "doctor: one or more readiness checks failed".to_string()
    };

    DoctorReport { overall_status, summary, checks }
}

/// Missing rates silently price as zero, so an incomplete card fails here.
fn check_rate_table(config: &AppConfig) -> DoctorCheck {
    let missing = config.pricing.rates.missing_entries();
    if missing.is_empty() {
        return DoctorCheck {
            name: "rate_table_completeness",
            status: CheckStatus::Pass,
            details: "every location and staff level has a rate".to_string(),
        };
    }

    let listed: Vec<String> =
        missing.iter().map(|(location, level)| format!("{location}/{level}")).collect();
    DoctorCheck {
        name: "rate_table_completeness",
        status: CheckStatus::Fail,
        details: format!("missing rates: {}", listed.join(", ")),
    }
}

fn check_tier_catalog(config: &AppConfig) -> DoctorCheck {
    let below_cost: Vec<String> = config
        .pricing
        .tiers
        .iter()
        .filter(|tier| tier.markup_factor < Decimal::ONE)
        .map(|tier| tier.id.to_string())
        .collect();

    if !below_cost.is_empty() {
        return DoctorCheck {
            name: "tier_catalog",
            status: CheckStatus::Fail,
            details: format!("markup below 1 prices under cost: {}", below_cost.join(", ")),
        };
    }

    let tiers: Vec<String> = config
        .pricing
        .tiers
        .iter()
        .map(|tier| format!("{} x{}", tier.id, tier.markup_factor))
        .collect();
    DoctorCheck { name: "tier_catalog", status: CheckStatus::Pass, details: tiers.join(", ") }
}

fn check_approval_thresholds(config: &AppConfig) -> DoctorCheck {
    match config.approval.validate() {
        Ok(()) => DoctorCheck {
            name: "approval_thresholds",
            status: CheckStatus::Pass,
            details: format!(
                "auto-approve >= {}, director >= {}, executive below",
                config.approval.auto_approve_floor, config.approval.director_floor
            ),
        },
        Err(error) => DoctorCheck {
            name: "approval_thresholds",
            status: CheckStatus::Fail,
            details: error.to_string(),
        },
    }
}

fn render_human(report: &DoctorReport) -> String {
    let mut lines = Vec::new();
    lines.push(report.summary.clone());

    for check in &report.checks {
        let marker = match check.status {
            CheckStatus::Pass => "ok",
            CheckStatus::Fail => "fail",
            CheckStatus::Skipped => "skip",
        };
        lines.push(format!("- [{marker}] {}: {}", check.name, check.details));
    }

    lines.join("\n")
}

fn escape_json(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}
