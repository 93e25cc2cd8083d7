use std::path::Path;

use rust_decimal::Decimal;
use scopewise_core::domain::project::ProjectProfile;
use scopewise_core::domain::service::ServiceId;
use scopewise_core::errors::ApplicationError;
use scopewise_core::pricing::aggregate::{ProposalRow, ProposalSummary};
use scopewise_core::pricing::engine::PricingTrace;
use scopewise_core::worksheet::ScopingWorksheet;
use serde::Serialize;
use tracing::info;

use crate::commands::scenario::load_worksheet;
use crate::commands::{load_config, render_json, CommandResult};

const COMMAND: &str = "price";

#[derive(Debug, Serialize)]
struct PriceReport<'a> {
    command: &'static str,
    project: &'a ProjectProfile,
    project_duration_days: Option<i64>,
    summary: &'a ProposalSummary,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    traces: Vec<RowTrace>,
}

#[derive(Debug, Serialize)]
struct RowTrace {
    service_id: ServiceId,
    #[serde(flatten)]
    trace: PricingTrace,
}

pub fn run(scenario: &Path, json_output: bool, with_trace: bool) -> CommandResult {
    match price(scenario, json_output, with_trace) {
        Ok(result) => result,
        Err(error) => CommandResult::from_error(COMMAND, &error),
    }
}

fn price(
    scenario: &Path,
    json_output: bool,
    with_trace: bool,
) -> Result<CommandResult, ApplicationError> {
    let config = load_config()?;
    let worksheet =
        load_worksheet(scenario, config.catalogs(), config.pricing.default_admin_fee_pct)?;
    let summary = worksheet.summary();

    info!(
        event_name = "pricing.proposal.priced",
        rows = summary.rows.len(),
        total_price = %summary.total_price,
        grand_margin = %summary.grand_margin,
        approval = %summary.approval,
        "proposal priced"
    );

    let traces = if with_trace { collect_traces(&worksheet, &summary)? } else { Vec::new() };
    let report = PriceReport {
        command: COMMAND,
        project: worksheet.profile(),
        project_duration_days: worksheet.profile().duration_days(),
        summary: &summary,
        traces,
    };

    if json_output {
        return Ok(render_json(COMMAND, &report));
    }
    Ok(CommandResult::report(render_human(&report)))
}

fn collect_traces(
    worksheet: &ScopingWorksheet,
    summary: &ProposalSummary,
) -> Result<Vec<RowTrace>, ApplicationError> {
    summary
        .rows
        .iter()
        .map(|row| {
            let traced = worksheet.trace_pair(&row.service_id, &row.tier_id)?;
            Ok(RowTrace { service_id: row.service_id.clone(), trace: traced.trace })
        })
        .collect()
}

fn render_human(report: &PriceReport<'_>) -> String {
    let project = report.project;
    let mut lines = vec![format!("proposal: {} ({} office)", project.project_name, project.office)];
    if let Some(days) = report.project_duration_days {
        lines.push(format!("duration: {days} days"));
    }

    if report.summary.rows.is_empty() {
        lines.push("no services selected".to_string());
    }
    for row in &report.summary.rows {
        lines.push(render_row(row));
    }

    lines.push(format!(
        "total: cost {:.2} | price {:.2} | margin {} | {}",
        report.summary.total_cost,
        report.summary.total_price,
        percent(report.summary.grand_margin),
        report.summary.approval.label()
    ));

    let flagged = report.summary.rows_requiring_approval().count();
    if flagged > 0 {
        lines.push(format!("{flagged} line(s) need approval"));
    }

    for row in &report.traces {
        lines.push(format!("trace {} / {}:", row.service_id, row.trace.requested_tier));
        for step in &row.trace.steps {
            let amount = step.amount.round_dp(4);
            lines.push(format!("  {:<10} {:>12} ({})", step.stage, amount, step.detail));
        }
    }

    lines.join("\n")
}

fn render_row(row: &ProposalRow) -> String {
    format!(
        "- {} / {} [{}]: cost {:.2} | price {:.2} | margin {} | {}",
        row.service_name,
        row.tier_label,
        row.frequency,
        row.pricing.cost,
        row.pricing.price,
        percent(row.pricing.margin),
        row.approval.label()
    )
}

fn percent(ratio: Decimal) -> String {
    format!("{:.2}%", ratio.saturating_mul(Decimal::ONE_HUNDRED))
}
