use std::path::{Path, PathBuf};

use chrono::Utc;
use scopewise_core::errors::ApplicationError;
use scopewise_core::snapshot::ProposalSnapshot;
use tracing::info;

use crate::commands::scenario::load_worksheet;
use crate::commands::{load_config, CommandResult};

const COMMAND: &str = "export";

pub fn run(scenario: &Path, out_dir: Option<PathBuf>) -> CommandResult {
    match export(scenario, out_dir) {
        Ok(path) => {
            let message = format!("wrote proposal snapshot to {}", path.display());
            CommandResult::success(COMMAND, message)
        }
        Err(error) => CommandResult::from_error(COMMAND, &error),
    }
}

fn export(scenario: &Path, out_dir: Option<PathBuf>) -> Result<PathBuf, ApplicationError> {
    let config = load_config()?;
    let worksheet =
        load_worksheet(scenario, config.catalogs(), config.pricing.default_admin_fee_pct)?;

    let snapshot = ProposalSnapshot::capture(&worksheet, Utc::now());
    let target = out_dir.unwrap_or(config.export.output_dir);
    let path = snapshot
        .write_to_dir(&target)
        .map_err(|error| ApplicationError::Export(error.to_string()))?;

    info!(
        event_name = "export.snapshot.written",
        snapshot_id = %snapshot.snapshot_id,
        path = %path.display(),
        rows = snapshot.results.rows.len(),
        "proposal snapshot written"
    );
    Ok(path)
}
