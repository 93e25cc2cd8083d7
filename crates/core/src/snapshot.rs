use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::domain::allocation::Allocation;
use crate::domain::project::ProjectProfile;
use crate::domain::selection::Selection;
use crate::domain::service::ServiceId;
use crate::domain::tier::{Tier, TierId};
use crate::pricing::aggregate::ProposalSummary;
use crate::worksheet::ScopingWorksheet;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("could not serialize proposal snapshot: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("could not create export directory `{path}`: {source}")]
    CreateDir { path: PathBuf, source: std::io::Error },
    #[error("could not write proposal snapshot `{path}`: {source}")]
    Write { path: PathBuf, source: std::io::Error },
}

/// Portable record of a worksheet and its computed results.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProposalSnapshot {
    pub snapshot_id: Uuid,
    pub exported_at: DateTime<Utc>,
    pub project: ProjectProfile,
    pub project_duration_days: Option<i64>,
    pub tiers: Vec<Tier>,
    pub bundle: BTreeMap<ServiceId, BTreeMap<TierId, Selection>>,
    pub allocations: BTreeMap<ServiceId, BTreeMap<TierId, Allocation>>,
    pub results: ProposalSummary,
}

impl ProposalSnapshot {
    pub fn capture(worksheet: &ScopingWorksheet, exported_at: DateTime<Utc>) -> Self {
        let mut bundle: BTreeMap<ServiceId, BTreeMap<TierId, Selection>> = BTreeMap::new();
        for (key, selection) in worksheet.selections() {
            bundle
                .entry(key.service_id.clone())
                .or_default()
                .insert(key.tier_id.clone(), selection.clone());
        }

        let mut allocations: BTreeMap<ServiceId, BTreeMap<TierId, Allocation>> = BTreeMap::new();
        for (key, allocation) in worksheet.allocations() {
            allocations
                .entry(key.service_id.clone())
                .or_default()
                .insert(key.tier_id.clone(), allocation.clone());
        }

        Self {
            snapshot_id: Uuid::new_v4(),
            exported_at,
            project: worksheet.profile().clone(),
            project_duration_days: worksheet.profile().duration_days(),
            tiers: worksheet.catalogs().tiers.iter().cloned().collect(),
            bundle,
            allocations,
            results: worksheet.summary(),
        }
    }

    pub fn file_name(&self) -> String {
        format!("pricing_scope_{}.json", self.exported_at.format("%Y-%m-%d"))
    }

    pub fn to_json_pretty(&self) -> Result<String, ExportError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn write_to_dir(&self, dir: &Path) -> Result<PathBuf, ExportError> {
        fs::create_dir_all(dir)
            .map_err(|source| ExportError::CreateDir { path: dir.to_path_buf(), source })?;

        let path = dir.join(self.file_name());
        let body = self.to_json_pretty()?;
        fs::write(&path, body).map_err(|source| ExportError::Write { path: path.clone(), source })?;
        Ok(path)
    }
}
