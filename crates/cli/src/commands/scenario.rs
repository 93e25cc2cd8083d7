use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use rust_decimal::Decimal;
use scopewise_core::domain::project::ProjectProfile;
use scopewise_core::domain::selection::Frequency;
use scopewise_core::domain::service::ServiceId;
use scopewise_core::domain::staff::{LocationClass, StaffLevel};
use scopewise_core::domain::tier::TierId;
use scopewise_core::errors::{ApplicationError, DomainError};
use scopewise_core::pricing::PricingCatalogs;
use scopewise_core::worksheet::{coerce_non_negative, ScopingWorksheet};
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum ScenarioError {
    #[error("could not read scenario `{path}`: {source}")]
    Read { path: PathBuf, source: std::io::Error },
    #[error("could not parse scenario `{path}`: {message}")]
    Parse { path: PathBuf, message: String },
    #[error("scenario line {line}: {source}")]
    Domain { line: usize, source: DomainError },
}

impl From<ScenarioError> for ApplicationError {
    fn from(error: ScenarioError) -> Self {
        ApplicationError::Input(error.to_string())
    }
}

/// Scenario document: a `[project]` table plus `[[line]]` entries.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ScenarioFile {
    pub project: ScenarioProject,
    #[serde(rename = "line", alias = "lines")]
    pub lines: Vec<ScenarioLine>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ScenarioProject {
    pub office: Option<String>,
    pub project_name: Option<String>,
    pub customer_name: Option<String>,
    pub benchmark: Option<String>,
    pub service_type: Option<String>,
    pub industry: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub admin_fee_pct: Option<Decimal>,
}

#[derive(Debug, Deserialize)]
pub struct ScenarioLine {
    pub service: String,
    pub tier: String,
    /// Lines default to selected; `false` keeps the hours without pricing them.
    #[serde(default)]
    pub selected: Option<bool>,
    #[serde(default)]
    pub frequency: Option<String>,
    #[serde(default)]
    pub admin_fee_pct: Option<Decimal>,
    /// location label -> staff level label -> hours
    #[serde(default)]
    pub hours: BTreeMap<String, BTreeMap<String, Decimal>>,
}

impl ScenarioFile {
    /// `.json` files are read as JSON; anything else as TOML.
    pub fn load(path: &Path) -> Result<Self, ScenarioError> {
        let raw = fs::read_to_string(path)
            .map_err(|source| ScenarioError::Read { path: path.to_path_buf(), source })?;

        let is_json = path
            .extension()
            .and_then(|extension| extension.to_str())
            .is_some_and(|extension| extension.eq_ignore_ascii_case("json"));

        let parsed = if is_json { Self::parse_json(&raw) } else { Self::parse_toml(&raw) };
        parsed.map_err(|message| ScenarioError::Parse { path: path.to_path_buf(), message })
    }

    pub fn parse_toml(raw: &str) -> Result<Self, String> {
        toml::from_str(raw).map_err(|error| error.to_string())
    }

    pub fn parse_json(raw: &str) -> Result<Self, String> {
        serde_json::from_str(raw).map_err(|error| error.to_string())
    }

    /// Applies every line to a fresh worksheet. Later lines for the same pair
    /// overwrite the hours they name.
    pub fn into_worksheet(
        self,
        catalogs: PricingCatalogs,
        default_admin_fee_pct: Decimal,
    ) -> Result<ScopingWorksheet, ScenarioError> {
        let profile = self.project.into_profile(default_admin_fee_pct);
        let mut worksheet = ScopingWorksheet::new(profile, catalogs);

        for (index, line) in self.lines.into_iter().enumerate() {
            let line_number = index + 1;
            line.apply(&mut worksheet)
                .map_err(|source| ScenarioError::Domain { line: line_number, source })?;
        }

        debug!(
            event_name = "scenario.loaded",
            selected = worksheet.selected_count(),
            "scenario applied to worksheet"
        );
        Ok(worksheet)
    }
}

impl ScenarioProject {
    fn into_profile(self, default_admin_fee_pct: Decimal) -> ProjectProfile {
        let defaults = ProjectProfile::default();
        ProjectProfile {
            office: self.office.unwrap_or(defaults.office),
            project_name: self.project_name.unwrap_or(defaults.project_name),
            customer_name: self.customer_name.unwrap_or(defaults.customer_name),
            benchmark: self.benchmark.or(defaults.benchmark),
            service_type: self.service_type.unwrap_or(defaults.service_type),
            industry: self.industry.unwrap_or(defaults.industry),
            start_date: self.start_date,
            end_date: self.end_date,
            admin_fee_pct: coerce_non_negative(
                self.admin_fee_pct.unwrap_or(default_admin_fee_pct),
            ),
        }
    }
}

impl ScenarioLine {
    fn apply(self, worksheet: &mut ScopingWorksheet) -> Result<(), DomainError> {
        let service = ServiceId::new(self.service.trim());
        let tier = TierId::new(self.tier.trim());

        for (location, levels) in &self.hours {
            let location = location.parse::<LocationClass>()?;
            for (level, hours) in levels {
                let level = level.parse::<StaffLevel>()?;
                worksheet.set_hours(&service, &tier, location, level, *hours)?;
            }
        }

        if let Some(admin_fee_pct) = self.admin_fee_pct {
            worksheet.set_admin_fee_pct(&service, &tier, admin_fee_pct)?;
        }

        let frequency = self.frequency.map(Frequency::new).unwrap_or_default();
        if !Frequency::STANDARD_OPTIONS.contains(&frequency.as_str()) {
            debug!(
                event_name = "scenario.frequency.nonstandard",
                service_id = %service,
                frequency = %frequency,
                "frequency label is not one of the standard options"
            );
        }
        if self.selected.unwrap_or(true) {
            worksheet.select(&service, &tier, frequency)
        } else {
            worksheet.deselect(&service, &tier)?;
            worksheet.set_frequency(&service, &tier, frequency)
        }
    }
}

pub fn load_worksheet(
    path: &Path,
    catalogs: PricingCatalogs,
    default_admin_fee_pct: Decimal,
) -> Result<ScopingWorksheet, ScenarioError> {
    ScenarioFile::load(path)?.into_worksheet(catalogs, default_admin_fee_pct)
}
