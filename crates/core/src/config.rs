use std::collections::{BTreeMap, BTreeSet};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::project::DEFAULT_ADMIN_FEE_PCT;
use crate::domain::service::Service;
use crate::domain::staff::{LocationClass, StaffLevel};
use crate::domain::tier::Tier;
use crate::pricing::approval::ApprovalThresholds;
use crate::pricing::catalog::{ServiceCatalog, TierCatalog};
use crate::pricing::rates::RateTable;
use crate::pricing::PricingCatalogs;

pub const CONFIG_FILE_CANDIDATES: [&str; 2] = ["scopewise.toml", "config/scopewise.toml"];

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub pricing: PricingConfig,
    pub approval: ApprovalThresholds,
    pub export: ExportConfig,
    pub logging: LoggingConfig,
}

#[derive(Clone, Debug)]
pub struct PricingConfig {
    pub default_admin_fee_pct: Decimal,
    pub tiers: TierCatalog,
    pub services: ServiceCatalog,
    pub rates: RateTable,
}

#[derive(Clone, Debug)]
pub struct ExportConfig {
    pub output_dir: PathBuf,
}

#[derive(Clone, Debug)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    Compact,
    Pretty,
    Json,
}

#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    pub default_admin_fee_pct: Option<Decimal>,
    pub director_floor: Option<Decimal>,
    pub auto_approve_floor: Option<Decimal>,
    pub export_dir: Option<PathBuf>,
    pub log_level: Option<String>,
    pub log_format: Option<LogFormat>,
}

#[derive(Clone, Debug, Default)]
pub struct LoadOptions {
    pub config_path: Option<PathBuf>,
    pub require_file: bool,
    pub overrides: ConfigOverrides,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file `{path}`: {source}")]
    ReadFile { path: PathBuf, source: std::io::Error },
    #[error("could not parse config file `{path}`: {source}")]
    ParseFile { path: PathBuf, source: toml::de::Error },
    #[error("required config file was not found: `{0}`")]
    MissingConfigFile(PathBuf),
    #[error("environment variable interpolation failed for `{var}`")]
    MissingEnvInterpolation { var: String },
    #[error("unterminated environment interpolation expression")]
    UnterminatedInterpolation,
    #[error("invalid environment override for `{key}`: `{value}`")]
    InvalidEnvOverride { key: String, value: String },
    #[error("configuration validation failed: {0}")]
    Validation(String),
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            pricing: PricingConfig {
                default_admin_fee_pct: DEFAULT_ADMIN_FEE_PCT,
                tiers: TierCatalog::standard(),
                services: ServiceCatalog::standard(),
                rates: RateTable::standard(),
            },
            approval: ApprovalThresholds::default(),
            export: ExportConfig { output_dir: PathBuf::from(".") },
            logging: LoggingConfig { level: "info".to_string(), format: LogFormat::Compact },
        }
    }
}

impl std::str::FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "compact" => Ok(Self::Compact),
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(ConfigError::Validation(format!(
                "unsupported log format `{other}` (expected compact|pretty|json)"
            ))),
        }
    }
}

impl AppConfig {
    pub fn load(options: LoadOptions) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        let maybe_path = resolve_config_path(options.config_path.as_deref());

        if let Some(path) = maybe_path {
            let patch = read_patch(&path)?;
            config.apply_patch(patch)?;
        } else if options.require_file {
            let expected =
                options.config_path.unwrap_or_else(|| PathBuf::from(CONFIG_FILE_CANDIDATES[0]));
            return Err(ConfigError::MissingConfigFile(expected));
        }

        config.apply_env_overrides()?;
        config.apply_overrides(options.overrides);
        config.validate()?;

        Ok(config)
    }

    pub fn catalogs(&self) -> PricingCatalogs {
        PricingCatalogs {
            services: self.pricing.services.clone(),
            tiers: self.pricing.tiers.clone(),
            rates: self.pricing.rates.clone(),
            thresholds: self.approval,
        }
    }

    fn apply_patch(&mut self, patch: ConfigPatch) -> Result<(), ConfigError> {
        if let Some(pricing) = patch.pricing {
            if let Some(default_admin_fee_pct) = pricing.default_admin_fee_pct {
                self.pricing.default_admin_fee_pct = default_admin_fee_pct;
            }
            if let Some(tiers) = pricing.tiers {
                self.pricing.tiers = TierCatalog::new(
                    tiers
                        .into_iter()
                        .map(|tier| Tier::new(tier.id, tier.label, tier.markup_factor))
                        .collect(),
                );
            }
            if let Some(services) = pricing.services {
                self.pricing.services = ServiceCatalog::new(
                    services
                        .into_iter()
                        .map(|service| Service::new(service.id, service.name))
                        .collect(),
                );
            }
            if let Some(rates) = pricing.rates {
                if pricing.replace_rates.unwrap_or(false) {
                    self.pricing.rates = RateTable::new();
                }
                apply_rate_patch(&mut self.pricing.rates, rates)?;
            }
        }

        if let Some(approval) = patch.approval {
            if let Some(director_floor) = approval.director_floor {
                self.approval.director_floor = director_floor;
            }
            if let Some(auto_approve_floor) = approval.auto_approve_floor {
                self.approval.auto_approve_floor = auto_approve_floor;
            }
        }

        if let Some(export) = patch.export {
            if let Some(output_dir) = export.output_dir {
                self.export.output_dir = output_dir;
            }
        }

        if let Some(logging) = patch.logging {
            if let Some(level) = logging.level {
                self.logging.level = level;
            }
            if let Some(format) = logging.format {
                self.logging.format = format;
            }
        }

        Ok(())
    }

    fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Some(value) = read_env("SCOPEWISE_DEFAULT_ADMIN_FEE_PCT") {
            self.pricing.default_admin_fee_pct =
                parse_decimal("SCOPEWISE_DEFAULT_ADMIN_FEE_PCT", &value)?;
        }

        if let Some(value) = read_env("SCOPEWISE_APPROVAL_DIRECTOR_FLOOR") {
            self.approval.director_floor =
                parse_decimal("SCOPEWISE_APPROVAL_DIRECTOR_FLOOR", &value)?;
        }
        if let Some(value) = read_env("SCOPEWISE_APPROVAL_AUTO_APPROVE_FLOOR") {
            self.approval.auto_approve_floor =
                parse_decimal("SCOPEWISE_APPROVAL_AUTO_APPROVE_FLOOR", &value)?;
        }

        if let Some(value) = read_env("SCOPEWISE_EXPORT_DIR") {
            self.export.output_dir = PathBuf::from(value);
        }

        let log_level =
            read_env("SCOPEWISE_LOGGING_LEVEL").or_else(|| read_env("SCOPEWISE_LOG_LEVEL"));
        if let Some(value) = log_level {
            self.logging.level = value;
        }
        let log_format =
            read_env("SCOPEWISE_LOGGING_FORMAT").or_else(|| read_env("SCOPEWISE_LOG_FORMAT"));
        if let Some(value) = log_format {
            self.logging.format = value.parse()?;
        }

        Ok(())
    }

    fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(default_admin_fee_pct) = overrides.default_admin_fee_pct {
            self.pricing.default_admin_fee_pct = default_admin_fee_pct;
        }
        if let Some(director_floor) = overrides.director_floor {
            self.approval.director_floor = director_floor;
        }
        if let Some(auto_approve_floor) = overrides.auto_approve_floor {
            self.approval.auto_approve_floor = auto_approve_floor;
        }
        if let Some(export_dir) = overrides.export_dir {
            self.export.output_dir = export_dir;
        }
        if let Some(log_level) = overrides.log_level {
            self.logging.level = log_level;
        }
        if let Some(log_format) = overrides.log_format {
            self.logging.format = log_format;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_pricing(&self.pricing)?;
        self.approval
            .validate()
            .map_err(|error| ConfigError::Validation(format!("approval: {error}")))?;
        validate_export(&self.export)?;
        validate_logging(&self.logging)?;
        Ok(())
    }
}

pub fn resolve_config_path(explicit_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit_path {
        return path.exists().then_some(path.to_path_buf());
    }

    CONFIG_FILE_CANDIDATES.into_iter().map(PathBuf::from).find(|path| path.exists())
}

fn read_patch(path: &Path) -> Result<ConfigPatch, ConfigError> {
    let raw = fs::read_to_string(path)
        .map_err(|source| ConfigError::ReadFile { path: path.to_path_buf(), source })?;

    let interpolated = interpolate_env_vars(&raw)?;
    toml::from_str::<ConfigPatch>(&interpolated)
        .map_err(|source| ConfigError::ParseFile { path: path.to_path_buf(), source })
}

fn interpolate_env_vars(input: &str) -> Result<String, ConfigError> {
    let mut output = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '$' && matches!(chars.peek(), Some('{')) {
            chars.next();
            let mut key = String::new();

            loop {
                match chars.next() {
                    Some('}') => break,
                    Some(next) => key.push(next),
                    None => return Err(ConfigError::UnterminatedInterpolation),
                }
            }

            let value = env::var(&key)
                .map_err(|_| ConfigError::MissingEnvInterpolation { var: key.clone() })?;
            output.push_str(&value);
            continue;
        }

        output.push(ch);
    }

    Ok(output)
}

fn apply_rate_patch(
    rates: &mut RateTable,
    patch: BTreeMap<String, BTreeMap<String, Decimal>>,
) -> Result<(), ConfigError> {
    for (location, levels) in patch {
        let location = location
            .parse::<LocationClass>()
            .map_err(|error| ConfigError::Validation(format!("pricing.rates: {error}")))?;
        for (level, rate) in levels {
            let level = level
                .parse::<StaffLevel>()
                .map_err(|error| ConfigError::Validation(format!("pricing.rates: {error}")))?;
            rates.set_rate(location, level, rate);
        }
    }
    Ok(())
}

fn validate_pricing(pricing: &PricingConfig) -> Result<(), ConfigError> {
    let fee = pricing.default_admin_fee_pct;
    if fee < Decimal::ZERO || fee > Decimal::ONE_HUNDRED {
        return Err(ConfigError::Validation(
            "pricing.default_admin_fee_pct must be in range 0..=100".to_string(),
        ));
    }

    if pricing.tiers.is_empty() {
        return Err(ConfigError::Validation(
            "pricing.tiers must define at least one tier".to_string(),
        ));
    }
    let mut tier_ids = BTreeSet::new();
    for tier in pricing.tiers.iter() {
        if tier.id.as_str().trim().is_empty() {
            return Err(ConfigError::Validation("pricing.tiers entries need an id".to_string()));
        }
        if !tier_ids.insert(tier.id.clone()) {
            return Err(ConfigError::Validation(format!(
                "pricing.tiers contains duplicate id `{}`",
                tier.id
            )));
        }
        if tier.markup_factor <= Decimal::ZERO {
            return Err(ConfigError::Validation(format!(
                "pricing.tiers `{}` markup_factor must be greater than zero",
                tier.id
            )));
        }
    }

    let mut service_ids = BTreeSet::new();
    for service in pricing.services.iter() {
        if service.id.as_str().trim().is_empty() {
            return Err(ConfigError::Validation(
                "pricing.services entries need an id".to_string(),
            ));
        }
        if !service_ids.insert(service.id.clone()) {
            return Err(ConfigError::Validation(format!(
                "pricing.services contains duplicate id `{}`",
                service.id
            )));
        }
    }

    if let Some((location, level, rate)) = pricing.rates.negative_entries().into_iter().next() {
        return Err(ConfigError::Validation(format!(
            "pricing.rates.{location} `{level}` must not be negative (got {rate})"
        )));
    }

    Ok(())
}

fn validate_export(export: &ExportConfig) -> Result<(), ConfigError> {
    if export.output_dir.as_os_str().is_empty() {
        return Err(ConfigError::Validation("export.output_dir must not be empty".to_string()));
    }
    Ok(())
}

fn validate_logging(logging: &LoggingConfig) -> Result<(), ConfigError> {
    let level = logging.level.trim().to_ascii_lowercase();
    match level.as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => Ok(()),
        _ => Err(ConfigError::Validation(
            "logging.level must be one of trace|debug|info|warn|error".to_string(),
        )),
    }
}

fn read_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn parse_decimal(key: &str, value: &str) -> Result<Decimal, ConfigError> {
    value.trim().parse::<Decimal>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

#[derive(Debug, Default, Deserialize)]
struct ConfigPatch {
    pricing: Option<PricingPatch>,
    approval: Option<ApprovalPatch>,
    export: Option<ExportPatch>,
    logging: Option<LoggingPatch>,
}

#[derive(Debug, Default, Deserialize)]
struct PricingPatch {
    default_admin_fee_pct: Option<Decimal>,
    tiers: Option<Vec<TierPatch>>,
    services: Option<Vec<ServicePatch>>,
    /// Drop the built-in rate card before applying `rates`.
    replace_rates: Option<bool>,
    rates: Option<BTreeMap<String, BTreeMap<String, Decimal>>>,
}

#[derive(Debug, Deserialize)]
struct TierPatch {
    id: String,
    label: String,
    markup_factor: Decimal,
}

#[derive(Debug, Deserialize)]
struct ServicePatch {
    id: String,
    name: String,
}

#[derive(Debug, Default, Deserialize)]
struct ApprovalPatch {
    director_floor: Option<Decimal>,
    auto_approve_floor: Option<Decimal>,
}

#[derive(Debug, Default, Deserialize)]
struct ExportPatch {
    output_dir: Option<PathBuf>,
}

#[derive(Debug, Default, Deserialize)]
struct LoggingPatch {
    level: Option<String>,
    format: Option<LogFormat>,
}
