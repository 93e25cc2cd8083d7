use std::env;
use std::fs;
use std::path::Path;

use scopewise_core::config::{resolve_config_path, AppConfig, LoadOptions};
use toml::Value;

pub fn run() -> String {
    let config = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => config,
        Err(error) => return format!("config validation failed: {error}"),
    };

    let config_file_path = resolve_config_path(None);
    let config_file_doc = load_config_file_doc(config_file_path.as_deref());
    let source = |key_path: &str, env_keys: &[&str]| {
        field_source(key_path, env_keys, config_file_doc.as_ref(), config_file_path.as_deref())
    };

    let mut lines = vec!["effective config (source precedence: env > file > default):".to_string()];

    lines.push(render_line(
        "pricing.default_admin_fee_pct",
        &config.pricing.default_admin_fee_pct.to_string(),
        source("pricing.default_admin_fee_pct", &["SCOPEWISE_DEFAULT_ADMIN_FEE_PCT"]),
    ));

    let tiers: Vec<String> = config
        .pricing
        .tiers
        .iter()
        .map(|tier| format!("{} x{}", tier.id, tier.markup_factor))
        .collect();
    lines.push(render_line("pricing.tiers", &tiers.join(", "), source("pricing.tiers", &[])));

    let services: Vec<&str> =
        config.pricing.services.iter().map(|service| service.id.as_str()).collect();
    lines.push(render_line(
        "pricing.services",
        &services.join(", "),
        source("pricing.services", &[]),
    ));

    let missing = config.pricing.rates.missing_entries().len();
    let rates_summary = if missing == 0 {
        "complete".to_string()
    } else {
        format!("{missing} missing entries")
    };
    lines.push(render_line("pricing.rates", &rates_summary, source("pricing.rates", &[])));

    lines.push(render_line(
        "approval.director_floor",
        &config.approval.director_floor.to_string(),
        source("approval.director_floor", &["SCOPEWISE_APPROVAL_DIRECTOR_FLOOR"]),
    ));
    lines.push(render_line(
        "approval.auto_approve_floor",
        &config.approval.auto_approve_floor.to_string(),
        source("approval.auto_approve_floor", &["SCOPEWISE_APPROVAL_AUTO_APPROVE_FLOOR"]),
    ));

    lines.push(render_line(
        "export.output_dir",
        &config.export.output_dir.display().to_string(),
        source("export.output_dir", &["SCOPEWISE_EXPORT_DIR"]),
    ));

    lines.push(render_line(
        "logging.level",
        &config.logging.level,
        source("logging.level", &["SCOPEWISE_LOGGING_LEVEL", "SCOPEWISE_LOG_LEVEL"]),
    ));
    lines.push(render_line(
        "logging.format",
        &format!("{:?}", config.logging.format),
        source("logging.format", &["SCOPEWISE_LOGGING_FORMAT", "SCOPEWISE_LOG_FORMAT"]),
    ));

    lines.join("\n")
}

fn load_config_file_doc(path: Option<&Path>) -> Option<Value> {
    let path = path?;
    let raw = fs::read_to_string(path).ok()?;
    raw.parse::<Value>().ok()
}

fn field_source(
    key_path: &str,
    env_keys: &[&str],
    config_file_doc: Option<&Value>,
    config_file_path: Option<&Path>,
) -> String {
    if let Some(env_key) = env_keys.iter().find(|key| env::var_os(key).is_some()) {
        return format!("env ({env_key})");
    }

    if let Some(doc) = config_file_doc {
        if contains_path(doc, key_path) {
            let file_path = config_file_path
                .map(|path| path.display().to_string())
                .unwrap_or_else(|| "config file".to_string());
            return format!("file ({file_path})");
        }
    }

    "default".to_string()
}

fn contains_path(root: &Value, key_path: &str) -> bool {
    let mut current = root;
    for key in key_path.split('.') {
        let Some(next) = current.get(key) else {
            return false;
        };
        current = next;
    }
    true
}

fn render_line(key: &str, value: &str, source: String) -> String {
    format!("- {key} = {value} (source: {source})")
}
