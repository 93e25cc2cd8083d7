pub mod catalog;
pub mod classify;
pub mod config;
pub mod doctor;
pub mod export;
pub mod price;
pub mod scenario;

use scopewise_core::config::{AppConfig, LoadOptions};
use scopewise_core::errors::ApplicationError;
use serde::Serialize;

#[derive(Debug, Clone)]
pub struct CommandResult {
    pub exit_code: u8,
    pub output: String,
}

#[derive(Debug, Serialize)]
struct CommandOutcome {
    command: String,
    status: String,
    error_class: Option<String>,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    hint: Option<String>,
}

impl CommandResult {
    pub fn success(command: &str, message: impl Into<String>) -> Self {
        let payload = CommandOutcome {
            command: command.to_string(),
            status: "ok".to_string(),
            error_class: None,
            message: message.into(),
            hint: None,
        };
        Self { exit_code: 0, output: serialize_payload(payload) }
    }

    pub fn failure(
        command: &str,
        error_class: &str,
        message: impl Into<String>,
        exit_code: u8,
    ) -> Self {
        let payload = CommandOutcome {
            command: command.to_string(),
            status: "error".to_string(),
            error_class: Some(error_class.to_string()),
            message: message.into(),
            hint: None,
        };
        Self { exit_code, output: serialize_payload(payload) }
    }

    pub fn from_error(command: &str, error: &ApplicationError) -> Self {
        let payload = CommandOutcome {
            command: command.to_string(),
            status: "error".to_string(),
            error_class: Some(error.error_class().to_string()),
            message: error.to_string(),
            hint: Some(error.user_message().to_string()),
        };
        Self { exit_code: error.exit_code(), output: serialize_payload(payload) }
    }

    /// Successful command whose output is a rendered report rather than an outcome payload.
    pub fn report(output: impl Into<String>) -> Self {
        Self { exit_code: 0, output: output.into() }
    }
}

pub(crate) fn load_config() -> Result<AppConfig, ApplicationError> {
    AppConfig::load(LoadOptions::default())
        .map_err(|error| ApplicationError::Configuration(error.to_string()))
}

pub(crate) fn render_json(command: &str, value: &impl Serialize) -> CommandResult {
    match serde_json::to_string_pretty(value) {
        Ok(output) => CommandResult::report(output),
        Err(error) => CommandResult::failure(command, "serialization", error.to_string(), 1),
    }
}

fn serialize_payload(payload: CommandOutcome) -> String {
    serde_json::to_string(&payload).unwrap_or_else(|error| {
        format!(
            "{{\"command\":\"unknown\",\"status\":\"error\",\"error_class\":\"serialization\",\"message\":\"{}\"}}",
            error.to_string().replace('\\', "\\\\").replace('"', "\\\"")
        )
    })
}
