use rust_decimal::Decimal;
use scopewise_core::errors::ApplicationError;

use crate::commands::{load_config, CommandResult};

const COMMAND: &str = "classify";

pub fn run(margin: &str) -> CommandResult {
    let config = match load_config() {
        Ok(config) => config,
        Err(error) => return CommandResult::from_error(COMMAND, &error),
    };

    let margin = match margin.trim().parse::<Decimal>() {
        Ok(margin) => margin,
        Err(_) => {
            let error = ApplicationError::Input(format!(
                "margin must be a decimal ratio such as 0.25, got `{margin}`"
            ));
            return CommandResult::from_error(COMMAND, &error);
        }
    };

    let tier = config.approval.classify(margin);
    CommandResult::success(COMMAND, format!("margin {margin} -> {}", tier.label()))
}
