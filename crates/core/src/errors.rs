use thiserror::Error;

use crate::domain::{service::ServiceId, tier::TierId};

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum DomainError {
    #[error("unknown service `{0}`")]
    UnknownService(ServiceId),
    #[error("unknown tier `{0}`")]
    UnknownTier(TierId),
    #[error("unknown staff level `{0}`")]
    UnknownStaffLevel(String),
    #[error("unknown location class `{0}` (expected onshore|offshore)")]
    UnknownLocation(String),
    #[error("domain invariant violation: {0}")]
    InvariantViolation(String),
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ApplicationError {
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error("configuration failure: {0}")]
    Configuration(String),
    #[error("scenario input failure: {0}")]
    Input(String),
    #[error("export failure: {0}")]
    Export(String),
}

impl ApplicationError {
    /// Stable machine-readable class for command output.
    pub fn error_class(&self) -> &'static str {
        match self {
            Self::Domain(_) => "domain_validation",
            Self::Configuration(_) => "config_validation",
            Self::Input(_) => "input_validation",
            Self::Export(_) => "export",
        }
    }

    pub fn exit_code(&self) -> u8 {
        match self {
            Self::Configuration(_) => 2,
            Self::Input(_) | Self::Domain(_) => 3,
            Self::Export(_) => 4,
        }
    }

    pub fn user_message(&self) -> &'static str {
        match self {
            Self::Domain(_) => {
                "The scenario could not be priced. Check service, tier, and staff level names."
            }
            Self::Input(_) => "The input could not be read. Check the file path and its values.",
            Self::Configuration(_) => {
                "Configuration is invalid. Run `scopewise doctor` for details."
            }
            Self::Export(_) => "The proposal snapshot could not be written.",
        }
    }
}
