use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::DomainError;

/// Staffing rank used as the rate-table key. Declaration order is seniority order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum StaffLevel {
    #[serde(rename = "Admin")]
    Admin,
    #[serde(rename = "Intern")]
    Intern,
    #[serde(rename = "Staff L1")]
    StaffL1,
    #[serde(rename = "Staff L2")]
    StaffL2,
    #[serde(rename = "Senior L1/2")]
    SeniorL1L2,
    #[serde(rename = "Senior L3/Supv")]
    SeniorL3Supervisor,
    #[serde(rename = "Manager")]
    Manager,
    #[serde(rename = "Sr Manager")]
    SeniorManager,
    #[serde(rename = "Director")]
    Director,
    #[serde(rename = "Partner")]
    Partner,
}

impl StaffLevel {
    pub const ALL: [StaffLevel; 10] = [
        StaffLevel::Admin,
        StaffLevel::Intern,
        StaffLevel::StaffL1,
        StaffLevel::StaffL2,
        StaffLevel::SeniorL1L2,
        StaffLevel::SeniorL3Supervisor,
        StaffLevel::Manager,
        StaffLevel::SeniorManager,
        StaffLevel::Director,
        StaffLevel::Partner,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::Admin => "Admin",
            Self::Intern => "Intern",
            Self::StaffL1 => "Staff L1",
            Self::StaffL2 => "Staff L2",
            Self::SeniorL1L2 => "Senior L1/2",
            Self::SeniorL3Supervisor => "Senior L3/Supv",
            Self::Manager => "Manager",
            Self::SeniorManager => "Sr Manager",
            Self::Director => "Director",
            Self::Partner => "Partner",
        }
    }
}

impl fmt::Display for StaffLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for StaffLevel {
    type Err = DomainError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let wanted = normalize_label(value);
        Self::ALL
            .into_iter()
            .find(|level| normalize_label(level.label()) == wanted)
            .ok_or_else(|| DomainError::UnknownStaffLevel(value.trim().to_string()))
    }
}

/// Delivery location; selects which rate column applies.
///
/// Deserializes through `FromStr`, so serialized data accepts the same labels as
/// scenario and config files.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", try_from = "String")]
pub enum LocationClass {
    Onshore,
    Offshore,
}

impl LocationClass {
    pub const ALL: [LocationClass; 2] = [LocationClass::Onshore, LocationClass::Offshore];

    pub fn label(self) -> &'static str {
        match self {
            Self::Onshore => "onshore",
            Self::Offshore => "offshore",
        }
    }
}

impl fmt::Display for LocationClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for LocationClass {
    type Err = DomainError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "onshore" | "us" => Ok(Self::Onshore),
            "offshore" => Ok(Self::Offshore),
            _ => Err(DomainError::UnknownLocation(value.trim().to_string())),
        }
    }
}

impl TryFrom<String> for LocationClass {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

fn normalize_label(value: &str) -> String {
    value.split_whitespace().collect::<Vec<_>>().join(" ").to_ascii_lowercase()
}
