use std::fmt;

use serde::{Deserialize, Serialize};

/// Billing cadence label shown next to a row. Carried through untouched.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Frequency(pub String);

impl Frequency {
    pub const STANDARD_OPTIONS: [&'static str; 5] =
        ["N/A", "Annually", "Quarterly", "Monthly", "Annual/State"];

    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for Frequency {
    fn default() -> Self {
        Self("Annually".to_string())
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
    pub selected: bool,
    pub frequency: Frequency,
}

impl Selection {
    pub fn selected(frequency: Frequency) -> Self {
        Self { selected: true, frequency }
    }
}
