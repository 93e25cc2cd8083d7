use std::fmt;

use serde::{Deserialize, Serialize};

/// Governance level required to sign off on a quoted margin.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApprovalTier {
    AutoApprove,
    DirectorApproval,
    ExecutiveApproval,
}

impl ApprovalTier {
    pub fn label(self) -> &'static str {
        match self {
            Self::AutoApprove => "Auto-approve",
            Self::DirectorApproval => "Director Approval",
            Self::ExecutiveApproval => "CFO / Exec Approval",
        }
    }

    pub fn requires_approval(self) -> bool {
        !matches!(self, Self::AutoApprove)
    }
}

impl fmt::Display for ApprovalTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
