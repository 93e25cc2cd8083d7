use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::approval::ApprovalTier;
use crate::errors::DomainError;

pub const DEFAULT_DIRECTOR_FLOOR: Decimal = Decimal::from_parts(20, 0, 0, false, 2);
pub const DEFAULT_AUTO_APPROVE_FLOOR: Decimal = Decimal::from_parts(30, 0, 0, false, 2);

/// Lowest margin (inclusive) that still qualifies for each approval band.
/// Anything below `director_floor` needs executive sign-off.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApprovalThresholds {
    pub director_floor: Decimal,
    pub auto_approve_floor: Decimal,
}

impl Default for ApprovalThresholds {
    fn default() -> Self {
        Self {
            director_floor: DEFAULT_DIRECTOR_FLOOR,
            auto_approve_floor: DEFAULT_AUTO_APPROVE_FLOOR,
        }
    }
}

impl ApprovalThresholds {
    pub fn validate(&self) -> Result<(), DomainError> {
        let in_unit_range = |value: Decimal| value >= Decimal::ZERO && value <= Decimal::ONE;
        if !in_unit_range(self.director_floor) || !in_unit_range(self.auto_approve_floor) {
            return Err(DomainError::InvariantViolation(
                "approval floors must be within 0..=1".to_string(),
            ));
        }

        if self.director_floor > self.auto_approve_floor {
            return Err(DomainError::InvariantViolation(format!(
                "director floor {} is above auto-approve floor {}",
                self.director_floor, self.auto_approve_floor
            )));
        }

        Ok(())
    }

    /// Bands ordered from the highest floor down.
    fn bands(&self) -> [(Decimal, ApprovalTier); 2] {
        [
            (self.auto_approve_floor, ApprovalTier::AutoApprove),
            (self.director_floor, ApprovalTier::DirectorApproval),
        ]
    }

    /// Total over every margin, negatives and values above 1 included.
    pub fn classify(&self, margin: Decimal) -> ApprovalTier {
        self.bands()
            .into_iter()
            .find(|(floor, _)| margin >= *floor)
            .map_or(ApprovalTier::ExecutiveApproval, |(_, tier)| tier)
    }
}

pub fn classify(margin: Decimal) -> ApprovalTier {
    ApprovalThresholds::default().classify(margin)
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::{classify, ApprovalThresholds};
    use crate::domain::approval::ApprovalTier;

    #[test]
    fn boundaries_are_inclusive_on_the_lower_floor() {
        assert_eq!(classify(Decimal::new(199, 3)), ApprovalTier::ExecutiveApproval);
        assert_eq!(classify(Decimal::new(20, 2)), ApprovalTier::DirectorApproval);
        assert_eq!(classify(Decimal::new(2999, 4)), ApprovalTier::DirectorApproval);
        assert_eq!(classify(Decimal::new(30, 2)), ApprovalTier::AutoApprove);
    }

    #[test]
    fn classifier_is_total_over_out_of_range_margins() {
        assert_eq!(classify(Decimal::new(-5, 1)), ApprovalTier::ExecutiveApproval);
        assert_eq!(classify(Decimal::ZERO), ApprovalTier::ExecutiveApproval);
        assert_eq!(classify(Decimal::ONE), ApprovalTier::AutoApprove);
        assert_eq!(classify(Decimal::new(25, 1)), ApprovalTier::AutoApprove);
    }

    #[test]
    fn custom_floors_shift_the_bands() {
        let thresholds = ApprovalThresholds {
            director_floor: Decimal::new(15, 2),
            auto_approve_floor: Decimal::new(40, 2),
        };
        thresholds.validate().expect("ordered floors");

        assert_eq!(thresholds.classify(Decimal::new(16, 2)), ApprovalTier::DirectorApproval);
        assert_eq!(thresholds.classify(Decimal::new(35, 2)), ApprovalTier::DirectorApproval);
        assert_eq!(thresholds.classify(Decimal::new(40, 2)), ApprovalTier::AutoApprove);
    }

    #[test]
    fn equal_floors_collapse_the_director_band() {
        let thresholds = ApprovalThresholds {
            director_floor: Decimal::new(25, 2),
            auto_approve_floor: Decimal::new(25, 2),
        };

        assert_eq!(thresholds.classify(Decimal::new(25, 2)), ApprovalTier::AutoApprove);
        assert_eq!(thresholds.classify(Decimal::new(24, 2)), ApprovalTier::ExecutiveApproval);
    }

    #[test]
    fn out_of_order_floors_are_rejected() {
        let thresholds = ApprovalThresholds {
            director_floor: Decimal::new(35, 2),
            auto_approve_floor: Decimal::new(30, 2),
        };
        assert!(thresholds.validate().is_err());

        let above_one = ApprovalThresholds {
            director_floor: Decimal::new(20, 2),
            auto_approve_floor: Decimal::new(12, 1),
        };
        assert!(above_one.validate().is_err());
    }
}
