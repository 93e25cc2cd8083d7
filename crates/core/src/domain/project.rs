use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

pub const DEFAULT_ADMIN_FEE_PCT: Decimal = Decimal::from_parts(5, 0, 0, false, 0);

/// Engagement metadata collected before scoping starts.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectProfile {
    pub office: String,
    pub project_name: String,
    pub customer_name: String,
    /// Free-text benchmark reference; no rate lookup is performed against it.
    pub benchmark: Option<String>,
    pub service_type: String,
    pub industry: String,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    /// Seeds the admin fee of every newly created allocation.
    pub admin_fee_pct: Decimal,
}

impl ProjectProfile {
    pub fn duration_days(&self) -> Option<i64> {
        let (start, end) = (self.start_date?, self.end_date?);
        let days = (end - start).num_days();
        (days >= 0).then_some(days)
    }
}

impl Default for ProjectProfile {
    fn default() -> Self {
        Self {
            office: "National".to_string(),
            project_name: "ACME Corp.".to_string(),
            customer_name: String::new(),
            benchmark: None,
            service_type: String::new(),
            industry: String::new(),
            start_date: None,
            end_date: None,
            admin_fee_pct: DEFAULT_ADMIN_FEE_PCT,
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use rust_decimal::Decimal;

    use super::ProjectProfile;

    fn date(value: &str) -> Option<NaiveDate> {
        Some(NaiveDate::parse_from_str(value, "%Y-%m-%d").expect("valid date"))
    }

    #[test]
    fn defaults_match_new_project_form() {
        let profile = ProjectProfile::default();
        assert_eq!(profile.office, "National");
        assert_eq!(profile.project_name, "ACME Corp.");
        assert_eq!(profile.admin_fee_pct, Decimal::new(5, 0));
        assert_eq!(profile.duration_days(), None);
    }

    #[test]
    fn duration_requires_both_dates_in_order() {
        let mut profile = ProjectProfile {
            start_date: date("2026-01-01"),
            end_date: date("2026-03-31"),
            ..ProjectProfile::default()
        };
        assert_eq!(profile.duration_days(), Some(89));

        profile.end_date = date("2025-12-31");
        assert_eq!(profile.duration_days(), None);

        profile.end_date = None;
        assert_eq!(profile.duration_days(), None);
    }

    #[test]
    fn partial_toml_profile_falls_back_to_defaults() {
        let profile: ProjectProfile =
            toml::from_str("project_name = \"Globex\"\nstart_date = \"2026-02-01\"\n")
                .expect("profile parses");
        assert_eq!(profile.project_name, "Globex");
        assert_eq!(profile.office, "National");
        assert_eq!(profile.start_date, date("2026-02-01"));
    }
}
