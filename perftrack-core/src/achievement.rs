//! Logged achievements and their classification tags.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum AchievementType {
    Leadership,
    Delivery,
    Communication,
    Impact,
    #[default]
    Other,
}

impl AchievementType {
    pub const ALL: [AchievementType; 5] = [
        AchievementType::Leadership,
        AchievementType::Delivery,
        AchievementType::Communication,
        AchievementType::Impact,
        AchievementType::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AchievementType::Leadership => "Leadership",
            AchievementType::Delivery => "Delivery",
            AchievementType::Communication => "Communication",
            AchievementType::Impact => "Impact",
            AchievementType::Other => "Other",
        }
    }
}

impl fmt::Display for AchievementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AchievementType {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Self::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| anyhow::anyhow!("unknown achievement type: {s}"))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Achievement {
    pub id: String,
    pub user_id: String,
    pub title: String,
    pub description: String,
    pub classification: AchievementType,
    pub summary: String,
    /// Day the achievement happened.
    pub date: NaiveDate,
}

impl Achievement {
    pub fn new(title: impl Into<String>, description: impl Into<String>, date: NaiveDate) -> Self {
        let description = description.into();
        Self {
            id: Uuid::new_v4().to_string(),
            user_id: String::new(),
            title: title.into(),
            summary: description.clone(),
            description,
            classification: AchievementType::Other,
            date,
        }
    }

    pub fn classified(mut self, classification: AchievementType, summary: impl Into<String>) -> Self {
        self.classification = classification;
        self.summary = summary.into();
        self
    }

    /// `- Title (Delivery): summary`
    pub fn summary_line(&self) -> String {
        format!("- {} ({}): {}", self.title, self.classification, self.summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_parses_case_insensitively() {
        assert_eq!("impact".parse::<AchievementType>().unwrap(), AchievementType::Impact);
        assert_eq!(" Leadership ".parse::<AchievementType>().unwrap(), AchievementType::Leadership);
        assert!("Heroics".parse::<AchievementType>().is_err());
    }

    #[test]
    fn test_summary_line() {
        let a = Achievement::new("Launched billing", "Shipped the billing revamp", NaiveDate::from_ymd_opt(2026, 1, 12).unwrap())
            .classified(AchievementType::Delivery, "Delivered billing revamp on time.");
        assert_eq!(a.summary_line(), "- Launched billing (Delivery): Delivered billing revamp on time.");
    }

    #[test]
    fn test_unclassified_summary_defaults_to_description() {
        let a = Achievement::new("t", "the description", NaiveDate::from_ymd_opt(2026, 1, 1).unwrap());
        assert_eq!(a.classification, AchievementType::Other);
        assert_eq!(a.summary, "the description");
    }
}
