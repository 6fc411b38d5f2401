//! Goals, their milestones, and habit streaks.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Goal {
    pub id: String,
    pub user_id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Percent complete, 0-100.
    pub progress: u8,
}

impl Goal {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            user_id: String::new(),
            title: title.into(),
            description: None,
            progress: 0,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Set progress, clamped to 100.
    pub fn set_progress(&mut self, percent: u32) {
        self.progress = percent.min(100) as u8;
    }

    /// `Title (40% complete)`
    pub fn summary_line(&self) -> String {
        format!("{} ({}% complete)", self.title, self.progress)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum MilestoneStatus {
    #[default]
    Pending,
    Completed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Milestone {
    pub id: String,
    pub goal_id: String,
    pub description: String,
    pub status: MilestoneStatus,
    pub due_date: NaiveDate,
}

impl Milestone {
    pub fn new(goal_id: impl Into<String>, description: impl Into<String>, due_date: NaiveDate) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            goal_id: goal_id.into(),
            description: description.into(),
            status: MilestoneStatus::Pending,
            due_date,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Habit {
    pub name: String,
    pub streak_count: u32,
}
