//! Task and task-list records.
//!
//! Status changes go through [`Task::complete`], [`Task::reopen`] and
//! [`Task::toggle`] so `completed_at` is present exactly when the task is done.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    #[default]
    Pending,
    Completed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    pub user_id: String,
    pub list_id: String,
    pub title: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<NaiveDate>,
    /// Goal this task contributes to, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub goal_id: Option<String>,

    pub status: TaskStatus,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
}

impl Task {
    pub fn new(list_id: impl Into<String>, title: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            user_id: String::new(),
            list_id: list_id.into(),
            title: title.into(),
            details: None,
            due_date: None,
            goal_id: None,
            status: TaskStatus::Pending,
            created_at: now,
            completed_at: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        let details = details.into();
        self.details = if details.is_empty() { None } else { Some(details) };
        self
    }

    pub fn with_due_date(mut self, due: NaiveDate) -> Self {
        self.due_date = Some(due);
        self
    }

    pub fn with_goal(mut self, goal_id: impl Into<String>) -> Self {
        self.goal_id = Some(goal_id.into());
        self
    }

    pub fn is_completed(&self) -> bool {
        self.status == TaskStatus::Completed
    }

    pub fn complete(&mut self, at: DateTime<Utc>) {
        self.status = TaskStatus::Completed;
        self.completed_at = Some(at);
    }

    pub fn reopen(&mut self) {
        self.status = TaskStatus::Pending;
        self.completed_at = None;
    }

    /// Flip pending <-> completed, stamping `now` when completing.
    pub fn toggle(&mut self, now: DateTime<Utc>) {
        match self.status {
            TaskStatus::Pending => self.complete(now),
            TaskStatus::Completed => self.reopen(),
        }
    }

    /// Calendar day (UTC) the task was completed on.
    pub fn completed_on(&self) -> Option<NaiveDate> {
        match self.status {
            TaskStatus::Completed => self.completed_at.map(|t| t.date_naive()),
            TaskStatus::Pending => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskList {
    pub id: String,
    pub user_id: String,
    pub title: String,
    #[serde(default)]
    pub is_default: bool,
}

impl TaskList {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            user_id: String::new(),
            title: title.into(),
            is_default: false,
        }
    }

    pub fn default_list() -> Self {
        Self {
            is_default: true,
            ..Self::new("My Tasks")
        }
    }
}

/// Newest first, the order task views list them in.
pub fn sort_newest_first(tasks: &mut [Task]) {
    tasks.sort_by(|a, b| b.created_at.cmp(&a.created_at));
}
