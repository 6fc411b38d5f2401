//! Report assembly: pick what happened inside a window and turn it into a
//! prompt for the text generator.

use crate::achievement::Achievement;
use crate::goals::Goal;
use crate::period::{DateRange, ReportType};
use crate::task::Task;

/// Markdown sections the generated report must contain, in order.
pub const REPORT_SECTIONS: [&str; 5] = [
    "Executive Summary",
    "Key Achievements",
    "Operational Execution (Tasks & Milestones)",
    "Progress on Goals",
    "Focus for Next Period",
];

pub const DEFAULT_TONE: &str = "Manager-ready";

/// Achievements dated inside `range` (both ends included).
pub fn achievements_in<'a>(range: &DateRange, achievements: &'a [Achievement]) -> Vec<&'a Achievement> {
    achievements.iter().filter(|a| range.contains(a.date)).collect()
}

/// Completed tasks whose completion day falls inside `range`.
pub fn completed_tasks_in<'a>(range: &DateRange, tasks: &'a [Task]) -> Vec<&'a Task> {
    tasks
        .iter()
        .filter(|t| t.completed_on().is_some_and(|d| range.contains(d)))
        .collect()
}

/// Everything a report prompt is built from, already filtered to the window.
#[derive(Debug, Clone)]
pub struct ReportContext<'a> {
    pub range: DateRange,
    pub report_type: ReportType,
    pub tone: &'a str,
    pub goals: &'a [Goal],
    pub achievements: Vec<&'a Achievement>,
    pub completed_tasks: Vec<&'a Task>,
}

impl<'a> ReportContext<'a> {
    pub fn build(
        range: DateRange,
        report_type: ReportType,
        tone: &'a str,
        goals: &'a [Goal],
        achievements: &'a [Achievement],
        tasks: &'a [Task],
    ) -> Self {
        Self {
            range,
            report_type,
            tone,
            goals,
            achievements: achievements_in(&range, achievements),
            completed_tasks: completed_tasks_in(&range, tasks),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.goals.is_empty() && self.achievements.is_empty() && self.completed_tasks.is_empty()
    }

    pub fn prompt(&self) -> String {
        let goals = self
            .goals
            .iter()
            .map(Goal::summary_line)
            .collect::<Vec<_>>()
            .join("; ");
        let achievements = self
            .achievements
            .iter()
            .map(|a| a.summary_line())
            .collect::<Vec<_>>()
            .join("\n");
        let tasks = self
            .completed_tasks
            .iter()
            .map(|t| format!("- [Completed Task] {}", t.title))
            .collect::<Vec<_>>()
            .join("\n");

        let mut s = String::new();
        s.push_str(&format!("Write a {} Professional Performance Report.\n", self.report_type));
        s.push_str(&format!("Date Range: {} to {}\n", self.range.start, self.range.end));
        s.push_str(&format!("Tone: {}\n\n", self.tone));
        s.push_str("Key Goals Context:\n");
        s.push_str(&goals);
        s.push_str("\n\nAchievements Logged:\n");
        s.push_str(&achievements);
        s.push_str("\n\nCompleted Tasks (Ad-hoc items):\n");
        s.push_str(&tasks);
        s.push_str("\n\nStructure the report with these Markdown headers:\n");
        for section in REPORT_SECTIONS {
            s.push_str(&format!("## {}\n", section));
        }
        s.push_str("\nKeep it professional and actionable.");
        s
    }
}
