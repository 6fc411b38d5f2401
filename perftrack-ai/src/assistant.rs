//! AI-backed helpers.
//!
//! Each helper makes exactly one generate call and returns a `Result`.
//! Fallback values live here as constants and are applied by the caller with
//! [`or_fallback`], so the policy sits in one place.

use chrono::NaiveDate;
use perftrack_core::{AchievementType, Goal, Habit, Milestone, MilestoneStatus, ReportContext};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::warn;

use crate::error::AiError;
use crate::proxy::{GenerateRequest, TextGenerator};

pub const REPORT_EMPTY: &str = "Could not generate report.";
pub const REPORT_ERROR: &str = "Error generating report. Please check your connection.";
pub const REFLECTION_EMPTY: &str = "Keep pushing forward!";
pub const REFLECTION_ERROR: &str = "Great job staying consistent! Keep tracking to see AI insights.";

/// Collapse an AI result to a value, logging what was swallowed.
pub fn or_fallback<T>(what: &str, result: Result<T, AiError>, fallback: impl FnOnce() -> T) -> T {
    match result {
        Ok(v) => v,
        Err(e) => {
            warn!(helper = what, error = %e, "AI helper failed; using fallback");
            fallback()
        }
    }
}

/// Generate the performance report text for an assembled context.
pub async fn report(generator: &dyn TextGenerator, ctx: &ReportContext<'_>) -> Result<String, AiError> {
    generator.generate(&GenerateRequest::new(ctx.prompt())).await
}

/// The report boundary: always yields displayable text.
///
/// Success returns the generated text verbatim; an empty reply or any error
/// becomes a fixed message.
pub async fn generate_report(generator: &dyn TextGenerator, ctx: &ReportContext<'_>) -> String {
    let text = or_fallback("report", report(generator, ctx).await, || REPORT_ERROR.to_string());
    if text.is_empty() {
        REPORT_EMPTY.to_string()
    } else {
        text
    }
}

/// Rewrite a goal as a SMART goal. Fallback: the original text.
pub async fn smart_goal(generator: &dyn TextGenerator, raw: &str) -> Result<String, AiError> {
    let prompt = format!(
        "Rewrite the following goal to be SMART (Specific, Measurable, Achievable, Relevant, Time-bound).\n\
Return only the rewritten goal description text, no explanations.\n\n\
Original Goal: \"{raw}\""
    );
    let text = generator.generate(&GenerateRequest::new(prompt)).await?;
    let text = text.trim();
    if text.is_empty() {
        return Err(AiError::Empty);
    }
    Ok(text.to_string())
}

/// A milestone suggested by the model, not yet attached to a goal.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MilestoneDraft {
    pub description: String,
    #[serde(default)]
    pub status: MilestoneStatus,
    pub due_date: NaiveDate,
}

impl MilestoneDraft {
    pub fn into_milestone(self, goal_id: &str) -> Milestone {
        let mut m = Milestone::new(goal_id, self.description, self.due_date);
        m.status = self.status;
        m
    }
}

fn milestone_schema() -> Value {
    json!({
        "responseMimeType": "application/json",
        "responseSchema": {
            "type": "ARRAY",
            "items": {
                "type": "OBJECT",
                "properties": {
                    "description": { "type": "STRING" },
                    "status": { "type": "STRING", "enum": ["pending"] },
                    "dueDate": { "type": "STRING", "description": "YYYY-MM-DD format" }
                },
                "required": ["description", "status", "dueDate"]
            }
        }
    })
}

/// Suggest 3-5 milestones for a goal due by `timeframe`. Fallback: none.
pub async fn milestones(
    generator: &dyn TextGenerator,
    goal_text: &str,
    timeframe: &str,
) -> Result<Vec<MilestoneDraft>, AiError> {
    let prompt = format!(
        "Generate 3 to 5 key milestones for the goal: \"{goal_text}\" which needs to be completed by {timeframe}.\n\
Ensure deadlines are spaced out logically."
    );
    let request = GenerateRequest::new(prompt).with_config(milestone_schema());
    let text = generator.generate(&request).await?;
    if text.trim().is_empty() {
        return Ok(Vec::new());
    }
    serde_json::from_str(&text).map_err(|e| AiError::Malformed(e.to_string()))
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AchievementInsight {
    pub classification: AchievementType,
    pub summary: String,
}

impl AchievementInsight {
    /// What an unclassified achievement gets.
    pub fn fallback(description: &str) -> Self {
        Self {
            classification: AchievementType::Other,
            summary: description.to_string(),
        }
    }
}

fn insight_schema() -> Value {
    let kinds: Vec<&str> = AchievementType::ALL.iter().map(|t| t.as_str()).collect();
    json!({
        "responseMimeType": "application/json",
        "responseSchema": {
            "type": "OBJECT",
            "properties": {
                "classification": { "type": "STRING", "enum": kinds },
                "summary": { "type": "STRING" }
            },
            "required": ["classification", "summary"]
        }
    })
}

/// Classify an achievement and write a one-sentence, review-ready summary.
pub async fn classify_achievement(
    generator: &dyn TextGenerator,
    title: &str,
    description: &str,
) -> Result<AchievementInsight, AiError> {
    let prompt = format!(
        "Analyze this professional achievement.\n\
1. Classify it into one of: Leadership, Delivery, Communication, Impact, Other.\n\
2. Write a 1-sentence executive summary suitable for a performance review (manager-ready tone).\n\n\
Title: {title}\n\
Description: {description}"
    );
    let request = GenerateRequest::new(prompt).with_config(insight_schema());
    let text = generator.generate(&request).await?;
    if text.trim().is_empty() {
        return Err(AiError::Empty);
    }
    serde_json::from_str(&text).map_err(|e| AiError::Malformed(e.to_string()))
}

/// Short monthly reflection over habit streaks and goal progress.
pub async fn reflection(generator: &dyn TextGenerator, habits: &[Habit], goals: &[Goal]) -> Result<String, AiError> {
    let habit_summary = habits
        .iter()
        .map(|h| format!("{}: Streak {}", h.name, h.streak_count))
        .collect::<Vec<_>>()
        .join(", ");
    let goal_summary = goals
        .iter()
        .map(|g| format!("{} is {}% done", g.title, g.progress))
        .collect::<Vec<_>>()
        .join(", ");
    let prompt = format!(
        "Write a short, encouraging monthly reflection for a user based on this data:\n\
Habits: {habit_summary}\n\
Goals: {goal_summary}\n\n\
Give 3 bullet points on what went well and 1 suggestion for improvement."
    );
    let text = generator.generate(&GenerateRequest::new(prompt)).await?;
    if text.is_empty() {
        return Ok(REFLECTION_EMPTY.to_string());
    }
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use perftrack_core::{Achievement, DateRange, ReportType, Task};
    use std::sync::Mutex;

    /// Replies with a canned outcome and records what it was asked.
    struct Stub {
        reply: Option<String>,
        seen: Mutex<Vec<GenerateRequest>>,
    }

    impl Stub {
        fn ok(text: &str) -> Self {
            Self {
                reply: Some(text.to_string()),
                seen: Mutex::new(Vec::new()),
            }
        }

        fn failing() -> Self {
            Self {
                reply: None,
                seen: Mutex::new(Vec::new()),
            }
        }

        fn calls(&self) -> Vec<GenerateRequest> {
            self.seen.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl TextGenerator for Stub {
        async fn generate(&self, request: &GenerateRequest) -> Result<String, AiError> {
            self.seen.lock().unwrap().push(request.clone());
            match &self.reply {
                Some(t) => Ok(t.clone()),
                None => Err(AiError::Upstream {
                    status: "503 Service Unavailable".to_string(),
                    message: None,
                }),
            }
        }
    }

    fn march() -> DateRange {
        DateRange::new(
            NaiveDate::from_ymd_opt(2026, 3, 1).unwrap(),
            NaiveDate::from_ymd_opt(2026, 3, 31).unwrap(),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_generate_report_returns_text_verbatim_with_one_call() {
        let stub = Stub::ok("## Executive Summary\nGood month.\n");
        let achievements = vec![Achievement::new("Win", "Did it", NaiveDate::from_ymd_opt(2026, 3, 4).unwrap())];
        let tasks: Vec<Task> = Vec::new();
        let ctx = ReportContext::build(march(), ReportType::Monthly, "Manager-ready", &[], &achievements, &tasks);

        let out = generate_report(&stub, &ctx).await;
        assert_eq!(out, "## Executive Summary\nGood month.\n");
        let calls = stub.calls();
        assert_eq!(calls.len(), 1);
        assert!(calls[0].contents.contains("- Win (Other): Did it"));
        assert!(calls[0].config.is_none());
    }

    #[tokio::test]
    async fn test_generate_report_fallbacks() {
        let ctx = ReportContext::build(march(), ReportType::Weekly, "Concise", &[], &[], &[]);
        assert_eq!(generate_report(&Stub::failing(), &ctx).await, REPORT_ERROR);
        assert_eq!(generate_report(&Stub::ok(""), &ctx).await, REPORT_EMPTY);
    }

    #[tokio::test]
    async fn test_smart_goal_trims_and_falls_back() {
        let stub = Stub::ok("  Ship v2 to 100% of users by June 30.  \n");
        assert_eq!(smart_goal(&stub, "ship v2").await.unwrap(), "Ship v2 to 100% of users by June 30.");
        assert!(stub.calls()[0].contents.contains("Original Goal: \"ship v2\""));

        let raw = "get fit";
        let out = or_fallback("smart_goal", smart_goal(&Stub::failing(), raw).await, || raw.to_string());
        assert_eq!(out, "get fit");
        assert!(matches!(smart_goal(&Stub::ok("   "), raw).await, Err(AiError::Empty)));
    }

    #[tokio::test]
    async fn test_milestones_parse_schema_reply() {
        let stub = Stub::ok(
            r#"[{"description":"Draft design","status":"pending","dueDate":"2026-04-01"},
                {"description":"Beta","status":"pending","dueDate":"2026-05-15"}]"#,
        );
        let drafts = milestones(&stub, "Launch app", "2026-06-30").await.unwrap();
        assert_eq!(drafts.len(), 2);
        assert_eq!(drafts[1].due_date, NaiveDate::from_ymd_opt(2026, 5, 15).unwrap());

        let config = stub.calls()[0].config.clone().unwrap();
        assert_eq!(config["responseSchema"]["type"], "ARRAY");

        let m = drafts[0].clone().into_milestone("g-1");
        assert_eq!(m.goal_id, "g-1");
        assert_eq!(m.status, MilestoneStatus::Pending);

        assert!(milestones(&Stub::ok(""), "x", "y").await.unwrap().is_empty());
        assert!(matches!(milestones(&Stub::ok("not json"), "x", "y").await, Err(AiError::Malformed(_))));
    }

    #[tokio::test]
    async fn test_classify_achievement() {
        let stub = Stub::ok(r#"{"classification":"Impact","summary":"Cut cloud spend by 30%."}"#);
        let insight = classify_achievement(&stub, "Cost work", "Reduced AWS bill").await.unwrap();
        assert_eq!(insight.classification, AchievementType::Impact);
        assert_eq!(insight.summary, "Cut cloud spend by 30%.");

        let config = stub.calls()[0].config.clone().unwrap();
        let kinds = config["responseSchema"]["properties"]["classification"]["enum"].as_array().unwrap();
        assert_eq!(kinds.len(), 5);

        let fallback = or_fallback(
            "classify",
            classify_achievement(&Stub::failing(), "t", "desc").await,
            || AchievementInsight::fallback("desc"),
        );
        assert_eq!(fallback, AchievementInsight::fallback("desc"));
        assert!(matches!(classify_achievement(&Stub::ok(""), "t", "d").await, Err(AiError::Empty)));
    }

    #[tokio::test]
    async fn test_reflection() {
        let habits = vec![Habit { name: "Run".to_string(), streak_count: 4 }];
        let mut goal = Goal::new("Read 12 books");
        goal.set_progress(25);
        let stub = Stub::ok("- Nice streak");
        assert_eq!(reflection(&stub, &habits, &[goal.clone()]).await.unwrap(), "- Nice streak");
        let prompt = stub.calls()[0].contents.clone();
        assert!(prompt.contains("Habits: Run: Streak 4"));
        assert!(prompt.contains("Goals: Read 12 books is 25% done"));

        assert_eq!(reflection(&Stub::ok(""), &habits, &[]).await.unwrap(), REFLECTION_EMPTY);
        let out = or_fallback("reflection", reflection(&Stub::failing(), &habits, &[]).await, || {
            REFLECTION_ERROR.to_string()
        });
        assert_eq!(out, REFLECTION_ERROR);
    }
}
