use anyhow::{Result, bail};
use chrono::NaiveDate;
use clap::Subcommand;
use perftrack_ai::assistant::{milestones, smart_goal};
use perftrack_ai::or_fallback;
use perftrack_core::{Goal, MilestoneStatus, Store};
use tracing::info;

use crate::app::{App, resolve, short_id};

#[derive(Subcommand, Debug)]
pub enum GoalCommand {
    /// Add a goal
    Add {
        title: String,

        #[arg(long)]
        description: Option<String>,

        /// Rewrite the description as a SMART goal before saving
        #[arg(long, default_value_t = false)]
        smart: bool,
    },

    /// Show goals with progress
    Ls,

    /// Set progress percent (clamped to 100)
    Progress { id: String, percent: u32 },

    /// Rewrite free text as a SMART goal (prints only)
    Smart { text: String },

    /// Show a goal's milestones, or generate them with --by
    Milestones {
        id: String,

        /// Deadline for the whole goal; asks the AI for 3-5 milestones
        #[arg(long)]
        by: Option<NaiveDate>,
    },

    /// Delete a goal and its milestones
    Rm { id: String },
}

pub async fn run(app: &App, cmd: GoalCommand) -> Result<()> {
    match cmd {
        GoalCommand::Add {
            title,
            description,
            smart,
        } => add(app, &title, description, smart).await,
        GoalCommand::Ls => list(app).await,
        GoalCommand::Progress { id, percent } => {
            let goals = app.store.get_goals(&app.session).await?;
            let mut goal = resolve(&goals, |g| g.id.as_str(), &id, "goal")?.clone();
            goal.set_progress(percent);
            app.store.save_goal(&app.session, &goal).await?;
            println!("{}", goal.summary_line());
            Ok(())
        }
        GoalCommand::Smart { text } => {
            let rewritten = or_fallback("smart_goal", smart_goal(&app.ai, &text).await, || text.clone());
            println!("{rewritten}");
            Ok(())
        }
        GoalCommand::Milestones { id, by } => show_milestones(app, &id, by).await,
        GoalCommand::Rm { id } => {
            let goals = app.store.get_goals(&app.session).await?;
            let goal = resolve(&goals, |g| g.id.as_str(), &id, "goal")?;
            app.store.delete_goal(&app.session, &goal.id).await?;
            println!("Deleted goal {}", goal.title);
            Ok(())
        }
    }
}

async fn add(app: &App, title: &str, description: Option<String>, smart: bool) -> Result<()> {
    let title = title.trim();
    if title.is_empty() {
        bail!("goal title cannot be empty");
    }
    let mut goal = Goal::new(title);
    let description = description.filter(|d| !d.trim().is_empty());
    match (description, smart) {
        (Some(d), true) => {
            let rewritten = or_fallback("smart_goal", smart_goal(&app.ai, &d).await, || d.clone());
            goal = goal.with_description(rewritten);
        }
        (None, true) => {
            let rewritten = or_fallback("smart_goal", smart_goal(&app.ai, title).await, || title.to_string());
            goal = goal.with_description(rewritten);
        }
        (Some(d), false) => goal = goal.with_description(d),
        (None, false) => {}
    }
    app.store.save_goal(&app.session, &goal).await?;
    info!(goal_id = %goal.id, "created goal");
    println!("Added goal {} ({})", goal.title, short_id(&goal.id));
    if let Some(d) = &goal.description {
        println!("  {d}");
    }
    Ok(())
}

async fn list(app: &App) -> Result<()> {
    let goals = app.store.get_goals(&app.session).await?;
    if goals.is_empty() {
        println!("(no goals)");
    }
    for g in &goals {
        println!("{}  {}", short_id(&g.id), g.summary_line());
    }
    Ok(())
}

async fn show_milestones(app: &App, id: &str, by: Option<NaiveDate>) -> Result<()> {
    let goals = app.store.get_goals(&app.session).await?;
    let goal = resolve(&goals, |g| g.id.as_str(), id, "goal")?;

    if let Some(deadline) = by {
        let goal_text = goal.description.as_deref().unwrap_or(&goal.title);
        let drafts = or_fallback(
            "milestones",
            milestones(&app.ai, goal_text, &deadline.to_string()).await,
            Vec::new,
        );
        if drafts.is_empty() {
            println!("No milestones suggested.");
        }
        for draft in drafts {
            let m = draft.into_milestone(&goal.id);
            app.store.save_milestone(&app.session, &m).await?;
        }
    }

    println!("# {}\n", goal.summary_line());
    for m in app.store.get_milestones(&app.session, &goal.id).await? {
        let mark = match m.status {
            MilestoneStatus::Completed => "x",
            MilestoneStatus::Pending => " ",
        };
        println!("[{mark}] {}  {}", m.due_date, m.description);
    }
    Ok(())
}
