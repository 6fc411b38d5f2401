use anyhow::{Result, bail};
use chrono::NaiveDate;
use clap::Subcommand;
use perftrack_ai::assistant::classify_achievement;
use perftrack_ai::{AchievementInsight, or_fallback};
use perftrack_core::{Achievement, AchievementType, DateRange, Store};

use crate::app::{App, resolve, short_id};

#[derive(Subcommand, Debug)]
pub enum AchievementCommand {
    /// Log an achievement; the AI proxy classifies and summarizes it
    Add {
        #[arg(long)]
        title: String,

        #[arg(long)]
        description: String,

        /// Day it happened (default: today)
        #[arg(long)]
        date: Option<NaiveDate>,

        /// Set the classification yourself and skip the AI call
        #[arg(long)]
        classification: Option<AchievementType>,
    },

    /// Show achievements, newest first
    Ls {
        #[arg(long)]
        from: Option<NaiveDate>,

        #[arg(long)]
        to: Option<NaiveDate>,
    },

    /// Delete an achievement
    Rm { id: String },
}

pub async fn run(app: &App, cmd: AchievementCommand) -> Result<()> {
    match cmd {
        AchievementCommand::Add {
            title,
            description,
            date,
            classification,
        } => {
            let title = title.trim();
            if title.is_empty() {
                bail!("achievement title cannot be empty");
            }
            let date = match date {
                Some(d) => d,
                None => app.today()?,
            };
            let insight = match classification {
                Some(c) => AchievementInsight {
                    classification: c,
                    summary: description.clone(),
                },
                None => or_fallback(
                    "classify_achievement",
                    classify_achievement(&app.ai, title, &description).await,
                    || AchievementInsight::fallback(&description),
                ),
            };
            let achievement =
                Achievement::new(title, &description, date).classified(insight.classification, insight.summary);
            app.store.save_achievement(&app.session, &achievement).await?;
            println!("Logged ({})", short_id(&achievement.id));
            println!("{}", achievement.summary_line());
            Ok(())
        }
        AchievementCommand::Ls { from, to } => {
            let range = match (from, to) {
                (None, None) => None,
                (from, to) => Some(DateRange::new(
                    from.unwrap_or(NaiveDate::MIN),
                    to.unwrap_or(NaiveDate::MAX),
                )?),
            };
            let all = app.store.get_achievements(&app.session).await?;
            let shown: Vec<&Achievement> = all
                .iter()
                .filter(|a| range.is_none_or(|r| r.contains(a.date)))
                .collect();
            if shown.is_empty() {
                println!("(no achievements)");
            }
            for a in shown {
                println!("{}  {}  {}", short_id(&a.id), a.date, a.summary_line());
            }
            Ok(())
        }
        AchievementCommand::Rm { id } => {
            let all = app.store.get_achievements(&app.session).await?;
            let a = resolve(&all, |a| a.id.as_str(), &id, "achievement")?;
            app.store.delete_achievement(&app.session, &a.id).await?;
            println!("Deleted achievement {}", a.title);
            Ok(())
        }
    }
}
