use anyhow::{Context, Result, bail};
use chrono::{Datelike, NaiveDate};
use clap::Args;
use perftrack_ai::assistant::{REFLECTION_ERROR, reflection};
use perftrack_ai::{generate_report, or_fallback};
use perftrack_core::{Anchor, DateRange, Habit, Quarter, ReportContext, ReportType, Store, YearMonth};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::app::App;

/// Which window a report covers. Unset parts default to "today".
#[derive(Args, Debug, Clone, Default)]
pub struct PeriodArgs {
    /// weekly, monthly or quarterly (default from config)
    #[arg(long = "type")]
    pub report_type: Option<ReportType>,

    /// Weekly: any day inside the week (YYYY-MM-DD)
    #[arg(long)]
    pub date: Option<NaiveDate>,

    /// Monthly: YYYY-MM
    #[arg(long)]
    pub month: Option<YearMonth>,

    /// Quarterly: 1-4
    #[arg(long)]
    pub quarter: Option<u32>,

    /// Quarterly: year of --quarter (default: current year)
    #[arg(long)]
    pub year: Option<i32>,
}

impl PeriodArgs {
    pub fn anchor(&self, default_type: ReportType, today: NaiveDate) -> Result<Anchor> {
        let report_type = self.report_type.unwrap_or(default_type);
        match report_type {
            ReportType::Weekly => {
                if self.month.is_some() || self.quarter.is_some() {
                    bail!("weekly reports take --date, not --month/--quarter");
                }
                Ok(Anchor::Week(self.date.unwrap_or(today)))
            }
            ReportType::Monthly => {
                if self.date.is_some() || self.quarter.is_some() {
                    bail!("monthly reports take --month YYYY-MM");
                }
                Ok(Anchor::Month(match self.month {
                    Some(m) => m,
                    None => YearMonth::of(today)?,
                }))
            }
            ReportType::Quarterly => {
                if self.date.is_some() || self.month.is_some() {
                    bail!("quarterly reports take --quarter and --year");
                }
                let q = match (self.quarter, self.year) {
                    (None, None) => Quarter::of(today)?,
                    (q, year) => Quarter::new(
                        year.unwrap_or(today.year()),
                        q.unwrap_or(Quarter::of(today)?.number()),
                    )?,
                };
                Ok(Anchor::Quarter(q))
            }
        }
    }
}

pub async fn period(app: &App, args: &PeriodArgs) -> Result<()> {
    let anchor = args.anchor(app.config.default_report_type()?, app.today()?)?;
    let range = anchor.range();
    println!("{} {}", anchor.report_type(), range);
    Ok(())
}

/// Markdown export: title, generation date, period, then the report body.
pub fn render_export(report_type: ReportType, range: &DateRange, generated_on: NaiveDate, body: &str) -> String {
    format!(
        "# {report_type} Report\n\nGenerated on {generated_on}\n\nPeriod: {} to {}\n\n{}\n",
        range.start,
        range.end,
        body.trim_end()
    )
}

pub fn export_file_name(report_type: ReportType, range: &DateRange) -> String {
    format!("{report_type}_Report_{}.md", range.end)
}

pub fn write_export(
    dir: &Path,
    report_type: ReportType,
    range: &DateRange,
    generated_on: NaiveDate,
    body: &str,
) -> Result<PathBuf> {
    fs::create_dir_all(dir).with_context(|| format!("create {}", dir.display()))?;
    let path = dir.join(export_file_name(report_type, range));
    fs::write(&path, render_export(report_type, range, generated_on, body))
        .with_context(|| format!("write {}", path.display()))?;
    Ok(path)
}

pub async fn report(app: &App, args: &PeriodArgs, tone: Option<String>, out: Option<PathBuf>) -> Result<()> {
    let today = app.today()?;
    let anchor = args.anchor(app.config.default_report_type()?, today)?;
    let (report_type, range) = (anchor.report_type(), anchor.range());
    let tone = tone.unwrap_or_else(|| app.config.report.tone.clone());

    let (goals, achievements, tasks) = tokio::try_join!(
        app.store.get_goals(&app.session),
        app.store.get_achievements(&app.session),
        app.store.get_tasks(&app.session),
    )?;

    let ctx = ReportContext::build(range, report_type, &tone, &goals, &achievements, &tasks);
    info!(
        %range,
        achievements = ctx.achievements.len(),
        completed_tasks = ctx.completed_tasks.len(),
        goals = goals.len(),
        "generating report"
    );
    if ctx.is_empty() {
        eprintln!("Nothing recorded for {range}; the report will be thin.");
    }

    let text = generate_report(&app.ai, &ctx).await;
    println!("{text}");

    if let Some(dir) = out {
        let path = write_export(&dir, report_type, &range, today, &text)?;
        eprintln!("Saved {}", path.display());
    }
    Ok(())
}

/// `name=streak`, e.g. `Reading=12`.
pub fn parse_habit(s: &str) -> Result<Habit> {
    let Some((name, streak)) = s.rsplit_once('=') else {
        bail!("expected NAME=STREAK, got '{s}'");
    };
    let name = name.trim();
    if name.is_empty() {
        bail!("habit name is empty in '{s}'");
    }
    let streak_count = streak
        .trim()
        .parse()
        .with_context(|| format!("bad streak count in '{s}'"))?;
    Ok(Habit {
        name: name.to_string(),
        streak_count,
    })
}

pub async fn reflect(app: &App, habits: &[Habit]) -> Result<()> {
    let goals = app.store.get_goals(&app.session).await?;
    let text = or_fallback("reflection", reflection(&app.ai, habits, &goals).await, || {
        REFLECTION_ERROR.to_string()
    });
    println!("{text}");
    Ok(())
}
