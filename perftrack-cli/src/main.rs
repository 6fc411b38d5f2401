use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod achievements_cmd;
mod app;
mod config;
mod file_store;
mod goals_cmd;
mod import_cmd;
mod report_cmd;
mod setup;
mod state;
mod tasks_cmd;

use achievements_cmd::AchievementCommand;
use app::App;
use goals_cmd::GoalCommand;
use perftrack_core::Habit;
use report_cmd::PeriodArgs;
use tasks_cmd::{ListCommand, TaskCommand};

const VERSION: &str = concat!(env!("CARGO_PKG_VERSION"), " (", env!("PERFTRACK_BUILD_SHA"), ")");

#[derive(Parser, Debug)]
#[command(name = "perftrack", version = VERSION, about = "Track goals, tasks and achievements; generate performance reports")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// One-time interactive setup: write ~/.perftrack/profile.json and config.toml
    Setup,

    /// Config helpers
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },

    /// Print the date range a report would cover
    Period {
        #[command(flatten)]
        period: PeriodArgs,
    },

    /// Generate a performance report for a period
    Report {
        #[command(flatten)]
        period: PeriodArgs,

        /// Writing tone (default from config)
        #[arg(long)]
        tone: Option<String>,

        /// Also save the report as {Type}_Report_{end}.md in this directory
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Import a JSON task export (lists with items, or a flat task array)
    Import {
        #[arg(long)]
        file: PathBuf,
    },

    /// Task lists
    List {
        #[command(subcommand)]
        command: ListCommand,
    },

    /// Tasks
    Task {
        #[command(subcommand)]
        command: TaskCommand,
    },

    /// Goals and milestones
    Goal {
        #[command(subcommand)]
        command: GoalCommand,
    },

    /// Achievements
    Achievement {
        #[command(subcommand)]
        command: AchievementCommand,
    },

    /// Short monthly reflection over habit streaks and goal progress
    Reflect {
        /// Habit streak as NAME=STREAK (repeatable)
        #[arg(long = "habit", value_parser = report_cmd::parse_habit)]
        habits: Vec<Habit>,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Write a default config.toml if missing
    Init,
    /// Print the effective config
    Show,
}

fn init_tracing() {
    // Logs go to stderr so reports on stdout can be piped.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()),
        )
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Command::Setup => setup::run_setup()?,

        Command::Config { command } => match command {
            ConfigCommand::Init => config::init_config()?,
            ConfigCommand::Show => config::show_config()?,
        },

        Command::Period { period } => report_cmd::period(&App::load().await?, &period).await?,
        Command::Report { period, tone, out } => {
            report_cmd::report(&App::load().await?, &period, tone, out).await?
        }
        Command::Import { file } => import_cmd::run(&App::load().await?, &file).await?,
        Command::List { command } => tasks_cmd::run_list(&App::load().await?, command).await?,
        Command::Task { command } => tasks_cmd::run_task(&App::load().await?, command).await?,
        Command::Goal { command } => goals_cmd::run(&App::load().await?, command).await?,
        Command::Achievement { command } => achievements_cmd::run(&App::load().await?, command).await?,
        Command::Reflect { habits } => report_cmd::reflect(&App::load().await?, &habits).await?,
    }

    Ok(())
}
