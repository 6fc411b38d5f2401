use anyhow::{Result, bail};
use chrono::{NaiveDate, Utc};
use clap::Subcommand;
use perftrack_core::{Store, Task, TaskList, ensure_default_list, tasks_in_list};
use tracing::info;

use crate::app::{App, resolve, short_id};

#[derive(Subcommand, Debug)]
pub enum ListCommand {
    /// Create a task list
    Add { title: String },

    /// Show task lists with open/total counts
    Ls,

    /// Delete a list and its tasks (the default list cannot be deleted)
    Rm { id: String },
}

#[derive(Subcommand, Debug)]
pub enum TaskCommand {
    /// Add a task (to the default list unless --list is given)
    Add {
        title: String,

        #[arg(long)]
        list: Option<String>,

        #[arg(long)]
        details: Option<String>,

        /// Due date, YYYY-MM-DD
        #[arg(long)]
        due: Option<NaiveDate>,

        /// Goal id this task contributes to
        #[arg(long)]
        goal: Option<String>,
    },

    /// Show the tasks of one list, newest first
    Ls {
        #[arg(long)]
        list: Option<String>,

        /// Hide completed tasks
        #[arg(long, default_value_t = false)]
        open: bool,
    },

    /// Flip a task between pending and completed
    Toggle { id: String },

    /// Change fields of a task
    Edit {
        id: String,

        #[arg(long)]
        title: Option<String>,

        #[arg(long)]
        details: Option<String>,

        #[arg(long, conflicts_with = "clear_due")]
        due: Option<NaiveDate>,

        #[arg(long, default_value_t = false)]
        clear_due: bool,

        #[arg(long)]
        goal: Option<String>,
    },

    /// Delete a task
    Rm { id: String },
}

pub async fn run_list(app: &App, cmd: ListCommand) -> Result<()> {
    match cmd {
        ListCommand::Add { title } => add_list(app, &title).await,
        ListCommand::Ls => show_lists(app).await,
        ListCommand::Rm { id } => remove_list(app, &id).await,
    }
}

pub async fn run_task(app: &App, cmd: TaskCommand) -> Result<()> {
    match cmd {
        TaskCommand::Add {
            title,
            list,
            details,
            due,
            goal,
        } => add_task(app, &title, list.as_deref(), details, due, goal.as_deref()).await,
        TaskCommand::Ls { list, open } => show_tasks(app, list.as_deref(), open).await,
        TaskCommand::Toggle { id } => toggle(app, &id).await,
        TaskCommand::Edit {
            id,
            title,
            details,
            due,
            clear_due,
            goal,
        } => {
            edit(
                app,
                &id,
                TaskEdit {
                    title,
                    details,
                    due: if clear_due { Some(None) } else { due.map(Some) },
                    goal,
                },
            )
            .await
        }
        TaskCommand::Rm { id } => {
            let tasks = app.store.get_tasks(&app.session).await?;
            let task = resolve(&tasks, |t| t.id.as_str(), &id, "task")?;
            app.store.delete_task(&app.session, &task.id).await?;
            println!("Deleted task {}", task.title);
            Ok(())
        }
    }
}

async fn add_list(app: &App, title: &str) -> Result<()> {
    let title = title.trim();
    if title.is_empty() {
        bail!("list title cannot be empty");
    }
    // Make sure the default list exists before the first custom one.
    ensure_default_list(&app.store, &app.session).await?;
    let list = TaskList::new(title);
    app.store.save_task_list(&app.session, &list).await?;
    info!(list_id = %list.id, "created task list");
    println!("Created list {} ({})", list.title, short_id(&list.id));
    Ok(())
}

async fn show_lists(app: &App) -> Result<()> {
    ensure_default_list(&app.store, &app.session).await?;
    let lists = app.store.get_task_lists(&app.session).await?;
    let tasks = app.store.get_tasks(&app.session).await?;
    for l in &lists {
        let mine = tasks.iter().filter(|t| t.list_id == l.id);
        let total = mine.clone().count();
        let open = mine.filter(|t| !t.is_completed()).count();
        let marker = if l.is_default { " (default)" } else { "" };
        println!("{}  {}{}  {}/{} open", short_id(&l.id), l.title, marker, open, total);
    }
    Ok(())
}

async fn remove_list(app: &App, id: &str) -> Result<()> {
    let lists = app.store.get_task_lists(&app.session).await?;
    let list = resolve(&lists, |l| l.id.as_str(), id, "list")?;
    if list.is_default {
        bail!("The default list \"{}\" cannot be deleted", list.title);
    }
    app.store.delete_task_list(&app.session, &list.id).await?;
    println!("Deleted list {} and its tasks", list.title);
    Ok(())
}

async fn pick_list(app: &App, list: Option<&str>) -> Result<TaskList> {
    match list {
        None => ensure_default_list(&app.store, &app.session).await,
        Some(needle) => {
            let lists = app.store.get_task_lists(&app.session).await?;
            // Accept a title as well as an id.
            if let Some(l) = lists.iter().find(|l| l.title.eq_ignore_ascii_case(needle)) {
                return Ok(l.clone());
            }
            Ok(resolve(&lists, |l| l.id.as_str(), needle, "list")?.clone())
        }
    }
}

async fn resolve_goal_id(app: &App, needle: &str) -> Result<String> {
    let goals = app.store.get_goals(&app.session).await?;
    Ok(resolve(&goals, |g| g.id.as_str(), needle, "goal")?.id.clone())
}

async fn add_task(
    app: &App,
    title: &str,
    list: Option<&str>,
    details: Option<String>,
    due: Option<NaiveDate>,
    goal: Option<&str>,
) -> Result<()> {
    let title = title.trim();
    if title.is_empty() {
        bail!("task title cannot be empty");
    }
    let list = pick_list(app, list).await?;
    let mut task = Task::new(&list.id, title, Utc::now()).with_details(details.unwrap_or_default());
    if let Some(due) = due {
        task = task.with_due_date(due);
    }
    if let Some(goal) = goal {
        task = task.with_goal(resolve_goal_id(app, goal).await?);
    }
    app.store.save_task(&app.session, &task).await?;
    println!("Added \"{}\" to {} ({})", task.title, list.title, short_id(&task.id));
    Ok(())
}

pub fn render_task(t: &Task) -> String {
    let mut line = format!(
        "{} [{}] {}",
        short_id(&t.id),
        if t.is_completed() { "x" } else { " " },
        t.title
    );
    if let Some(due) = t.due_date {
        line.push_str(&format!("  (due {due})"));
    }
    if let Some(done) = t.completed_on() {
        line.push_str(&format!("  (done {done})"));
    }
    line
}

async fn show_tasks(app: &App, list: Option<&str>, open_only: bool) -> Result<()> {
    let list = pick_list(app, list).await?;
    let tasks = tasks_in_list(&app.store, &app.session, &list.id).await?;
    println!("# {}\n", list.title);
    let shown: Vec<&Task> = tasks.iter().filter(|t| !open_only || !t.is_completed()).collect();
    if shown.is_empty() {
        println!("(no tasks)");
    }
    for t in shown {
        println!("{}", render_task(t));
        if let Some(d) = &t.details {
            println!("      {d}");
        }
    }
    Ok(())
}

async fn toggle(app: &App, id: &str) -> Result<()> {
    let tasks = app.store.get_tasks(&app.session).await?;
    let mut task = resolve(&tasks, |t| t.id.as_str(), id, "task")?.clone();
    task.toggle(Utc::now());
    app.store.save_task(&app.session, &task).await?;
    println!("{}", render_task(&task));
    Ok(())
}

/// Field changes for `task edit`. `due: Some(None)` clears the due date.
#[derive(Debug, Default)]
struct TaskEdit {
    title: Option<String>,
    details: Option<String>,
    due: Option<Option<NaiveDate>>,
    goal: Option<String>,
}

async fn edit(app: &App, id: &str, change: TaskEdit) -> Result<()> {
    let tasks = app.store.get_tasks(&app.session).await?;
    let mut task = resolve(&tasks, |t| t.id.as_str(), id, "task")?.clone();

    if let Some(title) = change.title {
        let title = title.trim();
        if title.is_empty() {
            bail!("task title cannot be empty");
        }
        task.title = title.to_string();
    }
    if let Some(details) = change.details {
        task = task.with_details(details);
    }
    if let Some(due) = change.due {
        task.due_date = due;
    }
    if let Some(goal) = change.goal {
        task.goal_id = match goal.as_str() {
            "" | "none" => None,
            needle => Some(resolve_goal_id(app, needle).await?),
        };
    }

    app.store.save_task(&app.session, &task).await?;
    println!("{}", render_task(&task));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_render_task() {
        let now = Utc.with_ymd_and_hms(2026, 10, 19, 12, 0, 0).unwrap();
        let mut t = Task::new("l", "Write summary", now).with_due_date(NaiveDate::from_ymd_opt(2026, 10, 30).unwrap());
        t.id = "0123456789abcdef".into();
        assert_eq!(render_task(&t), "01234567 [ ] Write summary  (due 2026-10-30)");

        t.complete(now);
        assert_eq!(
            render_task(&t),
            "01234567 [x] Write summary  (due 2026-10-30)  (done 2026-10-19)"
        );
    }
}
