//! Reconcile an export into task lists and tasks.
//!
//! Writes go out one at a time, each awaited before the next, so the progress
//! reported after every task matches what has actually been persisted. There
//! is no rollback: a failure leaves earlier writes in place.

use chrono::{DateTime, Utc};
use perftrack_core::store::Store;
use perftrack_core::time::{normalize_date, parse_timestamp};
use perftrack_core::{Session, Task, TaskList};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::error::ImportError;
use crate::shape::{ImportPlan, RawTask, RootShape};

/// One progress update: a 0-100 percentage and a status line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportProgress {
    pub percent: u8,
    pub status: String,
}

impl ImportProgress {
    fn new(percent: u8, status: impl Into<String>) -> Self {
        Self {
            percent,
            status: status.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ImportSummary {
    pub lists: usize,
    pub tasks: usize,
    /// Entries dropped for lacking a title.
    pub skipped: usize,
}

/// `round(processed / total * 100)`, or 100 when there is nothing to count.
pub fn progress_percent(processed: usize, total: usize) -> u8 {
    if total == 0 {
        return 100;
    }
    ((processed as f64 / total as f64) * 100.0).round().min(100.0) as u8
}

/// Parse `content` and classify it without writing anything.
pub fn plan_import(content: &str, file_name: &str) -> Result<ImportPlan, ImportError> {
    let root: Value = serde_json::from_str(content).map_err(ImportError::Parse)?;
    let candidates = RootShape::detect(root).into_candidates();
    let plan = ImportPlan::classify(candidates, file_name);
    if plan.is_empty() {
        return Err(ImportError::NoData);
    }
    Ok(plan)
}

/// Map an export entry onto a task in `list_id`. `None` means skip.
pub fn map_task(raw: &RawTask, list_id: &str, now: DateTime<Utc>) -> Result<Option<Task>, ImportError> {
    let Some(title) = raw.usable_title() else {
        return Ok(None);
    };

    let bad = |field: &'static str, value: &str| ImportError::InvalidTimestamp {
        field,
        value: value.to_string(),
        title: title.to_string(),
    };

    let created_at = match raw.updated.as_deref() {
        Some(s) => parse_timestamp(s).map_err(|_| bad("updated", s))?,
        None => now,
    };

    let mut task = Task::new(list_id, title, created_at).with_details(raw.notes.clone().unwrap_or_default());

    if let Some(due) = raw.due.as_deref() {
        task = task.with_due_date(normalize_date(due).map_err(|_| bad("due", due))?);
    }

    if raw.is_completed() {
        let completed_at = match raw.completed_at() {
            Some(s) => parse_timestamp(s).map_err(|_| bad("completed", s))?,
            None => now,
        };
        task.complete(completed_at);
    }

    Ok(Some(task))
}

/// Runs one import against a store on behalf of a session.
pub struct Importer<'a> {
    store: &'a dyn Store,
    session: &'a Session,
    now: DateTime<Utc>,
}

impl<'a> Importer<'a> {
    pub fn new(store: &'a dyn Store, session: &'a Session) -> Self {
        Self {
            store,
            session,
            now: Utc::now(),
        }
    }

    /// Fix the timestamp used for entries that carry none.
    pub fn with_now(mut self, now: DateTime<Utc>) -> Self {
        self.now = now;
        self
    }

    pub async fn run(
        &self,
        content: &str,
        file_name: &str,
        mut on_progress: impl FnMut(ImportProgress) + Send,
    ) -> Result<ImportSummary, ImportError> {
        on_progress(ImportProgress::new(0, "Parsing JSON..."));
        let plan = plan_import(content, file_name).inspect_err(|e| warn!(file_name, error = %e, "import aborted"))?;

        let total = plan.task_count();
        let lists = plan.into_lists();
        info!(file_name, lists = lists.len(), tasks = total, "importing");
        on_progress(ImportProgress::new(
            0,
            format!("Found {} lists and {} tasks...", lists.len(), total),
        ));

        let mut summary = ImportSummary::default();
        let mut processed = 0usize;

        for raw_list in lists {
            let list = TaskList::new(
                raw_list
                    .title
                    .unwrap_or_else(|| format!("Imported List {}", summary.lists + 1)),
            );
            self.store
                .save_task_list(self.session, &list)
                .await
                .map_err(ImportError::Store)?;
            summary.lists += 1;

            for raw in &raw_list.tasks {
                match map_task(raw, &list.id, self.now)? {
                    Some(task) => {
                        self.store
                            .save_task(self.session, &task)
                            .await
                            .map_err(ImportError::Store)?;
                        summary.tasks += 1;
                    }
                    None => {
                        debug!(list = %list.title, "skipping entry without a title");
                        summary.skipped += 1;
                    }
                }
                processed += 1;
                on_progress(ImportProgress::new(
                    progress_percent(processed, total),
                    format!("Importing {} ({}/{})...", list.title, processed, total),
                ));
            }
        }

        info!(
            lists = summary.lists,
            tasks = summary.tasks,
            skipped = summary.skipped,
            "import complete"
        );
        on_progress(ImportProgress::new(100, "Import Complete!"));
        Ok(summary)
    }
}
