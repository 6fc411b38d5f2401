//! [`Store`] backed by one JSON document on disk.
//!
//! The whole record set is loaded on open and rewritten after every mutation
//! (temp file + rename), so each awaited `save_*` is durable when it returns.

use anyhow::{Context, Result};
use async_trait::async_trait;
use perftrack_core::store::{Store, StoreData};
use perftrack_core::{Achievement, Goal, Milestone, Session, Task, TaskList};
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;
use tracing::debug;

pub struct JsonFileStore {
    path: PathBuf,
    data: Mutex<StoreData>,
}

impl JsonFileStore {
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let data = match tokio::fs::read_to_string(&path).await {
            Ok(s) if s.trim().is_empty() => StoreData::default(),
            Ok(s) => serde_json::from_str(&s).with_context(|| format!("parse {}", path.display()))?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => StoreData::default(),
            Err(e) => return Err(e).with_context(|| format!("read {}", path.display())),
        };
        let store = Self {
            path,
            data: Mutex::new(data),
        };
        debug!(path = %store.path().display(), "opened store");
        Ok(store)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Apply `f` to the record set and persist it if `f` succeeds.
    async fn mutate(&self, f: impl FnOnce(&mut StoreData) -> Result<()> + Send) -> Result<()> {
        let mut data = self.data.lock().await;
        let mut next = data.clone();
        f(&mut next)?;
        write_atomic(&self.path, &next).await?;
        *data = next;
        Ok(())
    }

    async fn read<T>(&self, f: impl FnOnce(&StoreData) -> T + Send) -> T {
        f(&*self.data.lock().await)
    }
}

async fn write_atomic(path: &Path, data: &StoreData) -> Result<()> {
    let json = serde_json::to_string_pretty(data).context("serialize store")?;
    let tmp = path.with_extension("json.tmp");
    tokio::fs::write(&tmp, json)
        .await
        .with_context(|| format!("write {}", tmp.display()))?;
    tokio::fs::rename(&tmp, path)
        .await
        .with_context(|| format!("replace {}", path.display()))?;
    Ok(())
}

#[async_trait]
impl Store for JsonFileStore {
    async fn get_task_lists(&self, session: &Session) -> Result<Vec<TaskList>> {
        Ok(self.read(|d| d.task_lists(session)).await)
    }

    async fn save_task_list(&self, session: &Session, list: &TaskList) -> Result<()> {
        self.mutate(|d| d.save_task_list(session, list)).await
    }

    async fn delete_task_list(&self, session: &Session, id: &str) -> Result<()> {
        self.mutate(|d| d.delete_task_list(session, id)).await
    }

    async fn get_tasks(&self, session: &Session) -> Result<Vec<Task>> {
        Ok(self.read(|d| d.tasks(session)).await)
    }

    async fn save_task(&self, session: &Session, task: &Task) -> Result<()> {
        self.mutate(|d| d.save_task(session, task)).await
    }

    async fn delete_task(&self, session: &Session, id: &str) -> Result<()> {
        self.mutate(|d| d.delete_task(session, id)).await
    }

    async fn get_goals(&self, session: &Session) -> Result<Vec<Goal>> {
        Ok(self.read(|d| d.goals(session)).await)
    }

    async fn save_goal(&self, session: &Session, goal: &Goal) -> Result<()> {
        self.mutate(|d| d.save_goal(session, goal)).await
    }

    async fn delete_goal(&self, session: &Session, id: &str) -> Result<()> {
        self.mutate(|d| d.delete_goal(session, id)).await
    }

    async fn get_milestones(&self, session: &Session, goal_id: &str) -> Result<Vec<Milestone>> {
        Ok(self.read(|d| d.milestones(session, goal_id)).await)
    }

    async fn save_milestone(&self, session: &Session, milestone: &Milestone) -> Result<()> {
        self.mutate(|d| d.save_milestone(session, milestone)).await
    }

    async fn get_achievements(&self, session: &Session) -> Result<Vec<Achievement>> {
        Ok(self.read(|d| d.achievements(session)).await)
    }

    async fn save_achievement(&self, session: &Session, achievement: &Achievement) -> Result<()> {
        self.mutate(|d| d.save_achievement(session, achievement)).await
    }

    async fn delete_achievement(&self, session: &Session, id: &str) -> Result<()> {
        self.mutate(|d| d.delete_achievement(session, id)).await
    }
}
