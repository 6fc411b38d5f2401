//! Persistence seam.
//!
//! [`Store`] is the data-access collaborator every command talks to. Records
//! are always scoped to the [`Session`] user; `save_*` stamps the owner and
//! upserts by id. [`StoreData`] holds the plain record set so in-memory and
//! file-backed stores share the same semantics.

use anyhow::{Result, bail};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Mutex;
use tracing::debug;

use crate::achievement::Achievement;
use crate::goals::{Goal, Milestone};
use crate::session::Session;
use crate::task::{Task, TaskList, sort_newest_first};

#[async_trait]
pub trait Store: Send + Sync {
    async fn get_task_lists(&self, session: &Session) -> Result<Vec<TaskList>>;
    async fn save_task_list(&self, session: &Session, list: &TaskList) -> Result<()>;
    async fn delete_task_list(&self, session: &Session, id: &str) -> Result<()>;

    async fn get_tasks(&self, session: &Session) -> Result<Vec<Task>>;
    async fn save_task(&self, session: &Session, task: &Task) -> Result<()>;
    async fn delete_task(&self, session: &Session, id: &str) -> Result<()>;

    async fn get_goals(&self, session: &Session) -> Result<Vec<Goal>>;
    async fn save_goal(&self, session: &Session, goal: &Goal) -> Result<()>;
    async fn delete_goal(&self, session: &Session, id: &str) -> Result<()>;

    async fn get_milestones(&self, session: &Session, goal_id: &str) -> Result<Vec<Milestone>>;
    async fn save_milestone(&self, session: &Session, milestone: &Milestone) -> Result<()>;

    async fn get_achievements(&self, session: &Session) -> Result<Vec<Achievement>>;
    async fn save_achievement(&self, session: &Session, achievement: &Achievement) -> Result<()>;
    async fn delete_achievement(&self, session: &Session, id: &str) -> Result<()>;
}

/// Records that belong to exactly one user.
pub trait Owned {
    fn id(&self) -> &str;
    fn owner(&self) -> &str;
    fn set_owner(&mut self, user_id: &str);
}

macro_rules! impl_owned {
    ($($t:ty),*) => {
        $(impl Owned for $t {
            fn id(&self) -> &str {
                &self.id
            }
            fn owner(&self) -> &str {
                &self.user_id
            }
            fn set_owner(&mut self, user_id: &str) {
                self.user_id = user_id.to_string();
            }
        })*
    };
}

impl_owned!(Task, TaskList, Goal, Achievement);

fn owned_by<T: Owned + Clone>(items: &[T], session: &Session) -> Vec<T> {
    items.iter().filter(|i| session.owns(i.owner())).cloned().collect()
}

fn upsert<T: Owned + Clone>(items: &mut Vec<T>, session: &Session, item: &T) -> Result<()> {
    let mut item = item.clone();
    item.set_owner(&session.user_id);
    match items.iter_mut().find(|i| i.id() == item.id()) {
        Some(existing) if !session.owns(existing.owner()) => {
            bail!("record {} belongs to another user", item.id())
        }
        Some(existing) => *existing = item,
        None => items.push(item),
    }
    Ok(())
}

fn remove<T: Owned>(items: &mut Vec<T>, session: &Session, id: &str) -> Result<()> {
    let before = items.len();
    items.retain(|i| !(i.id() == id && session.owns(i.owner())));
    if items.len() == before {
        bail!("no record with id {id}");
    }
    Ok(())
}

/// The full record set behind a store.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreData {
    #[serde(default)]
    pub task_lists: Vec<TaskList>,
    #[serde(default)]
    pub tasks: Vec<Task>,
    #[serde(default)]
    pub goals: Vec<Goal>,
    #[serde(default)]
    pub milestones: Vec<Milestone>,
    #[serde(default)]
    pub achievements: Vec<Achievement>,
}

impl StoreData {
    pub fn task_lists(&self, session: &Session) -> Vec<TaskList> {
        owned_by(&self.task_lists, session)
    }

    pub fn save_task_list(&mut self, session: &Session, list: &TaskList) -> Result<()> {
        upsert(&mut self.task_lists, session, list)
    }

    /// Removes a non-default list together with its tasks.
    pub fn delete_task_list(&mut self, session: &Session, id: &str) -> Result<()> {
        if let Some(list) = self.task_lists.iter().find(|l| l.id == id && session.owns(&l.user_id)) {
            if list.is_default {
                bail!("the default list cannot be deleted");
            }
        }
        remove(&mut self.task_lists, session, id)?;
        let before = self.tasks.len();
        self.tasks.retain(|t| !(t.list_id == id && session.owns(&t.user_id)));
        debug!(list_id = id, removed_tasks = before - self.tasks.len(), "deleted task list");
        Ok(())
    }

    pub fn tasks(&self, session: &Session) -> Vec<Task> {
        owned_by(&self.tasks, session)
    }

    pub fn save_task(&mut self, session: &Session, task: &Task) -> Result<()> {
        if !self.task_lists.iter().any(|l| l.id == task.list_id && session.owns(&l.user_id)) {
            bail!("task list {} does not exist", task.list_id);
        }
        upsert(&mut self.tasks, session, task)
    }

    pub fn delete_task(&mut self, session: &Session, id: &str) -> Result<()> {
        remove(&mut self.tasks, session, id)
    }

    pub fn goals(&self, session: &Session) -> Vec<Goal> {
        owned_by(&self.goals, session)
    }

    pub fn save_goal(&mut self, session: &Session, goal: &Goal) -> Result<()> {
        upsert(&mut self.goals, session, goal)
    }

    /// Removes a goal, its milestones, and unlinks tasks that pointed at it.
    pub fn delete_goal(&mut self, session: &Session, id: &str) -> Result<()> {
        remove(&mut self.goals, session, id)?;
        self.milestones.retain(|m| m.goal_id != id);
        for t in self.tasks.iter_mut().filter(|t| session.owns(&t.user_id)) {
            if t.goal_id.as_deref() == Some(id) {
                t.goal_id = None;
            }
        }
        Ok(())
    }

    fn owns_goal(&self, session: &Session, goal_id: &str) -> bool {
        self.goals.iter().any(|g| g.id == goal_id && session.owns(&g.user_id))
    }

    pub fn milestones(&self, session: &Session, goal_id: &str) -> Vec<Milestone> {
        if !self.owns_goal(session, goal_id) {
            return Vec::new();
        }
        let mut out: Vec<Milestone> = self
            .milestones
            .iter()
            .filter(|m| m.goal_id == goal_id)
            .cloned()
            .collect();
        out.sort_by_key(|m| m.due_date);
        out
    }

    pub fn save_milestone(&mut self, session: &Session, milestone: &Milestone) -> Result<()> {
        if !self.owns_goal(session, &milestone.goal_id) {
            bail!("goal {} does not exist", milestone.goal_id);
        }
        // A milestone hanging off someone else's goal is theirs, whatever goal_id the update names.
        if self
            .milestones
            .iter()
            .any(|m| m.id == milestone.id && !self.owns_goal(session, &m.goal_id))
        {
            bail!("record {} belongs to another user", milestone.id);
        }
        match self.milestones.iter_mut().find(|m| m.id == milestone.id) {
            Some(existing) => *existing = milestone.clone(),
            None => self.milestones.push(milestone.clone()),
        }
        Ok(())
    }

    pub fn achievements(&self, session: &Session) -> Vec<Achievement> {
        let mut out = owned_by(&self.achievements, session);
        out.sort_by(|a, b| b.date.cmp(&a.date));
        out
    }

    pub fn save_achievement(&mut self, session: &Session, achievement: &Achievement) -> Result<()> {
        upsert(&mut self.achievements, session, achievement)
    }

    pub fn delete_achievement(&mut self, session: &Session, id: &str) -> Result<()> {
        remove(&mut self.achievements, session, id)
    }
}

/// Process-local store, used by tests and dry runs.
#[derive(Debug, Default)]
pub struct MemoryStore {
    data: Mutex<StoreData>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> StoreData {
        self.lock().clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, StoreData> {
        // A poisoned lock only means another test thread panicked mid-write.
        self.data.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn get_task_lists(&self, session: &Session) -> Result<Vec<TaskList>> {
        Ok(self.lock().task_lists(session))
    }

    async fn save_task_list(&self, session: &Session, list: &TaskList) -> Result<()> {
        self.lock().save_task_list(session, list)
    }

    async fn delete_task_list(&self, session: &Session, id: &str) -> Result<()> {
        self.lock().delete_task_list(session, id)
    }

    async fn get_tasks(&self, session: &Session) -> Result<Vec<Task>> {
        Ok(self.lock().tasks(session))
    }

    async fn save_task(&self, session: &Session, task: &Task) -> Result<()> {
        self.lock().save_task(session, task)
    }

    async fn delete_task(&self, session: &Session, id: &str) -> Result<()> {
        self.lock().delete_task(session, id)
    }

    async fn get_goals(&self, session: &Session) -> Result<Vec<Goal>> {
        Ok(self.lock().goals(session))
    }

    async fn save_goal(&self, session: &Session, goal: &Goal) -> Result<()> {
        self.lock().save_goal(session, goal)
    }

    async fn delete_goal(&self, session: &Session, id: &str) -> Result<()> {
        self.lock().delete_goal(session, id)
    }

    async fn get_milestones(&self, session: &Session, goal_id: &str) -> Result<Vec<Milestone>> {
        Ok(self.lock().milestones(session, goal_id))
    }

    async fn save_milestone(&self, session: &Session, milestone: &Milestone) -> Result<()> {
        self.lock().save_milestone(session, milestone)
    }

    async fn get_achievements(&self, session: &Session) -> Result<Vec<Achievement>> {
        Ok(self.lock().achievements(session))
    }

    async fn save_achievement(&self, session: &Session, achievement: &Achievement) -> Result<()> {
        self.lock().save_achievement(session, achievement)
    }

    async fn delete_achievement(&self, session: &Session, id: &str) -> Result<()> {
        self.lock().delete_achievement(session, id)
    }
}

/// Return the user's default list, creating it when the user has none.
pub async fn ensure_default_list(store: &dyn Store, session: &Session) -> Result<TaskList> {
    let lists = store.get_task_lists(session).await?;
    if let Some(list) = lists.iter().find(|l| l.is_default) {
        return Ok(list.clone());
    }
    if let Some(first) = lists.into_iter().next() {
        return Ok(first);
    }
    let list = TaskList::default_list();
    store.save_task_list(session, &list).await?;
    debug!(list_id = %list.id, "created default task list");
    Ok(list)
}

/// Tasks of one list, newest first.
pub async fn tasks_in_list(store: &dyn Store, session: &Session, list_id: &str) -> Result<Vec<Task>> {
    let mut tasks: Vec<Task> = store
        .get_tasks(session)
        .await?
        .into_iter()
        .filter(|t| t.list_id == list_id)
        .collect();
    sort_newest_first(&mut tasks);
    Ok(tasks)
}
