use anyhow::{Result, bail};
use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use perftrack_core::store::{MemoryStore, Store};
use perftrack_core::{Achievement, Goal, Milestone, Session, Task, TaskList, TaskStatus};
use perftrack_ingest::{ImportError, ImportProgress, ImportSummary, Importer};
use std::sync::atomic::{AtomicUsize, Ordering};

fn session() -> Session {
    Session::new("user-1")
}

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 10, 19, 12, 0, 0).unwrap()
}

async fn import(
    store: &dyn Store,
    content: &str,
    file_name: &str,
) -> (Result<ImportSummary, ImportError>, Vec<ImportProgress>) {
    let session = session();
    let mut events = Vec::new();
    let res = Importer::new(store, &session)
        .with_now(now())
        .run(content, file_name, |p| events.push(p))
        .await;
    (res, events)
}

#[tokio::test]
async fn test_items_envelope_yields_one_list_two_tasks() {
    let store = MemoryStore::new();
    let (res, _) = import(
        &store,
        r#"{"items":[{"title":"A"},{"title":"B","status":"completed"}]}"#,
        "tasks.json",
    )
    .await;
    let summary = res.unwrap();
    assert_eq!(summary, ImportSummary { lists: 1, tasks: 2, skipped: 0 });

    let lists = store.get_task_lists(&session()).await.unwrap();
    assert_eq!(lists.len(), 1);
    assert_eq!(lists[0].title, "tasks");

    let tasks = store.get_tasks(&session()).await.unwrap();
    let a = tasks.iter().find(|t| t.title == "A").unwrap();
    let b = tasks.iter().find(|t| t.title == "B").unwrap();
    assert_eq!(a.status, TaskStatus::Pending);
    assert!(a.completed_at.is_none());
    assert_eq!(b.status, TaskStatus::Completed);
    assert_eq!(b.completed_at, Some(now()));
    assert!(tasks.iter().all(|t| t.list_id == lists[0].id && t.user_id == "user-1"));
}

#[tokio::test]
async fn test_flat_array_skips_empty_title() {
    let store = MemoryStore::new();
    let (res, events) = import(&store, r#"[{"title":"X"},{"title":""}]"#, "Errands.json").await;
    let summary = res.unwrap();
    assert_eq!(summary.tasks, 1);
    assert_eq!(summary.skipped, 1);

    let tasks = store.get_tasks(&session()).await.unwrap();
    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0].title, "X");
    assert_eq!(store.get_task_lists(&session()).await.unwrap()[0].title, "Errands");
    assert_eq!(events.last().unwrap().percent, 100);
}

#[tokio::test]
async fn test_array_of_lists() {
    let store = MemoryStore::new();
    let content = r#"[
        {"kind": "tasks#taskList", "title": "Work", "items": [
            {"title": "Draft plan", "notes": "Q4", "due": "2026-11-01T00:00:00.000Z"},
            {"title": "Send invoice", "status": "completed", "completed": "2026-10-02T08:00:00.000Z"}
        ]},
        {"kind": "tasks#taskList", "items": [{"title": "Buy milk"}]},
        {"kind": "tasks#taskList", "title": "Empty"}
    ]"#;
    let (res, _) = import(&store, content, "takeout.json").await;
    assert_eq!(res.unwrap(), ImportSummary { lists: 3, tasks: 3, skipped: 0 });

    let lists = store.get_task_lists(&session()).await.unwrap();
    let titles: Vec<_> = lists.iter().map(|l| l.title.as_str()).collect();
    assert_eq!(titles, vec!["Work", "Imported List 2", "Empty"]);

    let tasks = store.get_tasks(&session()).await.unwrap();
    let plan = tasks.iter().find(|t| t.title == "Draft plan").unwrap();
    assert_eq!(plan.details.as_deref(), Some("Q4"));
    assert_eq!(plan.due_date.unwrap().to_string(), "2026-11-01");
    let invoice = tasks.iter().find(|t| t.title == "Send invoice").unwrap();
    assert_eq!(invoice.completed_at.unwrap().to_rfc3339(), "2026-10-02T08:00:00+00:00");
}

#[tokio::test]
async fn test_single_object_is_one_candidate() {
    let store = MemoryStore::new();
    let (res, _) = import(&store, r#"{"title": "Lone task"}"#, "one.json").await;
    assert_eq!(res.unwrap(), ImportSummary { lists: 1, tasks: 1, skipped: 0 });
    assert_eq!(store.get_tasks(&session()).await.unwrap()[0].title, "Lone task");
}

#[tokio::test]
async fn test_invalid_json_writes_nothing() {
    let store = MemoryStore::new();
    let (res, events) = import(&store, "{ this is not json", "broken.json").await;
    let err = res.unwrap_err();
    assert!(matches!(err, ImportError::Parse(_)));
    assert_eq!(err.to_string(), "Invalid JSON file");

    let data = store.snapshot();
    assert!(data.task_lists.is_empty());
    assert!(data.tasks.is_empty());
    assert!(events.iter().all(|e| e.percent == 0));
}

#[tokio::test]
async fn test_nothing_importable() {
    let store = MemoryStore::new();
    let (res, _) = import(&store, r#"{"items": []}"#, "empty.json").await;
    assert!(matches!(res, Err(ImportError::NoData)));
    assert!(store.snapshot().task_lists.is_empty());
}

#[tokio::test]
async fn test_progress_rises_to_exactly_100() {
    for n in [1usize, 2, 3, 7, 10, 64, 100] {
        let store = MemoryStore::new();
        let items: Vec<String> = (0..n).map(|i| format!(r#"{{"title":"t{i}"}}"#)).collect();
        let content = format!("[{}]", items.join(","));
        let (res, events) = import(&store, &content, "bulk.json").await;
        assert_eq!(res.unwrap().tasks, n);

        let per_task: Vec<u8> = events
            .iter()
            .filter(|e| e.status.starts_with("Importing"))
            .map(|e| e.percent)
            .collect();
        assert_eq!(per_task.len(), n);
        assert!(events[0].percent == 0);
        assert!(per_task.windows(2).all(|w| w[0] < w[1]), "n={n}: {per_task:?}");
        assert_eq!(*per_task.last().unwrap(), 100);
        assert_eq!(events.last().unwrap().status, "Import Complete!");
    }
}

#[tokio::test]
async fn test_progress_never_decreases_for_large_imports() {
    let store = MemoryStore::new();
    let items: Vec<String> = (0..250).map(|i| format!(r#"{{"title":"t{i}"}}"#)).collect();
    let (res, events) = import(&store, &format!("[{}]", items.join(",")), "big.json").await;
    assert_eq!(res.unwrap().tasks, 250);
    assert!(events.windows(2).all(|w| w[0].percent <= w[1].percent));
    assert_eq!(events.last().unwrap().percent, 100);
}

#[tokio::test]
async fn test_status_lines() {
    let store = MemoryStore::new();
    let (_, events) = import(&store, r#"[{"title":"a"},{"title":"b"}]"#, "Inbox.json").await;
    let lines: Vec<_> = events.iter().map(|e| e.status.as_str()).collect();
    assert_eq!(
        lines,
        vec![
            "Parsing JSON...",
            "Found 1 lists and 2 tasks...",
            "Importing Inbox (1/2)...",
            "Importing Inbox (2/2)...",
            "Import Complete!",
        ]
    );
}

#[tokio::test]
async fn test_bad_timestamp_halts_but_keeps_earlier_writes() {
    let store = MemoryStore::new();
    let content = r#"[{"title":"ok"},{"title":"bad","due":"whenever"},{"title":"never"}]"#;
    let (res, _) = import(&store, content, "x.json").await;
    assert!(matches!(res, Err(ImportError::InvalidTimestamp { field: "due", .. })));

    let titles: Vec<_> = store.get_tasks(&session()).await.unwrap().into_iter().map(|t| t.title).collect();
    assert_eq!(titles, vec!["ok".to_string()]);
    assert_eq!(store.snapshot().task_lists.len(), 1);
}

/// Store that fails after a fixed number of task writes.
struct FlakyStore {
    inner: MemoryStore,
    task_writes_left: AtomicUsize,
}

#[async_trait]
impl Store for FlakyStore {
    async fn get_task_lists(&self, s: &Session) -> Result<Vec<TaskList>> {
        self.inner.get_task_lists(s).await
    }
    async fn save_task_list(&self, s: &Session, l: &TaskList) -> Result<()> {
        self.inner.save_task_list(s, l).await
    }
    async fn delete_task_list(&self, s: &Session, id: &str) -> Result<()> {
        self.inner.delete_task_list(s, id).await
    }
    async fn get_tasks(&self, s: &Session) -> Result<Vec<Task>> {
        self.inner.get_tasks(s).await
    }
    async fn save_task(&self, s: &Session, t: &Task) -> Result<()> {
        let left = self.task_writes_left.load(Ordering::SeqCst);
        if left == 0 {
            bail!("connection reset");
        }
        self.task_writes_left.store(left - 1, Ordering::SeqCst);
        self.inner.save_task(s, t).await
    }
    async fn delete_task(&self, s: &Session, id: &str) -> Result<()> {
        self.inner.delete_task(s, id).await
    }
    async fn get_goals(&self, s: &Session) -> Result<Vec<Goal>> {
        self.inner.get_goals(s).await
    }
    async fn save_goal(&self, s: &Session, g: &Goal) -> Result<()> {
        self.inner.save_goal(s, g).await
    }
    async fn delete_goal(&self, s: &Session, id: &str) -> Result<()> {
        self.inner.delete_goal(s, id).await
    }
    async fn get_milestones(&self, s: &Session, goal_id: &str) -> Result<Vec<Milestone>> {
        self.inner.get_milestones(s, goal_id).await
    }
    async fn save_milestone(&self, s: &Session, m: &Milestone) -> Result<()> {
        self.inner.save_milestone(s, m).await
    }
    async fn get_achievements(&self, s: &Session) -> Result<Vec<Achievement>> {
        self.inner.get_achievements(s).await
    }
    async fn save_achievement(&self, s: &Session, a: &Achievement) -> Result<()> {
        self.inner.save_achievement(s, a).await
    }
    async fn delete_achievement(&self, s: &Session, id: &str) -> Result<()> {
        self.inner.delete_achievement(s, id).await
    }
}

#[tokio::test]
async fn test_store_failure_surfaces_message_without_rollback() {
    let store = FlakyStore {
        inner: MemoryStore::new(),
        task_writes_left: AtomicUsize::new(2),
    };
    let content = r#"[{"title":"1"},{"title":"2"},{"title":"3"},{"title":"4"}]"#;
    let (res, events) = import(&store, content, "x.json").await;
    let err = res.unwrap_err();
    assert!(matches!(err, ImportError::Store(_)));
    assert!(err.to_string().contains("connection reset"));

    assert_eq!(store.inner.snapshot().tasks.len(), 2);
    assert_eq!(events.last().unwrap().percent, 50);
}
