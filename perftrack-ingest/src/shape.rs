//! Shape classification for task-list exports.
//!
//! Exports arrive as one of:
//!   - an array of lists, each with an `items` array of tasks
//!   - `{ "items": [...] }` wrapping either lists or tasks
//!   - an array of tasks (a single-list export)
//!   - a single list or task object
//!
//! [`RootShape`] settles where the candidates live, [`ImportPlan`] settles
//! whether those candidates are lists or tasks.

use regex::Regex;
use serde_json::Value;
use std::sync::LazyLock;

const TASK_LIST_KIND: &str = "tasks#taskList";
const FLAT_LIST_FALLBACK: &str = "Imported Tasks";

static JSON_SUFFIX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)\.json$").expect("valid regex"));

/// Where the candidate items sit in the parsed document.
#[derive(Debug, Clone, PartialEq)]
pub enum RootShape {
    /// Root is an array; its elements are the candidates.
    Sequence(Vec<Value>),
    /// Root is an object carrying an `items` array.
    ItemsEnvelope(Vec<Value>),
    /// Anything else: the root itself is the only candidate.
    Single(Value),
}

impl RootShape {
    pub fn detect(root: Value) -> Self {
        match root {
            Value::Array(items) => RootShape::Sequence(items),
            Value::Object(mut map) => match map.remove("items") {
                Some(Value::Array(items)) => RootShape::ItemsEnvelope(items),
                Some(other) => {
                    map.insert("items".to_string(), other);
                    RootShape::Single(Value::Object(map))
                }
                None => RootShape::Single(Value::Object(map)),
            },
            other => RootShape::Single(other),
        }
    }

    pub fn into_candidates(self) -> Vec<Value> {
        match self {
            RootShape::Sequence(items) | RootShape::ItemsEnvelope(items) => items,
            RootShape::Single(v) => vec![v],
        }
    }
}

/// A task as found in the export, before mapping.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawTask {
    pub title: Option<String>,
    pub notes: Option<String>,
    pub due: Option<String>,
    pub status: Option<String>,
    /// Completion timestamp (or a bare `true` in some exports).
    pub completed: Option<Value>,
    pub updated: Option<String>,
}

fn str_field(v: &Value, key: &str) -> Option<String> {
    v.get(key).and_then(Value::as_str).map(str::to_string)
}

impl RawTask {
    /// Pull the known fields out of a candidate; anything that is not an
    /// object yields an untitled task, which the importer skips.
    pub fn from_value(v: &Value) -> Self {
        Self {
            title: str_field(v, "title"),
            notes: str_field(v, "notes"),
            due: str_field(v, "due"),
            status: str_field(v, "status"),
            completed: v.get("completed").filter(|c| !c.is_null()).cloned(),
            updated: str_field(v, "updated"),
        }
    }

    /// Non-blank title, trimmed.
    pub fn usable_title(&self) -> Option<&str> {
        self.title.as_deref().map(str::trim).filter(|t| !t.is_empty())
    }

    pub fn is_completed(&self) -> bool {
        self.status.as_deref() == Some("completed") || self.completed == Some(Value::Bool(true))
    }

    /// Completion timestamp text, when the export carries one.
    pub fn completed_at(&self) -> Option<&str> {
        self.completed.as_ref().and_then(Value::as_str)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawList {
    pub title: Option<String>,
    pub tasks: Vec<RawTask>,
}

impl RawList {
    fn from_value(v: &Value) -> Self {
        let tasks = v
            .get("items")
            .and_then(Value::as_array)
            .map(|items| items.iter().map(RawTask::from_value).collect())
            .unwrap_or_default();
        Self {
            title: str_field(v, "title").filter(|t| !t.trim().is_empty()),
            tasks,
        }
    }
}

fn looks_like_list(v: &Value) -> bool {
    v.get("items").is_some_and(Value::is_array)
        || v.get("kind").and_then(Value::as_str) == Some(TASK_LIST_KIND)
}

/// What the candidates turned out to be.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportPlan {
    /// At least one candidate is list-like, so every candidate is a list.
    Lists(Vec<RawList>),
    /// No candidate is list-like: they are the tasks of one synthetic list.
    FlatTasks { list_title: String, tasks: Vec<RawTask> },
}

impl ImportPlan {
    pub fn classify(candidates: Vec<Value>, file_name: &str) -> Self {
        if candidates.iter().any(looks_like_list) {
            ImportPlan::Lists(candidates.iter().map(RawList::from_value).collect())
        } else {
            ImportPlan::FlatTasks {
                list_title: list_title_from_file_name(file_name),
                tasks: candidates.iter().map(RawTask::from_value).collect(),
            }
        }
    }

    /// Lists that will be created. A flat export with no tasks creates none,
    /// so an empty file imports as "no data" rather than an empty list.
    pub fn list_count(&self) -> usize {
        match self {
            ImportPlan::Lists(lists) => lists.len(),
            ImportPlan::FlatTasks { tasks, .. } if tasks.is_empty() => 0,
            ImportPlan::FlatTasks { .. } => 1,
        }
    }

    /// Raw task entries across all lists, including ones that will be skipped.
    pub fn task_count(&self) -> usize {
        match self {
            ImportPlan::Lists(lists) => lists.iter().map(|l| l.tasks.len()).sum(),
            ImportPlan::FlatTasks { tasks, .. } => tasks.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.list_count() == 0 && self.task_count() == 0
    }

    pub fn into_lists(self) -> Vec<RawList> {
        match self {
            ImportPlan::Lists(lists) => lists,
            ImportPlan::FlatTasks { tasks, .. } if tasks.is_empty() => Vec::new(),
            ImportPlan::FlatTasks { list_title, tasks } => vec![RawList {
                title: Some(list_title),
                tasks,
            }],
        }
    }
}

/// `My Tasks.JSON` -> `My Tasks`; an empty stem falls back to "Imported Tasks".
pub fn list_title_from_file_name(file_name: &str) -> String {
    let name = file_name.trim();
    let stem = JSON_SUFFIX.replace(name, "").into_owned();
    if stem.is_empty() {
        FLAT_LIST_FALLBACK.to_string()
    } else {
        stem
    }
}
