//! perftrack-ingest: import of third-party task-list exports (JSON) into
//! task lists and tasks.

pub mod error;
pub mod reconcile;
pub mod shape;

pub use error::ImportError;
pub use reconcile::{ImportProgress, ImportSummary, Importer, map_task, plan_import, progress_percent};
pub use shape::{ImportPlan, RawList, RawTask, RootShape};
