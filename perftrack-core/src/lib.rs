//! perftrack-core: records, report windows and report assembly for the
//! performance tracker.

pub mod achievement;
pub mod goals;
pub mod period;
pub mod report;
pub mod session;
pub mod store;
pub mod task;
pub mod time;

pub use achievement::{Achievement, AchievementType};
pub use goals::{Goal, Habit, Milestone, MilestoneStatus};
pub use period::{Anchor, DateRange, Quarter, ReportType, YearMonth};
pub use report::{ReportContext, DEFAULT_TONE, REPORT_SECTIONS, achievements_in, completed_tasks_in};
pub use session::Session;
pub use store::{MemoryStore, Store, StoreData, ensure_default_list, tasks_in_list};
pub use task::{Task, TaskList, TaskStatus};
