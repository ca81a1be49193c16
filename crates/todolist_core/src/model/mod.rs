mod filter;
mod task;

pub use filter::{Filter, FilterPatch, StatusFilter};
pub use task::{Task, TaskDraft, TaskId, TaskStatus};
