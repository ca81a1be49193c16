pub mod config;
pub mod error;
pub mod model;
pub mod notify;
pub mod session;
pub mod store;

pub use error::AppError;
pub use model::{Filter, FilterPatch, StatusFilter, Task, TaskDraft, TaskId, TaskStatus};
pub use session::{DraftField, FormDraft, SaveOutcome, SaveTicket, Session};
pub use store::TaskStore;
