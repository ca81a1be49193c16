use crate::error::AppError;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;
use time::OffsetDateTime;

/// Stable identity of a task, assigned by the store on insertion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct TaskId(u64);

impl TaskId {
    pub fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "task-{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Task {
    pub id: TaskId,
    pub title: String,
    pub description: String,
    #[serde(with = "time::serde::rfc3339")]
    pub date: OffsetDateTime,
    pub status: TaskStatus,
}

impl Task {
    pub fn from_draft(id: TaskId, draft: TaskDraft) -> Self {
        Self {
            id,
            title: draft.title,
            description: draft.description,
            date: draft.date,
            status: draft.status,
        }
    }

    /// Overwrites every field except the id.
    pub fn apply(&mut self, draft: TaskDraft) {
        self.title = draft.title;
        self.description = draft.description;
        self.date = draft.date;
        self.status = draft.status;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Pending,
    Completed,
}

impl TaskStatus {
    pub fn toggled(self) -> Self {
        match self {
            Self::Pending => Self::Completed,
            Self::Completed => Self::Pending,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Completed => "completed",
        }
    }
}

impl FromStr for TaskStatus {
    type Err = AppError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "pending" => Ok(Self::Pending),
            "completed" | "done" => Ok(Self::Completed),
            other => Err(AppError::invalid_input(format!(
                "unknown status '{other}' (expected pending or completed)"
            ))),
        }
    }
}

/// Editable body of a task: everything except its identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskDraft {
    pub title: String,
    pub description: String,
    pub date: OffsetDateTime,
    pub status: TaskStatus,
}

impl TaskDraft {
    pub fn blank(now: OffsetDateTime) -> Self {
        Self {
            title: String::new(),
            description: String::new(),
            date: now,
            status: TaskStatus::Pending,
        }
    }
}

impl From<&Task> for TaskDraft {
    fn from(task: &Task) -> Self {
        Self {
            title: task.title.clone(),
            description: task.description.clone(),
            date: task.date,
            status: task.status,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Task, TaskDraft, TaskId, TaskStatus};
    use time::macros::datetime;

    #[test]
    fn toggled_flips_between_both_states() {
        assert_eq!(TaskStatus::Pending.toggled(), TaskStatus::Completed);
        assert_eq!(TaskStatus::Completed.toggled(), TaskStatus::Pending);
    }

    #[test]
    fn status_parses_labels_case_insensitively() {
        assert_eq!(" Pending ".parse::<TaskStatus>().unwrap(), TaskStatus::Pending);
        assert_eq!("COMPLETED".parse::<TaskStatus>().unwrap(), TaskStatus::Completed);
        let err = "archived".parse::<TaskStatus>().unwrap_err();
        assert_eq!(err.code(), "invalid_input");
    }

    #[test]
    fn blank_draft_is_pending_and_empty() {
        let now = datetime!(2024-05-01 09:30 UTC);
        let draft = TaskDraft::blank(now);

        assert!(draft.title.is_empty());
        assert!(draft.description.is_empty());
        assert_eq!(draft.date, now);
        assert_eq!(draft.status, TaskStatus::Pending);
    }

    #[test]
    fn apply_keeps_the_id() {
        let now = datetime!(2024-05-01 09:30 UTC);
        let mut task = Task::from_draft(TaskId::new(7), TaskDraft::blank(now));
        let draft = TaskDraft {
            title: "Buy milk".to_string(),
            description: "semi-skimmed".to_string(),
            date: datetime!(2024-05-02 09:30 UTC),
            status: TaskStatus::Completed,
        };

        task.apply(draft.clone());

        assert_eq!(task.id, TaskId::new(7));
        assert_eq!(TaskDraft::from(&task), draft);
    }

    #[test]
    fn task_serializes_with_rfc3339_date() {
        let task = Task::from_draft(
            TaskId::new(1),
            TaskDraft {
                title: "demo".to_string(),
                description: String::new(),
                date: datetime!(2024-05-01 09:30 UTC),
                status: TaskStatus::Pending,
            },
        );

        let json = serde_json::to_value(&task).unwrap();
        assert_eq!(json["id"], 1);
        assert_eq!(json["date"], "2024-05-01T09:30:00Z");
        assert_eq!(json["status"], "pending");
    }
}
