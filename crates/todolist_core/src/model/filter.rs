use crate::error::AppError;
use crate::model::{Task, TaskStatus};
use std::str::FromStr;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StatusFilter {
    #[default]
    All,
    Pending,
    Completed,
}

impl StatusFilter {
    pub fn matches(self, status: TaskStatus) -> bool {
        match self {
            Self::All => true,
            Self::Pending => status == TaskStatus::Pending,
            Self::Completed => status == TaskStatus::Completed,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Pending => "pending",
            Self::Completed => "completed",
        }
    }
}

impl FromStr for StatusFilter {
    type Err = AppError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "all" => Ok(Self::All),
            "pending" => Ok(Self::Pending),
            "completed" | "done" => Ok(Self::Completed),
            other => Err(AppError::invalid_input(format!(
                "unknown status filter '{other}' (expected all, pending or completed)"
            ))),
        }
    }
}

/// View criteria applied on read; never stored with the tasks.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Filter {
    pub title_query: String,
    pub status: StatusFilter,
}

impl Filter {
    pub fn matches(&self, task: &Task) -> bool {
        let matches_title = self.title_query.is_empty()
            || task
                .title
                .to_lowercase()
                .contains(&self.title_query.to_lowercase());
        matches_title && self.status.matches(task.status)
    }

    pub fn apply(&mut self, patch: FilterPatch) {
        if let Some(title_query) = patch.title_query {
            self.title_query = title_query;
        }
        if let Some(status) = patch.status {
            self.status = status;
        }
    }
}

/// Partial update merged into a [`Filter`]; `None` leaves a field as is.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterPatch {
    pub title_query: Option<String>,
    pub status: Option<StatusFilter>,
}

impl FilterPatch {
    pub fn title<T: Into<String>>(title_query: T) -> Self {
        Self {
            title_query: Some(title_query.into()),
            status: None,
        }
    }

    pub fn status(status: StatusFilter) -> Self {
        Self {
            title_query: None,
            status: Some(status),
        }
    }

    /// Patch that restores the default filter.
    pub fn reset() -> Self {
        Self {
            title_query: Some(String::new()),
            status: Some(StatusFilter::All),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Filter, FilterPatch, StatusFilter};
    use crate::model::{Task, TaskDraft, TaskId, TaskStatus};
    use time::macros::datetime;

    fn task(title: &str, status: TaskStatus) -> Task {
        let mut draft = TaskDraft::blank(datetime!(2024-05-01 09:30 UTC));
        draft.title = title.to_string();
        draft.status = status;
        Task::from_draft(TaskId::new(1), draft)
    }

    #[test]
    fn empty_filter_matches_everything() {
        let filter = Filter::default();
        assert!(filter.matches(&task("", TaskStatus::Pending)));
        assert!(filter.matches(&task("anything", TaskStatus::Completed)));
    }

    #[test]
    fn title_query_is_case_insensitive_substring() {
        let filter = Filter {
            title_query: "MILK".to_string(),
            status: StatusFilter::All,
        };

        assert!(filter.matches(&task("Buy milk", TaskStatus::Pending)));
        assert!(filter.matches(&task("milkshake", TaskStatus::Completed)));
        assert!(!filter.matches(&task("Buy bread", TaskStatus::Pending)));
    }

    #[test]
    fn status_and_title_must_both_match() {
        let filter = Filter {
            title_query: "milk".to_string(),
            status: StatusFilter::Completed,
        };

        assert!(!filter.matches(&task("Buy milk", TaskStatus::Pending)));
        assert!(filter.matches(&task("Buy milk", TaskStatus::Completed)));
        assert!(!filter.matches(&task("Buy bread", TaskStatus::Completed)));
    }

    #[test]
    fn apply_merges_only_present_fields() {
        let mut filter = Filter::default();
        filter.apply(FilterPatch::title("milk"));
        filter.apply(FilterPatch::status(StatusFilter::Pending));

        assert_eq!(filter.title_query, "milk");
        assert_eq!(filter.status, StatusFilter::Pending);

        filter.apply(FilterPatch::reset());
        assert_eq!(filter, Filter::default());
    }

    #[test]
    fn status_filter_parses_known_values() {
        assert_eq!("all".parse::<StatusFilter>().unwrap(), StatusFilter::All);
        assert_eq!("Pending".parse::<StatusFilter>().unwrap(), StatusFilter::Pending);
        assert_eq!(
            "completed".parse::<StatusFilter>().unwrap(),
            StatusFilter::Completed
        );
        assert!("todos".parse::<StatusFilter>().is_err());
    }
}
