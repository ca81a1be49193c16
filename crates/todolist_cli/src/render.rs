use tabled::settings::Style;
use tabled::{Table, Tabled};
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;
use time::macros::format_description;
use todolist_core::config::Palette;
use todolist_core::error::AppError;
use todolist_core::model::{Filter, Task};
use todolist_core::session::FormDraft;

pub const EMPTY_MESSAGE: &str = "No tasks yet.";

#[derive(Tabled)]
struct TaskRow {
    #[tabled(rename = "#")]
    index: usize,
    #[tabled(rename = "Title")]
    title: String,
    #[tabled(rename = "Description")]
    description: String,
    #[tabled(rename = "Date")]
    date: String,
    #[tabled(rename = "Status")]
    status: &'static str,
}

/// Calendar date only, as the date picker shows it.
pub fn format_date(date: OffsetDateTime) -> Result<String, AppError> {
    date.format(format_description!("[day]/[month]/[year]"))
        .map_err(|err| AppError::invalid_data(err.to_string()))
}

fn format_timestamp(date: OffsetDateTime) -> Result<String, AppError> {
    date.format(&Rfc3339)
        .map_err(|err| AppError::invalid_data(err.to_string()))
}

/// Renders `(index, task)` pairs, where the index is the position in the
/// unfiltered list.
pub fn render_tasks(rows: &[(usize, &Task)], palette: &Palette) -> Result<String, AppError> {
    if rows.is_empty() {
        return Ok(palette.mutedize(EMPTY_MESSAGE));
    }

    let mut table_rows = Vec::with_capacity(rows.len());
    for (index, task) in rows {
        table_rows.push(TaskRow {
            index: *index,
            title: task.title.clone(),
            description: task.description.clone(),
            date: format_date(task.date)?,
            status: task.status.label(),
        });
    }

    let mut table = Table::new(table_rows);
    table.with(Style::rounded());
    Ok(table.to_string())
}

pub fn render_tasks_json(rows: &[(usize, &Task)]) -> Result<String, AppError> {
    let mut payload = Vec::with_capacity(rows.len());
    for (index, task) in rows {
        payload.push(task_json(*index, task)?);
    }
    Ok(serde_json::Value::Array(payload).to_string())
}

pub fn render_task_json(index: usize, task: &Task) -> Result<String, AppError> {
    Ok(task_json(index, task)?.to_string())
}

fn task_json(index: usize, task: &Task) -> Result<serde_json::Value, AppError> {
    let mut value =
        serde_json::to_value(task).map_err(|err| AppError::invalid_data(err.to_string()))?;
    if let serde_json::Value::Object(fields) = &mut value {
        fields.insert("index".to_string(), index.into());
    }
    Ok(value)
}

pub fn render_filter(filter: &Filter) -> String {
    let title = if filter.title_query.is_empty() {
        "-".to_string()
    } else {
        format!("\"{}\"", filter.title_query)
    };
    format!("Filter: title={} status={}", title, filter.status.label())
}

pub fn render_draft(draft: &FormDraft, palette: &Palette) -> Result<String, AppError> {
    let header = if draft.is_new() { "Add task" } else { "Edit task" };
    let mut lines = vec![palette.accentize(header)];
    lines.push(format!("  title:       {}", draft.task.title));
    lines.push(format!("  description: {}", draft.task.description));
    lines.push(format!("  date:        {}", format_date(draft.task.date)?));
    if !draft.is_new() {
        lines.push(format!("  status:      {}", draft.task.status.label()));
    }
    Ok(lines.join("\n"))
}

pub fn render_draft_json(draft: &FormDraft) -> Result<String, AppError> {
    let json = serde_json::json!({
        "mode": if draft.is_new() { "add" } else { "edit" },
        "target": draft.target.map(|id| id.get()),
        "title": draft.task.title,
        "description": draft.task.description,
        "date": format_timestamp(draft.task.date)?,
        "status": draft.task.status.label(),
    });
    Ok(json.to_string())
}

#[cfg(test)]
mod tests {
    use super::{EMPTY_MESSAGE, render_draft, render_filter, render_tasks, render_tasks_json};
    use time::macros::datetime;
    use todolist_core::config::palette_for_theme;
    use todolist_core::model::{Filter, StatusFilter, Task, TaskDraft, TaskId, TaskStatus};
    use todolist_core::session::FormDraft;

    fn task(id: u64, title: &str, status: TaskStatus) -> Task {
        Task::from_draft(
            TaskId::new(id),
            TaskDraft {
                title: title.to_string(),
                description: "desc".to_string(),
                date: datetime!(2024-12-24 18:45 UTC),
                status,
            },
        )
    }

    #[test]
    fn empty_view_renders_placeholder() {
        let rendered = render_tasks(&[], &palette_for_theme(None)).unwrap();
        assert_eq!(rendered, EMPTY_MESSAGE);
    }

    #[test]
    fn table_shows_index_date_and_status() {
        let milk = task(1, "Buy milk", TaskStatus::Completed);
        let rendered = render_tasks(&[(3, &milk)], &palette_for_theme(None)).unwrap();

        assert!(rendered.contains("Buy milk"));
        assert!(rendered.contains("24/12/2024"));
        assert!(rendered.contains("completed"));
        assert!(rendered.contains(" 3 "));
        assert!(!rendered.contains("18:45"));
    }

    #[test]
    fn json_keeps_positional_index_and_full_date() {
        let milk = task(9, "Buy milk", TaskStatus::Pending);
        let rendered = render_tasks_json(&[(0, &milk)]).unwrap();
        let value: serde_json::Value = serde_json::from_str(&rendered).unwrap();

        assert_eq!(value[0]["index"], 0);
        assert_eq!(value[0]["id"], 9);
        assert_eq!(value[0]["date"], "2024-12-24T18:45:00Z");
        assert_eq!(value[0]["status"], "pending");
        assert_eq!(value[0]["title"], "Buy milk");
        assert_eq!(value[0]["description"], "desc");
    }

    #[test]
    fn draft_hides_status_for_new_tasks() {
        let palette = palette_for_theme(None);
        let milk = task(1, "Buy milk", TaskStatus::Pending);
        let new_draft = FormDraft {
            task: TaskDraft::from(&milk),
            target: None,
        };
        let edit_draft = FormDraft {
            task: TaskDraft::from(&milk),
            target: Some(milk.id),
        };

        let rendered_new = render_draft(&new_draft, &palette).unwrap();
        assert!(rendered_new.starts_with("Add task"));
        assert!(!rendered_new.contains("status:"));

        let rendered_edit = render_draft(&edit_draft, &palette).unwrap();
        assert!(rendered_edit.starts_with("Edit task"));
        assert!(rendered_edit.contains("status:      pending"));
    }

    #[test]
    fn filter_summary_names_both_criteria() {
        let filter = Filter {
            title_query: "milk".to_string(),
            status: StatusFilter::Completed,
        };
        assert_eq!(
            render_filter(&filter),
            "Filter: title=\"milk\" status=completed"
        );
        assert_eq!(
            render_filter(&Filter::default()),
            "Filter: title=- status=all"
        );
    }
}
