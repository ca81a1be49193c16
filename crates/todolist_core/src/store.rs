use crate::error::AppError;
use crate::model::{Filter, FilterPatch, Task, TaskDraft, TaskId, TaskStatus};
use log::debug;

/// Ordered task list plus the active filter. Insertion order is display order.
#[derive(Debug, Clone, Default)]
pub struct TaskStore {
    tasks: Vec<Task>,
    filter: Filter,
    next_id: u64,
}

impl TaskStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn filter(&self) -> &Filter {
        &self.filter
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn set_filter(&mut self, patch: FilterPatch) {
        self.filter.apply(patch);
        debug!(
            "filter set: title_query={:?} status={}",
            self.filter.title_query,
            self.filter.status.label()
        );
    }

    pub fn filtered_view(&self) -> Vec<&Task> {
        self.tasks
            .iter()
            .filter(|task| self.filter.matches(task))
            .collect()
    }

    /// Like [`filtered_view`](Self::filtered_view) but paired with each task's
    /// position in the unfiltered list.
    pub fn filtered_view_indexed(&self) -> Vec<(usize, &Task)> {
        self.tasks
            .iter()
            .enumerate()
            .filter(|(_, task)| self.filter.matches(task))
            .collect()
    }

    pub fn id_at(&self, index: usize) -> Result<TaskId, AppError> {
        self.tasks
            .get(index)
            .map(|task| task.id)
            .ok_or_else(|| AppError::out_of_range(index, self.tasks.len()))
    }

    pub fn position(&self, id: TaskId) -> Option<usize> {
        self.tasks.iter().position(|task| task.id == id)
    }

    pub fn get(&self, id: TaskId) -> Option<&Task> {
        self.tasks.iter().find(|task| task.id == id)
    }

    pub fn add(&mut self, draft: TaskDraft) -> TaskId {
        self.next_id += 1;
        let id = TaskId::new(self.next_id);
        self.tasks.push(Task::from_draft(id, draft));
        debug!("added {id} at index {}", self.tasks.len() - 1);
        id
    }

    pub fn update(&mut self, id: TaskId, draft: TaskDraft) -> Result<&Task, AppError> {
        let task = self
            .tasks
            .iter_mut()
            .find(|task| task.id == id)
            .ok_or_else(|| AppError::not_found(format!("{id} no longer exists")))?;
        task.apply(draft);
        debug!("updated {id}");
        Ok(task)
    }

    pub fn toggle_complete(&mut self, id: TaskId) -> Result<TaskStatus, AppError> {
        let task = self
            .tasks
            .iter_mut()
            .find(|task| task.id == id)
            .ok_or_else(|| AppError::not_found(format!("{id} no longer exists")))?;
        task.status = task.status.toggled();
        debug!("toggled {id} to {}", task.status.label());
        Ok(task.status)
    }

    pub fn delete(&mut self, id: TaskId) -> Result<Task, AppError> {
        let index = self
            .position(id)
            .ok_or_else(|| AppError::not_found(format!("{id} no longer exists")))?;
        let removed = self.tasks.remove(index);
        debug!("deleted {id} from index {index}");
        Ok(removed)
    }
}
