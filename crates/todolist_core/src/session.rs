//! View state wrapped around a [`TaskStore`]: the add/edit dialog, its draft
//! and the delayed save.
//!
//! Index-based operations resolve the index to a [`TaskId`] when they are
//! invoked, so a save that commits later still targets the task that was
//! opened, never whatever has since moved into its old position.

use crate::error::AppError;
use crate::model::{FilterPatch, Task, TaskDraft, TaskId, TaskStatus};
use crate::notify::{Notice, NoticeKind, Notifier};
use crate::store::TaskStore;
use log::{debug, info, warn};
use std::time::{Duration, Instant};
use time::{Date, OffsetDateTime};

pub const DEFAULT_SAVE_DELAY: Duration = Duration::from_millis(1000);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DraftField {
    Title(String),
    Description(String),
    /// Picks a calendar day; the draft keeps its time of day.
    Date(Date),
    Status(TaskStatus),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormDraft {
    pub task: TaskDraft,
    /// `None` while creating a new task.
    pub target: Option<TaskId>,
}

impl FormDraft {
    pub fn is_new(&self) -> bool {
        self.target.is_none()
    }
}

/// Handle to a pending save; invalidated by [`Session::cancel_edit`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SaveTicket(u64);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveOutcome {
    Added(TaskId),
    Updated(TaskId),
    Failed(AppError),
}

#[derive(Debug)]
struct PendingSave {
    ticket: SaveTicket,
    due: Instant,
    draft: FormDraft,
}

pub struct Session {
    store: TaskStore,
    draft: Option<FormDraft>,
    dialog_open: bool,
    pending: Option<PendingSave>,
    save_delay: Duration,
    next_ticket: u64,
    notifier: Box<dyn Notifier>,
}

impl Session {
    pub fn new(notifier: Box<dyn Notifier>, save_delay: Duration) -> Self {
        Self {
            store: TaskStore::new(),
            draft: None,
            dialog_open: false,
            pending: None,
            save_delay,
            next_ticket: 0,
            notifier,
        }
    }

    pub fn store(&self) -> &TaskStore {
        &self.store
    }

    pub fn draft(&self) -> Option<&FormDraft> {
        self.draft.as_ref()
    }

    pub fn is_dialog_open(&self) -> bool {
        self.dialog_open
    }

    pub fn is_saving(&self) -> bool {
        self.pending.is_some()
    }

    pub fn save_delay(&self) -> Duration {
        self.save_delay
    }

    /// Instant at which the pending save becomes due, if one is pending.
    pub fn pending_due(&self) -> Option<Instant> {
        self.pending.as_ref().map(|pending| pending.due)
    }

    pub fn set_filter(&mut self, patch: FilterPatch) {
        self.store.set_filter(patch);
    }

    pub fn filtered_view(&self) -> Vec<&Task> {
        self.store.filtered_view()
    }

    pub fn begin_create(&mut self, now: OffsetDateTime) -> Result<(), AppError> {
        self.ensure_idle()?;
        self.draft = Some(FormDraft {
            task: TaskDraft::blank(now),
            target: None,
        });
        self.dialog_open = true;
        debug!("dialog opened for a new task");
        Ok(())
    }

    pub fn begin_edit(&mut self, index: usize) -> Result<(), AppError> {
        self.ensure_idle()?;
        let id = self.store.id_at(index)?;
        let task = self
            .store
            .get(id)
            .ok_or_else(|| AppError::not_found(format!("{id} no longer exists")))?;
        self.draft = Some(FormDraft {
            task: TaskDraft::from(task),
            target: Some(id),
        });
        self.dialog_open = true;
        debug!("dialog opened to edit {id} (index {index})");
        Ok(())
    }

    pub fn update_draft_field(&mut self, field: DraftField) -> Result<(), AppError> {
        self.ensure_idle()?;
        let draft = self
            .draft
            .as_mut()
            .ok_or_else(|| AppError::invalid_input("no task is being edited"))?;

        match field {
            DraftField::Title(title) => draft.task.title = title,
            DraftField::Description(description) => draft.task.description = description,
            DraftField::Date(date) => draft.task.date = draft.task.date.replace_date(date),
            DraftField::Status(status) => {
                if draft.is_new() {
                    return Err(AppError::invalid_input(
                        "status can only be changed when editing a task",
                    ));
                }
                draft.task.status = status;
            }
        }
        Ok(())
    }

    /// Starts the delayed save of the open draft. The commit happens on the
    /// first [`poll`](Self::poll) at or after `now + save_delay`, or on
    /// [`finish_save`](Self::finish_save).
    pub fn save(&mut self, now: Instant) -> Result<SaveTicket, AppError> {
        self.ensure_idle()?;
        let draft = self
            .draft
            .clone()
            .ok_or_else(|| AppError::invalid_input("no task is being edited"))?;

        self.next_ticket += 1;
        let ticket = SaveTicket(self.next_ticket);
        self.pending = Some(PendingSave {
            ticket,
            due: now + self.save_delay,
            draft,
        });
        debug!("save {} scheduled in {:?}", ticket.0, self.save_delay);
        Ok(ticket)
    }

    pub fn poll(&mut self, now: Instant) -> Option<SaveOutcome> {
        let due = self
            .pending
            .as_ref()
            .is_some_and(|pending| pending.due <= now);
        if due { self.commit() } else { None }
    }

    /// Commits immediately if `ticket` is still the pending save.
    pub fn finish_save(&mut self, ticket: SaveTicket) -> Option<SaveOutcome> {
        let current = self
            .pending
            .as_ref()
            .is_some_and(|pending| pending.ticket == ticket);
        if current { self.commit() } else { None }
    }

    pub fn cancel_edit(&mut self) {
        if let Some(pending) = self.pending.take() {
            info!("save {} cancelled before commit", pending.ticket.0);
        }
        self.draft = None;
        self.dialog_open = false;
        debug!("dialog closed");
    }

    pub fn toggle_complete(&mut self, index: usize) -> Result<TaskStatus, AppError> {
        let id = self.store.id_at(index)?;
        let status = self.store.toggle_complete(id)?;
        self.emit(NoticeKind::StatusUpdated);
        Ok(status)
    }

    pub fn delete_task(&mut self, index: usize) -> Result<Task, AppError> {
        let id = self.store.id_at(index)?;
        let removed = self.store.delete(id)?;
        self.emit(NoticeKind::Deleted);
        Ok(removed)
    }

    fn commit(&mut self) -> Option<SaveOutcome> {
        let pending = self.pending.take()?;
        let FormDraft { task, target } = pending.draft;

        let outcome = match target {
            Some(id) => match self.store.update(id, task) {
                Ok(_) => {
                    info!("save {} committed: updated {id}", pending.ticket.0);
                    self.emit(NoticeKind::Updated);
                    SaveOutcome::Updated(id)
                }
                Err(err) => {
                    warn!("save {} dropped: {err}", pending.ticket.0);
                    SaveOutcome::Failed(err)
                }
            },
            None => {
                let id = self.store.add(task);
                info!("save {} committed: added {id}", pending.ticket.0);
                self.emit(NoticeKind::Added);
                SaveOutcome::Added(id)
            }
        };

        self.draft = None;
        self.dialog_open = false;
        Some(outcome)
    }

    fn ensure_idle(&self) -> Result<(), AppError> {
        if self.pending.is_some() {
            return Err(AppError::save_in_progress());
        }
        Ok(())
    }

    fn emit(&self, kind: NoticeKind) {
        let notice = Notice::new(kind);
        if let Err(err) = self.notifier.notify(&notice) {
            warn!("failed to deliver notice '{}': {err}", notice.message);
        }
    }
}
