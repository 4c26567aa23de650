//! Client-side state and the reconciler that keeps it in step with the remote store.
//!
//! [`apply`] is the only way state changes. Events that mirror remote mutations
//! (`TaskAdded`, `TaskUpdated`, `TaskRemoved`, `AllCleared`) must only be
//! emitted after the server confirmed the operation.

use crate::tasks::{Task, Theme};

/// In-memory application state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AppState {
    /// Tasks in display order. Ids are unique.
    pub tasks: Vec<Task>,
    /// Draft text for a new task.
    pub input: String,
    /// Task currently in edit mode, if any.
    pub editing_id: Option<String>,
    /// Draft label for the task under edit; empty when nothing is edited.
    pub editing_text: String,
    pub theme: Theme,
}

impl AppState {
    /// Fresh state with the persisted theme and no tasks loaded yet.
    pub fn with_theme(theme: Theme) -> Self {
        Self {
            theme,
            ..Self::default()
        }
    }

    pub fn find(&self, id: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    /// The task under edit, when edit mode is active and the task still exists.
    pub fn editing_task(&self) -> Option<&Task> {
        self.editing_id.as_deref().and_then(|id| self.find(id))
    }

    pub fn is_editing(&self, id: &str) -> bool {
        self.editing_id.as_deref() == Some(id)
    }

    fn clear_edit(&mut self) {
        self.editing_id = None;
        self.editing_text.clear();
    }
}

/// Closed set of state transitions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    ListLoaded(Vec<Task>),
    InputChanged(String),
    EditRequested { id: String, text: String },
    EditTextChanged(String),
    EditCancelled,
    ThemeToggled,
    TaskAdded(Task),
    /// Authoritative full-record replace; covers both toggle and edit confirmation.
    TaskUpdated(Task),
    TaskRemoved(String),
    AllCleared,
}

/// Apply an event to a state, producing the next state. Pure and total.
pub fn apply(mut state: AppState, event: Event) -> AppState {
    match event {
        Event::ListLoaded(tasks) => {
            state.tasks = dedup_by_id(tasks);
            if state.editing_id.is_some() && !state.editing_task().is_some_and(|t| !t.is_done) {
                state.clear_edit();
            }
        }
        Event::InputChanged(text) => {
            state.input = text;
        }
        Event::EditRequested { id, text } => {
            if state.find(&id).is_some_and(|t| !t.is_done) {
                state.editing_id = Some(id);
                state.editing_text = text;
            }
        }
        Event::EditTextChanged(text) => {
            if state.editing_id.is_some() {
                state.editing_text = text;
            }
        }
        Event::EditCancelled => state.clear_edit(),
        Event::ThemeToggled => {
            state.theme = state.theme.toggled();
        }
        Event::TaskAdded(task) => {
            match state.tasks.iter_mut().find(|t| t.id == task.id) {
                Some(existing) => *existing = task,
                None => state.tasks.push(task),
            }
            state.input.clear();
        }
        Event::TaskUpdated(task) => {
            if let Some(existing) = state.tasks.iter_mut().find(|t| t.id == task.id) {
                *existing = task;
            }
            state.clear_edit();
        }
        Event::TaskRemoved(id) => {
            state.tasks.retain(|t| t.id != id);
            if state.editing_id.as_deref() == Some(id.as_str()) {
                state.clear_edit();
            }
        }
        Event::AllCleared => {
            state.tasks.clear();
            state.clear_edit();
        }
    }
    state
}

fn dedup_by_id(tasks: Vec<Task>) -> Vec<Task> {
    let mut out: Vec<Task> = Vec::with_capacity(tasks.len());
    for task in tasks {
        if !out.iter().any(|t| t.id == task.id) {
            out.push(task);
        }
    }
    out
}
