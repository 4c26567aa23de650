use std::sync::Arc;

use checkmark_core::{
    remote::{RemoteError, RemoteStore},
    state::{AppState, Event},
    tasks::Task,
};
use futures::future::join_all;
use tracing::{info, instrument, warn};

use crate::error::SessionError;

/// Remote-backed user actions. Each method performs the remote call and
/// returns the confirmation event to apply; nothing here touches state.
///
/// `Ok(None)` means local validation rejected the action and no remote call
/// was made.
#[derive(Clone)]
pub struct Actions {
    remote: Arc<dyn RemoteStore>,
}

impl Actions {
    pub fn new(remote: Arc<dyn RemoteStore>) -> Self {
        Self { remote }
    }

    #[instrument(skip_all, fields(remote = self.remote.name()))]
    pub async fn load(&self) -> Result<Event, RemoteError> {
        let tasks = self.remote.list().await?;
        info!(count = tasks.len(), "loaded tasks");
        Ok(Event::ListLoaded(tasks))
    }

    #[instrument(skip_all, fields(remote = self.remote.name()))]
    pub async fn add(&self, input: &str) -> Result<Option<Event>, RemoteError> {
        let label = input.trim();
        if label.is_empty() {
            return Ok(None);
        }
        let saved = self.remote.create(&Task::new(label)).await?;
        Ok(Some(Event::TaskAdded(saved)))
    }

    #[instrument(skip_all, fields(remote = self.remote.name(), id = %task.id))]
    pub async fn toggle(&self, task: &Task) -> Result<Event, RemoteError> {
        let saved = self.remote.update(&task.toggled()).await?;
        Ok(Event::TaskUpdated(saved))
    }

    /// Confirm an edit. Blank text is rejected and edit mode stays active.
    #[instrument(skip_all, fields(remote = self.remote.name(), id = %task.id))]
    pub async fn save_edit(&self, task: &Task, text: &str) -> Result<Option<Event>, RemoteError> {
        let label = text.trim();
        if label.is_empty() {
            return Ok(None);
        }
        let saved = self.remote.update(&task.relabeled(label)).await?;
        Ok(Some(Event::TaskUpdated(saved)))
    }

    #[instrument(skip(self), fields(remote = self.remote.name()))]
    pub async fn remove(&self, id: &str) -> Result<Event, RemoteError> {
        self.remote.delete(id).await?;
        Ok(Event::TaskRemoved(id.to_string()))
    }

    /// Delete every given task concurrently. `AllCleared` is only returned when
    /// every delete succeeded; an empty list succeeds without remote calls.
    #[instrument(skip_all, fields(remote = self.remote.name(), count = ids.len()))]
    pub async fn clear(&self, ids: &[String]) -> Result<Event, SessionError> {
        let results = join_all(ids.iter().map(|id| async move {
            let outcome = self.remote.delete(id).await;
            (id, outcome)
        }))
        .await;

        let failed: Vec<String> = results
            .into_iter()
            .filter_map(|(id, outcome)| match outcome {
                Ok(()) => None,
                Err(err) => {
                    warn!(%id, "delete during clear failed: {err}");
                    Some(id.clone())
                }
            })
            .collect();

        if failed.is_empty() {
            Ok(Event::AllCleared)
        } else {
            Err(SessionError::PartialClear {
                removed: ids.len() - failed.len(),
                failed,
            })
        }
    }
}

/// Local validation for entering edit mode: only existing, not-done tasks.
pub fn request_edit(state: &AppState, id: &str) -> Option<Event> {
    state
        .find(id)
        .filter(|t| !t.is_done)
        .map(|t| Event::EditRequested {
            id: t.id.clone(),
            text: t.task.clone(),
        })
}
