use std::sync::Arc;

use checkmark_core::{
    prefs::{load_theme, save_theme, PreferenceStore},
    remote::RemoteStore,
    state::{apply, AppState, Event},
    tasks::{Task, Theme},
};
use tracing::{debug, warn};

use crate::{
    actions::{self, Actions},
    error::SessionError,
};

/// Owns the application state and applies confirmed events to it.
pub struct Session {
    state: AppState,
    actions: Actions,
    prefs: Arc<dyn PreferenceStore>,
}

impl Session {
    /// Start a session with the persisted theme. Tasks are not loaded yet.
    pub async fn new(remote: Arc<dyn RemoteStore>, prefs: Arc<dyn PreferenceStore>) -> Self {
        let theme = load_theme(prefs.as_ref()).await;
        Self {
            state: AppState::with_theme(theme),
            actions: Actions::new(remote),
            prefs,
        }
    }

    /// Start a session and fetch the task list.
    pub async fn start(
        remote: Arc<dyn RemoteStore>,
        prefs: Arc<dyn PreferenceStore>,
    ) -> Result<Self, SessionError> {
        let mut session = Self::new(remote, prefs).await;
        session.refresh().await?;
        Ok(session)
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// Handle for running remote actions off the UI loop.
    pub fn actions(&self) -> Actions {
        self.actions.clone()
    }

    pub fn dispatch(&mut self, event: Event) {
        debug!(?event, "applying event");
        self.state = apply(std::mem::take(&mut self.state), event);
    }

    pub async fn refresh(&mut self) -> Result<(), SessionError> {
        let event = self.actions.load().await?;
        self.dispatch(event);
        Ok(())
    }

    pub fn set_input(&mut self, text: impl Into<String>) {
        self.dispatch(Event::InputChanged(text.into()));
    }

    /// Create a task from the current input. `None` when the input is blank.
    pub async fn add(&mut self) -> Result<Option<Task>, SessionError> {
        let Some(event) = self.actions.add(&self.state.input).await? else {
            return Ok(None);
        };
        let added = match &event {
            Event::TaskAdded(task) => Some(task.clone()),
            _ => None,
        };
        self.dispatch(event);
        Ok(added)
    }

    /// Flip the done flag of a task. `None` when the id is unknown.
    pub async fn toggle(&mut self, id: &str) -> Result<Option<Task>, SessionError> {
        let Some(task) = self.state.find(id).cloned() else {
            return Ok(None);
        };
        let event = self.actions.toggle(&task).await?;
        self.dispatch(event);
        Ok(self.state.find(id).cloned())
    }

    /// Enter edit mode. Returns false for unknown or done tasks.
    pub fn request_edit(&mut self, id: &str) -> bool {
        match actions::request_edit(&self.state, id) {
            Some(event) => {
                self.dispatch(event);
                true
            }
            None => false,
        }
    }

    pub fn set_edit_text(&mut self, text: impl Into<String>) {
        self.dispatch(Event::EditTextChanged(text.into()));
    }

    pub fn cancel_edit(&mut self) {
        self.dispatch(Event::EditCancelled);
    }

    /// Confirm the current edit. `None` when nothing is edited or the draft is blank;
    /// edit mode then stays as it was.
    pub async fn save_edit(&mut self) -> Result<Option<Task>, SessionError> {
        let Some(task) = self.state.editing_task().cloned() else {
            return Ok(None);
        };
        let Some(event) = self
            .actions
            .save_edit(&task, &self.state.editing_text)
            .await?
        else {
            return Ok(None);
        };
        self.dispatch(event);
        Ok(self.state.find(&task.id).cloned())
    }

    /// Delete a task. Returns false for unknown ids without calling the remote.
    pub async fn remove(&mut self, id: &str) -> Result<bool, SessionError> {
        if self.state.find(id).is_none() {
            return Ok(false);
        }
        let event = self.actions.remove(id).await?;
        self.dispatch(event);
        Ok(true)
    }

    /// Delete every task; returns how many were removed.
    pub async fn clear_all(&mut self) -> Result<usize, SessionError> {
        let ids: Vec<String> = self.state.tasks.iter().map(|t| t.id.clone()).collect();
        let event = self.actions.clear(&ids).await?;
        self.dispatch(event);
        Ok(ids.len())
    }

    /// Flip the theme and persist it. The flip stands even if persisting fails.
    pub async fn toggle_theme(&mut self) -> Result<Theme, SessionError> {
        self.dispatch(Event::ThemeToggled);
        let theme = self.state.theme;
        if let Err(err) = save_theme(self.prefs.as_ref(), theme).await {
            warn!("theme preference not saved: {err}");
            return Err(err.into());
        }
        Ok(theme)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::Ordering;

    use async_trait::async_trait;
    use checkmark_core::prefs::{InMemoryPreferenceStore, PrefsError};

    use super::*;
    use crate::actions::tests::{task, ScriptedStore};

    async fn session_with(store: Arc<ScriptedStore>) -> Session {
        Session::start(store, Arc::new(InMemoryPreferenceStore::new()))
            .await
            .expect("start")
    }

    #[tokio::test]
    async fn start_loads_tasks_and_persisted_theme() {
        let prefs = Arc::new(InMemoryPreferenceStore::new());
        save_theme(prefs.as_ref(), Theme::Dark).await.expect("save");
        let store = Arc::new(ScriptedStore::with_tasks(vec![task("1", "buy milk", false)]));

        let session = Session::start(store, prefs).await.expect("start");
        assert_eq!(session.state().tasks, vec![task("1", "buy milk", false)]);
        assert_eq!(session.state().theme, Theme::Dark);
    }

    #[tokio::test]
    async fn add_appends_and_clears_input() {
        let store = Arc::new(ScriptedStore::default());
        let mut session = session_with(store.clone()).await;

        session.set_input("  write docs ");
        let added = session.add().await.expect("add").expect("task added");
        assert_eq!(added.task, "write docs");
        assert_eq!(session.state().tasks, vec![added]);
        assert_eq!(session.state().input, "");
    }

    #[tokio::test]
    async fn blank_add_keeps_state_untouched() {
        let store = Arc::new(ScriptedStore::default());
        let mut session = session_with(store.clone()).await;
        let calls_after_start = store.calls.load(Ordering::SeqCst);

        session.set_input("  ");
        assert_eq!(session.add().await.expect("add"), None);
        assert!(session.state().tasks.is_empty());
        assert_eq!(session.state().input, "  ");
        assert_eq!(store.calls.load(Ordering::SeqCst), calls_after_start);
    }

    #[tokio::test]
    async fn edit_round_trip_replaces_label() {
        let store = Arc::new(ScriptedStore::with_tasks(vec![task("1", "buy milk", false)]));
        let mut session = session_with(store.clone()).await;

        assert!(session.request_edit("1"));
        assert_eq!(session.state().editing_text, "buy milk");
        session.set_edit_text("buy bread");

        let saved = session.save_edit().await.expect("save").expect("saved");
        assert_eq!(saved, task("1", "buy bread", false));
        assert_eq!(session.state().editing_id, None);
        assert_eq!(
            store.inner.list().await.expect("list"),
            vec![task("1", "buy bread", false)]
        );
    }

    #[tokio::test]
    async fn blank_edit_stays_in_edit_mode() {
        let store = Arc::new(ScriptedStore::with_tasks(vec![task("1", "a", false)]));
        let mut session = session_with(store).await;

        assert!(session.request_edit("1"));
        session.set_edit_text("   ");
        assert_eq!(session.save_edit().await.expect("save"), None);
        assert_eq!(session.state().editing_id.as_deref(), Some("1"));
        assert_eq!(session.state().tasks, vec![task("1", "a", false)]);
    }

    #[tokio::test]
    async fn done_tasks_cannot_be_edited() {
        let store = Arc::new(ScriptedStore::with_tasks(vec![task("2", "done", true)]));
        let mut session = session_with(store).await;

        assert!(!session.request_edit("2"));
        assert_eq!(session.state().editing_id, None);
    }

    #[tokio::test]
    async fn toggle_marks_done_and_ends_editing() {
        let store = Arc::new(ScriptedStore::with_tasks(vec![
            task("1", "a", false),
            task("2", "b", false),
        ]));
        let mut session = session_with(store).await;
        assert!(session.request_edit("1"));

        let toggled = session.toggle("2").await.expect("toggle").expect("known");
        assert!(toggled.is_done);
        assert_eq!(session.state().editing_id, None);
        assert_eq!(session.toggle("nope").await.expect("toggle"), None);
    }

    #[tokio::test]
    async fn remote_failure_leaves_state_unchanged() {
        let store = Arc::new(ScriptedStore::with_tasks(vec![task("1", "a", false)]));
        let mut session = session_with(store).await;
        let before = session.state().clone();

        // Same data, but every further call fails at the transport level.
        session.actions = Actions::new(Arc::new(ScriptedStore {
            offline: true,
            ..ScriptedStore::with_tasks(vec![task("1", "a", false)])
        }));

        assert!(matches!(
            session.toggle("1").await,
            Err(SessionError::Remote(_))
        ));
        assert!(matches!(
            session.remove("1").await,
            Err(SessionError::Remote(_))
        ));
        session.set_input("new");
        assert!(session.add().await.is_err());

        assert_eq!(session.state().tasks, before.tasks);
        assert_eq!(session.state().input, "new");
    }

    #[tokio::test]
    async fn remove_unknown_id_skips_remote() {
        let store = Arc::new(ScriptedStore::with_tasks(vec![task("1", "a", false)]));
        let mut session = session_with(store.clone()).await;
        let calls = store.calls.load(Ordering::SeqCst);

        assert!(!session.remove("zzz").await.expect("remove"));
        assert_eq!(store.calls.load(Ordering::SeqCst), calls);
        assert!(session.remove("1").await.expect("remove"));
        assert!(session.state().tasks.is_empty());
    }

    #[tokio::test]
    async fn partial_clear_keeps_every_local_task() {
        let mut store = ScriptedStore::with_tasks(vec![
            task("1", "a", false),
            task("2", "b", false),
        ]);
        store.fail_deletes = vec!["1".into()];
        let mut session = session_with(Arc::new(store)).await;

        let err = session.clear_all().await.expect_err("partial failure");
        assert!(matches!(err, SessionError::PartialClear { removed: 1, .. }));
        assert_eq!(session.state().tasks.len(), 2);
    }

    #[tokio::test]
    async fn clear_all_empties_list() {
        let store = Arc::new(ScriptedStore::with_tasks(vec![
            task("1", "a", false),
            task("2", "b", true),
        ]));
        let mut session = session_with(store).await;

        assert_eq!(session.clear_all().await.expect("clear"), 2);
        assert!(session.state().tasks.is_empty());
        assert_eq!(session.clear_all().await.expect("clear empty"), 0);
    }

    #[tokio::test]
    async fn theme_toggle_persists_each_flip() {
        let prefs = Arc::new(InMemoryPreferenceStore::new());
        let mut session = Session::new(Arc::new(ScriptedStore::default()), prefs.clone()).await;

        assert_eq!(session.toggle_theme().await.expect("toggle"), Theme::Dark);
        assert_eq!(load_theme(prefs.as_ref()).await, Theme::Dark);
        assert_eq!(session.toggle_theme().await.expect("toggle"), Theme::Light);
        assert_eq!(load_theme(prefs.as_ref()).await, Theme::Light);
    }

    struct ReadOnlyPrefs;

    #[async_trait]
    impl PreferenceStore for ReadOnlyPrefs {
        async fn put(&self, _key: &str, _value: &[u8]) -> Result<(), PrefsError> {
            Err(PrefsError::Storage {
                reason: "read-only".into(),
            })
        }

        async fn get(&self, key: &str) -> Result<Vec<u8>, PrefsError> {
            Err(PrefsError::NotFound {
                key: key.to_string(),
            })
        }
    }

    #[tokio::test]
    async fn theme_flip_stands_when_persisting_fails() {
        let mut session =
            Session::new(Arc::new(ScriptedStore::default()), Arc::new(ReadOnlyPrefs)).await;
        let err = session.toggle_theme().await.expect_err("should fail");
        assert!(matches!(err, SessionError::Prefs(_)));
        assert_eq!(session.state().theme, Theme::Dark);
    }
}
