use std::io::Write;

use checkmark_core::tasks::Task;
use checkmark_session::Session;
use color_eyre::Result;

use crate::cli::Command;

/// One-shot task operations run against a freshly loaded session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskAction {
    List,
    Add(String),
    Toggle(String),
    Edit { id: String, text: String },
    Remove(String),
    Clear,
}

impl TaskAction {
    pub fn from_command(command: &Command) -> Option<Self> {
        Some(match command {
            Command::List => TaskAction::List,
            Command::Add { words } => TaskAction::Add(words.join(" ")),
            Command::Toggle { id } => TaskAction::Toggle(id.clone()),
            Command::Edit { id, words } => TaskAction::Edit {
                id: id.clone(),
                text: words.join(" "),
            },
            Command::Rm { id } => TaskAction::Remove(id.clone()),
            Command::Clear => TaskAction::Clear,
            _ => return None,
        })
    }
}

/// Execute a task action, writing human-readable output.
pub async fn handle(action: TaskAction, session: &mut Session, out: &mut impl Write) -> Result<()> {
    match action {
        TaskAction::List => print_tasks(&session.state().tasks, out)?,
        TaskAction::Add(text) => {
            session.set_input(text);
            match session.add().await? {
                Some(task) => writeln!(out, "Created task {}: {}", task.id, task.task)?,
                None => writeln!(out, "Nothing to add: task text is empty.")?,
            }
        }
        TaskAction::Toggle(id) => match session.toggle(&id).await? {
            Some(task) if task.is_done => writeln!(out, "Marked done: {}", task.task)?,
            Some(task) => writeln!(out, "Reopened: {}", task.task)?,
            None => writeln!(out, "No task with id {id}.")?,
        },
        TaskAction::Edit { id, text } => {
            let Some(task) = session.state().find(&id).cloned() else {
                writeln!(out, "No task with id {id}.")?;
                return Ok(());
            };
            if !session.request_edit(&id) {
                writeln!(out, "\"{}\" is done; reopen it before editing.", task.task)?;
                return Ok(());
            }
            session.set_edit_text(text);
            match session.save_edit().await? {
                Some(saved) => writeln!(out, "Renamed: {} -> {}", task.task, saved.task)?,
                None => writeln!(out, "Nothing to save: task text is empty.")?,
            }
        }
        TaskAction::Remove(id) => {
            if session.remove(&id).await? {
                writeln!(out, "Deleted {id}.")?;
            } else {
                writeln!(out, "No task with id {id}.")?;
            }
        }
        TaskAction::Clear => {
            let removed = session.clear_all().await?;
            writeln!(out, "Cleared {removed} task(s).")?;
        }
    }
    Ok(())
}

fn print_tasks(tasks: &[Task], out: &mut impl Write) -> Result<()> {
    if tasks.is_empty() {
        writeln!(out, "There are not any tasks ...")?;
        return Ok(());
    }
    for task in tasks {
        let mark = if task.is_done { "x" } else { " " };
        writeln!(out, "[{mark}] {}  {}", task.id, task.task)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use checkmark_core::{
        prefs::InMemoryPreferenceStore,
        remote::{InMemoryRemoteStore, RemoteStore},
    };

    use super::*;

    fn task(id: &str, label: &str, done: bool) -> Task {
        Task {
            id: id.into(),
            task: label.into(),
            is_done: done,
        }
    }

    async fn session_over(remote: &InMemoryRemoteStore) -> Session {
        Session::start(
            Arc::new(remote.clone()),
            Arc::new(InMemoryPreferenceStore::new()),
        )
        .await
        .expect("start")
    }

    async fn run(action: TaskAction, session: &mut Session) -> String {
        let mut out = Vec::new();
        handle(action, session, &mut out).await.expect("handle");
        String::from_utf8(out).expect("utf8")
    }

    #[test]
    fn maps_only_task_commands() {
        assert_eq!(
            TaskAction::from_command(&Command::Add {
                words: vec!["buy".into(), "milk".into()],
            }),
            Some(TaskAction::Add("buy milk".into()))
        );
        assert_eq!(TaskAction::from_command(&Command::Version), None);
        assert_eq!(TaskAction::from_command(&Command::Tui), None);
    }

    #[tokio::test]
    async fn list_prints_placeholder_when_empty() {
        let remote = InMemoryRemoteStore::new();
        let mut session = session_over(&remote).await;
        assert_eq!(
            run(TaskAction::List, &mut session).await,
            "There are not any tasks ...\n"
        );
    }

    #[tokio::test]
    async fn list_marks_done_tasks() {
        let remote =
            InMemoryRemoteStore::with_tasks(vec![task("1", "a", false), task("2", "b", true)]);
        let mut session = session_over(&remote).await;
        assert_eq!(
            run(TaskAction::List, &mut session).await,
            "[ ] 1  a\n[x] 2  b\n"
        );
    }

    #[tokio::test]
    async fn add_then_toggle_then_remove() {
        let remote = InMemoryRemoteStore::new();
        let mut session = session_over(&remote).await;

        let out = run(TaskAction::Add("buy milk".into()), &mut session).await;
        assert!(out.starts_with("Created task "), "{out}");
        let id = session.state().tasks[0].id.clone();

        let out = run(TaskAction::Toggle(id.clone()), &mut session).await;
        assert_eq!(out, "Marked done: buy milk\n");

        let out = run(TaskAction::Remove(id), &mut session).await;
        assert!(out.starts_with("Deleted "), "{out}");
        assert!(remote.list().await.expect("list").is_empty());
    }

    #[tokio::test]
    async fn blank_add_is_reported_not_sent() {
        let remote = InMemoryRemoteStore::new();
        let mut session = session_over(&remote).await;
        let out = run(TaskAction::Add("   ".into()), &mut session).await;
        assert_eq!(out, "Nothing to add: task text is empty.\n");
        assert!(remote.list().await.expect("list").is_empty());
    }

    #[tokio::test]
    async fn edit_refuses_done_tasks() {
        let remote = InMemoryRemoteStore::with_tasks(vec![task("2", "filed taxes", true)]);
        let mut session = session_over(&remote).await;
        let out = run(
            TaskAction::Edit {
                id: "2".into(),
                text: "new".into(),
            },
            &mut session,
        )
        .await;
        assert_eq!(out, "\"filed taxes\" is done; reopen it before editing.\n");
        assert_eq!(remote.list().await.expect("list")[0].task, "filed taxes");
    }

    #[tokio::test]
    async fn edit_renames_open_task() {
        let remote = InMemoryRemoteStore::with_tasks(vec![task("1", "buy milk", false)]);
        let mut session = session_over(&remote).await;
        let out = run(
            TaskAction::Edit {
                id: "1".into(),
                text: "buy bread".into(),
            },
            &mut session,
        )
        .await;
        assert_eq!(out, "Renamed: buy milk -> buy bread\n");
        assert_eq!(
            remote.list().await.expect("list"),
            vec![task("1", "buy bread", false)]
        );
    }

    #[tokio::test]
    async fn clear_reports_count() {
        let remote =
            InMemoryRemoteStore::with_tasks(vec![task("1", "a", false), task("2", "b", true)]);
        let mut session = session_over(&remote).await;
        assert_eq!(
            run(TaskAction::Clear, &mut session).await,
            "Cleared 2 task(s).\n"
        );
        assert!(remote.list().await.expect("list").is_empty());
    }

    #[tokio::test]
    async fn unknown_ids_are_reported() {
        let remote = InMemoryRemoteStore::new();
        let mut session = session_over(&remote).await;
        assert_eq!(
            run(TaskAction::Toggle("9".into()), &mut session).await,
            "No task with id 9.\n"
        );
        assert_eq!(
            run(TaskAction::Remove("9".into()), &mut session).await,
            "No task with id 9.\n"
        );
    }
}
