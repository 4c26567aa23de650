use std::{future::Future, io, time::Duration};

use checkmark_core::state::Event;
use checkmark_session::{Session, SessionError};
use color_eyre::Result;
use crossterm::{
    event::{
        self, DisableMouseCapture, Event as TermEvent, KeyCode, KeyEvent, KeyEventKind,
        KeyModifiers,
    },
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::debug;

mod view;

/// Interactive task list. Remote calls run in the background and their
/// confirmations are applied as they arrive. Press `q` to exit.
pub async fn launch(session: Session) -> Result<()> {
    // Guard restores the terminal even if we early-return.
    let guard = TerminalGuard::enter()?;
    let mut terminal = guard.terminal()?;
    let (tx, mut rx) = mpsc::unbounded_channel();
    let mut app = App::new(session, tx);
    app.reload();

    while !app.quit {
        drain(&mut app, &mut rx);
        terminal.draw(|frame| view::draw(frame, &app))?;

        if event::poll(Duration::from_millis(100))? {
            if let TermEvent::Key(key) = event::read()? {
                app.handle_key(key).await;
            }
        }
    }

    Ok(())
}

fn drain(app: &mut App, rx: &mut UnboundedReceiver<Completion>) {
    while let Ok(done) = rx.try_recv() {
        app.complete(done);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Mode {
    Browse,
    Input,
    Edit,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Status {
    pub text: String,
    pub is_error: bool,
}

/// Outcome of a background remote action.
pub(crate) struct Completion {
    action: &'static str,
    result: Result<Option<Event>, SessionError>,
}

pub(crate) struct App {
    pub session: Session,
    pub mode: Mode,
    pub selected: usize,
    pub status: Option<Status>,
    pub in_flight: usize,
    pub quit: bool,
    tx: UnboundedSender<Completion>,
}

impl App {
    fn new(session: Session, tx: UnboundedSender<Completion>) -> Self {
        Self {
            session,
            mode: Mode::Browse,
            selected: 0,
            status: None,
            in_flight: 0,
            quit: false,
            tx,
        }
    }

    fn spawn<F>(&mut self, action: &'static str, fut: F)
    where
        F: Future<Output = Result<Option<Event>, SessionError>> + Send + 'static,
    {
        self.in_flight += 1;
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let result = fut.await;
            // Receiver is gone once the UI exits; late results are dropped.
            let _ = tx.send(Completion { action, result });
        });
    }

    fn complete(&mut self, done: Completion) {
        self.in_flight = self.in_flight.saturating_sub(1);
        match done.result {
            Ok(Some(event)) => {
                self.session.dispatch(event);
                self.status = None;
            }
            Ok(None) => {}
            Err(err) => {
                debug!(action = done.action, "remote action failed: {err}");
                self.status = Some(Status {
                    text: format!("{} failed: {err}", done.action),
                    is_error: true,
                });
            }
        }
        if self.mode == Mode::Edit && self.session.state().editing_id.is_none() {
            self.mode = Mode::Browse;
        }
        self.clamp_selection();
    }

    fn reload(&mut self) {
        let actions = self.session.actions();
        self.spawn("load", async move {
            actions.load().await.map(Some).map_err(SessionError::from)
        });
    }

    fn clamp_selection(&mut self) {
        let len = self.session.state().tasks.len();
        self.selected = self.selected.min(len.saturating_sub(1));
    }

    fn selected_task(&self) -> Option<&checkmark_core::tasks::Task> {
        self.session.state().tasks.get(self.selected)
    }

    fn info(&mut self, text: impl Into<String>) {
        self.status = Some(Status {
            text: text.into(),
            is_error: false,
        });
    }

    async fn handle_key(&mut self, key: KeyEvent) {
        if key.kind != KeyEventKind::Press {
            return;
        }
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.quit = true;
            return;
        }
        match self.mode {
            Mode::Browse => self.browse_key(key.code).await,
            Mode::Input => self.input_key(key.code),
            Mode::Edit => self.edit_key(key.code),
        }
    }

    async fn browse_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Char('q') | KeyCode::Esc => self.quit = true,
            KeyCode::Down | KeyCode::Char('j') => {
                self.selected = self.selected.saturating_add(1);
                self.clamp_selection();
            }
            KeyCode::Up | KeyCode::Char('k') => {
                self.selected = self.selected.saturating_sub(1);
            }
            KeyCode::Char('a') | KeyCode::Char('i') => self.mode = Mode::Input,
            KeyCode::Char(' ') | KeyCode::Char('x') | KeyCode::Enter => {
                if let Some(task) = self.selected_task().cloned() {
                    let actions = self.session.actions();
                    self.spawn("toggle", async move {
                        actions.toggle(&task).await.map(Some).map_err(SessionError::from)
                    });
                }
            }
            KeyCode::Char('e') => {
                if let Some(id) = self.selected_task().map(|t| t.id.clone()) {
                    if self.session.request_edit(&id) {
                        self.mode = Mode::Edit;
                    } else {
                        self.info("Done tasks cannot be edited.");
                    }
                }
            }
            KeyCode::Char('d') | KeyCode::Delete => {
                if let Some(id) = self.selected_task().map(|t| t.id.clone()) {
                    let actions = self.session.actions();
                    self.spawn("delete", async move {
                        actions.remove(&id).await.map(Some).map_err(SessionError::from)
                    });
                }
            }
            KeyCode::Char('C') => {
                let ids: Vec<String> = self
                    .session
                    .state()
                    .tasks
                    .iter()
                    .map(|t| t.id.clone())
                    .collect();
                if !ids.is_empty() {
                    let actions = self.session.actions();
                    self.spawn("clear all", async move { actions.clear(&ids).await.map(Some) });
                }
            }
            KeyCode::Char('t') => {
                if let Err(err) = self.session.toggle_theme().await {
                    self.status = Some(Status {
                        text: err.to_string(),
                        is_error: true,
                    });
                }
            }
            KeyCode::Char('r') => self.reload(),
            _ => {}
        }
    }

    fn input_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Esc => self.mode = Mode::Browse,
            KeyCode::Enter => {
                let input = self.session.state().input.clone();
                if input.trim().is_empty() {
                    return;
                }
                let actions = self.session.actions();
                self.spawn("add", async move {
                    actions.add(&input).await.map_err(SessionError::from)
                });
            }
            KeyCode::Backspace => {
                let mut input = self.session.state().input.clone();
                input.pop();
                self.session.set_input(input);
            }
            KeyCode::Char(c) => {
                let mut input = self.session.state().input.clone();
                input.push(c);
                self.session.set_input(input);
            }
            _ => {}
        }
    }

    fn edit_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Esc => {
                self.session.cancel_edit();
                self.mode = Mode::Browse;
            }
            KeyCode::Enter => {
                let Some(task) = self.session.state().editing_task().cloned() else {
                    return;
                };
                let text = self.session.state().editing_text.clone();
                if text.trim().is_empty() {
                    return;
                }
                let actions = self.session.actions();
                self.spawn("edit", async move {
                    actions.save_edit(&task, &text).await.map_err(SessionError::from)
                });
            }
            KeyCode::Backspace => {
                let mut text = self.session.state().editing_text.clone();
                text.pop();
                self.session.set_edit_text(text);
            }
            KeyCode::Char(c) => {
                let mut text = self.session.state().editing_text.clone();
                text.push(c);
                self.session.set_edit_text(text);
            }
            _ => {}
        }
    }
}

struct TerminalGuard;

impl TerminalGuard {
    fn enter() -> Result<Self> {
        enable_raw_mode()?;
        // Enter alternate screen to avoid polluting the shell buffer.
        execute!(io::stdout(), EnterAlternateScreen)?;
        Ok(Self)
    }

    fn terminal(&self) -> Result<Terminal<CrosstermBackend<io::Stdout>>> {
        let backend = CrosstermBackend::new(io::stdout());
        Ok(Terminal::new(backend)?)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        // Best-effort cleanup; errors are logged but not propagated from Drop.
        if let Err(err) = disable_raw_mode() {
            eprintln!("failed to disable raw mode: {err}");
        }
        if let Err(err) = execute!(io::stdout(), LeaveAlternateScreen, DisableMouseCapture) {
            eprintln!("failed to restore terminal: {err}");
        }
    }
}
