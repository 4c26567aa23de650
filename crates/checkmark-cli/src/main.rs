mod cli;
mod config;
mod remote;
mod storage;
mod tasks;
mod tui;

use std::{io, path::Path, sync::Arc};

use checkmark_core::prefs::{load_theme, save_theme, PreferenceStore};
use checkmark_session::Session;
use clap::Parser;
use color_eyre::Result;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::cli::{Command, ConfigCommand, ThemeCommand};
use crate::tasks::TaskAction;

/// Entry point wiring the CLI to the session layer and the TUI.
#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = cli::Cli::parse();
    let command = cli.command.unwrap_or(Command::Tui);
    init_tracing(&command);
    if let Command::Config(action) = &command {
        return run_config(action.clone(), &config::default_path()?);
    }
    let config = config::load()?.with_base_url(cli.base_url);

    match command {
        Command::Tui => {
            let session = Session::new(remote::store_from_config(&config)?, prefs(&config)?).await;
            tui::launch(session).await?
        }
        Command::Version => print_version(),
        Command::Theme { action } => run_theme(action.unwrap_or(ThemeCommand::Show), &config).await?,
        other => {
            let action = TaskAction::from_command(&other)
                .ok_or_else(|| color_eyre::eyre::eyre!("unsupported command: {other:?}"))?;
            let mut session =
                Session::start(remote::store_from_config(&config)?, prefs(&config)?).await?;
            tasks::handle(action, &mut session, &mut io::stdout().lock()).await?;
        }
    }

    Ok(())
}

fn init_tracing(command: &Command) {
    // The TUI owns the terminal; stay silent there unless RUST_LOG asks otherwise.
    let default = if *command == Command::Tui { "off" } else { "warn" };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_writer(io::stderr);
    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .init();
}

fn print_version() {
    println!("checkmark {}", env!("CARGO_PKG_VERSION"));
}

fn prefs(config: &config::Config) -> Result<Arc<dyn PreferenceStore>> {
    Ok(Arc::new(storage::prefs_from_config(config)?))
}

/// Theme changes are local-only; no remote call is made.
async fn run_theme(action: ThemeCommand, config: &config::Config) -> Result<()> {
    let prefs = prefs(config)?;
    let theme = match action {
        ThemeCommand::Show => load_theme(prefs.as_ref()).await,
        ThemeCommand::Toggle => {
            let next = load_theme(prefs.as_ref()).await.toggled();
            save_theme(prefs.as_ref(), next).await?;
            next
        }
    };
    println!("Theme: {}", theme.label());
    Ok(())
}

/// Config commands never read the file, so they work even when it is malformed.
fn run_config(action: ConfigCommand, path: &Path) -> Result<()> {
    match action {
        ConfigCommand::Init => {
            let path = config::write_default_if_missing(path)?;
            println!("Config initialized at {}", path.display());
        }
        ConfigCommand::Path => println!("{}", path.display()),
    }
    Ok(())
}
