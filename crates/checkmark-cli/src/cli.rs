use clap::{Parser, Subcommand};

/// CLI surface definition.
#[derive(Parser, Debug)]
#[command(
    name = "checkmark",
    about = "Minimal to-do list client for a /todos REST backend",
    version,
    propagate_version = true
)]
pub struct Cli {
    /// Backend base address; overrides the config file.
    #[arg(long, global = true, env = "CHECKMARK_BASE_URL")]
    pub base_url: Option<String>,

    /// Optional subcommand; defaults to launching the TUI when absent.
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Launch the interactive TUI (press q to exit).
    Tui,
    /// Print version and exit.
    Version,
    /// Show every task.
    List,
    /// Create a task from the given words.
    Add {
        #[arg(required = true, num_args = 1..)]
        words: Vec<String>,
    },
    /// Flip a task between open and done.
    Toggle { id: String },
    /// Replace the label of an open task.
    Edit {
        id: String,
        #[arg(required = true, num_args = 1..)]
        words: Vec<String>,
    },
    /// Delete a task.
    #[command(alias = "remove")]
    Rm { id: String },
    /// Delete every task.
    Clear,
    /// Show or flip the light/dark preference.
    Theme {
        #[command(subcommand)]
        action: Option<ThemeCommand>,
    },
    /// Manage CLI configuration.
    #[command(subcommand)]
    Config(ConfigCommand),
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum ThemeCommand {
    /// Print the current theme (default).
    Show,
    /// Switch between light and dark.
    Toggle,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum ConfigCommand {
    /// Create a default config file if one does not exist.
    Init,
    /// Print where the config file is read from.
    Path,
}
