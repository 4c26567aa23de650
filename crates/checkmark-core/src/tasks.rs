use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A to-do item as stored by the remote backend.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Task {
    /// Client-assigned identifier, echoed back by the server.
    pub id: String,
    /// Label text, trimmed and non-empty when created through the session layer.
    pub task: String,
    #[serde(rename = "isDone", default)]
    pub is_done: bool,
}

impl Task {
    /// Build a fresh, not-done task with a newly generated id.
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            task: label.into(),
            is_done: false,
        }
    }

    /// Copy of this task with the completion flag flipped.
    pub fn toggled(&self) -> Self {
        Self {
            is_done: !self.is_done,
            ..self.clone()
        }
    }

    /// Copy of this task with a new label.
    pub fn relabeled(&self, label: impl Into<String>) -> Self {
        Self {
            task: label.into(),
            ..self.clone()
        }
    }
}

/// Light/dark display preference.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }

    pub fn is_dark(self) -> bool {
        self == Theme::Dark
    }

    pub fn from_dark_flag(dark: bool) -> Self {
        if dark {
            Theme::Dark
        } else {
            Theme::Light
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }
}
