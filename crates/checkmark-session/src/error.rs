use checkmark_core::{prefs::PrefsError, remote::RemoteError};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error(transparent)]
    Remote(#[from] RemoteError),
    #[error("could not persist preference: {0}")]
    Prefs(#[from] PrefsError),
    /// Some deletes of a bulk clear failed; local state was left untouched.
    #[error(
        "clear all failed: {removed} deleted remotely, {} failed ({})",
        .failed.len(),
        .failed.join(", ")
    )]
    PartialClear { removed: usize, failed: Vec<String> },
}
