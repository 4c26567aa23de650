//! Caller layer around the reconciler: validates user intent, talks to the
//! remote store, and turns confirmed results into state events.

pub mod actions;
pub mod error;
pub mod session;

pub use actions::Actions;
pub use error::SessionError;
pub use session::Session;
