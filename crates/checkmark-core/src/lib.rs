//! Core abstractions for Checkmark: the task model, the pure state reconciler,
//! and the contracts for the remote task store and the local preference store.
//! This crate performs no I/O of its own.

pub mod prefs;
pub mod remote;
pub mod state;
pub mod tasks;
