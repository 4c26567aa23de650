//! Concrete preference storage for the client.
//! One small file per key under a data directory, replaced atomically on write.

pub mod file_store;
