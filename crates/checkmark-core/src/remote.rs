use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use thiserror::Error;

use crate::tasks::Task;

/// Errors produced by remote task store implementations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RemoteError {
    /// Configured base address could not be parsed.
    #[error("invalid base url: {reason}")]
    InvalidBaseUrl { reason: String },
    /// Connection, timeout or other transport-level failure.
    #[error("transport failure: {reason}")]
    Transport { reason: String },
    /// Server answered with a non-success status.
    #[error("{url} answered with status {status}")]
    Status { status: u16, url: String },
    /// Response body was not the expected JSON.
    #[error("could not decode response: {reason}")]
    Decode { reason: String },
    /// Target task does not exist.
    #[error("task not found: {id}")]
    NotFound { id: String },
}

/// Contract for the authoritative task backend.
#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// Short name used for logging.
    fn name(&self) -> &'static str;

    /// Fetch every stored task in display order.
    async fn list(&self) -> Result<Vec<Task>, RemoteError>;

    /// Store a new task (client-generated id) and return the stored record.
    async fn create(&self, task: &Task) -> Result<Task, RemoteError>;

    /// Replace the stored record with the same id and return it.
    async fn update(&self, task: &Task) -> Result<Task, RemoteError>;

    /// Remove the task with the given id.
    async fn delete(&self, id: &str) -> Result<(), RemoteError>;
}

/// Process-local store used for tests.
#[derive(Debug, Default, Clone)]
pub struct InMemoryRemoteStore {
    inner: Arc<Mutex<Vec<Task>>>,
}

impl InMemoryRemoteStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tasks(tasks: Vec<Task>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(tasks)),
        }
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Vec<Task>>, RemoteError> {
        self.inner.lock().map_err(|err| RemoteError::Transport {
            reason: format!("lock poisoned: {err}"),
        })
    }
}

#[async_trait]
impl RemoteStore for InMemoryRemoteStore {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn list(&self) -> Result<Vec<Task>, RemoteError> {
        Ok(self.lock()?.clone())
    }

    async fn create(&self, task: &Task) -> Result<Task, RemoteError> {
        let mut tasks = self.lock()?;
        if tasks.iter().any(|t| t.id == task.id) {
            return Err(RemoteError::Status {
                status: 409,
                url: format!("memory://todos/{}", task.id),
            });
        }
        tasks.push(task.clone());
        Ok(task.clone())
    }

    async fn update(&self, task: &Task) -> Result<Task, RemoteError> {
        let mut tasks = self.lock()?;
        let slot = tasks
            .iter_mut()
            .find(|t| t.id == task.id)
            .ok_or_else(|| RemoteError::NotFound {
                id: task.id.clone(),
            })?;
        *slot = task.clone();
        Ok(task.clone())
    }

    async fn delete(&self, id: &str) -> Result<(), RemoteError> {
        let mut tasks = self.lock()?;
        let before = tasks.len();
        tasks.retain(|t| t.id != id);
        if tasks.len() == before {
            return Err(RemoteError::NotFound { id: id.to_string() });
        }
        Ok(())
    }
}
