//! JSON-over-HTTP implementation of the remote task store.
//!
//! Speaks the `/todos` endpoint family:
//! `GET /todos`, `POST /todos`, `PUT /todos/{id}`, `DELETE /todos/{id}`.

use std::time::Duration;

use async_trait::async_trait;
use checkmark_core::{
    remote::{RemoteError, RemoteStore},
    tasks::Task,
};
use reqwest::{Client, Response, Url};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tracing::{debug, instrument};

pub const DEFAULT_BASE_URL: &str = "http://localhost:3005";

/// Remote backend settings, embedded in the CLI config as `[remote]`.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct RemoteConfig {
    /// Base address of the backend; defaults to [`DEFAULT_BASE_URL`].
    #[serde(default)]
    pub base_url: Option<String>,
    /// Per-request timeout. No timeout when absent.
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,
}

impl RemoteConfig {
    pub fn base_url(&self) -> &str {
        self.base_url.as_deref().unwrap_or(DEFAULT_BASE_URL)
    }
}

pub struct HttpRemoteStore {
    base: Url,
    client: Client,
}

impl HttpRemoteStore {
    pub fn new(cfg: &RemoteConfig) -> Result<Self, RemoteError> {
        let base = Url::parse(cfg.base_url()).map_err(|e| RemoteError::InvalidBaseUrl {
            reason: format!("{}: {e}", cfg.base_url()),
        })?;
        if base.cannot_be_a_base() {
            return Err(RemoteError::InvalidBaseUrl {
                reason: format!("{base} cannot be used as a base address"),
            });
        }

        let mut builder =
            Client::builder().user_agent(concat!("checkmark/", env!("CARGO_PKG_VERSION")));
        if let Some(secs) = cfg.request_timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let client = builder.build().map_err(transport_err)?;
        Ok(Self { base, client })
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    fn todos_url(&self, id: Option<&str>) -> Url {
        let mut url = self.base.clone();
        // `new` rejects cannot-be-a-base URLs, so segments are always available.
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push("todos");
            if let Some(id) = id {
                segments.push(id);
            }
        }
        url
    }
}

#[async_trait]
impl RemoteStore for HttpRemoteStore {
    fn name(&self) -> &'static str {
        "http"
    }

    #[instrument(skip_all, fields(base = %self.base))]
    async fn list(&self) -> Result<Vec<Task>, RemoteError> {
        let resp = self
            .client
            .get(self.todos_url(None))
            .send()
            .await
            .map_err(transport_err)?;
        decode(check_status(resp)?).await
    }

    #[instrument(skip_all, fields(base = %self.base, id = %task.id))]
    async fn create(&self, task: &Task) -> Result<Task, RemoteError> {
        let resp = self
            .client
            .post(self.todos_url(None))
            .json(task)
            .send()
            .await
            .map_err(transport_err)?;
        decode(check_status(resp)?).await
    }

    #[instrument(skip_all, fields(base = %self.base, id = %task.id))]
    async fn update(&self, task: &Task) -> Result<Task, RemoteError> {
        let resp = self
            .client
            .put(self.todos_url(Some(&task.id)))
            .json(task)
            .send()
            .await
            .map_err(transport_err)?;
        decode(check_status(resp)?).await
    }

    #[instrument(skip_all, fields(base = %self.base, id = %id))]
    async fn delete(&self, id: &str) -> Result<(), RemoteError> {
        let resp = self
            .client
            .delete(self.todos_url(Some(id)))
            .send()
            .await
            .map_err(transport_err)?;
        check_status(resp)?;
        Ok(())
    }
}

fn check_status(resp: Response) -> Result<Response, RemoteError> {
    let status = resp.status();
    debug!(%status, url = %resp.url(), "remote response");
    if status.is_success() {
        Ok(resp)
    } else {
        Err(RemoteError::Status {
            status: status.as_u16(),
            url: resp.url().to_string(),
        })
    }
}

async fn decode<T: DeserializeOwned>(resp: Response) -> Result<T, RemoteError> {
    resp.json::<T>().await.map_err(|e| RemoteError::Decode {
        reason: e.to_string(),
    })
}

fn transport_err(err: reqwest::Error) -> RemoteError {
    RemoteError::Transport {
        reason: err.to_string(),
    }
}
