use std::{
    fs::{self, File},
    io::{Read, Write},
    path::{Path, PathBuf},
};

use async_trait::async_trait;
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use checkmark_core::prefs::{PreferenceStore, PrefsError};
use tempfile::NamedTempFile;
use tracing::instrument;

/// File-backed preference store implementing the shared `PreferenceStore` contract.
pub struct FilePreferenceStore {
    root: PathBuf,
}

impl FilePreferenceStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.root.join(sanitize_key(key))
    }
}

#[async_trait]
impl PreferenceStore for FilePreferenceStore {
    #[instrument(skip(self, value))]
    async fn put(&self, key: &str, value: &[u8]) -> Result<(), PrefsError> {
        write_atomic(&self.path_for(key), value)
    }

    #[instrument(skip(self))]
    async fn get(&self, key: &str) -> Result<Vec<u8>, PrefsError> {
        let path = self.path_for(key);
        let mut file = File::open(&path).map_err(|err| {
            if err.kind() == std::io::ErrorKind::NotFound {
                PrefsError::NotFound {
                    key: key.to_string(),
                }
            } else {
                storage_err(err)
            }
        })?;

        let mut buf = Vec::new();
        file.read_to_end(&mut buf).map_err(storage_err)?;
        Ok(buf)
    }
}

fn write_atomic(path: &Path, value: &[u8]) -> Result<(), PrefsError> {
    let parent = path.parent().ok_or_else(|| PrefsError::Storage {
        reason: "invalid storage path".to_string(),
    })?;
    fs::create_dir_all(parent).map_err(storage_err)?;

    let mut tmp = NamedTempFile::new_in(parent).map_err(storage_err)?;
    tmp.write_all(value).map_err(storage_err)?;
    tmp.flush().map_err(storage_err)?;
    tmp.persist(path).map_err(|e| storage_err(e.error))?;
    Ok(())
}

// Keys become file names; encoding keeps separators out of the path.
fn sanitize_key(key: &str) -> String {
    URL_SAFE_NO_PAD.encode(key)
}

fn storage_err<E: ToString>(err: E) -> PrefsError {
    PrefsError::Storage {
        reason: err.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use checkmark_core::{
        prefs::{load_theme, save_theme, THEME_KEY},
        tasks::Theme,
    };

    use super::*;

    #[tokio::test]
    async fn put_then_get_returns_value() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = FilePreferenceStore::new(dir.path());

        store.put("a/b", b"true").await.expect("put");
        assert_eq!(store.get("a/b").await.expect("get"), b"true");
        assert!(store.path_for("a/b").starts_with(dir.path()));
        assert_eq!(store.path_for("a/b").parent(), Some(dir.path()));
    }

    #[tokio::test]
    async fn missing_key_is_not_found() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = FilePreferenceStore::new(dir.path().join("not-created-yet"));
        let err = store.get("missing").await.expect_err("should be missing");
        assert!(matches!(err, PrefsError::NotFound { .. }));
    }

    #[tokio::test]
    async fn theme_survives_a_new_store_instance() {
        let dir = tempfile::tempdir().expect("tempdir");
        save_theme(&FilePreferenceStore::new(dir.path()), Theme::Dark)
            .await
            .expect("save");

        let reopened = FilePreferenceStore::new(dir.path());
        assert_eq!(load_theme(&reopened).await, Theme::Dark);
        assert_eq!(reopened.get(THEME_KEY).await.expect("get"), b"true");
    }

    #[tokio::test]
    async fn overwrite_replaces_previous_value() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = FilePreferenceStore::new(dir.path());
        store.put(THEME_KEY, b"true").await.expect("put");
        store.put(THEME_KEY, b"false").await.expect("put again");
        assert_eq!(load_theme(&store).await, Theme::Light);
    }
}
