//! Filesystem model cache - Implements ModelCachePort on a local directory

use std::io::Write;
use std::path::{Path, PathBuf};

use application::error::ApplicationError;
use application::ports::ModelCachePort;
use async_trait::async_trait;
use tempfile::NamedTempFile;
use tracing::{debug, instrument};

/// Stores each model file directly under a root directory
///
/// Writes go to a temporary file in the same directory that is atomically
/// renamed over the target, so a reader never observes a partial model.
#[derive(Debug, Clone)]
pub struct FsModelCache {
    root: PathBuf,
}

impl FsModelCache {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path a model named `name` is stored at
    fn entry_path(&self, name: &str) -> Result<PathBuf, ApplicationError> {
        let valid = !name.is_empty()
            && name != "."
            && name != ".."
            && !name.contains(['/', '\\']);
        if !valid {
            return Err(ApplicationError::AssetFetch {
                name: name.to_string(),
                reason: "invalid model file name".to_string(),
            });
        }
        Ok(self.root.join(name))
    }
}

fn io_error(name: &str, err: &std::io::Error) -> ApplicationError {
    ApplicationError::AssetFetch {
        name: name.to_string(),
        reason: err.to_string(),
    }
}

#[async_trait]
impl ModelCachePort for FsModelCache {
    #[instrument(skip(self))]
    async fn lookup(&self, name: &str) -> Result<Option<PathBuf>, ApplicationError> {
        let path = self.entry_path(name)?;
        match tokio::fs::metadata(&path).await {
            Ok(metadata) if metadata.is_file() => Ok(Some(path)),
            Ok(_) => Ok(None),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(io_error(name, &e)),
        }
    }

    #[instrument(skip(self, contents), fields(bytes = contents.len()))]
    async fn store(&self, name: &str, contents: &[u8]) -> Result<PathBuf, ApplicationError> {
        let path = self.entry_path(name)?;
        tokio::fs::create_dir_all(&self.root)
            .await
            .map_err(|e| io_error(name, &e))?;

        let root = self.root.clone();
        let target = path.clone();
        let owned_name = name.to_string();
        let contents = contents.to_vec();

        tokio::task::spawn_blocking(move || {
            let mut file = NamedTempFile::new_in(&root).map_err(|e| io_error(&owned_name, &e))?;
            file.write_all(&contents)
                .map_err(|e| io_error(&owned_name, &e))?;
            file.as_file()
                .sync_all()
                .map_err(|e| io_error(&owned_name, &e))?;
            file.persist(&target)
                .map_err(|e| io_error(&owned_name, &e.error))?;
            Ok::<_, ApplicationError>(())
        })
        .await
        .map_err(|e| ApplicationError::Internal(format!("Model cache write panicked: {e}")))??;

        debug!(path = %path.display(), "Stored model");
        Ok(path)
    }
}
