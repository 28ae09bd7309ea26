//! UUID-keyed store for generated audio artifacts.
//!
//! Each successful generation writes its WAV under a fresh UUID and the
//! identifier travels back to the client in the response, so concurrent
//! generations never clobber each other. Artifacts are plain files in
//! the configured directory; nothing is persisted beyond them.

use std::path::{Path, PathBuf};

use uuid::Uuid;

use crate::error::{EscuchaError, Result};

/// Filesystem store for generated WAV artifacts.
#[derive(Debug, Clone)]
pub struct AudioStore {
    dir: PathBuf,
}

impl AudioStore {
    /// Opens (and creates, if needed) the store directory.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the directory cannot be created.
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    /// Stores WAV bytes under a fresh identifier.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the write fails; no partial artifact is
    /// left behind with a returned id.
    pub async fn put(&self, wav: &[u8]) -> Result<Uuid> {
        let id = Uuid::new_v4();
        let path = self.path_for(id);
        tokio::fs::write(&path, wav).await?;
        tracing::debug!(%id, bytes = wav.len(), "Stored audio artifact");
        Ok(id)
    }

    /// Reads the artifact stored under `id`.
    ///
    /// # Errors
    ///
    /// Returns `EscuchaError::AudioNotFound` if no artifact exists for
    /// the identifier.
    pub async fn read(&self, id: Uuid) -> Result<Vec<u8>> {
        match tokio::fs::read(self.path_for(id)).await {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(EscuchaError::audio_not_found(id.to_string()))
            }
            Err(e) => Err(EscuchaError::Io(e)),
        }
    }

    /// Number of artifacts currently stored.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the directory cannot be read.
    pub fn entry_count(&self) -> Result<usize> {
        Ok(std::fs::read_dir(&self.dir)?.count())
    }

    /// The URL path an artifact is served under.
    #[must_use]
    pub fn url(id: Uuid) -> String {
        format!("/api/audio/{id}")
    }

    /// The store directory.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, id: Uuid) -> PathBuf {
        self.dir.join(format!("{id}.wav"))
    }
}
