use std::path::{Path, PathBuf};

/// Flat-file subscriber list: one JSON array of email strings.
///
/// There is no locking. Two requests that load, append and save at the same
/// time race and the last write wins.
#[derive(Debug, Clone)]
pub struct SubscriberStore {
    path: PathBuf,
}

#[derive(thiserror::Error, Debug)]
pub enum PersistenceError {
    #[error("Failed to read subscriber file {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to write subscriber file {path}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Subscriber file {path} is not a JSON array of strings")]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("Failed to serialize the subscriber list")]
    Serialize(#[source] serde_json::Error),
}

impl SubscriberStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Never fails: anything that goes wrong is logged and reads as "no subscribers".
    #[tracing::instrument(name = "Loading subscribers", skip(self), fields(path = %self.path.display()))]
    pub async fn load(&self) -> Vec<String> {
        match self.try_load().await {
            Ok(subscribers) => subscribers,
            Err(PersistenceError::Read { source, .. })
                if source.kind() == std::io::ErrorKind::NotFound =>
            {
                tracing::debug!("Subscriber file does not exist yet");
                Vec::new()
            }
            Err(e) => {
                tracing::error!(
                    error.cause_chain = ?e,
                    error.message = %e,
                    "Treating the subscriber list as empty"
                );
                Vec::new()
            }
        }
    }

    /// Best effort: a failed write is logged and otherwise ignored.
    #[tracing::instrument(
        name = "Saving subscribers",
        skip(self, subscribers),
        fields(path = %self.path.display(), count = subscribers.len())
    )]
    pub async fn save(&self, subscribers: &[String]) {
        if let Err(e) = self.try_save(subscribers).await {
            tracing::error!(
                error.cause_chain = ?e,
                error.message = %e,
                "Subscriber list was not persisted"
            );
        }
    }

    pub async fn try_load(&self) -> Result<Vec<String>, PersistenceError> {
        let raw = tokio::fs::read(&self.path)
            .await
            .map_err(|source| PersistenceError::Read {
                path: self.path.clone(),
                source,
            })?;

        serde_json::from_slice(&raw).map_err(|source| PersistenceError::Malformed {
            path: self.path.clone(),
            source,
        })
    }

    pub async fn try_save(&self, subscribers: &[String]) -> Result<(), PersistenceError> {
        let raw = serde_json::to_vec_pretty(subscribers).map_err(PersistenceError::Serialize)?;

        tokio::fs::write(&self.path, raw)
            .await
            .map_err(|source| PersistenceError::Write {
                path: self.path.clone(),
                source,
            })
    }
}
