use std::{collections::HashMap, path::PathBuf};

use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Storage path {0} is not a directory")]
    NotADirectory(PathBuf),
    #[error("Storage io failed on {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

#[async_trait]
pub trait StorageApiT: Send + Sync + 'static {
    async fn save(&mut self, name: &str, content: String) -> Result<(), StorageError>;

    async fn load(&mut self, name: &str) -> Result<Option<String>, StorageError>;

    async fn remove(&mut self, name: &str) -> Result<(), StorageError>;
}

pub struct StorageApi {
    path: PathBuf,
    cache: HashMap<String, String>,
}

impl StorageApi {
    /// Opens the storage directory, creating it when missing.
    pub fn new(path: PathBuf) -> Result<Self, StorageError> {
        if !path.exists() {
            std::fs::create_dir_all(&path).map_err(|source| StorageError::Io {
                path: path.clone(),
                source,
            })?;
        }

        if !path.is_dir() {
            return Err(StorageError::NotADirectory(path));
        }

        Ok(Self {
            path,
            cache: HashMap::new(),
        })
    }
}

#[async_trait]
impl StorageApiT for StorageApi {
    async fn save(&mut self, name: &str, content: String) -> Result<(), StorageError> {
        let path = self.path.join(name);

        tokio::fs::write(&path, content.clone())
            .await
            .map_err(|source| StorageError::Io { path, source })?;

        self.cache.insert(name.to_string(), content);

        Ok(())
    }

    async fn load(&mut self, name: &str) -> Result<Option<String>, StorageError> {
        if let Some(cached) = self.cache.get(name) {
            return Ok(Some(cached.clone()));
        }

        let path = self.path.join(name);

        let file_exists = tokio::fs::try_exists(&path).await;
        if !matches!(file_exists, Ok(true)) {
            return Ok(None);
        }

        let content = tokio::fs::read_to_string(&path)
            .await
            .map_err(|source| StorageError::Io { path, source })?;

        self.cache.insert(name.to_string(), content.clone());

        Ok(Some(content))
    }

    async fn remove(&mut self, name: &str) -> Result<(), StorageError> {
        self.cache.remove(name);

        let path = self.path.join(name);
        match tokio::fs::remove_file(&path).await {
            Err(error) if error.kind() != std::io::ErrorKind::NotFound => {
                Err(StorageError::Io {
                    path,
                    source: error,
                })
            }
            _ => Ok(()),
        }
    }
}

pub mod mock {
    use super::*;

    pub struct StorageApiMock {
        storage: HashMap<String, String>,
    }

    impl StorageApiMock {
        pub fn new() -> Self {
            Self {
                storage: HashMap::new(),
            }
        }
    }

    #[async_trait]
    impl StorageApiT for StorageApiMock {
        async fn save(&mut self, name: &str, content: String) -> Result<(), StorageError> {
            self.storage.insert(name.to_string(), content);
            Ok(())
        }

        async fn load(&mut self, name: &str) -> Result<Option<String>, StorageError> {
            Ok(self.storage.get(name).cloned())
        }

        async fn remove(&mut self, name: &str) -> Result<(), StorageError> {
            self.storage.remove(name);
            Ok(())
        }
    }
}
