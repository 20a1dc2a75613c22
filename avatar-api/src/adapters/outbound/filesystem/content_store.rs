use std::{path::PathBuf, time::SystemTime};

use async_trait::async_trait;
use time::OffsetDateTime;
use tokio::fs;

use crate::domain::{
    models::{AvatarKey, StoredBlob},
    ports::outbound::ContentStore,
    StoreError,
};

const TEMP_DIR: &str = ".tmp";

/// Filesystem-backed avatar store.
///
/// Blobs are laid out Git-style: `{root}/{first 2 hex chars}/{remaining 62}`.
/// Writes go to `{root}/.tmp` first and are renamed into place, so readers
/// never see a partially written blob.
pub struct FilesystemContentStore {
    root: PathBuf,
}

impl FilesystemContentStore {
    pub async fn new(root: PathBuf) -> Result<Self, StoreError> {
        fs::create_dir_all(root.join(TEMP_DIR)).await?;
        tracing::info!("avatar store initialized at: {}", root.display());
        Ok(Self { root })
    }

    fn blob_path(&self, key: &AvatarKey) -> PathBuf {
        self.root.join(key.shard_prefix()).join(key.shard_suffix())
    }

    fn temp_path(&self) -> PathBuf {
        self.root
            .join(TEMP_DIR)
            .join(uuid::Uuid::new_v4().to_string())
    }
}

/// Bumps the modification time of an existing blob so a re-put counts as
/// fresh for the orphan sweeper. Returns `false` when there is no blob.
async fn touch(path: PathBuf) -> Result<bool, StoreError> {
    let touched = tokio::task::spawn_blocking(move || {
        std::fs::OpenOptions::new()
            .write(true)
            .open(&path)
            .and_then(|file| file.set_modified(SystemTime::now()))
    })
    .await
    .map_err(|err| StoreError::Unavailable(format!("touch task failed: {err}")))?;

    match touched {
        Ok(()) => Ok(true),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(false),
        Err(err) => Err(err.into()),
    }
}

#[async_trait]
impl ContentStore for FilesystemContentStore {
    async fn put(&self, key: &AvatarKey, bytes: &[u8]) -> Result<(), StoreError> {
        let blob_path = self.blob_path(key);
        if touch(blob_path.clone()).await? {
            return Ok(());
        }

        let temp_path = self.temp_path();
        if let Err(err) = fs::write(&temp_path, bytes).await {
            let _ = fs::remove_file(&temp_path).await;
            return Err(err.into());
        }

        if let Some(parent) = blob_path.parent() {
            fs::create_dir_all(parent).await?;
        }

        if let Err(err) = fs::rename(&temp_path, &blob_path).await {
            let _ = fs::remove_file(&temp_path).await;
            return Err(err.into());
        }

        Ok(())
    }

    async fn get(&self, key: &AvatarKey) -> Result<Vec<u8>, StoreError> {
        match fs::read(self.blob_path(key)).await {
            Ok(bytes) => Ok(bytes),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                Err(StoreError::NotFound(key.clone()))
            }
            Err(err) => Err(err.into()),
        }
    }

    async fn delete(&self, key: &AvatarKey) -> Result<(), StoreError> {
        match fs::remove_file(self.blob_path(key)).await {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }

    async fn list(&self) -> Result<Vec<StoredBlob>, StoreError> {
        let mut blobs = Vec::new();
        let mut shards = fs::read_dir(&self.root).await?;

        while let Some(shard) = shards.next_entry().await? {
            let prefix = shard.file_name().to_string_lossy().into_owned();
            if prefix == TEMP_DIR || !shard.file_type().await?.is_dir() {
                continue;
            }

            let mut entries = fs::read_dir(shard.path()).await?;
            while let Some(entry) = entries.next_entry().await? {
                let name = format!("{prefix}{}", entry.file_name().to_string_lossy());
                let Ok(key) = AvatarKey::parse(&name) else {
                    tracing::warn!("skipping unexpected file in avatar store: {}", name);
                    continue;
                };

                let modified = entry.metadata().await?.modified()?;
                blobs.push(StoredBlob {
                    key,
                    modified_at: OffsetDateTime::from(modified),
                });
            }
        }

        Ok(blobs)
    }
}
