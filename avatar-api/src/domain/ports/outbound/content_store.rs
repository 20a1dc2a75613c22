use async_trait::async_trait;

use crate::domain::{
    models::{AvatarKey, StoredBlob},
    StoreError,
};

/// Key/value blob storage for avatar content.
#[async_trait]
pub trait ContentStore: Send + Sync + 'static {
    /// Store `bytes` under `key`. Writing an existing key is a no-op.
    async fn put(&self, key: &AvatarKey, bytes: &[u8]) -> Result<(), StoreError>;

    async fn get(&self, key: &AvatarKey) -> Result<Vec<u8>, StoreError>;

    /// Remove `key`. Removing an absent key succeeds.
    async fn delete(&self, key: &AvatarKey) -> Result<(), StoreError>;

    async fn list(&self) -> Result<Vec<StoredBlob>, StoreError>;
}
