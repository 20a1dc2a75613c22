use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{
    atomic::{AtomicBool, AtomicUsize, Ordering},
    Arc, RwLock,
};
use time::OffsetDateTime;

use crate::domain::{
    models::{AvatarKey, StoredBlob},
    ports::outbound::ContentStore,
    StoreError,
};

/// Content store backed by an in-memory HashMap that records every call.
#[derive(Clone, Default)]
pub struct MockContentStore {
    blobs: Arc<RwLock<HashMap<AvatarKey, (Vec<u8>, OffsetDateTime)>>>,
    puts: Arc<AtomicUsize>,
    delete_attempts: Arc<RwLock<Vec<AvatarKey>>>,
    fail_puts: Arc<AtomicBool>,
    fail_gets: Arc<AtomicBool>,
    fail_deletes: Arc<AtomicBool>,
}

impl MockContentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_failing_puts(self) -> Self {
        self.fail_puts.store(true, Ordering::SeqCst);
        self
    }

    pub fn with_failing_gets(self) -> Self {
        self.fail_gets.store(true, Ordering::SeqCst);
        self
    }

    pub fn with_failing_deletes(self) -> Self {
        self.fail_deletes.store(true, Ordering::SeqCst);
        self
    }

    /// Insert a blob directly, bypassing call accounting.
    pub fn insert(&self, key: AvatarKey, bytes: Vec<u8>, modified_at: OffsetDateTime) {
        self.blobs
            .write()
            .unwrap()
            .insert(key, (bytes, modified_at));
    }

    /// Drop a blob without recording a delete attempt.
    pub fn evict(&self, key: &AvatarKey) {
        self.blobs.write().unwrap().remove(key);
    }

    pub fn contains(&self, key: &AvatarKey) -> bool {
        self.blobs.read().unwrap().contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.blobs.read().unwrap().len()
    }

    pub fn put_count(&self) -> usize {
        self.puts.load(Ordering::SeqCst)
    }

    pub fn delete_attempts(&self) -> Vec<AvatarKey> {
        self.delete_attempts.read().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.put_count() + self.delete_attempts.read().unwrap().len()
    }
}

#[async_trait]
impl ContentStore for MockContentStore {
    async fn put(&self, key: &AvatarKey, bytes: &[u8]) -> Result<(), StoreError> {
        self.puts.fetch_add(1, Ordering::SeqCst);
        if self.fail_puts.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("disk full".to_string()));
        }

        let now = OffsetDateTime::now_utc();
        self.blobs
            .write()
            .unwrap()
            .entry(key.clone())
            .and_modify(|(_, modified_at)| *modified_at = now)
            .or_insert_with(|| (bytes.to_vec(), now));
        Ok(())
    }

    async fn get(&self, key: &AvatarKey) -> Result<Vec<u8>, StoreError> {
        if self.fail_gets.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("connection reset".to_string()));
        }

        self.blobs
            .read()
            .unwrap()
            .get(key)
            .map(|(bytes, _)| bytes.clone())
            .ok_or_else(|| StoreError::NotFound(key.clone()))
    }

    async fn delete(&self, key: &AvatarKey) -> Result<(), StoreError> {
        self.delete_attempts.write().unwrap().push(key.clone());
        if self.fail_deletes.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("permission denied".to_string()));
        }

        self.blobs.write().unwrap().remove(key);
        Ok(())
    }

    async fn list(&self) -> Result<Vec<StoredBlob>, StoreError> {
        Ok(self
            .blobs
            .read()
            .unwrap()
            .iter()
            .map(|(key, (_, modified_at))| StoredBlob {
                key: key.clone(),
                modified_at: *modified_at,
            })
            .collect())
    }
}
