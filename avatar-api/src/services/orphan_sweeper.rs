use std::sync::Arc;

use time::{Duration, OffsetDateTime};
use tracing::{debug, error, info};

use crate::domain::{
    ports::outbound::{ContentStore, UserRepository},
    AvatarError,
};

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SweepStats {
    pub removed: usize,
    pub referenced: usize,
    pub too_young: usize,
    pub failed: usize,
}

/// Reclaims avatar blobs that no user references anymore.
///
/// Blobs younger than `min_age` are skipped: an upload stores its blob before
/// it commits the user record, and that window must not be swept.
#[derive(Clone)]
pub struct OrphanSweeper {
    users: Arc<dyn UserRepository>,
    store: Arc<dyn ContentStore>,
    min_age: Duration,
}

impl OrphanSweeper {
    pub fn new(
        users: Arc<dyn UserRepository>,
        store: Arc<dyn ContentStore>,
        min_age: Duration,
    ) -> Self {
        Self {
            users,
            store,
            min_age,
        }
    }

    pub async fn sweep(&self) -> Result<SweepStats, AvatarError> {
        let blobs = self.store.list().await?;
        let cutoff = OffsetDateTime::now_utc() - self.min_age;
        let mut stats = SweepStats::default();

        for blob in blobs {
            if blob.modified_at > cutoff {
                stats.too_young += 1;
                continue;
            }

            match self.users.is_avatar_referenced(&blob.key).await {
                Ok(true) => {
                    stats.referenced += 1;
                    continue;
                }
                Ok(false) => {}
                Err(err) => {
                    error!(key = %blob.key, error = %err, "failed to check avatar references");
                    stats.failed += 1;
                    continue;
                }
            }

            match self.store.delete(&blob.key).await {
                Ok(()) => {
                    debug!(key = %blob.key, "removed orphaned avatar blob");
                    stats.removed += 1;
                }
                Err(err) => {
                    error!(key = %blob.key, error = %err, "failed to remove orphaned avatar blob");
                    stats.failed += 1;
                }
            }
        }

        Ok(stats)
    }

    pub fn start_sweep_task(&self, interval: std::time::Duration) -> tokio::task::JoinHandle<()> {
        let sweeper = self.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(interval);
            loop {
                interval.tick().await;
                match sweeper.sweep().await {
                    Ok(stats) if stats.removed > 0 || stats.failed > 0 => {
                        info!(
                            removed = stats.removed,
                            failed = stats.failed,
                            "orphaned avatar sweep finished"
                        );
                    }
                    Ok(_) => debug!("orphaned avatar sweep found nothing to remove"),
                    Err(err) => error!("orphaned avatar sweep failed: {}", err),
                }
            }
        })
    }
}
