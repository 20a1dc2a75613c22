use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info, warn};

use crate::domain::{
    models::{AvatarImage, AvatarKey, NormalizedAvatar, User},
    ports::{
        inbound::AvatarService,
        outbound::{AvatarCodec, ContentStore, DefaultAvatarGenerator, UserRepository},
    },
    AvatarError, StoreError,
};

const MAX_COMMIT_ATTEMPTS: usize = 3;

/// Result of a successful commit of the user record.
struct Commit {
    /// The key the commit replaced, which is not necessarily the one on the
    /// caller's snapshot if another request won a race in between.
    previous: Option<AvatarKey>,
    user: User,
}

pub struct AvatarServiceImpl<R, S, C, G> {
    users: Arc<R>,
    store: Arc<S>,
    codec: Arc<C>,
    defaults: Arc<G>,
    api_url: String,
}

impl<R, S, C, G> AvatarServiceImpl<R, S, C, G>
where
    R: UserRepository,
    S: ContentStore,
    C: AvatarCodec,
    G: DefaultAvatarGenerator,
{
    pub fn new(
        users: Arc<R>,
        store: Arc<S>,
        codec: Arc<C>,
        defaults: Arc<G>,
        api_url: impl Into<String>,
    ) -> Self {
        Self {
            users,
            store,
            codec,
            defaults,
            api_url: api_url.into(),
        }
    }

    /// Compare-and-set the user's avatar key, re-reading the record whenever
    /// another writer bumped the version first.
    ///
    /// Returns `None` when clearing and the record turns out to have no
    /// avatar anymore.
    async fn commit(
        &self,
        user: &User,
        key: Option<&AvatarKey>,
    ) -> Result<Option<Commit>, AvatarError> {
        let mut snapshot = user.clone();

        for attempt in 1..=MAX_COMMIT_ATTEMPTS {
            if key.is_none() && snapshot.avatar_key.is_none() {
                return Ok(None);
            }

            let committed = self
                .users
                .set_avatar_key(&snapshot.id, snapshot.avatar_version, key)
                .await?;

            match committed {
                Some(updated) => {
                    return Ok(Some(Commit {
                        previous: snapshot.avatar_key,
                        user: updated,
                    }))
                }
                None => {
                    debug!(
                        user_id = %snapshot.id,
                        attempt,
                        "avatar version moved on, re-reading user"
                    );
                    snapshot = self
                        .users
                        .get_user(&snapshot.id)
                        .await?
                        .ok_or(AvatarError::UserNotFound)?;
                }
            }
        }

        Err(AvatarError::Conflict)
    }

    /// Advisory cleanup of a key the user no longer points at. Never fails:
    /// anything left behind is an orphan for the sweeper.
    async fn release(&self, previous: Option<AvatarKey>, current: Option<&AvatarKey>) {
        let Some(previous) = previous else {
            return;
        };
        if Some(&previous) == current {
            return;
        }

        match self.users.is_avatar_referenced(&previous).await {
            Ok(false) => {}
            Ok(true) => {
                debug!(key = %previous, "previous avatar still referenced, keeping blob");
                return;
            }
            Err(err) => {
                warn!(key = %previous, error = %err, "could not check avatar references, skipping cleanup");
                return;
            }
        }

        // Another user may commit the same content key between the reference
        // check and the delete, so keep the bytes and re-check afterwards.
        let retained = self.store.get(&previous).await.ok();
        if let Err(err) = self.store.delete(&previous).await {
            warn!(key = %previous, error = %err, "failed to delete previous avatar blob");
            return;
        }

        if matches!(self.users.is_avatar_referenced(&previous).await, Ok(false)) {
            return;
        }
        let Some(bytes) = retained else {
            warn!(key = %previous, "avatar blob re-referenced during cleanup and cannot be restored");
            return;
        };
        match self.store.put(&previous, &bytes).await {
            Ok(()) => debug!(key = %previous, "restored avatar blob re-referenced during cleanup"),
            Err(err) => {
                warn!(key = %previous, error = %err, "failed to restore re-referenced avatar blob")
            }
        }
    }
}

#[async_trait]
impl<R, S, C, G> AvatarService for AvatarServiceImpl<R, S, C, G>
where
    R: UserRepository,
    S: ContentStore,
    C: AvatarCodec,
    G: DefaultAvatarGenerator,
{
    async fn upload_avatar(
        &self,
        user: &User,
        image: Vec<u8>,
    ) -> Result<AvatarImage, AvatarError> {
        if image.is_empty() {
            return Err(AvatarError::invalid_image("empty payload"));
        }

        let codec = Arc::clone(&self.codec);
        let NormalizedAvatar { key, image } =
            tokio::task::spawn_blocking(move || codec.normalize(&image))
                .await
                .map_err(|err| {
                    AvatarError::invalid_image(format!("avatar processing task failed: {err}"))
                })??;

        self.store
            .put(&key, &image.bytes)
            .await
            .map_err(|err| AvatarError::StoreUnavailable(err.to_string()))?;

        if let Some(commit) = self.commit(user, Some(&key)).await? {
            info!(
                user_id = %commit.user.id,
                key = %key,
                version = commit.user.avatar_version,
                "avatar updated"
            );
            self.release(commit.previous, Some(&key)).await;
        }

        Ok(image)
    }

    async fn delete_avatar(&self, user: &User) -> Result<(), AvatarError> {
        if user.avatar_key.is_none() {
            debug!(user_id = %user.id, "no custom avatar to delete");
            return Ok(());
        }

        if let Some(commit) = self.commit(user, None).await? {
            info!(
                user_id = %commit.user.id,
                version = commit.user.avatar_version,
                "avatar removed"
            );
            self.release(commit.previous, None).await;
        }

        Ok(())
    }

    async fn resolve_avatar(&self, user: &User) -> AvatarImage {
        if let Some(key) = &user.avatar_key {
            match self.store.get(key).await {
                Ok(bytes) => return AvatarImage::new(bytes, self.codec.mime_type()),
                Err(StoreError::NotFound(_)) => {
                    warn!(user_id = %user.id, key = %key, "avatar blob missing, serving default");
                }
                Err(err) => {
                    warn!(user_id = %user.id, key = %key, error = %err, "failed to read avatar blob, serving default");
                }
            }
        }

        self.defaults.generate(&user.default_avatar_seed())
    }

    fn avatar_url(&self, user: &User) -> String {
        let base_url = self.api_url.trim_end_matches('/');
        format!(
            "{base_url}/users/{}/avatar?v={}",
            user.id.as_i32(),
            user.avatar_version
        )
    }
}
