use async_trait::async_trait;

use crate::domain::{
    models::{AvatarImage, User},
    AvatarError,
};

#[async_trait]
pub trait AvatarService: Send + Sync + 'static {
    /// Normalize, store and commit a new avatar for `user`.
    ///
    /// Returns the normalized image so it can be rendered without a second
    /// round trip to the store.
    async fn upload_avatar(&self, user: &User, image: Vec<u8>)
        -> Result<AvatarImage, AvatarError>;

    /// Revert `user` to the generated default avatar. Succeeds when the user
    /// has no custom avatar.
    async fn delete_avatar(&self, user: &User) -> Result<(), AvatarError>;

    /// The image to display for `user`, falling back to the generated default.
    async fn resolve_avatar(&self, user: &User) -> AvatarImage;

    fn avatar_url(&self, user: &User) -> String;
}
