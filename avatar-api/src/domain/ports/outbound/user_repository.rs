use async_trait::async_trait;

use crate::domain::{
    models::{AvatarKey, User, UserId},
    AvatarError,
};

#[async_trait]
pub trait UserRepository: Send + Sync + 'static {
    async fn get_user(&self, user_id: &UserId) -> Result<Option<User>, AvatarError>;

    /// Point the user's avatar at `key` (or clear it) and bump the version,
    /// but only if the stored version still equals `expected_version`.
    ///
    /// Returns `None` when the version moved on or the user no longer exists.
    async fn set_avatar_key(
        &self,
        user_id: &UserId,
        expected_version: i64,
        key: Option<&AvatarKey>,
    ) -> Result<Option<User>, AvatarError>;

    /// Whether any user currently references `key`.
    async fn is_avatar_referenced(&self, key: &AvatarKey) -> Result<bool, AvatarError>;
}
