use time::OffsetDateTime;

use super::{AvatarKey, UserId};

/// The avatar-relevant view of a user record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: UserId,
    pub email: String,
    pub full_name: String,
    /// Key of the custom avatar, `None` when the user has none.
    pub avatar_key: Option<AvatarKey>,
    /// Bumped on every avatar commit; doubles as the cache-busting marker.
    pub avatar_version: i64,
    pub avatar_updated_at: Option<OffsetDateTime>,
}

impl User {
    pub fn has_avatar(&self) -> bool {
        self.avatar_key.is_some()
    }

    /// Stable seed for the generated default avatar.
    pub fn default_avatar_seed(&self) -> String {
        let email = self.email.trim().to_lowercase();
        if email.is_empty() {
            format!("user-{}", self.id)
        } else {
            email
        }
    }
}
