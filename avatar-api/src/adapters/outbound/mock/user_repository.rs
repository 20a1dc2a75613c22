use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc, RwLock,
};
use time::OffsetDateTime;

use crate::domain::{
    models::{AvatarKey, User, UserId},
    ports::outbound::UserRepository,
    AvatarError,
};

/// User repository backed by an in-memory HashMap.
#[derive(Clone, Default)]
pub struct MockUserRepository {
    users: Arc<RwLock<HashMap<UserId, User>>>,
    reference_answers: Arc<RwLock<VecDeque<bool>>>,
    fail_reference_checks: Arc<AtomicBool>,
}

impl MockUserRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_user(self, user: User) -> Self {
        self.users.write().unwrap().insert(user.id, user);
        self
    }

    pub fn with_failing_reference_checks(self) -> Self {
        self.fail_reference_checks.store(true, Ordering::SeqCst);
        self
    }

    /// Queue answers for the next reference checks, consumed before the
    /// stored users are consulted.
    pub fn with_reference_answers(self, answers: impl IntoIterator<Item = bool>) -> Self {
        self.reference_answers.write().unwrap().extend(answers);
        self
    }

    /// Current stored state of a user (for test assertions).
    pub fn user(&self, user_id: &UserId) -> Option<User> {
        self.users.read().unwrap().get(user_id).cloned()
    }
}

#[async_trait]
impl UserRepository for MockUserRepository {
    async fn get_user(&self, user_id: &UserId) -> Result<Option<User>, AvatarError> {
        Ok(self.user(user_id))
    }

    async fn set_avatar_key(
        &self,
        user_id: &UserId,
        expected_version: i64,
        key: Option<&AvatarKey>,
    ) -> Result<Option<User>, AvatarError> {
        let mut users = self.users.write().unwrap();
        let Some(user) = users.get_mut(user_id) else {
            return Ok(None);
        };

        if user.avatar_version != expected_version {
            return Ok(None);
        }

        user.avatar_key = key.cloned();
        user.avatar_version += 1;
        user.avatar_updated_at = Some(OffsetDateTime::now_utc());
        Ok(Some(user.clone()))
    }

    async fn is_avatar_referenced(&self, key: &AvatarKey) -> Result<bool, AvatarError> {
        if self.fail_reference_checks.load(Ordering::SeqCst) {
            return Err(AvatarError::Repository("connection refused".to_string()));
        }
        if let Some(answer) = self.reference_answers.write().unwrap().pop_front() {
            return Ok(answer);
        }

        Ok(self
            .users
            .read()
            .unwrap()
            .values()
            .any(|user| user.avatar_key.as_ref() == Some(key)))
    }
}
