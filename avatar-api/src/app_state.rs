use std::sync::Arc;

use crate::domain::ports::{inbound::AvatarService, outbound::UserRepository};

#[derive(Clone)]
pub struct AppState {
    pub avatar_service: Arc<dyn AvatarService>,
    pub users: Arc<dyn UserRepository>,
    /// Header the auth middleware reads the current user id from.
    pub user_header: Arc<str>,
}

impl AppState {
    pub fn new(
        avatar_service: Arc<dyn AvatarService>,
        users: Arc<dyn UserRepository>,
        user_header: impl Into<Arc<str>>,
    ) -> Self {
        Self {
            avatar_service,
            users,
            user_header: user_header.into(),
        }
    }
}
