//! Composition root: the only place that wires concrete outbound adapters
//! into the avatar service.

use std::sync::Arc;

use anyhow::Context;
use sqlx::PgPool;

use crate::{
    adapters::outbound::{
        filesystem::FilesystemContentStore,
        media::{IdenticonGenerator, WebpAvatarCodec},
        postgres::PostgresUserRepository,
    },
    app_state::AppState,
    config::Settings,
    domain::services::AvatarServiceImpl,
    services::OrphanSweeper,
};

pub struct Components {
    pub app_state: AppState,
    pub sweeper: OrphanSweeper,
}

pub async fn build(connection_pool: PgPool, config: &Settings) -> anyhow::Result<Components> {
    let avatar = &config.avatar;

    let users = Arc::new(PostgresUserRepository::new(connection_pool));
    let store = Arc::new(
        FilesystemContentStore::new(avatar.storage_path.clone())
            .await
            .with_context(|| {
                format!(
                    "failed to initialize avatar store at {}",
                    avatar.storage_path.display()
                )
            })?,
    );
    let codec = Arc::new(WebpAvatarCodec::from_settings(avatar).context("invalid avatar settings")?);
    let defaults = Arc::new(IdenticonGenerator::new(avatar.rendered_size, avatar.quality));

    let service = AvatarServiceImpl::new(
        users.clone(),
        store.clone(),
        codec,
        defaults,
        config.application.api_url.clone(),
    );
    let app_state = AppState::new(
        Arc::new(service),
        users.clone(),
        config.auth.user_header.as_str(),
    );

    let min_age = time::Duration::seconds(
        i64::try_from(config.sweeper.min_age_secs).context("sweeper min_age_secs is too large")?,
    );
    let sweeper = OrphanSweeper::new(users, store, min_age);

    Ok(Components { app_state, sweeper })
}
