use async_trait::async_trait;
use sqlx::PgPool;
use time::OffsetDateTime;

use crate::domain::{
    models::{AvatarKey, User, UserId},
    ports::outbound::UserRepository,
    AvatarError,
};

#[derive(sqlx::FromRow)]
struct UserRow {
    id: i32,
    email: String,
    full_name: String,
    avatar_key: Option<String>,
    avatar_version: i64,
    avatar_updated_at: Option<OffsetDateTime>,
}

impl TryFrom<UserRow> for User {
    type Error = AvatarError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let avatar_key = row
            .avatar_key
            .as_deref()
            .map(AvatarKey::parse)
            .transpose()
            .map_err(|err| AvatarError::Repository(err.to_string()))?;

        Ok(User {
            id: UserId::new(row.id),
            email: row.email,
            full_name: row.full_name,
            avatar_key,
            avatar_version: row.avatar_version,
            avatar_updated_at: row.avatar_updated_at,
        })
    }
}

pub struct PostgresUserRepository {
    pool: PgPool,
}

impl PostgresUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn get_user(&self, user_id: &UserId) -> Result<Option<User>, AvatarError> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, email, full_name, avatar_key, avatar_version, avatar_updated_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(user_id.as_i32())
        .fetch_optional(&self.pool)
        .await
        .map_err(|err| AvatarError::Repository(err.to_string()))?;

        row.map(User::try_from).transpose()
    }

    async fn set_avatar_key(
        &self,
        user_id: &UserId,
        expected_version: i64,
        key: Option<&AvatarKey>,
    ) -> Result<Option<User>, AvatarError> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            UPDATE users
            SET avatar_key = $3,
                avatar_version = avatar_version + 1,
                avatar_updated_at = now()
            WHERE id = $1 AND avatar_version = $2
            RETURNING id, email, full_name, avatar_key, avatar_version, avatar_updated_at
            "#,
        )
        .bind(user_id.as_i32())
        .bind(expected_version)
        .bind(key.map(AvatarKey::as_str))
        .fetch_optional(&self.pool)
        .await
        .map_err(|err| AvatarError::Repository(err.to_string()))?;

        row.map(User::try_from).transpose()
    }

    async fn is_avatar_referenced(&self, key: &AvatarKey) -> Result<bool, AvatarError> {
        sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS (
                SELECT 1
                FROM users
                WHERE avatar_key = $1
            )
            "#,
        )
        .bind(key.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(|err| AvatarError::Repository(err.to_string()))
    }
}
