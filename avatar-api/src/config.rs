use std::{path::PathBuf, str::FromStr};

use serde::Deserialize;
use serde_with::serde_as;
use sqlx::postgres::{PgConnectOptions, PgSslMode};
use strum::{Display, EnumString};

#[derive(Deserialize, Clone)]
pub struct Settings {
    pub application: ApplicationSettings,
    pub database: DatabaseSettings,
    pub avatar: AvatarSettings,
    pub sweeper: SweeperSettings,
    pub auth: AuthSettings,
}

#[serde_as]
#[derive(Deserialize, Clone)]
pub struct ApplicationSettings {
    #[serde_as(as = "serde_with::DisplayFromStr")]
    pub port: u16,
    pub host: String,
    /// Public base URL of this API, used to build avatar links.
    pub api_url: String,
    #[serde(default)]
    pub cors_allowed_origins: Vec<String>,
}

#[serde_as]
#[derive(Deserialize, Clone, Debug)]
pub struct DatabaseSettings {
    pub username: String,
    pub password: String,
    #[serde_as(as = "serde_with::DisplayFromStr")]
    pub port: u16,
    pub host: String,
    pub database_name: String,
    pub require_ssl: bool,
}

/// Validation and normalization rules for uploaded avatars.
#[serde_as]
#[derive(Deserialize, Clone, Debug)]
pub struct AvatarSettings {
    #[serde_as(as = "serde_with::DisplayFromStr")]
    pub max_bytes: usize,
    #[serde_as(as = "serde_with::DisplayFromStr")]
    pub max_dimension: u32,
    #[serde_as(as = "serde_with::DisplayFromStr")]
    pub rendered_size: u32,
    #[serde_as(as = "serde_with::DisplayFromStr")]
    pub quality: f32,
    pub allowed_formats: Vec<String>,
    pub storage_path: PathBuf,
}

impl Default for AvatarSettings {
    fn default() -> Self {
        Self {
            max_bytes: 1024 * 1024,
            max_dimension: 4096,
            rendered_size: 256,
            quality: 80.0,
            allowed_formats: ["png", "jpeg", "gif", "webp"]
                .into_iter()
                .map(String::from)
                .collect(),
            storage_path: PathBuf::from("data/avatars"),
        }
    }
}

#[serde_as]
#[derive(Deserialize, Clone, Debug)]
pub struct SweeperSettings {
    pub enabled: bool,
    #[serde_as(as = "serde_with::DisplayFromStr")]
    pub interval_secs: u64,
    /// Blobs younger than this are never swept, so an upload between its
    /// store write and its commit is left alone.
    #[serde_as(as = "serde_with::DisplayFromStr")]
    pub min_age_secs: u64,
}

#[derive(Deserialize, Clone, Debug)]
pub struct AuthSettings {
    /// Header carrying the user id, set by the authenticating gateway.
    pub user_header: String,
}

impl DatabaseSettings {
    pub fn without_db(&self) -> PgConnectOptions {
        let ssl_mode = if self.require_ssl {
            PgSslMode::Require
        } else {
            PgSslMode::Prefer
        };

        PgConnectOptions::new()
            .host(&self.host)
            .port(self.port)
            .username(&self.username)
            .password(&self.password)
            .ssl_mode(ssl_mode)
    }

    pub fn with_db(&self) -> PgConnectOptions {
        self.without_db().database(&self.database_name)
    }
}

pub fn read_config() -> Result<Settings, config::ConfigError> {
    let base_path = std::env::current_dir()
        .map_err(|err| config::ConfigError::Message(format!("no current directory: {err}")))?;
    let config_directory = base_path.join("config");

    let environment = Environment::from_str(
        std::env::var("APP_ENVIRONMENT")
            .unwrap_or_else(|_| "local".into())
            .as_str(),
    )
    .map_err(|err| config::ConfigError::Message(format!("invalid APP_ENVIRONMENT: {err}")))?;
    let environment_filename = format!("{}.yaml", environment);

    let settings = config::Config::builder()
        .add_source(config::File::from(config_directory.join("base.yaml")))
        .add_source(config::File::from(
            config_directory.join(environment_filename),
        ))
        .add_source(
            config::Environment::with_prefix("AVATAR")
                .prefix_separator("_")
                .separator("__"),
        )
        .build()?;

    settings.try_deserialize::<Settings>()
}

#[derive(Display, Debug, PartialEq, EnumString)]
pub enum Environment {
    #[strum(ascii_case_insensitive, serialize = "local")]
    Local,
    #[strum(ascii_case_insensitive, serialize = "production")]
    Production,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn environment_parses_case_insensitively() {
        assert_eq!(Environment::from_str("LOCAL").unwrap(), Environment::Local);
        assert_eq!(
            Environment::from_str("production").unwrap(),
            Environment::Production
        );
        assert!(Environment::from_str("staging").is_err());
        assert_eq!(Environment::Production.to_string(), "production");
    }

    #[test]
    fn settings_deserialize_from_yaml() {
        let yaml = r#"
application:
  port: 8080
  host: 0.0.0.0
  api_url: https://api.example.com
database:
  username: postgres
  password: password
  port: 5432
  host: localhost
  database_name: avatars
  require_ssl: false
avatar:
  max_bytes: 2048
  max_dimension: 1024
  rendered_size: 128
  quality: 75
  allowed_formats: [png, jpeg]
  storage_path: /var/lib/avatars
sweeper:
  enabled: true
  interval_secs: 3600
  min_age_secs: 600
auth:
  user_header: x-auth-user-id
"#;
        let settings = config::Config::builder()
            .add_source(config::File::from_str(yaml, config::FileFormat::Yaml))
            .build()
            .unwrap()
            .try_deserialize::<Settings>()
            .unwrap();

        assert_eq!(settings.application.port, 8080);
        assert!(settings.application.cors_allowed_origins.is_empty());
        assert_eq!(settings.avatar.max_bytes, 2048);
        assert_eq!(settings.avatar.quality, 75.0);
        assert_eq!(settings.avatar.allowed_formats, vec!["png", "jpeg"]);
        assert!(settings.sweeper.enabled);
        assert_eq!(settings.auth.user_header, "x-auth-user-id");
    }
}
