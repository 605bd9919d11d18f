use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::Path;

use anyhow::{Context, Result, ensure};
use config::{Config, ConfigError, File, FileFormat};
use serde::Deserialize;

const CONFIG_PATH_VAR: &str = "INTERN_DASHBOARD_CONFIG";
const CONFIG_ENV_VAR: &str = "INTERN_DASHBOARD_ENV";
const DEFAULT_CONFIG_PATH: &str = "config/dashboard.toml";
const MIN_JWT_SECRET_LEN: usize = 32;

#[derive(Debug, Clone, Deserialize)]
pub struct DashboardConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    #[serde(default)]
    pub demo: DemoConfig,
}

impl DashboardConfig {
    pub fn load() -> Result<Self> {
        let configured_path =
            std::env::var(CONFIG_PATH_VAR).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        ensure!(
            !configured_path.is_empty(),
            "Configuration path must be non-empty"
        );

        let mut builder = Config::builder()
            .add_source(File::new(&configured_path, FileFormat::Toml).required(true));

        if let Ok(env_override) = std::env::var(CONFIG_ENV_VAR) {
            if !env_override.is_empty() {
                let env_file = format!("config/dashboard.{env_override}.toml");
                if Path::new(&env_file).exists() {
                    builder = builder.add_source(File::new(&env_file, FileFormat::Toml));
                }
            }
        }

        let settings = builder
            .build()
            .map_err(|err| map_config_error(err, &configured_path))?;
        Self::from_settings(settings)
    }

    fn from_settings(settings: Config) -> Result<Self> {
        let config: Self = settings
            .try_deserialize()
            .context("Failed to deserialize dashboard configuration")?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        ensure!(!self.database.url.is_empty(), "Database URL must be specified");
        ensure!(self.server.port > 0, "Server port must be greater than zero");
        ensure!(
            self.database.max_connections >= self.database.min_connections.unwrap_or(1),
            "Max connections must be >= min connections"
        );
        ensure!(
            self.database.max_connections <= 128,
            "Connection pool oversized"
        );
        ensure!(
            self.auth.jwt_secret.len() >= MIN_JWT_SECRET_LEN,
            "JWT secret must be at least {MIN_JWT_SECRET_LEN} bytes"
        );
        ensure!(
            (1..=43_200).contains(&self.auth.token_ttl_minutes),
            "Token lifetime must be between one minute and thirty days"
        );
        if let Some(password) = &self.demo.password {
            ensure!(
                password.len() >= 8,
                "Demo password must be at least 8 characters"
            );
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: Option<IpAddr>,
    pub port: u16,
}

impl ServerConfig {
    pub fn address(&self) -> SocketAddr {
        let host = self.host.unwrap_or(IpAddr::V4(Ipv4Addr::LOCALHOST));
        assert!(self.port != 0, "HTTP port cannot be zero");
        SocketAddr::new(host, self.port)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: Option<u32>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    pub jwt_secret: String,
    #[serde(default = "AuthConfig::default_token_ttl_minutes")]
    pub token_ttl_minutes: i64,
}

impl AuthConfig {
    pub fn token_ttl(&self) -> chrono::Duration {
        chrono::Duration::minutes(self.token_ttl_minutes)
    }

    const fn default_token_ttl_minutes() -> i64 {
        60
    }
}

/// Demo mode seeds a fixed intern and badge ladder at startup.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DemoConfig {
    #[serde(default)]
    pub seed: bool,
    pub password: Option<String>,
}

fn map_config_error(err: ConfigError, path: &str) -> ConfigError {
    match err {
        ConfigError::NotFound(_) => ConfigError::NotFound(path.to_string()),
        other => other,
    }
}
