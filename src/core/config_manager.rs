// src/core/config_manager.rs
//! Configuration loading: `config.yaml` sections plus environment overrides

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};

use crate::core::FsOps;

pub const DEV_JWT_SECRET: &str = "germany-jobs-development-secret";
const DEFAULT_PORT: u16 = 8000;

#[derive(Debug, Clone)]
pub struct ConfigManager {
    pub environment: EnvironmentConfig,
    pub auth: AuthSettings,
    pub email: Option<EmailSettings>,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EnvironmentConfig {
    pub database_path: PathBuf,
    pub storage_path: PathBuf,
    #[serde(default)]
    pub log_file: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AuthSettings {
    pub jwt_secret: String,
    pub session_ttl_hours: i64,
    pub reset_token_ttl_minutes: i64,
    pub profile_wait_attempts: u32,
    pub profile_wait_interval_ms: u64,
}

impl Default for AuthSettings {
    fn default() -> Self {
        Self {
            jwt_secret: DEV_JWT_SECRET.to_string(),
            session_ttl_hours: 24 * 7,
            reset_token_ttl_minutes: 60,
            profile_wait_attempts: 5,
            profile_wait_interval_ms: 1000,
        }
    }
}

impl AuthSettings {
    pub fn profile_wait_interval(&self) -> Duration {
        Duration::from_millis(self.profile_wait_interval_ms)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct EmailSettings {
    #[serde(default = "default_email_service_url")]
    pub service_url: String,
    pub service_id: String,
    pub template_id: String,
    #[serde(default)]
    pub reset_template_id: Option<String>,
    pub public_key: String,
    #[serde(default = "default_email_timeout")]
    pub timeout_seconds: u64,
}

fn default_email_service_url() -> String {
    "https://api.emailjs.com/api/v1.0/email/send".to_string()
}

fn default_email_timeout() -> u64 {
    30
}

#[derive(Debug, Clone, Deserialize)]
struct SectionConfig {
    #[serde(flatten)]
    environment: EnvironmentConfig,
    #[serde(default)]
    auth: AuthSettings,
    #[serde(default)]
    email: Option<EmailSettings>,
    #[serde(default)]
    port: Option<u16>,
}

#[derive(Debug, Deserialize)]
struct ConfigFile {
    local: SectionConfig,
    production: SectionConfig,
}

impl ConfigManager {
    /// Load configuration for the current environment.
    pub fn load() -> Result<Self> {
        let environment = Self::environment_name();
        info!("Loading configuration for environment: {}", environment);

        let config_path = PathBuf::from("config.yaml");
        let section = if config_path.exists() {
            let content =
                std::fs::read_to_string(&config_path).context("Failed to read config.yaml")?;
            Self::section_from_yaml(&content, &environment)?
        } else {
            if environment == "production" {
                anyhow::bail!("config.yaml not found; production cannot start without it");
            }
            warn!("config.yaml not found, using local defaults");
            Self::local_defaults()
        };

        let mut config = Self::from_section(section);
        config.apply_env_overrides(|key| std::env::var(key).ok())?;

        let base = std::env::current_dir().context("Failed to get current directory")?;
        config.resolve_paths(&base);

        if environment == "production" && config.auth.jwt_secret == DEV_JWT_SECRET {
            anyhow::bail!("JWT_SECRET must be set in production");
        }

        Ok(config)
    }

    pub fn environment_name() -> String {
        std::env::var("JOBS_ENV")
            .or_else(|_| std::env::var("ENVIRONMENT"))
            .unwrap_or_else(|_| "local".to_string())
    }

    fn section_from_yaml(content: &str, environment: &str) -> Result<SectionConfig> {
        let file: ConfigFile =
            serde_yaml::from_str(content).context("Failed to parse config.yaml")?;
        Ok(match environment {
            "production" => file.production,
            _ => file.local,
        })
    }

    fn local_defaults() -> SectionConfig {
        SectionConfig {
            environment: EnvironmentConfig {
                database_path: PathBuf::from("data/germany_jobs.db"),
                storage_path: PathBuf::from("data/storage"),
                log_file: None,
            },
            auth: AuthSettings::default(),
            email: None,
            port: None,
        }
    }

    fn from_section(section: SectionConfig) -> Self {
        Self {
            environment: section.environment,
            auth: section.auth,
            email: section.email,
            port: section.port.unwrap_or(DEFAULT_PORT),
        }
    }

    fn apply_env_overrides<F>(&mut self, var: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(path) = var("DATABASE_PATH") {
            self.environment.database_path = PathBuf::from(path);
        }
        if let Some(path) = var("STORAGE_PATH") {
            self.environment.storage_path = PathBuf::from(path);
        }
        if let Some(path) = var("LOG_FILE") {
            self.environment.log_file = Some(PathBuf::from(path));
        }
        if let Some(port) = var("ROCKET_PORT") {
            self.port = port
                .parse::<u16>()
                .map_err(|_| anyhow::anyhow!("ROCKET_PORT must be a valid port number"))?;
        }
        if let Some(secret) = var("JWT_SECRET") {
            self.auth.jwt_secret = secret;
        }

        if let (Some(service_id), Some(template_id), Some(public_key)) = (
            var("EMAILJS_SERVICE_ID"),
            var("EMAILJS_TEMPLATE_ID"),
            var("EMAILJS_PUBLIC_KEY"),
        ) {
            let previous = self.email.take();
            self.email = Some(EmailSettings {
                service_url: var("EMAILJS_SERVICE_URL").unwrap_or_else(default_email_service_url),
                service_id,
                template_id,
                reset_template_id: previous.as_ref().and_then(|e| e.reset_template_id.clone()),
                public_key,
                timeout_seconds: previous
                    .map(|e| e.timeout_seconds)
                    .unwrap_or_else(default_email_timeout),
            });
        } else if let (Some(email), Some(url)) = (self.email.as_mut(), var("EMAILJS_SERVICE_URL"))
        {
            email.service_url = url;
        }

        Ok(())
    }

    fn resolve_paths(&mut self, base: &Path) {
        let env = &mut self.environment;
        env.database_path = FsOps::normalize_path(base, &env.database_path);
        env.storage_path = FsOps::normalize_path(base, &env.storage_path);
        if let Some(log_file) = env.log_file.take() {
            env.log_file = Some(FsOps::normalize_path(base, &log_file));
        }
    }

    pub async fn ensure_directories(&self) -> Result<()> {
        FsOps::ensure_dir_exists(&self.environment.storage_path).await?;
        if let Some(db_parent) = self.environment.database_path.parent() {
            FsOps::ensure_dir_exists(db_parent).await?;
        }
        Ok(())
    }
}
