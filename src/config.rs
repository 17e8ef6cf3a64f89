use crate::application::engine::EngineConfig;
use crate::error::{GatewayError, Result};
use config::{Config, Environment, File};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

pub const ENV_PREFIX: &str = "BATCHGATE";

pub const DEF_PORT: u16 = 9000;
pub const DEF_TIMEOUT_SECS: u64 = 15;
pub const DEF_EXEC_TIMEOUT_SECS: u64 = 15;
pub const DEF_EXEC_BATCH_SIZE: u64 = 10;
pub const DEF_EXEC_SAMPLE_INTERVAL_MS: u64 = 100;
pub const DEF_EXEC_SERVER_URL: &str = "http://localhost:9081";
pub const DEF_AUTH_USER: &str = "admin";
pub const DEF_AUTH_PASSWORD: &str = "password";
pub const DEF_LOG_LEVEL: &str = "info";

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct Settings {
    pub port: u16,
    /// Client-facing request timeout.
    pub timeout_secs: u64,
    pub exec: ExecSettings,
    pub auth: AuthSettings,
    pub log: LogSettings,
}

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct ExecSettings {
    /// Backend call timeout.
    pub timeout_secs: u64,
    pub batch_size: usize,
    /// Only read when `flush_partial_batches` is on.
    pub sample_interval_ms: u64,
    pub flush_partial_batches: bool,
    pub server_url: String,
}

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct AuthSettings {
    pub user: String,
    pub password: String,
}

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct LogSettings {
    pub level: String,
    pub json: bool,
}

impl Settings {
    /// Loads defaults, then the optional file, then `BATCHGATE_*` variables.
    ///
    /// A file that is named but missing or malformed is an error.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder = Config::builder()
            .set_default("port", i64::from(DEF_PORT))?
            .set_default("timeout_secs", DEF_TIMEOUT_SECS)?
            .set_default("exec.timeout_secs", DEF_EXEC_TIMEOUT_SECS)?
            .set_default("exec.batch_size", DEF_EXEC_BATCH_SIZE)?
            .set_default("exec.sample_interval_ms", DEF_EXEC_SAMPLE_INTERVAL_MS)?
            .set_default("exec.flush_partial_batches", false)?
            .set_default("exec.server_url", DEF_EXEC_SERVER_URL)?
            .set_default("auth.user", DEF_AUTH_USER)?
            .set_default("auth.password", DEF_AUTH_PASSWORD)?
            .set_default("log.level", DEF_LOG_LEVEL)?
            .set_default("log.json", false)?;

        if let Some(path) = path {
            builder = builder.add_source(File::from(path).required(true));
        }
        builder = builder.add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let settings: Settings = builder.build()?.try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> Result<()> {
        if self.exec.batch_size == 0 {
            return Err(GatewayError::InvalidConfig(
                "exec.batch_size must be at least 1".to_string(),
            ));
        }
        if self.exec.flush_partial_batches && self.exec.sample_interval_ms == 0 {
            return Err(GatewayError::InvalidConfig(
                "exec.sample_interval_ms must be positive when partial flushing is on".to_string(),
            ));
        }
        if self.auth.user.is_empty() {
            return Err(GatewayError::InvalidConfig(
                "auth.user must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn backend_timeout(&self) -> Duration {
        Duration::from_secs(self.exec.timeout_secs)
    }

    pub fn engine_config(&self) -> EngineConfig {
        let config = EngineConfig::new(self.exec.batch_size);
        if self.exec.flush_partial_batches {
            config.with_partial_flush(Duration::from_millis(self.exec.sample_interval_ms))
        } else {
            config
        }
    }
}
