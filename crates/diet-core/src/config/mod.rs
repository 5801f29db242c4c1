use crate::error::{DietError, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Prefix for environment overrides, e.g. `DIET__WEB__PORT=8080`.
pub const ENV_PREFIX: &str = "DIET";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DietConfig {
    #[serde(default)]
    pub web: WebConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub session: SessionConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebConfig {
    #[serde(default = "default_web_port")]
    pub port: u16,
    #[serde(default = "default_web_host")]
    pub host: String,
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            port: default_web_port(),
            host: default_web_host(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StorageConfig {
    /// SQLite database file. Defaults to `~/.config/daily-diet/diet.db`;
    /// `:memory:` keeps everything in memory.
    #[serde(default)]
    pub path: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    #[serde(default = "default_cookie_name")]
    pub cookie_name: String,
    #[serde(default = "default_max_age_days")]
    pub max_age_days: u32,
    /// Restrict get/update/delete by id to the session that owns the meal.
    /// Off by default: any holder of a meal id may act on it.
    #[serde(default)]
    pub enforce_ownership: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            cookie_name: default_cookie_name(),
            max_age_days: default_max_age_days(),
            enforce_ownership: false,
        }
    }
}

impl SessionConfig {
    pub fn max_age_secs(&self) -> u64 {
        u64::from(self.max_age_days) * 24 * 60 * 60
    }
}

fn default_web_port() -> u16 {
    3333
}

fn default_web_host() -> String {
    "127.0.0.1".to_string()
}

fn default_cookie_name() -> String {
    "sessionId".to_string()
}

fn default_max_age_days() -> u32 {
    7
}

impl DietConfig {
    /// Load configuration with layered merging:
    /// 1. Global: `~/.config/daily-diet/config.toml`
    /// 2. Explicit file (must exist when given)
    /// 3. Environment: `DIET__<SECTION>__<KEY>`
    pub fn load(path: Option<&Path>) -> Result<Self> {
        Self::load_with_env(
            path,
            Environment::with_prefix(ENV_PREFIX)
                .separator("__")
                .try_parsing(true),
        )
    }

    fn load_with_env(path: Option<&Path>, env: Environment) -> Result<Self> {
        let mut builder = Config::builder();

        // Layer 1: Global config
        if let Some(global_path) = global_config_path() {
            if global_path.exists() {
                builder = builder.add_source(File::from(global_path).required(false));
            }
        }

        // Layer 2: Explicit file
        if let Some(path) = path {
            builder = builder.add_source(File::from(path.to_path_buf()).required(true));
        }

        // Layer 3: Environment
        builder = builder.add_source(env);

        let config = builder
            .build()
            .map_err(|e| DietError::Config(e.to_string()))?;

        let mut cfg: Self = config
            .try_deserialize()
            .map_err(|e| DietError::Config(e.to_string()))?;

        cfg.validate();
        Ok(cfg)
    }

    /// Defaults only (no files, no environment).
    pub fn default_config() -> Self {
        Self::default()
    }

    /// Validate config values, replacing out-of-range values and logging warnings.
    /// Lenient: fixes values in place and warns instead of rejecting.
    pub fn validate(&mut self) -> Vec<String> {
        let mut warnings = Vec::new();

        if self.web.port == 0 {
            warnings.push(format!("web.port = 0, setting to {}", default_web_port()));
            self.web.port = default_web_port();
        }
        if self.web.host.trim().is_empty() {
            warnings.push(format!("web.host is empty, setting to {}", default_web_host()));
            self.web.host = default_web_host();
        }

        let cookie_name_ok = !self.session.cookie_name.is_empty()
            && self
                .session
                .cookie_name
                .bytes()
                .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'_' | b'-' | b'.'));
        if !cookie_name_ok {
            warnings.push(format!(
                "session.cookie_name '{}' is not a valid cookie name, setting to {}",
                self.session.cookie_name,
                default_cookie_name()
            ));
            self.session.cookie_name = default_cookie_name();
        }
        if self.session.max_age_days == 0 {
            warnings.push("session.max_age_days = 0, setting to 1".to_string());
            self.session.max_age_days = 1;
        }

        for w in &warnings {
            tracing::warn!("config: {}", w);
        }

        warnings
    }

    /// Render the effective configuration as TOML.
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self)
            .map_err(|e| DietError::Config(format!("failed to serialize config: {e}")))
    }
}

fn global_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("daily-diet").join("config.toml"))
}
