//! Configuration management for figcache

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::cache::CacheTtl;
use crate::error::{ConfigError, Result};

/// Application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Figma access token
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,

    /// How the token is sent
    #[serde(default)]
    pub token_kind: TokenKind,

    /// Default Figma file key
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_key: Option<String>,

    /// Custom API host (for testing against a local server)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_host: Option<String>,

    /// Cache tuning
    #[serde(default)]
    pub cache: CacheSettings,
}

/// Kind of Figma token, which decides the auth header
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    /// Personal access token, sent as `X-Figma-Token`
    #[default]
    Personal,
    /// OAuth token, sent as `Authorization: Bearer`
    Oauth,
}

/// Cache settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheSettings {
    /// TTL for entries stored without a resource-specific TTL
    #[serde(default = "default_ttl_minutes")]
    pub default_ttl_minutes: u64,

    /// How often expired entries are swept
    #[serde(default = "default_sweep_interval_secs")]
    pub sweep_interval_secs: u64,

    /// Per-resource TTL overrides in minutes
    #[serde(default)]
    pub ttl: ResourceTtls,
}

/// Per-resource TTL overrides (minutes)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResourceTtls {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub screenshot: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub variables: Option<u64>,
}

fn default_ttl_minutes() -> u64 {
    CacheTtl::DEFAULT.as_secs() / 60
}

fn default_sweep_interval_secs() -> u64 {
    CacheTtl::SWEEP_INTERVAL.as_secs()
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            default_ttl_minutes: default_ttl_minutes(),
            sweep_interval_secs: default_sweep_interval_secs(),
            ttl: ResourceTtls::default(),
        }
    }
}

/// Minutes to a `Duration`, saturating on absurdly large values
pub fn minutes(m: u64) -> Duration {
    Duration::from_secs(m.saturating_mul(60))
}

impl CacheSettings {
    pub fn default_ttl(&self) -> Duration {
        minutes(self.default_ttl_minutes)
    }

    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs)
    }
}

impl Config {
    /// Get the default config file path
    pub fn default_path() -> Result<PathBuf> {
        let home = dirs::home_dir().ok_or(ConfigError::Invalid(
            "Could not determine home directory".to_string(),
        ))?;

        Ok(home.join(".figcache").join("config.yaml"))
    }

    /// Resolve an explicit path or fall back to the default location
    pub fn resolve_path(path: Option<&str>) -> Result<PathBuf> {
        match path {
            Some(p) => Ok(PathBuf::from(p)),
            None => Self::default_path(),
        }
    }

    /// Load configuration, failing if the file does not exist
    pub fn load_at(path: Option<&str>) -> Result<Self> {
        let path = Self::resolve_path(path)?;
        if !path.exists() {
            return Err(ConfigError::NotFound.into());
        }

        let contents = std::fs::read_to_string(&path)?;
        let config: Config = serde_yaml::from_str(&contents).map_err(ConfigError::from)?;

        Ok(config)
    }

    /// Load configuration, using defaults when the file does not exist.
    ///
    /// Token and file key can come entirely from flags or the environment,
    /// so a missing file is not an error here.
    pub fn load_or_default_at(path: Option<&str>) -> Result<Self> {
        match Self::load_at(path) {
            Err(crate::error::Error::Config(ConfigError::NotFound)) => {
                log::debug!("No config file found, using defaults");
                Ok(Self::default())
            }
            other => other,
        }
    }

    /// Save configuration to an explicit path or the default location
    pub fn save_at(&self, path: Option<&str>) -> Result<()> {
        let path = Self::resolve_path(path)?;

        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents =
            serde_yaml::to_string(self).map_err(|e| ConfigError::SaveError(e.to_string()))?;

        std::fs::write(&path, contents)?;

        // The file holds a token, keep it private
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mut perms = std::fs::metadata(&path)?.permissions();
            perms.set_mode(0o600);
            std::fs::set_permissions(&path, perms)?;
        }

        Ok(())
    }

    /// Get the token, or a configuration error if it is missing
    pub fn require_token(&self) -> Result<&str> {
        self.token
            .as_deref()
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| ConfigError::MissingToken.into())
    }

    /// Get the file key, or a configuration error if it is missing
    pub fn require_file_key(&self) -> Result<&str> {
        self.file_key
            .as_deref()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| ConfigError::MissingFileKey.into())
    }

    /// Validate that everything needed to call the API is present
    pub fn validate(&self) -> Result<()> {
        self.require_token()?;
        self.require_file_key()?;
        if self.cache.sweep_interval_secs == 0 {
            return Err(
                ConfigError::Invalid("cache.sweep_interval_secs must be positive".into()).into(),
            );
        }
        Ok(())
    }
}
