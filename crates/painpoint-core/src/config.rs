use crate::error::{PainPointError, Result};
use crate::paths;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

// ---------------------------------------------------------------------------
// ConfigWarning / WarnLevel
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigWarning {
    pub level: WarnLevel,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarnLevel {
    Warning,
    Error,
}

// ---------------------------------------------------------------------------
// ContentConfig
// ---------------------------------------------------------------------------

/// Where pain-point files live on the content host.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentConfig {
    #[serde(default = "default_api_base")]
    pub api_base: String,
    #[serde(default)]
    pub owner: String,
    #[serde(default)]
    pub repo: String,
    /// Branch to read from and commit to. Host default branch when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branch: Option<String>,
    /// Directory inside the repository that holds one folder per pain point.
    #[serde(default = "default_root")]
    pub root: String,
    /// Name of the environment variable carrying the bearer token.
    #[serde(default = "default_token_env")]
    pub token_env: String,
}

fn default_api_base() -> String {
    "https://api.github.com".to_string()
}

fn default_root() -> String {
    "pain-points".to_string()
}

fn default_token_env() -> String {
    "GITHUB_TOKEN".to_string()
}

impl Default for ContentConfig {
    fn default() -> Self {
        Self {
            api_base: default_api_base(),
            owner: String::new(),
            repo: String::new(),
            branch: None,
            root: default_root(),
            token_env: default_token_env(),
        }
    }
}

impl ContentConfig {
    /// Read the bearer token from the configured environment variable.
    pub fn token(&self) -> Option<String> {
        std::env::var(&self.token_env)
            .ok()
            .filter(|t| !t.trim().is_empty())
    }
}

// ---------------------------------------------------------------------------
// ServerConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_port() -> u16 {
    3150
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
        }
    }
}

// ---------------------------------------------------------------------------
// Config (top-level)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_version")]
    pub version: u32,
    #[serde(default)]
    pub content: ContentConfig,
    /// Seconds an aggregated view stays cached per slug. 0 disables caching.
    #[serde(default = "default_cache_ttl")]
    pub cache_ttl_secs: u64,
    #[serde(default)]
    pub server: ServerConfig,
}

fn default_version() -> u32 {
    1
}

fn default_cache_ttl() -> u64 {
    60
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: default_version(),
            content: ContentConfig::default(),
            cache_ttl_secs: default_cache_ttl(),
            server: ServerConfig::default(),
        }
    }
}

impl Config {
    pub fn new(owner: impl Into<String>, repo: impl Into<String>) -> Self {
        Self {
            content: ContentConfig {
                owner: owner.into(),
                repo: repo.into(),
                ..ContentConfig::default()
            },
            ..Self::default()
        }
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    pub fn load(root: &Path) -> Result<Self> {
        let path = paths::config_path(root);
        if !path.exists() {
            return Err(PainPointError::NotInitialized);
        }
        let data = std::fs::read_to_string(&path)?;
        let cfg: Config = serde_yaml::from_str(&data)?;
        Ok(cfg)
    }

    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    pub fn save(&self, root: &Path) -> Result<()> {
        let path = paths::config_path(root);
        crate::io::atomic_write(&path, self.to_yaml()?.as_bytes())
    }

    // -----------------------------------------------------------------------
    // Validation
    // -----------------------------------------------------------------------

    pub fn validate(&self) -> Vec<ConfigWarning> {
        let mut warnings = Vec::new();
        let content = &self.content;

        if content.owner.trim().is_empty() || content.repo.trim().is_empty() {
            warnings.push(ConfigWarning {
                level: WarnLevel::Error,
                message: "content.owner and content.repo must both be set".to_string(),
            });
        }

        if !content.api_base.starts_with("http://") && !content.api_base.starts_with("https://")
        {
            warnings.push(ConfigWarning {
                level: WarnLevel::Error,
                message: format!("content.api_base '{}' is not an http(s) URL", content.api_base),
            });
        }

        if content.root.trim_matches('/').is_empty() {
            warnings.push(ConfigWarning {
                level: WarnLevel::Warning,
                message: "content.root is empty; pain points are read from the repository root"
                    .to_string(),
            });
        }

        if content.token().is_none() {
            warnings.push(ConfigWarning {
                level: WarnLevel::Warning,
                message: format!(
                    "${} is not set: reads use anonymous rate limits and writes are disabled",
                    content.token_env
                ),
            });
        }

        warnings
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
