use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::info;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvitationApiConfig {
    pub server_host: String,
    pub server_port: u16,
    pub data_dir: PathBuf,
    pub music_dir: PathBuf,
    pub tenant_cache_ttl_secs: u64,
    pub request_timeout_secs: u64,
    pub enable_cors: bool,
    pub log_level: String,
}

impl Default for InvitationApiConfig {
    fn default() -> Self {
        Self {
            server_host: "127.0.0.1".to_string(),
            server_port: 8190,
            data_dir: PathBuf::from("data/invitations"),
            music_dir: PathBuf::from("data/music"),
            tenant_cache_ttl_secs: 30,
            request_timeout_secs: 30,
            enable_cors: true,
            log_level: "info".to_string(),
        }
    }
}

impl InvitationApiConfig {
    pub fn from_env() -> Result<Self> {
        let mut cfg = Self::default();

        if let Ok(host) = env::var("INVITATION_HOST") {
            if !host.trim().is_empty() {
                cfg.server_host = host;
            }
        }
        if let Ok(port) = env::var("INVITATION_PORT") {
            cfg.server_port = port
                .parse()
                .context("INVITATION_PORT must be a valid u16")?;
        }
        if let Ok(dir) = env::var("INVITATION_DATA_DIR") {
            if !dir.trim().is_empty() {
                cfg.data_dir = PathBuf::from(dir);
            }
        }
        if let Ok(dir) = env::var("MUSIC_DIR") {
            if !dir.trim().is_empty() {
                cfg.music_dir = PathBuf::from(dir);
            }
        }
        if let Ok(ttl) = env::var("TENANT_CACHE_TTL_SECS") {
            cfg.tenant_cache_ttl_secs = ttl
                .parse()
                .context("TENANT_CACHE_TTL_SECS must be a non-negative integer")?;
        }
        if let Ok(timeout) = env::var("REQUEST_TIMEOUT_SECS") {
            cfg.request_timeout_secs = timeout
                .parse()
                .context("REQUEST_TIMEOUT_SECS must be a positive integer")?;
        }
        if let Ok(flag) = env::var("ENABLE_CORS") {
            cfg.enable_cors =
                parse_bool(&flag).with_context(|| format!("ENABLE_CORS is invalid: {flag}"))?;
        }
        if let Ok(level) = env::var("LOG_LEVEL") {
            if !level.trim().is_empty() {
                cfg.log_level = level;
            }
        }

        cfg.validate()?;

        info!(
            data_dir = %cfg.data_dir.display(),
            music_dir = %cfg.music_dir.display(),
            "invitation-api directories resolved"
        );

        Ok(cfg)
    }

    pub fn validate(&self) -> Result<()> {
        ensure_directory(&self.data_dir)?;

        if self.music_dir.exists() && !self.music_dir.is_dir() {
            anyhow::bail!("{} exists but is not a directory", self.music_dir.display());
        }
        if self.request_timeout_secs == 0 {
            anyhow::bail!("REQUEST_TIMEOUT_SECS must be greater than zero");
        }
        Ok(())
    }

    /// `None` when the lookup cache is disabled.
    pub fn tenant_cache_ttl(&self) -> Option<Duration> {
        (self.tenant_cache_ttl_secs > 0).then(|| Duration::from_secs(self.tenant_cache_ttl_secs))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }
}

fn ensure_directory(path: &Path) -> Result<()> {
    if path.exists() {
        if !path.is_dir() {
            anyhow::bail!("{} exists but is not a directory", path.display());
        }
    } else {
        fs::create_dir_all(path)
            .with_context(|| format!("unable to create data directory {}", path.display()))?;
    }
    Ok(())
}

fn parse_bool(value: &str) -> Result<bool> {
    match value.to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "y" => Ok(true),
        "false" | "0" | "no" | "n" => Ok(false),
        _ => anyhow::bail!("invalid boolean value {value}"),
    }
}
