//! Tenant configuration.
//!
//! Stored as JSON (`{"tenanthost": .., "apitoken": .., "cacheupdate": ..}`) and
//! passed explicitly to the API client; nothing reads it from global state.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::CliError;

pub const DEFAULT_TENANT_HOST: &str = "smpljson";
pub const DEFAULT_API_TOKEN: &str = "smpltoken";

/// When a cached response may be served instead of calling the API.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CachePolicy {
    /// `-1`: always serve from cache when a cached file exists.
    CacheOnly,
    /// `0`: always call the API.
    AlwaysRefresh,
    /// `N`: serve from cache while the file is younger than `N` seconds.
    MaxAgeSecs(u64),
}

impl CachePolicy {
    pub fn from_setting(value: i64) -> Self {
        match value {
            v if v < 0 => CachePolicy::CacheOnly,
            0 => CachePolicy::AlwaysRefresh,
            v => CachePolicy::MaxAgeSecs(v as u64),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    pub tenanthost: String,
    pub apitoken: String,
    #[serde(default = "default_cache_update")]
    pub cacheupdate: i64,
}

fn default_cache_update() -> i64 {
    -1
}

impl Default for Config {
    fn default() -> Self {
        Self {
            tenanthost: DEFAULT_TENANT_HOST.to_string(),
            apitoken: DEFAULT_API_TOKEN.to_string(),
            cacheupdate: default_cache_update(),
        }
    }
}

impl Config {
    /// Load from `path`, falling back to defaults when the file does not exist.
    pub fn load(path: &Path) -> Result<Self, CliError> {
        if !path.exists() {
            debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }
        let text = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }

    pub fn save(&self, path: &Path) -> Result<(), CliError> {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)?;
        }
        fs::write(path, serde_json::to_string(self)?)?;
        Ok(())
    }

    pub fn cache_policy(&self) -> CachePolicy {
        CachePolicy::from_setting(self.cacheupdate)
    }

    /// Set one option by its configuration name.
    pub fn set(&mut self, name: &str, value: &str) -> Result<(), CliError> {
        match name {
            "apitoken" => self.apitoken = value.to_string(),
            "tenanthost" => self.tenanthost = value.to_string(),
            "cacheupdate" => {
                self.cacheupdate = value
                    .trim()
                    .parse()
                    .map_err(|_| CliError::InvalidCacheUpdate(value.to_string()))?;
            }
            other => return Err(CliError::UnknownConfigOption(other.to_string())),
        }
        Ok(())
    }

    /// Per-command credentials that bypass the stored configuration.
    pub fn with_overrides(mut self, tenanthost: Option<&str>, apitoken: Option<&str>) -> Self {
        if let Some(host) = tenanthost {
            self.tenanthost = host.to_string();
        }
        if let Some(token) = apitoken {
            self.apitoken = token.to_string();
        }
        self
    }
}
