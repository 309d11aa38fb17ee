//! Configuration Management
//!
//! Handles persistent configuration storage for azure-discovery.

use crate::azure::auth::DEFAULT_AUTHORITY_HOST;
use crate::azure::client::DEFAULT_MANAGEMENT_ENDPOINT;
use crate::azure::defaults;
use crate::cache::DEFAULT_TTL;
use crate::engine::DEFAULT_MAX_PARALLEL;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

fn default_cache_ttl_secs() -> u64 {
    DEFAULT_TTL.as_secs()
}

fn default_max_parallel() -> usize {
    DEFAULT_MAX_PARALLEL
}

/// User configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Subscription to discover
    #[serde(default)]
    pub subscription_id: Option<String>,
    /// Resource groups to discover; empty means every group of the subscription
    #[serde(default)]
    pub resource_groups: Vec<String>,
    #[serde(default = "default_cache_ttl_secs")]
    pub cache_ttl_secs: u64,
    /// Scopes queried at once by a wildcard query
    #[serde(default = "default_max_parallel")]
    pub max_parallel: usize,
    /// ARM endpoint, for sovereign clouds
    #[serde(default)]
    pub management_endpoint: Option<String>,
    /// Entra ID endpoint, for sovereign clouds
    #[serde(default)]
    pub authority_host: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            subscription_id: None,
            resource_groups: Vec::new(),
            cache_ttl_secs: default_cache_ttl_secs(),
            max_parallel: default_max_parallel(),
            management_endpoint: None,
            authority_host: None,
        }
    }
}

impl Config {
    /// Get the config file path
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("azure-discovery").join("config.json"))
    }

    /// Load configuration from disk, falling back to defaults
    pub fn load() -> Self {
        let Some(path) = Self::config_path() else {
            return Self::default();
        };

        if !path.exists() {
            return Self::default();
        }

        match Self::load_from(&path) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!("Ignoring config file: {:#}", e);
                Self::default()
            }
        }
    }

    /// Load configuration from a specific file
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {:?}", path))?;
        serde_json::from_str(&content).with_context(|| format!("Invalid config in {:?}", path))
    }

    /// Save configuration to disk
    pub fn save(&self) -> Result<()> {
        let path = Self::config_path().context("No config directory on this system")?;
        self.save_to(&path)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        // Create parent directory
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {:?}", parent))?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content).with_context(|| format!("Failed to write {:?}", path))?;

        Ok(())
    }

    /// Replace the settings given on the command line; empty `resource_groups`
    /// keeps the configured ones
    pub fn update(
        &mut self,
        subscription_id: Option<&str>,
        resource_groups: &[String],
        cache_ttl_secs: Option<u64>,
    ) {
        if let Some(subscription_id) = subscription_id {
            self.subscription_id = Some(subscription_id.to_string());
        }
        if !resource_groups.is_empty() {
            self.resource_groups = resource_groups.to_vec();
        }
        if let Some(ttl) = cache_ttl_secs {
            self.cache_ttl_secs = ttl;
        }
    }

    /// Get effective subscription (config > environment > az profile)
    pub fn effective_subscription(&self) -> Option<String> {
        self.subscription_id
            .clone()
            .filter(|s| !s.is_empty())
            .or_else(defaults::get_default_subscription)
    }

    pub fn effective_management_endpoint(&self) -> &str {
        self.management_endpoint
            .as_deref()
            .unwrap_or(DEFAULT_MANAGEMENT_ENDPOINT)
    }

    pub fn effective_authority_host(&self) -> &str {
        self.authority_host.as_deref().unwrap_or(DEFAULT_AUTHORITY_HOST)
    }
}
