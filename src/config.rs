use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

use crate::error::{ReorgError, Result};
use crate::mailbox_name;
use crate::models::{CategoryMapping, FlattenRule, ProtectedFolders};
use crate::tables;

/// Upper bound for any politeness delay
const MAX_DELAY_MS: u64 = 10_000;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub account: AccountConfig,
    #[serde(default)]
    pub execution: ExecutionConfig,
    #[serde(default)]
    pub planning: PlanningConfig,
    #[serde(default = "tables::category_mappings")]
    pub categories: Vec<CategoryMapping>,
    #[serde(default = "tables::flatten_rules")]
    pub flatten: Vec<FlattenRule>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            account: AccountConfig::default(),
            execution: ExecutionConfig::default(),
            planning: PlanningConfig::default(),
            categories: tables::category_mappings(),
            flatten: tables::flatten_rules(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AccountConfig {
    /// Prompted for when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionConfig {
    #[serde(default = "default_rename_delay_ms")]
    pub rename_delay_ms: u64,
    #[serde(default = "default_merge_delay_ms")]
    pub merge_delay_ms: u64,
    #[serde(default = "default_delete_delay_ms")]
    pub delete_delay_ms: u64,
}

impl Default for ExecutionConfig {
    fn default() -> Self {
        Self {
            rename_delay_ms: default_rename_delay_ms(),
            merge_delay_ms: default_merge_delay_ms(),
            delete_delay_ms: default_delete_delay_ms(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanningConfig {
    /// Folder trees that are never renamed, merged or deleted
    #[serde(default = "tables::protected_folders")]
    pub protected_folders: Vec<String>,
    /// Labels removed by `prune`
    #[serde(default = "tables::stale_labels")]
    pub stale_labels: Vec<String>,
}

impl Default for PlanningConfig {
    fn default() -> Self {
        Self {
            protected_folders: tables::protected_folders(),
            stale_labels: tables::stale_labels(),
        }
    }
}

fn default_host() -> String {
    tables::DEFAULT_HOST.to_string()
}

fn default_port() -> u16 {
    tables::DEFAULT_PORT
}

fn default_timeout_secs() -> u64 {
    tables::DEFAULT_TIMEOUT_SECS
}

fn default_rename_delay_ms() -> u64 {
    tables::DEFAULT_RENAME_DELAY_MS
}

fn default_merge_delay_ms() -> u64 {
    tables::DEFAULT_MERGE_DELAY_MS
}

fn default_delete_delay_ms() -> u64 {
    tables::DEFAULT_DELETE_DELAY_MS
}

impl Config {
    pub async fn load(path: &Path) -> Result<Self> {
        // If file doesn't exist, return default config with warning
        if !path.exists() {
            tracing::warn!("Config file not found at {:?}, using built-in tables", path);
            return Ok(Self::default());
        }

        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| ReorgError::ConfigError(format!("Failed to read config file: {}", e)))?;

        let config: Self = toml::from_str(&content)
            .map_err(|e| ReorgError::ConfigError(format!("Failed to parse config file: {}", e)))?;

        config.validate()?;

        tracing::info!("Loaded configuration from {:?}", path);
        Ok(config)
    }

    pub async fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await.map_err(|e| {
                    ReorgError::ConfigError(format!("Failed to create config directory: {}", e))
                })?;
            }
        }

        let content = toml::to_string_pretty(self)
            .map_err(|e| ReorgError::ConfigError(format!("Failed to serialize config: {}", e)))?;

        tokio::fs::write(path, content)
            .await
            .map_err(|e| ReorgError::ConfigError(format!("Failed to write config file: {}", e)))?;

        tracing::info!("Saved configuration to {:?}", path);
        Ok(())
    }

    /// Write the built-in tables to `path`
    pub async fn create_example(path: &Path) -> Result<()> {
        let config = Self::default();
        config.save(path).await
    }

    pub fn protected(&self) -> ProtectedFolders {
        ProtectedFolders::new(self.planning.protected_folders.iter().cloned())
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        self.validate_server()?;
        self.validate_execution()?;
        self.validate_planning()?;
        self.validate_categories()?;
        self.validate_flatten()?;

        tracing::debug!("Configuration validation passed");
        Ok(())
    }

    fn validate_server(&self) -> Result<()> {
        if self.server.host.trim().is_empty() {
            return Err(ReorgError::ConfigError(
                "server.host cannot be empty".to_string(),
            ));
        }
        if self.server.port == 0 {
            return Err(ReorgError::ConfigError(
                "server.port must be greater than 0".to_string(),
            ));
        }
        if self.server.timeout_secs == 0 {
            return Err(ReorgError::ConfigError(
                "server.timeout_secs must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }

    fn validate_execution(&self) -> Result<()> {
        let delays = [
            ("rename_delay_ms", self.execution.rename_delay_ms),
            ("merge_delay_ms", self.execution.merge_delay_ms),
            ("delete_delay_ms", self.execution.delete_delay_ms),
        ];
        for (name, value) in delays {
            if value > MAX_DELAY_MS {
                return Err(ReorgError::ConfigError(format!(
                    "execution.{} cannot exceed {} ms",
                    name, MAX_DELAY_MS
                )));
            }
        }
        Ok(())
    }

    fn validate_planning(&self) -> Result<()> {
        for folder in &self.planning.protected_folders {
            check_path("planning.protected_folders", folder)?;
        }

        let protected = self.protected();
        for label in &self.planning.stale_labels {
            check_path("planning.stale_labels", label)?;
            if protected.is_protected(label) {
                return Err(ReorgError::ConfigError(format!(
                    "planning.stale_labels contains protected folder '{}'",
                    label
                )));
            }
        }
        Ok(())
    }

    fn validate_categories(&self) -> Result<()> {
        let protected = self.protected();
        let mut destinations = HashSet::new();
        let mut sources = HashSet::new();

        for mapping in &self.categories {
            check_path("categories.destination", &mapping.destination)?;
            if protected.is_protected(&mapping.destination) {
                return Err(ReorgError::ConfigError(format!(
                    "Destination '{}' is a protected folder",
                    mapping.destination
                )));
            }
            if !destinations.insert(mapping.destination.as_str()) {
                return Err(ReorgError::ConfigError(format!(
                    "Destination '{}' is listed more than once",
                    mapping.destination
                )));
            }
            if mapping.sources.is_empty() {
                return Err(ReorgError::ConfigError(format!(
                    "Destination '{}' has no sources",
                    mapping.destination
                )));
            }

            for source in &mapping.sources {
                check_path("categories.sources", source)?;
                if protected.is_protected(source) {
                    return Err(ReorgError::ConfigError(format!(
                        "Source '{}' is a protected folder",
                        source
                    )));
                }
                if !sources.insert(source.as_str()) {
                    return Err(ReorgError::ConfigError(format!(
                        "Source '{}' is listed more than once",
                        source
                    )));
                }
            }

            if let Some(primary) = &mapping.primary {
                if !mapping.sources.contains(primary) {
                    return Err(ReorgError::ConfigError(format!(
                        "Primary '{}' of '{}' is not one of its sources",
                        primary, mapping.destination
                    )));
                }
            }
        }

        // A source at or above a destination would be moved again on the next run
        for source in &sources {
            if let Some(dest) = destinations
                .iter()
                .find(|d| *d == source || mailbox_name::is_descendant_of(d, source))
            {
                return Err(ReorgError::ConfigError(format!(
                    "Source '{}' contains destination '{}'",
                    source, dest
                )));
            }
        }

        Ok(())
    }

    fn validate_flatten(&self) -> Result<()> {
        let protected = self.protected();

        for rule in &self.flatten {
            check_path("flatten.prefix", &rule.prefix)?;
            if !rule.target.is_empty() {
                check_path("flatten.target", &rule.target)?;
            }
            if protected.is_protected(&rule.prefix) {
                return Err(ReorgError::ConfigError(format!(
                    "Flatten prefix '{}' is a protected folder",
                    rule.prefix
                )));
            }
            if rule.target == rule.prefix
                || mailbox_name::is_descendant_of(&rule.target, &rule.prefix)
            {
                return Err(ReorgError::ConfigError(format!(
                    "Flatten target '{}' lies inside its prefix '{}'",
                    rule.target, rule.prefix
                )));
            }
            if let Some(mapping) = self.categories.iter().find(|m| {
                m.destination == rule.prefix
                    || mailbox_name::is_descendant_of(&m.destination, &rule.prefix)
            }) {
                return Err(ReorgError::ConfigError(format!(
                    "Flatten prefix '{}' would remove destination '{}'",
                    rule.prefix, mapping.destination
                )));
            }
        }
        Ok(())
    }
}

fn check_path(field: &str, name: &str) -> Result<()> {
    mailbox_name::validate_path(name)
        .map_err(|e| ReorgError::ConfigError(format!("{}: {}", field, e)))
}
