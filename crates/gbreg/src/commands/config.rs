//! gbreg.toml configuration file.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;

use gbreg_registry::{RegistryConfig, DEFAULT_REGISTRY_URL, DEFAULT_TTL_SECS};
use gbreg_render::{Format, REGISTRY_TITLE};

/// Configuration file structure (gbreg.toml).
#[derive(Debug, Deserialize, Default)]
pub struct ConfigFile {
    #[serde(default)]
    pub site: SiteSection,
    #[serde(default)]
    pub registry: RegistrySection,
    #[serde(default)]
    pub server: ServerSection,
    #[serde(default)]
    pub export: ExportSection,
}

#[derive(Debug, Deserialize)]
pub struct SiteSection {
    #[serde(default = "default_title")]
    pub title: String,
}

#[derive(Debug, Deserialize)]
pub struct RegistrySection {
    #[serde(default = "default_url")]
    pub url: String,
    /// Freshness window in seconds
    #[serde(default = "default_ttl")]
    pub ttl: u64,
}

#[derive(Debug, Deserialize)]
pub struct ServerSection {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

#[derive(Debug, Deserialize)]
pub struct ExportSection {
    #[serde(default = "default_output")]
    pub output: PathBuf,
    #[serde(default)]
    pub format: Format,
    #[serde(default = "default_minify")]
    pub minify: bool,
}

impl Default for SiteSection {
    fn default() -> Self {
        Self {
            title: default_title(),
        }
    }
}

impl Default for RegistrySection {
    fn default() -> Self {
        Self {
            url: default_url(),
            ttl: default_ttl(),
        }
    }
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Default for ExportSection {
    fn default() -> Self {
        Self {
            output: default_output(),
            format: Format::default(),
            minify: default_minify(),
        }
    }
}

fn default_title() -> String {
    REGISTRY_TITLE.to_string()
}
fn default_url() -> String {
    DEFAULT_REGISTRY_URL.to_string()
}
fn default_ttl() -> u64 {
    DEFAULT_TTL_SECS
}
fn default_host() -> String {
    "127.0.0.1".to_string()
}
fn default_port() -> u16 {
    3000
}
fn default_output() -> PathBuf {
    PathBuf::from("gbid_directory")
}
fn default_minify() -> bool {
    true
}

impl ConfigFile {
    /// Registry source from the file, before environment overrides.
    pub fn registry_config(&self) -> RegistryConfig {
        RegistryConfig {
            url: self.registry.url.clone(),
            ttl: Duration::from_secs(self.registry.ttl),
        }
    }
}

/// Load configuration from `path` if it exists.
/// Returns an error if the config file exists but is malformed.
pub fn load_config(path: &Path) -> Result<ConfigFile> {
    if !path.exists() {
        return Ok(ConfigFile::default());
    }

    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let config = parse_config(&content)
        .with_context(|| format!("Failed to parse {}", path.display()))?;

    tracing::info!("Loaded config from {}", path.display());
    Ok(config)
}

fn parse_config(content: &str) -> Result<ConfigFile> {
    Ok(toml::from_str(content)?)
}
