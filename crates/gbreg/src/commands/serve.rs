//! Live site command.

use std::path::Path;

use anyhow::{Context, Result};
use gbreg_server::{ServerConfig, SiteServer};

use super::config::load_config;

/// Run the serve command.
pub async fn run(
    config_path: &Path,
    host: Option<String>,
    port: Option<u16>,
    open: bool,
) -> Result<()> {
    let file_config = load_config(config_path)?;

    let registry = file_config
        .registry_config()
        .overlay_env()
        .context("Invalid registry settings in the environment")?;

    let config = ServerConfig {
        host: host.unwrap_or(file_config.server.host),
        port: port.unwrap_or(file_config.server.port),
        open,
        title: file_config.site.title,
        registry,
    };

    tracing::info!(
        "Cached copies stay fresh for {}s",
        config.registry.ttl.as_secs()
    );

    SiteServer::new(config).start().await?;

    Ok(())
}
