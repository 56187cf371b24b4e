//! Write a default configuration file.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

/// Run the init command.
pub async fn run(config_path: &Path, yes: bool) -> Result<()> {
    if config_path.exists() && !yes {
        tracing::warn!(
            "{} already exists. Use --yes to overwrite.",
            config_path.display()
        );
        return Ok(());
    }

    if let Some(parent) = config_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }

    fs::write(config_path, DEFAULT_CONFIG)
        .with_context(|| format!("Failed to write {}", config_path.display()))?;

    tracing::info!("Created {}", config_path.display());
    tracing::info!("Run 'gbreg serve' to start the live site.");

    Ok(())
}

pub(crate) const DEFAULT_CONFIG: &str = r#"# gbreg configuration

[site]
# Site title
title = "Graph-Break Registry"

[registry]
# Registry document (REGISTRY_URL overrides this for `gbreg serve`)
url = "https://raw.githubusercontent.com/pytorch/pytorch/main/torch/_dynamo/graph_break_registry.json"

# Seconds a cached copy stays fresh (REVALIDATE_SEC overrides this for `gbreg serve`)
ttl = 300

[server]
host = "127.0.0.1"
port = 3000

[export]
# Output directory for `gbreg export`
output = "gbid_directory"

# "markdown" (Jekyll-ready) or "html"
format = "markdown"

# Minify the exported stylesheet
minify = true
"#;
