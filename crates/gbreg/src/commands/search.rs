//! Registry search command.

use std::path::Path;

use anyhow::{Context, Result};
use gbreg_registry::{RegistryClient, SearchHit, SearchIndex};

use super::config::load_config;

/// Run the search command.
pub async fn run(config_path: &Path, query: &str, limit: usize) -> Result<()> {
    let file_config = load_config(config_path)?;

    let registry_config = file_config
        .registry_config()
        .overlay_env()
        .context("Invalid registry settings in the environment")?;

    let registry = RegistryClient::new(registry_config)?.fetch().await?;
    let hits = SearchIndex::build(&registry).search(query);

    if hits.is_empty() {
        tracing::info!("No graph breaks match {:?}", query);
        return Ok(());
    }

    for hit in hits.iter().take(limit) {
        println!("{}", format_hit(hit));
    }

    if hits.len() > limit {
        tracing::info!("{} more matches not shown", hits.len() - limit);
    }

    Ok(())
}

fn format_hit(hit: &SearchHit) -> String {
    format!(
        "{:<8} {:.2}  {}",
        hit.record.id, hit.score, hit.record.entry.gb_type
    )
}
