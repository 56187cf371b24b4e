//! Static export command.

use std::path::{Path, PathBuf};

use anyhow::Result;
use gbreg_render::Format;
use gbreg_static::{ExportConfig, Exporter};

use super::config::load_config;

/// Run the export command.
///
/// Reads the registry location from the config file only; `REGISTRY_URL`
/// applies to the live site.
pub async fn run(
    config_path: &Path,
    format: Option<Format>,
    output: Option<PathBuf>,
    minify: Option<bool>,
) -> Result<()> {
    let file_config = load_config(config_path)?;

    let config = ExportConfig {
        output_dir: output.unwrap_or(file_config.export.output.clone()),
        format: format.unwrap_or(file_config.export.format),
        title: file_config.site.title.clone(),
        minify: minify.unwrap_or(file_config.export.minify),
        registry: file_config.registry_config(),
    };

    tracing::info!("Exporting {} site...", config.format);

    let result = match Exporter::new(config).run().await {
        Ok(result) => result,
        Err(e) => {
            tracing::error!("Export failed: {}", e);
            return Err(e.into());
        }
    };

    tracing::info!(
        "Exported {} {} pages in {}ms",
        result.pages,
        result.format,
        result.duration_ms
    );

    tracing::info!("Output: {}", result.output_dir.display());

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::net::SocketAddr;

    use axum::{http::StatusCode, routing::get, Router};
    use tempfile::tempdir;

    async fn spawn_upstream(app: Router) -> SocketAddr {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        addr
    }

    #[tokio::test]
    async fn failing_upstream_fails_the_export() {
        let addr = spawn_upstream(Router::new().route(
            "/registry.json",
            get(|| async { StatusCode::INTERNAL_SERVER_ERROR }),
        ))
        .await;

        let temp = tempdir().unwrap();
        let out = temp.path().join("out");
        let config_path = temp.path().join("gbreg.toml");
        fs::write(
            &config_path,
            format!(
                "[registry]\nurl = \"http://{}/registry.json\"\n\n[export]\noutput = {:?}\n",
                addr,
                out.display().to_string()
            ),
        )
        .unwrap();

        let result = run(&config_path, None, None, None).await;

        assert!(result.is_err());
        assert!(!out.exists());
    }

    #[tokio::test]
    async fn exports_from_configured_upstream() {
        let addr = spawn_upstream(Router::new().route(
            "/registry.json",
            get(|| async {
                r#"{"GB0001": [{"Gb_type": "unsupported operator", "Hints": ["rewrite"]}]}"#
            }),
        ))
        .await;

        let temp = tempdir().unwrap();
        let out = temp.path().join("out");
        let config_path = temp.path().join("gbreg.toml");
        fs::write(
            &config_path,
            format!("[registry]\nurl = \"http://{}/registry.json\"\n", addr),
        )
        .unwrap();

        run(&config_path, Some(Format::Html), Some(out.clone()), None)
            .await
            .unwrap();

        assert!(out.join("index.html").exists());
        assert!(out.join("gb").join("gb0001.html").exists());
    }
}
