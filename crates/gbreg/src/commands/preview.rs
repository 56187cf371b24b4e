//! Preview server command.

use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::{Context, Result};
use axum::Router;
use tower_http::services::ServeDir;

/// Run the preview command.
pub async fn run(port: u16, dir: PathBuf) -> Result<()> {
    if !dir.exists() {
        anyhow::bail!(
            "Directory not found: {}. Run 'gbreg export --format html' first.",
            dir.display()
        );
    }

    if !dir.join("index.html").exists() {
        tracing::warn!(
            "No index.html in {}; markdown exports need a Jekyll host to render",
            dir.display()
        );
    }

    let addr: SocketAddr = format!("127.0.0.1:{}", port)
        .parse()
        .context("Invalid address")?;

    tracing::info!("Serving {} at http://{}", dir.display(), addr);

    let app = Router::new().fallback_service(ServeDir::new(&dir));

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    // Open browser
    let url = format!("http://{}/index.html", addr);
    let _ = open::that(&url);

    axum::serve(listener, app).await?;

    Ok(())
}
