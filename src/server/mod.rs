//! Development server
//!
//! Serves the output directory as a static host would, so redirect pages
//! behave locally the way they will once deployed.

use anyhow::{anyhow, Result};
use axum::Router;
use std::net::SocketAddr;
use std::path::Path;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::commands::generate;
use crate::Folio;

/// Router serving `public_dir`; directories resolve to their `index.html`
pub fn router(public_dir: &Path) -> Router {
    Router::new()
        .fallback_service(ServeDir::new(public_dir).append_index_html_on_directories(true))
        .layer(TraceLayer::new_for_http())
}

/// Start the development server
pub async fn start(folio: &Folio, ip: &str, port: u16, watch: bool, open: bool) -> Result<()> {
    let app = router(&folio.public_dir);

    let addr = bind_addr(ip, port)?;

    let url = format!("http://{}:{}", ip, port);
    println!("Server running at {}", url);
    if watch {
        println!("Watching for changes...");
    }
    println!("Press Ctrl+C to stop.");

    if open {
        if let Err(e) = open_browser(&url) {
            tracing::warn!("Failed to open browser: {}", e);
        }
    }

    if watch {
        let folio = folio.clone();
        // The watcher blocks on its event channel
        tokio::task::spawn_blocking(move || {
            let rebuilt = || tracing::info!("Regenerated successfully");
            if let Err(e) = generate::watch(&folio, rebuilt) {
                tracing::error!("File watcher error: {}", e);
            }
        });
    }

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// `localhost` binds the IPv4 loopback
fn bind_addr(ip: &str, port: u16) -> Result<SocketAddr> {
    let host = match ip {
        "localhost" => "127.0.0.1",
        other => other,
    };
    format!("{}:{}", host, port)
        .parse()
        .map_err(|e| anyhow!("Invalid address {}:{}: {}", ip, port, e))
}

/// Open a URL in the default browser
fn open_browser(url: &str) -> Result<()> {
    #[cfg(target_os = "macos")]
    {
        std::process::Command::new("open").arg(url).spawn()?;
    }

    #[cfg(target_os = "linux")]
    {
        std::process::Command::new("xdg-open").arg(url).spawn()?;
    }

    #[cfg(target_os = "windows")]
    {
        std::process::Command::new("cmd")
            .args(["/c", "start", url])
            .spawn()?;
    }

    Ok(())
}
