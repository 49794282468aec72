//! HTTP server startup and shutdown.
//!
//! [`serve`] wires the database and config into the axum router and runs
//! until ctrl-c.

use crate::api::{self, AppState};
use crate::config::SojournConfig;
use crate::db;
use anyhow::Result;
use std::sync::{Arc, Mutex};

/// Open the database, build the router, and serve until interrupted.
pub async fn serve(config: SojournConfig) -> Result<()> {
    let db_path = config.resolved_db_path();
    let conn = db::open_database(&db_path)?;
    tracing::info!(db = %db_path.display(), "database ready");

    if config.server.auth_key.is_empty() {
        tracing::warn!("no auth key configured — write endpoints accept an empty key");
    }

    let bind_addr = format!("{}:{}", config.server.host, config.server.port);

    let state = AppState {
        db: Arc::new(Mutex::new(conn)),
        config: Arc::new(config),
    };
    let router = api::router(state);

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!(addr = %bind_addr, "listening at http://{bind_addr}");

    axum::serve(listener, router)
        .with_graceful_shutdown(async {
            tokio::signal::ctrl_c()
                .await
                .expect("failed to listen for ctrl-c");
            tracing::info!("shutting down");
        })
        .await?;

    Ok(())
}
