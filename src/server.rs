//! MCP server initialization for stdio and SSE transports.
//!
//! Provides [`serve_stdio`] and [`serve_sse`] entry points that wire up the
//! catalog database, the session registry, the optimizer, and the MCP tool
//! handler into a running server.

use crate::tools::SchemaTools;
use anyhow::Result;
use rmcp::ServiceExt;
use std::sync::{Arc, Mutex};
use toolschema::catalog::SqliteStore;
use toolschema::config::ToolSchemaConfig;
use toolschema::db;
use toolschema::editor::ModalRegistry;
use toolschema::optimize::{self, Optimizer};

/// Shared setup: open DB, create the optimizer, start an empty session registry.
fn setup_shared_state(
    config: &ToolSchemaConfig,
) -> Result<(SqliteStore, Arc<Mutex<ModalRegistry>>, Arc<Optimizer>)> {
    let db_path = config.resolved_db_path();
    let conn = db::open_database(&db_path)?;
    tracing::info!(db = %db_path.display(), "database ready");

    let optimizer = Arc::new(optimize::create_optimizer(&config.optimizer)?);
    tracing::info!(provider = %config.optimizer.provider, "optimizer ready");

    Ok((
        SqliteStore::new(conn),
        Arc::new(Mutex::new(ModalRegistry::new())),
        optimizer,
    ))
}

/// Start the MCP server over the configured transport.
pub async fn serve(config: ToolSchemaConfig) -> Result<()> {
    match config.server.transport.as_str() {
        "stdio" => serve_stdio(config).await,
        "sse" | "http" => serve_sse(config).await,
        other => anyhow::bail!("unknown transport: {other}. Supported: stdio, sse"),
    }
}

/// Start the MCP server over stdio transport.
pub async fn serve_stdio(config: ToolSchemaConfig) -> Result<()> {
    tracing::info!("starting toolschema MCP server on stdio");

    let (store, sessions, optimizer) = setup_shared_state(&config)?;

    let tools = SchemaTools::new(store, sessions, optimizer);
    let transport = rmcp::transport::stdio();

    let server = tools.serve(transport).await?;
    tracing::info!("MCP server running, waiting for client");

    server.waiting().await?;
    tracing::info!("MCP server shut down");

    Ok(())
}

/// Start the MCP server over Streamable HTTP (SSE) transport.
///
/// All HTTP sessions share one session registry, so modal identifiers are
/// global to the server.
pub async fn serve_sse(config: ToolSchemaConfig) -> Result<()> {
    let host = config.server.host.clone();
    let port = config.server.port;
    let bind_addr = format!("{host}:{port}");

    tracing::info!(addr = %bind_addr, "starting toolschema MCP server on SSE/HTTP");

    let (store, sessions, optimizer) = setup_shared_state(&config)?;

    let service = rmcp::transport::streamable_http_server::StreamableHttpService::new(
        move || Ok(SchemaTools::new(store.clone(), sessions.clone(), optimizer.clone())),
        rmcp::transport::streamable_http_server::session::local::LocalSessionManager::default()
            .into(),
        Default::default(),
    );

    let router = axum::Router::new().nest_service("/mcp", service);

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!(addr = %bind_addr, "MCP server listening at http://{bind_addr}/mcp");

    axum::serve(listener, router)
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "failed to listen for ctrl-c");
            }
            tracing::info!("shutting down SSE server");
        })
        .await?;

    Ok(())
}
