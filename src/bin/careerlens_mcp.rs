//! MCP server entrypoint (stdio transport).
//!
//! Launches an MCP server that exposes CareerLens tools and resources over stdio for agent
//! hosts. It shares all runtime configuration with the HTTP binary.
use anyhow::{Context, Result};
use careerlens::{config, logging, mcp::CareerLensMcpServer, service::CareerService};
use rmcp::{service::ServiceExt, transport::stdio};
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<()> {
    config::init_config();
    logging::init_tracing();

    let service = CareerService::new()
        .await
        .context("failed to initialise the career service")?;
    let server = CareerLensMcpServer::new(Arc::new(service));

    let service = server
        .serve(stdio())
        .await
        .context("failed to start MCP server over stdio")?;

    service
        .waiting()
        .await
        .context("MCP server terminated unexpectedly")?;

    Ok(())
}
