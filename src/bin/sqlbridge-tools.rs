//! MCP tool server binary: SQL toolset over stdio.
//!
//! Logs go to stderr; stdout carries the MCP framing.

use rmcp::transport::stdio;
use rmcp::ServiceExt;
use sqlx::postgres::PgPoolOptions;
use tracing::info;
use tracing_subscriber::EnvFilter;

use sqlbridge::config::DatabaseConfig;
use sqlbridge::executor::QueryExecutor;
use sqlbridge::tools::SqlToolServer;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = DatabaseConfig::from_env()?;
    info!(host = %config.host, database = %config.name, "connecting to PostgreSQL");

    // Lazy pool: the server starts even when the database is down and
    // reports errors per tool call instead.
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect_lazy_with(config.connect_options());

    let server = SqlToolServer::new(QueryExecutor::new(pool));

    info!("tool server ready on stdio");
    let service = server.serve(stdio()).await?;
    service.waiting().await?;

    Ok(())
}
