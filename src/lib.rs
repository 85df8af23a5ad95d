//! # sqlbridge - Gemini to MCP SQL bridge
//!
//! An HTTP bridge that lets Gemini answer questions about a PostgreSQL
//! database through an MCP tool server.
//!
//! ## Features
//! - Async-first, tokio compatible
//! - Trait-based completion client, mockable in tests
//! - MCP tool server over child-process stdio
//! - Single-turn tool selection with layered fallbacks
//!
//! ## Architecture
//!
//! The crate ships one library and two binaries:
//!
//! 1. **`sqlbridge`** serves `/chat`, `/health` and `/test-mcp` and drives
//!    requests through the [`orchestrator::Orchestrator`].
//! 2. **`sqlbridge-tools`** is the MCP server the bridge spawns; it exposes
//!    the SQL toolset backed by a PostgreSQL pool.
//!
//! ### Core Types
//!
//! - **[`client::Completion`]**: Trait for single-prompt completions.
//! - **[`gemini::GeminiClient`]**: Gemini-backed implementation.
//! - **[`orchestrator::Orchestrator`]**: Request lifecycle over an MCP session.
//! - **[`tools::SqlToolServer`]**: MCP handler for the SQL tools.
//!
//! ## Example
//! ```no_run
//! use sqlbridge::gemini::GeminiClient;
//! use sqlbridge::mcp::ChildProcessConnector;
//! use sqlbridge::options::{ModelOptions, TransportOptions};
//! use sqlbridge::orchestrator::Orchestrator;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = GeminiClient::new(
//!         "your-api-key".to_string(),
//!         ModelOptions::new("gemini-2.0-flash".to_string()),
//!         TransportOptions::new(),
//!     );
//!     let connector = ChildProcessConnector::new("sqlbridge-tools".into());
//!     let orchestrator = Orchestrator::new(client, Box::new(connector));
//!
//!     let answer = orchestrator.chat("how many tables are there?").await?;
//!     println!("{answer}");
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod client;
pub mod config;
pub mod decision;
pub mod executor;
pub mod gemini;
pub mod http;
pub mod mcp;
pub mod options;
pub mod orchestrator;
pub mod tools;

pub use client::{ClientError, Completion};
pub use gemini::GeminiClient;
pub use options::{ModelOptions, TransportOptions};
pub use orchestrator::{BridgeError, Orchestrator};

// Re-exported so binaries and tests use the same protocol types.
pub use rmcp;
