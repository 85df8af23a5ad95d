//! MCP client session over a child-process transport.
//!
//! The bridge owns a single session to the tool server. The session is a
//! trait object so request-lifecycle logic can be exercised against mocks.

use async_trait::async_trait;
use rmcp::model::{CallToolRequestParam, CallToolResult, RawContent, Tool};
use rmcp::service::{RoleClient, RunningService};
use rmcp::transport::TokioChildProcess;
use rmcp::{ClientHandler, ServiceExt};
use serde_json::{Map, Value};
use std::ops::Deref;
use std::path::PathBuf;
use thiserror::Error;
use tokio::process::Command;
use tracing::info;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("failed to spawn tool server: {0}")]
    Spawn(#[from] std::io::Error),

    #[error("MCP error: {0}")]
    Protocol(String),
}

/// A live MCP session to the tool server.
#[async_trait]
pub trait ToolSession: Send + Sync {
    /// List the tools the server currently exposes.
    async fn list_tools(&self) -> Result<Vec<Tool>, SessionError>;

    /// Invoke a tool and return the text of its first text content block,
    /// or an empty string when the result carries none.
    async fn call_tool(&self, name: String, args: Map<String, Value>)
        -> Result<String, SessionError>;
}

#[async_trait]
impl<S: ClientHandler> ToolSession for RunningService<RoleClient, S> {
    async fn list_tools(&self) -> Result<Vec<Tool>, SessionError> {
        let result = self
            .deref()
            .list_tools(None)
            .await
            .map_err(|e| SessionError::Protocol(e.to_string()))?;
        Ok(result.tools)
    }

    async fn call_tool(
        &self,
        name: String,
        args: Map<String, Value>,
    ) -> Result<String, SessionError> {
        let params = CallToolRequestParam {
            name: name.into(),
            arguments: Some(args),
        };

        let result = self
            .deref()
            .call_tool(params)
            .await
            .map_err(|e| SessionError::Protocol(e.to_string()))?;

        Ok(first_text_block(result))
    }
}

fn first_text_block(result: CallToolResult) -> String {
    result
        .content
        .into_iter()
        .find_map(|content| match content.raw {
            RawContent::Text(text_content) => Some(text_content.text),
            _ => None,
        })
        .unwrap_or_default()
}

/// Establishes fresh sessions; the orchestrator calls this lazily and on
/// reconnect.
#[async_trait]
pub trait SessionConnector: Send + Sync {
    async fn connect(&self) -> Result<Box<dyn ToolSession>, SessionError>;
}

/// Spawns the tool server binary as a child process and speaks MCP over
/// its stdio.
pub struct ChildProcessConnector {
    server_bin: PathBuf,
}

impl ChildProcessConnector {
    pub fn new(server_bin: PathBuf) -> Self {
        Self { server_bin }
    }
}

#[async_trait]
impl SessionConnector for ChildProcessConnector {
    async fn connect(&self) -> Result<Box<dyn ToolSession>, SessionError> {
        info!(server = %self.server_bin.display(), "spawning tool server");

        let transport = TokioChildProcess::new(Command::new(&self.server_bin))?;
        let service = ()
            .serve(transport)
            .await
            .map_err(|e| SessionError::Protocol(e.to_string()))?;

        info!("MCP session established");
        Ok(Box::new(service))
    }
}
