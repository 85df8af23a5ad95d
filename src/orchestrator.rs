//! Request lifecycle: session liveness, tool selection, execution,
//! narration.

use rmcp::model::Tool;
use serde_json::{Map, Value};
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::client::{ClientError, Completion};
use crate::decision::{self, ParsedDecision, ToolDecision};
use crate::mcp::SessionConnector;

/// Request-level errors surfaced to the HTTP layer.
#[derive(Debug, Error)]
pub enum BridgeError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("MCP transport error: {0}")]
    Transport(String),

    #[error(transparent)]
    Upstream(#[from] ClientError),
}

/// Drives one request through selection, execution and narration.
///
/// Owns the completion client and the MCP session. The session is lazily
/// (re-)established: a request that finds it absent or dead performs
/// exactly one reconnect attempt before failing.
pub struct Orchestrator<C: Completion> {
    client: C,
    connector: Box<dyn SessionConnector>,
    session: Mutex<Option<Box<dyn crate::mcp::ToolSession>>>,
}

impl<C: Completion> Orchestrator<C> {
    pub fn new(client: C, connector: Box<dyn SessionConnector>) -> Self {
        Self {
            client,
            connector,
            session: Mutex::new(None),
        }
    }

    /// Eagerly establish the MCP session. Callers may tolerate failure;
    /// requests re-establish the session on demand.
    pub async fn connect(&self) -> Result<(), BridgeError> {
        let session = self
            .connector
            .connect()
            .await
            .map_err(|e| BridgeError::Transport(e.to_string()))?;
        *self.session.lock().await = Some(session);
        Ok(())
    }

    /// Snapshot of the tools the server currently exposes.
    ///
    /// A failed listing on an existing session drops it and triggers the
    /// single reconnect within the same call.
    pub async fn tools(&self) -> Result<Vec<Tool>, BridgeError> {
        let mut guard = self.session.lock().await;

        if let Some(session) = guard.as_ref() {
            match session.list_tools().await {
                Ok(tools) => return Ok(tools),
                Err(e) => {
                    warn!("tool listing failed, dropping session: {e}");
                    *guard = None;
                }
            }
        }

        info!("establishing MCP session");
        let session = self
            .connector
            .connect()
            .await
            .map_err(|e| BridgeError::Transport(e.to_string()))?;
        let tools = session
            .list_tools()
            .await
            .map_err(|e| BridgeError::Transport(e.to_string()))?;
        *guard = Some(session);
        Ok(tools)
    }

    /// Answer one user request.
    pub async fn chat(&self, prompt: &str) -> Result<String, BridgeError> {
        let tools = self.tools().await?;

        if tools.is_empty() {
            debug!("no tools available, answering conversationally");
            return Ok(self.client.complete(prompt).await?);
        }

        let selection = decision::selection_prompt(prompt, &tools);
        let reply = self.client.complete(&selection).await?;
        debug!("decision reply: {reply}");

        match decision::parse_decision(&reply) {
            ParsedDecision::Decision(ToolDecision::Text { text }) => {
                info!("model answered directly");
                Ok(text)
            }
            ParsedDecision::Decision(ToolDecision::ToolUse { name, id, input }) => {
                if !tools.iter().any(|t| t.name == name) {
                    warn!(tool = %name, "selected tool not in snapshot, falling back");
                    return self.general_conversation(prompt, &tools).await;
                }
                self.execute_and_narrate(prompt, name, id, input).await
            }
            ParsedDecision::Unrecognized(raw) => {
                info!("decision not in expected format, using raw reply");
                Ok(raw)
            }
            ParsedDecision::Invalid => {
                info!("decision was not JSON, falling back to general conversation");
                self.general_conversation(prompt, &tools).await
            }
        }
    }

    async fn execute_and_narrate(
        &self,
        prompt: &str,
        name: String,
        id: Option<String>,
        input: Map<String, Value>,
    ) -> Result<String, BridgeError> {
        let invocation_id = id.unwrap_or_else(|| format!("tool-{}", Uuid::new_v4()));
        info!(tool = %name, id = %invocation_id, "executing selected tool");

        let result_text = self.call_tool_live(name.clone(), input.clone()).await?;
        debug!("tool result: {result_text}");

        let explanation =
            decision::explanation_prompt(prompt, &name, &invocation_id, &input, &result_text);
        Ok(self.client.complete(&explanation).await?)
    }

    /// Invoke a tool on the current session. A transport failure here is a
    /// request-level error; the dropped session reconnects on the next
    /// request.
    async fn call_tool_live(
        &self,
        name: String,
        args: Map<String, Value>,
    ) -> Result<String, BridgeError> {
        let mut guard = self.session.lock().await;
        let session = guard
            .as_ref()
            .ok_or_else(|| BridgeError::Transport("MCP session not available".to_string()))?;

        match session.call_tool(name, args).await {
            Ok(text) => Ok(text),
            Err(e) => {
                warn!("tool call failed, dropping session: {e}");
                *guard = None;
                Err(BridgeError::Transport(e.to_string()))
            }
        }
    }

    async fn general_conversation(
        &self,
        prompt: &str,
        tools: &[Tool],
    ) -> Result<String, BridgeError> {
        let context = decision::tools_context(tools);
        Ok(self.client.complete(&format!("{prompt}\n\n{context}")).await?)
    }
}
