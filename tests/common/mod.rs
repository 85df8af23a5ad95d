//! Shared mocks for the integration tests: a scripted completion client
//! and a scripted MCP session.

use async_trait::async_trait;
use rmcp::model::Tool;
use serde_json::{Map, Value};
use sqlbridge::client::{ClientError, Completion};
use sqlbridge::mcp::{SessionConnector, SessionError, ToolSession};
use std::sync::{Arc, Mutex};

#[derive(Clone)]
pub struct MockClient {
    replies: Arc<Mutex<Vec<String>>>,
    pub prompts: Arc<Mutex<Vec<String>>>,
}

impl MockClient {
    pub fn new(replies: Vec<&str>) -> Self {
        Self {
            replies: Arc::new(Mutex::new(
                replies.into_iter().map(str::to_string).collect(),
            )),
            prompts: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

#[async_trait]
impl Completion for MockClient {
    async fn complete(&self, prompt: &str) -> Result<String, ClientError> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        let mut replies = self.replies.lock().unwrap();
        if replies.is_empty() {
            Err(ClientError::Provider("No more mock replies".to_string()))
        } else {
            Ok(replies.remove(0))
        }
    }
}

pub struct MockSession {
    tools: Vec<Tool>,
    call_result: Result<String, String>,
    pub calls: Arc<Mutex<Vec<(String, Map<String, Value>)>>>,
}

impl MockSession {
    pub fn new(tools: Vec<Tool>, call_result: Result<String, String>) -> Self {
        Self {
            tools,
            call_result,
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

#[async_trait]
impl ToolSession for MockSession {
    async fn list_tools(&self) -> Result<Vec<Tool>, SessionError> {
        Ok(self.tools.clone())
    }

    async fn call_tool(
        &self,
        name: String,
        args: Map<String, Value>,
    ) -> Result<String, SessionError> {
        self.calls.lock().unwrap().push((name, args));
        self.call_result
            .clone()
            .map_err(SessionError::Protocol)
    }
}

pub struct MockConnector {
    session: Mutex<Option<MockSession>>,
}

impl MockConnector {
    pub fn new(session: MockSession) -> Self {
        Self {
            session: Mutex::new(Some(session)),
        }
    }
}

#[async_trait]
impl SessionConnector for MockConnector {
    async fn connect(&self) -> Result<Box<dyn ToolSession>, SessionError> {
        match self.session.lock().unwrap().take() {
            Some(session) => Ok(Box::new(session)),
            None => Err(SessionError::Protocol(
                "mock connector exhausted".to_string(),
            )),
        }
    }
}

pub struct FailingConnector;

#[async_trait]
impl SessionConnector for FailingConnector {
    async fn connect(&self) -> Result<Box<dyn ToolSession>, SessionError> {
        Err(SessionError::Protocol("connection refused".to_string()))
    }
}

pub fn tool(name: &str, description: &str, schema: Value) -> Tool {
    let schema = schema
        .as_object()
        .cloned()
        .expect("schema must be an object");
    Tool::new(name.to_string(), description.to_string(), Arc::new(schema))
}

pub fn sql_tools() -> Vec<Tool> {
    vec![
        tool(
            "execute-sql",
            "Run a SQL query on the PostgreSQL database",
            serde_json::json!({
                "type": "object",
                "properties": {
                    "query": {"type": "string", "description": "The SQL query to execute"}
                }
            }),
        ),
        tool(
            "list-tables",
            "Get a list of all tables in the PostgreSQL database",
            serde_json::json!({"type": "object", "properties": {}}),
        ),
    ]
}
