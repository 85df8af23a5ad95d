//! MCP tool server exposing the SQL toolset.
//!
//! Registers the three SQL tools plus the schema resource and the
//! `sql-assistant` prompt. Execution failures are always rendered into the
//! result text so the protocol boundary only ever carries protocol errors.

use itertools::Itertools;
use rmcp::handler::server::router::tool::ToolRouter;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::{
    AnnotateAble, ErrorData, GetPromptRequestParam, GetPromptResult, Implementation,
    ListPromptsResult, ListResourcesResult, PaginatedRequestParam, Prompt, PromptArgument,
    PromptMessage, PromptMessageRole, RawResource, ReadResourceRequestParam, ReadResourceResult,
    ResourceContents, ServerCapabilities, ServerInfo,
};
use rmcp::service::{RequestContext, RoleServer};
use rmcp::{schemars, tool, tool_handler, tool_router, ServerHandler};
use serde::Deserialize;
use tracing::info;

use crate::executor::{ColumnDescription, QueryExecutor, QueryOutput, SchemaColumn};

const SCHEMA_URI: &str = "postgres://schema";

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct ExecuteSqlArgs {
    #[schemars(description = "The SQL query to execute")]
    pub query: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct DescribeTableArgs {
    #[serde(rename = "tableName")]
    #[schemars(description = "Name of the table to describe")]
    pub table_name: String,
}

/// MCP server handler backed by a [`QueryExecutor`].
#[derive(Clone)]
pub struct SqlToolServer {
    executor: QueryExecutor,
    tool_router: ToolRouter<Self>,
}

#[tool_router]
impl SqlToolServer {
    pub fn new(executor: QueryExecutor) -> Self {
        Self {
            executor,
            tool_router: Self::tool_router(),
        }
    }

    #[tool(
        name = "execute-sql",
        description = "Run a SQL query on the PostgreSQL database"
    )]
    async fn execute_sql(
        &self,
        Parameters(ExecuteSqlArgs { query }): Parameters<ExecuteSqlArgs>,
    ) -> String {
        info!("execute-sql called");
        match self.executor.run(&query).await {
            Ok(output) => render_query_output(&output),
            Err(e) => format!("SQL Error: {e}"),
        }
    }

    #[tool(
        name = "list-tables",
        description = "Get a list of all tables in the PostgreSQL database"
    )]
    async fn list_tables(&self) -> String {
        info!("list-tables called");
        match self.executor.list_table_names().await {
            Ok(names) => render_table_list(&names),
            Err(e) => format!("Error listing tables: {e}"),
        }
    }

    #[tool(
        name = "describe-table",
        description = "Get column information for a specific table"
    )]
    async fn describe_table(
        &self,
        Parameters(DescribeTableArgs { table_name }): Parameters<DescribeTableArgs>,
    ) -> String {
        info!(table = %table_name, "describe-table called");
        match self.executor.describe_table(&table_name).await {
            Ok(columns) if columns.is_empty() => "Table not found.".to_string(),
            Ok(columns) => render_column_list(&table_name, &columns),
            Err(e) => format!("Error describing table: {e}"),
        }
    }
}

#[tool_handler]
impl ServerHandler for SqlToolServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            server_info: Implementation {
                name: "sqlbridge-tools".into(),
                version: env!("CARGO_PKG_VERSION").into(),
                ..Default::default()
            },
            capabilities: ServerCapabilities::builder()
                .enable_tools()
                .enable_resources()
                .enable_prompts()
                .build(),
            ..Default::default()
        }
    }

    async fn list_resources(
        &self,
        _request: Option<PaginatedRequestParam>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListResourcesResult, ErrorData> {
        let mut schema = RawResource::new(SCHEMA_URI, "database-schema");
        schema.description = Some("Complete PostgreSQL database schema information".to_string());
        Ok(ListResourcesResult {
            resources: vec![schema.no_annotation()],
            next_cursor: None,
        })
    }

    async fn read_resource(
        &self,
        request: ReadResourceRequestParam,
        _context: RequestContext<RoleServer>,
    ) -> Result<ReadResourceResult, ErrorData> {
        if request.uri != SCHEMA_URI {
            return Err(ErrorData::resource_not_found(
                format!("unknown resource: {}", request.uri),
                None,
            ));
        }

        info!("schema resource requested");
        let text = match self.executor.schema_dump().await {
            Ok(columns) => render_schema(&columns),
            Err(e) => format!("Error fetching schema: {e}"),
        };

        Ok(ReadResourceResult {
            contents: vec![ResourceContents::text(text, SCHEMA_URI)],
        })
    }

    async fn list_prompts(
        &self,
        _request: Option<PaginatedRequestParam>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListPromptsResult, ErrorData> {
        Ok(ListPromptsResult {
            prompts: vec![Prompt::new(
                "sql-assistant",
                Some("Help write PostgreSQL queries"),
                Some(vec![
                    PromptArgument {
                        name: "task".to_string(),
                        title: None,
                        description: Some(
                            "What you want to accomplish with the database".to_string(),
                        ),
                        required: Some(true),
                    },
                    PromptArgument {
                        name: "table".to_string(),
                        title: None,
                        description: Some("Specific table name (optional)".to_string()),
                        required: Some(false),
                    },
                ]),
            )],
            next_cursor: None,
        })
    }

    async fn get_prompt(
        &self,
        request: GetPromptRequestParam,
        _context: RequestContext<RoleServer>,
    ) -> Result<GetPromptResult, ErrorData> {
        if request.name != "sql-assistant" {
            return Err(ErrorData::invalid_params(
                format!("unknown prompt: {}", request.name),
                None,
            ));
        }

        let arguments = request.arguments.unwrap_or_default();
        let task = arguments
            .get("task")
            .and_then(|v| v.as_str())
            .ok_or_else(|| ErrorData::invalid_params("task argument is required", None))?;
        let table = arguments.get("table").and_then(|v| v.as_str());

        Ok(GetPromptResult {
            description: Some("Help write PostgreSQL queries".to_string()),
            messages: vec![PromptMessage::new_text(
                PromptMessageRole::User,
                sql_assistant_prompt(task, table),
            )],
        })
    }
}

/// Render the `sql-assistant` prompt body.
pub fn sql_assistant_prompt(task: &str, table: Option<&str>) -> String {
    let focus = table
        .map(|t| format!("\n\nFocusing on table: {t}"))
        .unwrap_or_default();
    format!(
        "I need help writing a PostgreSQL query to: {task}{focus}\n\nPlease provide a well-formatted SQL query with proper PostgreSQL syntax."
    )
}

/// Render an executed result set as a pipe-delimited table.
pub fn render_query_output(output: &QueryOutput) -> String {
    if output.rows.is_empty() {
        return "No rows returned.".to_string();
    }

    let header = output.columns.join(" | ");
    let body = output.rows.iter().map(|row| row.join(" | ")).join("\n");
    format!("{} rows:\n{}\n{}", output.rows.len(), header, body)
}

/// Render the table listing as a bullet list.
pub fn render_table_list(names: &[String]) -> String {
    format!(
        "Available tables ({}):\n{}",
        names.len(),
        names.iter().map(|name| format!("- {name}")).join("\n")
    )
}

/// Render column metadata, one line per column.
pub fn render_column_list(table: &str, columns: &[ColumnDescription]) -> String {
    let body = columns
        .iter()
        .map(|col| {
            format!(
                "{} ({}) {}",
                col.name,
                col.data_type,
                if col.nullable { "NULL" } else { "NOT NULL" }
            )
        })
        .join("\n");
    format!("Table '{table}' structure:\n{body}")
}

/// Render the full schema dump grouped by table.
pub fn render_schema(columns: &[SchemaColumn]) -> String {
    let mut out = String::from("PostgreSQL Database Schema:\n");
    for (table, group) in &columns.iter().chunk_by(|c| c.table_name.clone()) {
        out.push_str(&format!("\nTable: {table}\n"));
        for col in group {
            let default = col
                .column_default
                .as_ref()
                .map(|d| format!(" DEFAULT {d}"))
                .unwrap_or_default();
            out.push_str(&format!(
                "  {} ({}) {}{}\n",
                col.column_name,
                col.data_type,
                if col.is_nullable == "YES" {
                    "NULL"
                } else {
                    "NOT NULL"
                },
                default
            ));
        }
    }
    out
}
