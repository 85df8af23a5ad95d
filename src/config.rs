//! Environment-driven configuration for the bridge and the tool server.
//!
//! Every knob has a default so the binaries start with nothing set; the
//! defaults point at a local development database and a sibling tool
//! server binary.

use sqlx::postgres::PgConnectOptions;
use std::env;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {name}: {value}")]
    Invalid { name: &'static str, value: String },
}

/// Settings for the HTTP bridge binary.
#[derive(Debug, Clone)]
pub struct BridgeConfig {
    /// Gemini API key. `None` when unset or blank; requests are rejected
    /// until a key is provided.
    pub gemini_api_key: Option<String>,
    pub gemini_model: String,
    pub port: u16,
    /// Path to the tool server binary spawned for the MCP session.
    pub tool_server_bin: PathBuf,
}

impl BridgeConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let gemini_api_key = env::var("GEMINI_API_KEY")
            .ok()
            .filter(|key| !key.trim().is_empty());

        let gemini_model =
            env::var("GEMINI_MODEL").unwrap_or_else(|_| "gemini-2.0-flash".to_string());

        let port = match env::var("PORT") {
            Ok(raw) => raw.parse().map_err(|_| ConfigError::Invalid {
                name: "PORT",
                value: raw,
            })?,
            Err(_) => 3000,
        };

        Ok(Self {
            gemini_api_key,
            gemini_model,
            port,
            tool_server_bin: tool_server_bin(),
        })
    }
}

/// Resolve the tool server binary: explicit override, then a sibling of
/// the current executable, then a bare name left to PATH lookup.
fn tool_server_bin() -> PathBuf {
    if let Ok(path) = env::var("TOOL_SERVER_BIN") {
        return PathBuf::from(path);
    }

    env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(|dir| dir.join("sqlbridge-tools")))
        .unwrap_or_else(|| PathBuf::from("sqlbridge-tools"))
}

/// PostgreSQL connection settings for the tool server binary.
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub user: String,
    pub host: String,
    pub name: String,
    pub password: String,
    pub port: u16,
}

impl DatabaseConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let port = match env::var("DB_PORT") {
            Ok(raw) => raw.parse().map_err(|_| ConfigError::Invalid {
                name: "DB_PORT",
                value: raw,
            })?,
            Err(_) => 5432,
        };

        Ok(Self {
            user: env::var("DB_USER").unwrap_or_else(|_| "youruser".to_string()),
            host: env::var("DB_HOST").unwrap_or_else(|_| "localhost".to_string()),
            name: env::var("DB_NAME").unwrap_or_else(|_| "yourdb".to_string()),
            password: env::var("DB_PASSWORD").unwrap_or_else(|_| "yourpassword".to_string()),
            port,
        })
    }

    pub fn connect_options(&self) -> PgConnectOptions {
        PgConnectOptions::new()
            .host(&self.host)
            .port(self.port)
            .username(&self.user)
            .password(&self.password)
            .database(&self.name)
    }
}
