pub mod admin;
pub mod auth;
pub mod config;
pub mod doctor;
pub mod flower;
pub mod order;

use serde::Serialize;

use fleura_api::{ApiError, HttpStorefront};
use fleura_core::{AppConfig, FileSessionStore, LoadOptions, Session, SessionStore};

#[derive(Debug, Clone)]
pub struct CommandResult {
    pub exit_code: u8,
    pub output: String,
}

#[derive(Debug, Serialize)]
struct CommandOutcome {
    command: String,
    status: String,
    error_class: Option<String>,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<serde_json::Value>,
}

impl CommandResult {
    pub fn success(command: &str, message: impl Into<String>) -> Self {
        Self::finish(command, message, None)
    }

    pub fn success_with_data(
        command: &str,
        message: impl Into<String>,
        data: serde_json::Value,
    ) -> Self {
        Self::finish(command, message, Some(data))
    }

    fn finish(command: &str, message: impl Into<String>, data: Option<serde_json::Value>) -> Self {
        let payload = CommandOutcome {
            command: command.to_string(),
            status: "ok".to_string(),
            error_class: None,
            message: message.into(),
            data,
        };
        Self { exit_code: 0, output: serialize_payload(payload) }
    }

    pub fn failure(
        command: &str,
        error_class: &str,
        message: impl Into<String>,
        exit_code: u8,
    ) -> Self {
        let payload = CommandOutcome {
            command: command.to_string(),
            status: "error".to_string(),
            error_class: Some(error_class.to_string()),
            message: message.into(),
            data: None,
        };
        Self { exit_code, output: serialize_payload(payload) }
    }
}

fn serialize_payload(payload: CommandOutcome) -> String {
    serde_json::to_string(&payload).unwrap_or_else(|error| {
        format!(
            "{{\"command\":\"unknown\",\"status\":\"error\",\"error_class\":\"serialization\",\"message\":\"{}\"}}",
            error.to_string().replace('\\', "\\\\").replace('"', "\\\"")
        )
    })
}

pub(crate) fn load_config(command: &str) -> Result<AppConfig, CommandResult> {
    AppConfig::load(LoadOptions::default()).map_err(|error| {
        CommandResult::failure(command, "config_validation", error.to_string(), 2)
    })
}

pub(crate) fn runtime(command: &str) -> Result<tokio::runtime::Runtime, CommandResult> {
    tokio::runtime::Builder::new_current_thread().enable_all().build().map_err(|error| {
        CommandResult::failure(command, "runtime", format!("could not start runtime: {error}"), 3)
    })
}

pub(crate) fn storefront(
    command: &str,
    config: &AppConfig,
) -> Result<HttpStorefront, CommandResult> {
    HttpStorefront::new(&config.backend)
        .map_err(|error| CommandResult::failure(command, "server", error.to_string(), 1))
}

pub(crate) fn session_store(config: &AppConfig) -> FileSessionStore {
    FileSessionStore::new(config.session.path.clone())
}

pub(crate) fn load_session(
    command: &str,
    store: &FileSessionStore,
) -> Result<Option<Session>, CommandResult> {
    store
        .load()
        .map_err(|error| CommandResult::failure(command, "server", error.to_string(), 1))
}

pub(crate) fn require_session(
    command: &str,
    store: &FileSessionStore,
) -> Result<Session, CommandResult> {
    load_session(command, store)?.ok_or_else(|| {
        CommandResult::failure(
            command,
            "authorization",
            "Please login first: fleura login <username>",
            1,
        )
    })
}

pub(crate) fn api_failure(command: &str, error: &ApiError) -> CommandResult {
    let kind = error.kind();
    CommandResult::failure(
        command,
        kind.as_str(),
        format!("{} ({error})", kind.user_message()),
        1,
    )
}
