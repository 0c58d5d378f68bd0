use crate::commands::{load_config, CommandResult};

/// Effective configuration after file, environment, and override layering.
/// The session token lives in the session file and is never echoed here.
pub fn run() -> CommandResult {
    let command = "config";
    let config = match load_config(command) {
        Ok(config) => config,
        Err(result) => return result,
    };

    let data = serde_json::json!({
        "backend": {
            "base_url": config.backend.base_url,
            "timeout_secs": config.backend.timeout_secs,
        },
        "session": {
            "path": config.session.path,
        },
        "logging": {
            "level": config.logging.level,
            "format": config.logging.format,
        },
    });
    CommandResult::success_with_data(command, "effective configuration", data)
}
