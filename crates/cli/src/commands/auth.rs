use std::io::{BufRead, Write};

use fleura_workflow::{sign_in, sign_out, Credentials, SignOutOutcome};

use crate::commands::{load_config, runtime, session_store, storefront, CommandResult};

pub fn login(username: &str, password: Option<String>) -> CommandResult {
    let command = "login";
    let config = match load_config(command) {
        Ok(config) => config,
        Err(result) => return result,
    };
    let runtime = match runtime(command) {
        Ok(runtime) => runtime,
        Err(result) => return result,
    };
    let storefront = match storefront(command, &config) {
        Ok(storefront) => storefront,
        Err(result) => return result,
    };
    let store = session_store(&config);

    let password = match password {
        Some(password) => password,
        None => match prompt_password() {
            Ok(password) => password,
            Err(error) => {
                return CommandResult::failure(
                    command,
                    "validation",
                    format!("could not read password: {error}"),
                    1,
                )
            }
        },
    };

    let credentials = Credentials { username: username.to_string(), password };
    match runtime.block_on(sign_in(&storefront, &store, credentials)) {
        Ok(session) => CommandResult::success_with_data(
            command,
            "Successfully logged in",
            serde_json::json!({ "user_id": session.user_id, "admin": session.is_admin }),
        ),
        Err(error) => {
            CommandResult::failure(command, error.kind().as_str(), error.user_message(), 1)
        }
    }
}

pub fn logout() -> CommandResult {
    let command = "logout";
    let config = match load_config(command) {
        Ok(config) => config,
        Err(result) => return result,
    };
    let runtime = match runtime(command) {
        Ok(runtime) => runtime,
        Err(result) => return result,
    };
    let storefront = match storefront(command, &config) {
        Ok(storefront) => storefront,
        Err(result) => return result,
    };
    let store = session_store(&config);

    match runtime.block_on(sign_out(&storefront, &store)) {
        Ok(SignOutOutcome::Full) => CommandResult::success(command, "Successfully logged out"),
        Ok(SignOutOutcome::LocalOnly) => CommandResult::success(
            command,
            "Logged out locally; the backend did not acknowledge the logout",
        ),
        Ok(SignOutOutcome::NotSignedIn) => CommandResult::success(command, "No session to clear"),
        Err(error) => {
            CommandResult::failure(command, error.kind().as_str(), error.user_message(), 1)
        }
    }
}

fn prompt_password() -> std::io::Result<String> {
    eprint!("Password: ");
    std::io::stderr().flush()?;
    let mut password = String::new();
    std::io::stdin().lock().read_line(&mut password)?;
    Ok(password.trim_end_matches(['\r', '\n']).to_string())
}
