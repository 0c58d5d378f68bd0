use fleura_core::{FlowerId, OrderId};
use fleura_workflow::{order_detail, order_history, OrderPlacement, PlacementError};

use crate::commands::{
    api_failure, load_config, load_session, require_session, runtime, session_store, storefront,
    CommandResult,
};

pub fn place(flower_id: i64, quantity_raw: &str) -> CommandResult {
    let command = "order.place";
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
    let session = match load_session(command, &store) {
        Ok(session) => session,
        Err(result) => return result,
    };

    runtime.block_on(async {
        let mut placement = OrderPlacement::new();
        if let Err(error) = placement.load(&storefront, FlowerId(flower_id)).await {
            return api_failure(command, &error);
        }

        let mut warnings: Vec<&'static str> = Vec::new();
        if let Some(selector) = placement.selector_mut() {
            if let Some(warning) = selector.set(quantity_raw).warning {
                warnings.push(warning.user_message());
            }
        }

        match placement.submit(&storefront, session.as_ref()).await {
            Ok(redirect) => {
                let quantity =
                    placement.selector().map(|selector| selector.quantity()).unwrap_or(0);
                let total = placement.selector().map(|selector| selector.total());
                CommandResult::success_with_data(
                    command,
                    "Order placed. Continue to payment.",
                    serde_json::json!({
                        "redirect_url": redirect.redirect_url,
                        "quantity": quantity,
                        "total_price": total,
                        "warnings": warnings,
                    }),
                )
            }
            Err(error) => {
                let hint = if matches!(error, PlacementError::NotSignedIn) {
                    " Run: fleura login <username>"
                } else {
                    ""
                };
                CommandResult::failure(
                    command,
                    error.kind().as_str(),
                    format!("{}{hint}", error.user_message()),
                    1,
                )
            }
        }
    })
}

pub fn show(id: i64) -> CommandResult {
    let command = "order.show";
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

    match runtime.block_on(order_detail(&storefront, OrderId(id))) {
        Ok(order) => {
            let payment = if order.payment_status { "paid" } else { "unpaid" };
            CommandResult::success_with_data(
                command,
                format!("Order {} is {:?} ({payment})", order.id, order.status),
                serde_json::json!({ "order": order }),
            )
        }
        Err(error) => api_failure(command, &error),
    }
}

pub fn history() -> CommandResult {
    let command = "order.history";
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
    let session = match require_session(command, &store) {
        Ok(session) => session,
        Err(result) => return result,
    };

    match runtime.block_on(order_history(&storefront, &session)) {
        Ok(orders) => CommandResult::success_with_data(
            command,
            format!("{} order(s)", orders.len()),
            serde_json::json!({ "orders": orders }),
        ),
        Err(error) => api_failure(command, &error),
    }
}
