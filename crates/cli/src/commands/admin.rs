use std::io::{BufRead, Write};

use fleura_core::{OrderId, TargetStatus};
use fleura_workflow::{Confirmation, OrderDesk};

use crate::commands::{
    load_config, require_session, runtime, session_store, storefront, CommandResult,
};

pub fn orders(page: u32) -> CommandResult {
    let command = "admin.orders";
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
    if !session.is_admin {
        return CommandResult::failure(command, "authorization", "Admin account required", 1);
    }

    runtime.block_on(async {
        let desk = OrderDesk::new();
        if let Err(error) = desk.load_page(&storefront, page).await {
            return CommandResult::failure(
                command,
                error.kind().as_str(),
                error.user_message(),
                1,
            );
        }

        let rows: Vec<serde_json::Value> = desk
            .orders()
            .await
            .iter()
            .map(|order| {
                serde_json::json!({
                    "id": order.id,
                    "customer": order.customer,
                    "flower": order.flower,
                    "quantity": order.quantity,
                    "total_price": order.total_price,
                    "status": order.status,
                    "payment_status": order.payment_status,
                    "actionable": order.is_actionable(),
                })
            })
            .collect();

        CommandResult::success_with_data(
            command,
            format!("page {} of {}", desk.page().await, desk.total_pages().await.unwrap_or(0)),
            serde_json::json!({
                "page": desk.page().await,
                "count": desk.count().await,
                "total_pages": desk.total_pages().await,
                "orders": rows,
            }),
        )
    })
}

pub fn advance(id: i64, target: TargetStatus, yes: bool) -> CommandResult {
    let command = "admin.advance";
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
    if !session.is_admin {
        return CommandResult::failure(command, "authorization", "Admin account required", 1);
    }

    let order_id = OrderId(id);
    let confirmation = if yes { Confirmation::Confirmed } else { confirm_on_stdin(order_id, target) };

    runtime.block_on(async {
        let desk = OrderDesk::new();
        // walk the pages until the row is on the desk
        let mut page = 1;
        loop {
            if let Err(error) = desk.load_page(&storefront, page).await {
                return CommandResult::failure(
                    command,
                    error.kind().as_str(),
                    error.user_message(),
                    1,
                );
            }
            if desk.orders().await.iter().any(|order| order.id == order_id) {
                break;
            }
            let pages = desk.total_pages().await.unwrap_or(0);
            if page >= pages {
                return CommandResult::failure(
                    command,
                    "validation",
                    format!("Order {order_id} was not found"),
                    1,
                );
            }
            page += 1;
        }

        match desk.advance(&storefront, &session, order_id, target, confirmation).await {
            Ok(fleura_workflow::AdvanceOutcome::Applied) => CommandResult::success_with_data(
                command,
                "Status has been changed",
                serde_json::json!({ "order": order_id, "status": target.as_status() }),
            ),
            Ok(fleura_workflow::AdvanceOutcome::Dismissed) => {
                CommandResult::success(command, "Nothing changed")
            }
            Err(error) => CommandResult::failure(
                command,
                error.kind().as_str(),
                error.user_message(),
                1,
            ),
        }
    })
}

fn confirm_on_stdin(id: OrderId, target: TargetStatus) -> Confirmation {
    eprint!("Advance order {id} to {target:?}? [y/N] ");
    let _ = std::io::stderr().flush();

    let mut answer = String::new();
    if std::io::stdin().lock().read_line(&mut answer).is_err() {
        return Confirmation::Dismissed;
    }
    match answer.trim().to_ascii_lowercase().as_str() {
        "y" | "yes" => Confirmation::Confirmed,
        _ => Confirmation::Dismissed,
    }
}
