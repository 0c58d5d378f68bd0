use fleura_api::CatalogApi;
use fleura_core::{FlowerId, QuantitySelector};

use crate::commands::{api_failure, load_config, runtime, storefront, CommandResult};

pub fn run(id: i64) -> CommandResult {
    let command = "flower";
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

    match runtime.block_on(storefront.flower(FlowerId(id))) {
        Ok(flower) => {
            let selector = QuantitySelector::for_flower(&flower);
            let data = serde_json::json!({
                "id": flower.id,
                "title": flower.title,
                "category": flower.category,
                "description": flower.description,
                "price": flower.price,
                "available": flower.available,
                "image_url": flower.image_url,
                "orderable": selector.is_orderable(),
                "quantity": selector.quantity(),
                "total": selector.total(),
            });
            let message = if selector.is_orderable() {
                format!("{} left. Make your order", flower.available)
            } else {
                "Out of stock".to_string()
            };
            CommandResult::success_with_data(command, message, data)
        }
        Err(error) => api_failure(command, &error),
    }
}
