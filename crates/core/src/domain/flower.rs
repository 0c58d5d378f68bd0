use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FlowerId(pub i64);

impl std::fmt::Display for FlowerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A sellable catalog item. The backend owns this record; it is fetched once
/// per page view and held transiently.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Flower {
    pub id: FlowerId,
    pub title: String,
    pub description: String,
    pub category: String,
    pub price: Decimal,
    pub available: u32,
    pub image_url: String,
}

impl Flower {
    pub fn in_stock(&self) -> bool {
        self.available >= 1
    }
}
