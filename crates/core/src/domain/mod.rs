pub mod flower;
pub mod order;
