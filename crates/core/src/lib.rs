pub mod config;
pub mod domain;
pub mod errors;
pub mod quantity;
pub mod session;

pub use config::{AppConfig, ConfigError, ConfigOverrides, LoadOptions, LogFormat};
pub use domain::flower::{Flower, FlowerId};
pub use domain::order::{CustomerId, Order, OrderId, OrderStatus, TargetStatus};
pub use errors::{DomainError, FailureKind};
pub use quantity::{QuantitySelector, QuantityWarning, SetOutcome};
pub use session::{
    FileSessionStore, InMemorySessionStore, Session, SessionStore, SessionStoreError,
};
