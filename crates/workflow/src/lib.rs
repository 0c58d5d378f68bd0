//! The order lifecycle workflow: placement on the flower detail side, paged
//! listing and confirmation-gated status transitions on the admin side, plus
//! the sign-in/sign-out and order history flows around them.

pub mod auth;
pub mod desk;
pub mod history;
pub mod placement;

pub use auth::{sign_in, sign_out, AuthError, Credentials, SignOutOutcome};
pub use desk::{AdvanceOutcome, Confirmation, DeskError, OrderDesk};
pub use history::{order_detail, order_history};
pub use placement::{OrderPlacement, PlacementError, PlacementRedirect};
