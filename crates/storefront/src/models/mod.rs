//! Domain models for the storefront.
//!
//! Documents in the store use camelCase field names; every model here
//! carries the serde renames so callers never touch raw JSON keys.

pub mod order;
pub mod product;
pub mod session;
pub mod user;

pub use order::{Bill, PendingOrder, Recipient};
pub use product::{Category, Product};
pub use session::CurrentUser;
pub use user::UserProfile;
