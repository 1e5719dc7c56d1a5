//! Application services.

pub mod auth;
pub mod sync;

pub use auth::IdentityProvider;
pub use sync::{SyncReport, SyncService};
