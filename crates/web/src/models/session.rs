//! Session identity.
//!
//! The signed-in user is an explicit value stored in the session and passed
//! to whatever needs it; there is no ambient global auth state.

use serde::{Deserialize, Serialize};

use itadaki_core::{Email, PermissionSet, UserId, UserRole};

use crate::models::user::User;

/// Keys used for values stored in the session.
pub mod session_keys {
    /// The signed-in user ([`CurrentUser`](super::CurrentUser)).
    pub const CURRENT_USER: &str = "current_user";
}

/// The signed-in user, as carried by the session.
///
/// Holds the permission set so per-request authorization does not hit the
/// database; a permission change takes effect at the next sign-in.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentUser {
    pub id: UserId,
    pub email: Email,
    pub name: String,
    pub role: UserRole,
    pub permissions: PermissionSet,
}

impl From<&User> for CurrentUser {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
            name: user.display_name.clone(),
            role: user.role,
            permissions: user.permissions.clone(),
        }
    }
}
