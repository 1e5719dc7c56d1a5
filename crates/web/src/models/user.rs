//! Staff user domain types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use url::Url;

use itadaki_core::{CandidateId, CompanyId, Email, PermissionSet, UserId, UserRole, UserStatus};

/// A staff user (domain type).
///
/// The role is display-only; what a user may do is decided by
/// `permissions` alone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    /// Unique user ID.
    pub id: UserId,
    /// Email address (unique, lowercase).
    pub email: Email,
    /// Display name.
    pub display_name: String,
    /// Advisory role.
    pub role: UserRole,
    /// Whether the user may sign in.
    pub status: UserStatus,
    /// Contact phone, if provided.
    pub phone: Option<String>,
    /// Avatar image, if provided.
    pub avatar_url: Option<Url>,
    /// Per-resource permissions.
    pub permissions: PermissionSet,
    /// Candidates assigned to this recruiter.
    pub assigned_candidates: Vec<CandidateId>,
    /// Companies assigned to this recruiter.
    pub assigned_companies: Vec<CompanyId>,
    /// Last successful sign-in.
    pub last_login_at: Option<DateTime<Utc>>,
    /// When the user was created.
    pub created_at: DateTime<Utc>,
    /// When the user was last updated.
    pub updated_at: DateTime<Utc>,
}

/// Payload for creating a user.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: Email,
    pub display_name: String,
    pub role: UserRole,
    pub phone: Option<String>,
    pub permissions: PermissionSet,
}

/// Payload for editing a user. The edit form posts the full new state.
#[derive(Debug, Clone)]
pub struct UpdateUser {
    pub display_name: String,
    pub role: UserRole,
    pub status: UserStatus,
    pub phone: Option<String>,
}
