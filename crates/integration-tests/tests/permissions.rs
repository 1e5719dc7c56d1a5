//! Tests for permission-driven authorization.

use itadaki_core::{Action, Email, Permission, PermissionSet, Resource, UserId, UserRole};
use itadaki_web::error::AppError;
use itadaki_web::middleware::authorize;
use itadaki_web::models::CurrentUser;

#[allow(clippy::unwrap_used)]
fn user(permissions: PermissionSet) -> CurrentUser {
    CurrentUser {
        id: UserId::new(1),
        email: Email::parse("taro@itadaki.jp").unwrap(),
        name: "山田太郎".to_owned(),
        role: UserRole::Recruiter,
        permissions,
    }
}

#[test]
fn test_read_only_jobs_user_cannot_update_jobs() {
    let mut permissions = PermissionSet::new();
    permissions.grant(Permission::new(Resource::Jobs, [Action::Read]));
    let subject = user(permissions);

    assert!(authorize(&subject, Resource::Jobs, Action::Read).is_ok());
    assert!(matches!(
        authorize(&subject, Resource::Jobs, Action::Update),
        Err(AppError::Forbidden(_))
    ));
}

#[test]
fn test_no_entry_denies_every_action() {
    let subject = user(PermissionSet::new());
    for resource in Resource::ALL {
        for action in [Action::Create, Action::Read, Action::Update, Action::Delete] {
            assert!(authorize(&subject, resource, action).is_err());
        }
    }
}

#[test]
fn test_role_grants_nothing() {
    let mut subject = user(PermissionSet::new());
    subject.role = UserRole::Admin;
    assert!(authorize(&subject, Resource::Settings, Action::Update).is_err());
}

#[test]
fn test_regrant_replaces_rather_than_appends() {
    let mut permissions = PermissionSet::new();
    permissions.grant(Permission::new(
        Resource::Companies,
        [Action::Create, Action::Read, Action::Update, Action::Delete],
    ));
    permissions.grant(Permission::new(Resource::Companies, [Action::Read]));
    let subject = user(permissions);

    assert!(authorize(&subject, Resource::Companies, Action::Read).is_ok());
    assert!(authorize(&subject, Resource::Companies, Action::Delete).is_err());
    assert!(authorize(&subject, Resource::Companies, Action::Create).is_err());
}

#[test]
fn test_permissions_are_per_resource() {
    let mut permissions = PermissionSet::new();
    permissions.grant(Permission::new(Resource::Jobs, [Action::Read]));
    let subject = user(permissions);

    assert!(authorize(&subject, Resource::Matches, Action::Read).is_err());
    assert!(authorize(&subject, Resource::Analytics, Action::Read).is_err());
}
