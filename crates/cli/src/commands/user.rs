//! Staff user creation command.

use itadaki_core::{Action, Email, Permission, PermissionSet, Resource, UserRole};
use itadaki_web::db::UserRepository;
use itadaki_web::models::NewUser;

use super::CommandError;

/// Create a staff user.
///
/// With `all_permissions`, every action on every resource is granted; the
/// role itself never grants anything.
pub async fn create(
    email: &str,
    name: &str,
    role: &str,
    all_permissions: bool,
) -> Result<(), CommandError> {
    let email = Email::parse(email).map_err(|e| CommandError::InvalidArgument(e.to_string()))?;
    let role: UserRole = role
        .parse()
        .map_err(|e: String| CommandError::InvalidArgument(e))?;

    let mut permissions = PermissionSet::new();
    if all_permissions {
        for resource in Resource::ALL {
            permissions.grant(Permission::new(
                resource,
                [Action::Create, Action::Read, Action::Update, Action::Delete],
            ));
        }
    }

    let pool = super::connect().await?;
    let user = UserRepository::new(&pool)
        .create(&NewUser {
            email,
            display_name: name.to_owned(),
            role,
            phone: None,
            permissions,
        })
        .await?;

    tracing::info!(user_id = %user.id, email = %user.email, "user created");
    Ok(())
}
