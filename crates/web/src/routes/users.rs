//! Staff user management routes.

use askama::Template;
use axum::{
    extract::{Form, Path, State},
    http::Uri,
    response::{Html, Redirect},
};
use serde::Deserialize;
use tracing::instrument;

use itadaki_core::{
    Action, Email, Permission, PermissionSet, Resource, UserId, UserRole, UserStatus,
};

use crate::db::UserRepository;
use crate::error::{AppError, ValidationError};
use crate::middleware::{RequireAuth, authorize};
use crate::models::{NewUser, UpdateUser, User};
use crate::routes::render;
use crate::shell::Shell;
use crate::state::AppState;

/// User row for the listing and edit pages.
#[derive(Debug, Clone)]
pub struct UserView {
    pub id: i64,
    pub email: String,
    pub display_name: String,
    pub role: String,
    pub status: String,
    pub last_login: String,
    pub permissions: Vec<PermissionView>,
}

/// One granted resource with its actions, for display.
#[derive(Debug, Clone)]
pub struct PermissionView {
    pub resource: String,
    pub actions: String,
}

impl From<&User> for UserView {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.as_i64(),
            email: user.email.to_string(),
            display_name: user.display_name.clone(),
            role: user.role.to_string(),
            status: user.status.to_string(),
            last_login: user
                .last_login_at
                .map_or_else(|| "未ログイン".to_owned(), |at| {
                    at.format("%Y-%m-%d %H:%M").to_string()
                }),
            permissions: user
                .permissions
                .iter()
                .map(|permission| PermissionView {
                    resource: permission.resource.to_string(),
                    actions: permission
                        .actions
                        .iter()
                        .map(ToString::to_string)
                        .collect::<Vec<_>>()
                        .join(", "),
                })
                .collect(),
        }
    }
}

/// User listing template.
#[derive(Template)]
#[template(path = "users.html")]
pub struct UsersTemplate {
    pub shell: Shell,
    pub users: Vec<UserView>,
}

/// User edit template.
#[derive(Template)]
#[template(path = "user_edit.html")]
pub struct UserEditTemplate {
    pub shell: Shell,
    pub user: UserView,
}

/// Form payload for creating a user.
#[derive(Debug, Deserialize)]
pub struct NewUserForm {
    pub email: String,
    pub display_name: String,
    pub role: String,
    #[serde(default)]
    pub phone: String,
}

/// Form payload for editing a user.
#[derive(Debug, Deserialize)]
pub struct UpdateUserForm {
    pub display_name: String,
    pub role: String,
    pub status: String,
    #[serde(default)]
    pub phone: String,
}

/// Form payload for granting a permission. One checkbox per action; an
/// unchecked box simply does not post its key.
#[derive(Debug, Deserialize)]
pub struct GrantPermissionForm {
    pub resource: String,
    #[serde(default)]
    pub can_create: Option<String>,
    #[serde(default)]
    pub can_read: Option<String>,
    #[serde(default)]
    pub can_update: Option<String>,
    #[serde(default)]
    pub can_delete: Option<String>,
}

impl NewUserForm {
    fn into_new_user(self) -> Result<NewUser, ValidationError> {
        let email = Email::parse(self.email.trim())
            .map_err(|e| ValidationError::new("email", e.to_string()))?;
        let role: UserRole = self
            .role
            .parse()
            .map_err(|e: String| ValidationError::new("role", e))?;
        let display_name = self.display_name.trim().to_owned();
        if display_name.is_empty() {
            return Err(ValidationError::new("display_name", "must not be empty"));
        }
        let phone = self.phone.trim();
        Ok(NewUser {
            email,
            display_name,
            role,
            phone: (!phone.is_empty()).then(|| phone.to_owned()),
            permissions: PermissionSet::new(),
        })
    }
}

impl UpdateUserForm {
    fn into_update(self) -> Result<UpdateUser, ValidationError> {
        let role: UserRole = self
            .role
            .parse()
            .map_err(|e: String| ValidationError::new("role", e))?;
        let status: UserStatus = self
            .status
            .parse()
            .map_err(|e: String| ValidationError::new("status", e))?;
        let display_name = self.display_name.trim().to_owned();
        if display_name.is_empty() {
            return Err(ValidationError::new("display_name", "must not be empty"));
        }
        let phone = self.phone.trim();
        Ok(UpdateUser {
            display_name,
            role,
            status,
            phone: (!phone.is_empty()).then(|| phone.to_owned()),
        })
    }
}

impl GrantPermissionForm {
    fn into_permission(self) -> Result<Permission, ValidationError> {
        let resource: Resource = self
            .resource
            .parse()
            .map_err(|e: String| ValidationError::new("resource", e))?;
        let mut actions = Vec::new();
        if self.can_create.is_some() {
            actions.push(Action::Create);
        }
        if self.can_read.is_some() {
            actions.push(Action::Read);
        }
        if self.can_update.is_some() {
            actions.push(Action::Update);
        }
        if self.can_delete.is_some() {
            actions.push(Action::Delete);
        }
        Ok(Permission::new(resource, actions))
    }
}

/// User listing page.
#[instrument(skip(current, state))]
pub async fn index(
    RequireAuth(current): RequireAuth,
    State(state): State<AppState>,
    uri: Uri,
) -> Result<Html<String>, AppError> {
    authorize(&current, Resource::Settings, Action::Read)?;

    let users = UserRepository::new(state.pool()).list_all().await?;
    let template = UsersTemplate {
        shell: Shell::for_path(Some(uri.path())),
        users: users.iter().map(UserView::from).collect(),
    };
    Ok(render(&template))
}

/// Create a user.
#[instrument(skip(current, state, form))]
pub async fn create(
    RequireAuth(current): RequireAuth,
    State(state): State<AppState>,
    Form(form): Form<NewUserForm>,
) -> Result<Redirect, AppError> {
    authorize(&current, Resource::Settings, Action::Create)?;

    let new_user = form.into_new_user()?;
    let user = UserRepository::new(state.pool()).create(&new_user).await?;
    tracing::info!(user_id = %user.id, "user created");
    Ok(Redirect::to("/users"))
}

/// User edit page.
#[instrument(skip(current, state))]
pub async fn edit(
    RequireAuth(current): RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<i64>,
    uri: Uri,
) -> Result<Html<String>, AppError> {
    authorize(&current, Resource::Settings, Action::Read)?;

    let user = UserRepository::new(state.pool())
        .get_by_id(UserId::new(id))
        .await?
        .ok_or_else(|| AppError::NotFound(format!("user {id}")))?;

    let template = UserEditTemplate {
        shell: Shell::for_path(Some(uri.path())),
        user: UserView::from(&user),
    };
    Ok(render(&template))
}

/// Update a user.
#[instrument(skip(current, state, form))]
pub async fn update(
    RequireAuth(current): RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Form(form): Form<UpdateUserForm>,
) -> Result<Redirect, AppError> {
    authorize(&current, Resource::Settings, Action::Update)?;

    let update = form.into_update()?;
    UserRepository::new(state.pool())
        .update(UserId::new(id), &update)
        .await?;
    Ok(Redirect::to("/users"))
}

/// Grant a permission, replacing the user's entry for that resource.
#[instrument(skip(current, state, form))]
pub async fn grant_permission(
    RequireAuth(current): RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Form(form): Form<GrantPermissionForm>,
) -> Result<Redirect, AppError> {
    authorize(&current, Resource::Settings, Action::Update)?;

    let permission = form.into_permission()?;
    UserRepository::new(state.pool())
        .grant_permission(UserId::new(id), &permission)
        .await?;
    Ok(Redirect::to(&format!("/users/{id}")))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_new_user_form_parses() {
        let form = NewUserForm {
            email: "Hanako@Itadaki.JP".to_owned(),
            display_name: "佐藤花子".to_owned(),
            role: "manager".to_owned(),
            phone: String::new(),
        };
        let new_user = form.into_new_user().unwrap();
        assert_eq!(new_user.email.as_str(), "hanako@itadaki.jp");
        assert_eq!(new_user.role, UserRole::Manager);
        assert!(new_user.phone.is_none());
    }

    #[test]
    fn test_unknown_role_names_field() {
        let form = NewUserForm {
            email: "hanako@itadaki.jp".to_owned(),
            display_name: "佐藤花子".to_owned(),
            role: "owner".to_owned(),
            phone: String::new(),
        };
        let err = form.into_new_user().unwrap_err();
        assert_eq!(err.field, "role");
    }

    #[test]
    fn test_unknown_status_names_field() {
        let form = UpdateUserForm {
            display_name: "佐藤花子".to_owned(),
            role: "manager".to_owned(),
            status: "suspended".to_owned(),
            phone: String::new(),
        };
        let err = form.into_update().unwrap_err();
        assert_eq!(err.field, "status");
    }

    #[test]
    fn test_permission_form_collects_checked_actions() {
        let form = GrantPermissionForm {
            resource: "jobs".to_owned(),
            can_create: None,
            can_read: Some("on".to_owned()),
            can_update: Some("on".to_owned()),
            can_delete: None,
        };
        let permission = form.into_permission().unwrap();
        assert_eq!(permission.resource, Resource::Jobs);
        assert!(permission.actions.contains(&Action::Read));
        assert!(permission.actions.contains(&Action::Update));
        assert!(!permission.actions.contains(&Action::Create));
    }

    #[test]
    fn test_permission_form_rejects_unknown_resource() {
        let form = GrantPermissionForm {
            resource: "payroll".to_owned(),
            can_create: None,
            can_read: Some("on".to_owned()),
            can_update: None,
            can_delete: None,
        };
        let err = form.into_permission().unwrap_err();
        assert_eq!(err.field, "resource");
    }
}
