//! Store management routes.
//!
//! Forms post strings; everything enumerated is parsed against its closed
//! set here and an unrecognized value becomes a [`ValidationError`] naming
//! the field. Stores are closed, never deleted.

use askama::Template;
use axum::{
    extract::{Form, Path, State},
    http::Uri,
    response::{Html, Redirect},
};
use serde::Deserialize;
use tracing::instrument;
use url::Url;

use itadaki_core::{Action, BusinessType, CompanyId, Resource, StoreId};

use crate::db::StoreRepository;
use crate::error::{AppError, ValidationError};
use crate::middleware::{RequireAuth, authorize};
use crate::models::{NewStore, Store, UpdateStore};
use crate::routes::render;
use crate::shell::Shell;
use crate::state::AppState;

/// Store row for the listing page.
#[derive(Debug, Clone)]
pub struct StoreView {
    pub id: i64,
    pub name: String,
    pub address: String,
    pub business_type: String,
    pub status: String,
    pub is_open: bool,
}

impl From<&Store> for StoreView {
    fn from(store: &Store) -> Self {
        Self {
            id: store.id.as_i64(),
            name: store.name.clone(),
            address: store.address.clone(),
            business_type: store.business_type.to_string(),
            status: store.status.to_string(),
            is_open: store.status == itadaki_core::StoreStatus::Open,
        }
    }
}

/// Store listing template.
#[derive(Template)]
#[template(path = "stores.html")]
pub struct StoresTemplate {
    pub shell: Shell,
    pub stores: Vec<StoreView>,
}

/// Store edit template.
#[derive(Template)]
#[template(path = "store_edit.html")]
pub struct StoreEditTemplate {
    pub shell: Shell,
    pub store: StoreView,
    pub website_url: String,
    pub review_site_url: String,
    pub social_url: String,
}

/// Form payload shared by create and update.
#[derive(Debug, Deserialize)]
pub struct StoreForm {
    #[serde(default)]
    pub company_id: Option<i64>,
    pub name: String,
    pub address: String,
    pub business_type: String,
    #[serde(default)]
    pub website_url: String,
    #[serde(default)]
    pub review_site_url: String,
    #[serde(default)]
    pub social_url: String,
}

fn non_empty(value: String, field: &'static str) -> Result<String, ValidationError> {
    let trimmed = value.trim().to_owned();
    if trimmed.is_empty() {
        return Err(ValidationError::new(field, "must not be empty"));
    }
    Ok(trimmed)
}

fn optional_url(value: &str, field: &'static str) -> Result<Option<Url>, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    Url::parse(trimmed)
        .map(Some)
        .map_err(|e| ValidationError::new(field, format!("must be a valid URL: {e}")))
}

fn parse_business_type(value: &str) -> Result<BusinessType, ValidationError> {
    value
        .parse()
        .map_err(|e: String| ValidationError::new("business_type", e))
}

impl StoreForm {
    fn into_new_store(self) -> Result<NewStore, ValidationError> {
        let company_id = self
            .company_id
            .ok_or_else(|| ValidationError::new("company_id", "must be provided"))?;
        Ok(NewStore {
            company_id: CompanyId::new(company_id),
            name: non_empty(self.name, "name")?,
            address: non_empty(self.address, "address")?,
            business_type: parse_business_type(&self.business_type)?,
            website_url: optional_url(&self.website_url, "website_url")?,
            review_site_url: optional_url(&self.review_site_url, "review_site_url")?,
            social_url: optional_url(&self.social_url, "social_url")?,
        })
    }

    fn into_update(self) -> Result<UpdateStore, ValidationError> {
        Ok(UpdateStore {
            name: non_empty(self.name, "name")?,
            address: non_empty(self.address, "address")?,
            business_type: parse_business_type(&self.business_type)?,
            website_url: optional_url(&self.website_url, "website_url")?,
            review_site_url: optional_url(&self.review_site_url, "review_site_url")?,
            social_url: optional_url(&self.social_url, "social_url")?,
        })
    }
}

/// Store listing page.
#[instrument(skip(user, state))]
pub async fn index(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    uri: Uri,
) -> Result<Html<String>, AppError> {
    authorize(&user, Resource::Companies, Action::Read)?;

    let stores = StoreRepository::new(state.pool()).list_all().await?;
    let template = StoresTemplate {
        shell: Shell::for_path(Some(uri.path())),
        stores: stores.iter().map(StoreView::from).collect(),
    };
    Ok(render(&template))
}

/// Create a store.
#[instrument(skip(user, state, form))]
pub async fn create(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Form(form): Form<StoreForm>,
) -> Result<Redirect, AppError> {
    authorize(&user, Resource::Companies, Action::Create)?;

    let new_store = form.into_new_store()?;
    let store = StoreRepository::new(state.pool()).create(&new_store).await?;
    tracing::info!(store_id = %store.id, "store created");
    Ok(Redirect::to("/stores"))
}

/// Store edit page.
#[instrument(skip(user, state))]
pub async fn edit(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<i64>,
    uri: Uri,
) -> Result<Html<String>, AppError> {
    authorize(&user, Resource::Companies, Action::Read)?;

    let store = StoreRepository::new(state.pool())
        .get_by_id(StoreId::new(id))
        .await?
        .ok_or_else(|| AppError::NotFound(format!("store {id}")))?;

    let template = StoreEditTemplate {
        shell: Shell::for_path(Some(uri.path())),
        website_url: store.website_url.as_ref().map(Url::to_string).unwrap_or_default(),
        review_site_url: store
            .review_site_url
            .as_ref()
            .map(Url::to_string)
            .unwrap_or_default(),
        social_url: store.social_url.as_ref().map(Url::to_string).unwrap_or_default(),
        store: StoreView::from(&store),
    };
    Ok(render(&template))
}

/// Update a store.
#[instrument(skip(user, state, form))]
pub async fn update(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Form(form): Form<StoreForm>,
) -> Result<Redirect, AppError> {
    authorize(&user, Resource::Companies, Action::Update)?;

    let update = form.into_update()?;
    StoreRepository::new(state.pool())
        .update(StoreId::new(id), &update)
        .await?;
    Ok(Redirect::to("/stores"))
}

/// Close a store.
#[instrument(skip(user, state))]
pub async fn close(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Redirect, AppError> {
    authorize(&user, Resource::Companies, Action::Update)?;

    let store = StoreRepository::new(state.pool()).close(StoreId::new(id)).await?;
    tracing::info!(store_id = %store.id, "store closed");
    Ok(Redirect::to("/stores"))
}
