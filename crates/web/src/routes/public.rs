//! Public job listing pages.
//!
//! These render in the public shell and are served without authentication.
//! The listing is read through a short-lived cache so crawler traffic does
//! not hammer the database.

use std::sync::Arc;

use askama::Template;
use axum::{
    extract::{Path, State},
    http::Uri,
    response::Html,
};
use tracing::instrument;

use crate::db::{ImportRepository, ImportedJob};
use crate::error::AppError;
use crate::routes::render;
use crate::shell::Shell;
use crate::state::AppState;

/// How many jobs the listing page shows.
const LISTING_LIMIT: i64 = 50;

const JOB_CACHE_KEY: &str = "public_jobs";

/// Job row for the listing page.
#[derive(Debug, Clone)]
pub struct JobView {
    pub id: i64,
    pub title: String,
    pub shop_name: String,
    pub employment_type: String,
    pub wage: String,
}

impl From<&ImportedJob> for JobView {
    fn from(job: &ImportedJob) -> Self {
        Self {
            id: job.id,
            title: job.title.clone(),
            shop_name: job.shop_name.clone().unwrap_or_else(|| "非公開".to_owned()),
            employment_type: job
                .employment_type
                .clone()
                .unwrap_or_else(|| "未定".to_owned()),
            wage: job
                .hourly_wage
                .map_or_else(|| "応相談".to_owned(), |wage| format!("時給 {wage}円")),
        }
    }
}

/// Public job listing template.
#[derive(Template)]
#[template(path = "public_jobs.html")]
pub struct PublicJobsTemplate {
    pub shell: Shell,
    pub jobs: Vec<JobView>,
}

/// Public job detail template.
#[derive(Template)]
#[template(path = "public_job_detail.html")]
pub struct PublicJobDetailTemplate {
    pub shell: Shell,
    pub job: JobView,
    pub synced_at: String,
}

/// Public job listing page.
#[instrument(skip(state))]
pub async fn jobs_index(State(state): State<AppState>, uri: Uri) -> Result<Html<String>, AppError> {
    let jobs = match state.job_cache().get(JOB_CACHE_KEY).await {
        Some(cached) => cached,
        None => {
            let fetched = Arc::new(
                ImportRepository::new(state.pool())
                    .list_jobs(LISTING_LIMIT)
                    .await?,
            );
            state
                .job_cache()
                .insert(JOB_CACHE_KEY, fetched.clone())
                .await;
            fetched
        }
    };

    let template = PublicJobsTemplate {
        shell: Shell::for_path(Some(uri.path())),
        jobs: jobs.iter().map(JobView::from).collect(),
    };
    Ok(render(&template))
}

/// Public job detail page.
#[instrument(skip(state))]
pub async fn job_detail(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    uri: Uri,
) -> Result<Html<String>, AppError> {
    let job = ImportRepository::new(state.pool())
        .get_job(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("job {id}")))?;

    let template = PublicJobDetailTemplate {
        shell: Shell::for_path(Some(uri.path())),
        synced_at: job.synced_at.format("%Y-%m-%d").to_string(),
        job: JobView::from(&job),
    };
    Ok(render(&template))
}
