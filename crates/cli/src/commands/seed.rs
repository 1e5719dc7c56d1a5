//! Development database seeding.

use std::collections::BTreeSet;

use secrecy::SecretString;
use url::Url;

use itadaki_core::{SyncInterval, SyncSettings};
use itadaki_web::db::{IntegrationRepository, NewIntegration};

use super::CommandError;

/// Seed a development database with a demo company, store, and a disabled
/// Domino integration. Safe to run only against a fresh database.
pub async fn run() -> Result<(), CommandError> {
    let pool = super::connect().await?;

    tracing::info!("Seeding demo company and store...");
    let company_id: i64 =
        sqlx::query_scalar("INSERT INTO company (name) VALUES ($1) RETURNING id")
            .bind("株式会社いただきフーズ")
            .fetch_one(&pool)
            .await?;

    sqlx::query(
        "INSERT INTO store (company_id, name, address, business_type)
         VALUES ($1, $2, $3, $4)",
    )
    .bind(company_id)
    .bind("すし処 いただき 築地本店")
    .bind("東京都中央区築地1-2-3")
    .bind("counter_omakase")
    .execute(&pool)
    .await?;

    tracing::info!("Seeding a disabled Domino integration...");
    let settings = SyncSettings {
        auto_sync: false,
        sync_interval: SyncInterval::DEFAULT,
        include_jobs: true,
        include_leads: true,
        include_shops: true,
        status_filter: BTreeSet::from(["active".to_owned()]),
    };
    let base_url = Url::parse("https://api.domino.example/")
        .map_err(|e| CommandError::InvalidArgument(e.to_string()))?;
    IntegrationRepository::new(&pool)
        .create(&NewIntegration {
            api_key: SecretString::from("dk_seed_only_not_a_real_key_1234"),
            base_url,
            webhook_url: None,
            is_active: false,
            sync: settings,
        })
        .await?;

    tracing::info!("Seed complete");
    Ok(())
}
