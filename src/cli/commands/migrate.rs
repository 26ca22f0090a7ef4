use anyhow::Context;
use serde_json::json;

use crate::cli::{output, OutputFormat};
use crate::config::AppConfig;
use crate::database::{migrations, DatabaseManager};

pub async fn handle(config: &AppConfig, output_format: OutputFormat) -> anyhow::Result<()> {
    let target = DatabaseManager::redacted_url(&config.database.url);
    tracing::info!("Migrating {}", target);

    let db = DatabaseManager::connect(&config.database)
        .await
        .with_context(|| format!("failed to connect to {}", target))?;

    let result = migrations::run_migrations(db.pool()).await;
    db.close().await;
    result.context("migration failed")?;

    output::success(
        output_format,
        &format!("Schema applied to {}", target),
        Some(json!({
            "database": target,
            "statements": migrations::SCHEMA.len(),
        })),
    )
}
