//! Delete database activity

use std::sync::Arc;

use duroxide::ActivityContext;

use super::ActivityRetry;
use crate::activity_names::activities;
use crate::activity_types::{DeleteDatabaseInput, DeleteDatabaseOutput};
use crate::backends::Backends;
use crate::error::ActivityError;

/// Activity name for registration and scheduling
pub const NAME: &str = activities::DELETE_DATABASE;

pub async fn activity(
    ctx: ActivityContext,
    backends: Arc<Backends>,
    input: DeleteDatabaseInput,
) -> Result<DeleteDatabaseOutput, String> {
    ctx.trace_info(format!("Deleting database {}", input.database));
    ActivityRetry::default()
        .retry(NAME, || execute(&backends, input.clone()))
        .await
        .map_err(|e| e.to_string())
}

pub async fn execute(
    backends: &Backends,
    input: DeleteDatabaseInput,
) -> Result<DeleteDatabaseOutput, ActivityError> {
    if input.create_backup {
        tracing::info!(database = %input.database, "Creating a backup");
        match backends.databases.backup_database(&input.database).await? {
            Some(backup) => tracing::info!(database = %input.database, backup = %backup, "Backup complete"),
            None => tracing::info!(database = %input.database, "Database not found, no backup taken"),
        }
    }

    tracing::info!(database = %input.database, "Deleting database");
    if !backends.databases.drop_database(&input.database).await? {
        tracing::info!(database = %input.database, "Database already gone");
    }

    Ok(DeleteDatabaseOutput {})
}
