//! Create database activity

use std::sync::Arc;

use duroxide::ActivityContext;
use uuid::Uuid;

use super::ActivityRetry;
use crate::activity_names::activities;
use crate::activity_types::{CreateDatabaseInput, CreateDatabaseOutput};
use crate::backends::Backends;
use crate::error::ActivityError;

/// Activity name for registration and scheduling
pub const NAME: &str = activities::CREATE_DATABASE;

pub async fn activity(
    ctx: ActivityContext,
    backends: Arc<Backends>,
    input: CreateDatabaseInput,
) -> Result<CreateDatabaseOutput, String> {
    ctx.trace_info(format!("Creating database with prefix {}", input.database_prefix));

    let output = ActivityRetry::default()
        .retry(NAME, || execute(&backends, input.clone()))
        .await
        .map_err(|e| e.to_string())?;

    ctx.trace_info(format!("Created database {}", output.database));
    Ok(output)
}

/// `{prefix}_{uuid}`; the random part keeps concurrent runs sharing a prefix apart
pub fn database_name(prefix: &str) -> String {
    format!("{}_{}", prefix, Uuid::new_v4().simple())
}

pub async fn execute(
    backends: &Backends,
    input: CreateDatabaseInput,
) -> Result<CreateDatabaseOutput, ActivityError> {
    if input.database_prefix.is_empty() {
        return Err(ActivityError::Terminal("database prefix is required".to_string()));
    }

    let database = database_name(&input.database_prefix);

    tracing::info!(database = %database, "Creating new database");
    backends
        .databases
        .create_database(&database, &input.username)
        .await?;
    tracing::info!(database = %database, username = %input.username, "Granted user permission");

    Ok(CreateDatabaseOutput { database })
}
