//! Create credential activity
//!
//! Not idempotent: a re-delivered invocation mints a second role and the
//! orchestration keeps whichever result the host recorded.

use std::sync::Arc;

use duroxide::ActivityContext;
use uuid::Uuid;

use super::ActivityRetry;
use crate::activity_names::activities;
use crate::activity_types::{CreateCredentialInput, CreateCredentialOutput};
use crate::backends::Backends;
use crate::error::ActivityError;

/// Activity name for registration and scheduling
pub const NAME: &str = activities::CREATE_CREDENTIAL;

/// Prefix of generated role names
pub const USERNAME_PREFIX: &str = "pguser";

pub async fn activity(
    ctx: ActivityContext,
    backends: Arc<Backends>,
    input: CreateCredentialInput,
) -> Result<CreateCredentialOutput, String> {
    ctx.trace_info("Generating new postgres user");

    let output = ActivityRetry::default()
        .retry(NAME, || execute(&backends, input.clone()))
        .await
        .map_err(|e| e.to_string())?;

    ctx.trace_info(format!("Created postgres user {}", output.username));
    Ok(output)
}

pub async fn execute(
    backends: &Backends,
    _input: CreateCredentialInput,
) -> Result<CreateCredentialOutput, ActivityError> {
    let suffix = Uuid::new_v4().simple().to_string();
    let username = format!("{}_{}", USERNAME_PREFIX, &suffix[..12]);
    let password = Uuid::new_v4().simple().to_string();

    backends.credentials.create_role(&username, &password).await?;

    tracing::info!(username = %username, password = "********", "Generated new postgres user");

    Ok(CreateCredentialOutput { username, password })
}
