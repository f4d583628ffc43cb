//! Delete credential activity

use std::sync::Arc;

use duroxide::ActivityContext;

use super::ActivityRetry;
use crate::activity_names::activities;
use crate::activity_types::{DeleteCredentialInput, DeleteCredentialOutput};
use crate::backends::Backends;
use crate::error::ActivityError;

/// Activity name for registration and scheduling
pub const NAME: &str = activities::DELETE_CREDENTIAL;

pub async fn activity(
    ctx: ActivityContext,
    backends: Arc<Backends>,
    input: DeleteCredentialInput,
) -> Result<DeleteCredentialOutput, String> {
    ctx.trace_info(format!("Deleting postgres user {}", input.username));
    ActivityRetry::default()
        .retry(NAME, || execute(&backends, input.clone()))
        .await
        .map_err(|e| e.to_string())
}

pub async fn execute(
    backends: &Backends,
    input: DeleteCredentialInput,
) -> Result<DeleteCredentialOutput, ActivityError> {
    let existed = backends.credentials.revoke_role(&input.username).await?;

    if existed {
        tracing::info!(username = %input.username, "Deleted postgres user");
    } else {
        tracing::info!(username = %input.username, "Postgres user not found, skipping");
    }

    Ok(DeleteCredentialOutput {})
}
