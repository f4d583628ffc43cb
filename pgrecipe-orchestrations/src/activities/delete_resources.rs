//! Delete resources activity

use std::sync::Arc;

use duroxide::ActivityContext;

use super::ActivityRetry;
use crate::activity_names::activities;
use crate::activity_types::{DeleteResourcesInput, DeleteResourcesOutput};
use crate::backends::Backends;
use crate::error::ActivityError;

/// Activity name for registration and scheduling
pub const NAME: &str = activities::DELETE_RESOURCES;

pub async fn activity(
    ctx: ActivityContext,
    backends: Arc<Backends>,
    input: DeleteResourcesInput,
) -> Result<DeleteResourcesOutput, String> {
    ctx.trace_info(format!("Deleting resources: {}/{}", input.namespace, input.name));
    ActivityRetry::default()
        .retry(NAME, || execute(&backends, input.clone()))
        .await
        .map_err(|e| e.to_string())
}

pub async fn execute(
    backends: &Backends,
    input: DeleteResourcesInput,
) -> Result<DeleteResourcesOutput, ActivityError> {
    let existed = backends
        .infrastructure
        .delete(&input.namespace, &input.name)
        .await?;

    if existed {
        tracing::info!(namespace = %input.namespace, name = %input.name, "Resources deleted");
    } else {
        tracing::info!(
            namespace = %input.namespace,
            name = %input.name,
            "Resources don't exist, nothing to delete"
        );
    }

    Ok(DeleteResourcesOutput {})
}
