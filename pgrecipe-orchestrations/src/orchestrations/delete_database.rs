//! Delete (teardown) orchestration

use duroxide::OrchestrationContext;

use crate::activity_types::{DeleteCredentialInput, DeleteDatabaseInput, DeleteResourcesInput};
use crate::types::{binding, RecipeContext, TeardownOutput};
use crate::workflow::{call, Workflow};

/// Tear down whatever a previous Put recorded in the resource status.
///
/// The database is dropped (after a backup) only if its name was recorded,
/// and the credential revoked only if a username was recorded. Resources are
/// always deleted. The first failing step fails the orchestration; every step
/// is safe to repeat on a later run.
pub async fn delete_database_orchestration(
    ctx: &dyn Workflow,
    input: RecipeContext,
) -> Result<TeardownOutput, String> {
    let name = input.resource.name().to_string();
    if name.is_empty() {
        return Err("resource name is required".to_string());
    }
    let namespace = input
        .kubernetes_namespace()
        .ok_or_else(|| "runtime.kubernetes.namespace is required".to_string())?
        .to_string();

    ctx.trace_info(format!("Tearing down database resource {}/{}", namespace, name));

    match input.resource.lookup(binding::DATABASE).into_option() {
        Some(database) => {
            call(
                ctx,
                DeleteDatabaseInput {
                    database: database.clone(),
                    create_backup: true,
                },
            )
            .await
            .map_err(|e| format!("Failed to delete database {}: {}", database, e))?;
            ctx.trace_info(format!("Database {} deleted", database));
        }
        None => ctx.trace_info("No database recorded, skipping database deletion".to_string()),
    }

    match input.resource.lookup(binding::USERNAME).into_option() {
        Some(username) => {
            call(ctx, DeleteCredentialInput { username: username.clone() })
                .await
                .map_err(|e| format!("Failed to delete credential {}: {}", username, e))?;
            ctx.trace_info(format!("Credential {} revoked", username));
        }
        None => ctx.trace_info("No username recorded, skipping credential deletion".to_string()),
    }

    call(
        ctx,
        DeleteResourcesInput {
            namespace: namespace.clone(),
            name: name.clone(),
        },
    )
    .await
    .map_err(|e| format!("Failed to delete resources: {}", e))?;

    ctx.trace_info(format!("Teardown of {}/{} complete", namespace, name));

    Ok(TeardownOutput {})
}

/// Duroxide entry point
pub async fn orchestration(
    ctx: OrchestrationContext,
    input: RecipeContext,
) -> Result<TeardownOutput, String> {
    delete_database_orchestration(&ctx, input).await
}
