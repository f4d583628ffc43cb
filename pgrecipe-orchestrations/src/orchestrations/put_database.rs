//! Put (provision) orchestration

use duroxide::OrchestrationContext;
use serde_json::Value;

use crate::activity_types::{CreateCredentialInput, CreateDatabaseInput, DeployResourcesInput};
use crate::types::{secrets, values, RecipeContext, RecipeResult};
use crate::workflow::{call, Workflow};

/// `postgresql://{username}:{password}@{host}:{port}/{database}`
pub fn connection_uri(username: &str, password: &str, host: &str, port: u16, database: &str) -> String {
    format!("postgresql://{}:{}@{}:{}/{}", username, password, host, port, database)
}

/// Deploy resources, mint a credential, create the database.
///
/// Any step failure fails the orchestration. Nothing is rolled back; the
/// Delete orchestration cleans up whatever was left behind.
pub async fn put_database_orchestration(
    ctx: &dyn Workflow,
    input: RecipeContext,
) -> Result<RecipeResult, String> {
    let name = input.resource.name().to_string();
    if name.is_empty() {
        return Err("resource name is required".to_string());
    }
    let namespace = input
        .kubernetes_namespace()
        .ok_or_else(|| "runtime.kubernetes.namespace is required".to_string())?
        .to_string();

    ctx.trace_info(format!("Provisioning database resource {}/{}", namespace, name));

    // Step 1: Deploy backing resources
    let deployment = call(
        ctx,
        DeployResourcesInput {
            namespace: namespace.clone(),
            name: name.clone(),
        },
    )
    .await
    .map_err(|e| format!("Failed to deploy resources: {}", e))?;

    ctx.trace_info(format!(
        "Resources deployed: {} at {}:{}",
        deployment.resources.len(),
        deployment.host,
        deployment.port
    ));

    // Step 2: Mint credential
    let credential = call(ctx, CreateCredentialInput {})
        .await
        .map_err(|e| format!("Failed to create credential: {}", e))?;

    ctx.trace_info(format!("Credential created for {}", credential.username));

    // Step 3: Create database
    let database = call(
        ctx,
        CreateDatabaseInput {
            username: credential.username.clone(),
            password: credential.password.clone(),
            database_prefix: name.clone(),
        },
    )
    .await
    .map_err(|e| format!("Failed to create database: {}", e))?
    .database;

    ctx.trace_info(format!("Database {} created", database));

    let mut result = RecipeResult::default();
    result.values.insert(values::HOST.to_string(), Value::from(deployment.host.clone()));
    result.values.insert(values::PORT.to_string(), Value::from(deployment.port));
    result
        .values
        .insert(values::USERNAME.to_string(), Value::from(credential.username.clone()));
    result.values.insert(values::DATABASE.to_string(), Value::from(database.clone()));
    result.secrets.insert(
        secrets::PASSWORD.to_string(),
        Value::from(credential.password.clone()),
    );
    result.secrets.insert(
        secrets::URI.to_string(),
        Value::from(connection_uri(
            &credential.username,
            &credential.password,
            &deployment.host,
            deployment.port,
            &database,
        )),
    );
    result.resources = deployment.resources;

    ctx.trace_info(format!("Provisioning of {}/{} complete", namespace, name));

    Ok(result)
}

/// Duroxide entry point
pub async fn orchestration(ctx: OrchestrationContext, input: RecipeContext) -> Result<RecipeResult, String> {
    put_database_orchestration(&ctx, input).await
}
