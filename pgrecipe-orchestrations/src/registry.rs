//! Registry builders for pgrecipe orchestrations and activities

use std::collections::HashMap;
use std::sync::Arc;

use duroxide::runtime::registry::ActivityRegistry;
use duroxide::{ActivityContext, OrchestrationRegistry};
use futures::future::BoxFuture;
use pgrecipe_models::RecipeContext;

use crate::activities;
use crate::activity_types::*;
use crate::backends::Backends;
use crate::local_host::{OrchestratorFn, ReplayContext};
use crate::names::orchestrations;
use crate::orchestrations::{delete_database, put_database};

/// Create an OrchestrationRegistry with all pgrecipe orchestrations
///
/// # Example
///
/// ```rust,no_run
/// use pgrecipe_orchestrations::registry::create_orchestration_registry;
///
/// let orchestrations = create_orchestration_registry();
/// ```
pub fn create_orchestration_registry() -> OrchestrationRegistry {
    OrchestrationRegistry::builder()
        .register_typed(
            orchestrations::POSTGRES_DATABASES_PUT,
            put_database::orchestration,
        )
        .register_typed(
            orchestrations::POSTGRES_DATABASES_DELETE,
            delete_database::orchestration,
        )
        .build()
}

/// Create an ActivityRegistry whose activities run against `backends`
pub fn create_activity_registry(backends: Arc<Backends>) -> ActivityRegistry {
    let deploy = backends.clone();
    let delete = backends.clone();
    let create_credential = backends.clone();
    let delete_credential = backends.clone();
    let create_database = backends.clone();
    let delete_database = backends;

    ActivityRegistry::builder()
        .register_typed(activities::deploy_resources::NAME, move |ctx: ActivityContext, input: DeployResourcesInput| {
            activities::deploy_resources::activity(ctx, deploy.clone(), input)
        })
        .register_typed(activities::delete_resources::NAME, move |ctx: ActivityContext, input: DeleteResourcesInput| {
            activities::delete_resources::activity(ctx, delete.clone(), input)
        })
        .register_typed(activities::create_credential::NAME, move |ctx: ActivityContext, input: CreateCredentialInput| {
            activities::create_credential::activity(ctx, create_credential.clone(), input)
        })
        .register_typed(activities::delete_credential::NAME, move |ctx: ActivityContext, input: DeleteCredentialInput| {
            activities::delete_credential::activity(ctx, delete_credential.clone(), input)
        })
        .register_typed(activities::create_database::NAME, move |ctx: ActivityContext, input: CreateDatabaseInput| {
            activities::create_database::activity(ctx, create_database.clone(), input)
        })
        .register_typed(activities::delete_database::NAME, move |ctx: ActivityContext, input: DeleteDatabaseInput| {
            activities::delete_database::activity(ctx, delete_database.clone(), input)
        })
        .build()
}

fn decode_input(input: &str) -> Result<RecipeContext, String> {
    serde_json::from_str(input).map_err(|e| format!("Failed to decode orchestration input: {}", e))
}

fn run_put(ctx: Arc<ReplayContext>, input: String) -> BoxFuture<'static, Result<String, String>> {
    Box::pin(async move {
        let output = put_database::put_database_orchestration(ctx.as_ref(), decode_input(&input)?).await?;
        serde_json::to_string(&output).map_err(|e| e.to_string())
    })
}

fn run_delete(ctx: Arc<ReplayContext>, input: String) -> BoxFuture<'static, Result<String, String>> {
    Box::pin(async move {
        let output =
            delete_database::delete_database_orchestration(ctx.as_ref(), decode_input(&input)?).await?;
        serde_json::to_string(&output).map_err(|e| e.to_string())
    })
}

/// Orchestrator table for [`crate::local_host::LocalHost`]
pub fn local_orchestrators() -> HashMap<&'static str, OrchestratorFn> {
    let mut table: HashMap<&'static str, OrchestratorFn> = HashMap::new();
    table.insert(orchestrations::POSTGRES_DATABASES_PUT, Arc::new(run_put));
    table.insert(orchestrations::POSTGRES_DATABASES_DELETE, Arc::new(run_delete));
    table
}
