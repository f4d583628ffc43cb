//! Orchestrator-facing context
//!
//! Put and Delete are written once against [`Workflow`]. Duroxide's
//! `OrchestrationContext` implements it for production; the in-process
//! [`crate::local_host::ReplayContext`] implements it for local runs.

use async_trait::async_trait;
use duroxide::OrchestrationContext;

use crate::activity_names::activities;
use crate::activity_types::*;

#[async_trait]
pub trait Workflow: Send + Sync {
    /// Schedule one activity and wait for its (possibly recorded) outcome
    async fn call_activity(&self, call: ActivityCall) -> Result<ActivityOutput, String>;

    /// Log a line; silent while replaying recorded history
    fn trace_info(&self, message: String);
}

/// Typed wrapper over [`Workflow::call_activity`]
pub async fn call<S: ActivityStep>(ctx: &dyn Workflow, input: S) -> Result<S::Output, String> {
    let call: ActivityCall = input.into();
    let name = call.name();
    let output = ctx.call_activity(call).await?;
    S::extract(output).ok_or_else(|| format!("Activity '{}' returned an unexpected output", name))
}

/// Steps are scheduled without a retry policy. Activities retry their own
/// transient failures.
#[async_trait]
impl Workflow for OrchestrationContext {
    async fn call_activity(&self, call: ActivityCall) -> Result<ActivityOutput, String> {
        match call {
            ActivityCall::DeployResources(input) => self
                .schedule_activity_typed::<DeployResourcesInput, DeployResourcesOutput>(activities::DEPLOY_RESOURCES, &input)
                .into_activity_typed::<DeployResourcesOutput>()
                .await
                .map(ActivityOutput::DeployResources),
            ActivityCall::DeleteResources(input) => self
                .schedule_activity_typed::<DeleteResourcesInput, DeleteResourcesOutput>(activities::DELETE_RESOURCES, &input)
                .into_activity_typed::<DeleteResourcesOutput>()
                .await
                .map(ActivityOutput::DeleteResources),
            ActivityCall::CreateCredential(input) => self
                .schedule_activity_typed::<CreateCredentialInput, CreateCredentialOutput>(activities::CREATE_CREDENTIAL, &input)
                .into_activity_typed::<CreateCredentialOutput>()
                .await
                .map(ActivityOutput::CreateCredential),
            ActivityCall::DeleteCredential(input) => self
                .schedule_activity_typed::<DeleteCredentialInput, DeleteCredentialOutput>(activities::DELETE_CREDENTIAL, &input)
                .into_activity_typed::<DeleteCredentialOutput>()
                .await
                .map(ActivityOutput::DeleteCredential),
            ActivityCall::CreateDatabase(input) => self
                .schedule_activity_typed::<CreateDatabaseInput, CreateDatabaseOutput>(activities::CREATE_DATABASE, &input)
                .into_activity_typed::<CreateDatabaseOutput>()
                .await
                .map(ActivityOutput::CreateDatabase),
            ActivityCall::DeleteDatabase(input) => self
                .schedule_activity_typed::<DeleteDatabaseInput, DeleteDatabaseOutput>(activities::DELETE_DATABASE, &input)
                .into_activity_typed::<DeleteDatabaseOutput>()
                .await
                .map(ActivityOutput::DeleteDatabase),
        }
    }

    fn trace_info(&self, message: String) {
        OrchestrationContext::trace_info(self, message);
    }
}
