//! The orchestration host seam the control plane schedules through

use async_trait::async_trait;
use pgrecipe_models::InstanceMetadata;

use crate::error::HostError;

/// A durable-execution runtime that runs registered orchestrations
#[async_trait]
pub trait OrchestrationHost: Send + Sync {
    /// Start an instance of orchestration `name` with raw JSON `input`.
    ///
    /// Returns the instance id: `instance_id` when given, otherwise a fresh one.
    async fn schedule(
        &self,
        name: &str,
        input: String,
        instance_id: Option<String>,
    ) -> Result<String, HostError>;

    /// Current metadata of an instance, including payloads once terminal
    async fn fetch(&self, instance_id: &str) -> Result<InstanceMetadata, HostError>;
}
